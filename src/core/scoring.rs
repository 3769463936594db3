use crate::core::normalize::fold_text;
use crate::models::{Candidate, MemberPreferences, RoomMember, ScoreBreakdown, ScoringWeights, Vibe};

/// Neutral comfort when no price tier is published
const BUDGET_UNKNOWN: f64 = 0.65;
/// Comfort floor for a candidate sitting exactly at the member's ceiling
const BUDGET_FLOOR: f64 = 0.6;
/// Comfort gained per tier of slack under the ceiling
const BUDGET_SLACK_STEP: f64 = 0.1;
/// Neutral comfort when distance cannot be evaluated
const DISTANCE_UNKNOWN: f64 = 0.6;
/// Comfort floor for a candidate exactly at the member's travel limit
const DISTANCE_FLOOR: f64 = 0.15;
/// Vibe score when a keyword matches
const VIBE_HIT: f64 = 1.0;
/// Vibe miss for the casual category, the least discriminating one
const VIBE_MISS_CASUAL: f64 = 0.5;
/// Vibe miss for every other category
const VIBE_MISS: f64 = 0.25;

/// Round to 4 decimal places, the precision carried on the wire
#[inline]
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Fraction of the member's named cuisines present in the candidate text
///
/// Members without usable cuisine preferences get a neutral constant so
/// that indifference neither boosts nor sinks a candidate.
pub fn cuisine_score(candidate_text: &str, preferences: &[String], neutral: f64) -> f64 {
    let normalized: Vec<String> = preferences
        .iter()
        .map(|preference| fold_text(preference))
        .filter(|preference| !preference.is_empty())
        .collect();

    if normalized.is_empty() {
        return neutral;
    }

    let matched = normalized
        .iter()
        .filter(|preference| candidate_text.contains(preference.as_str()))
        .count();

    matched as f64 / normalized.len() as f64
}

/// Vibe evidence is soft: a keyword hit scores high, a miss scores a low
/// non-zero default.
pub fn vibe_score(candidate_text: &str, vibe: Vibe) -> f64 {
    let hit = vibe
        .keywords()
        .iter()
        .any(|keyword| candidate_text.contains(keyword));

    if hit {
        VIBE_HIT
    } else if vibe == Vibe::Casual {
        VIBE_MISS_CASUAL
    } else {
        VIBE_MISS
    }
}

/// Comfort grows with slack under the member's ceiling and never drops
/// below the floor while the tier stays within budget.
pub fn budget_comfort_score(price_level: Option<u8>, budget_max: u8) -> f64 {
    let price_level = match price_level {
        Some(level) => level,
        None => return BUDGET_UNKNOWN,
    };

    if price_level > budget_max {
        return 0.0;
    }

    let slack = f64::from(budget_max - price_level);
    (BUDGET_FLOOR + slack * BUDGET_SLACK_STEP).min(1.0)
}

/// Linear decay from 1 at the anchor down to the floor at the member's
/// travel limit; past the limit the comfort is zero.
pub fn distance_comfort_score(distance_meters: Option<f64>, max_distance_meters: Option<f64>) -> f64 {
    let (distance, max_distance) = match (distance_meters, max_distance_meters) {
        (Some(distance), Some(max_distance)) if max_distance > 0.0 => (distance, max_distance),
        _ => return DISTANCE_UNKNOWN,
    };

    if distance > max_distance {
        return 0.0;
    }

    (1.0 - distance / max_distance).max(DISTANCE_FLOOR)
}

/// Compute one member's satisfaction breakdown for one candidate
///
/// `candidate_text` is the candidate's folded searchable text and
/// `distance_meters` the precomputed anchor distance, both shared across
/// members to avoid rework.
pub fn score_member(
    candidate_text: &str,
    member: &RoomMember,
    candidate: &Candidate,
    distance_meters: Option<f64>,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let preferences: &MemberPreferences = &member.preferences;

    let cuisine = cuisine_score(
        candidate_text,
        &preferences.cuisine_preferences,
        weights.cuisine_neutral,
    );
    let vibe = vibe_score(candidate_text, preferences.vibe_preference);
    let budget_comfort = budget_comfort_score(candidate.price_level, preferences.budget_max);
    let distance_comfort =
        distance_comfort_score(distance_meters, preferences.max_distance_meters);

    let total = cuisine * weights.cuisine
        + vibe * weights.vibe
        + budget_comfort * weights.budget_comfort
        + distance_comfort * weights.distance_comfort;

    ScoreBreakdown {
        cuisine: round4(cuisine),
        vibe: round4(vibe),
        budget_comfort: round4(budget_comfort),
        distance_comfort: round4(distance_comfort),
        total: round4(total),
    }
}
