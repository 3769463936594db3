use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::core::distance::haversine_meters;
use crate::core::fairness::compute_final_score;
use crate::core::normalize::search_text;
use crate::core::scoring::score_member;
use crate::models::{
    Candidate, Coordinate, RankedRestaurant, RoomMember, ScoreBreakdown, ScoringWeights,
};

/// Variance above this reads as uneven group satisfaction
const TRADEOFF_VARIANCE: f64 = 0.05;
/// Minimum member total below this reads as someone being squeezed
const TRADEOFF_MIN_SCORE: f64 = 0.45;
/// Public rating below this is worth calling out
const TRADEOFF_RATING: f64 = 4.0;
/// Price tier at or above this is worth calling out
const TRADEOFF_PRICE: u8 = 3;
/// At most this many trade-off statements per candidate
const MAX_TRADEOFFS: usize = 3;

/// Score and rank all surviving candidates
///
/// The sort is a stable descending sort on the final score, so candidates
/// with equal scores keep their input order. That input-order tie-break is
/// the documented contract, not an accident of the implementation.
pub fn rank_candidates(
    candidates: Vec<Candidate>,
    anchor: Option<Coordinate>,
    members: &[RoomMember],
    weights: &ScoringWeights,
) -> Vec<RankedRestaurant> {
    let mut ranked: Vec<RankedRestaurant> = candidates
        .into_iter()
        .map(|candidate| build_ranked(candidate, anchor, members, weights))
        .collect();

    ranked.sort_by(|left, right| {
        right
            .final_score
            .partial_cmp(&left.final_score)
            .unwrap_or(Ordering::Equal)
    });

    ranked
}

fn build_ranked(
    candidate: Candidate,
    anchor: Option<Coordinate>,
    members: &[RoomMember],
    weights: &ScoringWeights,
) -> RankedRestaurant {
    let candidate_text = search_text(&candidate);
    let distance_meters = anchor.map(|anchor| haversine_meters(anchor, candidate.coordinate()));

    let mut user_scores: BTreeMap<String, ScoreBreakdown> = BTreeMap::new();
    let mut totals: Vec<f64> = Vec::with_capacity(members.len());

    for member in members {
        let breakdown = score_member(&candidate_text, member, &candidate, distance_meters, weights);
        totals.push(breakdown.total);
        user_scores.insert(member.id.clone(), breakdown);
    }

    let metrics = compute_final_score(&totals, candidate.rating, weights);
    let key_tradeoffs = build_tradeoffs(
        metrics.variance,
        metrics.min_user_score,
        candidate.rating,
        candidate.price_level,
    );

    RankedRestaurant {
        candidate,
        final_score: metrics.final_score,
        mean_score: metrics.mean_score,
        fairness_score: metrics.fairness_score,
        variance: metrics.variance,
        min_user_score: metrics.min_user_score,
        user_scores,
        explanation: None,
        key_tradeoffs,
    }
}

/// Derive up to three human-readable trade-off statements
///
/// The list order follows the heuristic check order, not severity.
fn build_tradeoffs(
    variance: f64,
    min_user_score: f64,
    rating: Option<f64>,
    price_level: Option<u8>,
) -> Vec<String> {
    let mut tradeoffs = Vec::new();

    if variance > TRADEOFF_VARIANCE {
        tradeoffs.push("uneven satisfaction across members".to_string());
    }
    if min_user_score < TRADEOFF_MIN_SCORE {
        tradeoffs.push("at least one member has a low comfort score".to_string());
    }
    if matches!(rating, Some(rating) if rating < TRADEOFF_RATING) {
        tradeoffs.push("lower public rating than top alternatives".to_string());
    }
    if matches!(price_level, Some(level) if level >= TRADEOFF_PRICE) {
        tradeoffs.push("higher price point".to_string());
    }

    tradeoffs.truncate(MAX_TRADEOFFS);
    tradeoffs
}
