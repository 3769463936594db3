use crate::core::scoring::round4;
use crate::models::ScoringWeights;

/// Aggregate fairness metrics for one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FairnessMetrics {
    pub final_score: f64,
    pub mean_score: f64,
    pub variance: f64,
    pub fairness_score: f64,
    pub min_user_score: f64,
}

/// Arithmetic mean; empty input yields 0
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (mean of squared deviations, not sample variance)
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let average = mean(values);
    values
        .iter()
        .map(|value| (value - average).powi(2))
        .sum::<f64>()
        / values.len() as f64
}

/// High variance means an uneven group, so fairness is the clamped inverse
pub fn normalize_fairness(variance: f64) -> f64 {
    (1.0 - variance).clamp(0.0, 1.0)
}

/// Extra deduction when the least-satisfied member falls under the comfort
/// threshold; scales linearly from 0 at the threshold to 1 at a zero score.
pub fn low_floor_penalty(min_user_score: f64, threshold: f64) -> f64 {
    if min_user_score >= threshold {
        return 0.0;
    }
    (threshold - min_user_score) / threshold
}

/// Small bonus for a strong public rating, capped so popularity can break
/// near-ties but never outweigh fairness.
pub fn rating_bonus(rating: Option<f64>, cap: f64) -> f64 {
    match rating {
        Some(rating) if rating > 0.0 => (rating / 5.0).min(1.0) * cap,
        _ => 0.0,
    }
}

/// Combine per-member totals into the final ranking score
///
/// final = mean - variance_penalty * variance - low_floor_penalty * penalty
///         + rating_bonus
pub fn compute_final_score(
    totals: &[f64],
    rating: Option<f64>,
    weights: &ScoringWeights,
) -> FairnessMetrics {
    let mean_score = mean(totals);
    let variance = population_variance(totals);
    let min_user_score = totals.iter().copied().fold(f64::INFINITY, f64::min);
    let min_user_score = if min_user_score.is_finite() {
        min_user_score
    } else {
        0.0
    };

    let floor_penalty = low_floor_penalty(min_user_score, weights.low_floor_threshold);
    let final_score = mean_score - weights.variance_penalty * variance
        - weights.low_floor_penalty * floor_penalty
        + rating_bonus(rating, weights.rating_bonus_cap);

    FairnessMetrics {
        final_score: round4(final_score),
        mean_score: round4(mean_score),
        variance: round4(variance),
        fairness_score: round4(normalize_fairness(variance)),
        min_user_score: round4(min_user_score),
    }
}
