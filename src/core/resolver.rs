use thiserror::Error;

use crate::core::enrich::enrich_top_ranked;
use crate::core::filters::apply_hard_constraints;
use crate::core::normalize::normalize_listings;
use crate::core::ranking::rank_candidates;
use crate::models::{
    Coordinate, Elimination, RankedRestaurant, RawListing, ResolutionResult, RoomMember,
    ScoringWeights,
};
use crate::services::{DirectoryError, NarrativeClient};

/// Maximum candidates kept after deduplication, matching the directory page size
pub const DEFAULT_POOL_LIMIT: usize = 24;
/// How many top-ranked results receive a narrative explanation
pub const DEFAULT_EXPLANATION_COUNT: usize = 3;

/// Errors that can fail a resolution run
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Resolution requires at least one member")]
    EmptyMembers,

    #[error("Room anchor coordinate is required when members set travel limits")]
    MissingAnchor,

    #[error("Directory lookup failed: {0}")]
    Directory(#[from] DirectoryError),
}

/// Inbound contract for one resolution run
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub room_id: String,
    pub anchor: Option<Coordinate>,
    pub members: Vec<RoomMember>,
    pub listings: Vec<RawListing>,
}

/// Output of the pure filter/score/rank sub-pipeline
#[derive(Debug, Clone)]
pub struct PoolOutcome {
    pub eliminations: Vec<Elimination>,
    pub ranked: Vec<RankedRestaurant>,
    /// Malformed listings discarded during normalization
    pub dropped: usize,
}

/// Resolution orchestrator
///
/// Sequences normalization, filtering, scoring, aggregation and ranking,
/// then attaches explanations, and owns the typed failure modes. The
/// pre-enrichment sub-pipeline is synchronous and pure; rerunning it on the
/// same snapshot yields bit-identical output.
#[derive(Debug, Clone)]
pub struct Resolver {
    weights: ScoringWeights,
    pool_limit: usize,
    explanation_count: usize,
}

impl Resolver {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            pool_limit: DEFAULT_POOL_LIMIT,
            explanation_count: DEFAULT_EXPLANATION_COUNT,
        }
    }

    pub fn with_limits(weights: ScoringWeights, pool_limit: usize, explanation_count: usize) -> Self {
        Self {
            weights,
            pool_limit,
            explanation_count,
        }
    }

    /// Run the pure sub-pipeline: normalize, filter, score, aggregate, rank
    ///
    /// Every deduplicated candidate lands in exactly one of
    /// {eliminations, ranked}; malformed listings are dropped beforehand and
    /// only counted.
    pub fn resolve_pool(
        &self,
        anchor: Option<Coordinate>,
        members: &[RoomMember],
        listings: Vec<RawListing>,
    ) -> Result<PoolOutcome, ResolveError> {
        if members.is_empty() {
            return Err(ResolveError::EmptyMembers);
        }

        let distance_in_play = members
            .iter()
            .any(|member| member.preferences.max_distance_meters.is_some());
        if anchor.is_none() && distance_in_play {
            return Err(ResolveError::MissingAnchor);
        }

        let pool = normalize_listings(listings, self.pool_limit);
        let pool_size = pool.candidates.len();

        let outcome = apply_hard_constraints(pool.candidates, anchor, members);
        let ranked = rank_candidates(outcome.passing, anchor, members, &self.weights);

        tracing::info!(
            "Resolved pool of {} candidates: {} ranked, {} eliminated, {} dropped",
            pool_size,
            ranked.len(),
            outcome.eliminations.len(),
            pool.dropped
        );

        Ok(PoolOutcome {
            eliminations: outcome.eliminations,
            ranked,
            dropped: pool.dropped,
        })
    }

    /// Run a full resolution: the pure sub-pipeline plus enrichment
    ///
    /// Pass `narrative: None` to skip the explanation stage entirely.
    pub async fn resolve(
        &self,
        request: ResolutionRequest,
        narrative: Option<&NarrativeClient>,
    ) -> Result<ResolutionResult, ResolveError> {
        let ResolutionRequest {
            room_id,
            anchor,
            members,
            listings,
        } = request;

        let mut outcome = self.resolve_pool(anchor, &members, listings)?;

        if let Some(narrative) = narrative {
            enrich_top_ranked(
                &mut outcome.ranked,
                outcome.eliminations.len(),
                narrative,
                self.explanation_count,
            )
            .await;
        }

        Ok(ResolutionResult {
            id: uuid::Uuid::new_v4().to_string(),
            room_id,
            computed_at: chrono::Utc::now(),
            eliminated_count: outcome.eliminations.len(),
            eliminations: outcome.eliminations,
            ranked_restaurants: outcome.ranked,
        })
    }
}
