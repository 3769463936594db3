// Core pipeline exports
pub mod distance;
pub mod enrich;
pub mod fairness;
pub mod filters;
pub mod normalize;
pub mod ranking;
pub mod resolver;
pub mod scoring;

pub use distance::haversine_meters;
pub use enrich::{enrich_top_ranked, fallback_explanation};
pub use fairness::{compute_final_score, FairnessMetrics};
pub use filters::{apply_hard_constraints, FilterOutcome};
pub use normalize::{fold_text, normalize_listings, search_text, NormalizedPool};
pub use ranking::rank_candidates;
pub use resolver::{PoolOutcome, ResolutionRequest, ResolveError, Resolver};
pub use scoring::score_member;
