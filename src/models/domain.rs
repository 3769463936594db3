use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Dietary constraints with a fixed vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryRestriction {
    Vegetarian,
    Vegan,
    Halal,
    Kosher,
    GlutenFree,
}

impl DietaryRestriction {
    /// Wire-format label, also used in elimination reasons
    pub fn label(&self) -> &'static str {
        match self {
            DietaryRestriction::Vegetarian => "vegetarian",
            DietaryRestriction::Vegan => "vegan",
            DietaryRestriction::Halal => "halal",
            DietaryRestriction::Kosher => "kosher",
            DietaryRestriction::GlutenFree => "gluten_free",
        }
    }

    /// Substring synonyms accepted as evidence that a listing can serve
    /// the restriction. The matching is intentionally asymmetric: "vegan"
    /// satisfies vegetarian, but "vegetarian" does not satisfy vegan.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            DietaryRestriction::Vegetarian => &["vegetarian", "vegan"],
            DietaryRestriction::Vegan => &["vegan"],
            DietaryRestriction::Halal => &["halal"],
            DietaryRestriction::Kosher => &["kosher"],
            DietaryRestriction::GlutenFree => &["gluten free", "gluten-free", "celiac"],
        }
    }
}

/// Vibe categories with a fixed vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    Quiet,
    Hype,
    Aesthetic,
    Casual,
}

impl Vibe {
    /// Keywords whose presence in a listing's searchable text counts as a
    /// vibe hit. Compound terms are space-separated to line up with the
    /// punctuation-folded haystack.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Vibe::Quiet => &["quiet", "cozy", "romantic", "fine dining", "cafe", "bistro"],
            Vibe::Hype => &["bar", "night", "club", "pub", "karaoke", "live music"],
            Vibe::Aesthetic => &["trendy", "stylish", "brunch", "rooftop", "cocktail", "dessert"],
            Vibe::Casual => &["casual", "fast food", "quick", "diner", "takeout"],
        }
    }
}

/// Untrusted row from the restaurant directory service
///
/// Any field may be absent; listings missing id, name or coordinate are
/// dropped during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(rename = "placeId", default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "priceLevel", default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(rename = "userRatingsTotal", default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(rename = "isOpenNow", default)]
    pub is_open_now: Option<bool>,
}

/// Canonical restaurant candidate, immutable for one resolution run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "placeId")]
    pub place_id: String,
    pub name: String,
    #[serde(rename = "priceLevel", default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(rename = "userRatingsTotal", default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "isOpenNow", default, skip_serializing_if = "Option::is_none")]
    pub is_open_now: Option<bool>,
}

impl Candidate {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// One member's preference snapshot, read at resolution start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberPreferences {
    #[serde(rename = "budgetMax")]
    pub budget_max: u8,
    #[serde(rename = "dietaryRestrictions", default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    #[serde(rename = "cuisinePreferences", default)]
    pub cuisine_preferences: Vec<String>,
    #[serde(rename = "vibePreference")]
    pub vibe_preference: Vibe,
    #[serde(rename = "maxDistanceMeters", default)]
    pub max_distance_meters: Option<f64>,
}

/// Room participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMember {
    pub id: String,
    pub name: String,
    #[serde(rename = "isHost", default)]
    pub is_host: bool,
    #[serde(rename = "joinedAt", default)]
    pub joined_at: Option<chrono::DateTime<chrono::Utc>>,
    pub preferences: MemberPreferences,
}

/// External room status flags, owned by the room subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Lobby,
    Resolving,
    Complete,
    Error,
}

/// Anchor location of a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomLocation {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
}

/// Room snapshot fetched from the room service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub code: String,
    pub status: RoomStatus,
    pub location: RoomLocation,
    #[serde(default)]
    pub members: BTreeMap<String, RoomMember>,
    #[serde(rename = "latestResultId", default)]
    pub latest_result_id: Option<String>,
}

impl Room {
    /// Anchor coordinate when the room location carries real coordinates.
    /// Rooms created from a bare city label store (0, 0).
    pub fn anchor(&self) -> Option<Coordinate> {
        if self.location.lat != 0.0 || self.location.lng != 0.0 {
            Some(Coordinate {
                lat: self.location.lat,
                lng: self.location.lng,
            })
        } else {
            None
        }
    }
}

/// Per-(candidate, member) satisfaction breakdown, all sub-scores in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub cuisine: f64,
    pub vibe: f64,
    #[serde(rename = "budgetComfort")]
    pub budget_comfort: f64,
    #[serde(rename = "distanceComfort")]
    pub distance_comfort: f64,
    pub total: f64,
}

/// Candidate removed by a hard constraint, with deduplicated reasons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Elimination {
    #[serde(rename = "placeId")]
    pub place_id: String,
    pub name: String,
    pub reasons: Vec<String>,
}

/// Candidate that survived filtering, with aggregate fairness metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRestaurant {
    #[serde(flatten)]
    pub candidate: Candidate,
    #[serde(rename = "finalScore")]
    pub final_score: f64,
    #[serde(rename = "meanScore")]
    pub mean_score: f64,
    #[serde(rename = "fairnessScore")]
    pub fairness_score: f64,
    pub variance: f64,
    #[serde(rename = "minUserScore")]
    pub min_user_score: f64,
    #[serde(rename = "userScores")]
    pub user_scores: BTreeMap<String, ScoreBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(rename = "keyTradeoffs")]
    pub key_tradeoffs: Vec<String>,
}

/// Top-level output of one resolution run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub id: String,
    #[serde(rename = "roomId")]
    pub room_id: String,
    #[serde(rename = "computedAt")]
    pub computed_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "eliminatedCount")]
    pub eliminated_count: usize,
    pub eliminations: Vec<Elimination>,
    #[serde(rename = "rankedRestaurants")]
    pub ranked_restaurants: Vec<RankedRestaurant>,
}

/// Scoring weights and fairness policy constants
///
/// Read once at process start from configuration and injected into the
/// resolver; the four sub-score weights sum to 1 and are shared across all
/// members and candidates.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub cuisine: f64,
    pub vibe: f64,
    pub budget_comfort: f64,
    pub distance_comfort: f64,
    pub variance_penalty: f64,
    pub low_floor_penalty: f64,
    pub low_floor_threshold: f64,
    pub rating_bonus_cap: f64,
    pub cuisine_neutral: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cuisine: 0.4,
            vibe: 0.2,
            budget_comfort: 0.2,
            distance_comfort: 0.2,
            variance_penalty: 0.6,
            low_floor_penalty: 0.4,
            low_floor_threshold: 0.35,
            rating_bonus_cap: 0.05,
            cuisine_neutral: 0.65,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dietary_restriction_labels_match_wire_format() {
        let json = serde_json::to_string(&DietaryRestriction::GlutenFree).unwrap();
        assert_eq!(json, "\"gluten_free\"");
        assert_eq!(DietaryRestriction::GlutenFree.label(), "gluten_free");
    }

    #[test]
    fn test_vegan_synonyms_do_not_include_vegetarian() {
        assert!(DietaryRestriction::Vegetarian.synonyms().contains(&"vegan"));
        assert!(!DietaryRestriction::Vegan.synonyms().contains(&"vegetarian"));
    }

    #[test]
    fn test_room_anchor_requires_nonzero_coordinates() {
        let room = Room {
            id: "room1".to_string(),
            code: "ABCD".to_string(),
            status: RoomStatus::Lobby,
            location: RoomLocation {
                label: "Berlin".to_string(),
                lat: 0.0,
                lng: 0.0,
            },
            members: BTreeMap::new(),
            latest_result_id: None,
        };
        assert!(room.anchor().is_none());

        let mut located = room.clone();
        located.location.lat = 52.52;
        located.location.lng = 13.405;
        assert!(located.anchor().is_some());
    }

    #[test]
    fn test_ranked_restaurant_serializes_flat() {
        let candidate = Candidate {
            place_id: "p1".to_string(),
            name: "Trattoria".to_string(),
            price_level: Some(2),
            rating: Some(4.5),
            user_ratings_total: Some(120),
            types: vec!["restaurant".to_string()],
            address: Some("1 Main St".to_string()),
            lat: 52.52,
            lng: 13.405,
            is_open_now: Some(true),
        };
        let ranked = RankedRestaurant {
            candidate,
            final_score: 0.71,
            mean_score: 0.74,
            fairness_score: 0.99,
            variance: 0.01,
            min_user_score: 0.6,
            user_scores: BTreeMap::new(),
            explanation: None,
            key_tradeoffs: vec![],
        };

        let value = serde_json::to_value(&ranked).unwrap();
        // Candidate fields sit at the top level next to the metrics
        assert_eq!(value["placeId"], "p1");
        assert_eq!(value["finalScore"], 0.71);
        assert!(value.get("explanation").is_none());
    }
}
