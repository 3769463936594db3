use crate::core::distance::haversine_meters;
use crate::core::normalize::search_text;
use crate::models::{Candidate, Coordinate, DietaryRestriction, Elimination, RoomMember};

/// Partition produced by the hard-constraint filter
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub passing: Vec<Candidate>,
    pub eliminations: Vec<Elimination>,
}

/// Check whether a candidate's searchable text carries evidence for a
/// dietary restriction.
pub fn satisfies_dietary(candidate_text: &str, restriction: DietaryRestriction) -> bool {
    restriction
        .synonyms()
        .iter()
        .any(|synonym| candidate_text.contains(synonym))
}

/// Apply every member's hard rules to every candidate
///
/// A single violation by a single member eliminates the candidate. Violation
/// reasons across all members are collected and deduplicated by exact string
/// match. Distance is only evaluated when the run has an anchor coordinate
/// and the member declares a travel limit; a missing price tier is never a
/// budget violation.
///
/// Pure function: the same (candidates, anchor, members) input always yields
/// the same partition.
pub fn apply_hard_constraints(
    candidates: Vec<Candidate>,
    anchor: Option<Coordinate>,
    members: &[RoomMember],
) -> FilterOutcome {
    let mut passing = Vec::new();
    let mut eliminations = Vec::new();

    for candidate in candidates {
        let candidate_text = search_text(&candidate);
        let distance_meters = anchor.map(|anchor| haversine_meters(anchor, candidate.coordinate()));
        let mut reasons: Vec<String> = Vec::new();

        for member in members {
            let preferences = &member.preferences;

            if let Some(price_level) = candidate.price_level {
                if price_level > preferences.budget_max {
                    reasons.push(format!(
                        "{}: price level {} exceeds budget {}",
                        member.name, price_level, preferences.budget_max
                    ));
                }
            }

            if let (Some(distance), Some(max_distance)) =
                (distance_meters, preferences.max_distance_meters)
            {
                if distance > max_distance {
                    reasons.push(format!(
                        "{}: distance {}m exceeds max {}m",
                        member.name,
                        distance.round() as i64,
                        max_distance.round() as i64
                    ));
                }
            }

            for restriction in &preferences.dietary_restrictions {
                if !satisfies_dietary(&candidate_text, *restriction) {
                    reasons.push(format!(
                        "{}: does not satisfy {}",
                        member.name,
                        restriction.label()
                    ));
                }
            }
        }

        if reasons.is_empty() {
            passing.push(candidate);
        } else {
            dedupe_preserving_order(&mut reasons);
            eliminations.push(Elimination {
                place_id: candidate.place_id,
                name: candidate.name,
                reasons,
            });
        }
    }

    FilterOutcome {
        passing,
        eliminations,
    }
}

fn dedupe_preserving_order(reasons: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    reasons.retain(|reason| seen.insert(reason.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberPreferences, Vibe};

    fn candidate(id: &str, price_level: Option<u8>, types: &[&str]) -> Candidate {
        Candidate {
            place_id: id.to_string(),
            name: format!("Place {}", id),
            price_level,
            rating: Some(4.2),
            user_ratings_total: Some(80),
            types: types.iter().map(|t| t.to_string()).collect(),
            address: None,
            lat: 52.52,
            lng: 13.405,
            is_open_now: Some(true),
        }
    }

    fn member(name: &str, budget_max: u8, restrictions: Vec<DietaryRestriction>) -> RoomMember {
        RoomMember {
            id: name.to_lowercase(),
            name: name.to_string(),
            is_host: false,
            joined_at: None,
            preferences: MemberPreferences {
                budget_max,
                dietary_restrictions: restrictions,
                cuisine_preferences: vec![],
                vibe_preference: Vibe::Casual,
                max_distance_meters: Some(2_000.0),
            },
        }
    }

    fn anchor() -> Coordinate {
        Coordinate { lat: 52.52, lng: 13.405 }
    }

    #[test]
    fn test_price_at_ceiling_is_not_a_violation() {
        let outcome = apply_hard_constraints(
            vec![candidate("x", Some(2), &["restaurant"])],
            Some(anchor()),
            &[member("Ana", 2, vec![])],
        );

        assert_eq!(outcome.passing.len(), 1);
        assert!(outcome.eliminations.is_empty());
    }

    #[test]
    fn test_price_above_ceiling_eliminates() {
        let outcome = apply_hard_constraints(
            vec![candidate("x", Some(2), &["restaurant"])],
            Some(anchor()),
            &[member("Ana", 1, vec![])],
        );

        assert!(outcome.passing.is_empty());
        assert_eq!(outcome.eliminations.len(), 1);
        assert!(outcome.eliminations[0].reasons[0].contains("budget"));
    }

    #[test]
    fn test_missing_price_level_never_violates_budget() {
        let outcome = apply_hard_constraints(
            vec![candidate("x", None, &["restaurant"])],
            Some(anchor()),
            &[member("Ana", 0, vec![])],
        );

        assert_eq!(outcome.passing.len(), 1);
    }

    #[test]
    fn test_distance_at_exact_maximum_passes() {
        // ~2000m north of the anchor; strict > comparison keeps it alive
        let mut far = candidate("x", None, &["restaurant"]);
        far.lat = 52.52 + 2_000.0 / 111_320.0;

        let mut m = member("Ana", 4, vec![]);
        let exact = haversine_meters(anchor(), far.coordinate());
        m.preferences.max_distance_meters = Some(exact);

        let outcome = apply_hard_constraints(vec![far], Some(anchor()), &[m]);
        assert_eq!(outcome.passing.len(), 1);
    }

    #[test]
    fn test_distance_beyond_maximum_eliminates() {
        let mut far = candidate("x", None, &["restaurant"]);
        far.lat = 52.6;

        let outcome =
            apply_hard_constraints(vec![far], Some(anchor()), &[member("Ana", 4, vec![])]);
        assert_eq!(outcome.eliminations.len(), 1);
        assert!(outcome.eliminations[0].reasons[0].contains("distance"));
    }

    #[test]
    fn test_no_anchor_skips_distance_for_everyone() {
        let mut far = candidate("x", None, &["restaurant"]);
        far.lat = 10.0;
        far.lng = 10.0;

        let outcome = apply_hard_constraints(vec![far], None, &[member("Ana", 4, vec![])]);
        assert_eq!(outcome.passing.len(), 1);
    }

    #[test]
    fn test_vegan_listing_satisfies_vegetarian_but_not_vice_versa() {
        let vegan_spot = candidate("v", None, &["vegan", "restaurant"]);
        let vegetarian_spot = candidate("w", None, &["vegetarian", "restaurant"]);

        let vegetarian_member = member("Ana", 4, vec![DietaryRestriction::Vegetarian]);
        let vegan_member = member("Ben", 4, vec![DietaryRestriction::Vegan]);

        let outcome = apply_hard_constraints(
            vec![vegan_spot.clone()],
            Some(anchor()),
            &[vegetarian_member.clone()],
        );
        assert_eq!(outcome.passing.len(), 1, "vegan listing satisfies vegetarian");

        let outcome =
            apply_hard_constraints(vec![vegetarian_spot], Some(anchor()), &[vegan_member]);
        assert_eq!(outcome.eliminations.len(), 1, "vegetarian listing fails vegan");
    }

    #[test]
    fn test_gluten_free_synonyms() {
        let celiac_friendly = candidate("g", None, &["celiac", "bakery"]);
        let hyphenated = {
            let mut c = candidate("h", None, &["bakery"]);
            c.name = "Gluten-Free Goods".to_string();
            c
        };

        let m = member("Ana", 4, vec![DietaryRestriction::GlutenFree]);

        let outcome = apply_hard_constraints(
            vec![celiac_friendly, hyphenated],
            Some(anchor()),
            &[m],
        );
        assert_eq!(outcome.passing.len(), 2);
    }

    #[test]
    fn test_reasons_are_deduplicated_across_members() {
        // Two members share the same name, producing identical reason strings
        let outcome = apply_hard_constraints(
            vec![candidate("x", Some(3), &["restaurant"])],
            Some(anchor()),
            &[member("Ana", 1, vec![]), member("Ana", 1, vec![])],
        );

        assert_eq!(outcome.eliminations.len(), 1);
        assert_eq!(outcome.eliminations[0].reasons.len(), 1);
    }

    #[test]
    fn test_two_member_example_collects_both_of_anas_reasons() {
        // Ana: budget 1, vegetarian, 2000m. Ben: budget 3, unrestricted, 2000m.
        // The candidate is priced at tier 2, ~1800m away, tagged bar/restaurant.
        let mut x = candidate("x", Some(2), &["bar", "restaurant"]);
        x.lat = 52.52 + 1_800.0 / 111_320.0;

        let ana = member("Ana", 1, vec![DietaryRestriction::Vegetarian]);
        let ben = member("Ben", 3, vec![]);

        let outcome = apply_hard_constraints(vec![x], Some(anchor()), &[ana, ben]);

        assert_eq!(outcome.eliminations.len(), 1);
        let reasons = &outcome.eliminations[0].reasons;
        assert_eq!(reasons.len(), 2);
        assert!(reasons.iter().all(|reason| reason.starts_with("Ana")));
        assert!(reasons.iter().any(|reason| reason.contains("budget")));
        assert!(reasons.iter().any(|reason| reason.contains("vegetarian")));
    }
}
