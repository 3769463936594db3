use crate::models::RankedRestaurant;
use crate::services::{ExplanationPrompt, NarrativeClient};

/// Deterministic local explanation used whenever the narrative service
/// cannot deliver one.
pub fn fallback_explanation(restaurant: &RankedRestaurant) -> String {
    format!(
        "{} balances the group well with a {:.2} fairness score and a {:.2} average match.",
        restaurant.candidate.name, restaurant.fairness_score, restaurant.mean_score
    )
}

/// Attach narrative explanations to the top of the ranked list
///
/// Each of the first `top_k` entries gets its own isolated call; a slow or
/// failing call neither delays nor breaks the others, and every attempted
/// entry ends up with some explanation. Scores and ordering are never
/// touched, and all writes stay inside the run-local slice.
pub async fn enrich_top_ranked(
    ranked: &mut [RankedRestaurant],
    eliminated_count: usize,
    narrative: &NarrativeClient,
    top_k: usize,
) {
    let count = top_k.min(ranked.len());
    if count == 0 {
        return;
    }

    let mut handles = Vec::with_capacity(count);
    for restaurant in ranked.iter().take(count) {
        let prompt = ExplanationPrompt {
            name: restaurant.candidate.name.clone(),
            mean_score: restaurant.mean_score,
            fairness_score: restaurant.fairness_score,
            eliminated_count,
            key_tradeoffs: restaurant.key_tradeoffs.clone(),
        };
        let client = narrative.clone();

        handles.push(tokio::spawn(async move { client.generate(&prompt).await }));
    }

    for (index, handle) in handles.into_iter().enumerate() {
        let explanation = match handle.await {
            Ok(Ok(text)) => text,
            Ok(Err(error)) => {
                tracing::warn!(
                    "Narrative generation failed for '{}', using local fallback: {}",
                    ranked[index].candidate.name,
                    error
                );
                fallback_explanation(&ranked[index])
            }
            Err(join_error) => {
                tracing::warn!(
                    "Narrative task for '{}' did not complete, using local fallback: {}",
                    ranked[index].candidate.name,
                    join_error
                );
                fallback_explanation(&ranked[index])
            }
        };

        ranked[index].explanation = Some(explanation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, RankedRestaurant};
    use std::collections::BTreeMap;

    fn ranked(name: &str, fairness: f64, mean: f64) -> RankedRestaurant {
        RankedRestaurant {
            candidate: Candidate {
                place_id: name.to_lowercase(),
                name: name.to_string(),
                price_level: Some(2),
                rating: Some(4.2),
                user_ratings_total: Some(50),
                types: vec!["restaurant".to_string()],
                address: None,
                lat: 52.52,
                lng: 13.405,
                is_open_now: None,
            },
            final_score: mean,
            mean_score: mean,
            fairness_score: fairness,
            variance: 0.0,
            min_user_score: mean,
            user_scores: BTreeMap::new(),
            explanation: None,
            key_tradeoffs: vec![],
        }
    }

    #[test]
    fn test_fallback_explanation_is_deterministic() {
        let restaurant = ranked("Bella Napoli", 0.9731, 0.7449);
        let text = fallback_explanation(&restaurant);

        assert_eq!(
            text,
            "Bella Napoli balances the group well with a 0.97 fairness score and a 0.74 average match."
        );
        assert_eq!(text, fallback_explanation(&restaurant));
    }

    #[tokio::test]
    async fn test_enrichment_outage_still_fills_every_slot() {
        // Nothing is listening on this port, so every call fails fast
        let narrative = NarrativeClient::new(
            "http://127.0.0.1:9".to_string(),
            "test_key".to_string(),
            "test-model".to_string(),
            std::time::Duration::from_millis(200),
            90,
        );

        let mut list = vec![
            ranked("First", 0.9, 0.8),
            ranked("Second", 0.8, 0.7),
            ranked("Third", 0.7, 0.6),
            ranked("Fourth", 0.6, 0.5),
        ];
        let scores_before: Vec<f64> = list.iter().map(|r| r.final_score).collect();

        enrich_top_ranked(&mut list, 2, &narrative, 3).await;

        for restaurant in list.iter().take(3) {
            let explanation = restaurant.explanation.as_deref().unwrap();
            assert!(!explanation.is_empty());
            assert!(explanation.contains("balances the group well"));
        }
        // Only the top-K slice is attempted
        assert!(list[3].explanation.is_none());

        // Scores and ordering survive untouched
        let scores_after: Vec<f64> = list.iter().map(|r| r.final_score).collect();
        assert_eq!(scores_before, scores_after);
    }

    #[tokio::test]
    async fn test_top_k_larger_than_list_is_safe() {
        let narrative = NarrativeClient::new(
            "http://127.0.0.1:9".to_string(),
            "test_key".to_string(),
            "test-model".to_string(),
            std::time::Duration::from_millis(200),
            90,
        );

        let mut list = vec![ranked("Only", 0.5, 0.5)];
        enrich_top_ranked(&mut list, 0, &narrative, 3).await;

        assert!(list[0].explanation.is_some());
    }
}
