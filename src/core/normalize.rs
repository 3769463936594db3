use crate::models::{Candidate, RawListing};

/// Result of cleaning a raw directory pool
#[derive(Debug, Clone)]
pub struct NormalizedPool {
    pub candidates: Vec<Candidate>,
    /// Listings discarded for missing id, name or coordinate. Counted for
    /// observability only; never surfaced as eliminations.
    pub dropped: usize,
}

/// Fold free text for matching: lowercase, punctuation to spaces,
/// collapsed whitespace.
pub fn fold_text(value: &str) -> String {
    let mut folded = String::with_capacity(value.len());
    let mut last_was_space = true;

    for ch in value.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                folded.push(lower);
            }
            last_was_space = false;
        } else if !last_was_space {
            folded.push(' ');
            last_was_space = true;
        }
    }

    while folded.ends_with(' ') {
        folded.pop();
    }

    folded
}

/// Searchable text of a candidate: name + address + category tags, folded.
pub fn search_text(candidate: &Candidate) -> String {
    let mut parts = vec![candidate.name.clone()];
    if let Some(address) = &candidate.address {
        parts.push(address.clone());
    }
    parts.extend(candidate.types.iter().cloned());
    fold_text(&parts.join(" "))
}

/// Normalize text used for dedup keys: fold, with listing-staleness
/// markers removed first so a stale re-listing collides with its twin.
fn key_text(value: &str) -> String {
    let lowered = value.to_lowercase();
    let cleaned = lowered
        .replace("(old listing)", " ")
        .replace("old listing", " ");
    fold_text(&cleaned)
}

/// Dedup key: normalized address when present, else normalized name.
/// The prefixes keep the two namespaces from colliding.
fn listing_key(candidate: &Candidate) -> String {
    let address = candidate
        .address
        .as_deref()
        .map(key_text)
        .unwrap_or_default();

    if !address.is_empty() {
        format!("address:{}", address)
    } else {
        format!("name:{}", key_text(&candidate.name))
    }
}

/// Quality of a listing, used to pick a winner among duplicates
fn quality_score(candidate: &Candidate) -> f64 {
    candidate.rating.unwrap_or(0.0) * 10.0
        + f64::from(candidate.user_ratings_total.unwrap_or(0)) / 100.0
        + if candidate.price_level.is_some() { 2.0 } else { 0.0 }
        + if candidate.is_open_now == Some(true) { 1.0 } else { 0.0 }
}

fn to_candidate(listing: RawListing) -> Option<Candidate> {
    let place_id = listing.place_id.filter(|id| !id.is_empty())?;
    let name = listing.name.filter(|name| !name.is_empty())?;
    let lat = listing.lat?;
    let lng = listing.lng?;

    Some(Candidate {
        place_id,
        name,
        price_level: listing.price_level,
        rating: listing.rating,
        user_ratings_total: listing.user_ratings_total,
        types: listing.types,
        address: listing.address,
        lat,
        lng,
        is_open_now: listing.is_open_now,
    })
}

/// Deduplicate and clean raw directory listings into a canonical pool
///
/// Overlapping upstream queries return the same restaurant more than once;
/// colliding listings are folded down to the highest-quality one (first
/// seen wins an exact quality tie). The surviving pool keeps first-seen
/// order and is truncated to `limit`.
pub fn normalize_listings(listings: Vec<RawListing>, limit: usize) -> NormalizedPool {
    use std::collections::HashMap;

    let mut dropped = 0usize;
    let mut order: Vec<Candidate> = Vec::new();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();

    for listing in listings {
        let candidate = match to_candidate(listing) {
            Some(candidate) => candidate,
            None => {
                dropped += 1;
                continue;
            }
        };

        let key = listing_key(&candidate);
        match slot_by_key.get(&key) {
            Some(&slot) => {
                if quality_score(&candidate) > quality_score(&order[slot]) {
                    order[slot] = candidate;
                }
            }
            None => {
                slot_by_key.insert(key, order.len());
                order.push(candidate);
            }
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} malformed directory listings", dropped);
    }

    order.truncate(limit);

    NormalizedPool {
        candidates: order,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, name: &str, address: Option<&str>) -> RawListing {
        RawListing {
            place_id: Some(id.to_string()),
            name: Some(name.to_string()),
            address: address.map(|a| a.to_string()),
            lat: Some(52.52),
            lng: Some(13.405),
            ..RawListing::default()
        }
    }

    #[test]
    fn test_fold_text_strips_punctuation_and_case() {
        assert_eq!(fold_text("Luigi's  Pizza-Bar!"), "luigi s pizza bar");
        assert_eq!(fold_text("  "), "");
    }

    #[test]
    fn test_key_text_removes_stale_listing_marker() {
        let fresh = listing("a", "Luigi", Some("12 Main St"));
        let stale = listing("b", "Luigi", Some("12 Main St (Old Listing)"));

        assert_eq!(
            listing_key(&to_candidate(fresh).unwrap()),
            listing_key(&to_candidate(stale).unwrap())
        );
    }

    #[test]
    fn test_dedup_by_address_keeps_higher_quality() {
        let mut weak = listing("a", "Luigi", Some("12 Main St"));
        weak.rating = Some(3.0);
        let mut strong = listing("b", "Luigi's Pizza", Some("12 Main St."));
        strong.rating = Some(4.5);
        strong.user_ratings_total = Some(500);

        let pool = normalize_listings(vec![weak, strong], 24);
        assert_eq!(pool.candidates.len(), 1);
        assert_eq!(pool.candidates[0].place_id, "b");
    }

    #[test]
    fn test_dedup_falls_back_to_name_without_address() {
        let first = listing("a", "Soup Spot", None);
        let second = listing("b", "Soup  Spot!", None);

        let pool = normalize_listings(vec![first, second], 24);
        assert_eq!(pool.candidates.len(), 1);
        assert_eq!(pool.candidates[0].place_id, "a");
    }

    #[test]
    fn test_name_and_address_keys_do_not_collide() {
        // A restaurant named like another one's address must stay distinct
        let by_address = listing("a", "Luigi", Some("12 main st"));
        let by_name = listing("b", "12 main st", None);

        let pool = normalize_listings(vec![by_address, by_name], 24);
        assert_eq!(pool.candidates.len(), 2);
    }

    #[test]
    fn test_malformed_listings_are_dropped_and_counted() {
        let missing_name = RawListing {
            place_id: Some("a".to_string()),
            lat: Some(1.0),
            lng: Some(1.0),
            ..RawListing::default()
        };
        let missing_coordinate = RawListing {
            place_id: Some("b".to_string()),
            name: Some("Ghost Kitchen".to_string()),
            ..RawListing::default()
        };
        let valid = listing("c", "Real Place", None);

        let pool = normalize_listings(vec![missing_name, missing_coordinate, valid], 24);
        assert_eq!(pool.candidates.len(), 1);
        assert_eq!(pool.dropped, 2);
    }

    #[test]
    fn test_quality_tie_keeps_first_seen() {
        let first = listing("a", "Twin", Some("1 Same Rd"));
        let second = listing("b", "Twin", Some("1 Same Rd"));

        let pool = normalize_listings(vec![first, second], 24);
        assert_eq!(pool.candidates[0].place_id, "a");
    }

    #[test]
    fn test_pool_truncated_to_limit() {
        let listings: Vec<RawListing> = (0..30)
            .map(|i| listing(&format!("p{}", i), &format!("Place {}", i), None))
            .collect();

        let pool = normalize_listings(listings, 24);
        assert_eq!(pool.candidates.len(), 24);
    }
}
