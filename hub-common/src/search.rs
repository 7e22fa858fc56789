//! Search scoring and ranking
//!
//! Scores listings against a free-text query and orders them with the
//! tier-based visibility boost applied. Operates over already-fetched
//! records; pagination and limits are the HTTP layer's concern.

use crate::listing::ListingRecord;
use serde::Serialize;

/// Minimum token length kept after tokenization.
///
/// Tokens of 2 characters or fewer ("to", "a", "of") are dropped. This
/// threshold is load-bearing: changing it reorders existing results.
const MIN_TOKEN_LEN: usize = 3;

/// A listing with its computed relevance score
#[derive(Debug, Clone, Serialize)]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: ListingRecord,
    pub score: i64,
}

/// Split a query into scoring tokens: lowercase, whitespace-separated,
/// short tokens dropped
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .map(|t| t.to_string())
        .collect()
}

/// Relevance score for one listing against the tokenized query.
///
/// Per token: +3 for a verbatim keyword match, +2 for a name substring,
/// +1 for a description substring (both case-insensitive). The tier's
/// ranking boost is always added, so an empty token set falls back to
/// pure boost ordering.
fn score_listing(listing: &ListingRecord, tokens: &[String]) -> i64 {
    let name = listing.name.to_lowercase();
    let description = listing.description.to_lowercase();

    let mut score = listing.membership_tier.policy().ranking_boost;
    for token in tokens {
        if listing
            .keywords
            .iter()
            .any(|k| k.to_lowercase() == *token)
        {
            score += 3;
        }
        if name.contains(token.as_str()) {
            score += 2;
        }
        if description.contains(token.as_str()) {
            score += 1;
        }
    }
    score
}

/// Rank listings for a query.
///
/// `category_filter` of None or `"all"` disables category filtering. Results
/// are ordered by score descending, then rating descending; the sort is
/// stable, so equally-scored listings keep their input order and repeated
/// calls over the same input return the same sequence.
pub fn search(
    query: &str,
    category_filter: Option<&str>,
    listings: &[ListingRecord],
) -> Vec<ScoredListing> {
    let tokens = tokenize(query);

    let mut scored: Vec<ScoredListing> = listings
        .iter()
        .filter(|l| match category_filter {
            Some(cat) if cat != "all" => l.category.eq_ignore_ascii_case(cat),
            _ => true,
        })
        .map(|l| ScoredListing {
            score: score_listing(l, &tokens),
            listing: l.clone(),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.listing.rating.total_cmp(&a.listing.rating))
    });

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{ClaimStatus, ListingRecord};
    use crate::tier::MembershipTier;
    use chrono::Utc;
    use uuid::Uuid;

    fn listing(
        name: &str,
        category: &str,
        tier: MembershipTier,
        keywords: &[&str],
        rating: f64,
    ) -> ListingRecord {
        ListingRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.to_string(),
            subcategory: None,
            address: None,
            phone: None,
            website: None,
            description: String::new(),
            membership_tier: tier,
            claim_status: ClaimStatus::Unclaimed,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            photos: vec![],
            rating,
            special_offers: vec![],
            events: vec![],
            owner_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        assert_eq!(tokenize("BBQ in Boerne TX"), vec!["bbq", "boerne"]);
        assert!(tokenize("to a").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_keyword_match_outranks_no_match() {
        // Keyword hits (+3 each) plus the elite boost vs. a zero-score listing
        let listings = vec![
            listing(
                "Hill Country Venue",
                "wedding-vendors",
                MembershipTier::Elite,
                &["wedding", "venue"],
                4.2,
            ),
            listing("Joe's Shop", "retail", MembershipTier::Basic, &[], 4.8),
        ];

        let results = search("wedding venue", None, &listings);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].listing.name, "Hill Country Venue");
        // +3 +3 keywords, +2 "venue" in name, +20 elite boost
        assert_eq!(results[0].score, 28);
        assert_eq!(results[1].score, 0);
    }

    #[test]
    fn test_empty_query_orders_by_boost_then_rating() {
        let listings = vec![
            listing("A", "retail", MembershipTier::Basic, &[], 5.0),
            listing("B", "retail", MembershipTier::Elite, &[], 3.0),
            listing("C", "retail", MembershipTier::Premium, &[], 4.0),
        ];

        // Every token is length <= 2, so only boosts apply
        let results = search("to", None, &listings);
        let names: Vec<&str> = results.iter().map(|r| r.listing.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_category_filter_and_all_sentinel() {
        let listings = vec![
            listing("A", "restaurants", MembershipTier::Basic, &[], 4.0),
            listing("B", "retail", MembershipTier::Basic, &[], 4.0),
        ];

        let filtered = search("", Some("retail"), &listings);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].listing.name, "B");

        assert_eq!(search("", Some("all"), &listings).len(), 2);
        assert!(search("", Some("nonexistent"), &listings).is_empty());
    }

    #[test]
    fn test_tie_break_rating_then_insertion_order() {
        let listings = vec![
            listing("First", "retail", MembershipTier::Basic, &[], 4.0),
            listing("Second", "retail", MembershipTier::Basic, &[], 4.5),
            listing("Third", "retail", MembershipTier::Basic, &[], 4.0),
        ];

        let results = search("", None, &listings);
        let names: Vec<&str> = results.iter().map(|r| r.listing.name.as_str()).collect();
        // Equal scores: rating breaks the tie, then input order (stable sort)
        assert_eq!(names, vec!["Second", "First", "Third"]);
    }

    #[test]
    fn test_search_is_deterministic() {
        let listings = vec![
            listing("A", "retail", MembershipTier::Verified, &["bbq"], 4.0),
            listing("B", "retail", MembershipTier::Verified, &["bbq"], 4.0),
            listing("C", "retail", MembershipTier::Basic, &["bbq", "smoked"], 4.0),
        ];

        let first: Vec<(String, i64)> = search("smoked bbq", None, &listings)
            .into_iter()
            .map(|r| (r.listing.name.clone(), r.score))
            .collect();
        for _ in 0..10 {
            let again: Vec<(String, i64)> = search("smoked bbq", None, &listings)
                .into_iter()
                .map(|r| (r.listing.name.clone(), r.score))
                .collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_name_and_description_substrings() {
        let mut l = listing(
            "Boerne Bakery",
            "restaurants",
            MembershipTier::Basic,
            &[],
            4.0,
        );
        l.description = "Fresh sourdough and kolaches daily".to_string();

        let results = search("bakery sourdough", None, &[l]);
        // +2 name substring, +1 description substring
        assert_eq!(results[0].score, 3);
    }
}
