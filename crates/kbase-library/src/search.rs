//! Document search.
//!
//! When the database's ranked search procedure is unavailable, search falls
//! back to three case-insensitive substring matches (title, extracted text,
//! description). This module merges those lists into one ranked result.
//! Visibility filtering happens afterwards, in the caller.

use std::cmp::Reverse;
use std::collections::HashSet;

use kbase_rbac::{Guarded, Owned};
use kbase_types::{Document, DocumentId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field a query matched, in decreasing relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchField {
    Description,
    ContentText,
    Title,
}

impl MatchField {
    pub fn relevance(self) -> u8 {
        match self {
            MatchField::Title => 3,
            MatchField::ContentText => 2,
            MatchField::Description => 1,
        }
    }
}

/// A document returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub document: Document,
    /// Absent for plain recency listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<u8>,
}

impl Owned for SearchHit {
    fn owner_id(&self) -> &UserId {
        &self.document.created_by
    }
}

impl Guarded for SearchHit {
    fn raw_visibility(&self) -> Option<&Value> {
        self.document.is_public.as_ref()
    }
}

/// Trims the query; `None` when nothing is left.
pub fn normalize_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn contains_ignore_case(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

/// Most relevant field of `document` containing `query`, ignoring case.
pub fn best_match(document: &Document, query: &str) -> Option<MatchField> {
    let needle = query.to_lowercase();
    if contains_ignore_case(Some(&document.title), &needle) {
        Some(MatchField::Title)
    } else if contains_ignore_case(document.content_text.as_deref(), &needle) {
        Some(MatchField::ContentText)
    } else if contains_ignore_case(document.description.as_deref(), &needle) {
        Some(MatchField::Description)
    } else {
        None
    }
}

/// Merges per-field match lists.
///
/// A document appearing in several lists keeps its most relevant match.
/// Output is sorted by relevance, then newest first; ties keep input order.
pub fn merge_matches(
    title: Vec<Document>,
    content_text: Vec<Document>,
    description: Vec<Document>,
) -> Vec<SearchHit> {
    let mut seen: HashSet<DocumentId> = HashSet::new();
    let mut hits: Vec<SearchHit> = Vec::new();

    for (field, docs) in [
        (MatchField::Title, title),
        (MatchField::ContentText, content_text),
        (MatchField::Description, description),
    ] {
        for document in docs {
            if !seen.insert(document.id.clone()) {
                continue;
            }
            hits.push(SearchHit {
                document,
                relevance: Some(field.relevance()),
            });
        }
    }

    hits.sort_by_key(|h| (Reverse(h.relevance), Reverse(h.document.created_at)));
    hits
}

/// Runs the fallback search over rows already fetched.
pub fn search_documents(documents: &[Document], query: &str) -> Vec<SearchHit> {
    let mut title = Vec::new();
    let mut content_text = Vec::new();
    let mut description = Vec::new();

    for document in documents {
        match best_match(document, query) {
            Some(MatchField::Title) => title.push(document.clone()),
            Some(MatchField::ContentText) => content_text.push(document.clone()),
            Some(MatchField::Description) => description.push(document.clone()),
            None => {}
        }
    }

    merge_matches(title, content_text, description)
}

/// Listing for an empty query: newest first, at most `limit` rows.
pub fn recency_listing(documents: &[Document], limit: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = documents
        .iter()
        .cloned()
        .map(|document| SearchHit {
            document,
            relevance: None,
        })
        .collect();
    hits.sort_by_key(|h| Reverse(h.document.created_at));
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn doc(id: &str, title: &str, age_days: i64) -> Document {
        let base = chrono::Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        Document::new(id, title, format!("k/{id}"), "u1", base - Duration::days(age_days))
    }

    fn ids(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.document.id.as_str()).collect()
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  onboarding "), Some("onboarding"));
        assert_eq!(normalize_query("   "), None);
    }

    #[test]
    fn test_best_match_prefers_title() {
        let d = doc("d1", "Onboarding guide", 0)
            .with_content_text("onboarding steps")
            .with_description("Onboarding");
        assert_eq!(best_match(&d, "ONBOARD"), Some(MatchField::Title));

        let d = doc("d2", "Guide", 0).with_description("covers onboarding");
        assert_eq!(best_match(&d, "onboarding"), Some(MatchField::Description));
        assert_eq!(best_match(&d, "payroll"), None);
    }

    #[test]
    fn test_merge_dedupes_and_ranks() {
        let a = doc("a", "A", 5);
        let b = doc("b", "B", 1);
        let c = doc("c", "C", 0);

        let hits = merge_matches(
            vec![a.clone()],
            vec![b.clone(), a.clone()],
            vec![c.clone(), b.clone()],
        );

        assert_eq!(ids(&hits), vec!["a", "b", "c"]);
        assert_eq!(
            hits.iter().map(|h| h.relevance).collect::<Vec<_>>(),
            vec![Some(3), Some(2), Some(1)]
        );
    }

    #[test]
    fn test_merge_orders_ties_by_recency() {
        let old = doc("old", "x", 10);
        let new = doc("new", "x", 1);
        let hits = merge_matches(vec![old, new], vec![], vec![]);
        assert_eq!(ids(&hits), vec!["new", "old"]);
    }

    #[test]
    fn test_search_documents() {
        let docs = vec![
            doc("d1", "Expense policy", 3).with_description("travel"),
            doc("d2", "Travel policy", 2),
            doc("d3", "Holidays", 1).with_content_text("Travel days count as work"),
            doc("d4", "Unrelated", 0),
        ];
        let hits = search_documents(&docs, "travel");
        assert_eq!(ids(&hits), vec!["d2", "d3", "d1"]);
    }

    #[test]
    fn test_recency_listing() {
        let docs = vec![doc("a", "A", 3), doc("b", "B", 1), doc("c", "C", 2)];
        let hits = recency_listing(&docs, 2);
        assert_eq!(ids(&hits), vec!["b", "c"]);
        assert!(hits.iter().all(|h| h.relevance.is_none()));
    }

    #[test]
    fn test_search_hit_serializes_flat() {
        let hit = SearchHit {
            document: doc("d1", "A", 0),
            relevance: Some(3),
        };
        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["id"], "d1");
        assert_eq!(value["relevance"], 3);
    }

    proptest! {
        #[test]
        fn merge_never_duplicates(
            title in prop::collection::vec(0u8..8, 0..8),
            content in prop::collection::vec(0u8..8, 0..8),
            description in prop::collection::vec(0u8..8, 0..8),
        ) {
            let to_docs = |ids: &[u8]| -> Vec<Document> {
                ids.iter().map(|i| doc(&format!("d{i}"), "t", i64::from(*i))).collect()
            };
            let hits = merge_matches(to_docs(&title), to_docs(&content), to_docs(&description));

            let mut seen = std::collections::HashSet::new();
            for hit in &hits {
                prop_assert!(seen.insert(hit.document.id.clone()));
            }
            for pair in hits.windows(2) {
                prop_assert!(pair[0].relevance >= pair[1].relevance);
            }
        }
    }
}
