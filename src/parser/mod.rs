pub mod fields;
pub mod locate;
pub mod sentiment;

use std::collections::HashSet;

use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::debug;

use sentiment::Sentiment;

/// One extracted review. Field names are the output-table column contract.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    #[serde(rename = "Reviewer Name")]
    pub reviewer: String,
    #[serde(rename = "Rating")]
    pub rating: u8,
    #[serde(rename = "Review Text")]
    pub body: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: Sentiment,
}

/// The two candidate-location heuristics, tried in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ContentShape,
    AttributeScan,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::ContentShape, Strategy::AttributeScan];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::ContentShape => "content-shape",
            Strategy::AttributeScan => "attribute-scan",
        }
    }

    fn run(self, doc: &Html) -> Vec<Review> {
        match self {
            Strategy::ContentShape => extract_from_list_items(doc),
            Strategy::AttributeScan => extract_from_attributes(doc),
        }
    }
}

pub struct Extraction {
    pub reviews: Vec<Review>,
    /// Which strategy produced the records; None when both came up empty.
    pub strategy: Option<Strategy>,
}

/// Try each strategy in order; the first yielding records wins. Records are
/// deduplicated by body text, first occurrence kept.
pub fn extract_reviews(doc: &Html) -> Extraction {
    for strategy in Strategy::ALL {
        let reviews = dedup_by_body(strategy.run(doc));
        if !reviews.is_empty() {
            debug!("{} scan produced {} reviews", strategy.name(), reviews.len());
            return Extraction {
                reviews,
                strategy: Some(strategy),
            };
        }
        debug!("{} scan produced nothing, trying next", strategy.name());
    }
    Extraction {
        reviews: Vec::new(),
        strategy: None,
    }
}

/// Content-shape records: the whole flattened list-item text is the body,
/// rating phrase deliberately retained for context.
fn extract_from_list_items(doc: &Html) -> Vec<Review> {
    locate::list_item_candidates(doc)
        .into_iter()
        .filter_map(|item| {
            let body = flatten_text(item);
            if body.is_empty() {
                return None;
            }
            let rating = fields::rating_from_text(&body);
            let reviewer = fields::name_from_text(&body);
            let sentiment = sentiment::tag(&body);
            Some(Review {
                reviewer,
                rating,
                body,
                sentiment,
            })
        })
        .collect()
}

/// Attribute-scan records: fields recovered independently from the widened
/// container. A candidate with no qualifying body block is skipped, never
/// aborting the batch.
fn extract_from_attributes(doc: &Html) -> Vec<Review> {
    locate::attribute_candidates(doc)
        .into_iter()
        .filter_map(|anchor| {
            let rating = fields::rating_from_attr(anchor.rating_attr);
            let reviewer = fields::name_from_container(anchor.container);
            let Some(body) = fields::body_from_container(anchor.container) else {
                debug!("candidate without qualifying body text, skipped");
                return None;
            };
            let sentiment = sentiment::tag(&body);
            Some(Review {
                reviewer,
                rating,
                body,
                sentiment,
            })
        })
        .collect()
}

/// No two output records share identical body text.
fn dedup_by_body(reviews: Vec<Review>) -> Vec<Review> {
    let mut seen = HashSet::new();
    reviews
        .into_iter()
        .filter(|r| seen.insert(r.body.clone()))
        .collect()
}

/// Whitespace-joined, trimmed text of a node and its descendants.
pub(crate) fn flatten_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ──
