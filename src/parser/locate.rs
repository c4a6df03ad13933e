use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::flatten_text;

static LI_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static ANY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").unwrap());

static TITLE_RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d\s?out of\s?\d|stars").unwrap());
static RATING_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)rating").unwrap());
static CONTAINER_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)item|content|review").unwrap());

/// Shorter list items are navigation chrome, not review bodies.
pub const MIN_REVIEW_LEN: usize = 50;

/// A rating-bearing node widened to the container holding one review's fields.
pub struct Anchor<'a> {
    pub container: ElementRef<'a>,
    /// Raw value of the rating-bearing title attribute, when the anchor has one.
    pub rating_attr: Option<&'a str>,
}

/// Content-shape scan: every list item whose flattened text carries a rating
/// phrase and is long enough to be a review.
pub fn list_item_candidates(doc: &Html) -> Vec<ElementRef<'_>> {
    doc.select(&LI_SEL)
        .filter(|item| {
            let text = flatten_text(*item);
            let lower = text.to_lowercase();
            (lower.contains("out of 5") || lower.contains("stars"))
                && text.chars().count() > MIN_REVIEW_LEN
        })
        .collect()
}

/// Attribute scan: nodes with a rating-phrase title attribute, falling back to
/// nodes with a rating class when no titles match. Each hit is widened to its
/// enclosing review container; hits with no container are dropped as noise.
pub fn attribute_candidates(doc: &Html) -> Vec<Anchor<'_>> {
    let mut stars: Vec<ElementRef> = doc
        .select(&ANY_SEL)
        .filter(|el| {
            el.value()
                .attr("title")
                .is_some_and(|t| TITLE_RATING_RE.is_match(t))
        })
        .collect();

    if stars.is_empty() {
        stars = doc
            .select(&ANY_SEL)
            .filter(|el| {
                el.value()
                    .attr("class")
                    .is_some_and(|c| RATING_CLASS_RE.is_match(c))
            })
            .collect();
    }

    stars
        .into_iter()
        .filter_map(|star| match enclosing_container(star) {
            Some(container) => Some(Anchor {
                container,
                rating_attr: star.value().attr("title"),
            }),
            None => {
                debug!("rating anchor without an enclosing container, dropped");
                None
            }
        })
        .collect()
}

/// Nearest ancestor list item, else the nearest ancestor div that looks like a
/// review wrapper.
fn enclosing_container(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let ancestors: Vec<ElementRef> = el.ancestors().filter_map(ElementRef::wrap).collect();

    ancestors
        .iter()
        .find(|a| a.value().name() == "li")
        .or_else(|| {
            ancestors.iter().find(|a| {
                a.value().name() == "div"
                    && a.value()
                        .attr("class")
                        .is_some_and(|c| CONTAINER_CLASS_RE.is_match(c))
            })
        })
        .copied()
}

// ── Tests ──
