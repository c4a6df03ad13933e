use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::flatten_text;

static RATING_PHRASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d)\s?out of\s?5").unwrap());
static NAME_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)name|author").unwrap());

static ANY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").unwrap());
static TEXT_BLOCK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, span, div").unwrap());

const NAME_MARKER: &str = "Reviewed by";
/// Chars past the marker before the next space is taken as the name boundary.
/// Deliberately window-based, so names can truncate mid-word; see DESIGN.md.
const NAME_LOOKAHEAD: usize = 15;

pub const DEFAULT_NAME_CONTENT: &str = "BestBuy Customer";
pub const DEFAULT_NAME_ATTRIBUTE: &str = "Anonymous";

/// Digit captured from the rating phrase in flattened text; 0 when absent.
pub fn rating_from_text(text: &str) -> u8 {
    RATING_PHRASE_RE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Leading token of a rating-bearing attribute value ("5 out of 5 stars" → 5).
/// Values not starting with a digit, and absent attributes, give 0. Fractional
/// tokens such as "4.5" degrade to their leading digits.
pub fn rating_from_attr(attr: Option<&str>) -> u8 {
    let Some(attr) = attr else { return 0 };
    if !attr.starts_with(|c: char| c.is_ascii_digit()) {
        return 0;
    }
    let token = attr.split_whitespace().next().unwrap_or("");
    token.parse().ok().unwrap_or_else(|| {
        let digits: String = token.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().unwrap_or(0)
    })
}

/// Bounded-lookahead name rule: the text just after the "Reviewed by" marker,
/// cut at the first space at or beyond a fixed lookahead window. If the window
/// never reaches a space, the rest of the text is taken.
pub fn name_from_text(text: &str) -> String {
    let Some(pos) = text.find(NAME_MARKER) else {
        return DEFAULT_NAME_CONTENT.to_string();
    };
    let tail = &text[pos + NAME_MARKER.len()..];
    let cut = tail
        .char_indices()
        .enumerate()
        .find(|(char_idx, (_, ch))| *char_idx >= NAME_LOOKAHEAD && *ch == ' ')
        .map(|(_, (byte_idx, _))| byte_idx);
    let name = match cut {
        Some(byte_idx) => &tail[..byte_idx],
        None => tail,
    };
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_NAME_CONTENT.to_string()
    } else {
        name.to_string()
    }
}

/// First descendant of the container with a name-like class.
pub fn name_from_container(container: ElementRef<'_>) -> String {
    container
        .select(&ANY_SEL)
        .find(|el| {
            el.value()
                .attr("class")
                .is_some_and(|c| NAME_CLASS_RE.is_match(c))
        })
        .map(|el| flatten_text(el))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME_ATTRIBUTE.to_string())
}

/// Longest flattened text block among the container's text-bearing descendants,
/// skipping rating captions and verification badges. The strictly-greater
/// comparison keeps the first-encountered block on ties.
pub fn body_from_container(container: ElementRef<'_>) -> Option<String> {
    let mut best = String::new();
    let mut best_len = 0usize;
    for el in container.select(&TEXT_BLOCK_SEL) {
        let text = flatten_text(el);
        let len = text.chars().count();
        if len > best_len && !text.contains("out of 5") && !text.contains("Verified") {
            best = text;
            best_len = len;
        }
    }
    (!best.is_empty()).then_some(best)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_div(doc: &Html) -> ElementRef<'_> {
        let sel = Selector::parse("div").unwrap();
        doc.select(&sel).next().unwrap()
    }

    #[test]
    fn rating_phrase_variants() {
        assert_eq!(rating_from_text("rated 4 out of 5 stars"), 4);
        assert_eq!(rating_from_text("4 OUT OF 5"), 4);
        assert_eq!(rating_from_text("4out of 5"), 4);
        assert_eq!(rating_from_text("4 out of5"), 4);
    }

    #[test]
    fn no_rating_phrase_gives_zero() {
        assert_eq!(rating_from_text("a review with no rating in it"), 0);
        assert_eq!(rating_from_text(""), 0);
    }

    #[test]
    fn attr_rating_leading_token() {
        assert_eq!(rating_from_attr(Some("5 out of 5 stars")), 5);
        assert_eq!(rating_from_attr(Some("4.5 out of 5 stars")), 4);
        assert_eq!(rating_from_attr(Some("Rated 4 out of 5")), 0);
        assert_eq!(rating_from_attr(None), 0);
    }

    #[test]
    fn name_window_truncates_after_lookahead() {
        let text = "Reviewed by Jane Doe. 5 out of 5 stars. Works fine.";
        let name = name_from_text(text);
        assert!(name.starts_with("Jane Doe"), "got '{}'", name);
        // Window boundary lands mid-phrase; that is the documented behavior.
        assert_eq!(name, "Jane Doe. 5 out");
    }

    #[test]
    fn name_without_marker_defaults() {
        assert_eq!(
            name_from_text("4 out of 5 stars. Decent product."),
            DEFAULT_NAME_CONTENT
        );
    }

    #[test]
    fn name_marker_with_no_space_past_window_takes_rest() {
        let name = name_from_text("Reviewed by ShortStackUser42");
        assert_eq!(name, "ShortStackUser42");
    }

    #[test]
    fn container_name_by_class() {
        let doc = Html::parse_document(
            "<div class=\"item\"><span class=\"reviewer-name\">Sam K</span><p>text</p></div>",
        );
        assert_eq!(name_from_container(first_div(&doc)), "Sam K");
    }

    #[test]
    fn container_name_defaults_to_anonymous() {
        let doc = Html::parse_document("<div class=\"item\"><p>text only</p></div>");
        assert_eq!(name_from_container(first_div(&doc)), DEFAULT_NAME_ATTRIBUTE);
    }

    #[test]
    fn body_picks_longest_block_skipping_captions() {
        let doc = Html::parse_document(
            "<div class=\"item\">\
             <span>5 out of 5 stars but with lots of extra caption padding text</span>\
             <span>Verified Purchaser with plenty of additional padding text too</span>\
             <p>The actual review body text.</p>\
             <span>short</span>\
             </div>",
        );
        assert_eq!(
            body_from_container(first_div(&doc)).as_deref(),
            Some("The actual review body text.")
        );
    }

    #[test]
    fn body_absent_when_everything_excluded() {
        let doc = Html::parse_document(
            "<div class=\"item\"><span>5 out of 5</span><span>Verified</span></div>",
        );
        assert!(body_from_container(first_div(&doc)).is_none());
    }

    #[test]
    fn body_tie_breaks_to_first_block() {
        let doc = Html::parse_document(
            "<div class=\"item\"><p>first block xx</p><p>other block yy</p></div>",
        );
        assert_eq!(
            body_from_container(first_div(&doc)).as_deref(),
            Some("first block xx")
        );
    }
}
