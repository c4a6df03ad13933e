use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;

static POSITIVE_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
        "outstanding", "brilliant", "love", "loved", "loving", "best", "better",
        "positive", "happy", "joy", "joyful", "beautiful", "perfect", "awesome",
        "incredible", "magnificent", "delightful", "pleasant", "satisfying", "satisfied",
        "recommend", "recommended", "impressive", "exceptional", "remarkable", "crisp",
        "comfortable", "effortless", "painless", "solid", "sturdy", "efficient",
        "effective", "helpful", "reliable", "trustworthy", "quality", "valuable",
        "favorite", "enjoy", "enjoyed", "exceeded", "flawless", "smooth",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate",
        "hated", "hating", "dislike", "disappointing", "disappointed", "disappoints",
        "failure", "failed", "fail", "failing", "negative", "sad", "unhappy",
        "angry", "annoyed", "frustrated", "frustrating", "problem", "problems",
        "issue", "issues", "defect", "defective", "broken", "crash", "crashed",
        "error", "errors", "mistake", "mistakes", "wrong", "useless", "waste",
        "refund", "return", "returned", "unreliable", "unstable", "flimsy",
        "cheap", "overpriced", "worthless", "garbage", "uncomfortable", "muddy",
    ]
    .into_iter()
    .collect()
});

/// Polarity threshold either side of which a review stops being Neutral.
const NEUTRAL_BAND: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        })
    }
}

/// Lexicon polarity in [-1, 1]: signed ratio of positive to negative word hits.
/// Texts with no lexicon hits score 0.0.
pub fn polarity(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let mut positive = 0usize;
    let mut negative = 0usize;
    for word in lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.len() > 2)
    {
        if POSITIVE_WORDS.contains(word) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(word) {
            negative += 1;
        }
    }

    let total = positive + negative;
    if total == 0 {
        0.0
    } else {
        (positive as f64 - negative as f64) / total as f64
    }
}

/// Three-way bucketing contract: strict inequalities, boundaries are Neutral.
pub fn bucket(polarity: f64) -> Sentiment {
    if polarity > NEUTRAL_BAND {
        Sentiment::Positive
    } else if polarity < -NEUTRAL_BAND {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

pub fn tag(text: &str) -> Sentiment {
    bucket(polarity(text))
}

// ── Tests ──
