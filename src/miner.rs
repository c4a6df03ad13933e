use anyhow::{bail, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// One keyword group of a taxonomy: a label and the substring alternation that
/// earns it.
#[derive(Debug, Clone)]
pub struct Group {
    pub label: String,
    pattern: Regex,
}

/// Ordered first-match keyword taxonomy. Group order is a load-bearing
/// contract: the first group whose pattern matches anywhere in the text wins,
/// and rows matching no group get the default label.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    groups: Vec<Group>,
    default_label: String,
}

/// Serde shape for taxonomies loaded from configuration. An ordered array, not
/// a map, because declaration order decides classification.
#[derive(Debug, Deserialize)]
pub struct GroupSpec {
    pub label: String,
    pub keywords: Vec<String>,
}

impl Taxonomy {
    pub fn new(default_label: impl Into<String>, groups: Vec<Group>) -> Self {
        Taxonomy {
            groups,
            default_label: default_label.into(),
        }
    }

    /// Build a taxonomy from an ordered list of group specs.
    pub fn from_spec(default_label: impl Into<String>, specs: &[GroupSpec]) -> Result<Self> {
        let mut groups = Vec::with_capacity(specs.len());
        for spec in specs {
            if spec.keywords.is_empty() {
                bail!("taxonomy group '{}' has no keywords", spec.label);
            }
            groups.push(group(
                &spec.label,
                &spec.keywords.iter().map(String::as_str).collect::<Vec<_>>(),
            ));
        }
        Ok(Taxonomy::new(default_label, groups))
    }

    /// Product components recognized in complaint verbatims.
    pub fn components() -> Self {
        Taxonomy::new(
            "Other",
            vec![
                group("Radio Unit", &["radio", "audio", "stereo", "tuner"]),
                group("Display Screen", &["screen", "display", "monitor", "touch", "lcd"]),
                group("Camera System", &["camera", "lens", "image", "video"]),
                group("Battery/Power", &["battery", "voltage", "power", "charge"]),
                group("Bluetooth", &["bluetooth", "phone", "pair", "connect"]),
            ],
        )
    }

    /// Failure modes recognized in complaint verbatims.
    pub fn failures() -> Self {
        Taxonomy::new(
            "Unknown",
            vec![
                group("Blank Screen", &["blank", "black", "dark", "off"]),
                group("Electrical Short", &["short", "fuse", "circuit", "wire", "burn"]),
                group("System Freeze", &["freeze", "frozen", "lock", "hang", "stuck"]),
                group("Audio Noise", &["noise", "static", "hum", "buzz", "sound"]),
            ],
        )
    }

    /// First group whose pattern matches, in declared order; default otherwise.
    pub fn classify(&self, text: &str) -> &str {
        self.groups
            .iter()
            .find(|g| g.pattern.is_match(text))
            .map(|g| g.label.as_str())
            .unwrap_or(&self.default_label)
    }
}

/// Classify one row's free-text fields: concatenated with a space, lowercased,
/// then matched against both taxonomies independently.
pub fn mine_row(
    causal: &str,
    customer: &str,
    components: &Taxonomy,
    failures: &Taxonomy,
) -> (String, String) {
    let text = format!("{} {}", causal, customer).to_lowercase();
    (
        components.classify(&text).to_string(),
        failures.classify(&text).to_string(),
    )
}

fn group(label: &str, keywords: &[&str]) -> Group {
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Group {
        label: label.to_string(),
        pattern: RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .unwrap(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_follows_declared_order() {
        let components = Taxonomy::components();
        // Camera System is declared before Battery/Power
        let text = "the battery died and the camera flickered";
        assert_eq!(components.classify(text), "Camera System");
    }

    #[test]
    fn unmatched_rows_get_defaults() {
        let components = Taxonomy::components();
        let failures = Taxonomy::failures();
        let (comp, fail) = mine_row("it rattles when driving", "", &components, &failures);
        assert_eq!(comp, "Other");
        assert_eq!(fail, "Unknown");
    }

    #[test]
    fn blank_screen_row() {
        let components = Taxonomy::components();
        let failures = Taxonomy::failures();
        let (comp, fail) = mine_row("screen is blank after update", "", &components, &failures);
        assert_eq!(comp, "Display Screen");
        assert_eq!(fail, "Blank Screen");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let failures = Taxonomy::failures();
        assert_eq!(failures.classify("LOUD BUZZING"), "Audio Noise");
    }

    #[test]
    fn classification_is_idempotent() {
        let components = Taxonomy::components();
        let failures = Taxonomy::failures();
        let causal = "camera image frozen";
        let customer = "battery drained overnight";
        let first = mine_row(causal, customer, &components, &failures);
        let second = mine_row(causal, customer, &components, &failures);
        assert_eq!(first, second);
        assert_eq!(first.0, "Camera System");
        assert_eq!(first.1, "System Freeze");
    }

    #[test]
    fn spec_loaded_taxonomy_keeps_order() {
        let specs: Vec<GroupSpec> = serde_json::from_str(
            r#"[
                {"label": "Strap", "keywords": ["strap", "band"]},
                {"label": "Clasp", "keywords": ["clasp", "band"]}
            ]"#,
        )
        .unwrap();
        let taxonomy = Taxonomy::from_spec("Other", &specs).unwrap();
        // "band" is in both groups; the first declared wins
        assert_eq!(taxonomy.classify("the band snapped"), "Strap");
        assert_eq!(taxonomy.classify("nothing relevant"), "Other");
    }

    #[test]
    fn empty_keyword_group_is_rejected() {
        let specs = vec![GroupSpec {
            label: "Empty".to_string(),
            keywords: vec![],
        }];
        assert!(Taxonomy::from_spec("Other", &specs).is_err());
    }
}
