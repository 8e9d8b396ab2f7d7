use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRule {
    pub label: String,
    pub triggers: Vec<String>,
}

// Rules are an ordered list, not a map: the first matching label wins,
// so declaration order carries meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub default: String,
    pub rules: Vec<LabelRule>,
}

impl RuleSet {
    pub fn classify(&self, text: &str) -> &str {
        let text = text.to_lowercase();
        for rule in &self.rules {
            if rule
                .triggers
                .iter()
                .any(|trigger| text.contains(&trigger.to_lowercase()))
            {
                return &rule.label;
            }
        }
        &self.default
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub category: RuleSet,
    pub sentiment: RuleSet,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            category: category_rules(),
            sentiment: sentiment_rules(),
        }
    }
}

impl ClassifierConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read rules file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse rules file {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

fn rule(label: &str, triggers: &[&str]) -> LabelRule {
    LabelRule {
        label: label.to_string(),
        triggers: triggers.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn category_rules() -> RuleSet {
    RuleSet {
        default: "Uncategorized".to_string(),
        rules: vec![
            rule("Theft", &["stole", "robbed", "theft"]),
            rule("Vandalism", &["vandalized", "damaged"]),
            rule("Assault", &["assaulted", "hit"]),
            rule("Cybercrime", &["hacked", "scam"]),
        ],
    }
}

pub fn sentiment_rules() -> RuleSet {
    RuleSet {
        default: "Neutral".to_string(),
        rules: vec![
            rule("Urgent", &["urgent", "immediately", "help"]),
            rule("Neutral", &["reporting", "incident"]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_first_label_with_a_trigger() {
        let rules = category_rules();
        assert_eq!(rules.classify("My bike was stolen last night"), "Theft");
        assert_eq!(rules.classify("Someone vandalized the bus stop"), "Vandalism");
        assert_eq!(rules.classify("My account was hacked"), "Cybercrime");
    }

    #[test]
    fn earlier_declared_label_wins_when_both_match() {
        let rules = category_rules();
        // "stole" (Theft) and "damaged" (Vandalism) both appear.
        assert_eq!(
            rules.classify("They stole the sign and damaged the wall"),
            "Theft"
        );
    }

    #[test]
    fn falls_back_to_default_when_nothing_matches() {
        let rules = category_rules();
        assert_eq!(rules.classify("A strange noise at night"), "Uncategorized");
        assert_eq!(rules.classify(""), "Uncategorized");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let rules = category_rules();
        assert_eq!(rules.classify("MY PHONE WAS STOLEN"), "Theft");

        let mixed_case = RuleSet {
            default: "None".to_string(),
            rules: vec![rule("Theft", &["Stolen"])],
        };
        assert_eq!(mixed_case.classify("my phone was stolen"), "Theft");
    }

    #[test]
    fn empty_rule_list_always_yields_default() {
        let rules = RuleSet {
            default: "Neutral".to_string(),
            rules: Vec::new(),
        };
        assert_eq!(rules.classify("urgent help needed"), "Neutral");
    }

    #[test]
    fn sentiment_defaults_apply_independently() {
        let rules = sentiment_rules();
        assert_eq!(rules.classify("please send help immediately"), "Urgent");
        assert_eq!(rules.classify("reporting a broken window"), "Neutral");
        assert_eq!(rules.classify("nothing matches here"), "Neutral");
    }

    #[test]
    fn config_parses_from_json() {
        let raw = r#"{
            "category": {
                "default": "Other",
                "rules": [
                    { "label": "Burglary", "triggers": ["break-in", "burgled"] }
                ]
            },
            "sentiment": {
                "default": "Calm",
                "rules": [
                    { "label": "Panicked", "triggers": ["emergency"] }
                ]
            }
        }"#;
        let config: ClassifierConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.category.classify("a break-in on main street"), "Burglary");
        assert_eq!(config.category.classify("lost wallet"), "Other");
        assert_eq!(config.sentiment.classify("this is an emergency"), "Panicked");
    }
}
