//! Product-title cleanup.
//!
//! Titles coming from the shop export carry brand names, marketing phrases and a
//! "Sample -" prefix that do not fit on a bottle label. Cleanup is an ordered list
//! of rules evaluated in a single pass so the behaviour can be audited from the
//! rule set alone.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LabelError, Result};

/// Editable rule set, stored as JSON next to the other settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NormalizeRules {
    /// Brand names removed as whole words.
    #[serde(default)]
    pub brands: Vec<String>,
    /// Other phrases removed as whole words, after brands.
    #[serde(default)]
    pub phrases: Vec<String>,
    /// Exact (case-insensitive) replacements applied to the cleaned title.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Clone, Debug)]
enum Rule {
    Remove(Regex),
    CollapseWhitespace,
    StripPrefix(Regex),
    Alias(HashMap<String, String>),
}

#[derive(Clone, Debug)]
pub struct Normalizer {
    rules: Vec<Rule>,
}

const SAMPLE_PREFIX: &str = r"(?i)^sample\s*-\s*";

impl Normalizer {
    pub fn new(rules: &NormalizeRules) -> Result<Self> {
        let mut out = Vec::with_capacity(rules.brands.len() + rules.phrases.len() + 3);
        for word in rules.brands.iter().chain(rules.phrases.iter()) {
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            out.push(Rule::Remove(whole_word(word)?));
        }
        out.push(Rule::CollapseWhitespace);
        out.push(Rule::StripPrefix(compile(SAMPLE_PREFIX)?));
        let table = rules
            .aliases
            .iter()
            .map(|(k, v)| (collapse_whitespace(k).to_lowercase(), v.clone()))
            .collect();
        out.push(Rule::Alias(table));
        Ok(Self { rules: out })
    }

    /// Normalizer built from the bundled rule set.
    pub fn bundled() -> Self {
        let settings = crate::config::Settings::bundled();
        Self::new(&settings.rules).unwrap_or_else(|e| {
            log::error!("bundled normalizer rules rejected: {e}");
            Self::plain()
        })
    }

    /// Whitespace and prefix cleanup only.
    pub fn plain() -> Self {
        let mut rules = vec![Rule::CollapseWhitespace];
        if let Ok(re) = Regex::new(SAMPLE_PREFIX) {
            rules.push(Rule::StripPrefix(re));
        }
        Self { rules }
    }

    pub fn apply(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for rule in &self.rules {
            match rule {
                Rule::Remove(re) => {
                    if re.is_match(&text) {
                        text = re.replace_all(&text, "").into_owned();
                    }
                }
                Rule::CollapseWhitespace => text = collapse_whitespace(&text),
                Rule::StripPrefix(re) => text = re.replace(&text, "").trim().to_string(),
                Rule::Alias(table) => {
                    if let Some(hit) = table.get(&text.to_lowercase()) {
                        return hit.clone();
                    }
                }
            }
        }
        text
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::bundled()
    }
}

fn whole_word(word: &str) -> Result<Regex> {
    compile(&format!(r"(?i)\b{}\b", regex::escape(word)))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| LabelError::Rule {
        pattern: pattern.to_string(),
        source,
    })
}

/// Collapse whitespace runs to single spaces and trim both ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules() -> NormalizeRules {
        NormalizeRules {
            brands: vec!["Creed".into(), "Bond No.9".into(), "Tom Ford".into()],
            phrases: vec!["Le Vestiaire Des Parfums".into()],
            aliases: BTreeMap::from([("baccarat rouge".to_string(), "Baccarat Rouge 540".to_string())]),
        }
    }

    #[test]
    fn strips_brand_in_any_case() {
        let n = Normalizer::new(&rules()).unwrap();
        assert_eq!(n.apply("Creed Aventus"), "Aventus");
        assert_eq!(n.apply("CREED   Aventus"), "Aventus");
        assert_eq!(n.apply("Green Irish creed Tweed"), "Green Irish Tweed");
    }

    #[test]
    fn only_whole_words_are_removed() {
        let n = Normalizer::new(&rules()).unwrap();
        assert_eq!(n.apply("Creedence"), "Creedence");
    }

    #[test]
    fn special_characters_are_literal() {
        let n = Normalizer::new(&rules()).unwrap();
        assert_eq!(n.apply("Bond No.9 Chinatown"), "Chinatown");
        assert_eq!(n.apply("Bond Nox9 Chinatown"), "Bond Nox9 Chinatown");
    }

    #[test]
    fn phrases_and_sample_prefix() {
        let n = Normalizer::new(&rules()).unwrap();
        assert_eq!(n.apply("Sample - Tom Ford Ombre Leather"), "Ombre Leather");
        assert_eq!(n.apply("sample-Le Vestiaire Des Parfums Tuxedo"), "Tuxedo");
    }

    #[test]
    fn alias_wins_after_cleanup() {
        let n = Normalizer::new(&rules()).unwrap();
        assert_eq!(n.apply("Sample - Baccarat Rouge"), "Baccarat Rouge 540");
        assert_eq!(n.apply("  BACCARAT   rouge "), "Baccarat Rouge 540");
        assert_eq!(n.apply("Baccarat Rouge Extrait"), "Baccarat Rouge Extrait");
    }

    #[test]
    fn empty_input_stays_empty() {
        let n = Normalizer::new(&rules()).unwrap();
        assert_eq!(n.apply(""), "");
        assert_eq!(n.apply("Creed"), "");
    }

    #[test]
    fn bundled_rules_compile() {
        let n = Normalizer::bundled();
        assert_eq!(n.apply("Maison Francis Kurkdjian Gentle Fluidity"), "Gentle Fluidity");
        assert_eq!(n.apply("Sample - Ambre Noir"), "Ambre Noir");
    }
}
