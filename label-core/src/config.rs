use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::normalize::NormalizeRules;

/// Bundled defaults, used whenever the host supplies no settings file.
pub const DEFAULT_SETTINGS_JSON: &str = include_str!("../assets/settings.json");

/// Endpoints and text-cleanup rules shared by the CLI and the browser front end.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Published CSV export of the order spreadsheet.
    pub sheet_url: String,
    /// Webhook receiving synced rows.
    pub webhook_url: String,
    /// Logo placed under every printed label.
    pub logo_url: String,
    #[serde(default)]
    pub rules: NormalizeRules,
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn bundled() -> Self {
        // The bundled file is covered by tests; a parse failure here is a build defect.
        Self::from_json(DEFAULT_SETTINGS_JSON).unwrap_or_else(|e| {
            log::error!("bundled settings are invalid: {e}");
            Settings {
                sheet_url: String::new(),
                webhook_url: String::new(),
                logo_url: String::new(),
                rules: NormalizeRules::default(),
            }
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Append a `cachebust` query parameter so the published export is re-read.
pub fn cache_busted(url: &str, millis: u64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}cachebust={millis}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bundled_settings_parse() {
        let s = Settings::from_json(DEFAULT_SETTINGS_JSON).unwrap();
        assert!(s.sheet_url.contains("format=csv"));
        assert!(s.rules.brands.iter().any(|b| b == "Creed"));
        assert_eq!(
            s.rules.aliases.get("baccarat rouge").map(String::as_str),
            Some("Baccarat Rouge 540")
        );
    }

    #[test]
    fn cache_bust_picks_separator() {
        assert_eq!(cache_busted("https://x/e?format=csv", 42), "https://x/e?format=csv&cachebust=42");
        assert_eq!(cache_busted("https://x/e", 7), "https://x/e?cachebust=7");
    }

    #[test]
    fn rules_default_when_missing() {
        let s = Settings::from_json(r#"{"sheet_url":"a","webhook_url":"b","logo_url":"c"}"#).unwrap();
        assert!(s.rules.brands.is_empty());
    }
}
