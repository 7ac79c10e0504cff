//! Blocking access to the order spreadsheet.

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use label_core::config::cache_busted;
use label_core::sync::{RemoteEntry, SyncRow, parse_existing_orders, parse_remote_entries};
use label_core::{Normalizer, Settings};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

pub struct Remote {
    client: Client,
    settings: Settings,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

impl Remote {
    pub fn new(settings: Settings) -> Self {
        Remote {
            client: Client::new(),
            settings,
        }
    }

    /// Current CSV export of the sheet.
    pub fn fetch_sheet(&self) -> Result<String> {
        let url = cache_busted(&self.settings.sheet_url, now_millis());
        log::debug!("remote: GET {url}");
        let text = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .with_context(|| format!("fetching {}", self.settings.sheet_url))?;
        Ok(text)
    }

    pub fn existing_orders(&self) -> Result<BTreeSet<String>> {
        Ok(parse_existing_orders(&self.fetch_sheet()?))
    }

    pub fn entries(&self, normalizer: &Normalizer) -> Result<Vec<RemoteEntry>> {
        Ok(parse_remote_entries(&self.fetch_sheet()?, normalizer))
    }

    /// Hand the rows to the webhook. The reply is not read: the endpoint
    /// does not acknowledge writes, so a sent request is all we know.
    pub fn submit(&self, rows: &[SyncRow]) -> Result<()> {
        let body = serde_json::to_string(rows)?;
        log::info!("remote: posting {} rows", rows.len());
        self.client
            .post(&self.settings.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .with_context(|| format!("posting to {}", self.settings.webhook_url))?;
        Ok(())
    }
}
