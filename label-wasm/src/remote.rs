//! Network calls against the order spreadsheet.
//!
//! Requests are never cancelled; whichever finishes last wins.

use label_core::config::cache_busted;
use label_core::sync::{SYNC_COOLDOWN_MS, parse_existing_orders, parse_remote_entries};
use label_core::{Command, SyncRow};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Headers, RequestInit, RequestMode, Window};

use crate::state::{Shared, Tab};
use crate::utils::{alert, fetch_text, now_millis, today};
use crate::{dispatch, view};

async fn fetch_sheet(window: &Window, sheet_url: &str) -> Result<String, JsValue> {
    fetch_text(window, &cache_busted(sheet_url, now_millis())).await
}

/// Reload the set of order numbers already present in the sheet.
pub fn refresh_existing(state: Shared) {
    let (window, url) = {
        let s = state.borrow();
        (s.window.clone(), s.settings.sheet_url.clone())
    };
    wasm_bindgen_futures::spawn_local(async move {
        match fetch_sheet(&window, &url).await {
            Ok(csv) => {
                let set = parse_existing_orders(&csv);
                log::info!("remote: {} orders already in the sheet", set.len());
                dispatch(&state, Command::SetExistingOrders(set));
            }
            Err(e) => log::error!("Failed to fetch existing orders: {:?}", e),
        }
    });
}

/// Auto-map the selection. With no local orders the labels come from the sheet.
pub fn auto_map(state: Shared) {
    let needs_remote = {
        let s = state.borrow();
        if s.bench.selection.is_empty() {
            alert(&s.window, &label_core::LabelError::EmptySelection.to_string());
            return;
        }
        s.bench.store.is_empty()
    };
    if !needs_remote {
        dispatch(&state, Command::AutoMap { remote: None });
        return;
    }

    let (window, url) = {
        let mut s = state.borrow_mut();
        s.loading = true;
        view::render_inspector(&s);
        (s.window.clone(), s.settings.sheet_url.clone())
    };
    wasm_bindgen_futures::spawn_local(async move {
        let fetched = fetch_sheet(&window, &url).await;
        state.borrow_mut().loading = false;
        match fetched {
            Ok(csv) => {
                let entries = parse_remote_entries(&csv, state.borrow().bench.normalizer());
                dispatch(&state, Command::AutoMap { remote: Some(entries) });
            }
            Err(e) => {
                log::error!("Error fetching data: {:?}", e);
                alert(&window, "Failed to load data.");
                view::render_inspector(&state.borrow());
            }
        }
    });
}

async fn post_rows(window: &Window, url: &str, rows: &[SyncRow]) -> Result<(), JsValue> {
    let body = serde_json::to_string(rows).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let headers = Headers::new()?;
    headers.set("Content-Type", "application/json")?;
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::NoCors);
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));
    // An opaque response carries nothing to check.
    wasm_bindgen_futures::JsFuture::from(window.fetch_with_str_and_init(url, &init)).await?;
    Ok(())
}

/// Submit the order list to the webhook.
///
/// Completion only means the request left the browser. The syncing flag stays
/// up for a fixed cool-down whether or not the post failed.
pub fn sync(state: Shared) {
    let started = {
        let mut s = state.borrow_mut();
        let date = today();
        s.bench
            .begin_sync(&date)
            .map(|rows| (rows, s.window.clone(), s.settings.webhook_url.clone()))
    };
    let (rows, window, url) = match started {
        Ok(v) => v,
        Err(e) => {
            let window = state.borrow().window.clone();
            alert(&window, &e.to_string());
            return;
        }
    };

    {
        let mut s = state.borrow_mut();
        s.tab = Tab::Grid;
    }
    view::render_all(&state.borrow());
    refresh_existing(state.clone());

    wasm_bindgen_futures::spawn_local(async move {
        match post_rows(&window, &url, &rows).await {
            Ok(()) => log::info!("sync: {} rows submitted", rows.len()),
            Err(e) => log::error!("sync: post failed: {:?}", e),
        }
        let st = state.clone();
        let done = Closure::once_into_js(move || dispatch(&st, Command::FinishSync));
        if window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                done.unchecked_ref(),
                SYNC_COOLDOWN_MS as i32,
            )
            .is_err()
        {
            dispatch(&state, Command::FinishSync);
        }
    });
}
