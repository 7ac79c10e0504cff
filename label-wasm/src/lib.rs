use std::cell::RefCell;
use std::rc::Rc;

use label_core::config::DEFAULT_SETTINGS_JSON;
use label_core::{Command, Effect, LayoutKind, Normalizer, Settings, Workbench};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, HtmlSelectElement};

mod grid;
mod print;
mod remote;
mod state;
mod table;
mod upload;
mod utils;
mod view;

use state::{Shared, State, Tab};
use utils::{alert, asset_url, element, fetch_text_with_fallbacks, get_query_param, log};

/// Apply a command, surface its error, run its effect and redraw.
pub(crate) fn dispatch(state: &Shared, cmd: Command) {
    let result = state.borrow_mut().bench.apply(cmd);
    match result {
        Ok(Effect::RefreshExistingOrders) => remote::refresh_existing(state.clone()),
        Ok(Effect::Mapped(n)) => log::info!("mapped {n} labels"),
        Ok(Effect::None) => {}
        Err(e) => {
            let window = state.borrow().window.clone();
            alert(&window, &e.to_string());
        }
    }
    view::render_all(&state.borrow());
}

fn on_click(state: &Shared, id: &str, f: impl Fn(&Shared) + 'static) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();
    if let Some(btn) = element::<HtmlElement>(&doc, id) {
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || f(&st)));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }
    Ok(())
}

fn on_select(
    state: &Shared,
    id: &str,
    f: impl Fn(&Shared, String) + 'static,
) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();
    if let Some(sel) = element::<HtmlSelectElement>(&doc, id) {
        let st = state.clone();
        let read = sel.clone();
        let onchange = Closure::<dyn FnMut()>::wrap(Box::new(move || f(&st, read.value())));
        sel.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();
    }
    Ok(())
}

fn switch_tab(state: &Shared, tab: Tab) {
    state.borrow_mut().tab = tab;
    view::render_all(&state.borrow());
}

fn attach_ui(state: Shared) -> Result<(), JsValue> {
    upload::attach_file_input(state.clone())?;
    grid::attach(state.clone())?;
    table::attach(state.clone())?;

    on_click(&state, "tabImport", |st| switch_tab(st, Tab::Import))?;
    on_click(&state, "tabGrid", |st| switch_tab(st, Tab::Grid))?;
    on_click(&state, "selectAll", |st| dispatch(st, Command::SelectAll))?;
    on_click(&state, "clearGrid", |st| dispatch(st, Command::ClearGrid))?;
    on_click(&state, "autoMap", |st| remote::auto_map(st.clone()))?;
    on_click(&state, "printBtn", |st| {
        if let Err(e) = print::open_print_tab(&st.borrow()) {
            log(&format!("Failed to open print tab: {:?}", e));
        }
    })?;

    on_select(&state, "layoutSel", |st, value| match value.parse::<LayoutKind>() {
        Ok(layout) => dispatch(st, Command::SetLayout(layout)),
        Err(e) => log(&e.to_string()),
    })?;
    on_select(&state, "sizeSel", |st, value| dispatch(st, Command::SetVolume(value)))?;
    Ok(())
}

/// Settings served next to the page, or the bundled copy.
async fn load_settings(window: &web_sys::Window) -> Settings {
    let text = fetch_text_with_fallbacks(window, &[&asset_url("settings.json"), "settings.json"])
        .await
        .unwrap_or_else(|| DEFAULT_SETTINGS_JSON.to_string());
    Settings::from_json(&text).unwrap_or_else(|e| {
        log::warn!("settings.json rejected ({e}), using bundled settings");
        Settings::bundled()
    })
}

fn apply_settings(state: &Shared, settings: Settings) {
    let normalizer = match Normalizer::new(&settings.rules) {
        Ok(n) => n,
        Err(e) => {
            log::error!("cleanup rules rejected: {e}");
            return;
        }
    };
    {
        let mut s = state.borrow_mut();
        s.bench.set_normalizer(normalizer);
        s.settings = settings;
    }
    view::render_all(&state.borrow());
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let search = window.location().search().unwrap_or_default();
    utils::init_logging(get_query_param(&search, "debug").is_some());
    let layout = match get_query_param(&search, "layout") {
        Some(v) => v.parse::<LayoutKind>().unwrap_or_else(|e| {
            log(&e.to_string());
            LayoutKind::default()
        }),
        None => LayoutKind::default(),
    };

    let settings = Settings::bundled();
    let normalizer = Normalizer::new(&settings.rules).unwrap_or_else(|e| {
        log::error!("bundled cleanup rules rejected: {e}");
        Normalizer::plain()
    });
    let state = Rc::new(RefCell::new(State {
        window: window.clone(),
        document,
        bench: Workbench::new(layout, normalizer),
        settings,
        tab: Tab::Import,
        search: String::new(),
        loading: false,
    }));

    attach_ui(state.clone())?;
    view::render_all(&state.borrow());

    // A settings.json next to the page replaces the bundled one.
    let st = state.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let settings = load_settings(&window).await;
        apply_settings(&st, settings);
        remote::refresh_existing(st);
    });
    Ok(())
}
