use web_sys::HtmlSelectElement;

use crate::grid;
use crate::state::{State, Tab};
use crate::table;
use crate::utils::{element, set_disabled, set_text, set_visible};

pub fn render_all(state: &State) {
    render_tabs(state);
    grid::render(state);
    table::render(state);
    render_inspector(state);
}

fn render_tabs(state: &State) {
    let doc = &state.document;
    set_visible(doc, "importView", state.tab == Tab::Import);
    set_visible(doc, "gridView", state.tab == Tab::Grid);
    for (id, tab) in [("tabImport", Tab::Import), ("tabGrid", Tab::Grid)] {
        if let Some(el) = doc.get_element_by_id(id) {
            el.set_class_name(if state.tab == tab { "tab active" } else { "tab" });
        }
    }
}

/// Side panel next to the grid: layout, volume, counters and actions.
pub fn render_inspector(state: &State) {
    let doc = &state.document;
    let bench = &state.bench;
    let counts = bench.store.size_counts();

    if let Some(sel) = element::<HtmlSelectElement>(doc, "layoutSel") {
        sel.set_value(bench.layout.id());
    }
    if let Some(sel) = element::<HtmlSelectElement>(doc, "sizeSel") {
        let options: String = bench
            .layout
            .config()
            .options
            .iter()
            .map(|opt| {
                let label = match counts.get(*opt) {
                    Some(n) => format!("{opt} ({n} items)"),
                    None => opt.to_string(),
                };
                format!("<option value=\"{opt}\">{label}</option>")
            })
            .collect();
        sel.set_inner_html(&options);
        sel.set_value(&bench.volume);
    }
    match counts.get(&bench.volume).copied().filter(|n| *n > 0) {
        Some(n) => {
            set_text(doc, "sizeHint", &format!("{n} items found for this size"));
            set_visible(doc, "sizeHint", true);
        }
        None => set_visible(doc, "sizeHint", false),
    }

    set_text(doc, "selectedCount", &bench.selection.len().to_string());
    set_text(doc, "mappedCount", &bench.mapping.len().to_string());
    set_disabled(doc, "autoMap", state.loading || bench.selection.is_empty());
    set_text(doc, "autoMap", if state.loading { "Loading..." } else { "Auto-Map" });
    set_disabled(doc, "printBtn", bench.mapping.is_empty());
}
