//! Editable order table of the import tab.

use std::collections::BTreeSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use label_core::Command;
use label_core::orders::{Field, OrderStore, RowId};
use label_core::render::escape_html;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, Node};

use crate::state::{Shared, State};
use crate::utils::{element, set_disabled, set_text, set_visible};
use crate::{dispatch, remote};

const BODY_ID: &str = "ordersBody";
const SIG_ATTR: &str = "data-rendered";

fn field_attr(field: Field) -> &'static str {
    match field {
        Field::OrderNumber => "orderNumber",
        Field::ProductTitle => "productTitle",
        Field::Size => "size",
    }
}

fn parse_field(s: &str) -> Option<Field> {
    match s {
        "orderNumber" => Some(Field::OrderNumber),
        "productTitle" => Some(Field::ProductTitle),
        "size" => Some(Field::Size),
        _ => None,
    }
}

fn input(id: RowId, field: Field, value: &str, class: &str, placeholder: &str) -> String {
    format!(
        "<input class=\"{class}\" data-id=\"{id}\" data-field=\"{}\" value=\"{}\" placeholder=\"{placeholder}\">",
        field_attr(field),
        escape_html(value)
    )
}

/// Table body markup for the visible rows. A `+` control sits above every row
/// where a blank row can be inserted.
fn rows_html(store: &OrderStore, search: &str, existing: &BTreeSet<String>) -> String {
    let mut html = String::new();
    for row in store.view(search, existing) {
        let position = store
            .items()
            .iter()
            .position(|it| it.id == row.id)
            .unwrap_or(0);
        let insert = if store.can_insert_at(position) {
            format!("<button data-action=\"insert\" data-pos=\"{position}\">+</button>")
        } else {
            String::new()
        };
        html.push_str(&format!(
            "<tr class=\"insert\"><td colspan=\"3\">{insert}</td></tr>"
        ));
        let mut order_class = String::from("order");
        if row.hide_order {
            order_class.push_str(" repeat");
        }
        if row.in_sheet {
            order_class.push_str(" in-sheet");
        }
        let mut order_cell = input(row.id, Field::OrderNumber, &row.order_number, &order_class, "ID");
        if row.in_sheet && !row.hide_order {
            order_cell.push_str(
                "<span class=\"warn\" title=\"Order already exists in Google Sheet\">!</span>",
            );
        }
        if !row.hide_order && !row.effective_order.is_empty() {
            order_cell.push_str(&format!(
                "<button class=\"group-delete\" data-action=\"delete-group\" data-order=\"{}\">&times;</button>",
                escape_html(&row.effective_order)
            ));
        }
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{order_cell}</td><td>{}</td><td>{}<button class=\"row-delete\" data-action=\"delete\" data-id=\"{}\">&#128465;</button></td></tr>",
            if row.blank { "row blank" } else { "row" },
            input(row.id, Field::ProductTitle, &row.product_title, "title", "Fragrance Entry Name"),
            input(row.id, Field::Size, &row.size, "size", "ML"),
            row.id
        ));
    }
    html
}

fn signature(html: &str) -> String {
    let mut h = DefaultHasher::new();
    html.hash(&mut h);
    format!("{:016x}", h.finish())
}

fn cell_selector(id: &str, field: &str) -> String {
    format!("input[data-id=\"{id}\"][data-field=\"{field}\"]")
}

/// Input of the table that has keyboard focus, with its caret.
struct FocusedCell {
    id: String,
    field: String,
    start: Option<u32>,
    end: Option<u32>,
}

impl FocusedCell {
    fn capture(doc: &Document, body: &HtmlElement) -> Option<FocusedCell> {
        let input = doc.active_element()?.dyn_into::<HtmlInputElement>().ok()?;
        let node: &Node = input.as_ref();
        if !body.contains(Some(node)) {
            return None;
        }
        Some(FocusedCell {
            id: input.get_attribute("data-id")?,
            field: input.get_attribute("data-field")?,
            start: input.selection_start().ok().flatten(),
            end: input.selection_end().ok().flatten(),
        })
    }

    fn restore(&self, body: &HtmlElement) {
        let Some(input) = body
            .query_selector(&cell_selector(&self.id, &self.field))
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let _ = input.focus();
        if let (Some(start), Some(end)) = (self.start, self.end) {
            let _ = input.set_selection_range(start, end);
        }
    }
}

pub fn render(state: &State) {
    let doc = &state.document;
    let store = &state.bench.store;
    if let Some(body) = element::<HtmlElement>(doc, BODY_ID) {
        let html = rows_html(store, &state.search, &state.bench.existing);
        let sig = signature(&html);
        // Unchanged markup keeps the live inputs untouched.
        if body.get_attribute(SIG_ATTR).as_deref() != Some(sig.as_str()) {
            let focus = FocusedCell::capture(doc, &body);
            body.set_inner_html(&html);
            let _ = body.set_attribute(SIG_ATTR, &sig);
            if let Some(focus) = focus {
                focus.restore(&body);
            }
        }
    }

    set_text(doc, "entryCount", &store.entry_count().to_string());
    set_text(doc, "orderGroups", &store.order_groups().to_string());
    set_visible(doc, "duplicateWarning", store.has_existing(&state.bench.existing));
    set_disabled(doc, "syncBtn", state.bench.syncing || store.entry_count() == 0);
    set_text(
        doc,
        "syncBtn",
        if state.bench.syncing { "Syncing..." } else { "Sync to Canvas" },
    );
}

/// Every keystroke is committed, so a redraw never drops typed text.
fn on_input(state: &Shared, e: Event) {
    let Some(input) = e
        .target()
        .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
    else {
        return;
    };
    let id = input.get_attribute("data-id").and_then(|v| v.parse().ok());
    let field = input.get_attribute("data-field").and_then(|v| parse_field(&v));
    if let (Some(id), Some(field)) = (id, field) {
        dispatch(
            state,
            Command::UpdateField {
                id: RowId(id),
                field,
                value: input.value(),
            },
        );
    }
}

fn on_click(state: &Shared, e: Event) {
    let Some(btn) = e
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest("[data-action]").ok().flatten())
    else {
        return;
    };
    let action = btn.get_attribute("data-action").unwrap_or_default();
    let cmd = match action.as_str() {
        "insert" => btn
            .get_attribute("data-pos")
            .and_then(|v| v.parse().ok())
            .map(Command::InsertRow),
        "delete" => btn
            .get_attribute("data-id")
            .and_then(|v| v.parse().ok())
            .map(|id| Command::DeleteRow(RowId(id))),
        "delete-group" => {
            let order = btn.get_attribute("data-order").unwrap_or_default();
            let window = state.borrow().window.clone();
            let ok = window
                .confirm_with_message(&format!("Remove all entries for Order #{order}?"))
                .unwrap_or(false);
            ok.then_some(Command::DeleteGroup(order))
        }
        _ => None,
    };
    if let Some(cmd) = cmd {
        dispatch(state, cmd);
    }
}

pub fn attach(state: Shared) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();

    if let Some(body) = doc.get_element_by_id(BODY_ID) {
        let st = state.clone();
        let oninput = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |e: Event| on_input(&st, e)));
        body.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();

        let st = state.clone();
        let onclick = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |e: Event| on_click(&st, e)));
        body.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    if let Some(search) = element::<HtmlInputElement>(&doc, "search") {
        let st = state.clone();
        let field = search.clone();
        let oninput = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            s.search = field.value();
            render(&s);
        }));
        search.set_oninput(Some(oninput.as_ref().unchecked_ref()));
        oninput.forget();
    }

    if let Some(btn) = element::<HtmlElement>(&doc, "clearOrders") {
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let window = st.borrow().window.clone();
            let ok = window
                .confirm_with_message("This will clear all imported orders. Are you sure?")
                .unwrap_or(false);
            if ok {
                dispatch(&st, Command::ClearOrders);
            }
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    if let Some(btn) = element::<HtmlElement>(&doc, "syncBtn") {
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || remote::sync(st.clone())));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }
    Ok(())
}
