//! Sheet grid view and its pointer gestures.

use label_core::geometry::{CellGeometry, Point, Rect};
use label_core::render::escape_html;
use label_core::selection::DragMode;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, PointerEvent};

use crate::state::{Shared, State};
use crate::utils::element;
use crate::view;

const GRID_ID: &str = "grid";
const BAND_ID: &str = "selectionBand";

/// Live cell boxes of the rendered grid, in client coordinates.
pub struct DomGrid {
    container: Element,
}

impl DomGrid {
    pub fn find(state: &State) -> Option<Self> {
        let container = state.document.get_element_by_id(GRID_ID)?;
        Some(DomGrid { container })
    }

    fn cell_elements(&self) -> Vec<Element> {
        let Ok(list) = self.container.query_selector_all("[data-grid-index]") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .collect()
    }
}

fn cell_index(el: &Element) -> Option<usize> {
    el.get_attribute("data-grid-index")?.parse().ok()
}

impl CellGeometry for DomGrid {
    fn cells(&self) -> Vec<(usize, Rect)> {
        self.cell_elements()
            .iter()
            .filter_map(|el| {
                let idx = cell_index(el)?;
                let r = el.get_bounding_client_rect();
                Some((
                    idx,
                    Rect {
                        left: r.left(),
                        top: r.top(),
                        right: r.right(),
                        bottom: r.bottom(),
                    },
                ))
            })
            .collect()
    }
}

fn cell_class(selected: bool, mapped: bool) -> &'static str {
    if selected {
        "cell selected"
    } else if mapped {
        "cell mapped"
    } else {
        "cell"
    }
}

/// Rebuild every cell of the grid.
pub fn render(state: &State) {
    let Some(container) = element::<HtmlElement>(&state.document, GRID_ID) else {
        return;
    };
    let cfg = state.bench.layout.config();
    let style = container.style();
    let _ = style.set_property("grid-template-rows", &format!("repeat({}, 1fr)", cfg.rows));
    let _ = style.set_property("grid-template-columns", &format!("repeat({}, 1fr)", cfg.cols));

    let effective = state.bench.selection.effective();
    let logo = escape_html(&state.settings.logo_url);
    let mut html = String::new();
    for i in 0..cfg.total() {
        let selected = effective.contains(&i);
        let mapped = state.bench.mapping.get(&i);
        html.push_str(&format!(
            "<div class=\"{}\" data-grid-index=\"{i}\"><span class=\"slot\">{}</span>",
            cell_class(selected, mapped.is_some()),
            i + 1
        ));
        match mapped {
            Some(text) => html.push_str(&format!(
                "<span class=\"name\">{}</span><img class=\"logo\" src=\"{logo}\" alt=\"Logo\">",
                escape_html(text)
            )),
            None => html.push_str("<span class=\"dot\"></span>"),
        }
        html.push_str("</div>");
    }
    container.set_inner_html(&html);
}

/// Refresh cell highlighting only; used while a drag is in progress.
fn paint(state: &State) {
    let Some(grid) = DomGrid::find(state) else {
        return;
    };
    let effective = state.bench.selection.effective();
    for el in grid.cell_elements() {
        if let Some(i) = cell_index(&el) {
            el.set_class_name(cell_class(
                effective.contains(&i),
                state.bench.mapping.contains_key(&i),
            ));
        }
    }
}

fn paint_band(state: &State) {
    let Some(band) = element::<HtmlElement>(&state.document, BAND_ID) else {
        return;
    };
    let style = band.style();
    match state.bench.selection.gesture() {
        Some(g) => {
            let r = g.band();
            let class = match g.mode {
                DragMode::Selecting => "band selecting",
                DragMode::Deselecting => "band deselecting",
            };
            band.set_class_name(class);
            let _ = style.set_property("display", "block");
            let _ = style.set_property("left", &format!("{}px", r.left));
            let _ = style.set_property("top", &format!("{}px", r.top));
            let _ = style.set_property("width", &format!("{}px", r.width()));
            let _ = style.set_property("height", &format!("{}px", r.height()));
        }
        None => {
            let _ = style.set_property("display", "none");
        }
    }
}

fn client_point(e: &PointerEvent) -> Point {
    Point {
        x: e.client_x() as f64,
        y: e.client_y() as f64,
    }
}

pub fn attach(state: Shared) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();
    let Some(container) = doc.get_element_by_id(GRID_ID) else {
        return Ok(());
    };

    {
        let st = state.clone();
        let target = container.clone();
        let on_down = Closure::<dyn FnMut(PointerEvent)>::wrap(Box::new(move |e: PointerEvent| {
            if e.button() != 0 {
                return;
            }
            let mut s = st.borrow_mut();
            let Some(grid) = DomGrid::find(&s) else {
                return;
            };
            s.bench.selection.press(client_point(&e), &grid);
            let _ = target.set_pointer_capture(e.pointer_id());
            paint(&s);
            paint_band(&s);
        }));
        container
            .add_event_listener_with_callback("pointerdown", on_down.as_ref().unchecked_ref())?;
        on_down.forget();
    }

    {
        let st = state.clone();
        let on_move = Closure::<dyn FnMut(PointerEvent)>::wrap(Box::new(move |e: PointerEvent| {
            let mut s = st.borrow_mut();
            if !s.bench.selection.is_dragging() {
                return;
            }
            let Some(grid) = DomGrid::find(&s) else {
                return;
            };
            s.bench.selection.drag_to(client_point(&e), &grid);
            paint(&s);
            paint_band(&s);
        }));
        container
            .add_event_listener_with_callback("pointermove", on_move.as_ref().unchecked_ref())?;
        on_move.forget();
    }

    for (event, commit) in [("pointerup", true), ("pointercancel", false)] {
        let st = state.clone();
        let target = container.clone();
        let on_end = Closure::<dyn FnMut(PointerEvent)>::wrap(Box::new(move |e: PointerEvent| {
            let mut s = st.borrow_mut();
            if !s.bench.selection.is_dragging() {
                return;
            }
            if commit {
                s.bench.selection.release();
            } else {
                s.bench.selection.cancel();
            }
            let _ = target.release_pointer_capture(e.pointer_id());
            paint(&s);
            paint_band(&s);
            view::render_inspector(&s);
        }));
        container.add_event_listener_with_callback(event, on_end.as_ref().unchecked_ref())?;
        on_end.forget();
    }

    let on_menu = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(|e: web_sys::Event| {
        e.prevent_default();
    }));
    container.add_event_listener_with_callback("contextmenu", on_menu.as_ref().unchecked_ref())?;
    on_menu.forget();
    Ok(())
}
