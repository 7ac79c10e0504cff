use label_core::Command;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, FileReader, HtmlInputElement};

use crate::state::Shared;
use crate::utils::{element, log};
use crate::dispatch;

// Wires up the file input that imports a CSV/TSV order export.
pub fn attach_file_input(state: Shared) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();
    let Some(input) = element::<HtmlInputElement>(&doc, "file") else {
        return Ok(());
    };
    let st = state.clone();
    let input_for_closure = input.clone();
    let onchange = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_e: Event| {
        let Some(file) = input_for_closure.files().and_then(|f| f.item(0)) else {
            log("No file selected");
            return;
        };
        let reader = match FileReader::new() {
            Ok(r) => r,
            Err(e) => {
                log(&format!("FileReader unavailable: {:?}", e));
                return;
            }
        };
        let st2 = st.clone();
        let reader_for_closure = reader.clone();
        let input_to_reset = input_for_closure.clone();
        let onload = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_ev: Event| {
            let text = reader_for_closure
                .result()
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default();
            // Allow re-importing the same file.
            input_to_reset.set_value("");
            if text.trim().is_empty() {
                log("Selected file is empty or unreadable");
                return;
            }
            dispatch(&st2, Command::Import(text));
        }));
        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        if let Err(e) = reader.read_as_text(&file) {
            log(&format!("Failed to read file: {:?}", e));
        }
        onload.forget();
    }));
    input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
    onchange.forget();
    Ok(())
}
