use js_sys::Array;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, Url};

use crate::state::State;
use crate::utils::alert;

/// Open the self-printing document in a new tab.
///
/// The tab downloads the PDF by itself; a rendering failure is reported there,
/// not here.
pub fn open_print_tab(state: &State) -> Result<(), JsValue> {
    let doc = match state.bench.print_document(&state.settings.logo_url) {
        Ok(doc) => doc,
        Err(e) => {
            alert(&state.window, &e.to_string());
            return Ok(());
        }
    };
    let parts = Array::new();
    parts.push(&JsValue::from_str(&doc.html));
    let opts = BlobPropertyBag::new();
    opts.set_type("text/html");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)?;
    let url = Url::create_object_url_with_blob(&blob)?;
    log::info!("print: opening {} for {}", url, doc.file_name);
    if state.window.open_with_url_and_target(&url, "_blank")?.is_none() {
        alert(&state.window, "Please allow popups to generate the PDF.");
        Url::revoke_object_url(&url)?;
    }
    Ok(())
}
