//! Browser glue for the views: navigation, dialogs, file export and import.

use pradakshina_counter::route::Route;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Current `location.pathname`.
pub fn current_path() -> String {
    gloo_utils::window()
        .location()
        .pathname()
        .unwrap_or_else(|_| "/".to_string())
}

/// Push `route` onto the session history.
pub fn push_route(route: Route) {
    if let Ok(history) = gloo_utils::window().history() {
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(route.path()));
    }
}

/// Rewrite the current entry, used to redirect unknown paths.
pub fn replace_route(route: Route) {
    if let Ok(history) = gloo_utils::window().history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(route.path()));
    }
}

pub fn set_title(title: &str) {
    gloo_utils::document().set_title(title);
}

pub fn confirm(message: &str) -> bool {
    gloo_utils::window()
        .confirm_with_message(message)
        .unwrap_or(false)
}

pub fn alert(message: &str) {
    let _ = gloo_utils::window().alert_with_message(message);
}

/// Offer `contents` as a JSON file download.
pub fn download_json(file_name: &str, contents: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(contents));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let document = gloo_utils::document();
    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);

    let body = gloo_utils::body();
    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    web_sys::Url::revoke_object_url(&url)
}

/// Read a picked file as UTF-8 text.
pub async fn read_file_text(file: web_sys::File) -> Result<String, JsValue> {
    let text = JsFuture::from(file.text()).await?;
    text.as_string()
        .ok_or_else(|| JsValue::from_str("file contents are not text"))
}

/// Target text must be a number; its range is clamped by the state manager.
pub fn validate_target(input: &str) -> Result<f64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Target cannot be empty".to_string());
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| "Target must be a valid number".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_text_parses_numbers() {
        assert_eq!(validate_target(" 54 "), Ok(54.0));
        assert_eq!(validate_target("0"), Ok(0.0));
        assert_eq!(validate_target("12.5"), Ok(12.5));
    }

    #[test]
    fn target_text_rejects_non_numbers() {
        assert!(validate_target("").is_err());
        assert!(validate_target("abc").is_err());
    }
}
