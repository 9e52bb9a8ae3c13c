//! Download and clipboard glue. On native builds (tests, tooling) these
//! log instead of touching a browser.

use anyhow::Result;
#[cfg(target_arch = "wasm32")]
use anyhow::{anyhow, Context};
use tracing::debug;

#[cfg(target_arch = "wasm32")]
fn js_error(value: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow!("{value:?}")
}

/// Offers `bytes` as a file download through a temporary object URL,
/// revoked right after the click.
#[cfg(target_arch = "wasm32")]
pub fn download(file_name: &str, mime: &str, bytes: &[u8]) -> Result<()> {
    use wasm_bindgen::JsCast;
    use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

    let window = web_sys::window().context("no window")?;
    let document = window.document().context("no document")?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_error)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_error)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| anyhow!("created element is not an anchor"))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    Url::revoke_object_url(&url).map_err(js_error)?;

    debug!(file_name, mime, size = bytes.len(), "download offered");
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn download(file_name: &str, mime: &str, bytes: &[u8]) -> Result<()> {
    debug!(file_name, mime, size = bytes.len(), "download skipped outside the browser");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub async fn copy_text(text: &str) -> Result<()> {
    let window = web_sys::window().context("no window")?;
    let promise = window.navigator().clipboard().write_text(text);
    wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(js_error)
        .context("clipboard write rejected")?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn copy_text(text: &str) -> Result<()> {
    debug!(len = text.len(), "clipboard unavailable outside the browser");
    Ok(())
}

/// Opens `html` in a new tab and triggers the print dialog.
#[cfg(target_arch = "wasm32")]
pub fn print_html(html: &str) -> Result<()> {
    let window = web_sys::window().context("no window")?;
    let popup = window
        .open_with_url_and_target("", "_blank")
        .map_err(js_error)?
        .context("popup blocked")?;
    let document = popup.document().context("popup has no document")?;
    let body = document.body().context("popup has no body")?;
    body.set_inner_html(html);
    popup.print().map_err(js_error)?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn print_html(html: &str) -> Result<()> {
    debug!(len = html.len(), "print skipped outside the browser");
    Ok(())
}

/// `1536` → `1.5 KB`
pub fn format_bytes(size: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{size} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_sizes_are_humanized() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
