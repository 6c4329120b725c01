#![forbid(unsafe_code)]

//! `window.fetch` wrappers returning [`SeaError`]s.

use js_sys::Uint8Array;
use seanet_core::error::{AssetKind, SeaError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

fn js_reason(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

async fn fetch_ok(url: &str, asset: AssetKind) -> Result<Response, SeaError> {
    let fetch_err = |reason: String| SeaError::AssetFetch { asset, reason };
    let window = web_sys::window().ok_or_else(|| fetch_err("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fetch_err(js_reason(&e)))?;
    let response: Response = response
        .dyn_into()
        .map_err(|e| fetch_err(js_reason(&e)))?;
    if !response.ok() {
        return Err(fetch_err(format!("{url}: HTTP {}", response.status())));
    }
    Ok(response)
}

/// Fetch `url` and read the body as text.
pub async fn fetch_text(url: &str, asset: AssetKind) -> Result<String, SeaError> {
    let response = fetch_ok(url, asset).await?;
    let read_err = |e: JsValue| SeaError::AssetFetch {
        asset,
        reason: js_reason(&e),
    };
    let text = JsFuture::from(response.text().map_err(read_err)?)
        .await
        .map_err(read_err)?;
    text.as_string().ok_or_else(|| SeaError::AssetParse {
        asset,
        reason: "body is not text".into(),
    })
}

/// Fetch `url` and read the body as bytes.
pub async fn fetch_bytes(url: &str, asset: AssetKind) -> Result<Vec<u8>, SeaError> {
    let response = fetch_ok(url, asset).await?;
    let read_err = |e: JsValue| SeaError::AssetFetch {
        asset,
        reason: js_reason(&e),
    };
    let buffer = JsFuture::from(response.array_buffer().map_err(read_err)?)
        .await
        .map_err(read_err)?;
    Ok(Uint8Array::new(&buffer).to_vec())
}
