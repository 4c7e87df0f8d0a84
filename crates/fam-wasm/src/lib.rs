//! WASM bindings for fam-core.
//!
//! Exposes the calendar and share-token codecs to the browser app via
//! `wasm-bindgen`. Appointments and payloads cross the boundary as JSON
//! strings in the same shape the share token uses.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p fam-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/wasm/ \
//!   target/wasm32-unknown-unknown/release/fam_wasm.wasm
//! ```

use fam_core::{Appointment, SharePayload, SystemClock, UuidGenerator};
use wasm_bindgen::prelude::*;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Build a calendar document from a JSON array of appointments.
///
/// Throws a JS error if the input is not a valid appointment array.
#[wasm_bindgen(js_name = buildCalendar)]
pub fn build_calendar(appts_json: &str) -> std::result::Result<String, JsValue> {
    let appts: Vec<Appointment> = serde_json::from_str(appts_json).map_err(js_error)?;
    Ok(fam_core::build_calendar(&appts, &SystemClock, &UuidGenerator))
}

/// Parse a calendar document into a JSON array of appointments.
///
/// Never throws for bad input: a document with no events yields `[]`.
#[wasm_bindgen(js_name = parseCalendar)]
pub fn parse_calendar(text: &str) -> std::result::Result<String, JsValue> {
    let appts = fam_core::parse_calendar(text, &SystemClock, &UuidGenerator);
    serde_json::to_string(&appts).map_err(js_error)
}

/// Encode a JSON snapshot `{version, people, categories, appts}` as a share token.
#[wasm_bindgen(js_name = encodeShare)]
pub fn encode_share(payload_json: &str) -> std::result::Result<String, JsValue> {
    let payload: SharePayload = serde_json::from_str(payload_json).map_err(js_error)?;
    fam_core::encode_share(&payload).map_err(js_error)
}

/// Decode a share token (or a link carrying one) into snapshot JSON.
///
/// Returns `undefined` when the token cannot be read; never throws.
#[wasm_bindgen(js_name = decodeShare)]
pub fn decode_share(token_or_link: &str) -> Option<String> {
    let token = fam_core::token_from_link(token_or_link)
        .unwrap_or_else(|| token_or_link.to_string());
    let payload = fam_core::decode_share(&token, &UuidGenerator).ok()?;
    serde_json::to_string(&payload).ok()
}

/// Format an RFC 3339 date-time as a calendar UTC stamp (`YYYYMMDDTHHMMSSZ`).
#[wasm_bindgen(js_name = toUtcStamp)]
pub fn to_utc_stamp(rfc3339: &str) -> std::result::Result<String, JsValue> {
    let instant = chrono::DateTime::parse_from_rfc3339(rfc3339)
        .map_err(|e| js_error(format!("Invalid datetime '{}': {}", rfc3339, e)))?;
    Ok(fam_core::to_utc_stamp(&instant.with_timezone(&chrono::Utc)))
}
