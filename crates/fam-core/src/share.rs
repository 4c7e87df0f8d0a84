//! Share-token codec -- a [`SharePayload`] to and from a URL-embeddable string.
//!
//! A token is the compact JSON of the payload, UTF-8 encoded, then base64
//! encoded with the URL-safe alphabet and no padding:
//!
//! ```text
//! {"version":1,"people":[...],"categories":[...],"appts":[...]}
//!   -> UTF-8 bytes -> base64url
//! ```
//!
//! Tokens arrive from links, so decoding treats them as untrusted: every
//! failure is returned as a [`ShareError`] and the decoded JSON goes through
//! [`sanitize`] before it becomes a payload.

use crate::env::IdGenerator;
use crate::error::{Result, ShareError};
use crate::stamp::{canonical_instant, try_parse_stamp};
use crate::types::{Appointment, SharePayload, PLACEHOLDER_TITLE, SHARE_VERSION};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};
use url::Url;

/// Query parameter that carries the token in a share link.
pub const SHARE_QUERY_PARAM: &str = "share";

/// Serialize a payload into a share token.
///
/// Fails with [`ShareError::UnsupportedVersion`] unless `payload.version` is
/// [`SHARE_VERSION`], so no token is produced that [`decode_share`] rejects.
pub fn encode_share(payload: &SharePayload) -> Result<String> {
    if payload.version != SHARE_VERSION {
        return Err(ShareError::UnsupportedVersion(Some(Value::from(payload.version))));
    }
    let json = serde_json::to_string(payload)?;
    Ok(URL_SAFE_NO_PAD.encode(json.as_bytes()))
}

/// Decode and sanitize a share token.
///
/// Accepts the URL-safe or standard alphabet, with or without padding, and
/// tolerates `+` having been turned into a space by a form decoder. A token
/// broken across lines is read with all whitespace removed; in that case a
/// space is never taken for a `+`. `ids` supplies identifiers for
/// appointments that arrive without one.
pub fn decode_share(token: &str, ids: &impl IdGenerator) -> Result<SharePayload> {
    let bytes = decode_base64(token)?;
    let text = String::from_utf8(bytes)?;
    let raw: Value = serde_json::from_str(&text)?;
    let payload = sanitize(&raw, ids)?;
    tracing::debug!(
        people = payload.people.len(),
        categories = payload.categories.len(),
        appts = payload.appts.len(),
        "decoded share token"
    );
    Ok(payload)
}

/// Validate the shape of a parsed share payload.
///
/// The payload is rejected outright unless `version` is exactly `1`. Beyond
/// that nothing fails: top-level roster entries are trimmed and dropped unless
/// they are non-empty strings, appointments without a resolvable `start` are
/// dropped, and each mistyped appointment field falls back to its default on
/// its own. Well-typed appointment fields are kept as given.
pub fn sanitize(raw: &Value, ids: &impl IdGenerator) -> Result<SharePayload> {
    let obj = raw.as_object().ok_or(ShareError::NotAnObject)?;

    let version = obj.get("version");
    if version.and_then(Value::as_f64) != Some(f64::from(SHARE_VERSION)) {
        return Err(ShareError::UnsupportedVersion(version.cloned()));
    }

    let appts = match obj.get("appts").and_then(Value::as_array) {
        Some(entries) => entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let appt = sanitize_appointment(entry, ids);
                if appt.is_none() {
                    tracing::warn!(index, "dropping shared appointment without a resolvable start");
                }
                appt
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(SharePayload {
        version: SHARE_VERSION,
        people: roster(obj.get("people")),
        categories: roster(obj.get("categories")),
        appts,
    })
}

/// Build a share link by setting the `share` query parameter of `base_url`,
/// replacing any previous value.
pub fn share_link(base_url: &str, payload: &SharePayload) -> Result<String> {
    let token = encode_share(payload)?;
    let mut url =
        Url::parse(base_url).map_err(|e| ShareError::Link(format!("{base_url}: {e}")))?;
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SHARE_QUERY_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(SHARE_QUERY_PARAM, &token);
    Ok(url.into())
}

/// Pull the token out of a share link. Returns `None` if `link` is not an
/// absolute URL or has no `share` parameter.
pub fn token_from_link(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == SHARE_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Map the standard alphabet onto the URL-safe one and strip padding and
/// whitespace, then decode. Spaces stand for `+` only in a single-line token.
fn decode_base64(token: &str) -> Result<Vec<u8>> {
    let token = token.trim();
    let wrapped = token.contains(['\r', '\n', '\t']);
    let normalized: String = token
        .chars()
        .filter_map(|c| match c {
            ' ' if wrapped => None,
            '+' | ' ' => Some('-'),
            '/' => Some('_'),
            '=' | '\r' | '\n' | '\t' => None,
            other => Some(other),
        })
        .collect();
    Ok(URL_SAFE_NO_PAD.decode(normalized)?)
}

/// Keep the string entries of a JSON array that are non-empty once trimmed.
/// Anything other than an array yields an empty list.
fn roster(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Keep the string entries of a JSON array exactly as given. Anything other
/// than an array yields an empty list.
fn string_entries(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn sanitize_appointment(entry: &Value, ids: &impl IdGenerator) -> Option<Appointment> {
    let obj = entry.as_object()?;

    let start = instant_field(obj, "start")?;
    let end = instant_field(obj, "end").unwrap_or(start);

    let id = match text_field(obj, "id") {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => ids.generate_id(),
    };
    let title = match text_field(obj, "title") {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => PLACEHOLDER_TITLE.to_string(),
    };

    Some(Appointment {
        id,
        title,
        people: string_entries(obj.get("people")),
        category: owned_text(obj, "category"),
        provider: owned_text(obj, "provider"),
        location: owned_text(obj, "location"),
        notes: owned_text(obj, "notes"),
        telehealth: obj.get("telehealth").and_then(Value::as_bool).unwrap_or(false),
        start,
        end,
        reminder_mins: obj.get("reminderMins").and_then(minutes),
    })
}

fn text_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn owned_text(obj: &Map<String, Value>, key: &str) -> String {
    text_field(obj, key).unwrap_or_default().to_string()
}

fn instant_field(obj: &Map<String, Value>, key: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let text = text_field(obj, key)?.trim();
    if text.is_empty() {
        return None;
    }
    try_parse_stamp(text).map(canonical_instant)
}

/// A non-negative whole number of minutes. JSON numbers written as `90.0`
/// count; negative, fractional and out-of-range values do not.
fn minutes(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minutes_accepts_whole_floats_only() {
        assert_eq!(minutes(&json!(90)), Some(90));
        assert_eq!(minutes(&json!(90.0)), Some(90));
        assert_eq!(minutes(&json!(90.5)), None);
        assert_eq!(minutes(&json!(-5)), None);
        assert_eq!(minutes(&json!("90")), None);
        assert_eq!(minutes(&Value::Null), None);
    }

    #[test]
    fn standard_alphabet_and_padding_are_accepted() {
        // "{}?" has a '/' in standard base64 ("e30/") and '_' in URL-safe.
        assert_eq!(decode_base64("e30/").unwrap(), b"{}?");
        assert_eq!(decode_base64("e30_").unwrap(), b"{}?");
        assert_eq!(decode_base64("e30=").unwrap(), b"{}");
    }

    #[test]
    fn appointment_people_keep_every_string() {
        let value = json!([" Samara ", "", 7, null, "Samar"]);
        assert_eq!(string_entries(Some(&value)), vec![" Samara ", "", "Samar"]);
        assert!(string_entries(Some(&json!({}))).is_empty());
    }

    #[test]
    fn spaces_stand_for_plus_in_single_line_tokens() {
        // "{}>" is "e30+" in the standard alphabet.
        assert_eq!(decode_base64("e30 ").unwrap(), b"{}>");
        assert_eq!(decode_base64("e30+").unwrap(), b"{}>");
    }

    #[test]
    fn indented_line_breaks_are_dropped() {
        assert_eq!(decode_base64("e3\n    0=").unwrap(), b"{}");
        assert_eq!(decode_base64("e30\r\n  _").unwrap(), b"{}?");
    }

    #[test]
    fn roster_trims_and_filters() {
        let value = json!(["  Samara ", "", "   ", 7, null, "Samar"]);
        assert_eq!(roster(Some(&value)), vec!["Samara", "Samar"]);
        assert!(roster(Some(&json!("Samara"))).is_empty());
        assert!(roster(None).is_empty());
    }
}
