//! Error types for share-token decoding and link handling.

use serde_json::Value;
use thiserror::Error;

/// Reasons a share token (or a link carrying one) could not be turned into a
/// [`SharePayload`](crate::types::SharePayload).
///
/// Every variant is the "invalid" outcome of decoding untrusted input: callers
/// show a generic "could not read shared data" message and carry on.
#[derive(Error, Debug)]
pub enum ShareError {
    /// The token was not valid base64 in either the URL-safe or standard alphabet.
    #[error("share token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes were not valid UTF-8.
    #[error("share token is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The decoded text was not valid JSON (or the payload could not be serialized).
    #[error("share token is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON root was an array, string, number, bool or null.
    #[error("share payload is not a JSON object")]
    NotAnObject,

    /// `version` was missing or any value other than the number `1`.
    #[error("unsupported share payload version: {0:?}")]
    UnsupportedVersion(Option<Value>),

    /// The base URL for a share link could not be parsed.
    #[error("invalid share link: {0}")]
    Link(String),
}

/// Convenience alias used throughout fam-core.
pub type Result<T> = std::result::Result<T, ShareError>;
