//! Appointment and share-snapshot records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when an appointment has none.
pub const PLACEHOLDER_TITLE: &str = "Appointment";

/// Category stamped on every appointment read from a calendar document.
pub const IMPORTED_CATEGORY: &str = "Imported";

/// The only share-payload schema version this crate reads or writes.
pub const SHARE_VERSION: u32 = 1;

/// One scheduled appointment.
///
/// `people` and `category` are plain labels with no link to the roster in
/// [`SharePayload`]. `end` is not required to follow `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    #[serde(default = "placeholder_title")]
    pub title: String,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub telehealth: bool,
    #[serde(with = "crate::stamp::iso")]
    pub start: DateTime<Utc>,
    #[serde(with = "crate::stamp::iso")]
    pub end: DateTime<Utc>,
    /// Minutes before `start`; `None` means no reminder.
    #[serde(default)]
    pub reminder_mins: Option<u32>,
}

fn placeholder_title() -> String {
    PLACEHOLDER_TITLE.to_string()
}

impl Appointment {
    /// An appointment with the given identity and times and every other field
    /// at its default.
    pub fn new(id: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: placeholder_title(),
            people: Vec::new(),
            category: String::new(),
            provider: String::new(),
            location: String::new(),
            notes: String::new(),
            telehealth: false,
            start,
            end,
            reminder_mins: None,
        }
    }

    /// Whether `end` is at or after `start`. Nothing in the codecs enforces this.
    pub fn is_chronological(&self) -> bool {
        self.end >= self.start
    }
}

/// A versioned snapshot of the roster, categories and appointments, as carried
/// by a share token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharePayload {
    pub version: u32,
    pub people: Vec<String>,
    pub categories: Vec<String>,
    pub appts: Vec<Appointment>,
}

impl SharePayload {
    /// A snapshot at the current schema version.
    pub fn new(people: Vec<String>, categories: Vec<String>, appts: Vec<Appointment>) -> Self {
        Self {
            version: SHARE_VERSION,
            people,
            categories,
            appts,
        }
    }
}
