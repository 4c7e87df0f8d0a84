//! Calendar builder -- appointments to a `VCALENDAR` document.
//!
//! Output layout:
//!
//! ```text
//! BEGIN:VCALENDAR
//! PRODID:-//Family Appointment Manager//EN
//! VERSION:2.0
//! CALSCALE:GREGORIAN
//! BEGIN:VEVENT
//! UID:...
//! DTSTAMP:...        (same value for every event in one build)
//! DTSTART:...
//! DTEND:...
//! SUMMARY:...
//! LOCATION:...       (omitted when empty)
//! DESCRIPTION:...    (omitted when there is nothing to describe)
//! END:VEVENT
//! END:VCALENDAR
//! ```
//!
//! Lines are joined with CRLF and there is no trailing terminator.

use crate::env::{Clock, IdGenerator};
use crate::escape::escape_text;
use crate::stamp::to_utc_stamp;
use crate::types::{Appointment, PLACEHOLDER_TITLE};

/// Value of the `PRODID` header line.
pub const PRODUCT_ID: &str = "-//Family Appointment Manager//EN";

/// Line terminator mandated by RFC 5545.
pub const CRLF: &str = "\r\n";

/// Render appointments as a calendar document.
///
/// `clock` supplies the generation timestamp, read once per call. `ids` is only
/// consulted for appointments whose `id` is empty.
pub fn build_calendar(items: &[Appointment], clock: &impl Clock, ids: &impl IdGenerator) -> String {
    let dtstamp = to_utc_stamp(&clock.now());
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".to_string(),
        format!("PRODID:{PRODUCT_ID}"),
        "VERSION:2.0".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
    ];
    for appt in items {
        push_event(&mut lines, appt, &dtstamp, ids);
    }
    lines.push("END:VCALENDAR".to_string());
    tracing::debug!(events = items.len(), "built calendar document");
    lines.join(CRLF)
}

fn push_event(lines: &mut Vec<String>, appt: &Appointment, dtstamp: &str, ids: &impl IdGenerator) {
    let uid = if appt.id.is_empty() {
        ids.generate_id()
    } else {
        appt.id.clone()
    };
    let title = if appt.title.is_empty() {
        PLACEHOLDER_TITLE
    } else {
        appt.title.as_str()
    };

    lines.push("BEGIN:VEVENT".to_string());
    lines.push(format!("UID:{uid}"));
    lines.push(format!("DTSTAMP:{dtstamp}"));
    lines.push(format!("DTSTART:{}", to_utc_stamp(&appt.start)));
    lines.push(format!("DTEND:{}", to_utc_stamp(&appt.end)));
    lines.push(format!("SUMMARY:{}", escape_text(title)));
    if !appt.location.is_empty() {
        lines.push(format!("LOCATION:{}", escape_text(&appt.location)));
    }
    if let Some(description) = describe(appt) {
        lines.push(format!("DESCRIPTION:{}", escape_text(&description)));
    }
    lines.push("END:VEVENT".to_string());
}

/// Pack provider, people and notes into one description, newline-separated.
/// The parser recovers the first two from their `Provider:`/`People:` prefixes.
fn describe(appt: &Appointment) -> Option<String> {
    let mut parts = Vec::new();
    if !appt.provider.is_empty() {
        parts.push(format!("Provider: {}", appt.provider));
    }
    if !appt.people.is_empty() {
        parts.push(format!("People: {}", appt.people.join(", ")));
    }
    if !appt.notes.is_empty() {
        parts.push(appt.notes.clone());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}
