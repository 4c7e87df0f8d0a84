//! Plain-text appointment summary handed to a share sheet or clipboard.

use crate::types::Appointment;
use chrono::TimeZone;
use std::fmt::Display;

/// Render a human-readable summary with times shown in `tz`:
///
/// ```text
/// Wellness Check — Dec 12, 2025, 4:30 PM to 4:50 PM
/// People: Samara
/// Place: Allegro Pediatrics, Redmond
/// Provider: Dr. Example
/// Notes: Bring records
/// ```
pub fn summary_text<Tz>(appt: &Appointment, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let start = appt.start.with_timezone(tz);
    let end = appt.end.with_timezone(tz);
    let text = format!(
        "{} — {} to {}\nPeople: {}\nPlace: {}\nProvider: {}\nNotes: {}",
        appt.title,
        start.format("%b %-d, %Y, %-I:%M %p"),
        end.format("%-I:%M %p"),
        appt.people.join(", "),
        appt.location,
        appt.provider,
        appt.notes,
    );
    text.trim().to_string()
}
