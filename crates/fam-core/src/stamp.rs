//! Date codec -- instants to and from calendar stamps and ISO strings.
//!
//! Three textual shapes are recognised on the way in:
//!
//! - UTC stamps `YYYYMMDDTHHMMSSZ` (missing time fields default to zero)
//! - date-only stamps `YYYYMMDD`, read as local midnight
//! - anything else, handed to the flexible parser [`normalize_instant`]
//!
//! On the way out every instant is written as a UTC stamp (calendar documents)
//! or as an RFC 3339 string with millisecond precision (share tokens).

use crate::env::Clock;
use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc,
};

/// Format an instant as `YYYYMMDDTHHMMSSZ` using its UTC fields.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// let t = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
/// assert_eq!(fam_core::to_utc_stamp(&t), "20250102T030405Z");
/// ```
pub fn to_utc_stamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse a stamp, falling back to `clock.now()` when the text is empty or
/// cannot be resolved.
///
/// This is the lenient behaviour calendar import relies on. Callers that need
/// to tell a bad date apart from a real one use [`try_parse_stamp`].
pub fn parse_stamp(text: &str, clock: &impl Clock) -> DateTime<Utc> {
    match try_parse_stamp(text) {
        Some(instant) => instant,
        None => {
            let now = clock.now();
            if !text.trim().is_empty() {
                tracing::warn!(stamp = text, "unresolvable date, substituting current instant");
            }
            now
        }
    }
}

/// Parse a stamp, returning `None` when it cannot be resolved.
pub fn try_parse_stamp(text: &str) -> Option<DateTime<Utc>> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(body) = s.strip_suffix('Z') {
        if let Some(instant) = parse_compact_utc(body) {
            return Some(instant);
        }
    }
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return parse_compact_date(s).and_then(|d| local_to_utc(d.and_hms_opt(0, 0, 0)?));
    }
    normalize_instant(s)
}

/// Flexible date parser used as the last resort of [`try_parse_stamp`].
///
/// Accepts RFC 3339, RFC 2822, the browser's `datetime-local` value
/// (`YYYY-MM-DDTHH:MM`), naive ISO date-times, floating calendar stamps
/// (`YYYYMMDDTHHMMSS`) and ISO dates. Naive date-times are local time; a bare
/// ISO date is UTC midnight, as browsers read it.
pub fn normalize_instant(text: &str) -> Option<DateTime<Utc>> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y%m%dT%H%M%S",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return local_to_utc(naive);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// Truncate an instant to millisecond precision, the canonical form stored in
/// appointments and share tokens.
pub fn canonical_instant(instant: DateTime<Utc>) -> DateTime<Utc> {
    let millis = instant.timestamp_subsec_millis();
    instant.with_nanosecond(millis * 1_000_000).unwrap_or(instant)
}

/// RFC 3339 with milliseconds and a `Z` suffix: `2025-12-13T00:30:00.000Z`.
pub fn to_iso_string(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `YYYYMMDD[THH[MM[SS]]]` without the trailing `Z`.
fn parse_compact_utc(body: &str) -> Option<DateTime<Utc>> {
    let date = parse_compact_date(body.get(..8)?)?;
    let time = &body[8..];
    let (hour, minute, second) = if time.is_empty() {
        (0, 0, 0)
    } else {
        let digits = time.strip_prefix('T')?;
        if digits.len() > 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        (
            two_digit_field(digits, 0),
            two_digit_field(digits, 2),
            two_digit_field(digits, 4),
        )
    };
    let naive = date.and_hms_opt(hour, minute, second)?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Read the field of up to two digits at `offset`, or zero when it is absent.
/// `digits` is ASCII, so any byte range is a valid slice.
fn two_digit_field(digits: &str, offset: usize) -> u32 {
    let end = (offset + 2).min(digits.len());
    digits
        .get(offset..end)
        .filter(|f| !f.is_empty())
        .and_then(|f| f.parse().ok())
        .unwrap_or(0)
}

fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Resolve a wall-clock time in the local zone. Times skipped by a DST jump
/// are read as UTC rather than rejected.
fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => Some(local.with_timezone(&Utc)),
        None => Some(naive.and_utc()),
    }
}

/// Serde adapter writing instants as [`to_iso_string`] and reading any shape
/// [`try_parse_stamp`] understands.
pub mod iso {
    use super::{canonical_instant, to_iso_string, try_parse_stamp};
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(instant: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&to_iso_string(instant))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        try_parse_stamp(&raw)
            .map(canonical_instant)
            .ok_or_else(|| D::Error::custom(format!("unrecognized date-time: {raw}")))
    }
}
