//! Calendar parser -- a `VCALENDAR` document back into appointments.
//!
//! The document is unfolded, scanned line by line, and cut into `VEVENT`
//! blocks. Each content line is split once, at the first `:` outside a quoted
//! parameter value, so property values may freely contain `:` and `;`.
//!
//! Only the properties the builder writes are understood: `DTSTART`, `DTEND`,
//! `SUMMARY`, `LOCATION` and `DESCRIPTION`. The source `UID` is never reused.
//!
//! # Description heuristic
//!
//! The builder packs provider, people and notes into `DESCRIPTION`. On the way
//! back, the first line starting with `Provider:` becomes the provider, the
//! first line starting with `People:` is split on commas into the participant
//! list, and every other line becomes notes. Notes that themselves start with
//! one of those prefixes are misread; that is a known limitation of the format.

use crate::env::{Clock, IdGenerator};
use crate::escape::unescape_text;
use crate::stamp::{canonical_instant, parse_stamp, try_parse_stamp};
use crate::types::{Appointment, IMPORTED_CATEGORY, PLACEHOLDER_TITLE};

/// Extract every event of a calendar document.
///
/// Never fails: a document with no `BEGIN:VEVENT` yields an empty list, a
/// missing or unresolvable `DTEND` takes the start instant, and an unresolvable
/// `DTSTART` becomes `clock.now()`. Each appointment gets a fresh id from `ids`, the
/// [`IMPORTED_CATEGORY`], no telehealth flag and no reminder.
pub fn parse_calendar(text: &str, clock: &impl Clock, ids: &impl IdGenerator) -> Vec<Appointment> {
    let lines = unfold(text);
    let blocks = split_events(&lines);
    let appts: Vec<Appointment> = blocks
        .iter()
        .map(|block| appointment_from_block(block, clock, ids))
        .collect();
    tracing::debug!(events = appts.len(), "parsed calendar document");
    appts
}

/// One `NAME[;PARAM=...]:VALUE` line with the parameters dropped.
#[derive(Debug, Clone, PartialEq)]
struct ContentLine<'a> {
    /// Property name, upper-cased.
    name: String,
    value: &'a str,
}

/// Join RFC 5545 folded lines, then split into physical lines without their
/// `\r` terminators.
fn unfold(text: &str) -> Vec<String> {
    icalendar::parser::unfold(text)
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Split a line into property name and value. Returns `None` for lines with
/// no `:` outside quotes.
fn parse_content_line(line: &str) -> Option<ContentLine<'_>> {
    let mut in_quotes = false;
    let mut colon = None;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => {
                colon = Some(i);
                break;
            }
            _ => {}
        }
    }
    let colon = colon?;
    let head = &line[..colon];
    let name = head.split(';').next().unwrap_or(head).trim();
    if name.is_empty() {
        return None;
    }
    Some(ContentLine {
        name: name.to_ascii_uppercase(),
        value: &line[colon + 1..],
    })
}

/// Group content lines into `VEVENT` blocks.
///
/// A block ends at `END:VEVENT`, at the next `BEGIN:VEVENT`, or at end of input.
/// Lines inside nested components (e.g. `VALARM`) are skipped.
fn split_events(lines: &[String]) -> Vec<Vec<ContentLine<'_>>> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<ContentLine<'_>>> = None;
    let mut nested = 0usize;

    for line in lines {
        let Some(content) = parse_content_line(line) else {
            continue;
        };
        let is_vevent = content.value.trim().eq_ignore_ascii_case("VEVENT");
        match content.name.as_str() {
            "BEGIN" if is_vevent => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                current = Some(Vec::new());
                nested = 0;
            }
            "END" if is_vevent => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                nested = 0;
            }
            "BEGIN" if current.is_some() => nested += 1,
            "END" if current.is_some() && nested > 0 => nested -= 1,
            _ => {
                if nested == 0 {
                    if let Some(block) = current.as_mut() {
                        block.push(content);
                    }
                }
            }
        }
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// First value of each property the parser understands.
#[derive(Debug, Default)]
struct EventFields<'a> {
    start: Option<&'a str>,
    end: Option<&'a str>,
    summary: Option<&'a str>,
    location: Option<&'a str>,
    description: Option<&'a str>,
}

impl<'a> EventFields<'a> {
    fn from_block(block: &[ContentLine<'a>]) -> Self {
        let mut fields = Self::default();
        for line in block {
            let slot = match line.name.as_str() {
                "DTSTART" => &mut fields.start,
                "DTEND" => &mut fields.end,
                "SUMMARY" => &mut fields.summary,
                "LOCATION" => &mut fields.location,
                "DESCRIPTION" => &mut fields.description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(line.value);
            }
        }
        fields
    }
}

fn appointment_from_block(
    block: &[ContentLine<'_>],
    clock: &impl Clock,
    ids: &impl IdGenerator,
) -> Appointment {
    let fields = EventFields::from_block(block);

    let start = canonical_instant(parse_stamp(fields.start.unwrap_or(""), clock));
    let end = fields
        .end
        .and_then(try_parse_stamp)
        .map(canonical_instant)
        .unwrap_or(start);

    let title = fields.summary.map(unescape_text).unwrap_or_default();
    let title = if title.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        title
    };

    let description = fields.description.map(unescape_text).unwrap_or_default();
    let parts = DescriptionParts::split(&description);

    Appointment {
        id: ids.generate_id(),
        title,
        people: parts.people,
        category: IMPORTED_CATEGORY.to_string(),
        provider: parts.provider,
        location: fields.location.map(unescape_text).unwrap_or_default(),
        notes: parts.notes,
        telehealth: false,
        start,
        end,
        reminder_mins: None,
    }
}

/// Provider, people and notes recovered from a description.
#[derive(Debug, Default, PartialEq)]
struct DescriptionParts {
    provider: String,
    people: Vec<String>,
    notes: String,
}

impl DescriptionParts {
    fn split(description: &str) -> Self {
        if description.is_empty() {
            return Self::default();
        }
        let mut provider = None;
        let mut people = None;
        let mut rest = Vec::new();
        for segment in description.split('\n') {
            if provider.is_none() {
                if let Some(value) = segment.strip_prefix("Provider:") {
                    provider = Some(value.trim().to_string());
                    continue;
                }
            }
            if people.is_none() {
                if let Some(value) = segment.strip_prefix("People:") {
                    people = Some(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .map(String::from)
                            .collect(),
                    );
                    continue;
                }
            }
            rest.push(segment);
        }
        Self {
            provider: provider.unwrap_or_default(),
            people: people.unwrap_or_default(),
            notes: rest.join("\n"),
        }
    }
}
