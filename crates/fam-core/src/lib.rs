//! # fam-core
//!
//! The codec core of the family appointment manager: a small calendar
//! interchange (`.ics`) codec and a share-token codec for moving a whole
//! snapshot between devices through a link.
//!
//! Everything here is synchronous and free of I/O. The current instant and new
//! identifiers come from injected [`Clock`] and [`IdGenerator`] values.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use fam_core::{build_calendar, parse_calendar, Appointment, FixedClock, SequentialIds};
//!
//! let start = Utc.with_ymd_and_hms(2025, 12, 13, 0, 30, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2025, 12, 13, 0, 50, 0).unwrap();
//! let mut appt = Appointment::new("t1", start, end);
//! appt.title = "Wellness Check".to_string();
//!
//! let clock = FixedClock(start);
//! let ids = SequentialIds::new("imp");
//! let ics = build_calendar(&[appt], &clock, &ids);
//! assert!(ics.contains("SUMMARY:Wellness Check"));
//!
//! let back = parse_calendar(&ics, &clock, &ids);
//! assert_eq!(back.len(), 1);
//! assert_eq!(back[0].title, "Wellness Check");
//! ```
//!
//! ## Modules
//!
//! - [`escape`]: reserved-character escaping for property values
//! - [`stamp`]: instants to/from `YYYYMMDDTHHMMSSZ` and friends
//! - [`builder`]: appointments → calendar document
//! - [`parser`]: calendar document → appointments
//! - [`share`]: snapshot ↔ base64url JSON token, with sanitization
//! - [`summary`]: plain-text summary of one appointment
//! - [`env`]: clock and identifier capabilities
//! - [`types`]: `Appointment` and `SharePayload`
//! - [`error`]: share-token error type

pub mod builder;
pub mod env;
pub mod error;
pub mod escape;
pub mod parser;
pub mod share;
pub mod stamp;
pub mod summary;
pub mod types;

pub use builder::{build_calendar, PRODUCT_ID};
pub use env::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidGenerator};
pub use error::ShareError;
pub use escape::{escape_text, unescape_text};
pub use parser::parse_calendar;
pub use share::{
    decode_share, encode_share, sanitize, share_link, token_from_link, SHARE_QUERY_PARAM,
};
pub use stamp::{
    canonical_instant, normalize_instant, parse_stamp, to_iso_string, to_utc_stamp,
    try_parse_stamp,
};
pub use summary::summary_text;
pub use types::{Appointment, SharePayload, IMPORTED_CATEGORY, PLACEHOLDER_TITLE, SHARE_VERSION};
