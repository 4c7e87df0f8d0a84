use chrono::{Local, TimeZone, Timelike, Utc};
use fam_core::{
    canonical_instant, normalize_instant, parse_stamp, to_iso_string, to_utc_stamp,
    try_parse_stamp, FixedClock,
};

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> chrono::DateTime<Utc> {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .earliest()
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn utc_stamp_format() {
    let t = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(to_utc_stamp(&t), "20250102T030405Z");
}

#[test]
fn utc_stamp_uses_utc_fields_for_offset_instants() {
    let t = chrono::DateTime::parse_from_rfc3339("2025-12-12T16:30:00-08:00")
        .unwrap()
        .with_timezone(&Utc);
    assert_eq!(to_utc_stamp(&t), "20251213T003000Z");
}

#[test]
fn utc_stamp_drops_subseconds() {
    let t = Utc
        .with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
        .unwrap()
        .with_nanosecond(999_000_000)
        .unwrap();
    assert_eq!(to_utc_stamp(&t), "20250102T030405Z");
}

#[test]
fn parse_utc_stamp() {
    let t = try_parse_stamp("20250102T030405Z").unwrap();
    assert_eq!(t, Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap());
}

#[test]
fn parse_date_only_stamp_is_local_midnight() {
    let t = try_parse_stamp("20250102").unwrap();
    assert_eq!(t, local(2025, 1, 2, 0, 0, 0));
}

#[test]
fn parse_floating_stamp_is_local_time() {
    let t = try_parse_stamp("20250102T090000").unwrap();
    assert_eq!(t, local(2025, 1, 2, 9, 0, 0));
}

#[test]
fn parse_rfc3339_falls_through_to_flexible_parser() {
    let t = try_parse_stamp("2025-12-12T16:30:00-08:00").unwrap();
    assert_eq!(t, Utc.with_ymd_and_hms(2025, 12, 13, 0, 30, 0).unwrap());
}

#[test]
fn parse_iso_with_millis() {
    let t = try_parse_stamp("2025-12-13T00:30:00.250Z").unwrap();
    assert_eq!(t.timestamp_subsec_millis(), 250);
}

#[test]
fn empty_and_garbage_are_unresolvable() {
    assert!(try_parse_stamp("").is_none());
    assert!(try_parse_stamp("   ").is_none());
    assert!(try_parse_stamp("not a date").is_none());
    assert!(try_parse_stamp("2025013").is_none());
}

#[test]
fn parse_stamp_degrades_to_now() {
    let now = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
    let clock = FixedClock(now);
    assert_eq!(parse_stamp("", &clock), now);
    assert_eq!(parse_stamp("garbage", &clock), now);
    assert_eq!(
        parse_stamp("20250102T030405Z", &clock),
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    );
}

#[test]
fn normalize_datetime_local_input() {
    let t = normalize_instant("2025-12-12T16:30").unwrap();
    assert_eq!(t, local(2025, 12, 12, 16, 30, 0));
}

#[test]
fn normalize_iso_date_is_utc_midnight() {
    let t = normalize_instant("2025-12-12").unwrap();
    assert_eq!(t, Utc.with_ymd_and_hms(2025, 12, 12, 0, 0, 0).unwrap());
}

#[test]
fn normalize_rfc2822() {
    let t = normalize_instant("Fri, 12 Dec 2025 16:30:00 -0800").unwrap();
    assert_eq!(t, Utc.with_ymd_and_hms(2025, 12, 13, 0, 30, 0).unwrap());
}

#[test]
fn iso_string_has_millis_and_z() {
    let t = Utc.with_ymd_and_hms(2025, 12, 13, 0, 30, 0).unwrap();
    assert_eq!(to_iso_string(&t), "2025-12-13T00:30:00.000Z");
}

#[test]
fn canonical_instant_is_idempotent() {
    let t = Utc
        .with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
        .unwrap()
        .with_nanosecond(987_654_321)
        .unwrap();
    let once = canonical_instant(t);
    assert_eq!(canonical_instant(once), once);
    assert_eq!(once.timestamp_subsec_nanos(), 987_000_000);
}

#[test]
fn short_trailing_time_fields_keep_their_digits() {
    assert_eq!(
        try_parse_stamp("20250102T1Z"),
        Some(Utc.with_ymd_and_hms(2025, 1, 2, 1, 0, 0).unwrap())
    );
    assert_eq!(
        try_parse_stamp("20250102T123Z"),
        Some(Utc.with_ymd_and_hms(2025, 1, 2, 12, 3, 0).unwrap())
    );
    assert_eq!(
        try_parse_stamp("20250102T03045Z"),
        Some(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
    );
}
