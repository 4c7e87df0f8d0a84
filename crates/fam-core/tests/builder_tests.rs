use chrono::{DateTime, TimeZone, Utc};
use fam_core::{build_calendar, Appointment, FixedClock, SequentialIds, PRODUCT_ID};

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 13, h, m, 0).unwrap()
}

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
}

fn wellness_check() -> Appointment {
    let mut appt = Appointment::new("t1", at(0, 30), at(0, 50));
    appt.title = "Wellness Check".to_string();
    appt.people = vec!["Samara".to_string()];
    appt.category = "Doctor".to_string();
    appt.provider = "Dr. Example".to_string();
    appt.location = "Allegro Pediatrics, Redmond".to_string();
    appt.notes = "Bring records".to_string();
    appt.reminder_mins = Some(60);
    appt
}

fn build(items: &[Appointment]) -> String {
    build_calendar(items, &clock(), &SequentialIds::new("gen"))
}

#[test]
fn empty_list_is_header_and_footer() {
    let ics = build(&[]);
    assert_eq!(
        ics,
        format!(
            "BEGIN:VCALENDAR\r\nPRODID:{PRODUCT_ID}\r\nVERSION:2.0\r\nCALSCALE:GREGORIAN\r\nEND:VCALENDAR"
        )
    );
}

#[test]
fn full_event_layout() {
    let ics = build(&[wellness_check()]);
    let lines: Vec<&str> = ics.split("\r\n").collect();
    assert_eq!(
        lines,
        vec![
            "BEGIN:VCALENDAR",
            "PRODID:-//Family Appointment Manager//EN",
            "VERSION:2.0",
            "CALSCALE:GREGORIAN",
            "BEGIN:VEVENT",
            "UID:t1",
            "DTSTAMP:20250102T030405Z",
            "DTSTART:20251213T003000Z",
            "DTEND:20251213T005000Z",
            "SUMMARY:Wellness Check",
            "LOCATION:Allegro Pediatrics\\, Redmond",
            "DESCRIPTION:Provider: Dr. Example\\nPeople: Samara\\nBring records",
            "END:VEVENT",
            "END:VCALENDAR",
        ]
    );
}

#[test]
fn every_line_is_crlf_terminated() {
    let ics = build(&[wellness_check()]);
    assert!(!ics.ends_with("\r\n"));
    assert_eq!(ics.matches('\n').count(), ics.matches("\r\n").count());
}

#[test]
fn optional_lines_are_omitted_not_blank() {
    let appt = Appointment::new("bare", at(9, 0), at(10, 0));
    let ics = build(&[appt]);
    assert!(!ics.contains("LOCATION"));
    assert!(!ics.contains("DESCRIPTION"));
    assert!(!ics.contains("\r\n\r\n"));
}

#[test]
fn description_only_has_parts_that_exist() {
    let mut appt = Appointment::new("n", at(9, 0), at(10, 0));
    appt.notes = "Fasting; no water".to_string();
    let ics = build(&[appt]);
    assert!(ics.contains("\r\nDESCRIPTION:Fasting\\; no water\r\n"));
}

#[test]
fn empty_title_uses_placeholder() {
    let mut appt = Appointment::new("x", at(9, 0), at(10, 0));
    appt.title.clear();
    let ics = build(&[appt]);
    assert!(ics.contains("\r\nSUMMARY:Appointment\r\n"));
}

#[test]
fn empty_id_is_generated() {
    let appt = Appointment::new("", at(9, 0), at(10, 0));
    let ics = build(&[appt]);
    assert!(ics.contains("\r\nUID:gen-1\r\n"));
}

#[test]
fn all_events_share_one_dtstamp() {
    let items = vec![
        wellness_check(),
        Appointment::new("a2", at(9, 0), at(10, 0)),
        Appointment::new("a3", at(11, 0), at(12, 0)),
    ];
    let ics = build(&items);
    let stamps: Vec<&str> = ics.split("\r\n").filter(|l| l.starts_with("DTSTAMP:")).collect();
    assert_eq!(stamps.len(), 3);
    assert!(stamps.iter().all(|s| *s == "DTSTAMP:20250102T030405Z"));
}

#[test]
fn events_keep_input_order() {
    let items = vec![
        Appointment::new("late", at(11, 0), at(12, 0)),
        Appointment::new("early", at(9, 0), at(10, 0)),
    ];
    let ics = build(&items);
    let late = ics.find("UID:late").unwrap();
    let early = ics.find("UID:early").unwrap();
    assert!(late < early);
}

#[test]
fn same_input_and_clock_is_byte_identical() {
    let items = vec![wellness_check()];
    assert_eq!(build(&items), build(&items));
}

#[test]
fn reversed_times_are_not_rejected() {
    let appt = Appointment::new("rev", at(10, 0), at(9, 0));
    assert!(!appt.is_chronological());
    let ics = build(&[appt]);
    assert!(ics.contains("DTSTART:20251213T100000Z"));
    assert!(ics.contains("DTEND:20251213T090000Z"));
}
