//! `fam` CLI: export, import and share appointments from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Appointments JSON (array, or a share snapshot) → .ics on stdout
//! fam export -i appts.json
//!
//! # Pin the DTSTAMP for reproducible output
//! fam --now 2025-01-02T03:04:05Z export -i appts.json -o family.ics
//!
//! # .ics → pretty JSON
//! fam import -i family.ics
//!
//! # Snapshot JSON → share token, or a full link
//! fam share encode -i snapshot.json
//! fam share encode -i snapshot.json --base-url https://fam.example/
//!
//! # Token or link → snapshot JSON
//! fam share decode 'https://fam.example/?share=eyJ2...'
//!
//! # Built-in self-checks
//! fam diagnostics
//! ```
//!
//! Logging goes to stderr and is controlled by `FAM_LOG` (e.g. `FAM_LOG=debug`).

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use fam_core::{
    Appointment, Clock, FixedClock, SequentialIds, SharePayload, SystemClock, UuidGenerator,
};
use serde_json::Value;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fam",
    version,
    about = "Family appointment calendar and share-link tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this RFC 3339 instant as "now" instead of the system clock
    #[arg(long, global = true, env = "FAM_NOW", value_parser = parse_now)]
    now: Option<DateTime<Utc>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export appointments to an .ics calendar document
    Export {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Import appointments from an .ics calendar document
    Import {
        /// Input .ics file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Encode or decode share tokens
    Share {
        #[command(subcommand)]
        action: ShareCommand,
    },
    /// Run the built-in codec self-checks
    Diagnostics,
}

#[derive(Subcommand)]
enum ShareCommand {
    /// Encode a snapshot JSON file as a share token
    Encode {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Print a full link on this base URL instead of the bare token
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Decode a share token or link to snapshot JSON
    Decode {
        /// Token or link (reads from stdin if omitted)
        token: Option<String>,
    },
}

/// The clock selected by `--now`.
enum CliClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl Clock for CliClock {
    fn now(&self) -> DateTime<Utc> {
        match self {
            CliClock::System(c) => c.now(),
            CliClock::Fixed(c) => c.now(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let clock = match cli.now {
        Some(now) => CliClock::Fixed(FixedClock(now)),
        None => CliClock::System(SystemClock),
    };
    let ids = UuidGenerator;

    match cli.command {
        Commands::Export { input, output } => {
            let json = read_input(input.as_deref())?;
            let appts = load_appointments(&json)?;
            let ics = fam_core::build_calendar(&appts, &clock, &ids);
            write_output(output.as_deref(), &ics)?;
        }
        Commands::Import { input, output } => {
            let text = read_input(input.as_deref())?;
            let appts = fam_core::parse_calendar(&text, &clock, &ids);
            if appts.is_empty() {
                eprintln!("no appointments found");
            }
            let pretty = serde_json::to_string_pretty(&appts)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Share { action } => match action {
            ShareCommand::Encode { input, base_url } => {
                let json = read_input(input.as_deref())?;
                let payload: SharePayload =
                    serde_json::from_str(&json).context("Failed to read snapshot JSON")?;
                let out = match base_url {
                    Some(base) => fam_core::share_link(&base, &payload)
                        .context("Failed to build share link")?,
                    None => fam_core::encode_share(&payload).context("Failed to encode snapshot")?,
                };
                println!("{}", out);
            }
            ShareCommand::Decode { token } => {
                let raw = match token {
                    Some(token) => token,
                    None => read_input(None)?,
                };
                let raw = raw.trim();
                let token = fam_core::token_from_link(raw).unwrap_or_else(|| raw.to_string());
                let payload = fam_core::decode_share(&token, &ids)
                    .context("could not read shared data")?;
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        },
        Commands::Diagnostics => {
            let results = run_diagnostics();
            let passed = results.iter().filter(|(_, ok)| *ok).count();
            let failed = results.len() - passed;
            for (name, ok) in &results {
                println!("{} {}", if *ok { "✓" } else { "✗" }, name);
            }
            println!();
            println!("Passed: {}, Failed: {}", passed, failed);
            if failed > 0 {
                anyhow::bail!("{} diagnostic check(s) failed", failed);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("FAM_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn parse_now(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 date-time: {}", e))
}

/// Accept either a JSON array of appointments or a share snapshot object.
///
/// Arrays must be well-formed appointments; snapshots go through the same
/// sanitizer as decoded share tokens.
fn load_appointments(json: &str) -> Result<Vec<Appointment>> {
    let value: Value = serde_json::from_str(json).context("Failed to parse input JSON")?;
    if value.is_object() {
        let payload = fam_core::sanitize(&value, &UuidGenerator)
            .context("Input is not a valid appointment snapshot")?;
        return Ok(payload.appts);
    }
    serde_json::from_value(value).context("Input is not a valid appointment array")
}

/// Self-checks over fixed inputs; each entry is `(name, passed)`.
fn run_diagnostics() -> Vec<(&'static str, bool)> {
    let mut results = Vec::new();
    let clock = FixedClock(
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
            .single()
            .unwrap_or_default(),
    );
    let ids = SequentialIds::new("diag");

    results.push((
        "UTC stamp formats",
        fam_core::to_utc_stamp(&clock.now()) == "20250102T030405Z",
    ));

    let start = fam_core::try_parse_stamp("2025-12-12T16:30:00-08:00").unwrap_or_default();
    let end = fam_core::try_parse_stamp("2025-12-12T16:50:00-08:00").unwrap_or_default();
    let mut appt = Appointment::new("t1", start, end);
    appt.title = "Wellness Check".to_string();
    appt.people = vec!["Samara".to_string()];
    appt.category = "Doctor".to_string();
    appt.provider = "Dr. Example".to_string();
    appt.location = "Allegro Pediatrics, Redmond".to_string();
    appt.notes = "Bring records".to_string();
    appt.reminder_mins = Some(60);

    let ics = fam_core::build_calendar(std::slice::from_ref(&appt), &clock, &ids);
    results.push((
        "ICS has SUMMARY",
        ics.split("\r\n").any(|l| l == "SUMMARY:Wellness Check"),
    ));

    let parsed = fam_core::parse_calendar(&ics, &clock, &ids);
    results.push(("Round-trip 1 event", parsed.len() == 1));
    results.push((
        "Parsed title ok",
        parsed.first().is_some_and(|a| a.title == "Wellness Check"),
    ));

    let payload = SharePayload::new(
        vec!["Samara".to_string()],
        vec!["Doctor".to_string()],
        vec![appt],
    );
    let share_ok = fam_core::encode_share(&payload)
        .ok()
        .and_then(|token| fam_core::decode_share(&token, &ids).ok())
        .is_some_and(|back| back == payload);
    results.push(("Share token round-trip", share_ok));

    results.push((
        "Bad share token rejected",
        fam_core::decode_share("!!not base64!!", &ids).is_err(),
    ));

    results
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
