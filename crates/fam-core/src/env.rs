//! Injected capabilities: the current instant and fresh identifiers.
//!
//! The codecs never read the wall clock or a random source directly. Callers
//! pass a [`Clock`] and an [`IdGenerator`], which keeps every codec call
//! deterministic under test.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of unique-enough string identifiers.
///
/// Identifiers only need to be unique within one codec call; there is no
/// global sequencing requirement.
pub trait IdGenerator {
    fn generate_id(&self) -> String;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Random v4 UUIDs, e.g. `1b4e28ba-2fa1-11d2-883f-0016d3cca427`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Predictable identifiers `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn generate_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<T: IdGenerator + ?Sized> IdGenerator for &T {
    fn generate_id(&self) -> String {
        (**self).generate_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new("imp");
        assert_eq!(ids.generate_id(), "imp-1");
        assert_eq!(ids.generate_id(), "imp-2");
    }

    #[test]
    fn uuid_generator_yields_distinct_ids() {
        let ids = UuidGenerator;
        assert_ne!(ids.generate_id(), ids.generate_id());
    }

    #[test]
    fn fixed_clock_is_fixed() {
        let t = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let clock = FixedClock(t);
        assert_eq!(clock.now(), t);
        assert_eq!(clock.now(), t);
    }
}
