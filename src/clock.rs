//! Local wall-clock time source
//!
//! Reference and generation timestamps are read through this trait so that a
//! cycle can be replayed at a fixed instant in tests.

use chrono::{Local, NaiveDateTime};

pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> NaiveDateTime;
}

/// Reads the host's local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_clock() {
        let at = NaiveDate::from_ymd_opt(2015, 4, 1)
            .unwrap()
            .and_hms_opt(12, 30, 15)
            .unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(clock.now() >= first);
    }
}
