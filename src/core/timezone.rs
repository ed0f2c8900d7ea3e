use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use crate::core::{AppError, Result};

/// Offset of Asia/Jakarta (UTC+7), the default business timezone
pub const JAKARTA_UTC_OFFSET_HOURS: i32 = 7;

/// Source of "now" for due-date and audit decisions
///
/// Timestamps in the ledger are business-local wall-clock time; overdue checks
/// compare against the same local clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock shifted into the business timezone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset_hours: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(offset_hours * 3600).ok_or_else(|| {
            AppError::configuration(format!("Invalid UTC offset: {} hours", offset_hours))
        })?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            offset: jakarta_offset(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        to_business_local(Utc::now(), self.offset)
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

fn jakarta_offset() -> FixedOffset {
    FixedOffset::east_opt(JAKARTA_UTC_OFFSET_HOURS * 3600).expect("Valid offset")
}

/// Convert a UTC instant into business-local wall-clock time
pub fn to_business_local(utc_time: DateTime<Utc>, offset: FixedOffset) -> NaiveDateTime {
    utc_time.with_timezone(&offset).naive_local()
}
