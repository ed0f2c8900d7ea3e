use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Most installments a single schedule may carry
pub const MAX_INSTALLMENTS: u32 = 1200;

/// Repeating period between installment due dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CadenceUnit {
    Week,
    Month,
}

impl CadenceUnit {
    pub const ALLOWED: [&'static str; 2] = ["week", "month"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Due date `steps` cadence units after `start`
    ///
    /// Weeks are fixed 7-day increments. Months are calendar months counted from
    /// the first of the start month, so a day-of-month that does not exist in the
    /// target month overflows into the next one (Jan 31 + 1 month = Mar 3, or
    /// Mar 2 in a leap year).
    pub fn advance(&self, start: NaiveDate, steps: u32) -> Result<NaiveDate> {
        let advanced = match self {
            Self::Week => start.checked_add_days(Days::new(7 * u64::from(steps))),
            Self::Month => start
                .with_day(1)
                .and_then(|first| first.checked_add_months(Months::new(steps)))
                .and_then(|first| first.checked_add_days(Days::new(u64::from(start.day() - 1)))),
        };

        advanced.ok_or_else(|| {
            AppError::invalid_input(format!(
                "due date {} {}(s) after {} is out of range",
                steps,
                self.as_str(),
                start
            ))
        })
    }
}

impl std::fmt::Display for CadenceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CadenceUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(format!(
                "installment_unit must be one of: {}",
                Self::ALLOWED.join(", ")
            )),
        }
    }
}

impl TryFrom<String> for CadenceUnit {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}
