use chrono::{DateTime, Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result, MAX_LEDGER_AMOUNT};
use crate::modules::loans::models::{CadenceUnit, MAX_INSTALLMENTS};

/// Most decimal places accepted on a money amount
pub const AMOUNT_MAX_SCALE: u32 = 2;
/// Most decimal places accepted on an interest rate
pub const RATE_MAX_SCALE: u32 = 4;
/// Width of the ledger's customer_id column, in characters
pub const CUSTOMER_ID_MAX_LEN: usize = 36;

/// Body of `POST /v1/disbursement`
///
/// Every field is optional at the wire level so that missing and invalid values
/// produce the same field-level messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisbursementRequest {
    #[serde(default)]
    pub principal_amount: Option<Decimal>,
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
    #[serde(default)]
    pub installment_unit: Option<String>,
    #[serde(default)]
    pub number_of_installment: Option<i64>,
    /// `YYYY-MM-DD` or RFC 3339
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

/// Validated disbursement input
#[derive(Debug, Clone, PartialEq)]
pub struct DisbursementCommand {
    pub customer_id: String,
    pub principal: Decimal,
    pub rate: Decimal,
    pub unit: CadenceUnit,
    pub count: u32,
    pub start_date: Option<NaiveDate>,
}

impl DisbursementRequest {
    /// Check every field and report all problems at once
    pub fn validate(self) -> Result<DisbursementCommand> {
        let mut errors = Vec::new();

        let principal = self.principal_amount.unwrap_or_default();
        if principal <= Decimal::ZERO {
            errors.push("principal_amount must be greater than 0".to_string());
        } else if principal > MAX_LEDGER_AMOUNT {
            errors.push(format!("principal_amount must be at most {}", MAX_LEDGER_AMOUNT));
        } else if principal.normalize().scale() > AMOUNT_MAX_SCALE {
            errors.push(format!(
                "principal_amount must have at most {} decimal places",
                AMOUNT_MAX_SCALE
            ));
        }

        let rate = self.interest_rate.unwrap_or_default();
        if rate <= Decimal::ZERO {
            errors.push("interest_rate must be greater than 0".to_string());
        } else if rate > Decimal::ONE {
            errors.push("interest_rate must be less than or equal to 1".to_string());
        } else if rate.normalize().scale() > RATE_MAX_SCALE {
            errors.push(format!(
                "interest_rate must have at most {} decimal places",
                RATE_MAX_SCALE
            ));
        }

        let unit = match self.installment_unit.as_deref().unwrap_or("").parse::<CadenceUnit>() {
            Ok(unit) => Some(unit),
            Err(message) => {
                errors.push(message);
                None
            }
        };

        let count = match self.number_of_installment {
            Some(n) if n > i64::from(MAX_INSTALLMENTS) => {
                errors.push(format!(
                    "number_of_installment must be at most {}",
                    MAX_INSTALLMENTS
                ));
                None
            }
            Some(n) if n > 0 => u32::try_from(n).ok(),
            _ => {
                errors.push("number_of_installment must be greater than 0".to_string());
                None
            }
        };

        let start_date = match self.start_date.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("start_date is required".to_string());
                None
            }
            Some(raw) => match parse_start_date(raw) {
                Some(date) if is_unset_date(date) => {
                    errors.push("start_date is required".to_string());
                    None
                }
                Some(date) => Some(date),
                None => {
                    errors.push("start_date must be a date (YYYY-MM-DD or RFC 3339)".to_string());
                    None
                }
            },
        };

        let customer_id = self.customer_id.unwrap_or_default().trim().to_string();
        if customer_id.is_empty() {
            errors.push("customer_id is required".to_string());
        } else if customer_id.chars().count() > CUSTOMER_ID_MAX_LEN {
            errors.push(format!(
                "customer_id must be at most {} characters",
                CUSTOMER_ID_MAX_LEN
            ));
        }

        match (unit, count) {
            (Some(unit), Some(count)) if errors.is_empty() => Ok(DisbursementCommand {
                customer_id,
                principal,
                rate,
                unit,
                count,
                start_date,
            }),
            _ => Err(AppError::invalid_input(errors.join("; "))),
        }
    }
}

/// Accepts a calendar date or an RFC 3339 timestamp (its local date is used)
pub fn parse_start_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// 0001-01-01, the placeholder clients send for a date they never set
pub fn is_unset_date(date: NaiveDate) -> bool {
    date.year() == 1 && date.ordinal() == 1
}

/// Data of a successful disbursement
#[derive(Debug, Clone, Serialize)]
pub struct DisbursementResponse {
    pub loan_id: String,
    pub customer_id: String,
    pub disbursed_amount: Decimal,
    pub installment_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub installment_unit: CadenceUnit,
    pub number_of_installment: u32,
    pub disbursement_date: NaiveDate,
    pub first_due_date: NaiveDate,
    pub final_due_date: NaiveDate,
}
