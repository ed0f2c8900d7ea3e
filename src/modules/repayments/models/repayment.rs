use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::loans::models::LoanStatus;

const PAYMENT_MAX_SCALE: u32 = 2;

/// Body of `POST /v1/repayment`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepaymentRequest {
    #[serde(default)]
    pub loan_id: Option<String>,
    #[serde(default)]
    pub payment_amount: Option<Decimal>,
}

/// Validated repayment input
#[derive(Debug, Clone, PartialEq)]
pub struct RepaymentCommand {
    pub loan_id: String,
    pub payment_amount: Decimal,
}

impl RepaymentRequest {
    pub fn validate(self) -> Result<RepaymentCommand> {
        let mut errors = Vec::new();

        let loan_id = self.loan_id.unwrap_or_default().trim().to_string();
        if loan_id.is_empty() {
            errors.push("loan_id is required".to_string());
        }

        let payment_amount = self.payment_amount.unwrap_or_default();
        if payment_amount <= Decimal::ZERO {
            errors.push("payment_amount must be greater than 0".to_string());
        } else if payment_amount.normalize().scale() > PAYMENT_MAX_SCALE {
            errors.push(format!(
                "payment_amount must have at most {} decimal places",
                PAYMENT_MAX_SCALE
            ));
        }

        if !errors.is_empty() {
            return Err(AppError::invalid_input(errors.join("; ")));
        }

        Ok(RepaymentCommand {
            loan_id,
            payment_amount,
        })
    }
}

/// Outcome of an accepted repayment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepaymentReceipt {
    pub loan_id: String,
    pub payment_amount: Decimal,
    pub installments_paid: usize,
    pub installment_amount: Decimal,
    /// Installments still pending after this payment
    pub remaining_installments: usize,
    pub outstanding_amount: Decimal,
    /// Absent once the loan is fully paid
    pub next_due_date: Option<NaiveDate>,
    pub payment_date: NaiveDateTime,
    pub loan_status: LoanStatus,
}
