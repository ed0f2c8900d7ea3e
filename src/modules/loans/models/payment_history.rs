use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::installment::{Installment, InstallmentStatus};
use crate::core::{AuditStamp, Currency};

/// Kind of event recorded against an installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentAction {
    Payment,
}

impl PaymentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "PAYMENT",
        }
    }
}

impl TryFrom<String> for PaymentAction {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "PAYMENT" => Ok(Self::Payment),
            _ => Err(format!("Invalid payment action: {}", value)),
        }
    }
}

/// Append-only snapshot of an installment at the moment it was acted on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistory {
    pub id: u64,
    pub schedule_id: u64,
    pub loan_id: String,
    pub action: PaymentAction,
    pub installment_number: u32,
    pub installment_amount: Decimal,
    pub installment_due_date: NaiveDate,
    pub status: InstallmentStatus,
    pub currency: Currency,
    pub created_at: NaiveDateTime,
    pub created_by: String,
}

impl PaymentHistory {
    /// History row for an installment that was just settled
    pub fn record_payment(installment: &Installment, stamp: &AuditStamp) -> Self {
        Self {
            id: 0,
            schedule_id: installment.id,
            loan_id: installment.loan_id.clone(),
            action: PaymentAction::Payment,
            installment_number: installment.installment_number,
            installment_amount: installment.installment_amount,
            installment_due_date: installment.due_date,
            status: installment.status,
            currency: installment.currency,
            created_at: stamp.at,
            created_by: stamp.actor.clone(),
        }
    }
}
