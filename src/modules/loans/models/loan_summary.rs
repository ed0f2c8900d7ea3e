use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cadence::CadenceUnit;
use crate::core::{AuditFields, AuditStamp, Audited};

/// Per-loan aggregate (`loan_summary` row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    /// Storage identifier, 0 until persisted
    pub id: u64,
    pub loan_id: String,
    pub customer_id: String,
    pub principal_amount: Decimal,
    /// Flat interest charged once over the full term
    pub interest_amount: Decimal,
    /// Starts at principal + interest and only ever decreases
    pub outstanding_amount: Decimal,
    pub no_of_installment: u32,
    pub installment_unit: CadenceUnit,
    pub installment_amount: Decimal,
    pub effective_interest_rate: Decimal,
    pub status: LoanStatus,
    pub loan_start_date: NaiveDate,
    pub audit: AuditFields,
}

/// Loan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Pending,
    Paid,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
        }
    }

    /// Status implied by the number of installments still pending
    pub fn from_remaining(remaining_pending: usize) -> Self {
        if remaining_pending == 0 {
            Self::Paid
        } else {
            Self::Pending
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            _ => Err(format!("Invalid loan status: {}", value)),
        }
    }
}

impl LoanSummary {
    /// Principal plus flat interest
    pub fn total_amount(&self) -> Decimal {
        self.principal_amount + self.interest_amount
    }

    pub fn is_paid(&self) -> bool {
        self.status == LoanStatus::Paid
    }

    /// Reduce the outstanding balance by an accepted payment and settle the loan
    /// once nothing remains pending
    pub fn apply_payment(&mut self, amount: Decimal, remaining_pending: usize, stamp: &AuditStamp) {
        self.outstanding_amount -= amount;
        if LoanStatus::from_remaining(remaining_pending) == LoanStatus::Paid {
            self.status = LoanStatus::Paid;
        }
        self.audit.touch(stamp);
    }
}

impl Audited for LoanSummary {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }
}
