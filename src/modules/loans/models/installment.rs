use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, AuditFields, AuditStamp, Audited, Currency, Result};

/// One scheduled repayment unit of a loan (`payment_schedule` row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// Storage identifier, 0 until persisted
    pub id: u64,
    pub loan_id: String,
    /// Sequential number (1, 2, 3...)
    pub installment_number: u32,
    pub installment_amount: Decimal,
    pub due_date: NaiveDate,
    /// Amount paid so far
    pub installment_paid: Decimal,
    pub status: InstallmentStatus,
    pub currency: Currency,
    pub audit: AuditFields,
}

/// Installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    /// Not yet paid
    Pending,
    /// Paid in full
    Paid,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
        }
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for InstallmentStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            _ => Err(format!("Invalid installment status: {}", value)),
        }
    }
}

impl Installment {
    /// Create a pending installment
    pub fn new(
        loan_id: String,
        installment_number: u32,
        installment_amount: Decimal,
        due_date: NaiveDate,
        currency: Currency,
        stamp: &AuditStamp,
    ) -> Self {
        Self {
            id: 0,
            loan_id,
            installment_number,
            installment_amount,
            due_date,
            installment_paid: Decimal::ZERO,
            status: InstallmentStatus::Pending,
            currency,
            audit: AuditFields::created(stamp),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == InstallmentStatus::Pending
    }

    /// Pending and due strictly before `as_of`
    ///
    /// The due date counts from local midnight, so an installment becomes overdue
    /// as soon as its due day starts.
    pub fn is_overdue(&self, as_of: NaiveDateTime) -> bool {
        self.is_pending() && self.due_date.and_time(chrono::NaiveTime::MIN) < as_of
    }

    /// Settle this installment in full
    pub fn mark_as_paid(&mut self, stamp: &AuditStamp) -> Result<()> {
        if self.status == InstallmentStatus::Paid {
            return Err(AppError::invalid_input(format!(
                "Installment {} of loan {} is already paid",
                self.installment_number, self.loan_id
            )));
        }

        self.status = InstallmentStatus::Paid;
        self.installment_paid = self.installment_amount;
        self.audit.touch(stamp);

        Ok(())
    }

    /// Date the installment was settled, taken from its last modification
    pub fn paid_date(&self) -> Option<NaiveDateTime> {
        (self.status == InstallmentStatus::Paid).then_some(self.audit.updated_at)
    }
}

impl Audited for Installment {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }
}
