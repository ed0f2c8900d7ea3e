use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::core::Result;
use crate::modules::loans::models::{
    DisbursementDetail, Installment, InstallmentStatus, LoanSummary, PaymentHistory,
};

/// Which installments of a loan to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallmentFilter {
    All,
    /// Pending and due strictly before the given local instant
    Overdue { as_of: NaiveDateTime },
    Paid,
    Pending,
}

impl InstallmentFilter {
    pub fn matches(&self, installment: &Installment) -> bool {
        match self {
            Self::All => true,
            Self::Overdue { as_of } => installment.is_overdue(*as_of),
            Self::Paid => installment.status == InstallmentStatus::Paid,
            Self::Pending => installment.status == InstallmentStatus::Pending,
        }
    }
}

/// Entry point to the loan ledger
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Start an all-or-nothing unit of work
    async fn begin(&self) -> Result<Box<dyn LoanUnitOfWork>>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<()>;
}

/// One transaction against the ledger
///
/// Reads see the unit's own writes. Nothing becomes visible to other units until
/// [`LoanUnitOfWork::commit`]; dropping the unit rolls everything back. Reads
/// never return soft-deleted rows, and installment lists are ordered by
/// installment number.
#[async_trait]
pub trait LoanUnitOfWork: Send {
    async fn get_loan_summary_by_id(&mut self, loan_id: &str) -> Result<Option<LoanSummary>>;

    /// Read the loan summary and hold an exclusive lock on it until the unit ends
    async fn lock_loan_summary(&mut self, loan_id: &str) -> Result<Option<LoanSummary>>;

    async fn get_installments_by_id(
        &mut self,
        loan_id: &str,
        filter: InstallmentFilter,
    ) -> Result<Vec<Installment>>;

    /// Due date of the earliest pending installment
    async fn get_next_due_date_by_id(&mut self, loan_id: &str) -> Result<Option<NaiveDate>>;

    /// Returns the assigned row id
    async fn create_disbursement_detail(&mut self, detail: &DisbursementDetail) -> Result<u64>;

    /// Returns the assigned row id
    async fn create_loan_summary(&mut self, summary: &LoanSummary) -> Result<u64>;

    async fn create_installments(&mut self, installments: &[Installment]) -> Result<()>;

    async fn create_payment_history(&mut self, history: &[PaymentHistory]) -> Result<()>;

    /// Persist status, paid amount and audit fields; every row must exist
    async fn update_installments(&mut self, installments: &[Installment]) -> Result<()>;

    /// Persist outstanding amount, status and audit fields
    async fn update_loan_summary(&mut self, summary: &LoanSummary) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
