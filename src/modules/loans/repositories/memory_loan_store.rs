use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::loan_store::{InstallmentFilter, LoanStore, LoanUnitOfWork};
use crate::core::{AppError, Audited, Result};
use crate::modules::loans::models::{
    DisbursementDetail, Installment, LoanSummary, PaymentHistory,
};

/// Storage operation that can be made to fail once, for exercising rollback paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    CreateDisbursementDetail,
    CreateLoanSummary,
    CreateInstallments,
    CreatePaymentHistory,
    UpdateInstallments,
    UpdateLoanSummary,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct LedgerTables {
    next_id: u64,
    disbursement_details: Vec<DisbursementDetail>,
    loan_summaries: Vec<LoanSummary>,
    installments: Vec<Installment>,
    payment_history: Vec<PaymentHistory>,
}

impl LedgerTables {
    fn assign_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn summary(&self, loan_id: &str) -> Option<&LoanSummary> {
        self.loan_summaries
            .iter()
            .find(|s| s.loan_id == loan_id && s.is_active())
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    tables: LedgerTables,
    armed_failures: HashSet<FailPoint>,
}

/// Process-local loan ledger
///
/// Units of work are serialized behind one async mutex. A unit reads the committed
/// tables directly and copies them only on its first write; the copy replaces the
/// committed state on commit.
#[derive(Clone, Default)]
pub struct InMemoryLoanStore {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `point` fail with a persistence error
    pub async fn inject_failure(&self, point: FailPoint) {
        self.state.lock().await.armed_failures.insert(point);
    }

    /// Committed payment history of a loan
    pub async fn payment_history(&self, loan_id: &str) -> Vec<PaymentHistory> {
        self.state
            .lock()
            .await
            .tables
            .payment_history
            .iter()
            .filter(|h| h.loan_id == loan_id)
            .cloned()
            .collect()
    }

    /// Committed disbursement detail of a loan
    pub async fn disbursement_detail(&self, loan_id: &str) -> Option<DisbursementDetail> {
        self.state
            .lock()
            .await
            .tables
            .disbursement_details
            .iter()
            .find(|d| d.loan_id == loan_id)
            .cloned()
    }

    async fn begin_unit(&self) -> InMemoryUnitOfWork {
        InMemoryUnitOfWork {
            guard: Arc::clone(&self.state).lock_owned().await,
            staged: None,
        }
    }

    /// Number of committed loans
    pub async fn loan_count(&self) -> usize {
        self.state.lock().await.tables.loan_summaries.len()
    }
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn begin(&self) -> Result<Box<dyn LoanUnitOfWork>> {
        Ok(Box::new(self.begin_unit().await))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<LedgerState>,
    /// Written tables; `None` until the first write
    staged: Option<LedgerTables>,
}

impl InMemoryUnitOfWork {
    fn tables(&self) -> &LedgerTables {
        self.staged.as_ref().unwrap_or(&self.guard.tables)
    }

    fn tables_mut(&mut self) -> &mut LedgerTables {
        let committed = &self.guard.tables;
        self.staged.get_or_insert_with(|| committed.clone())
    }

    fn trip(&mut self, point: FailPoint) -> Result<()> {
        if self.guard.armed_failures.remove(&point) {
            return Err(AppError::persistence(format!("injected failure at {:?}", point)));
        }
        Ok(())
    }
}

#[async_trait]
impl LoanUnitOfWork for InMemoryUnitOfWork {
    async fn get_loan_summary_by_id(&mut self, loan_id: &str) -> Result<Option<LoanSummary>> {
        Ok(self.tables().summary(loan_id).cloned())
    }

    async fn lock_loan_summary(&mut self, loan_id: &str) -> Result<Option<LoanSummary>> {
        // The unit already holds the store-wide lock
        self.get_loan_summary_by_id(loan_id).await
    }

    async fn get_installments_by_id(
        &mut self,
        loan_id: &str,
        filter: InstallmentFilter,
    ) -> Result<Vec<Installment>> {
        let mut installments: Vec<Installment> = self
            .tables()
            .installments
            .iter()
            .filter(|i| i.loan_id == loan_id && i.is_active() && filter.matches(i))
            .cloned()
            .collect();
        installments.sort_by_key(|i| i.installment_number);

        Ok(installments)
    }

    async fn get_next_due_date_by_id(&mut self, loan_id: &str) -> Result<Option<NaiveDate>> {
        Ok(self
            .get_installments_by_id(loan_id, InstallmentFilter::Pending)
            .await?
            .iter()
            .map(|i| i.due_date)
            .min())
    }

    async fn create_disbursement_detail(&mut self, detail: &DisbursementDetail) -> Result<u64> {
        self.trip(FailPoint::CreateDisbursementDetail)?;

        let tables = self.tables_mut();
        let id = tables.assign_id();
        let mut row = detail.clone();
        row.id = id;
        tables.disbursement_details.push(row);

        Ok(id)
    }

    async fn create_loan_summary(&mut self, summary: &LoanSummary) -> Result<u64> {
        self.trip(FailPoint::CreateLoanSummary)?;

        if self.tables().summary(&summary.loan_id).is_some() {
            return Err(AppError::persistence(format!(
                "Duplicate loan_id {}",
                summary.loan_id
            )));
        }

        let tables = self.tables_mut();
        let id = tables.assign_id();
        let mut row = summary.clone();
        row.id = id;
        tables.loan_summaries.push(row);

        Ok(id)
    }

    async fn create_installments(&mut self, installments: &[Installment]) -> Result<()> {
        self.trip(FailPoint::CreateInstallments)?;

        let tables = self.tables_mut();
        for installment in installments {
            let mut row = installment.clone();
            row.id = tables.assign_id();
            tables.installments.push(row);
        }

        Ok(())
    }

    async fn create_payment_history(&mut self, history: &[PaymentHistory]) -> Result<()> {
        self.trip(FailPoint::CreatePaymentHistory)?;

        let tables = self.tables_mut();
        for entry in history {
            let mut row = entry.clone();
            row.id = tables.assign_id();
            tables.payment_history.push(row);
        }

        Ok(())
    }

    async fn update_installments(&mut self, installments: &[Installment]) -> Result<()> {
        self.trip(FailPoint::UpdateInstallments)?;

        let tables = self.tables_mut();
        for installment in installments {
            let stored = tables
                .installments
                .iter_mut()
                .find(|i| i.id == installment.id && i.is_active())
                .ok_or_else(|| {
                    AppError::persistence(format!(
                        "Installment {} of loan {} was not updated",
                        installment.installment_number, installment.loan_id
                    ))
                })?;

            stored.installment_paid = installment.installment_paid;
            stored.status = installment.status;
            stored.audit.updated_at = installment.audit.updated_at;
            stored.audit.updated_by = installment.audit.updated_by.clone();
        }

        Ok(())
    }

    async fn update_loan_summary(&mut self, summary: &LoanSummary) -> Result<()> {
        self.trip(FailPoint::UpdateLoanSummary)?;

        let stored = self
            .tables_mut()
            .loan_summaries
            .iter_mut()
            .find(|s| s.loan_id == summary.loan_id && s.is_active())
            .ok_or_else(|| {
                AppError::persistence(format!("Loan summary {} was not updated", summary.loan_id))
            })?;

        stored.outstanding_amount = summary.outstanding_amount;
        stored.status = summary.status;
        stored.audit.updated_at = summary.audit.updated_at;
        stored.audit.updated_by = summary.audit.updated_by.clone();

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryUnitOfWork { mut guard, staged } = *self;
        if guard.armed_failures.remove(&FailPoint::Commit) {
            return Err(AppError::persistence("injected failure at Commit"));
        }
        if let Some(staged) = staged {
            guard.tables = staged;
        }

        Ok(())
    }
}
