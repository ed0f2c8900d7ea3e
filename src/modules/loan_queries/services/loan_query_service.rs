use std::sync::Arc;

use tracing::debug;

use super::loan_projector::LoanProjector;
use crate::core::{AppError, Clock, Result};
use crate::modules::loan_queries::models::{
    DelinquencyResponse, LoanScheduleResponse, OutstandingBalanceResponse,
};
use crate::modules::loans::models::{Installment, LoanSummary};
use crate::modules::loans::repositories::{InstallmentFilter, LoanStore};

/// Answers balance, delinquency and schedule questions about a loan
pub struct LoanQueryService {
    store: Arc<dyn LoanStore>,
    clock: Arc<dyn Clock>,
    projector: LoanProjector,
}

impl LoanQueryService {
    pub fn new(store: Arc<dyn LoanStore>, clock: Arc<dyn Clock>, projector: LoanProjector) -> Self {
        Self {
            store,
            clock,
            projector,
        }
    }

    pub async fn outstanding_balance(&self, loan_id: &str) -> Result<OutstandingBalanceResponse> {
        let (summary, installments) = self.snapshot(loan_id).await?;
        Ok(self
            .projector
            .outstanding_balance(&summary, &installments, self.clock.now()))
    }

    pub async fn delinquency(&self, loan_id: &str) -> Result<DelinquencyResponse> {
        let (summary, installments) = self.snapshot(loan_id).await?;
        Ok(self
            .projector
            .delinquency(&summary, &installments, self.clock.now()))
    }

    pub async fn schedule(&self, loan_id: &str) -> Result<LoanScheduleResponse> {
        let (summary, installments) = self.snapshot(loan_id).await?;
        Ok(self.projector.schedule(&summary, &installments))
    }

    /// Summary and full schedule read inside one unit of work
    async fn snapshot(&self, loan_id: &str) -> Result<(LoanSummary, Vec<Installment>)> {
        let loan_id = loan_id.trim();
        if loan_id.is_empty() {
            return Err(AppError::invalid_input("loan_id is required"));
        }

        let mut uow = self.store.begin().await?;
        let summary = uow
            .get_loan_summary_by_id(loan_id)
            .await?
            .ok_or_else(|| AppError::loan_not_found(loan_id))?;
        let installments = uow
            .get_installments_by_id(loan_id, InstallmentFilter::All)
            .await?;

        debug!(loan_id = %loan_id, installments = installments.len(), "Loaded loan snapshot");

        Ok((summary, installments))
    }
}
