use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::schedule_generator::{ScheduleGenerator, ScheduleTerms};
use crate::core::{AppError, AuditFields, AuditStamp, Clock, Result};
use crate::modules::disbursements::models::disbursement::{is_unset_date, CUSTOMER_ID_MAX_LEN};
use crate::modules::disbursements::models::{DisbursementCommand, DisbursementResponse};
use crate::modules::loans::models::{
    DisbursementDetail, Installment, LoanStatus, LoanSummary,
};
use crate::modules::loans::repositories::LoanStore;

/// Everything written by one disbursement
#[derive(Debug, Clone)]
pub struct DisbursementOutcome {
    pub detail: DisbursementDetail,
    pub summary: LoanSummary,
    pub installments: Vec<Installment>,
    pub first_due_date: NaiveDate,
    pub final_due_date: NaiveDate,
}

impl From<DisbursementOutcome> for DisbursementResponse {
    fn from(outcome: DisbursementOutcome) -> Self {
        let summary = outcome.summary;
        Self {
            loan_id: summary.loan_id,
            customer_id: summary.customer_id,
            disbursed_amount: summary.principal_amount,
            installment_amount: summary.installment_amount,
            outstanding_amount: summary.outstanding_amount,
            installment_unit: summary.installment_unit,
            number_of_installment: summary.no_of_installment,
            disbursement_date: summary.loan_start_date,
            first_due_date: outcome.first_due_date,
            final_due_date: outcome.final_due_date,
        }
    }
}

/// Turns validated loan terms into a persisted loan with its schedule
pub struct DisbursementService {
    store: Arc<dyn LoanStore>,
    clock: Arc<dyn Clock>,
    generator: ScheduleGenerator,
    actor: String,
}

impl DisbursementService {
    pub fn new(
        store: Arc<dyn LoanStore>,
        clock: Arc<dyn Clock>,
        generator: ScheduleGenerator,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            generator,
            actor: actor.into(),
        }
    }

    /// Create a loan, its disbursement record and its full installment schedule
    ///
    /// All three are written in one unit of work; on any storage failure nothing
    /// is persisted.
    pub async fn disburse(&self, command: DisbursementCommand) -> Result<DisbursementOutcome> {
        let start_date = command
            .start_date
            .filter(|date| !is_unset_date(*date))
            .ok_or_else(|| AppError::invalid_input("start_date is required"))?;
        if command.customer_id.trim().is_empty() {
            return Err(AppError::invalid_input("customer_id is required"));
        }
        if command.customer_id.chars().count() > CUSTOMER_ID_MAX_LEN {
            return Err(AppError::invalid_input(format!(
                "customer_id must be at most {} characters",
                CUSTOMER_ID_MAX_LEN
            )));
        }

        let plan = self.generator.generate(&ScheduleTerms {
            principal: command.principal,
            rate: command.rate,
            unit: command.unit,
            count: command.count,
            start_date,
        })?;

        let (first_due_date, final_due_date) = match (plan.first_due_date(), plan.final_due_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(AppError::internal("generated schedule is empty")),
        };

        let loan_id = format!("loan_{}", Uuid::new_v4());
        let stamp = AuditStamp::new(self.actor.clone(), self.clock.now());
        let currency = self.generator.currency();

        let mut detail = DisbursementDetail::new(
            loan_id.clone(),
            command.customer_id.clone(),
            start_date,
            command.principal,
            currency,
            &stamp,
        );

        let mut summary = LoanSummary {
            id: 0,
            loan_id: loan_id.clone(),
            customer_id: command.customer_id,
            principal_amount: command.principal,
            interest_amount: plan.interest_amount,
            outstanding_amount: plan.total_amount,
            no_of_installment: command.count,
            installment_unit: command.unit,
            installment_amount: plan.installment_amount,
            effective_interest_rate: command.rate,
            status: LoanStatus::Pending,
            loan_start_date: start_date,
            audit: AuditFields::created(&stamp),
        };

        let installments: Vec<Installment> = plan
            .installments
            .iter()
            .map(|scheduled| {
                Installment::new(
                    loan_id.clone(),
                    scheduled.installment_number,
                    scheduled.amount,
                    scheduled.due_date,
                    currency,
                    &stamp,
                )
            })
            .collect();

        // Dropping the unit on an early return rolls every write back
        let mut uow = self.store.begin().await?;
        detail.id = uow.create_disbursement_detail(&detail).await?;
        summary.id = uow.create_loan_summary(&summary).await?;
        uow.create_installments(&installments).await?;
        uow.commit().await?;

        info!(
            loan_id = %loan_id,
            customer_id = %summary.customer_id,
            principal = %summary.principal_amount,
            installment_amount = %summary.installment_amount,
            installments = installments.len(),
            "Loan disbursed"
        );

        Ok(DisbursementOutcome {
            detail,
            summary,
            installments,
            first_due_date,
            final_due_date,
        })
    }
}
