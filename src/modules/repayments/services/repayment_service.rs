use std::sync::Arc;

use tracing::{info, warn};

use super::payment_allocator::PaymentAllocator;
use crate::core::{AppError, AuditStamp, Clock, Result};
use crate::modules::loans::repositories::{InstallmentFilter, LoanStore};
use crate::modules::repayments::models::{RepaymentCommand, RepaymentReceipt};

/// Applies repayments to a loan's schedule
pub struct RepaymentService {
    store: Arc<dyn LoanStore>,
    clock: Arc<dyn Clock>,
    allocator: PaymentAllocator,
    actor: String,
}

impl RepaymentService {
    pub fn new(
        store: Arc<dyn LoanStore>,
        clock: Arc<dyn Clock>,
        allocator: PaymentAllocator,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            allocator,
            actor: actor.into(),
        }
    }

    /// Settle the installments a payment covers and update the loan balance
    ///
    /// The loan summary row is locked for the whole unit of work, so concurrent
    /// repayments against one loan are applied one after the other. A rejected
    /// or failed repayment leaves the ledger untouched.
    pub async fn process_repayment(&self, command: RepaymentCommand) -> Result<RepaymentReceipt> {
        let now = self.clock.now();
        let stamp = AuditStamp::new(self.actor.clone(), now);
        let loan_id = command.loan_id.as_str();

        let mut uow = self.store.begin().await?;

        let mut summary = uow
            .lock_loan_summary(loan_id)
            .await?
            .ok_or_else(|| AppError::loan_not_found(loan_id))?;

        let overdue = uow
            .get_installments_by_id(loan_id, InstallmentFilter::Overdue { as_of: now })
            .await?;
        let pending = uow
            .get_installments_by_id(loan_id, InstallmentFilter::Pending)
            .await?;

        let settlement = self
            .allocator
            .allocate(loan_id, &overdue, &pending, command.payment_amount, &stamp)
            .map_err(|e| {
                warn!(
                    loan_id = %loan_id,
                    payment_amount = %command.payment_amount,
                    overdue = overdue.len(),
                    pending = pending.len(),
                    error = %e,
                    "Repayment rejected"
                );
                e
            })?;

        uow.update_installments(&settlement.paid).await?;
        uow.create_payment_history(&settlement.history).await?;

        let remaining = uow
            .get_installments_by_id(loan_id, InstallmentFilter::Pending)
            .await?
            .len();
        summary.apply_payment(command.payment_amount, remaining, &stamp);
        uow.update_loan_summary(&summary).await?;

        let next_due_date = uow.get_next_due_date_by_id(loan_id).await?;

        uow.commit().await?;

        info!(
            loan_id = %loan_id,
            payment_amount = %command.payment_amount,
            installments_paid = settlement.installments_paid(),
            remaining_installments = remaining,
            outstanding_amount = %summary.outstanding_amount,
            loan_status = %summary.status,
            "Repayment applied"
        );

        Ok(RepaymentReceipt {
            loan_id: summary.loan_id,
            payment_amount: command.payment_amount,
            installments_paid: settlement.installments_paid(),
            installment_amount: summary.installment_amount,
            remaining_installments: remaining,
            outstanding_amount: summary.outstanding_amount,
            next_due_date,
            payment_date: now,
            loan_status: summary.status,
        })
    }
}
