use rust_decimal::Decimal;

use crate::core::{AppError, AuditStamp, Result};
use crate::modules::loans::models::{Installment, PaymentHistory};

/// Installments a repayment has to cover, and their combined amount
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPlan {
    pub installments: Vec<Installment>,
    pub required_amount: Decimal,
    /// True when the plan clears overdue installments rather than the next one due
    pub clears_overdue: bool,
}

/// Installments settled by an accepted repayment and their history rows
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub paid: Vec<Installment>,
    pub history: Vec<PaymentHistory>,
    pub required_amount: Decimal,
}

impl Settlement {
    pub fn installments_paid(&self) -> usize {
        self.paid.len()
    }
}

/// Decides which installments a repayment settles
///
/// When anything is overdue, the payment must clear every overdue installment
/// at once. Otherwise it must cover exactly the earliest pending installment.
/// The tendered amount has to match the required amount to the cent; there is
/// no partial payment, overpayment credit or paying ahead.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentAllocator;

impl PaymentAllocator {
    pub fn new() -> Self {
        Self
    }

    /// `overdue` and `pending` are expected in installment-number order
    pub fn plan(
        &self,
        loan_id: &str,
        overdue: &[Installment],
        pending: &[Installment],
    ) -> Result<AllocationPlan> {
        let Some(next) = pending.first() else {
            return Err(AppError::NoPendingInstallments(loan_id.to_string()));
        };

        let (installments, clears_overdue) = if overdue.is_empty() {
            (vec![next.clone()], false)
        } else {
            (overdue.to_vec(), true)
        };

        let required_amount: Decimal = installments.iter().map(|i| i.installment_amount).sum();

        Ok(AllocationPlan {
            installments,
            required_amount,
            clears_overdue,
        })
    }

    pub fn verify_amount(&self, plan: &AllocationPlan, tendered: Decimal) -> Result<()> {
        if tendered != plan.required_amount {
            return Err(AppError::AmountMismatch {
                tendered,
                required: plan.required_amount,
            });
        }
        Ok(())
    }

    /// Mark every planned installment paid and snapshot each into history
    pub fn settle(&self, plan: AllocationPlan, stamp: &AuditStamp) -> Result<Settlement> {
        let mut paid = plan.installments;
        for installment in paid.iter_mut() {
            installment.mark_as_paid(stamp)?;
        }

        let history = paid
            .iter()
            .map(|installment| PaymentHistory::record_payment(installment, stamp))
            .collect();

        Ok(Settlement {
            paid,
            history,
            required_amount: plan.required_amount,
        })
    }

    /// Plan, check the tendered amount, and settle
    pub fn allocate(
        &self,
        loan_id: &str,
        overdue: &[Installment],
        pending: &[Installment],
        tendered: Decimal,
        stamp: &AuditStamp,
    ) -> Result<Settlement> {
        let plan = self.plan(loan_id, overdue, pending)?;
        self.verify_amount(&plan, tendered)?;
        self.settle(plan, stamp)
    }
}
