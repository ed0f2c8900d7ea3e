use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::modules::loan_queries::models::{
    DelinquencyResponse, LoanDetails, LoanScheduleResponse, OutstandingBalanceResponse,
    ScheduleEntry, ScheduleSummary,
};
use crate::modules::loans::models::{Installment, InstallmentStatus, LoanSummary};

/// A loan is delinquent when more than this many installments are overdue
pub const DELINQUENCY_THRESHOLD: usize = 1;

/// Overdue, paid and pending views over one loan's schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Partition {
    overdue: usize,
    paid: usize,
    pending: usize,
}

/// Read-side calculations over a loan snapshot; never mutates
#[derive(Debug, Clone, Copy, Default)]
pub struct LoanProjector;

impl LoanProjector {
    pub fn new() -> Self {
        Self
    }

    pub fn outstanding_balance(
        &self,
        summary: &LoanSummary,
        installments: &[Installment],
        as_of: NaiveDateTime,
    ) -> OutstandingBalanceResponse {
        let partition = partition(installments, as_of);

        OutstandingBalanceResponse {
            loan_id: summary.loan_id.clone(),
            customer_id: summary.customer_id.clone(),
            loan_details: LoanDetails {
                installment_unit: summary.installment_unit,
                installment_amount: summary.installment_amount,
                total_installments: summary.no_of_installment,
            },
            outstanding_amount: summary.outstanding_amount,
            overdue_amount: overdue_amount(installments, as_of),
            overdue_installments: partition.overdue,
            paid_installments: partition.paid,
            remaining_installments: partition.pending,
        }
    }

    pub fn delinquency(
        &self,
        summary: &LoanSummary,
        installments: &[Installment],
        as_of: NaiveDateTime,
    ) -> DelinquencyResponse {
        let overdue_installments = partition(installments, as_of).overdue;
        let overdue_amount = overdue_amount(installments, as_of);

        DelinquencyResponse {
            loan_id: summary.loan_id.clone(),
            customer_id: summary.customer_id.clone(),
            is_delinquent: overdue_installments > DELINQUENCY_THRESHOLD,
            installment_unit: summary.installment_unit,
            overdue_installments,
            overdue_amount,
            outstanding_amount: summary.outstanding_amount,
            required_payment_amount: overdue_amount,
        }
    }

    pub fn schedule(&self, summary: &LoanSummary, installments: &[Installment]) -> LoanScheduleResponse {
        let mut ordered: Vec<&Installment> = installments.iter().collect();
        ordered.sort_by_key(|i| i.installment_number);

        LoanScheduleResponse {
            loan_id: summary.loan_id.clone(),
            loan_summary: ScheduleSummary {
                installment_unit: summary.installment_unit,
                total_installments: summary.no_of_installment,
                installment_amount: summary.installment_amount,
                disbursed_amount: summary.principal_amount,
                outstanding_amount: summary.outstanding_amount,
            },
            schedule: ordered
                .into_iter()
                .map(|i| ScheduleEntry {
                    installment_number: i.installment_number,
                    due_date: i.due_date,
                    installment_amount: i.installment_amount,
                    installment_paid: i.installment_paid,
                    status: i.status,
                    paid_date: i.paid_date(),
                })
                .collect(),
        }
    }
}

fn partition(installments: &[Installment], as_of: NaiveDateTime) -> Partition {
    Partition {
        overdue: installments.iter().filter(|i| i.is_overdue(as_of)).count(),
        paid: installments
            .iter()
            .filter(|i| i.status == InstallmentStatus::Paid)
            .count(),
        pending: installments.iter().filter(|i| i.is_pending()).count(),
    }
}

fn overdue_amount(installments: &[Installment], as_of: NaiveDateTime) -> Decimal {
    installments
        .iter()
        .filter(|i| i.is_overdue(as_of))
        .map(|i| i.installment_amount)
        .sum()
}
