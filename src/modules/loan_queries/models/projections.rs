use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::modules::loans::models::{CadenceUnit, InstallmentStatus};

/// Data of `GET /v1/loans/{loan_id}/outstanding`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutstandingBalanceResponse {
    pub loan_id: String,
    pub customer_id: String,
    pub loan_details: LoanDetails,
    pub outstanding_amount: Decimal,
    pub overdue_amount: Decimal,
    pub overdue_installments: usize,
    pub paid_installments: usize,
    /// Installments still pending, overdue ones included
    pub remaining_installments: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanDetails {
    pub installment_unit: CadenceUnit,
    pub installment_amount: Decimal,
    pub total_installments: u32,
}

/// Data of `GET /v1/loans/{loan_id}/delinquency`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelinquencyResponse {
    pub loan_id: String,
    pub customer_id: String,
    pub is_delinquent: bool,
    pub installment_unit: CadenceUnit,
    pub overdue_installments: usize,
    pub overdue_amount: Decimal,
    pub outstanding_amount: Decimal,
    /// What the next repayment must be to clear the arrears
    pub required_payment_amount: Decimal,
}

/// Data of `GET /v1/loans/{loan_id}/schedule`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanScheduleResponse {
    pub loan_id: String,
    pub loan_summary: ScheduleSummary,
    pub schedule: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub installment_unit: CadenceUnit,
    pub total_installments: u32,
    pub installment_amount: Decimal,
    pub disbursed_amount: Decimal,
    pub outstanding_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub installment_amount: Decimal,
    pub installment_paid: Decimal,
    pub status: InstallmentStatus,
    pub paid_date: Option<NaiveDateTime>,
}
