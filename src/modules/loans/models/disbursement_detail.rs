use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::loan_summary::LoanStatus;
use crate::core::{AuditFields, AuditStamp, Audited, Currency};

/// Record of the funds released to the customer (`disbursement_details` row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisbursementDetail {
    pub id: u64,
    pub loan_id: String,
    pub customer_id: String,
    pub disbursement_date: NaiveDate,
    pub disbursement_amount: Decimal,
    pub currency: Currency,
    pub status: LoanStatus,
    pub audit: AuditFields,
}

impl DisbursementDetail {
    pub fn new(
        loan_id: String,
        customer_id: String,
        disbursement_date: NaiveDate,
        disbursement_amount: Decimal,
        currency: Currency,
        stamp: &AuditStamp,
    ) -> Self {
        Self {
            id: 0,
            loan_id,
            customer_id,
            disbursement_date,
            disbursement_amount,
            currency,
            status: LoanStatus::Pending,
            audit: AuditFields::created(stamp),
        }
    }
}

impl Audited for DisbursementDetail {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }
}
