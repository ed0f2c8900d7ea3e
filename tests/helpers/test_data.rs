// Test Data Factory
//
// Builds loans, commands and services pinned to a given instant.

use std::sync::Arc;

use billing_engine::core::{Clock, Currency, FixedClock, SYSTEM_ACTOR};
use billing_engine::disbursements::models::DisbursementCommand;
use billing_engine::disbursements::services::DisbursementOutcome;
use billing_engine::disbursements::{DisbursementService, ScheduleGenerator};
use billing_engine::loan_queries::{LoanProjector, LoanQueryService};
use billing_engine::loans::models::CadenceUnit;
use billing_engine::loans::{InMemoryLoanStore, LoanStore};
use billing_engine::repayments::models::RepaymentCommand;
use billing_engine::repayments::{PaymentAllocator, RepaymentService};
use billing_engine::AppServices;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Local wall-clock instant
pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Disbursement instant shared by the standard loans
pub fn disbursed_at() -> NaiveDateTime {
    at(2025, 8, 31, 9)
}

/// 5,000,000 at a flat 10% over 50 weekly installments from 2025-08-31
pub fn weekly_loan_command() -> DisbursementCommand {
    DisbursementCommand {
        customer_id: "cust_001".to_string(),
        principal: dec!(5000000),
        rate: dec!(0.10),
        unit: CadenceUnit::Week,
        count: 50,
        start_date: Some(date(2025, 8, 31)),
    }
}

/// 1,000,000 at a flat 10% over `count` weekly installments from 2025-08-31
pub fn short_loan_command(count: u32) -> DisbursementCommand {
    DisbursementCommand {
        customer_id: "cust_002".to_string(),
        principal: dec!(1000000),
        rate: dec!(0.10),
        unit: CadenceUnit::Week,
        count,
        start_date: Some(date(2025, 8, 31)),
    }
}

pub fn repay(loan_id: &str, amount: Decimal) -> RepaymentCommand {
    RepaymentCommand {
        loan_id: loan_id.to_string(),
        payment_amount: amount,
    }
}

/// In-memory ledger plus service factories pinned to a chosen instant
#[derive(Clone, Default)]
pub struct TestLedger {
    pub store: InMemoryLoanStore,
}

impl TestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> Arc<dyn LoanStore> {
        Arc::new(self.store.clone())
    }

    fn clock(now: NaiveDateTime) -> Arc<dyn Clock> {
        Arc::new(FixedClock(now))
    }

    pub fn disbursements_at(&self, now: NaiveDateTime) -> DisbursementService {
        DisbursementService::new(
            self.store(),
            Self::clock(now),
            ScheduleGenerator::new(Currency::IDR),
            SYSTEM_ACTOR,
        )
    }

    pub fn repayments_at(&self, now: NaiveDateTime) -> RepaymentService {
        RepaymentService::new(self.store(), Self::clock(now), PaymentAllocator::new(), SYSTEM_ACTOR)
    }

    pub fn queries_at(&self, now: NaiveDateTime) -> LoanQueryService {
        LoanQueryService::new(self.store(), Self::clock(now), LoanProjector::new())
    }

    pub fn services_at(&self, now: NaiveDateTime) -> AppServices {
        AppServices::new(self.store(), Self::clock(now), Currency::IDR, SYSTEM_ACTOR)
    }

    pub async fn disburse(&self, command: DisbursementCommand) -> DisbursementOutcome {
        self.disbursements_at(disbursed_at())
            .disburse(command)
            .await
            .expect("disbursement should succeed")
    }

    pub async fn disburse_weekly_loan(&self) -> DisbursementOutcome {
        self.disburse(weekly_loan_command()).await
    }
}
