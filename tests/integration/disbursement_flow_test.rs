// Integration Tests for the disbursement flow
//
// Runs disbursements through the service against the in-memory ledger and
// checks what ends up committed.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::collections::HashSet;

use billing_engine::core::AppError;
use billing_engine::loans::models::{InstallmentStatus, LoanStatus};
use billing_engine::loans::{FailPoint, InstallmentFilter};
use helpers::test_data::*;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_weekly_loan_is_persisted_with_full_schedule() {
    let ledger = TestLedger::new();

    let outcome = ledger.disburse_weekly_loan().await;

    assert!(outcome.summary.loan_id.starts_with("loan_"));
    assert_eq!(outcome.first_due_date, date(2025, 9, 7));
    assert_eq!(outcome.final_due_date, date(2026, 8, 16));

    let store = ledger.store();
    let mut uow = store.begin().await.unwrap();
    let summary = uow
        .get_loan_summary_by_id(&outcome.summary.loan_id)
        .await
        .unwrap()
        .expect("summary committed");
    let installments = uow
        .get_installments_by_id(&summary.loan_id, InstallmentFilter::All)
        .await
        .unwrap();
    drop(uow);

    assert_eq!(summary.customer_id, "cust_001");
    assert_eq!(summary.interest_amount, dec!(500000.00));
    assert_eq!(summary.outstanding_amount, dec!(5500000.00));
    assert_eq!(summary.installment_amount, dec!(110000.00));
    assert_eq!(summary.no_of_installment, 50);
    assert_eq!(summary.status, LoanStatus::Pending);

    assert_eq!(installments.len(), 50);
    assert!(installments
        .iter()
        .all(|i| i.status == InstallmentStatus::Pending && i.installment_amount == dec!(110000.00)));
    assert_eq!(installments[0].due_date, date(2025, 9, 7));
    assert_eq!(installments[49].due_date, date(2026, 8, 16));

    let detail = ledger
        .store
        .disbursement_detail(&summary.loan_id)
        .await
        .expect("detail committed");
    assert_eq!(detail.disbursement_amount, dec!(5000000));
    assert_eq!(detail.disbursement_date, date(2025, 8, 31));
    assert_eq!(detail.status, LoanStatus::Pending);
}

#[tokio::test]
async fn test_failure_at_any_write_leaves_no_trace() {
    let points = [
        FailPoint::CreateDisbursementDetail,
        FailPoint::CreateLoanSummary,
        FailPoint::CreateInstallments,
        FailPoint::Commit,
    ];

    for point in points {
        let ledger = TestLedger::new();
        ledger.store.inject_failure(point).await;

        let result = ledger
            .disbursements_at(disbursed_at())
            .disburse(weekly_loan_command())
            .await;

        assert!(
            matches!(result, Err(AppError::Persistence(_))),
            "expected persistence error at {:?}, got {:?}",
            point,
            result
        );
        assert_eq!(ledger.store.loan_count().await, 0, "rolled back at {:?}", point);
    }
}

#[tokio::test]
async fn test_ledger_recovers_after_failed_disbursement() {
    let ledger = TestLedger::new();
    ledger.store.inject_failure(FailPoint::CreateInstallments).await;

    let service = ledger.disbursements_at(disbursed_at());
    assert!(service.disburse(weekly_loan_command()).await.is_err());

    let outcome = service.disburse(weekly_loan_command()).await.unwrap();

    assert_eq!(ledger.store.loan_count().await, 1);
    assert_eq!(outcome.installments.len(), 50);
}

#[tokio::test]
async fn test_missing_start_date_is_rejected() {
    let ledger = TestLedger::new();
    let mut command = weekly_loan_command();
    command.start_date = None;

    let result = ledger.disbursements_at(disbursed_at()).disburse(command).await;

    match result {
        Err(AppError::InvalidInput(message)) => assert!(message.contains("start_date")),
        other => panic!("expected invalid input, got {:?}", other),
    }
    assert_eq!(ledger.store.loan_count().await, 0);
}

#[tokio::test]
async fn test_zero_start_date_is_rejected() {
    let ledger = TestLedger::new();
    let mut command = weekly_loan_command();
    command.start_date = Some(date(1, 1, 1));

    let result = ledger.disbursements_at(disbursed_at()).disburse(command).await;

    match result {
        Err(AppError::InvalidInput(message)) => {
            assert_eq!(message, "start_date is required")
        }
        other => panic!("expected invalid input, got {:?}", other),
    }
    assert_eq!(ledger.store.loan_count().await, 0);
}

#[tokio::test]
async fn test_principal_beyond_ledger_limit_is_rejected() {
    let ledger = TestLedger::new();
    let mut command = short_loan_command(1);
    command.principal = dec!(50000000000000000000000000000);
    command.rate = dec!(1);

    let result = ledger.disbursements_at(disbursed_at()).disburse(command).await;

    match result {
        Err(AppError::InvalidInput(message)) => assert!(message.contains("ledger limit")),
        other => panic!("expected invalid input, got {:?}", other),
    }
    assert_eq!(ledger.store.loan_count().await, 0);
}

#[tokio::test]
async fn test_oversized_customer_id_is_rejected() {
    let ledger = TestLedger::new();
    let mut command = weekly_loan_command();
    command.customer_id = "c".repeat(37);

    let result = ledger.disbursements_at(disbursed_at()).disburse(command).await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert_eq!(ledger.store.loan_count().await, 0);
}

#[tokio::test]
async fn test_each_disbursement_gets_a_fresh_loan_id() {
    let ledger = TestLedger::new();

    let mut ids = HashSet::new();
    for _ in 0..5 {
        let outcome = ledger.disburse(short_loan_command(4)).await;
        ids.insert(outcome.summary.loan_id);
    }

    assert_eq!(ids.len(), 5);
    assert_eq!(ledger.store.loan_count().await, 5);
}

#[tokio::test]
async fn test_disbursements_do_not_share_installments() {
    let ledger = TestLedger::new();
    let first = ledger.disburse(short_loan_command(4)).await;
    let second = ledger.disburse(short_loan_command(6)).await;

    let store = ledger.store();
    let mut uow = store.begin().await.unwrap();
    let first_rows = uow
        .get_installments_by_id(&first.summary.loan_id, InstallmentFilter::All)
        .await
        .unwrap();
    let second_rows = uow
        .get_installments_by_id(&second.summary.loan_id, InstallmentFilter::All)
        .await
        .unwrap();

    assert_eq!(first_rows.len(), 4);
    assert_eq!(second_rows.len(), 6);
}
