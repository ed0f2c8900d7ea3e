// Integration Tests for the repayment flow
//
// Disburses loans into the in-memory ledger, then applies repayments at
// chosen instants and checks receipts and committed state.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use billing_engine::core::AppError;
use billing_engine::loans::models::{InstallmentStatus, LoanStatus, PaymentAction};
use billing_engine::loans::{FailPoint, InstallmentFilter};
use helpers::test_data::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn outstanding(ledger: &TestLedger, loan_id: &str) -> Decimal {
    let store = ledger.store();
    let mut uow = store.begin().await.unwrap();
    uow.get_loan_summary_by_id(loan_id)
        .await
        .unwrap()
        .expect("loan exists")
        .outstanding_amount
}

async fn paid_numbers(ledger: &TestLedger, loan_id: &str) -> Vec<u32> {
    let store = ledger.store();
    let mut uow = store.begin().await.unwrap();
    uow.get_installments_by_id(loan_id, InstallmentFilter::Paid)
        .await
        .unwrap()
        .iter()
        .map(|i| i.installment_number)
        .collect()
}

#[tokio::test]
async fn test_overdue_installments_are_cleared_together() {
    let ledger = TestLedger::new();
    let loan = ledger.disburse_weekly_loan().await;
    let loan_id = loan.summary.loan_id.as_str();

    let receipt = ledger
        .repayments_at(at(2025, 9, 15, 10))
        .process_repayment(repay(loan_id, dec!(220000)))
        .await
        .unwrap();

    assert_eq!(receipt.installments_paid, 2);
    assert_eq!(receipt.remaining_installments, 48);
    assert_eq!(receipt.outstanding_amount, dec!(5280000.00));
    assert_eq!(receipt.next_due_date, Some(date(2025, 9, 21)));
    assert_eq!(receipt.payment_date, at(2025, 9, 15, 10));
    assert_eq!(receipt.loan_status, LoanStatus::Pending);

    assert_eq!(paid_numbers(&ledger, loan_id).await, vec![1, 2]);
    assert_eq!(outstanding(&ledger, loan_id).await, dec!(5280000.00));

    let history = ledger.store.payment_history(loan_id).await;
    assert_eq!(history.len(), 2);
    assert!(history
        .iter()
        .all(|h| h.action == PaymentAction::Payment && h.status == InstallmentStatus::Paid));
    assert_eq!(
        history.iter().map(|h| h.installment_due_date).collect::<Vec<_>>(),
        vec![date(2025, 9, 7), date(2025, 9, 14)]
    );
}

#[tokio::test]
async fn test_partial_payment_of_overdue_leaves_ledger_untouched() {
    let ledger = TestLedger::new();
    let loan = ledger.disburse_weekly_loan().await;
    let loan_id = loan.summary.loan_id.as_str();

    let result = ledger
        .repayments_at(at(2025, 9, 15, 10))
        .process_repayment(repay(loan_id, dec!(100000)))
        .await;

    match result {
        Err(AppError::AmountMismatch { tendered, required }) => {
            assert_eq!(tendered, dec!(100000));
            assert_eq!(required, dec!(220000.00));
        }
        other => panic!("expected amount mismatch, got {:?}", other),
    }

    assert!(paid_numbers(&ledger, loan_id).await.is_empty());
    assert_eq!(outstanding(&ledger, loan_id).await, dec!(5500000.00));
    assert!(ledger.store.payment_history(loan_id).await.is_empty());
}

#[tokio::test]
async fn test_on_time_payment_settles_next_installment_only() {
    let ledger = TestLedger::new();
    let loan = ledger.disburse_weekly_loan().await;
    let loan_id = loan.summary.loan_id.as_str();

    let receipt = ledger
        .repayments_at(at(2025, 9, 3, 8))
        .process_repayment(repay(loan_id, dec!(110000.00)))
        .await
        .unwrap();

    assert_eq!(receipt.installments_paid, 1);
    assert_eq!(receipt.remaining_installments, 49);
    assert_eq!(receipt.next_due_date, Some(date(2025, 9, 14)));
}

#[tokio::test]
async fn test_repeating_settled_overdue_payment_is_rejected() {
    let ledger = TestLedger::new();
    let loan = ledger.disburse_weekly_loan().await;
    let loan_id = loan.summary.loan_id.as_str();
    let service = ledger.repayments_at(at(2025, 9, 15, 10));

    service
        .process_repayment(repay(loan_id, dec!(220000)))
        .await
        .unwrap();
    let repeat = service
        .process_repayment(repay(loan_id, dec!(220000)))
        .await;

    assert!(matches!(repeat, Err(AppError::AmountMismatch { .. })));
    assert_eq!(outstanding(&ledger, loan_id).await, dec!(5280000.00));
}

#[tokio::test]
async fn test_repeated_on_time_payment_settles_next_installment() {
    let ledger = TestLedger::new();
    let loan = ledger.disburse_weekly_loan().await;
    let loan_id = loan.summary.loan_id.as_str();
    let service = ledger.repayments_at(at(2025, 9, 3, 8));

    service
        .process_repayment(repay(loan_id, dec!(110000)))
        .await
        .unwrap();
    let second = service
        .process_repayment(repay(loan_id, dec!(110000)))
        .await
        .unwrap();

    assert_eq!(second.remaining_installments, 48);
    assert_eq!(paid_numbers(&ledger, loan_id).await, vec![1, 2]);
    assert_eq!(outstanding(&ledger, loan_id).await, dec!(5280000.00));
}

#[tokio::test]
async fn test_final_payment_settles_loan() {
    let ledger = TestLedger::new();
    let loan = ledger.disburse(short_loan_command(2)).await;
    let loan_id = loan.summary.loan_id.as_str();
    assert_eq!(loan.summary.installment_amount, dec!(550000.00));

    let service = ledger.repayments_at(at(2025, 9, 20, 12));
    let receipt = service
        .process_repayment(repay(loan_id, dec!(1100000)))
        .await
        .unwrap();

    assert_eq!(receipt.installments_paid, 2);
    assert_eq!(receipt.remaining_installments, 0);
    assert_eq!(receipt.outstanding_amount, Decimal::ZERO);
    assert_eq!(receipt.next_due_date, None);
    assert_eq!(receipt.loan_status, LoanStatus::Paid);

    let store = ledger.store();
    let mut uow = store.begin().await.unwrap();
    let summary = uow.get_loan_summary_by_id(loan_id).await.unwrap().unwrap();
    assert!(summary.is_paid());
}

#[tokio::test]
async fn test_paid_off_loan_has_nothing_to_pay() {
    let ledger = TestLedger::new();
    let loan = ledger.disburse(short_loan_command(1)).await;
    let loan_id = loan.summary.loan_id.as_str();
    let service = ledger.repayments_at(at(2025, 9, 5, 12));

    service
        .process_repayment(repay(loan_id, dec!(1100000)))
        .await
        .unwrap();
    let result = service
        .process_repayment(repay(loan_id, dec!(1100000)))
        .await;

    assert!(matches!(result, Err(AppError::NoPendingInstallments(id)) if id == loan_id));
    assert_eq!(ledger.store.payment_history(loan_id).await.len(), 1);
}

#[tokio::test]
async fn test_unknown_loan_is_not_found() {
    let ledger = TestLedger::new();

    let result = ledger
        .repayments_at(at(2025, 9, 5, 12))
        .process_repayment(repay("loan_missing", dec!(110000)))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_failed_write_rolls_back_whole_repayment() {
    for point in [
        FailPoint::UpdateInstallments,
        FailPoint::CreatePaymentHistory,
        FailPoint::UpdateLoanSummary,
        FailPoint::Commit,
    ] {
        let ledger = TestLedger::new();
        let loan = ledger.disburse_weekly_loan().await;
        let loan_id = loan.summary.loan_id.as_str();
        ledger.store.inject_failure(point).await;

        let result = ledger
            .repayments_at(at(2025, 9, 15, 10))
            .process_repayment(repay(loan_id, dec!(220000)))
            .await;

        assert!(
            matches!(result, Err(AppError::Persistence(_))),
            "expected persistence error at {:?}",
            point
        );
        assert!(paid_numbers(&ledger, loan_id).await.is_empty());
        assert_eq!(outstanding(&ledger, loan_id).await, dec!(5500000.00));
        assert!(ledger.store.payment_history(loan_id).await.is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_repayments_apply_one_at_a_time() {
    let ledger = TestLedger::new();
    let loan = ledger.disburse_weekly_loan().await;
    let loan_id = loan.summary.loan_id.clone();
    let service = Arc::new(ledger.repayments_at(at(2025, 9, 15, 10)));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let service = Arc::clone(&service);
            let loan_id = loan_id.clone();
            tokio::spawn(async move {
                service
                    .process_repayment(repay(&loan_id, dec!(220000)))
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    let mut mismatched = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(receipt) => {
                assert_eq!(receipt.installments_paid, 2);
                accepted += 1;
            }
            Err(AppError::AmountMismatch { required, .. }) => {
                // Once the overdue pair is settled only the next installment is due
                assert_eq!(required, dec!(110000.00));
                mismatched += 1;
            }
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!((accepted, mismatched), (1, 1));
    assert_eq!(outstanding(&ledger, &loan_id).await, dec!(5280000.00));
    assert_eq!(ledger.store.payment_history(&loan_id).await.len(), 2);
}
