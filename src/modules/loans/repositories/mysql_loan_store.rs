use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Transaction};

use super::loan_store::{InstallmentFilter, LoanStore, LoanUnitOfWork};
use crate::core::{AppError, AuditFields, Currency, Result};
use crate::modules::loans::models::{
    DisbursementDetail, Installment, LoanSummary, PaymentHistory,
};

const LOAN_SUMMARY_COLUMNS: &str = r#"
    id, loan_id, customer_id, principal_amount, interest_amount, outstanding_amount,
    no_of_installment, installment_unit, installment_amount, effective_interest_rate,
    status, loan_start_date, created_at, created_by, updated_at, updated_by,
    deleted_at, deleted_by
"#;

const PAYMENT_SCHEDULE_COLUMNS: &str = r#"
    id, loan_id, installment_number, installment_amount, due_date, installment_paid,
    status, currency, created_at, created_by, updated_at, updated_by, deleted_at, deleted_by
"#;

/// Loan ledger backed by MySQL
///
/// Each unit of work is one database transaction.
#[derive(Clone)]
pub struct MySqlLoanStore {
    pool: MySqlPool,
}

impl MySqlLoanStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStore for MySqlLoanStore {
    async fn begin(&self) -> Result<Box<dyn LoanUnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::persistence(format!("Failed to start transaction: {}", e)))?;

        Ok(Box::new(MySqlUnitOfWork { tx }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Open MySQL transaction; rolled back by sqlx when dropped uncommitted
pub struct MySqlUnitOfWork {
    tx: Transaction<'static, MySql>,
}

impl MySqlUnitOfWork {
    async fn fetch_summary(&mut self, loan_id: &str, for_update: bool) -> Result<Option<LoanSummary>> {
        let sql = format!(
            "SELECT {} FROM loan_summary WHERE loan_id = ? AND deleted_at IS NULL{}",
            LOAN_SUMMARY_COLUMNS,
            if for_update { " FOR UPDATE" } else { "" }
        );

        let row = sqlx::query_as::<_, LoanSummaryRow>(&sql)
            .bind(loan_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| AppError::persistence(format!("Failed to fetch loan summary: {}", e)))?;

        row.map(LoanSummary::try_from).transpose()
    }
}

#[async_trait]
impl LoanUnitOfWork for MySqlUnitOfWork {
    async fn get_loan_summary_by_id(&mut self, loan_id: &str) -> Result<Option<LoanSummary>> {
        self.fetch_summary(loan_id, false).await
    }

    async fn lock_loan_summary(&mut self, loan_id: &str) -> Result<Option<LoanSummary>> {
        self.fetch_summary(loan_id, true).await
    }

    async fn get_installments_by_id(
        &mut self,
        loan_id: &str,
        filter: InstallmentFilter,
    ) -> Result<Vec<Installment>> {
        let condition = match filter {
            InstallmentFilter::All => "",
            InstallmentFilter::Overdue { .. } => " AND status = 'PENDING' AND due_date < ?",
            InstallmentFilter::Paid => " AND status = 'PAID'",
            InstallmentFilter::Pending => " AND status = 'PENDING'",
        };
        let sql = format!(
            "SELECT {} FROM payment_schedule WHERE loan_id = ? AND deleted_at IS NULL{} \
             ORDER BY installment_number ASC",
            PAYMENT_SCHEDULE_COLUMNS, condition
        );

        let mut query = sqlx::query_as::<_, PaymentScheduleRow>(&sql).bind(loan_id);
        if let InstallmentFilter::Overdue { as_of } = filter {
            query = query.bind(as_of);
        }

        let rows = query
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| AppError::persistence(format!("Failed to fetch installments: {}", e)))?;

        rows.into_iter().map(Installment::try_from).collect()
    }

    async fn get_next_due_date_by_id(&mut self, loan_id: &str) -> Result<Option<NaiveDate>> {
        let next = sqlx::query_scalar::<_, Option<NaiveDate>>(
            r#"
            SELECT MIN(due_date)
            FROM payment_schedule
            WHERE loan_id = ? AND status = 'PENDING' AND deleted_at IS NULL
            "#,
        )
        .bind(loan_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| AppError::persistence(format!("Failed to fetch next due date: {}", e)))?;

        Ok(next)
    }

    async fn create_disbursement_detail(&mut self, detail: &DisbursementDetail) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO disbursement_details (
                loan_id, customer_id, disbursement_date, disbursement_amount, currency,
                status, created_at, created_by, updated_at, updated_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&detail.loan_id)
        .bind(&detail.customer_id)
        .bind(detail.disbursement_date)
        .bind(detail.disbursement_amount)
        .bind(detail.currency.as_str())
        .bind(detail.status.as_str())
        .bind(detail.audit.created_at)
        .bind(&detail.audit.created_by)
        .bind(detail.audit.updated_at)
        .bind(&detail.audit.updated_by)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            AppError::persistence(format!("Failed to insert disbursement detail: {}", e))
        })?;

        Ok(result.last_insert_id())
    }

    async fn create_loan_summary(&mut self, summary: &LoanSummary) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO loan_summary (
                loan_id, customer_id, principal_amount, interest_amount, outstanding_amount,
                no_of_installment, installment_unit, installment_amount,
                effective_interest_rate, status, loan_start_date,
                created_at, created_by, updated_at, updated_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&summary.loan_id)
        .bind(&summary.customer_id)
        .bind(summary.principal_amount)
        .bind(summary.interest_amount)
        .bind(summary.outstanding_amount)
        .bind(summary.no_of_installment)
        .bind(summary.installment_unit.as_str())
        .bind(summary.installment_amount)
        .bind(summary.effective_interest_rate)
        .bind(summary.status.as_str())
        .bind(summary.loan_start_date)
        .bind(summary.audit.created_at)
        .bind(&summary.audit.created_by)
        .bind(summary.audit.updated_at)
        .bind(&summary.audit.updated_by)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::persistence(format!("Failed to insert loan summary: {}", e)))?;

        Ok(result.last_insert_id())
    }

    async fn create_installments(&mut self, installments: &[Installment]) -> Result<()> {
        for installment in installments {
            sqlx::query(
                r#"
                INSERT INTO payment_schedule (
                    loan_id, installment_number, installment_amount, due_date,
                    installment_paid, status, currency,
                    created_at, created_by, updated_at, updated_by
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&installment.loan_id)
            .bind(installment.installment_number)
            .bind(installment.installment_amount)
            .bind(installment.due_date)
            .bind(installment.installment_paid)
            .bind(installment.status.as_str())
            .bind(installment.currency.as_str())
            .bind(installment.audit.created_at)
            .bind(&installment.audit.created_by)
            .bind(installment.audit.updated_at)
            .bind(&installment.audit.updated_by)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::persistence(format!("Failed to insert installment: {}", e)))?;
        }

        Ok(())
    }

    async fn create_payment_history(&mut self, history: &[PaymentHistory]) -> Result<()> {
        for entry in history {
            sqlx::query(
                r#"
                INSERT INTO payment_schedule_history (
                    schedule_id, loan_id, action, installment_number, installment_amount,
                    installment_due_date, status, currency, created_at, created_by
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.schedule_id)
            .bind(&entry.loan_id)
            .bind(entry.action.as_str())
            .bind(entry.installment_number)
            .bind(entry.installment_amount)
            .bind(entry.installment_due_date)
            .bind(entry.status.as_str())
            .bind(entry.currency.as_str())
            .bind(entry.created_at)
            .bind(&entry.created_by)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                AppError::persistence(format!("Failed to insert payment history: {}", e))
            })?;
        }

        Ok(())
    }

    async fn update_installments(&mut self, installments: &[Installment]) -> Result<()> {
        for installment in installments {
            let rows_affected = sqlx::query(
                r#"
                UPDATE payment_schedule
                SET installment_paid = ?, status = ?, updated_at = ?, updated_by = ?
                WHERE id = ? AND deleted_at IS NULL
                "#,
            )
            .bind(installment.installment_paid)
            .bind(installment.status.as_str())
            .bind(installment.audit.updated_at)
            .bind(&installment.audit.updated_by)
            .bind(installment.id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::persistence(format!("Failed to update installment: {}", e)))?
            .rows_affected();

            if rows_affected == 0 {
                return Err(AppError::persistence(format!(
                    "Installment {} of loan {} was not updated",
                    installment.installment_number, installment.loan_id
                )));
            }
        }

        Ok(())
    }

    async fn update_loan_summary(&mut self, summary: &LoanSummary) -> Result<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE loan_summary
            SET outstanding_amount = ?, status = ?, updated_at = ?, updated_by = ?
            WHERE loan_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(summary.outstanding_amount)
        .bind(summary.status.as_str())
        .bind(summary.audit.updated_at)
        .bind(&summary.audit.updated_by)
        .bind(&summary.loan_id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::persistence(format!("Failed to update loan summary: {}", e)))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::persistence(format!(
                "Loan summary {} was not updated",
                summary.loan_id
            )));
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::persistence(format!("Failed to commit transaction: {}", e)))
    }
}

/// Database row representation for the loan_summary table
#[derive(sqlx::FromRow)]
struct LoanSummaryRow {
    id: u64,
    loan_id: String,
    customer_id: String,
    principal_amount: Decimal,
    interest_amount: Decimal,
    outstanding_amount: Decimal,
    no_of_installment: u32,
    installment_unit: String,
    installment_amount: Decimal,
    effective_interest_rate: Decimal,
    status: String,
    loan_start_date: NaiveDate,
    created_at: NaiveDateTime,
    created_by: String,
    updated_at: NaiveDateTime,
    updated_by: String,
    deleted_at: Option<NaiveDateTime>,
    deleted_by: Option<String>,
}

impl TryFrom<LoanSummaryRow> for LoanSummary {
    type Error = AppError;

    fn try_from(row: LoanSummaryRow) -> Result<Self> {
        Ok(LoanSummary {
            id: row.id,
            loan_id: row.loan_id,
            customer_id: row.customer_id,
            principal_amount: row.principal_amount,
            interest_amount: row.interest_amount,
            outstanding_amount: row.outstanding_amount,
            no_of_installment: row.no_of_installment,
            installment_unit: row.installment_unit.try_into().map_err(AppError::Internal)?,
            installment_amount: row.installment_amount,
            effective_interest_rate: row.effective_interest_rate,
            status: row.status.try_into().map_err(AppError::Internal)?,
            loan_start_date: row.loan_start_date,
            audit: AuditFields {
                created_at: row.created_at,
                created_by: row.created_by,
                updated_at: row.updated_at,
                updated_by: row.updated_by,
                deleted_at: row.deleted_at,
                deleted_by: row.deleted_by,
            },
        })
    }
}

/// Database row representation for the payment_schedule table
#[derive(sqlx::FromRow)]
struct PaymentScheduleRow {
    id: u64,
    loan_id: String,
    installment_number: u32,
    installment_amount: Decimal,
    due_date: NaiveDate,
    installment_paid: Decimal,
    status: String,
    currency: String,
    created_at: NaiveDateTime,
    created_by: String,
    updated_at: NaiveDateTime,
    updated_by: String,
    deleted_at: Option<NaiveDateTime>,
    deleted_by: Option<String>,
}

impl TryFrom<PaymentScheduleRow> for Installment {
    type Error = AppError;

    fn try_from(row: PaymentScheduleRow) -> Result<Self> {
        let currency: Currency = row.currency.try_into().map_err(AppError::Internal)?;

        Ok(Installment {
            id: row.id,
            loan_id: row.loan_id,
            installment_number: row.installment_number,
            installment_amount: row.installment_amount,
            due_date: row.due_date,
            installment_paid: row.installment_paid,
            status: row.status.try_into().map_err(AppError::Internal)?,
            currency,
            audit: AuditFields {
                created_at: row.created_at,
                created_by: row.created_by,
                updated_at: row.updated_at,
                updated_by: row.updated_by,
                deleted_at: row.deleted_at,
                deleted_by: row.deleted_by,
            },
        })
    }
}
