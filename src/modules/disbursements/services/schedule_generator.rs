use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::core::{AppError, Currency, Result, MAX_LEDGER_AMOUNT};
use crate::modules::loans::models::{CadenceUnit, MAX_INSTALLMENTS};

/// Loan terms the schedule is derived from
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTerms {
    pub principal: Decimal,
    /// Flat rate over the whole term, 0 < rate <= 1
    pub rate: Decimal,
    pub unit: CadenceUnit,
    pub count: u32,
    pub start_date: NaiveDate,
}

/// One row of a generated schedule, before it is attached to a loan
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledInstallment {
    pub installment_number: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

/// Result of [`ScheduleGenerator::generate`]
#[derive(Debug, Clone, PartialEq)]
pub struct AmortizationPlan {
    pub interest_amount: Decimal,
    /// Principal plus interest
    pub total_amount: Decimal,
    pub installment_amount: Decimal,
    pub installments: Vec<ScheduledInstallment>,
}

impl AmortizationPlan {
    pub fn first_due_date(&self) -> Option<NaiveDate> {
        self.installments.first().map(|i| i.due_date)
    }

    pub fn final_due_date(&self) -> Option<NaiveDate> {
        self.installments.last().map(|i| i.due_date)
    }

    /// `total - count * installment_amount`; bounded by half a minor unit per installment
    pub fn rounding_residual(&self) -> Decimal {
        self.total_amount - self.installment_amount * Decimal::from(self.installments.len())
    }
}

/// Flat-interest schedule generator
///
/// Interest is charged once on the principal. The total is split into equal
/// installments rounded to the currency's minor unit; the rounding remainder is
/// not folded into any installment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleGenerator {
    currency: Currency,
}

impl ScheduleGenerator {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn generate(&self, terms: &ScheduleTerms) -> Result<AmortizationPlan> {
        Self::validate(terms)?;

        let interest_amount = terms
            .principal
            .checked_mul(terms.rate)
            .map(|interest| self.currency.round(interest))
            .ok_or_else(|| Self::beyond_ledger(terms))?;
        let total_amount = terms
            .principal
            .checked_add(interest_amount)
            .filter(|total| *total <= MAX_LEDGER_AMOUNT)
            .ok_or_else(|| Self::beyond_ledger(terms))?;
        let installment_amount = total_amount
            .checked_div(Decimal::from(terms.count))
            .map(|amount| self.currency.round(amount))
            .ok_or_else(|| Self::beyond_ledger(terms))?;

        if installment_amount <= Decimal::ZERO {
            return Err(AppError::invalid_input(format!(
                "installment amount rounds to zero for {} installments of {}",
                terms.count, total_amount
            )));
        }

        let installments = (1..=terms.count)
            .map(|number| {
                Ok(ScheduledInstallment {
                    installment_number: number,
                    amount: installment_amount,
                    due_date: terms.unit.advance(terms.start_date, number)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            count = terms.count,
            unit = %terms.unit,
            %interest_amount,
            %installment_amount,
            "Generated installment schedule"
        );

        Ok(AmortizationPlan {
            interest_amount,
            total_amount,
            installment_amount,
            installments,
        })
    }

    fn validate(terms: &ScheduleTerms) -> Result<()> {
        if terms.principal <= Decimal::ZERO {
            return Err(AppError::invalid_input("principal_amount must be greater than 0"));
        }
        if terms.rate <= Decimal::ZERO {
            return Err(AppError::invalid_input("interest_rate must be greater than 0"));
        }
        if terms.rate > Decimal::ONE {
            return Err(AppError::invalid_input(
                "interest_rate must be less than or equal to 1",
            ));
        }
        if terms.count == 0 {
            return Err(AppError::invalid_input(
                "number_of_installment must be greater than 0",
            ));
        }
        if terms.count > MAX_INSTALLMENTS {
            return Err(AppError::invalid_input(format!(
                "number_of_installment must be at most {}",
                MAX_INSTALLMENTS
            )));
        }
        Ok(())
    }

    fn beyond_ledger(terms: &ScheduleTerms) -> AppError {
        AppError::invalid_input(format!(
            "principal_amount {} at interest_rate {} exceeds the ledger limit of {}",
            terms.principal, terms.rate, MAX_LEDGER_AMOUNT
        ))
    }
}
