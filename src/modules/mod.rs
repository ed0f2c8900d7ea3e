pub mod disbursements;
pub mod health;
pub mod loan_queries;
pub mod loans;
pub mod repayments;
