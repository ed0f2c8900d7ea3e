//! Billing engine for fixed-cadence installment loans
//!
//! Disburses loans into flat-interest installment schedules, applies exact-amount
//! repayments against them, and answers balance, delinquency and schedule queries.

pub mod app;
pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use app::AppServices;
pub use modules::disbursements;
pub use modules::loan_queries;
pub use modules::loans;
pub use modules::repayments;
