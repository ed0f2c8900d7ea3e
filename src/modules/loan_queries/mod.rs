//! Read-only loan views: outstanding balance, delinquency, full schedule.

pub mod controllers;
pub mod models;
pub mod services;

pub use controllers::loan_query_controller::configure;
pub use services::{LoanProjector, LoanQueryService};
