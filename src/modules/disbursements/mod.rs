//! Loan disbursement: validate terms, generate the schedule, persist the loan.

pub mod controllers;
pub mod models;
pub mod services;

pub use controllers::disbursement_controller::configure;
pub use services::{DisbursementService, ScheduleGenerator};
