//! Repayment allocation against a loan's installment schedule.

pub mod controllers;
pub mod models;
pub mod services;

pub use controllers::repayment_controller::configure;
pub use services::{PaymentAllocator, RepaymentService};
