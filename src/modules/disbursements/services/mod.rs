pub mod disbursement_service;
pub mod schedule_generator;

pub use disbursement_service::{DisbursementOutcome, DisbursementService};
pub use schedule_generator::{
    AmortizationPlan, ScheduleGenerator, ScheduleTerms, ScheduledInstallment,
};
