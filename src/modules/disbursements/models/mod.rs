pub mod disbursement;

pub use disbursement::{DisbursementCommand, DisbursementRequest, DisbursementResponse};
