pub mod loan_projector;
pub mod loan_query_service;

pub use loan_projector::{LoanProjector, DELINQUENCY_THRESHOLD};
pub use loan_query_service::LoanQueryService;
