//! Loan ledger: entities shared by the disbursement, repayment and query slices,
//! and the storage collaborators that persist them.

pub mod models;
pub mod repositories;

pub use models::*;
pub use repositories::{
    FailPoint, InMemoryLoanStore, InstallmentFilter, LoanStore, LoanUnitOfWork, MySqlLoanStore,
};
