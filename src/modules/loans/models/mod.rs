pub mod cadence;
pub mod disbursement_detail;
pub mod installment;
pub mod loan_summary;
pub mod payment_history;

pub use cadence::{CadenceUnit, MAX_INSTALLMENTS};
pub use disbursement_detail::DisbursementDetail;
pub use installment::{Installment, InstallmentStatus};
pub use loan_summary::{LoanStatus, LoanSummary};
pub use payment_history::{PaymentAction, PaymentHistory};
