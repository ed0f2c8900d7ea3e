pub mod repayment;

pub use repayment::{RepaymentCommand, RepaymentReceipt, RepaymentRequest};
