pub mod audit;
pub mod currency;
pub mod error;
pub mod response;
pub mod timezone;

pub use audit::{AuditFields, AuditStamp, Audited, SYSTEM_ACTOR};
pub use currency::{Currency, MAX_LEDGER_AMOUNT};
pub use error::{AppError, Result};
pub use response::ApiResponse;
pub use timezone::{Clock, FixedClock, SystemClock};
