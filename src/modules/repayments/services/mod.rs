pub mod payment_allocator;
pub mod repayment_service;

pub use payment_allocator::{AllocationPlan, PaymentAllocator, Settlement};
pub use repayment_service::RepaymentService;
