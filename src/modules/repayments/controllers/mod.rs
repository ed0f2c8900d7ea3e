pub mod repayment_controller;
