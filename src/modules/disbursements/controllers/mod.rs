pub mod disbursement_controller;
