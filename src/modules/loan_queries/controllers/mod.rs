pub mod loan_query_controller;
