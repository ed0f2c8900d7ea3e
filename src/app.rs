use std::sync::Arc;

use actix_web::web;

use crate::core::{Clock, Currency};
use crate::middleware::json_error_handler;
use crate::modules::disbursements::{DisbursementService, ScheduleGenerator};
use crate::modules::health;
use crate::modules::loan_queries::{LoanProjector, LoanQueryService};
use crate::modules::loans::LoanStore;
use crate::modules::repayments::{PaymentAllocator, RepaymentService};
use crate::modules::{disbursements, loan_queries, repayments};

/// Services shared by every HTTP worker
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn LoanStore>,
    pub disbursements: Arc<DisbursementService>,
    pub repayments: Arc<RepaymentService>,
    pub queries: Arc<LoanQueryService>,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn LoanStore>,
        clock: Arc<dyn Clock>,
        currency: Currency,
        actor: &str,
    ) -> Self {
        Self {
            disbursements: Arc::new(DisbursementService::new(
                store.clone(),
                clock.clone(),
                ScheduleGenerator::new(currency),
                actor,
            )),
            repayments: Arc::new(RepaymentService::new(
                store.clone(),
                clock.clone(),
                PaymentAllocator::new(),
                actor,
            )),
            queries: Arc::new(LoanQueryService::new(
                store.clone(),
                clock,
                LoanProjector::new(),
            )),
            store,
        }
    }

    /// Register shared state and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.store.clone()))
            .app_data(web::Data::new(self.disbursements.clone()))
            .app_data(web::Data::new(self.repayments.clone()))
            .app_data(web::Data::new(self.queries.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .configure(health::configure)
            .configure(disbursements::configure)
            .configure(repayments::configure)
            .configure(loan_queries::configure);
    }
}
