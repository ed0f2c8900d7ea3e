use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{ApiResponse, Result};
use crate::modules::disbursements::models::{DisbursementRequest, DisbursementResponse};
use crate::modules::disbursements::services::DisbursementService;

/// POST /v1/disbursement
///
/// Creates a loan and its installment schedule.
///
/// # Returns
/// - 200: Loan identity, amounts and first/final due dates
/// - 400: Field validation failed
/// - 500: Ledger write failed; nothing was persisted
pub async fn disburse(
    service: web::Data<Arc<DisbursementService>>,
    request: web::Json<DisbursementRequest>,
) -> Result<HttpResponse> {
    let command = request.into_inner().validate()?;
    let outcome = service.disburse(command).await?;

    Ok(ApiResponse::ok(DisbursementResponse::from(outcome)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/disbursement", web::post().to(disburse));
}
