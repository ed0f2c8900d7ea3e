use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{ApiResponse, Result};
use crate::modules::repayments::models::RepaymentRequest;
use crate::modules::repayments::services::RepaymentService;

/// POST /v1/repayment
///
/// # Returns
/// - 200: Installments settled, new outstanding amount and next due date
/// - 400: Validation failed, nothing pending, or amount does not match what is due
/// - 404: Loan not found
pub async fn repay(
    service: web::Data<Arc<RepaymentService>>,
    request: web::Json<RepaymentRequest>,
) -> Result<HttpResponse> {
    let command = request.into_inner().validate()?;
    let receipt = service.process_repayment(command).await?;

    Ok(ApiResponse::ok(receipt))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/repayment", web::post().to(repay));
}
