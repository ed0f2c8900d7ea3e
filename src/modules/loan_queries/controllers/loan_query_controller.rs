use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{ApiResponse, Result};
use crate::modules::loan_queries::services::LoanQueryService;

/// GET /v1/loans/{loan_id}/outstanding
pub async fn get_outstanding(
    service: web::Data<Arc<LoanQueryService>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let view = service.outstanding_balance(&path.into_inner()).await?;
    Ok(ApiResponse::ok(view))
}

/// GET /v1/loans/{loan_id}/delinquency
pub async fn get_delinquency(
    service: web::Data<Arc<LoanQueryService>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let view = service.delinquency(&path.into_inner()).await?;
    Ok(ApiResponse::ok(view))
}

/// GET /v1/loans/{loan_id}/schedule
pub async fn get_schedule(
    service: web::Data<Arc<LoanQueryService>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let view = service.schedule(&path.into_inner()).await?;
    Ok(ApiResponse::ok(view))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/loans/{loan_id}")
            .route("/outstanding", web::get().to(get_outstanding))
            .route("/delinquency", web::get().to(get_delinquency))
            .route("/schedule", web::get().to(get_schedule)),
    );
}
