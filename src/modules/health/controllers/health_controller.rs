use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::modules::loans::repositories::LoanStore;

pub const LIVENESS_MESSAGE: &str = "Billing Engine is live";

/// Liveness response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

/// Readiness probe response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessChecks {
    pub ledger: bool,
    pub application: bool,
}

/// GET /health - Liveness probe
/// Returns 200 whenever the process can answer; dependencies are not checked
pub async fn health_check() -> impl Responder {
    let response = HealthResponse {
        status: "healthy".to_string(),
        message: LIVENESS_MESSAGE.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}

/// GET /ready - Readiness probe
/// Returns 503 when the loan ledger cannot be reached
pub async fn readiness_check(store: web::Data<Arc<dyn LoanStore>>) -> impl Responder {
    let mut checks = ReadinessChecks {
        ledger: false,
        application: true,
    };

    match store.ping().await {
        Ok(()) => checks.ledger = true,
        Err(e) => tracing::error!("Ledger readiness check failed: {}", e),
    }

    let ready = checks.ledger && checks.application;
    let response = ReadinessResponse { ready, checks };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check));
}
