use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;

use crate::application::{OrderService, ProductService};
use crate::metrics::Metrics;
use crate::store::Store;

// ============================================================================
// HTTP API (actix-web)
// ============================================================================
//
// Thin JSON layer: each route extracts its input, calls one use case and
// wraps the result in {"success": true, "data": ...}. Failures render
// through `ApiError`.
//
// ============================================================================

mod errors;
mod orders;
mod products;

pub struct AppState {
    pub orders: Arc<OrderService>,
    pub products: Arc<ProductService>,
    pub store: Arc<dyn Store>,
    pub metrics: Arc<Metrics>,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope { success: true, data })
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(Envelope { success: true, data })
}

/// Register every route. Shared by `serve` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(errors::json_config())
        .app_data(errors::query_config())
        .app_data(errors::path_config())
        .route("/health", web::get().to(health_handler))
        .route("/metrics", web::get().to(metrics_handler))
        .service(products::scope())
        .service(orders::scope());
}

pub async fn serve(state: web::Data<AppState>, host: &str, port: u16) -> std::io::Result<()> {
    tracing::info!("🌐 Starting HTTP API on http://{}:{}", host, port);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind((host, port))?
        .run()
        .await
}

async fn metrics_handler(state: web::Data<AppState>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler(state: web::Data<AppState>) -> impl Responder {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "service": "order-inventory"
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "order-inventory"
            }))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::application::testkit::TestApp;

    pub fn state(app: &TestApp) -> web::Data<AppState> {
        web::Data::new(AppState {
            orders: app.orders.clone(),
            products: app.products.clone(),
            store: app.store.clone(),
            metrics: app.metrics.clone(),
        })
    }
}
