use actix_web::{web, Scope};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::CommerceError;
use crate::domain::product::{CreateProduct, UpdateProduct};
use super::errors::ApiResult;
use super::{created, ok, AppState};

// ============================================================================
// Product Routes
// ============================================================================

pub fn scope() -> Scope {
    web::scope("/products")
        .route("", web::get().to(list_products))
        .route("", web::post().to(create_product))
        .route("/search", web::get().to(search_products))
        .route("/{id}", web::get().to(get_product))
        .route("/{id}", web::put().to(update_product))
        .route("/{id}", web::delete().to(delete_product))
        .route("/{id}/restock", web::post().to(restock_product))
}

#[derive(Debug, Deserialize)]
struct IncludeDeleted {
    #[serde(default)]
    include_deleted: bool,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    #[serde(default)]
    include_deleted: bool,
}

#[derive(Debug, Deserialize)]
struct RestockRequest {
    quantity: i32,
}

async fn list_products(state: web::Data<AppState>, query: web::Query<IncludeDeleted>) -> ApiResult {
    Ok(ok(state.products.list_products(query.include_deleted).await?))
}

async fn search_products(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> ApiResult {
    let keyword = query.q.as_deref().map(str::trim).unwrap_or_default();
    if keyword.is_empty() {
        return Err(CommerceError::Validation("Search keyword is required".to_string()).into());
    }
    Ok(ok(state.products.search_products(keyword, query.include_deleted).await?))
}

async fn get_product(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    query: web::Query<IncludeDeleted>,
) -> ApiResult {
    Ok(ok(state.products.get_product(id.into_inner(), query.include_deleted).await?))
}

async fn create_product(state: web::Data<AppState>, body: web::Json<CreateProduct>) -> ApiResult {
    Ok(created(state.products.create_product(body.into_inner()).await?))
}

async fn update_product(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<UpdateProduct>,
) -> ApiResult {
    Ok(ok(state.products.update_product(id.into_inner(), body.into_inner()).await?))
}

async fn restock_product(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<RestockRequest>,
) -> ApiResult {
    Ok(ok(state.products.restock_product(id.into_inner(), body.quantity).await?))
}

async fn delete_product(state: web::Data<AppState>, id: web::Path<Uuid>) -> ApiResult {
    let id = id.into_inner();
    state.products.delete_product(id).await?;
    Ok(ok(serde_json::json!({ "id": id, "deleted": true })))
}

#[cfg(test)]
mod tests {
    use crate::api::configure;
    use crate::api::test_support::state;
    use crate::application::testkit::TestApp;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_product_crud_over_http() {
        let app = TestApp::new();
        let service = test::init_service(App::new().app_data(state(&app)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/products")
            .set_json(json!({
                "name": "Pearl Bracelet",
                "price": "35.00",
                "stock_quantity": 20,
                "sku": "pearl-brac-001"
            }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["sku"], "PEARL-BRAC-001");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/products/{id}"))
            .set_json(json!({ "price": "39.50" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["price"]["amount"], "39.50");

        let req = test::TestRequest::post()
            .uri(&format!("/products/{id}/restock"))
            .set_json(json!({ "quantity": 5 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["stock_quantity"], 25);

        let req = test::TestRequest::get().uri("/products/search?q=pearl").to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::delete().uri(&format!("/products/{id}")).to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri(&format!("/products/{id}")).to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "PRODUCT_NOT_FOUND");
    }

    #[actix_web::test]
    async fn test_product_validation_errors() {
        let app = TestApp::new();
        let service = test::init_service(App::new().app_data(state(&app)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/products/search").to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/products")
            .set_json(json!({
                "name": "Broken",
                "price": "-5",
                "stock_quantity": 1,
                "sku": "BROKEN-1"
            }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_MONEY");

        let req = test::TestRequest::get().uri("/products/not-a-uuid").to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
