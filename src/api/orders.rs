use actix_web::{web, Scope};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::CommerceError;
use crate::domain::order::{CreateOrder, OrderFilter, OrderStatus};
use super::errors::ApiResult;
use super::{created, ok, AppState};

// ============================================================================
// Order Routes
// ============================================================================

pub fn scope() -> Scope {
    web::scope("/orders")
        .route("", web::get().to(list_orders))
        .route("", web::post().to(create_order))
        .route("/status/{status}", web::get().to(orders_by_status))
        .route("/customer/{customer_id}", web::get().to(orders_by_customer))
        .route("/{id}", web::get().to(get_order))
        .route("/{id}", web::delete().to(delete_order))
        .route("/{id}/status", web::put().to(update_status))
        .route("/{id}/cancel", web::post().to(cancel_order))
        .route("/{id}/recalculate", web::post().to(recalculate_total))
        .route("/{id}/items", web::post().to(add_item))
        .route("/{id}/items/{item_id}", web::put().to(update_item))
        .route("/{id}/items/{item_id}", web::delete().to(remove_item))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<String>,
    customer_id: Option<Uuid>,
    #[serde(default)]
    include_deleted: bool,
}

#[derive(Debug, Deserialize)]
struct IncludeDeleted {
    #[serde(default)]
    include_deleted: bool,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: String,
}

#[derive(Debug, Default, Deserialize)]
struct CancelRequest {
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    product_id: Uuid,
    quantity: i32,
}

#[derive(Debug, Deserialize)]
struct QuantityRequest {
    quantity: i32,
}

fn parse_status(label: &str) -> Result<OrderStatus, CommerceError> {
    Ok(OrderStatus::parse(label)?)
}

async fn list_orders(state: web::Data<AppState>, query: web::Query<ListQuery>) -> ApiResult {
    let query = query.into_inner();
    let filter = OrderFilter {
        status: query.status.as_deref().map(parse_status).transpose()?,
        customer_id: query.customer_id,
        include_deleted: query.include_deleted,
    };
    Ok(ok(state.orders.list_orders(&filter).await?))
}

async fn orders_by_status(state: web::Data<AppState>, status: web::Path<String>) -> ApiResult {
    let filter = OrderFilter::by_status(parse_status(&status)?);
    Ok(ok(state.orders.list_orders(&filter).await?))
}

async fn orders_by_customer(state: web::Data<AppState>, customer_id: web::Path<Uuid>) -> ApiResult {
    let filter = OrderFilter::by_customer(customer_id.into_inner());
    Ok(ok(state.orders.list_orders(&filter).await?))
}

async fn get_order(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    query: web::Query<IncludeDeleted>,
) -> ApiResult {
    Ok(ok(state.orders.get_order(id.into_inner(), query.include_deleted).await?))
}

async fn create_order(state: web::Data<AppState>, body: web::Json<CreateOrder>) -> ApiResult {
    Ok(created(state.orders.create_order(body.into_inner()).await?))
}

async fn update_status(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<StatusRequest>,
) -> ApiResult {
    let status = parse_status(&body.status)?;
    Ok(ok(state.orders.update_order_status(id.into_inner(), status).await?))
}

async fn cancel_order(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: Option<web::Json<CancelRequest>>,
) -> ApiResult {
    let reason = body.map(|b| b.into_inner()).unwrap_or_default().reason;
    Ok(ok(state.orders.cancel_order(id.into_inner(), reason).await?))
}

async fn delete_order(state: web::Data<AppState>, id: web::Path<Uuid>) -> ApiResult {
    let id = id.into_inner();
    state.orders.delete_order(id).await?;
    Ok(ok(serde_json::json!({ "id": id, "deleted": true })))
}

async fn recalculate_total(state: web::Data<AppState>, id: web::Path<Uuid>) -> ApiResult {
    Ok(ok(state.orders.recalculate_order_total(id.into_inner()).await?))
}

async fn add_item(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<AddItemRequest>,
) -> ApiResult {
    let order = state
        .orders
        .add_item_to_order(id.into_inner(), body.product_id, body.quantity)
        .await?;
    Ok(created(order))
}

async fn update_item(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<QuantityRequest>,
) -> ApiResult {
    let (order_id, item_id) = path.into_inner();
    let order = state
        .orders
        .update_order_item_quantity(order_id, item_id, body.quantity)
        .await?;
    Ok(ok(order))
}

async fn remove_item(state: web::Data<AppState>, path: web::Path<(Uuid, Uuid)>) -> ApiResult {
    let (order_id, item_id) = path.into_inner();
    Ok(ok(state.orders.remove_order_item(order_id, item_id).await?))
}

#[cfg(test)]
mod tests {
    use crate::api::configure;
    use crate::api::test_support::state;
    use crate::application::testkit::TestApp;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use uuid::Uuid;

    #[actix_web::test]
    async fn test_order_lifecycle_over_http() {
        let app = TestApp::new();
        let ring = app.product("Silver Ring", "SILVER-RING-001", dec!(50), 5).await;
        let service = test::init_service(App::new().app_data(state(&app)).configure(configure)).await;

        // create
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({
                "customer_id": Uuid::new_v4(),
                "items": [{ "product_id": ring.id, "quantity": 2 }]
            }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "pending");
        let order_id = body["data"]["id"].as_str().unwrap().to_string();
        let item_id = body["data"]["items"][0]["id"].as_str().unwrap().to_string();

        // increase beyond stock
        let req = test::TestRequest::put()
            .uri(&format!("/orders/{order_id}/items/{item_id}"))
            .set_json(json!({ "quantity": 9 }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");

        // status
        let req = test::TestRequest::put()
            .uri(&format!("/orders/{order_id}/status"))
            .set_json(json!({ "status": "PROCESSING" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["status"], "processing");

        // cancel without a body
        let req = test::TestRequest::post()
            .uri(&format!("/orders/{order_id}/cancel"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["status"], "cancelled");
        assert_eq!(app.stock(ring.id).await, 5);

        // listing by status
        let req = test::TestRequest::get().uri("/orders/status/cancelled").to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_invalid_status_label_is_rejected() {
        let app = TestApp::new();
        let service = test::init_service(App::new().app_data(state(&app)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/orders/status/bogus").to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_ORDER_STATUS");
    }

    #[actix_web::test]
    async fn test_unknown_order_and_bad_payloads() {
        let app = TestApp::new();
        let service = test::init_service(App::new().app_data(state(&app)).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({ "customer_id": "not-a-uuid", "items": [] }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({ "customer_id": Uuid::new_v4(), "items": [] }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "EMPTY_ORDER");
    }

    #[actix_web::test]
    async fn test_item_routes_and_delete() {
        let app = TestApp::new();
        let ring = app.product("Silver Ring", "SILVER-RING-001", dec!(50), 10).await;
        let pearl = app.product("Pearl Bracelet", "PEARL-BRAC-001", dec!(35), 10).await;
        let order = app
            .order(vec![crate::domain::order::OrderLine { product_id: ring.id, quantity: 1 }])
            .await;
        let service = test::init_service(App::new().app_data(state(&app)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri(&format!("/orders/{}/items", order.id))
            .set_json(json!({ "product_id": pearl.id, "quantity": 2 }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["total_amount"]["amount"], "120.00");
        let pearl_item = body["data"]["items"][1]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::delete()
            .uri(&format!("/orders/{}/items/{pearl_item}", order.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
        assert_eq!(app.stock(pearl.id).await, 10);

        let req = test::TestRequest::post()
            .uri(&format!("/orders/{}/recalculate", order.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["total_amount"]["amount"], "50.00");

        let req = test::TestRequest::delete()
            .uri(&format!("/orders/{}", order.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;
        assert_eq!(body["data"]["deleted"], true);

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}?include_deleted=true", order.id))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
