use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminToken;
use crate::domain::order::{Address, Order, OrderItem, OrderStatus};
use crate::errors::AppError;
use crate::AppOrderService;

pub const STATUS_UPDATED: &str = "Status Updated";

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Common `{success, message}` body shared by every order endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()) }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub address: Address,
    /// Decimal total as a string to avoid floating-point issues, e.g. "19.99"
    pub amount: String,
    pub payment_method: String,
    pub payment: bool,
    /// Creation time in milliseconds since the Unix epoch
    pub date: i64,
    pub status: OrderStatus,
}

impl OrderResponse {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.date)
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            user_id: o.user_id,
            items: o.items,
            address: o.address,
            amount: o.amount.to_string(),
            payment_method: o.payment_method,
            payment: o.payment,
            date: o.date.timestamp_millis(),
            status: o.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListOrdersResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<OrderResponse>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_id: String,
    /// One of "Order Placed", "Packing", "Shipped", "Out for delivery", "Delivered"
    pub status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/order/list
///
/// Returns every order, most recently placed first. No pagination.
#[utoipa::path(
    post,
    path = "/api/order/list",
    params(
        ("token" = String, Header, description = "Admin token"),
    ),
    responses(
        (status = 200, description = "All orders, newest first", body = ListOrdersResponse),
        (status = 401, description = "Missing or invalid admin token", body = Envelope),
        (status = 500, description = "Internal server error", body = Envelope),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    _admin: AdminToken,
    service: web::Data<AppOrderService>,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || service.list_orders())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    debug!("Returning {} orders", orders.len());

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        success: true,
        orders: Some(orders.into_iter().map(OrderResponse::from).collect()),
        message: None,
    }))
}

/// POST /api/order/status
///
/// Overwrites the status of one order. Every other field is left untouched.
/// Unknown orders and unrecognised statuses are reported with `success: false`.
#[utoipa::path(
    post,
    path = "/api/order/status",
    params(
        ("token" = String, Header, description = "Admin token"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Outcome of the update", body = Envelope),
        (status = 401, description = "Missing or invalid admin token", body = Envelope),
        (status = 500, description = "Internal server error", body = Envelope),
    ),
    tag = "orders"
)]
pub async fn update_status(
    _admin: AdminToken,
    service: web::Data<AppOrderService>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let UpdateStatusRequest { order_id, status } = body.into_inner();

    web::block(move || service.update_status(&order_id, &status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(Envelope::ok(STATUS_UPDATED)))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use bigdecimal::BigDecimal;
    use serde_json::{json, Value};

    use super::*;
    use crate::application::order_service::OrderService;
    use crate::auth::AdminAuth;
    use crate::domain::order::NewOrder;
    use crate::infrastructure::memory_repo::InMemoryOrderRepository;

    fn admin() -> AdminAuth {
        AdminAuth::new("secret", "admin@shop.test", "pw")
    }

    fn service_with(count: usize) -> (web::Data<AppOrderService>, Vec<Uuid>) {
        let service = OrderService::boxed(InMemoryOrderRepository::new());
        let ids = (0..count)
            .map(|i| {
                service
                    .place_order(NewOrder {
                        user_id: format!("user-{i}"),
                        items: vec![OrderItem {
                            name: format!("Item {i}"),
                            quantity: 1,
                            size: "S".to_string(),
                        }],
                        address: Address::default(),
                        amount: BigDecimal::from_str("10.00").unwrap(),
                        payment_method: "Stripe".to_string(),
                        payment: true,
                    })
                    .unwrap()
                    .id
            })
            .collect();
        (web::Data::new(service), ids)
    }

    macro_rules! app {
        ($service:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(admin()))
                    .app_data($service.clone())
                    .configure(crate::configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn list_returns_orders_newest_first() {
        let (service, ids) = service_with(3);
        let app = app!(service);

        let req = test::TestRequest::post()
            .uri("/api/order/list")
            .insert_header(("token", admin().issue_token().unwrap()))
            .to_request();
        let body: ListOrdersResponse = test::call_and_read_body_json(&app, req).await;

        assert!(body.success);
        let listed: Vec<Uuid> = body.orders.unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(listed, ids.into_iter().rev().collect::<Vec<_>>());
    }

    #[actix_web::test]
    async fn list_without_token_is_unauthorized() {
        let (service, _) = service_with(1);
        let app = app!(service);

        let req = test::TestRequest::post().uri("/api/order/list").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"success": false, "message": "Not Authorized Login Again"}));
    }

    #[actix_web::test]
    async fn list_with_forged_token_is_unauthorized() {
        let (service, _) = service_with(1);
        let app = app!(service);

        let forged = AdminAuth::new("guess", "admin@shop.test", "pw").issue_token().unwrap();
        let req = test::TestRequest::post()
            .uri("/api/order/list")
            .insert_header(("token", forged))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn status_update_persists_and_is_visible_on_next_list() {
        let (service, ids) = service_with(2);
        let app = app!(service);
        let token = admin().issue_token().unwrap();
        let target = ids[0];

        let before: ListOrdersResponse = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/order/list")
                .insert_header(("token", token.clone()))
                .to_request(),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/order/status")
            .insert_header(("token", token.clone()))
            .set_json(json!({"orderId": target, "status": "Shipped"}))
            .to_request();
        let ack: Envelope = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ack, Envelope::ok(STATUS_UPDATED));

        let after: ListOrdersResponse = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/order/list")
                .insert_header(("token", token))
                .to_request(),
        )
        .await;

        let before = before.orders.unwrap();
        let after = after.orders.unwrap();
        for (old, new) in before.iter().zip(after.iter()) {
            if new.id == target {
                assert_eq!(new.status, OrderStatus::Shipped);
                assert_eq!(OrderResponse { status: old.status, ..new.clone() }, *old);
            } else {
                assert_eq!(new, old);
            }
        }
    }

    #[actix_web::test]
    async fn status_update_for_unknown_order_reports_not_found() {
        let (service, _) = service_with(1);
        let app = app!(service);
        let snapshot = service.list_orders().unwrap();

        let req = test::TestRequest::post()
            .uri("/api/order/status")
            .insert_header(("token", admin().issue_token().unwrap()))
            .set_json(json!({"orderId": Uuid::new_v4(), "status": "Packing"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Envelope = test::read_body_json(resp).await;
        assert_eq!(body, Envelope::failure("Order not found"));
        assert_eq!(service.list_orders().unwrap(), snapshot);
    }

    #[actix_web::test]
    async fn status_update_rejects_values_outside_the_enumeration() {
        let (service, ids) = service_with(1);
        let app = app!(service);

        let req = test::TestRequest::post()
            .uri("/api/order/status")
            .insert_header(("token", admin().issue_token().unwrap()))
            .set_json(json!({"orderId": ids[0], "status": "Teleported"}))
            .to_request();
        let body: Envelope = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, Envelope::failure("Invalid order status: Teleported"));
        assert_eq!(
            service.get_order(ids[0]).unwrap().unwrap().status,
            OrderStatus::OrderPlaced
        );
    }

    #[actix_web::test]
    async fn status_update_without_token_never_touches_the_store() {
        let (service, ids) = service_with(1);
        let app = app!(service);

        let req = test::TestRequest::post()
            .uri("/api/order/status")
            .set_json(json!({"orderId": ids[0], "status": "Delivered"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            service.get_order(ids[0]).unwrap().unwrap().status,
            OrderStatus::OrderPlaced
        );
    }

    #[actix_web::test]
    async fn malformed_body_is_a_bad_request_envelope() {
        let (service, _) = service_with(1);
        let app = app!(service);

        let req = test::TestRequest::post()
            .uri("/api/order/status")
            .insert_header(("token", admin().issue_token().unwrap()))
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"orderId\": 7")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Envelope = test::read_body_json(resp).await;
        assert!(!body.success);
    }

    #[actix_web::test]
    async fn order_response_uses_storefront_wire_names() {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(OrderResponse {
            id,
            user_id: "u".to_string(),
            items: vec![],
            address: Address::default(),
            amount: "5.00".to_string(),
            payment_method: "COD".to_string(),
            payment: false,
            date: 1_700_000_000_000,
            status: OrderStatus::Packing,
        })
        .unwrap();
        assert_eq!(value["_id"], json!(id));
        assert_eq!(value["paymentMethod"], "COD");
        assert_eq!(value["userId"], "u");
        assert_eq!(value["status"], "Packing");
        assert_eq!(value["date"], 1_700_000_000_000_i64);
    }
}
