use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::caller::CallerContext;
use crate::domain::order::{OrderView, PlaceOrderInput};
use crate::errors::AppError;
use crate::AppState;

use super::{blocking, dispatch_in_background, money, MessageResponse};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub store_id: Uuid,
    pub address: String,
    /// Six-digit postal code
    pub pincode: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub order_id: Uuid,
    pub total_amount: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub order_id: Uuid,
    pub status: String,
    /// Plain-text bill, present once an order is approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub customer_name: String,
    pub store_id: Uuid,
    pub store_name: String,
    pub order_date: String,
    pub total_amount: String,
    pub status: String,
    pub address: String,
    pub pincode: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        let header = view.header;
        Self {
            order_id: header.id,
            user_id: header.user_id,
            customer_name: view.customer_name,
            store_id: header.store_id,
            store_name: view.store_name,
            order_date: header.order_date.to_rfc3339(),
            total_amount: money(&header.total_amount),
            status: header.status.to_string(),
            address: header.address,
            pincode: header.pincode,
            items: view
                .lines
                .into_iter()
                .map(|l| OrderItemResponse {
                    item_id: l.item_id,
                    item_name: l.item_name,
                    quantity: l.quantity,
                    price: money(&l.price),
                })
                .collect(),
        }
    }
}

fn order_list(views: Vec<OrderView>) -> HttpResponse {
    let body: Vec<OrderResponse> = views.into_iter().map(Into::into).collect();
    HttpResponse::Ok().json(body)
}

/// POST /api/order/placeorder (also mounted as /api/cart/placeorder)
///
/// Converts the caller's cart into a Pending order in one transaction:
/// stock is re-checked under row locks and decremented, the cart is
/// removed. Notification mails go out after the commit.
#[utoipa::path(
    post,
    path = "/api/order/placeorder",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = PlaceOrderResponse),
        (status = 400, description = "Empty cart, invalid address/pincode or insufficient stock"),
        (status = 403, description = "Only customers can place orders"),
        (status = 404, description = "Cart or store not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn place_order(
    state: web::Data<AppState>,
    caller: CallerContext,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = PlaceOrderInput {
        store_id: body.store_id,
        address: body.address,
        pincode: body.pincode,
    };

    let worker = state.clone();
    let outcome = blocking(move || worker.orders.place_order(&caller, input)).await?;
    dispatch_in_background(&state, outcome.notices);

    Ok(HttpResponse::Created().json(PlaceOrderResponse {
        order_id: outcome.order.order_id,
        total_amount: money(&outcome.order.total_amount),
    }))
}

#[utoipa::path(
    post,
    path = "/api/order/accept/{orderId}",
    params(("orderId" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order approved; the bill is included", body = ReviewResponse),
        (status = 400, description = "Order was already rejected"),
        (status = 403, description = "Not allowed to review this order"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn approve_order(
    state: web::Data<AppState>,
    caller: CallerContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let worker = state.clone();
    let outcome = blocking(move || worker.orders.approve(&caller, order_id)).await?;
    dispatch_in_background(&state, outcome.notices);

    Ok(HttpResponse::Ok().json(ReviewResponse {
        order_id: outcome.order_id,
        status: outcome.status.to_string(),
        bill: outcome.bill,
    }))
}

#[utoipa::path(
    post,
    path = "/api/order/reject/{orderId}",
    params(("orderId" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order rejected", body = ReviewResponse),
        (status = 400, description = "Order was already approved"),
        (status = 403, description = "Not allowed to review this order"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn reject_order(
    state: web::Data<AppState>,
    caller: CallerContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let worker = state.clone();
    let outcome = blocking(move || worker.orders.reject(&caller, order_id)).await?;
    dispatch_in_background(&state, outcome.notices);

    Ok(HttpResponse::Ok().json(ReviewResponse {
        order_id: outcome.order_id,
        status: outcome.status.to_string(),
        bill: outcome.bill,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/order/deleteorder/{orderId}",
    params(("orderId" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 403, description = "Not allowed to delete this order"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn delete_order(
    state: web::Data<AppState>,
    caller: CallerContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    blocking(move || state.orders.delete(&caller, order_id)).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Order deleted successfully.")))
}

/// GET /api/order/myorders
#[utoipa::path(
    get,
    path = "/api/order/myorders",
    responses((status = 200, description = "The caller's orders, newest first", body = [OrderResponse])),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn my_orders(
    state: web::Data<AppState>,
    caller: CallerContext,
) -> Result<HttpResponse, AppError> {
    let views = blocking(move || state.orders.list_for_user(&caller)).await?;
    Ok(order_list(views))
}

/// GET /api/order/storeorders
#[utoipa::path(
    get,
    path = "/api/order/storeorders",
    responses(
        (status = 200, description = "Orders of the caller's store, newest first", body = [OrderResponse]),
        (status = 403, description = "Caller is not a store administrator"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn store_orders(
    state: web::Data<AppState>,
    caller: CallerContext,
) -> Result<HttpResponse, AppError> {
    let views = blocking(move || state.orders.list_for_store(&caller)).await?;
    Ok(order_list(views))
}

/// GET /api/order/allorders
#[utoipa::path(
    get,
    path = "/api/order/allorders",
    responses(
        (status = 200, description = "Every order, newest first", body = [OrderResponse]),
        (status = 403, description = "Caller is not a super administrator"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn all_orders(
    state: web::Data<AppState>,
    caller: CallerContext,
) -> Result<HttpResponse, AppError> {
    let views = blocking(move || state.orders.list_all(&caller)).await?;
    Ok(order_list(views))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::order::{OrderHeader, OrderLineView, OrderStatus};

    #[test]
    fn order_response_flattens_view() {
        let view = OrderView {
            header: OrderHeader {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                store_id: Uuid::new_v4(),
                order_date: Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap(),
                total_amount: "80".parse().unwrap(),
                status: OrderStatus::Approved,
                address: "12 MG Road".to_string(),
                pincode: "560001".to_string(),
            },
            customer_name: "Asha Rao".to_string(),
            store_name: "Store S".to_string(),
            lines: vec![OrderLineView {
                item_id: Uuid::new_v4(),
                item_name: "A".to_string(),
                quantity: 3,
                price: "10".parse().unwrap(),
            }],
        };

        let json = serde_json::to_value(OrderResponse::from(view)).unwrap();
        assert_eq!(json["totalAmount"], "80.00");
        assert_eq!(json["status"], "Approved");
        assert_eq!(json["orderDate"], "2025-01-15T10:00:00+00:00");
        assert_eq!(json["items"][0]["price"], "10.00");
        assert_eq!(json["customerName"], "Asha Rao");
    }

    #[test]
    fn review_response_omits_missing_bill() {
        let json = serde_json::to_value(ReviewResponse {
            order_id: Uuid::new_v4(),
            status: "Rejected".to_string(),
            bill: None,
        })
        .unwrap();
        assert!(json.get("bill").is_none());
    }
}
