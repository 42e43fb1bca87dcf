use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::caller::CallerContext;
use crate::domain::cart::{CartLineView, QuantityUpdate};
use crate::errors::AppError;
use crate::AppState;

use super::{blocking, money, parse_money, MessageResponse};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub item_id: Uuid,
    pub quantity: i32,
    /// Unit price as a decimal string, e.g. "30.00"
    pub price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartResponse {
    pub cart_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub price: String,
    pub line_total: String,
}

impl From<CartLineView> for CartItemResponse {
    fn from(view: CartLineView) -> Self {
        Self {
            item_id: view.item_id,
            item_name: view.item_name,
            quantity: view.quantity,
            price: money(&view.price),
            line_total: money(&view.line_total),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuantityResponse {
    pub item_id: Uuid,
    pub quantity: i32,
    pub price: String,
    pub line_total: String,
    pub cart_total: String,
    /// False when the quantity was already at its limit.
    pub changed: bool,
}

impl From<QuantityUpdate> for QuantityResponse {
    fn from(update: QuantityUpdate) -> Self {
        Self {
            item_id: update.item_id,
            quantity: update.quantity,
            price: money(&update.price),
            line_total: money(&update.line_total),
            cart_total: money(&update.cart_total),
            changed: update.changed,
        }
    }
}

/// POST /api/cart/create
#[utoipa::path(
    post,
    path = "/api/cart/create",
    responses(
        (status = 201, description = "Cart created", body = CreateCartResponse),
        (status = 409, description = "The user already has a cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn create_cart(
    state: web::Data<AppState>,
    caller: CallerContext,
) -> Result<HttpResponse, AppError> {
    let cart_id = blocking(move || state.carts.create_cart(&caller)).await?;
    Ok(HttpResponse::Created().json(CreateCartResponse { cart_id }))
}

/// POST /api/cart/additem
///
/// Adds an item or replaces the quantity and price of an existing line.
/// The cart is created on first use.
#[utoipa::path(
    post,
    path = "/api/cart/additem",
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Item added", body = MessageResponse),
        (status = 400, description = "Invalid quantity or price, or not enough stock"),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn add_item(
    state: web::Data<AppState>,
    caller: CallerContext,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let price = parse_money("price", &body.price)?;

    blocking(move || {
        state
            .carts
            .add_or_update_item(&caller, body.item_id, body.quantity, price)
    })
    .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Item added to cart successfully.")))
}

#[utoipa::path(
    get,
    path = "/api/cart/items",
    responses(
        (status = 200, description = "Cart lines with totals", body = [CartItemResponse]),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn list_items(
    state: web::Data<AppState>,
    caller: CallerContext,
) -> Result<HttpResponse, AppError> {
    let lines = blocking(move || state.carts.list_items(&caller)).await?;
    let body: Vec<CartItemResponse> = lines.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    delete,
    path = "/api/cart/removeitem/{itemId}",
    params(("itemId" = Uuid, Path, description = "Item UUID")),
    responses(
        (status = 200, description = "Line removed", body = MessageResponse),
        (status = 404, description = "No cart or no such line"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn remove_item(
    state: web::Data<AppState>,
    caller: CallerContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    blocking(move || state.carts.remove_item(&caller, item_id)).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Item removed from cart.")))
}

#[utoipa::path(
    post,
    path = "/api/cart/incrementquantity/{itemId}",
    params(("itemId" = Uuid, Path, description = "Item UUID")),
    responses(
        (status = 200, description = "Updated line and cart totals", body = QuantityResponse),
        (status = 404, description = "No cart or no such line"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn increment_quantity(
    state: web::Data<AppState>,
    caller: CallerContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let update = blocking(move || state.carts.increment_quantity(&caller, item_id)).await?;
    Ok(HttpResponse::Ok().json(QuantityResponse::from(update)))
}

#[utoipa::path(
    post,
    path = "/api/cart/decrementquantity/{itemId}",
    params(("itemId" = Uuid, Path, description = "Item UUID")),
    responses(
        (status = 200, description = "Updated line and cart totals", body = QuantityResponse),
        (status = 404, description = "No cart or no such line"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn decrement_quantity(
    state: web::Data<AppState>,
    caller: CallerContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let update = blocking(move || state.carts.decrement_quantity(&caller, item_id)).await?;
    Ok(HttpResponse::Ok().json(QuantityResponse::from(update)))
}

/// POST /api/cart/setquantity/{itemId}
///
/// The requested quantity is clamped to `[1, stock]`.
#[utoipa::path(
    post,
    path = "/api/cart/setquantity/{itemId}",
    params(("itemId" = Uuid, Path, description = "Item UUID")),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Updated line and cart totals", body = QuantityResponse),
        (status = 404, description = "No cart or no such line"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn set_quantity(
    state: web::Data<AppState>,
    caller: CallerContext,
    path: web::Path<Uuid>,
    body: web::Json<SetQuantityRequest>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let quantity = body.quantity;
    let update = blocking(move || state.carts.set_quantity(&caller, item_id, quantity)).await?;
    Ok(HttpResponse::Ok().json(QuantityResponse::from(update)))
}
