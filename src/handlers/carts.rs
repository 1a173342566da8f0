use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::blocking;
use crate::domain::cart::{CartAction, CartItem};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemRequest {
    /// Defaults to the order in the path.
    pub order_id: Option<Uuid>,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveCartRequest {
    pub items: Vec<CartItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemActionRequest {
    pub product_id: Uuid,
    /// `ADD` or `REMOVE`.
    pub action: String,
    /// Required for `ADD`.
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        CartItemResponse {
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub order_id: Uuid,
    pub items: Vec<CartItemResponse>,
}

impl CartResponse {
    fn new(order_id: Uuid, items: Vec<CartItem>) -> Self {
        CartResponse {
            order_id,
            items: items.into_iter().map(CartItemResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders/{id}/cart
#[utoipa::path(
    get,
    path = "/orders/{id}/cart",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Cart of the order", body = CartResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "carts"
)]
pub async fn get_cart(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let items = blocking(move || state.checkout.get_cart(order_id)).await?;
    Ok(HttpResponse::Ok().json(CartResponse::new(order_id, items)))
}

/// PUT /orders/{id}/cart
///
/// Replaces every line of the cart.
#[utoipa::path(
    put,
    path = "/orders/{id}/cart",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = SaveCartRequest,
    responses(
        (status = 200, description = "Cart saved", body = CartResponse),
        (status = 400, description = "Empty cart, bad quantity, duplicate product or order no longer editable"),
        (status = 404, description = "Order or product not found"),
    ),
    tag = "carts"
)]
pub async fn save_cart(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SaveCartRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let items: Vec<CartItem> = body
        .into_inner()
        .items
        .into_iter()
        .map(|item| CartItem {
            order_id: item.order_id.unwrap_or(order_id),
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let saved = blocking(move || state.checkout.save_cart(order_id, items)).await?;
    Ok(HttpResponse::Ok().json(CartResponse::new(order_id, saved)))
}

/// POST /orders/{id}/cart/items
///
/// Adds, re-quantifies or removes a single product.
#[utoipa::path(
    post,
    path = "/orders/{id}/cart/items",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = CartItemActionRequest,
    responses(
        (status = 200, description = "Resulting cart", body = CartResponse),
        (status = 400, description = "Unknown action, bad quantity or order no longer editable"),
        (status = 404, description = "Order or product not found"),
    ),
    tag = "carts"
)]
pub async fn save_cart_item(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CartItemActionRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();
    let action = CartAction::parse(&body.action).ok_or_else(|| {
        AppError::BadRequest(format!(
            "unknown cart action {}, expected ADD or REMOVE",
            body.action
        ))
    })?;
    let quantity = match (action, body.quantity) {
        (CartAction::Add, None) => {
            return Err(AppError::BadRequest(
                "quantity is required to add a product".to_string(),
            ))
        }
        (_, quantity) => quantity.unwrap_or(0),
    };

    let cart = blocking(move || {
        state
            .checkout
            .save_cart_item(order_id, body.product_id, action, quantity)
    })
    .await?;
    Ok(HttpResponse::Ok().json(CartResponse::new(order_id, cart)))
}
