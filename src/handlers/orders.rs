use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::carts::CartItemResponse;
use super::inquiries::InquiryRequest;
use super::{bearer_token, blocking, money};
use crate::domain::inquiry::InquiryInput;
use crate::domain::order::{
    Order, OrderConditions, OrderInput, OrderStatus, OrdersSortBy, PaymentMethod,
};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Creates an order when `id` is absent, otherwise updates it. An order needs
/// either `inquiry_id` or an inline `inquiry`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveOrderRequest {
    pub id: Option<Uuid>,
    pub inquiry_id: Option<Uuid>,
    pub inquiry: Option<InquiryRequest>,
    /// `PAYPAL`. On update, omit it to keep the stored method.
    pub payment_method: Option<String>,
    /// Must be omitted or match the current status.
    pub status: Option<String>,
    pub due: Option<DateTime<Utc>>,
}

impl From<SaveOrderRequest> for OrderInput {
    fn from(req: SaveOrderRequest) -> Self {
        OrderInput {
            id: req.id,
            inquiry_id: req.inquiry_id,
            inquiry: req.inquiry.map(InquiryInput::from),
            payment_method: req
                .payment_method
                .as_deref()
                .map_or(PaymentMethod::NotImplemented, PaymentMethod::parse),
            status: req
                .status
                .as_deref()
                .map_or(OrderStatus::NotImplemented, OrderStatus::parse),
            due: req.due,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub payment_method: String,
    pub status: String,
    /// Payment provider order id, set once the order is authorized.
    pub ext_id: Option<String>,
    /// Decimal total as a string, e.g. "30.00".
    pub total: String,
    pub due: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub cart: Vec<CartItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            inquiry_id: order.inquiry_id,
            payment_method: order.payment_method.as_str().to_string(),
            status: order.status.as_str().to_string(),
            ext_id: order.ext_id,
            total: money(&order.total),
            due: order.due.map(|d| d.to_rfc3339()),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            cart: order.cart.into_iter().map(CartItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderTotalResponse {
    pub order_id: Uuid,
    pub total: String,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub status: Option<String>,
    pub sort_by: Option<String>,
}

impl ListOrdersParams {
    fn conditions(&self) -> Result<OrderConditions, AppError> {
        let status = match self.status.as_deref() {
            None => None,
            Some(raw) => match OrderStatus::parse(raw) {
                OrderStatus::NotImplemented => {
                    return Err(AppError::BadRequest(format!("unknown order status {}", raw)))
                }
                status => Some(status),
            },
        };
        let sort_by = match self.sort_by.as_deref() {
            None => OrdersSortBy::default(),
            Some(raw) => OrdersSortBy::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown sort order {}", raw)))?,
        };
        Ok(OrderConditions { status, sort_by })
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates or updates an order. Total and payment id are never taken from
/// the request; the response carries the total derived from the cart.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = SaveOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Missing inquiry or forbidden change"),
        (status = 404, description = "Order or inquiry not found"),
    ),
    tag = "orders"
)]
pub async fn save_order(
    state: web::Data<AppState>,
    body: web::Json<SaveOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let input = OrderInput::from(body.into_inner());
    let created = input.id.is_none();

    let order = blocking(move || state.checkout.save_order(input)).await?;

    let body = OrderResponse::from(order);
    Ok(if created {
        HttpResponse::Created().json(body)
    } else {
        HttpResponse::Ok().json(body)
    })
}

/// GET /orders/{id}
///
/// Returns the order with its cart and a freshly computed total.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = blocking(move || state.checkout.get_order(order_id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Admin only.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("status" = Option<String>, Query, description = "USER_PENDING, ADMIN_PENDING or ACCEPTED"),
        ("sort_by" = Option<String>, Query, description = "DATE_ASCENDING, DATE_DESCENDING, DUE_ASCENDING or DUE_DESCENDING (default)"),
    ),
    responses(
        (status = 200, description = "Orders", body = [OrderResponse]),
        (status = 400, description = "Unknown status or sort order"),
        (status = 401, description = "Missing or non-admin token"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req);
    let conditions = query.conditions()?;

    let orders = blocking(move || {
        state.auth.authenticate_admin(token.as_deref())?;
        state.checkout.list_orders(&conditions)
    })
    .await?;

    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/{id}/total
#[utoipa::path(
    get,
    path = "/orders/{id}/total",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Sum of cost × quantity over the cart", body = OrderTotalResponse),
        (status = 404, description = "Order or a carted product not found"),
    ),
    tag = "orders"
)]
pub async fn get_total(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let total = blocking(move || state.checkout.compute_total(order_id)).await?;
    Ok(HttpResponse::Ok().json(OrderTotalResponse {
        order_id,
        total: money(&total),
    }))
}

/// POST /orders/{id}/authorize
///
/// Finalizes the total and, for PayPal orders, creates the PayPal order.
#[utoipa::path(
    post,
    path = "/orders/{id}/authorize",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order authorized", body = OrderResponse),
        (status = 400, description = "Order not user-pending, empty cart or already authorized"),
        (status = 404, description = "Order not found"),
        (status = 502, description = "Payment provider or storage failure"),
    ),
    tag = "orders"
)]
pub async fn authorize_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = blocking(move || state.checkout.authorize(order_id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /orders/{id}/accept
///
/// Admin only.
#[utoipa::path(
    post,
    path = "/orders/{id}/accept",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order accepted", body = OrderResponse),
        (status = 400, description = "Order is not admin-pending"),
        (status = 401, description = "Missing or non-admin token"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn accept_order(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req);
    let order_id = path.into_inner();

    let order = blocking(move || {
        let admin = state.auth.authenticate_admin(token.as_deref())?;
        log::info!("Admin {} accepting order {}", admin.username, order_id);
        state.checkout.accept_order(order_id)
    })
    .await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
