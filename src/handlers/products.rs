use std::str::FromStr;

use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{bearer_token, blocking, money};
use crate::domain::product::{DeleteMode, NewProduct, Product, ProductInput};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    /// Send to update an existing product.
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub cost: String,
    #[serde(default)]
    pub inventory: i32,
}

impl TryFrom<ProductRequest> for ProductInput {
    type Error = AppError;

    fn try_from(req: ProductRequest) -> Result<Self, Self::Error> {
        let cost = BigDecimal::from_str(&req.cost).map_err(|e| {
            AppError::BadRequest(format!("Invalid cost '{}': {}", req.cost, e))
        })?;
        Ok(ProductInput {
            id: req.id,
            fields: NewProduct {
                name: req.name,
                description: req.description,
                cost,
                inventory: req.inventory,
            },
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cost: String,
    pub inventory: i32,
    pub created_at: String,
    /// Set once the product is archived.
    pub deleted_at: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        ProductResponse {
            cost: money(&product.cost),
            id: product.id,
            name: product.name,
            description: product.description,
            inventory: product.inventory,
            created_at: product.created_at.to_rfc3339(),
            deleted_at: product.deleted_at.map(|d| d.to_rfc3339()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProductsParams {
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProductParams {
    #[serde(default)]
    pub hard: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    params(
        ("include_archived" = Option<bool>, Query, description = "Also list soft-deleted products"),
    ),
    responses((status = 200, description = "Products", body = [ProductResponse])),
    tag = "products"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ListProductsParams>,
) -> Result<HttpResponse, AppError> {
    let include_archived = query.include_archived;
    let products = blocking(move || state.products.list_products(include_archived)).await?;

    let body: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found or archived"),
    ),
    tag = "products"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = blocking(move || state.products.get_product(id)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /products
///
/// Admin only. Creates the product, or updates it when `id` is set.
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product saved", body = ProductResponse),
        (status = 400, description = "Invalid name, cost or inventory"),
        (status = 401, description = "Missing or non-admin token"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn save_product(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req);
    let input = ProductInput::try_from(body.into_inner())?;

    let product = blocking(move || {
        state.auth.authenticate_admin(token.as_deref())?;
        state.products.save_product(input)
    })
    .await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /products/{id}
///
/// Admin only. Archives the product unless `hard=true`.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
        ("hard" = Option<bool>, Query, description = "Remove the row instead of archiving it"),
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Product is still referenced by a cart"),
        (status = 401, description = "Missing or non-admin token"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_product(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<DeleteProductParams>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req);
    let id = path.into_inner();
    let mode = if query.hard {
        DeleteMode::Hard
    } else {
        DeleteMode::Soft
    };

    blocking(move || {
        state.auth.authenticate_admin(token.as_deref())?;
        state.products.delete_product(id, mode)
    })
    .await?;
    Ok(HttpResponse::NoContent().finish())
}
