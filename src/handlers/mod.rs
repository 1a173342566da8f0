pub mod auth;
pub mod carts;
pub mod inquiries;
pub mod orders;
pub mod payments;
pub mod products;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::{BigDecimal, RoundingMode};
use serde_json::json;

use crate::domain::errors::DomainError;
use crate::errors::AppError;

/// Runs a blocking service call on actix's thread pool.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

/// Token from an `Authorization: Bearer <token>` header, if any.
pub(crate) fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Money on the wire: a decimal string with two fraction digits.
pub(crate) fn money(amount: &BigDecimal) -> String {
    amount.with_scale_round(2, RoundingMode::HalfUp).to_string()
}

/// Fallback for unmatched routes, with the same body shape as [`AppError`].
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "Not found" }))
}
