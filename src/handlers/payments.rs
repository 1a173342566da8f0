use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use super::blocking;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientTokenResponse {
    /// Passed to the PayPal JS SDK as `data-client-token`.
    pub client_token: String,
}

/// GET /payments/paypal/client-token
#[utoipa::path(
    get,
    path = "/payments/paypal/client-token",
    responses(
        (status = 200, description = "Client token for the checkout widgets", body = ClientTokenResponse),
        (status = 502, description = "PayPal unavailable"),
    ),
    tag = "payments"
)]
pub async fn client_token(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let client_token = blocking(move || state.checkout.generate_client_token()).await?;
    Ok(HttpResponse::Ok().json(ClientTokenResponse { client_token }))
}
