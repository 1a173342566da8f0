//! PayPal REST client backing the `PaymentProvider` port.
//!
//! Uses the blocking reqwest client, so every call must run off the async
//! executor (`web::block` in handlers, `spawn_blocking` in tests). The HTTP
//! client itself is built on first use for the same reason.

use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

use bigdecimal::{BigDecimal, RoundingMode};
use log::{debug, info};
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::PaymentProvider;

pub const SANDBOX_HOST: &str = "https://api-m.sandbox.paypal.com";
pub const LIVE_HOST: &str = "https://api-m.paypal.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Refresh the access token this long before PayPal would expire it.
const TOKEN_LEEWAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct PaypalConfig {
    pub client_id: String,
    pub secret_id: String,
    /// API base URL, without a trailing slash.
    pub host: String,
}

impl PaypalConfig {
    pub fn new(client_id: impl Into<String>, secret_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            secret_id: secret_id.into(),
            host: SANDBOX_HOST.to_string(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Serialize)]
struct CreateOrderRequest<'a> {
    intent: &'a str,
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Serialize)]
struct PurchaseUnit {
    reference_id: String,
    amount: Amount,
}

#[derive(Serialize)]
struct Amount {
    currency_code: &'static str,
    value: String,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    id: String,
}

#[derive(Deserialize)]
struct ClientTokenResponse {
    client_token: String,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

// ── Client ───────────────────────────────────────────────────────────────────

pub struct PaypalClient {
    config: PaypalConfig,
    http: OnceLock<Client>,
    token: Mutex<Option<CachedToken>>,
}

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::Upstream(format!("paypal: {}", e))
    }
}

impl PaypalClient {
    pub fn new(config: PaypalConfig) -> Self {
        Self {
            config,
            http: OnceLock::new(),
            token: Mutex::new(None),
        }
    }

    fn http(&self) -> Result<&Client, DomainError> {
        if let Some(client) = self.http.get() {
            return Ok(client);
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(self.http.get_or_init(|| client))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.host, path)
    }

    /// OAuth2 client-credentials token, cached until shortly before expiry.
    ///
    /// The cache lock is never held across the HTTP round trip, so a slow
    /// refresh does not stall other calls. Callers that all find the cache
    /// cold fetch a token each and the last one stored wins.
    fn access_token(&self) -> Result<String, DomainError> {
        if let Some(token) = self.lock_token()?.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let request = self
            .http()?
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.secret_id))
            .header("Accept", "application/json")
            .form(&[("grant_type", "client_credentials")]);
        let response: AccessTokenResponse = send(request, "/v1/oauth2/token")?;
        debug!("Fetched PayPal access token valid for {}s", response.expires_in);

        let lifetime = Duration::from_secs(response.expires_in);
        *self.lock_token()? = Some(CachedToken {
            value: response.access_token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_LEEWAY),
        });
        Ok(response.access_token)
    }

    fn lock_token(&self) -> Result<MutexGuard<'_, Option<CachedToken>>, DomainError> {
        self.token
            .lock()
            .map_err(|_| DomainError::Upstream("paypal token lock poisoned".into()))
    }

    fn authed_post(&self, path: &str) -> Result<RequestBuilder, DomainError> {
        let token = self.access_token()?;
        Ok(self
            .http()?
            .post(self.url(path))
            .bearer_auth(token)
            .header("Accept-Language", "en_US"))
    }
}

fn send<T: for<'de> Deserialize<'de>>(request: RequestBuilder, path: &str) -> Result<T, DomainError> {
    let response = request.send()?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(DomainError::Upstream(format!(
            "paypal {} returned {}: {}",
            path, status, body
        )));
    }
    Ok(response.json()?)
}

/// PayPal expects a plain decimal string with exactly two fraction digits.
fn usd(amount: &BigDecimal) -> String {
    amount.with_scale_round(2, RoundingMode::HalfUp).to_string()
}

impl PaymentProvider for PaypalClient {
    fn create_external_order(
        &self,
        order_id: Uuid,
        amount: &BigDecimal,
    ) -> Result<String, DomainError> {
        let path = "/v2/checkout/orders";
        let body = CreateOrderRequest {
            intent: "AUTHORIZE",
            purchase_units: vec![PurchaseUnit {
                reference_id: order_id.to_string(),
                amount: Amount {
                    currency_code: "USD",
                    value: usd(amount),
                },
            }],
        };

        let created: CreateOrderResponse = send(self.authed_post(path)?.json(&body), path)?;
        info!("Created PayPal order {} for order {}", created.id, order_id);
        Ok(created.id)
    }

    fn generate_client_token(&self) -> Result<String, DomainError> {
        let path = "/v1/identity/generate-token";
        let response: ClientTokenResponse = send(
            self.authed_post(path)?
                .header("Content-Type", "application/json")
                .body("{}"),
            path,
        )?;
        Ok(response.client_token)
    }

    fn provider_name(&self) -> &'static str {
        "paypal"
    }
}
