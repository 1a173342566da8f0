use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::checkout_service::CheckoutService;
use crate::application::inquiry_service::InquiryService;
use crate::application::product_service::ProductService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::domain::ports::{
    SharedCartRepository, SharedOrderRepository, SharedPaymentProvider, SharedProductRepository,
    SharedUserRepository,
};
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::memory::InMemoryStore;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::paypal::PaypalClient;
use crate::infrastructure::product_repo::DieselProductRepository;
use crate::infrastructure::token::{Argon2Passwords, TokenSigner};
use crate::infrastructure::user_repo::DieselUserRepository;

/// Services shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub checkout: CheckoutService,
    pub inquiries: InquiryService,
    pub products: ProductService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(
        orders: SharedOrderRepository,
        carts: SharedCartRepository,
        products: SharedProductRepository,
        users: SharedUserRepository,
        payments: SharedPaymentProvider,
        jwt_secret: &str,
        jwt_ttl: chrono::Duration,
    ) -> Self {
        Self {
            checkout: CheckoutService::new(orders.clone(), carts, products.clone(), payments),
            inquiries: InquiryService::new(orders),
            products: ProductService::new(products),
            auth: AuthService::new(
                users,
                Arc::new(TokenSigner::new(jwt_secret, jwt_ttl)),
                Arc::new(Argon2Passwords::default()),
            ),
        }
    }

    /// Postgres-backed repositories and the PayPal REST client.
    pub fn from_config(pool: DbPool, config: &AppConfig) -> Self {
        Self::new(
            Arc::new(DieselOrderRepository::new(pool.clone())),
            Arc::new(DieselCartRepository::new(pool.clone())),
            Arc::new(DieselProductRepository::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool)),
            Arc::new(PaypalClient::new(config.paypal.clone())),
            &config.jwt_secret,
            config.jwt_ttl,
        )
    }

    /// Every repository backed by one [`InMemoryStore`].
    pub fn in_memory(
        store: InMemoryStore,
        payments: SharedPaymentProvider,
        jwt_secret: &str,
        jwt_ttl: chrono::Duration,
    ) -> Self {
        let store = Arc::new(store);
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            payments,
            jwt_secret,
            jwt_ttl,
        )
    }
}
