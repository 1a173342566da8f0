use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::cart::CartItem;
use super::errors::DomainError;
use super::inquiry::{Inquiry, InquiryConditions, NewInquiry};
use super::order::{NewOrder, Order, OrderConditions};
use super::product::{NewProduct, Product};
use super::user::{NewUser, User};

pub trait OrderRepository: Send + Sync + 'static {
    /// Inserts the order and links its inquiry to it.
    fn create_order(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn update_order(&self, order: &Order) -> Result<Order, DomainError>;
    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list_orders(&self, conditions: &OrderConditions) -> Result<Vec<Order>, DomainError>;

    fn create_inquiry(&self, inquiry: NewInquiry) -> Result<Inquiry, DomainError>;
    fn update_inquiry(&self, inquiry: &Inquiry) -> Result<Inquiry, DomainError>;
    fn find_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, DomainError>;
    fn list_inquiries(&self, conditions: &InquiryConditions)
        -> Result<Vec<Inquiry>, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    /// Line items in insertion order. An order without a cart yields `[]`.
    fn find_by_order(&self, order_id: Uuid) -> Result<Vec<CartItem>, DomainError>;
    /// Drops every line item of the order and inserts `items` in their place.
    fn replace(&self, order_id: Uuid, items: &[CartItem]) -> Result<Vec<CartItem>, DomainError>;
    fn upsert_item(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, DomainError>;
    fn remove_item(&self, order_id: Uuid, product_id: Uuid) -> Result<(), DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid, include_archived: bool) -> Result<Option<Product>, DomainError>;
    fn list(&self, include_archived: bool) -> Result<Vec<Product>, DomainError>;
    fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
    fn update(&self, product: &Product) -> Result<Product, DomainError>;
    fn soft_delete(&self, id: Uuid) -> Result<(), DomainError>;
    fn hard_delete(&self, id: Uuid) -> Result<(), DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn create(&self, user: NewUser, password_hash: String) -> Result<User, DomainError>;
    /// Looks up a live (not soft-deleted) user. Every provided field must match.
    fn find_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, DomainError>;
    fn password_hash(&self, user_id: Uuid) -> Result<Option<String>, DomainError>;
}

/// A third-party payment processor.
pub trait PaymentProvider: Send + Sync + 'static {
    /// Creates a provider-side order for `amount` (USD) referencing the local
    /// order and returns the provider's id for it.
    fn create_external_order(
        &self,
        order_id: Uuid,
        amount: &BigDecimal,
    ) -> Result<String, DomainError>;

    /// Token the client SDK needs to render the provider's checkout widgets.
    fn generate_client_token(&self) -> Result<String, DomainError>;

    fn provider_name(&self) -> &'static str;
}

/// Issues and checks the signed bearer tokens that carry a [`User`].
pub trait TokenCodec: Send + Sync + 'static {
    fn encode(&self, user: &User) -> Result<String, DomainError>;
    /// Any invalid, forged or expired token is `Unauthorized`.
    fn decode(&self, token: &str) -> Result<User, DomainError>;
}

pub trait PasswordHasher: Send + Sync + 'static {
    /// Salted hash, self-describing so it can be verified later.
    fn hash(&self, password: &str) -> Result<String, DomainError>;
    fn verify(&self, password: &str, stored: &str) -> bool;
}

pub type SharedOrderRepository = Arc<dyn OrderRepository>;
pub type SharedCartRepository = Arc<dyn CartRepository>;
pub type SharedProductRepository = Arc<dyn ProductRepository>;
pub type SharedUserRepository = Arc<dyn UserRepository>;
pub type SharedPaymentProvider = Arc<dyn PaymentProvider>;
pub type SharedTokenCodec = Arc<dyn TokenCodec>;
pub type SharedPasswordHasher = Arc<dyn PasswordHasher>;
