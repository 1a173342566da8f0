//! Mutex-backed implementation of every repository port, for tests and local
//! runs without Postgres. Foreign keys are not enforced.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cart::CartItem;
use crate::domain::errors::DomainError;
use crate::domain::inquiry::{Inquiry, InquiryConditions, NewInquiry};
use crate::domain::order::{NewOrder, Order, OrderConditions, OrdersSortBy};
use crate::domain::ports::{CartRepository, OrderRepository, ProductRepository, UserRepository};
use crate::domain::product::{NewProduct, Product};
use crate::domain::user::{NewUser, User};

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct State {
    orders: Vec<Order>,
    inquiries: Vec<Inquiry>,
    products: Vec<Product>,
    carts: Vec<CartItem>,
    users: Vec<StoredUser>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Upstream("lock poisoned".into()))
    }
}

/// Postgres ordering: NULL sorts after every value ascending, before them
/// descending.
fn cmp_due(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl OrderRepository for InMemoryStore {
    fn create_order(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut state = self.lock()?;
        let id = Uuid::new_v4();

        let inquiry = state
            .inquiries
            .iter_mut()
            .find(|i| i.id == order.inquiry_id)
            .ok_or_else(|| DomainError::not_found("Inquiry", order.inquiry_id))?;
        inquiry.order_id = Some(id);

        let now = Utc::now();
        let created = Order {
            id,
            inquiry_id: order.inquiry_id,
            payment_method: order.payment_method,
            status: order.status,
            ext_id: None,
            total: BigDecimal::from(0),
            due: order.due,
            created_at: now,
            updated_at: now,
            cart: vec![],
        };
        state.orders.push(created.clone());
        Ok(created)
    }

    fn update_order(&self, order: &Order) -> Result<Order, DomainError> {
        let mut state = self.lock()?;
        let stored = state
            .orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| DomainError::not_found("Order", order.id))?;

        *stored = Order {
            created_at: stored.created_at,
            updated_at: Utc::now(),
            cart: vec![],
            ..order.clone()
        };
        Ok(stored.clone())
    }

    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.lock()?.orders.iter().find(|o| o.id == id).cloned())
    }

    fn list_orders(&self, conditions: &OrderConditions) -> Result<Vec<Order>, DomainError> {
        let state = self.lock()?;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| conditions.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();

        match conditions.sort_by {
            OrdersSortBy::DateAscending => orders.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            OrdersSortBy::DateDescending => orders.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            OrdersSortBy::DueAscending => orders.sort_by(|a, b| cmp_due(&a.due, &b.due)),
            OrdersSortBy::DueDescending => orders.sort_by(|a, b| cmp_due(&b.due, &a.due)),
        }
        Ok(orders)
    }

    fn create_inquiry(&self, inquiry: NewInquiry) -> Result<Inquiry, DomainError> {
        let created = Inquiry {
            id: Uuid::new_v4(),
            first_name: inquiry.first_name,
            last_name: inquiry.last_name,
            email: inquiry.email,
            phone: inquiry.phone,
            description: inquiry.description,
            attachments: inquiry.attachments,
            order_id: None,
            created_at: Utc::now(),
        };
        self.lock()?.inquiries.push(created.clone());
        Ok(created)
    }

    fn update_inquiry(&self, inquiry: &Inquiry) -> Result<Inquiry, DomainError> {
        let mut state = self.lock()?;
        let stored = state
            .inquiries
            .iter_mut()
            .find(|i| i.id == inquiry.id)
            .ok_or_else(|| DomainError::not_found("Inquiry", inquiry.id))?;

        *stored = Inquiry {
            created_at: stored.created_at,
            order_id: stored.order_id,
            ..inquiry.clone()
        };
        Ok(stored.clone())
    }

    fn find_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, DomainError> {
        Ok(self.lock()?.inquiries.iter().find(|i| i.id == id).cloned())
    }

    fn list_inquiries(
        &self,
        conditions: &InquiryConditions,
    ) -> Result<Vec<Inquiry>, DomainError> {
        let state = self.lock()?;
        let mut inquiries: Vec<Inquiry> = state
            .inquiries
            .iter()
            .filter(|i| !conditions.without_order || i.order_id.is_none())
            .cloned()
            .collect();
        inquiries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(inquiries)
    }
}

impl CartRepository for InMemoryStore {
    fn find_by_order(&self, order_id: Uuid) -> Result<Vec<CartItem>, DomainError> {
        Ok(self
            .lock()?
            .carts
            .iter()
            .filter(|c| c.order_id == order_id)
            .cloned()
            .collect())
    }

    fn replace(&self, order_id: Uuid, items: &[CartItem]) -> Result<Vec<CartItem>, DomainError> {
        let mut state = self.lock()?;
        state.carts.retain(|c| c.order_id != order_id);
        state.carts.extend(items.iter().cloned());
        Ok(items.to_vec())
    }

    fn upsert_item(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, DomainError> {
        let mut state = self.lock()?;
        if let Some(line) = state
            .carts
            .iter_mut()
            .find(|c| c.order_id == order_id && c.product_id == product_id)
        {
            line.quantity = quantity;
            return Ok(line.clone());
        }

        let line = CartItem {
            order_id,
            product_id,
            quantity,
        };
        state.carts.push(line.clone());
        Ok(line)
    }

    fn remove_item(&self, order_id: Uuid, product_id: Uuid) -> Result<(), DomainError> {
        self.lock()?
            .carts
            .retain(|c| !(c.order_id == order_id && c.product_id == product_id));
        Ok(())
    }
}

impl ProductRepository for InMemoryStore {
    fn find_by_id(&self, id: Uuid, include_archived: bool) -> Result<Option<Product>, DomainError> {
        Ok(self
            .lock()?
            .products
            .iter()
            .find(|p| p.id == id && (include_archived || !p.is_archived()))
            .cloned())
    }

    fn list(&self, include_archived: bool) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .lock()?
            .products
            .iter()
            .filter(|p| include_archived || !p.is_archived())
            .cloned()
            .collect())
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let created = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            cost: product.cost,
            inventory: product.inventory,
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.lock()?.products.push(created.clone());
        Ok(created)
    }

    fn update(&self, product: &Product) -> Result<Product, DomainError> {
        let mut state = self.lock()?;
        let stored = state
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| DomainError::not_found("Product", product.id))?;

        *stored = Product {
            created_at: stored.created_at,
            ..product.clone()
        };
        Ok(stored.clone())
    }

    fn soft_delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let stored = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found("Product", id))?;
        stored.deleted_at.get_or_insert_with(Utc::now);
        Ok(())
    }

    fn hard_delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(DomainError::not_found("Product", id));
        }
        Ok(())
    }
}

impl UserRepository for InMemoryStore {
    fn create(&self, user: NewUser, password_hash: String) -> Result<User, DomainError> {
        let mut state = self.lock()?;
        if state
            .users
            .iter()
            .any(|u| u.user.username == user.username || u.user.email == user.email)
        {
            return Err(DomainError::invalid(format!(
                "a user named {} or with email {} already exists",
                user.username, user.email
            )));
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            admin: user.admin,
        };
        state.users.push(StoredUser {
            user: created.clone(),
            password_hash,
        });
        Ok(created)
    }

    fn find_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, DomainError> {
        if username.is_none() && email.is_none() {
            return Ok(None);
        }
        Ok(self
            .lock()?
            .users
            .iter()
            .map(|u| &u.user)
            .find(|u| {
                username.map_or(true, |name| u.username == name)
                    && email.map_or(true, |mail| u.email == mail)
            })
            .cloned())
    }

    fn password_hash(&self, user_id: Uuid) -> Result<Option<String>, DomainError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.user.id == user_id)
            .map(|u| u.password_hash.clone()))
    }
}
