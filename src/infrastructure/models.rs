use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::cart::CartItem;
use crate::domain::inquiry::Inquiry;
use crate::domain::order::{Order, OrderStatus, PaymentMethod};
use crate::domain::product::Product;
use crate::domain::user::User;
use crate::schema::{carts, inquiries, orders, products, users};

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub payment_method: String,
    pub status: String,
    pub ext_id: Option<String>,
    pub total: BigDecimal,
    pub due: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            inquiry_id: row.inquiry_id,
            payment_method: PaymentMethod::parse(&row.payment_method),
            status: OrderStatus::parse(&row.status),
            ext_id: row.ext_id,
            total: row.total,
            due: row.due,
            created_at: row.created_at,
            updated_at: row.updated_at,
            cart: vec![],
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub payment_method: &'a str,
    pub status: &'a str,
    pub due: Option<DateTime<Utc>>,
}

/// Full overwrite of the mutable columns; `None` clears the column.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders, treat_none_as_null = true)]
pub struct OrderChangeset<'a> {
    pub payment_method: &'a str,
    pub status: &'a str,
    pub ext_id: Option<&'a str>,
    pub total: &'a BigDecimal,
    pub due: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Order> for OrderChangeset<'a> {
    fn from(order: &'a Order) -> Self {
        OrderChangeset {
            payment_method: order.payment_method.as_str(),
            status: order.status.as_str(),
            ext_id: order.ext_id.as_deref(),
            total: &order.total,
            due: order.due,
            updated_at: Utc::now(),
        }
    }
}

// ── Inquiries ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = inquiries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InquiryRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub attachments: Vec<String>,
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<InquiryRow> for Inquiry {
    fn from(row: InquiryRow) -> Self {
        Inquiry {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            description: row.description,
            attachments: row.attachments,
            order_id: row.order_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inquiries)]
pub struct NewInquiryRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub attachments: Vec<String>,
}

/// Contact fields only; `order_id` is owned by order creation.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = inquiries)]
pub struct InquiryChangeset<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub description: &'a str,
    pub attachments: &'a [String],
}

impl<'a> From<&'a Inquiry> for InquiryChangeset<'a> {
    fn from(inquiry: &'a Inquiry) -> Self {
        InquiryChangeset {
            first_name: &inquiry.first_name,
            last_name: &inquiry.last_name,
            email: &inquiry.email,
            phone: &inquiry.phone,
            description: &inquiry.description,
            attachments: &inquiry.attachments,
        }
    }
}

// ── Products ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cost: BigDecimal,
    pub inventory: i32,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            cost: row.cost,
            inventory: row.inventory,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cost: BigDecimal,
    pub inventory: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub cost: &'a BigDecimal,
    pub inventory: i32,
}

// ── Carts ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = carts)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: i64,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl From<CartRow> for CartItem {
    fn from(row: CartRow) -> Self {
        CartItem {
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl From<&CartItem> for NewCartRow {
    fn from(item: &CartItem) -> Self {
        NewCartRow {
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            admin: row.admin,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub admin: bool,
}
