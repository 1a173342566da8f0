use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::CartItem;
use super::inquiry::InquiryInput;

/// Where an order sits in the checkout workflow.
///
/// Orders start as `UserPending`, move to `AdminPending` once authorized and
/// end as `Accepted`. `NotImplemented` is the fallback for stored or wire
/// values this build does not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    NotImplemented,
    UserPending,
    AdminPending,
    Accepted,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::NotImplemented => "NOT_IMPLEMENTED",
            OrderStatus::UserPending => "USER_PENDING",
            OrderStatus::AdminPending => "ADMIN_PENDING",
            OrderStatus::Accepted => "ACCEPTED",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "USER_PENDING" => OrderStatus::UserPending,
            "ADMIN_PENDING" => OrderStatus::AdminPending,
            "ACCEPTED" => OrderStatus::Accepted,
            _ => OrderStatus::NotImplemented,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    NotImplemented,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::NotImplemented => "NOT_IMPLEMENTED",
            PaymentMethod::Paypal => "PAYPAL",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "PAYPAL" => PaymentMethod::Paypal,
            _ => PaymentMethod::NotImplemented,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrdersSortBy {
    DateAscending,
    DateDescending,
    DueAscending,
    #[default]
    DueDescending,
}

impl OrdersSortBy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DATE_ASCENDING" => Some(OrdersSortBy::DateAscending),
            "DATE_DESCENDING" => Some(OrdersSortBy::DateDescending),
            "DUE_ASCENDING" => Some(OrdersSortBy::DueAscending),
            "DUE_DESCENDING" => Some(OrdersSortBy::DueDescending),
            _ => None,
        }
    }
}

/// Filter and sort options for listing orders. `status: None` lists every
/// status.
#[derive(Debug, Clone, Default)]
pub struct OrderConditions {
    pub status: Option<OrderStatus>,
    pub sort_by: OrdersSortBy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub ext_id: Option<String>,
    pub total: BigDecimal,
    pub due: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Filled by the checkout service on reads; repositories leave it empty.
    pub cart: Vec<CartItem>,
}

impl Order {
    pub fn is_authorized(&self) -> bool {
        self.ext_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub inquiry_id: Uuid,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub due: Option<DateTime<Utc>>,
}

/// The client-editable part of an order. Total is derived from the cart and
/// the external id only comes from the payment provider, so neither is here.
#[derive(Debug, Clone)]
pub struct OrderInput {
    pub id: Option<Uuid>,
    pub inquiry_id: Option<Uuid>,
    pub inquiry: Option<InquiryInput>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub due: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_roundtrip_and_unknown_falls_back() {
        for status in [
            OrderStatus::UserPending,
            OrderStatus::AdminPending,
            OrderStatus::Accepted,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), status);
        }
        assert_eq!(OrderStatus::parse("SHIPPED"), OrderStatus::NotImplemented);
    }

    #[test]
    fn unknown_payment_method_falls_back() {
        assert_eq!(PaymentMethod::parse("PAYPAL"), PaymentMethod::Paypal);
        assert_eq!(PaymentMethod::parse("BITCOIN"), PaymentMethod::NotImplemented);
    }

    #[test]
    fn empty_ext_id_is_not_authorized() {
        let mut order = Order {
            id: Uuid::new_v4(),
            inquiry_id: Uuid::new_v4(),
            payment_method: PaymentMethod::Paypal,
            status: OrderStatus::UserPending,
            ext_id: Some(String::new()),
            total: BigDecimal::from(0),
            due: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            cart: vec![],
        };
        assert!(!order.is_authorized());
        order.ext_id = Some("5O190127TN364715T".to_string());
        assert!(order.is_authorized());
    }
}
