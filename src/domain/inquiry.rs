use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A customer's initial contact request. Exists before, and independently
/// of, any order.
#[derive(Debug, Clone, PartialEq)]
pub struct Inquiry {
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

#[derive(Debug, Clone, Default)]
pub struct NewInquiry {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InquiryInput {
    pub id: Option<Uuid>,
    pub fields: NewInquiry,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InquiryConditions {
    /// Only return inquiries that no order has claimed yet.
    pub without_order: bool,
}
