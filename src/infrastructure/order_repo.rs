use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::inquiry::{Inquiry, InquiryConditions, NewInquiry};
use crate::domain::order::{NewOrder, Order, OrderConditions, OrdersSortBy};
use crate::domain::ports::OrderRepository;
use crate::schema::{inquiries, orders};

use super::models::{
    InquiryChangeset, InquiryRow, NewInquiryRow, NewOrderRow, OrderChangeset, OrderRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => DomainError::NotFound("record".to_string()),
            diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation,
                info,
            ) => DomainError::InvalidRequest(info.message().to_string()),
            other => DomainError::Upstream(format!("database: {}", other)),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Upstream(format!("connection pool: {}", e))
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

/// Orders and the inquiries they are raised from.
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create_order(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::new_v4(),
                    inquiry_id: order.inquiry_id,
                    payment_method: order.payment_method.as_str(),
                    status: order.status.as_str(),
                    due: order.due,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // Claim the inquiry in the same transaction.
            let linked = diesel::update(inquiries::table.find(order.inquiry_id))
                .set(inquiries::order_id.eq(row.id))
                .execute(conn)?;
            if linked == 0 {
                return Err(DomainError::not_found("Inquiry", order.inquiry_id));
            }

            Ok(row.into())
        })
    }

    fn update_order(&self, order: &Order) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(orders::table.find(order.id))
            .set(OrderChangeset::from(order))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Order::from)
            .ok_or_else(|| DomainError::not_found("Order", order.id))
    }

    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Order::from))
    }

    fn list_orders(&self, conditions: &OrderConditions) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = orders::table.select(OrderRow::as_select()).into_boxed();
        if let Some(status) = conditions.status {
            query = query.filter(orders::status.eq(status.as_str()));
        }
        query = match conditions.sort_by {
            OrdersSortBy::DateAscending => query.order(orders::created_at.asc()),
            OrdersSortBy::DateDescending => query.order(orders::created_at.desc()),
            OrdersSortBy::DueAscending => query.order(orders::due.asc()),
            OrdersSortBy::DueDescending => query.order(orders::due.desc()),
        };

        let rows = query.load(&mut conn)?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    fn create_inquiry(&self, inquiry: NewInquiry) -> Result<Inquiry, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(inquiries::table)
            .values(&NewInquiryRow {
                id: Uuid::new_v4(),
                first_name: inquiry.first_name,
                last_name: inquiry.last_name,
                email: inquiry.email,
                phone: inquiry.phone,
                description: inquiry.description,
                attachments: inquiry.attachments,
            })
            .returning(InquiryRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_inquiry(&self, inquiry: &Inquiry) -> Result<Inquiry, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(inquiries::table.find(inquiry.id))
            .set(InquiryChangeset::from(inquiry))
            .returning(InquiryRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Inquiry::from)
            .ok_or_else(|| DomainError::not_found("Inquiry", inquiry.id))
    }

    fn find_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = inquiries::table
            .find(id)
            .select(InquiryRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Inquiry::from))
    }

    fn list_inquiries(
        &self,
        conditions: &InquiryConditions,
    ) -> Result<Vec<Inquiry>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = inquiries::table
            .select(InquiryRow::as_select())
            .order(inquiries::created_at.desc())
            .into_boxed();
        if conditions.without_order {
            query = query.filter(inquiries::order_id.is_null());
        }

        let rows = query.load(&mut conn)?;
        Ok(rows.into_iter().map(Inquiry::from).collect())
    }
}
