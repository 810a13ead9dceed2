use chrono::Utc;
use diesel::prelude::*;
use log::debug;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::orders;

use super::models::{NewOrderRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Internal(format!("corrupt order document: {e}"))
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        // Rows are only written through validated statuses, so a mismatch is corruption.
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|_| DomainError::Internal(format!("stored status '{}' is unknown", row.status)))?;
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            items: serde_json::from_value(row.items)?,
            address: serde_json::from_value(row.address)?,
            amount: row.amount,
            payment_method: row.payment_method,
            payment: row.payment,
            date: row.date,
            status,
        })
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        let row = NewOrderRow {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            items: serde_json::to_value(&order.items)?,
            address: serde_json::to_value(&order.address)?,
            amount: order.amount,
            payment_method: order.payment_method,
            payment: order.payment,
            status: OrderStatus::OrderPlaced.to_string(),
            date: Utc::now(),
        };

        let stored = diesel::insert_into(orders::table)
            .values(&row)
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)?;

        Order::try_from(stored)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Order::try_from).transpose()
    }

    fn list_newest_first(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .select(OrderRow::as_select())
            .order(orders::seq.desc())
            .load(&mut conn)?;
        debug!("Loaded {} orders", rows.len());

        rows.into_iter().map(Order::try_from).collect()
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(orders::table.filter(orders::id.eq(id)))
            .set(orders::status.eq(status.as_str()))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
