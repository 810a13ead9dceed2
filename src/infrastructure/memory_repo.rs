use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::ports::OrderRepository;

/// Keeps orders in insertion order behind a mutex. Backs the handler tests and
/// local runs without a database.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Order>>, DomainError> {
        self.orders
            .lock()
            .map_err(|e| DomainError::Internal(format!("order store poisoned: {e}")))
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            items: order.items,
            address: order.address,
            amount: order.amount,
            payment_method: order.payment_method,
            payment: order.payment,
            date: Utc::now(),
            status: OrderStatus::OrderPlaced,
        };
        self.lock()?.push(order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.lock()?.iter().find(|o| o.id == id).cloned())
    }

    fn list_newest_first(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.lock()?.iter().rev().cloned().collect())
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        let mut orders = self.lock()?;
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound)?;
        order.status = status;
        Ok(())
    }
}
