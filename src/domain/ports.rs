use uuid::Uuid;

use super::errors::DomainError;
use super::order::{NewOrder, Order, OrderStatus};

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// All orders, most recently inserted first.
    fn list_newest_first(&self) -> Result<Vec<Order>, DomainError>;
    /// Overwrites `status` only. Returns `DomainError::NotFound` when `id` is unknown.
    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError>;
}

impl<T: OrderRepository + ?Sized> OrderRepository for Box<T> {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        (**self).create(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        (**self).find_by_id(id)
    }

    fn list_newest_first(&self) -> Result<Vec<Order>, DomainError> {
        (**self).list_newest_first()
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        (**self).update_status(id, status)
    }
}
