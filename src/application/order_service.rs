use log::{debug, info};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::ports::OrderRepository;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores a checkout order. New orders always start at `Order Placed`.
    pub fn place_order(&self, order: NewOrder) -> Result<Order, DomainError> {
        if order.items.is_empty() {
            return Err(DomainError::InvalidInput(
                "an order needs at least one item".to_string(),
            ));
        }
        let order = self.repo.create(order)?;
        info!("Placed order {} for user {}", order.id, order.user_id);
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.repo.find_by_id(id)
    }

    pub fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.repo.list_newest_first()
    }

    /// Validates and persists a status change. Any of the five statuses may
    /// follow any other, backward moves and skipped stages included. Values
    /// are matched exactly; surrounding whitespace is not stripped.
    pub fn update_status(&self, order_id: &str, status: &str) -> Result<OrderStatus, DomainError> {
        if status.trim().is_empty() {
            return Err(DomainError::InvalidInput("status must not be empty".to_string()));
        }
        let status: OrderStatus = status.parse()?;
        // An id that is not a UUID can never resolve to a stored order.
        let id = Uuid::parse_str(order_id).map_err(|_| {
            debug!("Order id '{order_id}' is not a valid UUID");
            DomainError::NotFound
        })?;
        self.repo.update_status(id, status)?;
        info!("Order {id} moved to '{status}'");
        Ok(status)
    }
}

impl OrderService<Box<dyn OrderRepository>> {
    /// Type-erases the repository so handlers can share one service type.
    pub fn boxed(repo: impl OrderRepository) -> Self {
        Self::new(Box::new(repo))
    }
}
