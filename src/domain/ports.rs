use super::ids::OrderId;
use super::order::Order;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence port for order aggregates.
///
/// `get` must return the last stored copy as a whole; a reader never sees
/// half of a write.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;
    async fn exists(&self, order_id: OrderId) -> Result<bool>;
    async fn get_all(&self) -> Result<Vec<Order>>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
