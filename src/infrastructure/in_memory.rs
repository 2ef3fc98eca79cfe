use crate::domain::ids::OrderId;
use crate::domain::order::Order;
use crate::domain::ports::OrderStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for orders.
///
/// Uses `Arc<RwLock<HashMap<OrderId, Order>>>` to allow shared concurrent access.
/// Each `store` swaps in a complete copy of the order, so readers only ever see
/// committed versions.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&order_id).cloned())
    }

    async fn exists(&self, order_id: OrderId) -> Result<bool> {
        let orders = self.orders.read().await;
        Ok(orders.contains_key(&order_id))
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by_key(|order| order.id);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Currency;
    use crate::domain::order::NewOrder;
    use crate::domain::order_row::NewOrderRow;
    use crate::domain::payment_type::PaymentType;

    fn order(id: u64) -> Order {
        Order::create(
            OrderId(id),
            NewOrder {
                rows: vec![NewOrderRow::new("Sneakers", 1, 10000)],
                currency: Currency::new("SEK").unwrap(),
                is_company: false,
                email_address: "test@example.com".to_string(),
                payment_type: PaymentType::Invoice,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_order_store() {
        let store = InMemoryOrderStore::new();
        let order = order(1);

        store.store(order.clone()).await.unwrap();
        let retrieved = store.get(OrderId(1)).await.unwrap().unwrap();
        assert_eq!(retrieved, order);

        assert!(store.exists(OrderId(1)).await.unwrap());
        assert!(store.get(OrderId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_order_store_get_all_is_sorted() {
        let store = InMemoryOrderStore::new();
        for id in [3, 1, 2] {
            store.store(order(id)).await.unwrap();
        }

        let ids: Vec<OrderId> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![OrderId(1), OrderId(2), OrderId(3)]);
    }

    #[tokio::test]
    async fn test_store_replaces_previous_version() {
        let store = InMemoryOrderStore::new();
        let mut order = order(1);
        store.store(order.clone()).await.unwrap();

        order.cancel().unwrap();
        order.version += 1;
        store.store(order).await.unwrap();

        let retrieved = store.get(OrderId(1)).await.unwrap().unwrap();
        assert_eq!(retrieved.version, 2);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }
}
