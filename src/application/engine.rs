use crate::application::polling::{PollOutcome, poll_until};
use crate::config::{EngineConfig, PollConfig};
use crate::domain::command::OrderCommand;
use crate::domain::ids::{DeliveryId, OrderId, RowId};
use crate::domain::money::Money;
use crate::domain::order::{NewOrder, Order};
use crate::domain::ports::OrderStoreBox;
use crate::domain::projection::OrderProjection;
use crate::error::{LifecycleError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The state machine driving every order through its lifecycle.
///
/// Transitions on one order run one at a time: each holds that order's guard
/// while it loads the committed copy, applies the command to a private clone
/// and stores the clone. Nothing is stored when the command fails, so a
/// transition either lands completely or not at all. Transitions on different
/// orders do not wait for each other, and queries take no guard at all.
/// A guard stays registered only while some call holds or awaits it.
pub struct OrderLifecycleEngine {
    store: OrderStoreBox,
    guards: Mutex<HashMap<OrderId, Arc<Mutex<()>>>>,
    config: EngineConfig,
}

impl OrderLifecycleEngine {
    /// Creates a new engine over the given store.
    ///
    /// # Arguments
    ///
    /// * `store` - Where committed orders live.
    /// * `config` - Projection shape and default polling behaviour.
    pub fn new(store: OrderStoreBox, config: EngineConfig) -> Self {
        Self {
            store,
            guards: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Places a new order under a caller-chosen id.
    pub async fn create_order(&self, order_id: OrderId, new_order: NewOrder) -> Result<OrderProjection> {
        let guard = self.guard(order_id).await;
        let result = {
            let _held = guard.lock().await;
            self.create_locked(order_id, new_order).await
        };
        self.release(order_id, guard).await;
        result
    }

    /// Applies exactly one transition to an existing order.
    pub async fn apply_transition(&self, order_id: OrderId, command: OrderCommand) -> Result<OrderProjection> {
        let guard = self.guard(order_id).await;
        let result = {
            let _held = guard.lock().await;
            self.apply_locked(order_id, command).await
        };
        self.release(order_id, guard).await;
        result
    }

    async fn create_locked(&self, order_id: OrderId, new_order: NewOrder) -> Result<OrderProjection> {
        if self.store.exists(order_id).await? {
            return Err(LifecycleError::validation(format!(
                "Order {} already exists",
                order_id
            )));
        }

        let order = Order::create(order_id, new_order)?;
        let projection = self.project(&order)?;
        self.store.store(order).await?;

        tracing::info!(
            order_id = %order_id,
            amount = %projection.order_amount,
            payment_type = %projection.payment_type,
            "order created"
        );
        Ok(projection)
    }

    async fn apply_locked(&self, order_id: OrderId, command: OrderCommand) -> Result<OrderProjection> {
        let mut order = self
            .store
            .get(order_id)
            .await?
            .ok_or_else(|| LifecycleError::order_not_found(order_id))?;

        if let Err(e) = command.apply(&mut order) {
            tracing::warn!(
                order_id = %order_id,
                command = command.name(),
                error = %e,
                "transition rejected"
            );
            return Err(e);
        }

        order.version += 1;
        let projection = self.project(&order)?;
        self.store.store(order).await?;

        tracing::info!(
            order_id = %order_id,
            command = command.name(),
            status = %projection.order_status,
            version = projection.version,
            "transition applied"
        );
        Ok(projection)
    }

    pub async fn deliver_order(&self, order_id: OrderId) -> Result<OrderProjection> {
        self.apply_transition(order_id, OrderCommand::Deliver { rows: None })
            .await
    }

    pub async fn deliver_rows(&self, order_id: OrderId, rows: Vec<RowId>) -> Result<OrderProjection> {
        self.apply_transition(order_id, OrderCommand::Deliver { rows: Some(rows) })
            .await
    }

    pub async fn cancel_order(&self, order_id: OrderId) -> Result<OrderProjection> {
        self.apply_transition(order_id, OrderCommand::CancelOrder)
            .await
    }

    pub async fn credit_amount(
        &self,
        order_id: OrderId,
        delivery: DeliveryId,
        amount: Money,
    ) -> Result<OrderProjection> {
        self.apply_transition(order_id, OrderCommand::CreditAmount { delivery, amount })
            .await
    }

    pub async fn credit_order_rows(&self, order_id: OrderId, delivery: DeliveryId) -> Result<OrderProjection> {
        self.apply_transition(order_id, OrderCommand::CreditOrderRows { delivery })
            .await
    }

    pub async fn credit_new_row(
        &self,
        order_id: OrderId,
        delivery: DeliveryId,
        name: impl Into<String>,
        amount: Money,
    ) -> Result<OrderProjection> {
        self.apply_transition(
            order_id,
            OrderCommand::CreditNewRow {
                delivery,
                name: name.into(),
                amount,
            },
        )
        .await
    }

    /// Reads the last committed state of an order.
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderProjection> {
        let order = self
            .store
            .get(order_id)
            .await?
            .ok_or_else(|| LifecycleError::order_not_found(order_id))?;
        self.project(&order)
    }

    /// Every stored order, ordered by id.
    pub async fn all_orders(&self) -> Result<Vec<OrderProjection>> {
        let mut orders = self.store.get_all().await?;
        orders.sort_by_key(|order| order.id);
        orders.iter().map(|order| self.project(order)).collect()
    }

    /// Polls `get_order` until `predicate` holds, using the configured
    /// polling defaults.
    pub async fn wait_for<F>(&self, order_id: OrderId, predicate: F) -> Result<PollOutcome>
    where
        F: Fn(&OrderProjection) -> bool,
    {
        self.wait_for_with(order_id, self.config.poll.clone(), predicate)
            .await
    }

    pub async fn wait_for_with<F>(
        &self,
        order_id: OrderId,
        config: PollConfig,
        predicate: F,
    ) -> Result<PollOutcome>
    where
        F: Fn(&OrderProjection) -> bool,
    {
        poll_until(config, predicate, || self.get_order(order_id)).await
    }

    fn project(&self, order: &Order) -> Result<OrderProjection> {
        OrderProjection::from_order(order, &self.config.projection)
    }

    async fn guard(&self, order_id: OrderId) -> Arc<Mutex<()>> {
        let mut guards = self.guards.lock().await;
        guards.entry(order_id).or_default().clone()
    }

    /// Drops the registry entry once no other caller holds or awaits it.
    ///
    /// Clones are only handed out under the registry lock, so the count
    /// cannot grow while it is checked here.
    async fn release(&self, order_id: OrderId, guard: Arc<Mutex<()>>) {
        let mut guards = self.guards.lock().await;
        // One reference in the map, one here.
        if Arc::strong_count(&guard) == 2 {
            guards.remove(&order_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Currency;
    use crate::domain::order::OrderStatus;
    use crate::domain::order_row::NewOrderRow;
    use crate::domain::payment_type::PaymentType;
    use crate::infrastructure::in_memory::InMemoryOrderStore;

    fn engine() -> OrderLifecycleEngine {
        OrderLifecycleEngine::new(Box::new(InMemoryOrderStore::new()), EngineConfig::default())
    }

    fn new_order(payment_type: PaymentType) -> NewOrder {
        NewOrder {
            rows: vec![NewOrderRow::new("Sneakers", 1, 10000)],
            currency: Currency::new("SEK").unwrap(),
            is_company: false,
            email_address: "test@example.com".to_string(),
            payment_type,
        }
    }

    #[tokio::test]
    async fn test_duplicate_order_ids() {
        let engine = engine();
        engine
            .create_order(OrderId(1), new_order(PaymentType::Invoice))
            .await
            .unwrap();

        let result = engine
            .create_order(OrderId(1), new_order(PaymentType::Card))
            .await;
        assert!(matches!(result, Err(LifecycleError::ValidationError(_))));

        let order = engine.get_order(OrderId(1)).await.unwrap();
        assert_eq!(order.payment_type, PaymentType::Invoice);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let engine = engine();
        assert!(engine.get_order(OrderId(9)).await.unwrap_err().is_not_found());
        assert!(engine.deliver_order(OrderId(9)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_version_moves_only_on_success() {
        let engine = engine();
        engine
            .create_order(OrderId(1), new_order(PaymentType::PaymentPlan))
            .await
            .unwrap();

        let delivered = engine.deliver_order(OrderId(1)).await.unwrap();
        assert_eq!(delivered.version, 2);
        assert_eq!(delivered.order_status, OrderStatus::Delivered);

        let rejected = engine.cancel_order(OrderId(1)).await;
        assert!(matches!(rejected, Err(LifecycleError::InvalidTransition(_))));

        let current = engine.get_order(OrderId(1)).await.unwrap();
        assert_eq!(current, delivered);
    }

    #[tokio::test]
    async fn test_guards_are_released_after_each_call() {
        let engine = engine();
        for id in 1..=1000 {
            assert!(engine.deliver_order(OrderId(id)).await.unwrap_err().is_not_found());
        }
        assert!(engine.guards.lock().await.is_empty());

        let mut invalid = new_order(PaymentType::Invoice);
        invalid.rows.clear();
        assert!(engine.create_order(OrderId(1), invalid).await.is_err());
        engine
            .create_order(OrderId(2), new_order(PaymentType::Invoice))
            .await
            .unwrap();
        engine.deliver_order(OrderId(2)).await.unwrap();
        assert!(engine.guards.lock().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_contended_guard_stays_exclusive() {
        let engine = Arc::new(engine());
        engine
            .create_order(OrderId(1), new_order(PaymentType::Card))
            .await
            .unwrap();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        engine.deliver_order(OrderId(1)).await
                    } else {
                        engine.cancel_order(OrderId(1)).await
                    }
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(engine.get_order(OrderId(1)).await.unwrap().version, 2);
        assert!(engine.guards.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_all_orders_sorted() {
        let engine = engine();
        for id in [5, 2, 9] {
            engine
                .create_order(OrderId(id), new_order(PaymentType::Invoice))
                .await
                .unwrap();
        }

        let ids: Vec<OrderId> = engine
            .all_orders()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![OrderId(2), OrderId(5), OrderId(9)]);
    }
}
