//! Programmatic stand-in for the checkout UI.
//!
//! Each call maps onto one engine transition, so the driver stays a thin
//! caller. Payment methods that settle at checkout report back through a
//! background task after `settlement_delay`, the way a payment webhook lands
//! after the shopper has already been sent to the order page. Callers
//! observe that through [`OrderLifecycleEngine::wait_for`].

use crate::application::engine::OrderLifecycleEngine;
use crate::config::CheckoutConfig;
use crate::domain::ids::{DeliveryId, OrderId};
use crate::domain::money::Money;
use crate::domain::order::NewOrder;
use crate::domain::order_row::NewOrderRow;
use crate::domain::payment_type::PaymentType;
use crate::domain::projection::OrderProjection;
use crate::error::{LifecycleError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A product put in the cart, priced in major units.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl Product {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOption {
    Identification,
    Anonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityOption {
    Private,
    Company,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    PaymentPlan,
    Invoice,
    Card,
    Trustly,
}

impl PaymentMethod {
    pub fn payment_type(self) -> PaymentType {
        match self {
            PaymentMethod::PaymentPlan => PaymentType::PaymentPlan,
            PaymentMethod::Invoice => PaymentType::Invoice,
            PaymentMethod::Card => PaymentType::Card,
            PaymentMethod::Trustly => PaymentType::DirectBank,
        }
    }

    /// Whether the payment captures (delivers) the whole order at checkout.
    pub fn settles_on_checkout(self) -> bool {
        matches!(self, PaymentMethod::Card | PaymentMethod::Trustly)
    }
}

pub struct CheckoutDriver {
    engine: Arc<OrderLifecycleEngine>,
    config: CheckoutConfig,
    next_order_id: AtomicU64,
}

impl CheckoutDriver {
    pub fn new(engine: Arc<OrderLifecycleEngine>, config: CheckoutConfig) -> Self {
        Self {
            engine,
            config,
            next_order_id: AtomicU64::new(1),
        }
    }

    pub fn engine(&self) -> &OrderLifecycleEngine {
        &self.engine
    }

    /// Checks out `products` and returns the id of the resulting order.
    pub async fn go_to_orders_page(
        &self,
        products: &[Product],
        checkout: CheckoutOption,
        entity: EntityOption,
        method: PaymentMethod,
    ) -> Result<OrderId> {
        let rows = products
            .iter()
            .map(|product| -> Result<NewOrderRow> {
                let unit_price = Money::from_major(product.unit_price, self.config.currency.clone())?;
                Ok(NewOrderRow::new(
                    product.name.clone(),
                    product.quantity,
                    unit_price.minor_units(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let email_address = match checkout {
            CheckoutOption::Identification => self.config.customer_email.clone(),
            CheckoutOption::Anonymous => self.config.anonymous_email.clone(),
        };

        let order_id = OrderId(self.next_order_id.fetch_add(1, Ordering::SeqCst));
        self.engine
            .create_order(
                order_id,
                NewOrder {
                    rows,
                    currency: self.config.currency.clone(),
                    is_company: entity == EntityOption::Company,
                    email_address,
                    payment_type: method.payment_type(),
                },
            )
            .await?;

        if method.settles_on_checkout() {
            self.settle(order_id).await?;
        }
        Ok(order_id)
    }

    pub async fn deliver_order(&self, order_id: OrderId) -> Result<OrderProjection> {
        self.engine.deliver_order(order_id).await
    }

    pub async fn cancel_order(&self, order_id: OrderId) -> Result<OrderProjection> {
        self.engine.cancel_order(order_id).await
    }

    /// Credits the rows of the order's first delivery.
    pub async fn credit_order_rows(&self, order_id: OrderId) -> Result<OrderProjection> {
        let delivery = self.first_delivery(order_id).await?;
        self.engine.credit_order_rows(order_id, delivery).await
    }

    /// Credits whatever remains on the order's first delivery.
    pub async fn credit_amount(&self, order_id: OrderId) -> Result<OrderProjection> {
        let projection = self.engine.get_order(order_id).await?;
        let delivery = projection
            .delivery_list()
            .first()
            .ok_or_else(|| no_delivery(order_id))?;
        let remaining = delivery
            .delivery_amount
            .checked_sub(&delivery.credited_amount)?;
        self.engine
            .credit_amount(order_id, delivery.id, remaining)
            .await
    }

    async fn first_delivery(&self, order_id: OrderId) -> Result<DeliveryId> {
        let projection = self.engine.get_order(order_id).await?;
        projection
            .delivery_list()
            .first()
            .map(|d| d.id)
            .ok_or_else(|| no_delivery(order_id))
    }

    async fn settle(&self, order_id: OrderId) -> Result<()> {
        let delay = self.config.settlement_delay;
        if delay.is_zero() {
            self.engine.deliver_order(order_id).await?;
            return Ok(());
        }

        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match engine.deliver_order(order_id).await {
                Ok(_) => tracing::info!(order_id = %order_id, "payment settled"),
                Err(e) => tracing::error!(order_id = %order_id, error = %e, "settlement failed"),
            }
        });
        Ok(())
    }
}

fn no_delivery(order_id: OrderId) -> LifecycleError {
    LifecycleError::invalid_transition(format!("Order {} has no delivery to credit", order_id))
}
