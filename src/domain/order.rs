use super::actions::{
    DeliveryActions, OrderActions, OrderRowActions, open_order_actions, open_row_actions,
};
use super::credit::Credit;
use super::delivery::Delivery;
use super::ids::{DeliveryId, OrderId, RowId};
use super::money::{Currency, Money};
use super::order_row::{NewOrderRow, OrderRow};
use super::payment_type::PaymentType;
use crate::error::{LifecycleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    Delivered,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything needed to place an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub rows: Vec<NewOrderRow>,
    pub currency: Currency,
    pub is_company: bool,
    pub email_address: String,
    pub payment_type: PaymentType,
}

/// Aggregate root of the payment-order lifecycle.
///
/// `rows` keeps every row ever placed; rows attached to a delivery are no
/// longer outstanding. Available actions, the cancelled amount and the
/// credited amounts are all derived on demand. Every mutating method
/// validates completely before it changes anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub version: u64,
    pub currency: Currency,
    pub is_company: bool,
    pub email_address: String,
    pub payment_type: PaymentType,
    pub order_amount: Money,
    pub status: OrderStatus,
    pub rows: Vec<OrderRow>,
    pub deliveries: Vec<Delivery>,
}

impl Order {
    pub fn create(id: OrderId, new_order: NewOrder) -> Result<Self> {
        if new_order.rows.is_empty() {
            return Err(LifecycleError::validation(
                "An order needs at least one row",
            ));
        }
        if !new_order.email_address.contains('@') {
            return Err(LifecycleError::validation(format!(
                "Invalid email address '{}'",
                new_order.email_address
            )));
        }

        let rows = new_order
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| OrderRow::from_new(RowId(i as u32 + 1), row))
            .collect::<Result<Vec<_>>>()?;

        let totals = rows
            .iter()
            .map(|row| row.total(&new_order.currency))
            .collect::<Result<Vec<_>>>()?;
        let order_amount = Money::sum(&new_order.currency, &totals)?;

        Ok(Self {
            id,
            version: 1,
            currency: new_order.currency,
            is_company: new_order.is_company,
            email_address: new_order.email_address,
            payment_type: new_order.payment_type,
            order_amount,
            status: OrderStatus::Open,
            rows,
            deliveries: Vec::new(),
        })
    }

    pub fn is_delivered(&self, row: RowId) -> bool {
        self.deliveries.iter().any(|d| d.row_ids.contains(&row))
    }

    /// Rows not yet attached to any delivery, cancelled ones included.
    pub fn outstanding_rows(&self) -> impl Iterator<Item = &OrderRow> {
        self.rows.iter().filter(|row| !self.is_delivered(row.id))
    }

    pub fn cancelled_amount(&self) -> Result<Money> {
        let totals = self
            .rows
            .iter()
            .filter(|row| row.is_cancelled)
            .map(|row| row.total(&self.currency))
            .collect::<Result<Vec<_>>>()?;
        Money::sum(&self.currency, &totals)
    }

    pub fn available_actions(&self) -> OrderActions {
        match self.status {
            OrderStatus::Open => open_order_actions(),
            OrderStatus::Delivered | OrderStatus::Cancelled => OrderActions::new(),
        }
    }

    pub fn row_actions(&self, row: &OrderRow) -> OrderRowActions {
        if self.status == OrderStatus::Open && !row.is_cancelled && !self.is_delivered(row.id) {
            open_row_actions()
        } else {
            OrderRowActions::new()
        }
    }

    pub fn delivery_actions(&self, delivery: &Delivery) -> Result<DeliveryActions> {
        if self.status == OrderStatus::Cancelled {
            Ok(DeliveryActions::new())
        } else {
            delivery.available_actions()
        }
    }

    pub fn delivery(&self, id: DeliveryId) -> Result<&Delivery> {
        self.deliveries
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| LifecycleError::delivery_not_found(id))
    }

    /// Delivers the given rows as one delivery.
    pub fn deliver(&mut self, row_ids: &[RowId]) -> Result<&Delivery> {
        self.require_status(OrderStatus::Open, "deliver")?;
        if row_ids.is_empty() {
            return Err(LifecycleError::validation(
                "A delivery needs at least one row",
            ));
        }

        let wanted: BTreeSet<RowId> = row_ids.iter().copied().collect();
        let mut amounts = Vec::with_capacity(wanted.len());
        for id in &wanted {
            let row = self
                .rows
                .iter()
                .find(|row| row.id == *id)
                .ok_or_else(|| {
                    LifecycleError::invalid_transition(format!(
                        "Row {} does not belong to order {}",
                        id, self.id
                    ))
                })?;
            if row.is_cancelled {
                return Err(LifecycleError::invalid_transition(format!(
                    "Row {} is cancelled",
                    id
                )));
            }
            if self.is_delivered(*id) {
                return Err(LifecycleError::invalid_transition(format!(
                    "Row {} is already delivered",
                    id
                )));
            }
            amounts.push(row.total(&self.currency)?);
        }
        let delivery_amount = Money::sum(&self.currency, &amounts)?;

        let delivery_id = DeliveryId(self.deliveries.len() as u32 + 1);
        self.deliveries.push(Delivery::new(
            delivery_id,
            self.id,
            wanted,
            delivery_amount,
            self.payment_type.credit_capability(),
        ));

        if self.outstanding_rows().next().is_none() {
            self.status = OrderStatus::Delivered;
        }

        self.delivery(delivery_id)
    }

    /// Delivers every outstanding, uncancelled row.
    pub fn deliver_all(&mut self) -> Result<&Delivery> {
        let rows: Vec<RowId> = self
            .outstanding_rows()
            .filter(|row| !row.is_cancelled)
            .map(|row| row.id)
            .collect();
        self.deliver(&rows)
    }

    /// Cancels every outstanding row and closes the order.
    pub fn cancel(&mut self) -> Result<()> {
        self.require_status(OrderStatus::Open, "cancel")?;

        let outstanding: Vec<RowId> = self
            .outstanding_rows()
            .filter(|row| !row.is_cancelled)
            .map(|row| row.id)
            .collect();
        for row in self.rows.iter_mut() {
            if outstanding.contains(&row.id) {
                row.cancel()?;
            }
        }
        self.status = OrderStatus::Cancelled;
        Ok(())
    }

    pub fn credit_amount(&mut self, delivery: DeliveryId, amount: Money) -> Result<Credit> {
        self.require_not_cancelled("credit")?;
        let credit = self.delivery_mut(delivery)?.credit_amount(amount)?.clone();
        Ok(credit)
    }

    pub fn credit_new_row(
        &mut self,
        delivery: DeliveryId,
        name: &str,
        amount: Money,
    ) -> Result<Credit> {
        self.require_not_cancelled("credit")?;
        let credit = self
            .delivery_mut(delivery)?
            .credit_new_row(name, amount)?
            .clone();
        Ok(credit)
    }

    /// Reverses a delivery in full. Once every delivery of a delivered order
    /// has been reversed the order is cancelled.
    pub fn credit_order_rows(&mut self, delivery: DeliveryId) -> Result<Credit> {
        self.require_not_cancelled("credit")?;
        let credit = self.delivery_mut(delivery)?.credit_order_rows()?.clone();

        if self.status == OrderStatus::Delivered && self.all_deliveries_credited()? {
            self.status = OrderStatus::Cancelled;
        }
        Ok(credit)
    }

    fn all_deliveries_credited(&self) -> Result<bool> {
        for delivery in &self.deliveries {
            if !delivery.is_fully_credited()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn delivery_mut(&mut self, id: DeliveryId) -> Result<&mut Delivery> {
        self.deliveries
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| LifecycleError::delivery_not_found(id))
    }

    fn require_status(&self, expected: OrderStatus, what: &str) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(LifecycleError::invalid_transition(format!(
                "Cannot {} order {} in status {}",
                what, self.id, self.status
            )))
        }
    }

    fn require_not_cancelled(&self, what: &str) -> Result<()> {
        if self.status == OrderStatus::Cancelled {
            Err(LifecycleError::invalid_transition(format!(
                "Cannot {} on cancelled order {}",
                what, self.id
            )))
        } else {
            Ok(())
        }
    }
}
