use super::actions::{DeliveryActions, OrderActions, OrderRowActions};
use super::credit::Credit;
use super::delivery::SettlementStatus;
use super::ids::{DeliveryId, OrderId, RowId};
use super::money::{Currency, Money};
use super::order::{Order, OrderStatus};
use super::payment_type::PaymentType;
use crate::config::{ProjectionPolicy, Vacancy};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Immutable snapshot of an order as reported by the query API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProjection {
    pub id: OrderId,
    pub version: u64,
    pub currency: Currency,
    pub is_company: bool,
    pub email_address: String,
    pub order_amount: Money,
    pub cancelled_amount: Money,
    pub order_status: OrderStatus,
    pub payment_type: PaymentType,
    pub available_actions: OrderActions,
    pub order_rows: Option<Vec<OrderRowView>>,
    pub deliveries: Option<Vec<DeliveryView>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRowView {
    pub id: RowId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub is_cancelled: bool,
    pub available_actions: OrderRowActions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryView {
    pub id: DeliveryId,
    pub row_ids: BTreeSet<RowId>,
    pub delivery_amount: Money,
    pub credited_amount: Money,
    pub credits: Vec<Credit>,
    pub status: Option<SettlementStatus>,
    pub available_actions: DeliveryActions,
}

impl OrderProjection {
    pub fn from_order(order: &Order, policy: &ProjectionPolicy) -> Result<Self> {
        let rows = order
            .outstanding_rows()
            .map(|row| -> Result<OrderRowView> {
                Ok(OrderRowView {
                    id: row.id,
                    name: row.name.clone(),
                    quantity: row.quantity,
                    unit_price: Money::new(row.unit_price_minor_units, order.currency.clone())?,
                    is_cancelled: row.is_cancelled,
                    available_actions: order.row_actions(row),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let deliveries = order
            .deliveries
            .iter()
            .map(|delivery| -> Result<DeliveryView> {
                Ok(DeliveryView {
                    id: delivery.id,
                    row_ids: delivery.row_ids.clone(),
                    delivery_amount: delivery.delivery_amount.clone(),
                    credited_amount: delivery.credited_amount()?,
                    credits: delivery.credits.clone(),
                    status: delivery.status,
                    available_actions: order.delivery_actions(delivery)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: order.id,
            version: order.version,
            currency: order.currency.clone(),
            is_company: order.is_company,
            email_address: order.email_address.clone(),
            order_amount: order.order_amount.clone(),
            cancelled_amount: order.cancelled_amount()?,
            order_status: order.status,
            payment_type: order.payment_type,
            available_actions: order.available_actions(),
            order_rows: vacate(
                rows,
                policy
                    .consumed_rows
                    .for_capability(order.payment_type.credit_capability()),
            ),
            deliveries: vacate(deliveries, policy.missing_deliveries),
        })
    }

    /// Outstanding rows, treating an absent collection as empty.
    pub fn rows(&self) -> &[OrderRowView] {
        self.order_rows.as_deref().unwrap_or_default()
    }

    /// Deliveries, treating an absent collection as empty.
    pub fn delivery_list(&self) -> &[DeliveryView] {
        self.deliveries.as_deref().unwrap_or_default()
    }

    /// True when no action is available at order, row or delivery level.
    pub fn is_inert(&self) -> bool {
        self.available_actions.is_empty()
            && self.rows().iter().all(|r| r.available_actions.is_empty())
            && self
                .delivery_list()
                .iter()
                .all(|d| d.available_actions.is_empty())
    }
}

fn vacate<T>(items: Vec<T>, vacancy: Vacancy) -> Option<Vec<T>> {
    match (items.is_empty(), vacancy) {
        (true, Vacancy::Absent) => None,
        _ => Some(items),
    }
}
