use super::ids::RowId;
use super::money::{Currency, Money};
use crate::error::{LifecycleError, Result};
use serde::{Deserialize, Serialize};

/// A line item as submitted at checkout, before the order assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRow {
    pub name: String,
    pub quantity: u32,
    pub unit_price_minor_units: i64,
}

impl NewOrderRow {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price_minor_units: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price_minor_units,
        }
    }
}

/// A single line item of an order.
///
/// `is_cancelled` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    pub id: RowId,
    pub name: String,
    pub quantity: u32,
    pub unit_price_minor_units: i64,
    pub is_cancelled: bool,
}

impl OrderRow {
    pub fn from_new(id: RowId, row: NewOrderRow) -> Result<Self> {
        if row.name.trim().is_empty() {
            return Err(LifecycleError::validation(format!(
                "Row {} has an empty name",
                id
            )));
        }
        if row.quantity == 0 {
            return Err(LifecycleError::validation(format!(
                "Row {} must have a positive quantity",
                id
            )));
        }
        if row.unit_price_minor_units < 0 {
            return Err(LifecycleError::validation(format!(
                "Row {} has a negative unit price",
                id
            )));
        }
        Ok(Self {
            id,
            name: row.name,
            quantity: row.quantity,
            unit_price_minor_units: row.unit_price_minor_units,
            is_cancelled: false,
        })
    }

    /// `quantity * unit price` in the order's currency.
    pub fn total(&self, currency: &Currency) -> Result<Money> {
        Money::new(self.unit_price_minor_units, currency.clone())?.times(self.quantity)
    }

    pub fn cancel(&mut self) -> Result<()> {
        if self.is_cancelled {
            return Err(LifecycleError::invalid_transition(format!(
                "Row {} is already cancelled",
                self.id
            )));
        }
        self.is_cancelled = true;
        Ok(())
    }
}
