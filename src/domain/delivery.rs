use super::actions::{DeliveryAction, DeliveryActions};
use super::credit::{Credit, CreditKind};
use super::ids::{CreditId, DeliveryId, OrderId, RowId};
use super::money::Money;
use super::payment_type::CreditCapability;
use crate::error::{LifecycleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

impl CreditCapability {
    /// Actions a delivery with this capability exposes while still creditable.
    pub fn actions(self) -> DeliveryActions {
        match self {
            CreditCapability::Amount => BTreeSet::from([DeliveryAction::CanCreditAmount]),
            CreditCapability::Rows => BTreeSet::from([
                DeliveryAction::CanCreditNewRow,
                DeliveryAction::CanCreditOrderRows,
            ]),
        }
    }
}

/// Settlement state of a delivery as reported by the payment network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementStatus {
    Pending,
    Settled,
    Failed,
}

/// A fulfillment of a subset of an order's rows.
///
/// The credited amount is always derived from `credits`, so it can never
/// drift from the recorded reversals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: DeliveryId,
    pub order_id: OrderId,
    pub row_ids: BTreeSet<RowId>,
    pub delivery_amount: Money,
    pub credits: Vec<Credit>,
    /// Never set by the engine; `None` until something outside reports one.
    pub status: Option<SettlementStatus>,
    pub capability: CreditCapability,
}

impl Delivery {
    pub fn new(
        id: DeliveryId,
        order_id: OrderId,
        row_ids: BTreeSet<RowId>,
        delivery_amount: Money,
        capability: CreditCapability,
    ) -> Self {
        Self {
            id,
            order_id,
            row_ids,
            delivery_amount,
            credits: Vec::new(),
            status: None,
            capability,
        }
    }

    pub fn credited_amount(&self) -> Result<Money> {
        Money::sum(
            self.delivery_amount.currency(),
            self.credits.iter().map(|c| &c.amount),
        )
    }

    /// What can still be credited on this delivery.
    pub fn remaining(&self) -> Result<Money> {
        self.delivery_amount.checked_sub(&self.credited_amount()?)
    }

    pub fn is_fully_credited(&self) -> Result<bool> {
        Ok(self.remaining()?.is_zero())
    }

    /// Actions available while the owning order still allows crediting.
    pub fn available_actions(&self) -> Result<DeliveryActions> {
        if self.is_fully_credited()? {
            Ok(DeliveryActions::new())
        } else {
            Ok(self.capability.actions())
        }
    }

    /// Credits an arbitrary amount (direct-bank style deliveries).
    pub fn credit_amount(&mut self, amount: Money) -> Result<&Credit> {
        self.require_capability(CreditCapability::Amount, "credit an amount")?;
        self.record_credit(amount, CreditKind::Amount)
    }

    /// Credits an ad-hoc row (invoice style deliveries).
    pub fn credit_new_row(&mut self, name: &str, amount: Money) -> Result<&Credit> {
        self.require_capability(CreditCapability::Rows, "credit a new row")?;
        if name.trim().is_empty() {
            return Err(LifecycleError::validation("Credit row name must not be empty"));
        }
        self.record_credit(
            amount,
            CreditKind::NewRow {
                name: name.to_string(),
            },
        )
    }

    /// Credits everything that remains on the delivery's rows.
    pub fn credit_order_rows(&mut self) -> Result<&Credit> {
        self.require_capability(CreditCapability::Rows, "credit order rows")?;
        let remaining = self.remaining()?;
        if remaining.is_zero() {
            return Err(LifecycleError::invalid_transition(format!(
                "Delivery {} is already fully credited",
                self.id
            )));
        }
        self.record_credit(remaining, CreditKind::OrderRows)
    }

    fn require_capability(&self, needed: CreditCapability, what: &str) -> Result<()> {
        if self.capability == needed {
            Ok(())
        } else {
            Err(LifecycleError::invalid_transition(format!(
                "Delivery {} cannot {}",
                self.id, what
            )))
        }
    }

    fn record_credit(&mut self, amount: Money, kind: CreditKind) -> Result<&Credit> {
        let remaining = self.remaining()?;
        if remaining.is_zero() {
            return Err(LifecycleError::OverCredit {
                requested: amount,
                remaining,
            });
        }
        if amount.is_zero() {
            return Err(LifecycleError::validation("Credit amount must be positive"));
        }
        if amount.currency() != self.delivery_amount.currency() {
            return Err(LifecycleError::validation(format!(
                "Credit currency {} does not match delivery currency {}",
                amount.currency(),
                self.delivery_amount.currency()
            )));
        }
        if amount.minor_units() > remaining.minor_units() {
            return Err(LifecycleError::OverCredit {
                requested: amount,
                remaining,
            });
        }

        let id = CreditId(self.credits.len() as u32 + 1);
        self.credits.push(Credit {
            id,
            delivery_id: self.id,
            amount,
            kind,
        });
        self.credits
            .last()
            .ok_or_else(|| LifecycleError::InternalError("credit was not recorded".into()))
    }
}
