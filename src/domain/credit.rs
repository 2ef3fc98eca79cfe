use super::ids::{CreditId, DeliveryId};
use super::money::Money;
use serde::{Deserialize, Serialize};

/// Which delivery operation produced a credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CreditKind {
    Amount,
    OrderRows,
    NewRow { name: String },
}

/// A reversal of part or all of a delivery's amount. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    pub id: CreditId,
    pub delivery_id: DeliveryId,
    pub amount: Money,
    pub kind: CreditKind,
}
