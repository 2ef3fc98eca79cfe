use super::ids::{DeliveryId, RowId};
use super::money::Money;
use super::order::Order;
use crate::error::Result;

/// A transition requested against an existing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderCommand {
    /// Deliver the listed rows, or every outstanding row when `None`.
    Deliver { rows: Option<Vec<RowId>> },
    CancelOrder,
    CreditAmount { delivery: DeliveryId, amount: Money },
    CreditOrderRows { delivery: DeliveryId },
    CreditNewRow {
        delivery: DeliveryId,
        name: String,
        amount: Money,
    },
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::Deliver { .. } => "deliver",
            OrderCommand::CancelOrder => "cancel_order",
            OrderCommand::CreditAmount { .. } => "credit_amount",
            OrderCommand::CreditOrderRows { .. } => "credit_order_rows",
            OrderCommand::CreditNewRow { .. } => "credit_new_row",
        }
    }

    /// Applies the command to `order` in place.
    pub fn apply(&self, order: &mut Order) -> Result<()> {
        match self {
            OrderCommand::Deliver { rows: Some(rows) } => order.deliver(rows).map(|_| ()),
            OrderCommand::Deliver { rows: None } => order.deliver_all().map(|_| ()),
            OrderCommand::CancelOrder => order.cancel(),
            OrderCommand::CreditAmount { delivery, amount } => order
                .credit_amount(*delivery, amount.clone())
                .map(|_| ()),
            OrderCommand::CreditOrderRows { delivery } => {
                order.credit_order_rows(*delivery).map(|_| ())
            }
            OrderCommand::CreditNewRow {
                delivery,
                name,
                amount,
            } => order
                .credit_new_row(*delivery, name, amount.clone())
                .map(|_| ()),
        }
    }
}
