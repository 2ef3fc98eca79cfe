use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Transitions that may be invoked on an order as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderAction {
    CanDeliverOrder,
    CanCancelOrder,
    CanAddOrderRow,
    CanCancelOrderRow,
    CanUpdateOrderRow,
}

/// Transitions that may be invoked on a single order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderRowAction {
    CanCancelRow,
    CanUpdateRow,
}

/// Transitions that may be invoked on a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeliveryAction {
    CanCreditAmount,
    CanCreditNewRow,
    CanCreditOrderRows,
}

pub type OrderActions = BTreeSet<OrderAction>;
pub type OrderRowActions = BTreeSet<OrderRowAction>;
pub type DeliveryActions = BTreeSet<DeliveryAction>;

pub fn open_order_actions() -> OrderActions {
    BTreeSet::from([
        OrderAction::CanDeliverOrder,
        OrderAction::CanCancelOrder,
        OrderAction::CanAddOrderRow,
        OrderAction::CanCancelOrderRow,
        OrderAction::CanUpdateOrderRow,
    ])
}

pub fn open_row_actions() -> OrderRowActions {
    BTreeSet::from([OrderRowAction::CanCancelRow, OrderRowAction::CanUpdateRow])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_match_api_vocabulary() {
        let json = serde_json::to_string(&open_row_actions()).unwrap();
        assert_eq!(json, r#"["CanCancelRow","CanUpdateRow"]"#);

        let json = serde_json::to_string(&DeliveryAction::CanCreditOrderRows).unwrap();
        assert_eq!(json, r#""CanCreditOrderRows""#);
    }

    #[test]
    fn test_open_order_actions() {
        assert_eq!(open_order_actions().len(), 5);
    }
}
