use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment method family an order was paid with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    Invoice,
    PaymentPlan,
    AccountCredit,
    Card,
    DirectBank,
    Swish,
}

/// How deliveries of an order can be credited.
///
/// Direct-bank style payments are reversed by amount; invoice style payments
/// are reversed row by row (or with an ad-hoc credit row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreditCapability {
    Amount,
    Rows,
}

impl PaymentType {
    pub fn credit_capability(self) -> CreditCapability {
        match self {
            PaymentType::Card | PaymentType::DirectBank | PaymentType::Swish => {
                CreditCapability::Amount
            }
            PaymentType::Invoice | PaymentType::PaymentPlan | PaymentType::AccountCredit => {
                CreditCapability::Rows
            }
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_capability_by_family() {
        assert_eq!(
            PaymentType::DirectBank.credit_capability(),
            CreditCapability::Amount
        );
        assert_eq!(
            PaymentType::PaymentPlan.credit_capability(),
            CreditCapability::Rows
        );
    }

    #[test]
    fn test_payment_type_serialization() {
        let json = serde_json::to_string(&PaymentType::PaymentPlan).unwrap();
        assert_eq!(json, r#""PaymentPlan""#);
        assert_eq!(PaymentType::DirectBank.to_string(), "DirectBank");
    }
}
