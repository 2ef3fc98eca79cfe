//! Runtime configuration for the engine, its read path and the checkout driver.

use crate::domain::money::Currency;
use crate::domain::payment_type::CreditCapability;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a collection with nothing in it is reported in a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Vacancy {
    /// The field is `null`: the collection does not apply in this state.
    #[default]
    Absent,
    /// The field is `[]`: the collection applies but holds nothing.
    Empty,
}

/// Vacancy of the row collection once every row has been delivered, chosen
/// per credit family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsumedRows {
    /// Card, direct bank and Swish orders.
    pub amount_credit: Vacancy,
    /// Invoice, payment plan and account credit orders.
    pub row_credit: Vacancy,
}

impl ConsumedRows {
    pub fn uniform(vacancy: Vacancy) -> Self {
        Self {
            amount_credit: vacancy,
            row_credit: vacancy,
        }
    }

    pub fn for_capability(&self, capability: CreditCapability) -> Vacancy {
        match capability {
            CreditCapability::Amount => self.amount_credit,
            CreditCapability::Rows => self.row_credit,
        }
    }
}

/// Controls the shape of vacant collections in order projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectionPolicy {
    pub consumed_rows: ConsumedRows,
    /// Delivery collection before the first delivery.
    pub missing_deliveries: Vacancy,
}

/// Bounded polling with exponential backoff for effects that land
/// asynchronously (payment webhooks and the like).
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Maximum number of reads.
    pub max_attempts: u32,
    /// Delay before the second read.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Growth factor applied to the delay after each read.
    pub multiplier: f64,
    /// Overall budget; polling stops once it is spent.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
            multiplier: 2.0,
            timeout: Duration::from_secs(15),
        }
    }
}

impl PollConfig {
    /// Short delays for in-process settlement and tests.
    pub fn fast() -> Self {
        Self {
            max_attempts: 20,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
            timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub projection: ProjectionPolicy,
    pub poll: PollConfig,
}

/// Customer details and settlement timing used by the checkout driver.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub currency: Currency,
    pub customer_email: String,
    pub anonymous_email: String,
    /// Delay before a settle-on-checkout payment reports back.
    pub settlement_delay: Duration,
}

impl CheckoutConfig {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            customer_email: "customer@example.com".to_string(),
            anonymous_email: "aaa@bbb.ccc".to_string(),
            settlement_delay: Duration::ZERO,
        }
    }
}
