//! Domain model of the payment-order lifecycle: money, rows, deliveries,
//! credits, the `Order` aggregate and the projections read back from it.

pub mod actions;
pub mod command;
pub mod credit;
pub mod delivery;
pub mod ids;
pub mod money;
pub mod order;
pub mod order_row;
pub mod payment_type;
pub mod ports;
pub mod projection;
