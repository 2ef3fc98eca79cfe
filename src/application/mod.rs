//! Application layer containing the lifecycle orchestration.
//!
//! `OrderLifecycleEngine` is the entry point for every transition and query.
//! It serializes transitions per order with a registry of `tokio` mutexes and
//! publishes each result as a whole new copy of the aggregate, so reads never
//! need a lock. `polling` adds the bounded, backoff-driven read path used to
//! wait for effects that arrive asynchronously.

pub mod engine;
pub mod polling;
