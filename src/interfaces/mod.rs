//! Outer adapters. The binary reads CSV scripts and writes JSON Lines;
//! `checkout` drives the engine from code.

pub mod checkout;
pub mod csv;
pub mod json;
