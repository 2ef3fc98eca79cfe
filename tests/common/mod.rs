#![allow(dead_code)]

use payorder::application::engine::OrderLifecycleEngine;
use payorder::config::EngineConfig;
use payorder::domain::money::Currency;
use payorder::domain::order::NewOrder;
use payorder::domain::order_row::NewOrderRow;
use payorder::domain::payment_type::PaymentType;
use payorder::infrastructure::in_memory::InMemoryOrderStore;
use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 8] = [
    "type", "order", "delivery", "rows", "name", "quantity", "amount", "payment",
];

pub fn sek() -> Currency {
    Currency::new("SEK").unwrap()
}

pub fn engine() -> OrderLifecycleEngine {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> OrderLifecycleEngine {
    OrderLifecycleEngine::new(Box::new(InMemoryOrderStore::new()), config)
}

pub fn new_order(rows: Vec<NewOrderRow>, payment_type: PaymentType) -> NewOrder {
    NewOrder {
        rows,
        currency: sek(),
        is_company: false,
        email_address: "test@example.com".to_string(),
        payment_type,
    }
}

/// One row, quantity 1, priced at 100.00.
pub fn single_row_order(payment_type: PaymentType) -> NewOrder {
    new_order(vec![NewOrderRow::new("Sneakers", 1, 10_000)], payment_type)
}

/// Random rows; returns them together with their expected total in minor units.
pub fn random_rows<R: Rng>(rng: &mut R, max_rows: usize) -> (Vec<NewOrderRow>, i64) {
    let count = rng.gen_range(1..=max_rows);
    let rows: Vec<NewOrderRow> = (1..=count)
        .map(|i| {
            NewOrderRow::new(
                format!("Product {}", i),
                rng.gen_range(1..=10),
                rng.gen_range(0..=500_000),
            )
        })
        .collect();
    let total = rows
        .iter()
        .map(|row| row.quantity as i64 * row.unit_price_minor_units)
        .sum();
    (rows, total)
}

/// Writes a command script that places `orders` one-row payment plan orders
/// and delivers each of them.
pub fn generate_script(path: &Path, orders: u64) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;

    for order in 1..=orders {
        let id = order.to_string();
        let id = id.as_str();
        wtr.write_record(["row", id, "", "", "Sneakers", "1", "100.00", ""])?;
        wtr.write_record(["place", id, "", "", "", "", "", "PaymentPlan"])?;
        wtr.write_record(["deliver", id, "", "", "", "", "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}
