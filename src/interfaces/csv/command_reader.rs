use crate::domain::payment_type::PaymentType;
use crate::error::{LifecycleError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    /// Adds a row to the draft of a not-yet-placed order.
    Row,
    /// Places the drafted order.
    Place,
    Deliver,
    Cancel,
    CreditAmount,
    CreditRows,
    CreditNewRow,
}

/// One line of a command script.
///
/// Columns: `type, order, delivery, rows, name, quantity, amount, payment`.
/// `rows` is a `;`-separated list of row ids; `amount` is in major units.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub r#type: CommandType,
    pub order: u64,
    #[serde(default)]
    pub delivery: Option<u32>,
    #[serde(default)]
    pub rows: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub payment: Option<PaymentType>,
}

/// Reads command records from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and accepting short records so
/// trailing empty columns may be left out.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes records, one `Result` per line.
    pub fn commands(self) -> impl Iterator<Item = Result<CommandRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LifecycleError::from))
    }
}
