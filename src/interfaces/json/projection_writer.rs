use crate::domain::projection::OrderProjection;
use crate::error::Result;
use std::io::Write;

/// Writes order projections as JSON Lines, one order per line.
pub struct ProjectionWriter<W: Write> {
    writer: W,
}

impl<W: Write> ProjectionWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_orders(&mut self, orders: impl IntoIterator<Item = OrderProjection>) -> Result<()> {
        for order in orders {
            serde_json::to_writer(&mut self.writer, &order)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
