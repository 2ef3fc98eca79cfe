use super::command_reader::{CommandRecord, CommandType};
use crate::application::engine::OrderLifecycleEngine;
use crate::domain::command::OrderCommand;
use crate::domain::ids::{DeliveryId, OrderId, RowId};
use crate::domain::money::{Currency, Money};
use crate::domain::order::NewOrder;
use crate::domain::order_row::NewOrderRow;
use crate::domain::projection::OrderProjection;
use crate::error::{LifecycleError, Result};
use std::collections::HashMap;

/// Customer details applied to every order a script places.
#[derive(Debug, Clone)]
pub struct ScriptDefaults {
    pub currency: Currency,
    pub email_address: String,
    pub is_company: bool,
}

/// Replays command records against an engine.
///
/// `row` records collect into a per-order draft until the matching `place`
/// record turns the draft into an order.
pub struct CommandScript<'a> {
    engine: &'a OrderLifecycleEngine,
    defaults: ScriptDefaults,
    drafts: HashMap<OrderId, Vec<NewOrderRow>>,
}

impl<'a> CommandScript<'a> {
    pub fn new(engine: &'a OrderLifecycleEngine, defaults: ScriptDefaults) -> Self {
        Self {
            engine,
            defaults,
            drafts: HashMap::new(),
        }
    }

    /// Executes one record. Returns the order's new projection for anything
    /// other than a `row` record.
    pub async fn execute(&mut self, record: CommandRecord) -> Result<Option<OrderProjection>> {
        let order_id = OrderId(record.order);

        let command = match record.r#type {
            CommandType::Row => {
                let row = self.draft_row(&record)?;
                self.drafts.entry(order_id).or_default().push(row);
                return Ok(None);
            }
            CommandType::Place => {
                let payment_type = record
                    .payment
                    .ok_or_else(|| missing("payment", &record))?;
                let rows = self.drafts.get(&order_id).cloned().unwrap_or_default();
                let new_order = NewOrder {
                    rows,
                    currency: self.defaults.currency.clone(),
                    is_company: self.defaults.is_company,
                    email_address: self.defaults.email_address.clone(),
                    payment_type,
                };
                // The draft survives a rejected placement.
                let placed = self.engine.create_order(order_id, new_order).await?;
                self.drafts.remove(&order_id);
                return Ok(Some(placed));
            }
            CommandType::Deliver => OrderCommand::Deliver {
                rows: record.rows.as_deref().map(parse_row_ids).transpose()?,
            },
            CommandType::Cancel => OrderCommand::CancelOrder,
            CommandType::CreditAmount => OrderCommand::CreditAmount {
                delivery: delivery_id(&record)?,
                amount: self.amount(&record)?,
            },
            CommandType::CreditRows => OrderCommand::CreditOrderRows {
                delivery: delivery_id(&record)?,
            },
            CommandType::CreditNewRow => OrderCommand::CreditNewRow {
                delivery: delivery_id(&record)?,
                name: record.name.clone().ok_or_else(|| missing("name", &record))?,
                amount: self.amount(&record)?,
            },
        };

        self.engine
            .apply_transition(order_id, command)
            .await
            .map(Some)
    }

    /// Orders with drafted rows that no `place` record has turned into an
    /// order yet, in id order.
    pub fn unplaced(&self) -> Vec<OrderId> {
        let mut ids: Vec<OrderId> = self.drafts.keys().copied().collect();
        ids.sort();
        ids
    }

    fn draft_row(&self, record: &CommandRecord) -> Result<NewOrderRow> {
        let name = record.name.clone().ok_or_else(|| missing("name", record))?;
        let quantity = record.quantity.ok_or_else(|| missing("quantity", record))?;
        let unit_price = self.amount(record)?;
        Ok(NewOrderRow::new(name, quantity, unit_price.minor_units()))
    }

    fn amount(&self, record: &CommandRecord) -> Result<Money> {
        let amount = record.amount.ok_or_else(|| missing("amount", record))?;
        Money::from_major(amount, self.defaults.currency.clone())
    }
}

fn delivery_id(record: &CommandRecord) -> Result<DeliveryId> {
    record
        .delivery
        .map(DeliveryId)
        .ok_or_else(|| missing("delivery", record))
}

fn missing(column: &str, record: &CommandRecord) -> LifecycleError {
    LifecycleError::validation(format!(
        "{:?} command for order {} is missing '{}'",
        record.r#type, record.order, column
    ))
}

fn parse_row_ids(raw: &str) -> Result<Vec<RowId>> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .map(RowId)
                .map_err(|_| LifecycleError::validation(format!("Invalid row id '{}'", part)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::order::OrderStatus;
    use crate::domain::payment_type::PaymentType;
    use crate::infrastructure::in_memory::InMemoryOrderStore;
    use rust_decimal_macros::dec;

    fn record(r#type: CommandType, order: u64) -> CommandRecord {
        CommandRecord {
            r#type,
            order,
            delivery: None,
            rows: None,
            name: None,
            quantity: None,
            amount: None,
            payment: None,
        }
    }

    fn defaults() -> ScriptDefaults {
        ScriptDefaults {
            currency: Currency::new("SEK").unwrap(),
            email_address: "test@example.com".to_string(),
            is_company: false,
        }
    }

    #[test]
    fn test_parse_row_ids() {
        assert_eq!(parse_row_ids("1; 3").unwrap(), vec![RowId(1), RowId(3)]);
        assert!(matches!(
            parse_row_ids("1;x"),
            Err(LifecycleError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_script_places_and_credits() {
        let engine =
            OrderLifecycleEngine::new(Box::new(InMemoryOrderStore::new()), EngineConfig::default());
        let mut script = CommandScript::new(&engine, defaults());

        let mut row = record(CommandType::Row, 1);
        row.name = Some("Sneakers".to_string());
        row.quantity = Some(2);
        row.amount = Some(dec!(50.00));
        assert_eq!(script.execute(row).await.unwrap(), None);

        let mut place = record(CommandType::Place, 1);
        place.payment = Some(PaymentType::PaymentPlan);
        let placed = script.execute(place).await.unwrap().unwrap();
        assert_eq!(placed.order_amount.minor_units(), 10000);

        script
            .execute(record(CommandType::Deliver, 1))
            .await
            .unwrap();

        let mut credit = record(CommandType::CreditRows, 1);
        credit.delivery = Some(1);
        let credited = script.execute(credit).await.unwrap().unwrap();
        assert_eq!(credited.order_status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_rejected_place_keeps_draft() {
        let engine =
            OrderLifecycleEngine::new(Box::new(InMemoryOrderStore::new()), EngineConfig::default());
        let mut script = CommandScript::new(&engine, defaults());

        let mut row = record(CommandType::Row, 1);
        row.name = Some("Sneakers".to_string());
        row.quantity = Some(1);
        row.amount = Some(dec!(100.00));
        script.execute(row.clone()).await.unwrap();

        // Email without '@' makes every placement fail
        let mut broken = CommandScript::new(
            &engine,
            ScriptDefaults {
                email_address: "nobody".to_string(),
                ..defaults()
            },
        );
        broken.execute(row).await.unwrap();
        let mut place = record(CommandType::Place, 1);
        place.payment = Some(PaymentType::Invoice);
        assert!(matches!(
            broken.execute(place.clone()).await,
            Err(LifecycleError::ValidationError(_))
        ));
        assert_eq!(broken.unplaced(), vec![OrderId(1)]);
        assert!(engine.get_order(OrderId(1)).await.unwrap_err().is_not_found());

        assert_eq!(script.unplaced(), vec![OrderId(1)]);
        script.execute(place.clone()).await.unwrap();
        assert!(script.unplaced().is_empty());

        // A duplicate placement leaves the new draft in place
        let mut again = record(CommandType::Row, 1);
        again.name = Some("Socks".to_string());
        again.quantity = Some(2);
        again.amount = Some(dec!(5.00));
        script.execute(again).await.unwrap();
        assert!(matches!(
            script.execute(place).await,
            Err(LifecycleError::ValidationError(_))
        ));
        assert_eq!(script.unplaced(), vec![OrderId(1)]);
    }

    #[tokio::test]
    async fn test_place_without_rows_is_rejected() {
        let engine =
            OrderLifecycleEngine::new(Box::new(InMemoryOrderStore::new()), EngineConfig::default());
        let mut script = CommandScript::new(&engine, defaults());

        let mut place = record(CommandType::Place, 4);
        place.payment = Some(PaymentType::Card);
        assert!(matches!(
            script.execute(place).await,
            Err(LifecycleError::ValidationError(_))
        ));

        let credit = record(CommandType::CreditAmount, 4);
        assert!(matches!(
            script.execute(credit).await,
            Err(LifecycleError::ValidationError(_))
        ));
    }
}
