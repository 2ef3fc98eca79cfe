use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payorder::application::engine::OrderLifecycleEngine;
use payorder::config::{ConsumedRows, EngineConfig, ProjectionPolicy, Vacancy};
use payorder::domain::money::Currency;
use payorder::domain::ports::OrderStoreBox;
use payorder::infrastructure::in_memory::InMemoryOrderStore;
use payorder::interfaces::csv::command_reader::CommandReader;
use payorder::interfaces::csv::command_script::{CommandScript, ScriptDefaults};
use payorder::interfaces::json::projection_writer::ProjectionWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input command script (CSV)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "PAYORDER_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Currency of every order the script places
    #[arg(long, env = "PAYORDER_CURRENCY", default_value = "SEK")]
    currency: String,

    /// Customer email of every order the script places
    #[arg(long, env = "PAYORDER_EMAIL", default_value = "customer@example.com")]
    email: String,

    /// Place orders as a company rather than a private person
    #[arg(long)]
    company: bool,

    /// How to report the row collection once every row is delivered
    #[arg(long, value_enum, default_value_t = Vacancy::Absent)]
    consumed_rows: Vacancy,

    /// Overrides --consumed-rows for invoice and payment plan orders
    #[arg(long, value_enum)]
    consumed_rows_row_credit: Option<Vacancy>,

    /// How to report the delivery collection before the first delivery
    #[arg(long, value_enum, default_value_t = Vacancy::Absent)]
    missing_deliveries: Vacancy,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the projections, so logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn open_store(db_path: Option<PathBuf>) -> Result<OrderStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = payorder::infrastructure::rocksdb::RocksDBStore::open(path)?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryOrderStore::new()))
        }
        None => Ok(Box::new(InMemoryOrderStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let currency = Currency::new(&cli.currency)?;
    let config = EngineConfig {
        projection: ProjectionPolicy {
            consumed_rows: ConsumedRows {
                amount_credit: cli.consumed_rows,
                row_credit: cli.consumed_rows_row_credit.unwrap_or(cli.consumed_rows),
            },
            missing_deliveries: cli.missing_deliveries,
        },
        ..EngineConfig::default()
    };
    let engine = OrderLifecycleEngine::new(open_store(cli.db_path)?, config);

    let mut script = CommandScript::new(
        &engine,
        ScriptDefaults {
            currency,
            email_address: cli.email,
            is_company: cli.company,
        },
    );

    // Replay the script; a failing command is reported and skipped
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for record in reader.commands() {
        match record {
            Ok(record) => {
                if let Err(e) = script.execute(record).await {
                    tracing::error!("Error processing command: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("Error reading command: {}", e);
            }
        }
    }

    for order_id in script.unplaced() {
        tracing::warn!(order_id = %order_id, "Drafted rows were never placed");
    }

    let orders = engine.all_orders().await?;

    let stdout = io::stdout();
    let mut writer = ProjectionWriter::new(stdout.lock());
    writer.write_orders(orders)?;

    Ok(())
}
