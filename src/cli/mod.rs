use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

mod commerce;
mod traffic;

pub use commerce::{OrdersArgs, SalesArgs, WindowArgs};
pub use traffic::{AnalyticsArgs, RealtimeArgs, Section};

use crate::config::Settings;
use crate::types::{Result, StorePulseError};

/// Store sales and traffic dashboard
#[derive(Parser)]
#[command(name = "storepulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Use deterministic demo data generated from this seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// JSON order export for the commerce source
    #[arg(long, global = true, value_name = "PATH")]
    orders_file: Option<PathBuf>,

    /// JSON traffic export for the analytics source
    #[arg(long, global = true, value_name = "PATH")]
    traffic_file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sales KPIs, daily revenue and top products
    Sales(SalesArgs),

    /// Paginated order listing
    Orders(OrdersArgs),

    /// Traffic overview, timeseries, acquisition, geography and pages
    Analytics(AnalyticsArgs),

    /// Users active in the last 30 minutes
    Realtime(RealtimeArgs),
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let settings =
            Settings::from_env()?.with_overrides(self.seed, self.orders_file, self.traffic_file);
        let dashboard = Arc::new(settings.dashboard(Utc::now())?);

        match self.command {
            Commands::Sales(args) => args.run(&dashboard, self.json).await?,
            Commands::Orders(args) => args.run(&dashboard, self.json).await?,
            Commands::Analytics(args) => args.run(&dashboard, self.json).await?,
            Commands::Realtime(args) => args.run(dashboard, self.json).await?,
        }
        Ok(())
    }
}

/// Pretty-print `value` as JSON on stdout
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| StorePulseError::Parse(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Join rendered lines, each ending in a newline
fn lines(rows: Vec<String>) -> String {
    let mut out = rows.join("\n");
    out.push('\n');
    out
}
