//! LP Risk Monitor CLI
//!
//! Command-line interface for evaluating concentrated-liquidity positions.

use clap::{Parser, Subcommand};
use lp_risk_monitor::reader::GraphReader;
use lp_risk_monitor::{Config, MonitorEngine, PortfolioSnapshot, PositionReport, Result};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "lp-monitor")]
#[command(about = "Concentrated-liquidity position risk monitor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate all configured positions and print the portfolio report
    Check,

    /// Evaluate a single position by id
    Position {
        /// Position id (NFT token id)
        #[arg(short, long)]
        id: String,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Check => {
            let reader = GraphReader::from_config(&config)?;
            let engine = MonitorEngine::new(reader, config.read_timeout());
            let snapshot = engine.evaluate_all(&config.positions).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_portfolio(&snapshot);
            }
        }
        Commands::Position { id } => {
            let reader = GraphReader::from_config(&config)?;
            let engine = MonitorEngine::new(reader, config.read_timeout());
            let report = engine.evaluate_single(&id).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_position(&report);
            }
        }
        Commands::Config => {
            // Endpoint URLs embed the subgraph API key; never print it.
            let mut display = config;
            display.subgraphs = display.subgraphs.redacted();
            println!("{}", serde_json::to_string_pretty(&display)?);
        }
    }

    Ok(())
}

fn print_portfolio(snapshot: &PortfolioSnapshot) {
    println!(
        "Portfolio: {} positions ({} evaluated, {} failed)",
        snapshot.total_positions,
        snapshot.evaluable,
        snapshot.errors.len()
    );
    println!(
        "Overall risk: {}  avg urgency: {:.1}  out of range: {:.0}%",
        snapshot.overall_risk.name(),
        snapshot.avg_urgency,
        snapshot.out_of_range_ratio * 100.0
    );
    let d = &snapshot.risk_distribution;
    println!(
        "Distribution: {} critical / {} high / {} medium / {} low",
        d.critical, d.high, d.medium, d.low
    );
    println!();
    for report in &snapshot.positions {
        print_position(report);
        println!();
    }
    for failure in &snapshot.errors {
        println!("position {}: ERROR {}", failure.position_id, failure.error);
    }
}

fn print_position(report: &PositionReport) {
    println!("position {} [{}]", report.position_id, report.pair);
    println!("  holdings: {} / {}", report.amount0, report.amount1);
    match (&report.uncollected_fees0, &report.uncollected_fees1) {
        (Some(fees0), Some(fees1)) => println!("  fees owed: {fees0} / {fees1}"),
        _ => println!("  fees owed: unavailable"),
    }
    let range = match report.edge_distance_percent {
        Some(pct) => format!("in range, {pct:.1}% from edge"),
        None => "OUT OF RANGE".to_string(),
    };
    println!("  status: {range}");
    println!(
        "  risk: {} (urgency {}) concentration {}",
        report.risk_level.name(),
        report.urgency_score,
        report.concentration.name()
    );
}
