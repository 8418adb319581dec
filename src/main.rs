use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use store::DataStore;

mod config;
mod loader;
mod schema;
mod store;
mod utils;
mod views;

#[derive(Parser)]
#[command(name = "storelens")]
#[command(version)]
#[command(about = "Derive analytics view-models from e-commerce CSV exports")]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the users CSV export (overrides config)
    #[arg(long)]
    users_csv: Option<PathBuf>,

    /// Path to the orders CSV export (overrides config)
    #[arg(long)]
    orders_csv: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Output all view-models in one JSON document (the default)
    Report,
    /// KPI summary (totals, completion/cancellation/return rates)
    Kpis,
    /// Per-month order counts broken down by status
    MonthlyOrders,
    /// User counts per traffic source, descending
    TrafficSources,
    /// User counts per country, descending, truncated
    TopCountries(TopCountriesArgs),
    /// Order counts per raw status with chart color tokens
    StatusBreakdown,
    /// Age-decade / gender cross-tabulation
    AgeGroups,
    /// Per-month user registration counts
    Registrations,
    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct TopCountriesArgs {
    /// Maximum number of countries to return
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    subcommand: ConfigSubcommands,
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Create default configuration file
    Init {
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
    /// Show current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key (users-csv, orders-csv, top-countries-limit, pretty)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Config supplies defaults; CLI flags win.
    let config = config::Config::load().unwrap_or(None).unwrap_or_default();
    let users_csv = cli
        .users_csv
        .unwrap_or_else(|| PathBuf::from(&config.data.users_csv));
    let orders_csv = cli
        .orders_csv
        .unwrap_or_else(|| PathBuf::from(&config.data.orders_csv));
    let pretty = cli.pretty || config.report.pretty;

    let store = DataStore::new(users_csv, orders_csv);

    let result = match cli.command {
        None | Some(Commands::Report) => {
            run_view(pretty, || {
                views::full_report(&store, config.report.top_countries_limit)
            })
        }
        Some(Commands::Kpis) => run_view(pretty, || {
            Ok(views::kpi_summary(&store.users()?, &store.orders()?))
        }),
        Some(Commands::MonthlyOrders) => {
            run_view(pretty, || Ok(views::monthly_orders(&store.orders()?)))
        }
        Some(Commands::TrafficSources) => {
            run_view(pretty, || Ok(views::traffic_sources(&store.users()?)))
        }
        Some(Commands::TopCountries(args)) => run_view(pretty, || {
            let limit = args.limit.unwrap_or(config.report.top_countries_limit);
            Ok(views::top_countries(&store.users()?, limit))
        }),
        Some(Commands::StatusBreakdown) => run_view(pretty, || {
            Ok(views::order_status_breakdown(&store.orders()?))
        }),
        Some(Commands::AgeGroups) => run_view(pretty, || Ok(views::age_groups(&store.users()?))),
        Some(Commands::Registrations) => {
            run_view(pretty, || Ok(views::monthly_registrations(&store.users()?)))
        }
        Some(Commands::Config(config_args)) => handle_config_subcommand(config_args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run_view<T: Serialize>(pretty: bool, compute: impl FnOnce() -> Result<T>) -> Result<()> {
    let view = compute()?;

    let json = if pretty {
        simd_json::to_string_pretty(&view)?
    } else {
        simd_json::to_string(&view)?
    };
    println!("{json}");

    Ok(())
}

fn handle_config_subcommand(config_args: ConfigArgs) -> Result<()> {
    match config_args.subcommand {
        ConfigSubcommands::Init { overwrite } => config::create_default_config(overwrite),
        ConfigSubcommands::Show => config::show_config(),
        ConfigSubcommands::Set { key, value } => config::set_config_value(&key, &value),
    }
}
