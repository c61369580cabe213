//! rackline CLI - inspect and reorder plugin chains, watch their meters.

mod commands;
mod meter_board;
mod simulated;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rackline")]
#[command(author, version, about = "Reorderable plugin chain manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the plugins and the telemetry each one emits
    Plugins(commands::plugins::PluginsArgs),

    /// Show or change the persisted plugin order
    Order(commands::order::OrderArgs),

    /// Run a chain against simulated plugins and print its meters
    Monitor(commands::monitor::MonitorArgs),
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Plugins(args) => commands::plugins::run(args),
        Commands::Order(args) => commands::order::run(args),
        Commands::Monitor(args) => commands::monitor::run(args),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
