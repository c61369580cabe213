//! Plugin listing command.

use clap::Args;
use rackline_core::{OrderRecord, PluginId, SlotId};

#[derive(Args)]
pub struct PluginsArgs {
    /// Print only the plugin tokens, one per line
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: PluginsArgs) -> anyhow::Result<()> {
    if args.quiet {
        for id in PluginId::all() {
            println!("{id}");
        }
        return Ok(());
    }

    println!("Plugins:");
    println!("========");
    println!("  {:14} pinned at the top of every chain", SlotId::Applications.as_str());
    for &id in PluginId::all() {
        let channels: Vec<&str> = id.telemetry_channels().iter().map(|c| c.as_str()).collect();
        println!("  {:14} {:12} telemetry: {}", id.as_str(), id.name(), channels.join(", "));
    }
    println!();
    println!("Default order: {}", OrderRecord::default());
    Ok(())
}
