//! Persisted order commands.
//!
//! Show, move, set and reset the order of one chain, and list where order
//! files live.

use super::common::{ChainArgs, print_order};
use clap::{Args, Subcommand};
use rackline_config::{OrderStore, chains_with_order_files, order_file_path_in};
use rackline_core::{ChainKind, OrderRecord, SlotId};
use rackline_panel::{MoveOutcome, ReorderController};
use std::sync::Arc;

#[derive(Args)]
pub struct OrderArgs {
    #[command(flatten)]
    chain: ChainArgs,

    #[command(subcommand)]
    command: OrderCommand,
}

#[derive(Subcommand)]
enum OrderCommand {
    /// Show the current order
    Show,

    /// Move a plugin one position up
    Up {
        /// Plugin name (e.g. "reverb")
        plugin: SlotId,
    },

    /// Move a plugin one position down
    Down {
        /// Plugin name (e.g. "limiter")
        plugin: SlotId,
    },

    /// Replace the whole order (every plugin exactly once)
    Set {
        /// Plugins in the new order
        #[arg(required = true, num_args = 1..)]
        plugins: Vec<String>,
    },

    /// Restore the default order
    Reset,

    /// Show order file locations
    Paths,
}

pub fn run(args: OrderArgs) -> anyhow::Result<()> {
    match args.command {
        OrderCommand::Show => show_order(&args.chain),
        OrderCommand::Up { plugin } => move_plugin(&args.chain, plugin, true),
        OrderCommand::Down { plugin } => move_plugin(&args.chain, plugin, false),
        OrderCommand::Set { plugins } => set_order(&args.chain, &plugins),
        OrderCommand::Reset => reset_order(&args.chain),
        OrderCommand::Paths => show_paths(&args.chain),
    }
}

fn show_order(chain: &ChainArgs) -> anyhow::Result<()> {
    let store = chain.open_store();
    let order = match store.get_order() {
        Ok(order) => order,
        Err(err) => {
            println!("Warning: {err}; showing the default order");
            OrderRecord::default()
        }
    };

    println!("Chain: {} ({})", chain.chain.label(), chain.chain);
    print_order(&order);
    Ok(())
}

fn move_plugin(chain: &ChainArgs, slot: SlotId, up: bool) -> anyhow::Result<()> {
    let store: Arc<dyn OrderStore> = Arc::new(chain.open_store());
    let controller = ReorderController::new(Arc::clone(&store));

    let outcome = if up {
        controller.move_up(slot)?
    } else {
        controller.move_down(slot)?
    };

    match outcome {
        MoveOutcome::Moved { from, to } => {
            println!("Moved {} from position {} to {}", slot.name(), from + 1, to + 1);
        }
        MoveOutcome::Unchanged if slot.is_pinned() => {
            println!("{} is pinned and cannot be moved", slot.name());
        }
        MoveOutcome::Unchanged => {
            let edge = if up { "first" } else { "last" };
            println!("{} is already {edge}; order unchanged", slot.name());
        }
    }

    print_order(&store.order_or_default());
    Ok(())
}

fn set_order(chain: &ChainArgs, plugins: &[String]) -> anyhow::Result<()> {
    let order = OrderRecord::parse(plugins)?;
    let store = chain.open_store();
    store.set_order(order.clone())?;

    println!("Order of {} set to: {order}", chain.chain);
    print_order(&order);
    Ok(())
}

fn reset_order(chain: &ChainArgs) -> anyhow::Result<()> {
    let store: Arc<dyn OrderStore> = Arc::new(chain.open_store());
    let written = ReorderController::new(Arc::clone(&store)).reset_order()?;

    if written {
        println!("Order of {} reset to default", chain.chain);
    } else {
        println!("Order of {} is already the default", chain.chain);
    }
    print_order(&OrderRecord::default());
    Ok(())
}

fn show_paths(chain: &ChainArgs) -> anyhow::Result<()> {
    let dir = chain.dir();
    println!("Config directory: {}", dir.display());
    println!();

    let saved = chains_with_order_files(&dir);
    for &kind in ChainKind::all() {
        let marker = if saved.contains(&kind) {
            ""
        } else {
            " (not saved yet)"
        };
        println!(
            "  {:15} {}{marker}",
            kind.key(),
            order_file_path_in(&dir, kind).display()
        );
    }
    Ok(())
}
