//! Shared CLI helpers used across multiple commands.

use clap::Args;
use rackline_config::{FileOrderStore, user_config_dir};
use rackline_core::{ChainKind, OrderRecord, SlotId};
use std::path::PathBuf;

/// Chain selection shared by `order` and `monitor`.
#[derive(Args, Clone, Debug)]
pub struct ChainArgs {
    /// Chain to operate on (source-outputs or sink-inputs)
    #[arg(short, long, global = true, default_value = "source-outputs")]
    pub chain: ChainKind,

    /// Directory holding order files (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,
}

impl ChainArgs {
    /// Directory order files are read from and written to.
    pub fn dir(&self) -> PathBuf {
        self.config_dir.clone().unwrap_or_else(user_config_dir)
    }

    /// Open the file-backed store of the selected chain.
    pub fn open_store(&self) -> FileOrderStore {
        FileOrderStore::in_dir(self.dir(), self.chain)
    }
}

/// Print `order` the way the panel shows it, applications row first.
pub fn print_order(order: &OrderRecord) {
    for (i, slot) in order.display_slots().into_iter().enumerate() {
        match slot {
            SlotId::Applications => println!("  {:>2}. {} (pinned)", i, slot.name()),
            SlotId::Plugin(id) => println!("  {:>2}. {:12} [{}]", i, id.name(), id),
        }
    }
}
