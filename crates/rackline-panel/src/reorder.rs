//! Adjacent-swap reordering on top of an [`OrderStore`].

use rackline_config::OrderStore;
use rackline_core::{ChainError, OrderRecord, SlotId};
use std::sync::Arc;

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The plugin moved from one order index to another and the new order was persisted.
    Moved {
        /// Index before the move.
        from: usize,
        /// Index after the move.
        to: usize,
    },
    /// Nothing to do: already at the boundary, or the pinned row.
    Unchanged,
}

impl MoveOutcome {
    /// Whether the order was written.
    pub fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// Moves plugins one position at a time.
///
/// Holds no order of its own: every move reads the current order from the
/// store, swaps two neighbours and writes it back. A store that cannot be read
/// is treated as holding the default order, so the next move also repairs it.
pub struct ReorderController {
    store: Arc<dyn OrderStore>,
}

impl ReorderController {
    /// Create a controller writing to `store`.
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Swap `slot` with its predecessor.
    ///
    /// # Errors
    ///
    /// [`ChainError::UnknownPlugin`] if `slot` is missing from the stored
    /// order, or whatever the store returns from `set_order`.
    pub fn move_up(&self, slot: SlotId) -> Result<MoveOutcome, ChainError> {
        self.shift(slot, Direction::Up)
    }

    /// Swap `slot` with its successor.
    ///
    /// # Errors
    ///
    /// Same as [`move_up`](Self::move_up).
    pub fn move_down(&self, slot: SlotId) -> Result<MoveOutcome, ChainError> {
        self.shift(slot, Direction::Down)
    }

    /// Write the default order if the stored one differs.
    ///
    /// Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Whatever the store returns from `set_order`.
    pub fn reset_order(&self) -> Result<bool, ChainError> {
        let default = OrderRecord::default();
        if self.store.get_order().is_ok_and(|order| order == default) {
            return Ok(false);
        }
        self.store.set_order(default)?;
        tracing::debug!("plugin order reset");
        Ok(true)
    }

    fn shift(&self, slot: SlotId, direction: Direction) -> Result<MoveOutcome, ChainError> {
        let Some(plugin) = slot.plugin() else {
            return Ok(MoveOutcome::Unchanged);
        };

        let order = self.store.order_or_default();
        let from = order
            .position(plugin)
            .ok_or_else(|| ChainError::UnknownPlugin(plugin.to_string()))?;

        let to = match direction {
            Direction::Up if from == 0 => return Ok(MoveOutcome::Unchanged),
            Direction::Up => from - 1,
            Direction::Down if from + 1 >= order.len() => return Ok(MoveOutcome::Unchanged),
            Direction::Down => from + 1,
        };

        let Some(next) = order.swapped(from, to) else {
            return Ok(MoveOutcome::Unchanged);
        };
        self.store.set_order(next)?;
        tracing::debug!(plugin = %plugin, from, to, "plugin moved");
        Ok(MoveOutcome::Moved { from, to })
    }
}
