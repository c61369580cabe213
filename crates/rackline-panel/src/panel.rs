//! The chain panel: slots, display order, reordering and telemetry in one place.

use rackline_config::{OrderStore, SubscriptionId};
use rackline_core::{ChainError, ChainKind, SlotId, sort_slots};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::chain_state::ChainState;
use crate::presentation::{Presentation, PresentationList};
use crate::reorder::{MoveOutcome, ReorderController};
use crate::runtime::PluginRuntime;
use crate::telemetry::TelemetryRouter;

/// What one [`ChainPanel::poll`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Whether the display order changed.
    pub resorted: bool,
    /// Telemetry samples delivered to the presentation.
    pub samples: usize,
}

/// One plugin chain as shown to the user.
///
/// Owns the presentation and drives it from the control thread: order
/// changes arrive as store notifications (which only set a flag) and are
/// applied on the next [`poll`](Self::poll); telemetry is drained on every
/// poll. Failures are logged and kept in [`last_error`](Self::last_error);
/// the panel itself stays usable.
pub struct ChainPanel<P: Presentation> {
    kind: ChainKind,
    state: ChainState,
    list: PresentationList,
    presentation: P,
    store: Arc<dyn OrderStore>,
    controller: ReorderController,
    router: TelemetryRouter,
    subscription: Option<SubscriptionId>,
    last_error: Option<ChainError>,
}

impl<P: Presentation> ChainPanel<P> {
    /// Build the panel for `kind`.
    ///
    /// Inserts one element per slot in the persisted order, subscribes to the
    /// store and links telemetry for every slot that has a runtime. A store
    /// that cannot be read shows the default order.
    pub fn new(
        kind: ChainKind,
        store: Arc<dyn OrderStore>,
        runtimes: &[Arc<dyn PluginRuntime>],
        mut presentation: P,
    ) -> Self {
        let state = ChainState::new(kind, runtimes);
        let order = store.order_or_default();

        let mut ids: Vec<SlotId> = state.iter().map(|slot| slot.id()).collect();
        sort_slots(&mut ids, order.as_slice());

        let mut list = PresentationList::new();
        for &id in &ids {
            list.insert(id);
            presentation.insert(id);
        }
        list.resort(order.as_slice());
        presentation.resort(&list.display_order());

        let flag = list.invalidation_flag();
        let subscription = store.subscribe(Box::new(move || {
            flag.store(true, Ordering::Release);
        }));

        let mut router = TelemetryRouter::new();
        for slot in state.iter() {
            if let Some(runtime) = slot.runtime() {
                router.link(slot.id(), &runtime);
            }
        }

        tracing::info!(
            chain = %kind,
            order = %order,
            links = router.link_count(),
            "chain panel ready"
        );

        Self {
            kind,
            state,
            list,
            presentation,
            controller: ReorderController::new(Arc::clone(&store)),
            store,
            router,
            subscription: Some(subscription),
            last_error: None,
        }
    }

    /// Move `slot` one position towards the top.
    ///
    /// Errors are logged and recorded; the outcome is then `Unchanged`.
    pub fn move_up(&mut self, slot: impl Into<SlotId>) -> MoveOutcome {
        let slot = slot.into();
        let result = self.controller.move_up(slot);
        self.settle_move(slot, result)
    }

    /// Move `slot` one position towards the bottom.
    pub fn move_down(&mut self, slot: impl Into<SlotId>) -> MoveOutcome {
        let slot = slot.into();
        let result = self.controller.move_down(slot);
        self.settle_move(slot, result)
    }

    /// Persist the default order. Returns whether the order changed.
    pub fn reset_order(&mut self) -> bool {
        match self.controller.reset_order() {
            Ok(written) => {
                self.last_error = None;
                if written {
                    self.list.invalidate();
                    self.refresh_order();
                }
                written
            }
            Err(err) => {
                self.record_error(err);
                false
            }
        }
    }

    /// Apply pending order changes and deliver pending telemetry.
    pub fn poll(&mut self) -> PollReport {
        let resorted = self.refresh_order();
        let samples = self.router.drain(&mut self.presentation);
        PollReport { resorted, samples }
    }

    /// Force a resort on the next [`poll`](Self::poll).
    pub fn invalidate(&self) {
        self.list.invalidate();
    }

    /// Return one element to its default display state.
    pub fn reset_slot(&mut self, slot: impl Into<SlotId>) {
        self.presentation.reset(slot.into());
    }

    /// Reset every plugin element. The applications row is left alone.
    pub fn reset(&mut self) {
        for slot in self.state.iter().filter(|slot| !slot.id().is_pinned()) {
            self.presentation.reset(slot.id());
        }
    }

    /// Current display order, applications row first.
    pub fn display_order(&self) -> Vec<SlotId> {
        self.list.display_order()
    }

    /// Chain shown by this panel.
    pub fn kind(&self) -> ChainKind {
        self.kind
    }

    /// Slot set of the chain.
    pub fn state(&self) -> &ChainState {
        &self.state
    }

    /// The presentation collaborator.
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// The most recent failed operation, cleared by the next success.
    pub fn last_error(&self) -> Option<&ChainError> {
        self.last_error.as_ref()
    }

    /// Whether [`teardown`](Self::teardown) has run.
    pub fn is_torn_down(&self) -> bool {
        self.subscription.is_none() && self.router.is_torn_down()
    }

    /// Unsubscribe from the store and close every telemetry link.
    ///
    /// Runs on drop as well; repeated calls do nothing.
    pub fn teardown(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.store.unsubscribe(id);
            self.router.teardown();
            tracing::debug!(chain = %self.kind, "chain panel torn down");
        }
    }

    fn settle_move(&mut self, slot: SlotId, result: Result<MoveOutcome, ChainError>) -> MoveOutcome {
        match result {
            Ok(outcome) => {
                self.last_error = None;
                // resort from the store now; the notification may never come
                // once the panel is torn down
                if outcome.moved() {
                    self.list.invalidate();
                    self.refresh_order();
                }
                outcome
            }
            Err(err) => {
                tracing::debug!(chain = %self.kind, slot = %slot, "move rejected");
                self.record_error(err);
                MoveOutcome::Unchanged
            }
        }
    }

    fn record_error(&mut self, err: ChainError) {
        if err.is_invariant_violation() {
            tracing::error!(chain = %self.kind, error = %err, "plugin order invariant broken");
        } else {
            tracing::warn!(chain = %self.kind, error = %err, "plugin order operation failed");
        }
        self.last_error = Some(err);
    }

    /// Resort if the store reported a change. Returns whether the display moved.
    fn refresh_order(&mut self) -> bool {
        if !self.list.is_dirty() {
            return false;
        }
        let order = self.store.order_or_default();
        let changed = self.list.refresh(order.as_slice()).unwrap_or(false);
        if changed {
            self.presentation.resort(&self.list.display_order());
        }
        changed
    }
}

impl<P: Presentation> Drop for ChainPanel<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<P: Presentation> std::fmt::Debug for ChainPanel<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainPanel")
            .field("kind", &self.kind)
            .field("order", &self.list.display_order())
            .field("router", &self.router)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
