//! Reconciles a target symbol sequence against the slots on screen.
//!
//! Each changed slot gets its own transition task: after its stagger delay the
//! slot is marked as transitioning, and after the transition duration the new
//! symbol is committed. Transitions are initiated right to left so the
//! least-significant symbols flip first.

use crate::common::{SlotId, Symbol};
use crate::components::slots::SlotPool;
use crate::events::ClockEvent;
use crate::render::{Renderer, SlotView};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, trace};

/// How a single reconciliation should stage its transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Start every transition at once instead of cascading.
    pub simultaneous: bool,
    /// Re-stage every slot even if it already shows the target symbol.
    pub force: bool,
    /// Length of one transition.
    pub duration: Duration,
}

/// A transition decided by a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedTransition {
    /// Display index of the slot, `0` being the leftmost.
    pub slot: usize,
    pub symbol: Symbol,
    /// Stagger delay before the transition starts.
    pub delay: Duration,
}

/// The per-slot delay increment for a cascade of transitions of `duration`.
pub fn stagger_step(duration: Duration, simultaneous: bool) -> Duration {
    if simultaneous {
        Duration::ZERO
    } else {
        Duration::from_millis(duration.as_millis() as u64 / 4)
    }
}

/// Owns the `SlotPool` and drives every slot transition.
#[derive(Clone)]
pub struct SymbolAnimator {
    pool: Arc<Mutex<SlotPool>>,
    renderer: Arc<dyn Renderer>,
    event_sender: broadcast::Sender<ClockEvent>,
}

impl SymbolAnimator {
    pub fn new(renderer: Arc<dyn Renderer>, event_sender: broadcast::Sender<ClockEvent>) -> Self {
        Self {
            pool: Arc::new(Mutex::new(SlotPool::new())),
            renderer,
            event_sender,
        }
    }

    /// Brings the display in line with `target`.
    ///
    /// Resizes the pool first if the lengths differ, then walks the slots from
    /// right to left and stages a transition for each one whose effective
    /// symbol differs from its target (or for every slot when `force` is set).
    /// Returns immediately; the transitions complete asynchronously.
    pub async fn reconcile(
        &self,
        target: &[Symbol],
        options: ReconcileOptions,
    ) -> Vec<StagedTransition> {
        let mut pool = self.pool.lock().await;

        let previous_len = pool.len();
        if pool.resize(target.len()) {
            debug!("Slot pool resized from {} to {}.", previous_len, pool.len());
            self.repaint(&pool);
            self.event_sender
                .send(ClockEvent::SlotPoolResized {
                    from: previous_len,
                    to: pool.len(),
                })
                .ok();
        }

        let step = stagger_step(options.duration, options.simultaneous);
        let ids: Vec<SlotId> = pool.ids_right_to_left().collect();
        let last_index = target.len().saturating_sub(1);
        let mut staged = Vec::new();
        let mut delay = Duration::ZERO;

        for (position, (id, symbol)) in ids.into_iter().zip(target.iter().rev()).enumerate() {
            let Some(slot) = pool.get_mut(id) else {
                continue;
            };
            if options.force || slot.effective() != Some(*symbol) {
                slot.cancel_transition();
                slot.pending = Some(*symbol);
                let task = tokio::spawn(self.clone().run_transition(
                    id,
                    *symbol,
                    delay,
                    options.duration,
                ));
                slot.transition = Some(task.abort_handle());
                staged.push(StagedTransition {
                    slot: last_index - position,
                    symbol: *symbol,
                    delay,
                });
            }
            delay = delay.saturating_add(step);
        }

        trace!("Staged {} transition(s).", staged.len());
        staged
    }

    /// Snapshot of every slot in display order.
    pub async fn views(&self) -> Vec<SlotView> {
        self.pool.lock().await.views()
    }

    /// The committed symbols in display order, blanks as spaces.
    pub async fn committed_text(&self) -> String {
        self.pool.lock().await.committed_text()
    }

    fn repaint(&self, pool: &SlotPool) {
        self.renderer.set_slot_count(pool.len());
        for (index, view) in pool.views().into_iter().enumerate() {
            self.renderer.set_slot_display(index, view);
        }
    }

    async fn run_transition(self, id: SlotId, symbol: Symbol, delay: Duration, duration: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        {
            let mut pool = self.pool.lock().await;
            let Some(slot) = pool.get_mut(id) else {
                return;
            };
            if slot.pending != Some(symbol) {
                return;
            }
            slot.transitioning = true;
            let view = slot.view();
            if let Some(index) = pool.display_index(id) {
                self.renderer.set_slot_display(index, view);
            }
        }

        tokio::time::sleep(duration).await;

        let mut pool = self.pool.lock().await;
        let Some(slot) = pool.get_mut(id) else {
            return;
        };
        if slot.pending != Some(symbol) {
            return;
        }
        slot.current = Some(symbol);
        slot.pending = None;
        slot.transitioning = false;
        slot.transition = None;
        let view = slot.view();
        if let Some(index) = pool.display_index(id) {
            self.renderer.set_slot_display(index, view);
            self.event_sender
                .send(ClockEvent::TransitionCommitted {
                    slot: index,
                    symbol,
                })
                .ok();
        }
    }
}
