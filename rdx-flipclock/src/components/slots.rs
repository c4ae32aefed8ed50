//! The dynamically sized collection of display slots.
//!
//! Slots are stored least-significant first: storage position `0` is the
//! rightmost slot on screen. Growing and shrinking happen at the storage tail,
//! which is the leftmost end of the display, so the seconds and minutes keep
//! their state when only the leading hour digit appears or disappears.

use crate::common::{SlotId, Symbol};
use crate::render::SlotView;
use slotmap::SlotMap;
use tokio::task::AbortHandle;

/// One visual position in the clock.
#[derive(Debug, Default)]
pub struct DisplaySlot {
    /// The committed, authoritative symbol.
    pub current: Option<Symbol>,
    /// The symbol an in-flight transition will commit.
    pub pending: Option<Symbol>,
    /// Set once the transition's stagger delay has elapsed.
    pub transitioning: bool,
    pub(crate) transition: Option<AbortHandle>,
}

impl DisplaySlot {
    /// The symbol this slot is showing or about to show.
    pub fn effective(&self) -> Option<Symbol> {
        self.pending.or(self.current)
    }

    /// Whether a transition is staged or running.
    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn view(&self) -> SlotView {
        SlotView {
            current: self.current,
            pending: self.pending,
            transitioning: self.transitioning,
        }
    }

    /// Cancels the staged transition, if any, leaving the committed symbol.
    pub(crate) fn cancel_transition(&mut self) {
        if let Some(handle) = self.transition.take() {
            handle.abort();
        }
        self.pending = None;
        self.transitioning = false;
    }
}

/// An ordered pool of display slots sized to the current symbol sequence.
#[derive(Debug, Default)]
pub struct SlotPool {
    slots: SlotMap<SlotId, DisplaySlot>,
    /// Storage order, least significant (rightmost) first.
    order: Vec<SlotId>,
}

impl SlotPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Grows or shrinks the pool at its most significant end.
    ///
    /// New slots start empty. Removed slots have their in-flight transitions
    /// aborted. Returns `true` if the length changed.
    pub fn resize(&mut self, target_len: usize) -> bool {
        let current_len = self.order.len();
        if target_len > current_len {
            for _ in current_len..target_len {
                let id = self.slots.insert(DisplaySlot::default());
                self.order.push(id);
            }
        } else if target_len < current_len {
            for id in self.order.drain(target_len..) {
                if let Some(mut slot) = self.slots.remove(id) {
                    slot.cancel_transition();
                }
            }
        }
        target_len != current_len
    }

    /// The slot ids from right to left, i.e. least significant first.
    pub fn ids_right_to_left(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.order.iter().copied()
    }

    /// The slots in display order, left to right.
    pub fn slots(&self) -> impl Iterator<Item = &DisplaySlot> + '_ {
        self.order.iter().rev().filter_map(|id| self.slots.get(*id))
    }

    pub fn get(&self, id: SlotId) -> Option<&DisplaySlot> {
        self.slots.get(id)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut DisplaySlot> {
        self.slots.get_mut(id)
    }

    /// The display index (`0` = leftmost) of a live slot.
    pub fn display_index(&self, id: SlotId) -> Option<usize> {
        let position = self.order.iter().position(|candidate| *candidate == id)?;
        Some(self.order.len() - 1 - position)
    }

    /// Snapshot of every slot in display order.
    pub fn views(&self) -> Vec<SlotView> {
        self.slots().map(DisplaySlot::view).collect()
    }

    /// The committed symbols in display order, blanks as spaces.
    pub fn committed_text(&self) -> String {
        self.slots()
            .map(|slot| slot.current.unwrap_or(' '))
            .collect()
    }
}
