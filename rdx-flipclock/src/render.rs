//! The rendering boundary.
//!
//! The core never touches presentation. It reports per-slot state through the
//! [`Renderer`] capability and the style layer decides how a transition looks.

use crate::adapter::StyleSheet;
use crate::common::Symbol;
use colored::Colorize;
use std::io::Write;
use std::sync::Mutex;

/// What one display slot currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotView {
    /// The committed symbol, `None` for a slot that has never shown one.
    pub current: Option<Symbol>,
    /// The symbol being transitioned to, if any.
    pub pending: Option<Symbol>,
    /// Whether the slot is visibly mid-transition.
    pub transitioning: bool,
}

impl SlotView {
    /// The symbol a viewer should read: the pending one while transitioning.
    pub fn visible(&self) -> Option<Symbol> {
        if self.transitioning {
            self.pending.or(self.current)
        } else {
            self.current
        }
    }
}

/// Receives display updates from the core. Indices are display positions,
/// `0` being the leftmost slot.
pub trait Renderer: Send + Sync {
    /// A single slot changed.
    fn set_slot_display(&self, index: usize, view: SlotView);

    /// The number of slots changed. Every slot is re-sent afterwards.
    fn set_slot_count(&self, _count: usize) {}

    /// Visual style properties changed.
    fn apply_style(&self, _style: &StyleSheet) {}
}

/// Discards every update. Useful when the display is read back through
/// `FlipClockEngine::display` instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn set_slot_display(&self, _index: usize, _view: SlotView) {}
}

/// Draws the clock on a single, continuously rewritten terminal line.
///
/// Transitioning slots are highlighted while they flip.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    slots: Mutex<Vec<SlotView>>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn redraw(&self, slots: &[SlotView]) {
        let mut line = String::from("\r\x1b[2K");
        for view in slots {
            let symbol = view.visible().unwrap_or(' ').to_string();
            let styled = if view.transitioning {
                symbol.cyan().bold().to_string()
            } else {
                symbol.bold().to_string()
            };
            line.push_str(&styled);
        }
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(line.as_bytes()).ok();
        stdout.flush().ok();
    }
}

impl Renderer for TerminalRenderer {
    fn set_slot_display(&self, index: usize, view: SlotView) {
        let Ok(mut slots) = self.slots.lock() else {
            return;
        };
        if index >= slots.len() {
            slots.resize(index + 1, SlotView::default());
        }
        slots[index] = view;
        self.redraw(&slots);
    }

    fn set_slot_count(&self, count: usize) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.resize(count, SlotView::default());
        }
    }

    fn apply_style(&self, style: &StyleSheet) {
        tracing::debug!(?style, "Style updated.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_symbol_prefers_pending_only_while_transitioning() {
        let staged = SlotView {
            current: Some('1'),
            pending: Some('2'),
            transitioning: false,
        };
        assert_eq!(staged.visible(), Some('1'));

        let flipping = SlotView {
            transitioning: true,
            ..staged
        };
        assert_eq!(flipping.visible(), Some('2'));
        assert_eq!(SlotView::default().visible(), None);
    }

    #[test]
    fn terminal_renderer_tracks_slot_count() {
        let renderer = TerminalRenderer::new();
        renderer.set_slot_count(3);
        renderer.set_slot_display(1, SlotView { current: Some(':'), ..SlotView::default() });
        renderer.set_slot_count(2);
        let slots = renderer.slots.lock().unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].current, Some(':'));
    }
}
