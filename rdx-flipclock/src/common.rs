//! Contains common, primitive types and constants shared across the engine.
//!
//! This module defines the identifier used for display slots and the small
//! vocabulary types (`Symbol`, `SymbolSequence`) that flow from the formatter
//! to the animator. Using distinct names keeps signatures self-describing.

use slotmap::new_key_type;
use std::time::Duration;

new_key_type! {
    /// Uniquely and safely identifies a display slot within the `SlotPool`.
    ///
    /// Keys are never reused, so a transition that completes after its slot
    /// was removed by a shrink simply finds nothing to update.
    pub struct SlotId;
}

/// A single displayable character: a digit, a separator or a letter.
pub type Symbol = char;

/// The ordered symbols of one clock reading, most significant first.
pub type SymbolSequence = Vec<Symbol>;

/// The nominal period between two scheduler fires.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Separator used when the host supplies an empty one.
pub const DEFAULT_SEPARATOR: Symbol = ':';

/// Default duration of a single symbol transition.
pub const DEFAULT_TRANSITION_MS: u64 = 400;

/// Longest transition the host may configure.
pub const MAX_TRANSITION_MS: u64 = 5 * 1000;

/// Delay between startup and the first tick, giving the host time to push
/// its initial property values.
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 100;
