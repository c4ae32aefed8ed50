//! Defines the events broadcast by the flipclock engine.
//!
//! Listeners subscribe through [`crate::engine::FlipClockEngine::subscribe_events`]
//! to observe ticks, pool resizes and transition completions without touching
//! the engine's internal state.

use crate::common::{Symbol, SymbolSequence};
use crate::components::scheduler::SchedulerPhase;

#[derive(Debug, Clone, PartialEq)]
pub enum ClockEvent {
    /// The scheduler transitioned between phases.
    SchedulerPhaseChanged { phase: SchedulerPhase },
    /// The scheduler was armed for its first fire.
    SchedulerArmed { expected_fire_ms: i64 },
    /// A tick computed and reconciled a new symbol sequence.
    Tick {
        tick_count: u64,
        drift_ms: i64,
        symbols: SymbolSequence,
        staged: usize,
    },
    /// The slot pool grew or shrank to match the symbol count.
    SlotPoolResized { from: usize, to: usize },
    /// A slot finished its transition and now shows `symbol`.
    TransitionCommitted { slot: usize, symbol: Symbol },
    /// A host property was recognised and applied.
    PropertyApplied { key: &'static str },
}
