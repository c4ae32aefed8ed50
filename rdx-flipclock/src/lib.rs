//! # Flipclock
//!
//! A drift-corrected, per-digit animated clock engine for wallpaper hosts.
//!
//! Flipclock computes the symbols of the current time, diffs them against what
//! is on screen, and animates only the slots that changed. A host application
//! (a wallpaper manager, a shell, a test) configures it at runtime through
//! named properties and receives display updates through a `Renderer`.
//!
//! ## Core Concepts
//!
//! - **Formatter**: a pure function from a time of day and a
//!   `ClockConfiguration` to an ordered sequence of symbols.
//! - **Slots**: one visual position per symbol. The pool grows and shrinks at
//!   its most significant end when the symbol count changes.
//! - **Animator**: stages a transition for each changed slot, right to left,
//!   either all at once or as a cascade.
//! - **Scheduler**: fires once per second on the wall-clock boundary and
//!   compensates for timer drift so the display never falls behind.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use flipclock::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Load startup settings (file is optional).
//!     let settings = FlipClockSettings::load(None)?;
//!
//!     // 2. Create the engine with a real clock and a terminal renderer.
//!     let engine = FlipClockEngine::with_settings(
//!         &settings,
//!         Arc::new(SystemWallClock),
//!         Arc::new(TerminalRenderer::new()),
//!     )
//!     .await;
//!
//!     // 3. Host properties can be pushed at any time.
//!     engine.set_property("enable-am-pm", PropertyValue::Bool(true)).await;
//!
//!     // 4. Run until Ctrl+C.
//!     engine.run().await
//! }
//! ```

pub const ENGINE_NAME: &str = "Flipclock Engine";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapter;
pub mod common;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod render;
pub mod time;

/// A prelude module for easy importing of the most common flipclock types.
pub mod prelude {
    pub use crate::adapter::{ConfigAdapter, Property, PropertyValue, StyleSheet};
    pub use crate::common::{SlotId, Symbol, SymbolSequence, TICK_INTERVAL};
    pub use crate::components::formatter::compute_symbols;
    pub use crate::components::scheduler::SchedulerPhase;
    pub use crate::config::{ClockConfiguration, ConfigHandle, FlipClockSettings};
    pub use crate::engine::FlipClockEngine;
    pub use crate::events::ClockEvent;
    pub use crate::render::{NullRenderer, Renderer, SlotView, TerminalRenderer};
    pub use crate::time::{SystemWallClock, VirtualWallClock, WallClock};
}
