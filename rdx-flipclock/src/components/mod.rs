//! Contains the building blocks of the clock.
//!
//! The formatter decides what to show, the slot pool holds what is shown, the
//! animator moves one to the other, and the scheduler decides when. The
//! `FlipClockEngine` wires them together.

pub mod animator;
pub mod formatter;
pub mod scheduler;
pub mod slots;
