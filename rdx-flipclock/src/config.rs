//! Defines all configuration structures for the flipclock engine.
//!
//! There are two layers here:
//!
//! - [`ClockConfiguration`] is the live, process-wide record read by the
//!   formatter and the animator on every tick. It is shared through a
//!   [`ConfigHandle`] and only ever written by the configuration adapter.
//! - [`FlipClockSettings`] is the startup snapshot loaded from a TOML file
//!   and the environment with the `config` crate. It seeds the initial
//!   property values through the same adapter path the host uses.

use crate::adapter::PropertyValue;
use crate::common::{
    DEFAULT_SEPARATOR, DEFAULT_STARTUP_DELAY_MS, DEFAULT_TRANSITION_MS, Symbol,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// The formatting and timing parameters consumed by the core on every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockConfiguration {
    /// Show the hour in 12-hour form with an AM/PM suffix.
    pub use_12_hour: bool,
    /// Append a separator and the two seconds digits.
    pub show_seconds: bool,
    /// The symbol placed between hour, minute and second pairs.
    pub separator: Symbol,
    /// How long a single symbol transition takes. Also used as the lead
    /// time when reading the wall clock.
    pub transition_duration: Duration,
}

impl Default for ClockConfiguration {
    fn default() -> Self {
        Self {
            use_12_hour: false,
            show_seconds: true,
            separator: DEFAULT_SEPARATOR,
            transition_duration: Duration::from_millis(DEFAULT_TRANSITION_MS),
        }
    }
}

/// A cloneable handle to the single, shared `ClockConfiguration`.
///
/// Readers take a snapshot with [`ConfigHandle::snapshot`]; the adapter is the
/// only writer and goes through [`ConfigHandle::update`].
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<ClockConfiguration>>,
}

impl ConfigHandle {
    /// Wraps an initial configuration.
    pub fn new(config: ClockConfiguration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Returns a copy of the current configuration.
    pub async fn snapshot(&self) -> ClockConfiguration {
        self.inner.read().await.clone()
    }

    /// Applies a mutation under the write lock.
    pub(crate) async fn update(&self, mutate: impl FnOnce(&mut ClockConfiguration)) {
        let mut config = self.inner.write().await;
        mutate(&mut config);
    }
}

/// Startup settings, typically loaded from `flipclock.toml`.
///
/// Every field is optional in the file; missing values fall back to the same
/// defaults the host would see before sending any property.
#[derive(Debug, Clone, Deserialize)]
pub struct FlipClockSettings {
    #[serde(default)]
    pub enable_am_pm: bool,

    #[serde(default = "default_true")]
    pub show_seconds: bool,

    #[serde(default = "default_separator")]
    pub number_separator: String,

    /// Transition duration in milliseconds.
    #[serde(default = "default_animation_speed")]
    pub clock_animation_speed: u64,

    /// Font size in points.
    #[serde(default = "default_clock_size")]
    pub clock_size: f64,

    /// Path to a background image. Empty selects the default gradient.
    #[serde(default)]
    pub bg_image: String,

    #[serde(default)]
    pub bg_image_extended_height: bool,

    /// Delay before the first tick, in milliseconds.
    #[serde(default = "default_startup_delay")]
    pub startup_delay_ms: u64,
}

impl FlipClockSettings {
    /// Loads settings from an optional TOML file, then overlays `FLIPCLOCK_*`
    /// environment variables (e.g. `FLIPCLOCK_SHOW_SECONDS=false`).
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("FLIPCLOCK").try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// The startup delay as a `Duration`.
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    /// Expresses the settings as the host property updates they stand for,
    /// in the order the adapter should apply them.
    pub fn initial_properties(&self) -> Vec<(&'static str, PropertyValue)> {
        vec![
            ("clock-size", PropertyValue::Number(self.clock_size)),
            ("bg-image", PropertyValue::Text(self.bg_image.clone())),
            ("enable-am-pm", PropertyValue::Bool(self.enable_am_pm)),
            ("show-seconds", PropertyValue::Bool(self.show_seconds)),
            (
                "number-separator",
                PropertyValue::Text(self.number_separator.clone()),
            ),
            (
                "bg-image-extended-height",
                PropertyValue::Bool(self.bg_image_extended_height),
            ),
            (
                "clock-animation-speed",
                PropertyValue::Number(self.clock_animation_speed as f64),
            ),
        ]
    }
}

impl Default for FlipClockSettings {
    fn default() -> Self {
        Self {
            enable_am_pm: false,
            show_seconds: default_true(),
            number_separator: default_separator(),
            clock_animation_speed: default_animation_speed(),
            clock_size: default_clock_size(),
            bg_image: String::new(),
            bg_image_extended_height: false,
            startup_delay_ms: default_startup_delay(),
        }
    }
}

// --- Default value functions for serde ---

fn default_true() -> bool {
    true
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_animation_speed() -> u64 {
    DEFAULT_TRANSITION_MS
}

fn default_clock_size() -> f64 {
    crate::adapter::DEFAULT_FONT_SIZE_PT
}

fn default_startup_delay() -> u64 {
    DEFAULT_STARTUP_DELAY_MS
}
