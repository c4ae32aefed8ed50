//! The host-facing configuration boundary.
//!
//! The host pushes named properties at any time. Recognised properties either
//! update the shared [`ClockConfiguration`](crate::config::ClockConfiguration)
//! (taking effect on the next tick) or update the [`StyleSheet`] handed to the
//! renderer. Malformed values are coerced or ignored here, never propagated.

use crate::common::{DEFAULT_SEPARATOR, MAX_TRANSITION_MS};
use crate::config::ConfigHandle;
use crate::events::ClockEvent;
use crate::render::Renderer;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

/// Font size used before the host sends `clock-size`.
pub const DEFAULT_FONT_SIZE_PT: f64 = 96.0;

/// Background used when no image is configured.
pub const DEFAULT_BACKGROUND: &str = "linear-gradient(135deg, #3498DB, #8E44AD)";

/// A raw property value as sent by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    /// Parses host text: `true`/`false`, then numbers, otherwise text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(raw.to_string()),
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Number(number) => Some(*number != 0.0),
            Self::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" | "" => Some(false),
                _ => None,
            },
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(text) => text.trim().parse().ok().filter(|n: &f64| n.is_finite()),
            Self::Bool(_) => None,
        }
    }

    fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// The properties the host can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    ClockSize,
    BgImage,
    EnableAmPm,
    ShowSeconds,
    NumberSeparator,
    BgImageExtendedHeight,
    ClockAnimationSpeed,
}

impl Property {
    pub const ALL: [Property; 7] = [
        Self::ClockSize,
        Self::BgImage,
        Self::EnableAmPm,
        Self::ShowSeconds,
        Self::NumberSeparator,
        Self::BgImageExtendedHeight,
        Self::ClockAnimationSpeed,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::ClockSize => "clock-size",
            Self::BgImage => "bg-image",
            Self::EnableAmPm => "enable-am-pm",
            Self::ShowSeconds => "show-seconds",
            Self::NumberSeparator => "number-separator",
            Self::BgImageExtendedHeight => "bg-image-extended-height",
            Self::ClockAnimationSpeed => "clock-animation-speed",
        }
    }
}

impl FromStr for Property {
    type Err = ();

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|property| property.key() == key)
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// The default gradient.
    Gradient(&'static str),
    /// An image path with forward slashes.
    Image(String),
}

/// Visual style state kept outside the core.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub font_size_pt: f64,
    pub background: Background,
    /// Background height as a CSS-style percentage, e.g. `"101%"`.
    pub background_height: &'static str,
    pub animation_duration: Duration,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            font_size_pt: DEFAULT_FONT_SIZE_PT,
            background: Background::Gradient(DEFAULT_BACKGROUND),
            background_height: "101%",
            animation_duration: Duration::from_millis(crate::common::DEFAULT_TRANSITION_MS),
        }
    }
}

/// Applies host property updates. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct ConfigAdapter {
    config: ConfigHandle,
    style: Arc<RwLock<StyleSheet>>,
    renderer: Arc<dyn Renderer>,
    event_sender: broadcast::Sender<ClockEvent>,
}

impl ConfigAdapter {
    pub fn new(
        config: ConfigHandle,
        renderer: Arc<dyn Renderer>,
        event_sender: broadcast::Sender<ClockEvent>,
    ) -> Self {
        Self {
            config,
            style: Arc::new(RwLock::new(StyleSheet::default())),
            renderer,
            event_sender,
        }
    }

    /// The current style state.
    pub async fn style(&self) -> StyleSheet {
        self.style.read().await.clone()
    }

    /// Applies one named property. Returns the recognised property, or `None`
    /// if the key is unknown or the value could not be used.
    pub async fn apply(&self, key: &str, value: PropertyValue) -> Option<Property> {
        let Ok(property) = key.parse::<Property>() else {
            debug!("Ignoring unknown property '{}'.", key);
            return None;
        };

        let applied = match property {
            Property::ClockSize => match value.as_number() {
                Some(size) => self.update_style(|style| style.font_size_pt = size).await,
                None => false,
            },
            Property::BgImage => {
                let path = value.as_text();
                let background = if path.is_empty() {
                    Background::Gradient(DEFAULT_BACKGROUND)
                } else {
                    Background::Image(path.replace('\\', "/"))
                };
                self.update_style(|style| style.background = background).await
            }
            Property::EnableAmPm => match value.as_bool() {
                Some(enabled) => {
                    self.config.update(|config| config.use_12_hour = enabled).await;
                    true
                }
                None => false,
            },
            Property::ShowSeconds => match value.as_bool() {
                Some(show) => {
                    self.config.update(|config| config.show_seconds = show).await;
                    true
                }
                None => false,
            },
            Property::NumberSeparator => {
                let separator = value.as_text().chars().next().unwrap_or(DEFAULT_SEPARATOR);
                self.config.update(|config| config.separator = separator).await;
                true
            }
            Property::BgImageExtendedHeight => match value.as_bool() {
                Some(extended) => {
                    let height = if extended { "105%" } else { "101%" };
                    self.update_style(|style| style.background_height = height).await
                }
                None => false,
            },
            Property::ClockAnimationSpeed => match value.as_number() {
                Some(ms) => {
                    let clamped = ms.clamp(0.0, MAX_TRANSITION_MS as f64).round() as u64;
                    if clamped as f64 != ms.round() {
                        warn!("Clamping animation speed {} ms to {} ms.", ms, clamped);
                    }
                    let duration = Duration::from_millis(clamped);
                    self.config
                        .update(|config| config.transition_duration = duration)
                        .await;
                    self.update_style(|style| style.animation_duration = duration).await
                }
                None => false,
            },
        };

        if !applied {
            warn!("Ignoring unusable value '{}' for '{}'.", value, key);
            return None;
        }
        debug!("Applied property {} = {}.", property.key(), value);
        self.event_sender
            .send(ClockEvent::PropertyApplied { key: property.key() })
            .ok();
        Some(property)
    }

    /// Parses and applies a `key value` or `key=value` line from the host.
    ///
    /// Only the key is split off; the value keeps its exact text, so a
    /// separator may be a space or a digit.
    pub async fn apply_line(&self, line: &str) -> Option<Property> {
        let line = line.trim_start().trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        let (key, raw) = match line.find(|c: char| c == '=' || c.is_whitespace()) {
            Some(at) => (&line[..at], &line[at + 1..]),
            None => (line, ""),
        };
        let value = match key.parse::<Property>() {
            Ok(Property::NumberSeparator) => PropertyValue::Text(raw.to_string()),
            _ => PropertyValue::parse(raw),
        };
        self.apply(key, value).await
    }

    async fn update_style(&self, mutate: impl FnOnce(&mut StyleSheet)) -> bool {
        let snapshot = {
            let mut style = self.style.write().await;
            mutate(&mut style);
            style.clone()
        };
        self.renderer.apply_style(&snapshot);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{NullRenderer, SlotView};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StyleRecorder(Mutex<Vec<StyleSheet>>);

    impl Renderer for StyleRecorder {
        fn set_slot_display(&self, _index: usize, _view: SlotView) {}

        fn apply_style(&self, style: &StyleSheet) {
            self.0.lock().unwrap().push(style.clone());
        }
    }

    fn adapter() -> (ConfigAdapter, ConfigHandle) {
        let config = ConfigHandle::default();
        let (event_sender, _) = broadcast::channel(16);
        let adapter = ConfigAdapter::new(config.clone(), Arc::new(NullRenderer), event_sender);
        (adapter, config)
    }

    #[test]
    fn parses_host_text() {
        assert_eq!(PropertyValue::parse("true"), PropertyValue::Bool(true));
        assert_eq!(PropertyValue::parse(" 250 "), PropertyValue::Number(250.0));
        assert_eq!(PropertyValue::parse("."), PropertyValue::Text(".".into()));
        assert_eq!(PropertyValue::parse(""), PropertyValue::Text("".into()));
    }

    #[tokio::test]
    async fn clock_properties_update_the_configuration() {
        let (adapter, config) = adapter();

        adapter.apply("enable-am-pm", PropertyValue::Bool(true)).await;
        adapter.apply("show-seconds", PropertyValue::Bool(false)).await;
        adapter.apply("number-separator", PropertyValue::Text("-|".into())).await;
        adapter.apply("clock-animation-speed", PropertyValue::Number(250.0)).await;

        let snapshot = config.snapshot().await;
        assert!(snapshot.use_12_hour);
        assert!(!snapshot.show_seconds);
        assert_eq!(snapshot.separator, '-');
        assert_eq!(snapshot.transition_duration, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn empty_separator_defaults_to_colon() {
        let (adapter, config) = adapter();
        adapter.apply("number-separator", PropertyValue::Text(".".into())).await;
        adapter.apply("number-separator", PropertyValue::Text(String::new())).await;
        assert_eq!(config.snapshot().await.separator, ':');
    }

    #[tokio::test]
    async fn unknown_keys_are_ignored() {
        let (adapter, config) = adapter();
        assert_eq!(adapter.apply("clock-colour", PropertyValue::Bool(true)).await, None);
        assert_eq!(config.snapshot().await, Default::default());
    }

    #[tokio::test]
    async fn malformed_values_are_coerced_or_dropped() {
        let (adapter, config) = adapter();
        assert_eq!(
            adapter.apply("show-seconds", PropertyValue::Text("off".into())).await,
            Some(Property::ShowSeconds)
        );
        assert!(!config.snapshot().await.show_seconds);

        assert_eq!(
            adapter.apply("enable-am-pm", PropertyValue::Text("maybe".into())).await,
            None
        );
        assert!(!config.snapshot().await.use_12_hour);

        adapter.apply("clock-animation-speed", PropertyValue::Number(-40.0)).await;
        assert_eq!(config.snapshot().await.transition_duration, Duration::ZERO);
    }

    #[tokio::test]
    async fn style_properties_reach_the_renderer() {
        let renderer = Arc::new(StyleRecorder::default());
        let (event_sender, _) = broadcast::channel(16);
        let adapter = ConfigAdapter::new(ConfigHandle::default(), renderer.clone(), event_sender);

        adapter.apply_line("clock-size 72").await;
        adapter.apply_line(r"bg-image=C:\wallpapers\sky.png").await;
        adapter.apply_line("bg-image-extended-height true").await;

        let style = adapter.style().await;
        assert_eq!(style.font_size_pt, 72.0);
        assert_eq!(style.background, Background::Image("C:/wallpapers/sky.png".into()));
        assert_eq!(style.background_height, "105%");
        assert_eq!(renderer.0.lock().unwrap().len(), 3);

        adapter.apply_line("bg-image").await;
        assert_eq!(
            adapter.style().await.background,
            Background::Gradient(DEFAULT_BACKGROUND)
        );
    }

    #[tokio::test]
    async fn separator_keeps_the_raw_host_text() {
        let (adapter, config) = adapter();

        adapter.apply_line("number-separator=.5").await;
        assert_eq!(config.snapshot().await.separator, '.');

        adapter.apply_line("number-separator 07").await;
        assert_eq!(config.snapshot().await.separator, '0');

        assert_eq!(
            adapter.apply_line("number-separator  ").await,
            Some(Property::NumberSeparator)
        );
        assert_eq!(config.snapshot().await.separator, ' ');

        adapter.apply_line("number-separator").await;
        assert_eq!(config.snapshot().await.separator, ':');
    }

    #[tokio::test]
    async fn oversized_animation_speed_is_clamped() {
        let (adapter, config) = adapter();
        assert_eq!(
            adapter.apply_line("clock-animation-speed=1e16").await,
            Some(Property::ClockAnimationSpeed)
        );
        let limit = Duration::from_millis(MAX_TRANSITION_MS);
        assert_eq!(config.snapshot().await.transition_duration, limit);
        assert_eq!(adapter.style().await.animation_duration, limit);
    }

    #[tokio::test]
    async fn animation_speed_updates_style_and_timing_together() {
        let (adapter, config) = adapter();
        adapter.apply_line("clock-animation-speed=600").await;
        assert_eq!(adapter.style().await.animation_duration, Duration::from_millis(600));
        assert_eq!(config.snapshot().await.transition_duration, Duration::from_millis(600));
    }
}
