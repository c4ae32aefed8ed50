//! The engine that wires the formatter, animator and scheduler together.

use crate::adapter::{ConfigAdapter, PropertyValue};
use crate::common::DEFAULT_STARTUP_DELAY_MS;
use crate::components::animator::{ReconcileOptions, StagedTransition, SymbolAnimator};
use crate::components::formatter::compute_symbols;
use crate::components::scheduler::{DriftCorrectingScheduler, ScheduleState};
use crate::config::{ConfigHandle, FlipClockSettings};
use crate::events::ClockEvent;
use crate::render::{Renderer, SlotView};
use crate::time::WallClock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, trace, warn};

/// The main flipclock engine.
///
/// Owns the shared configuration, the slot animator and the drift-correcting
/// scheduler. Cloning yields another handle to the same running instance.
#[derive(Clone)]
pub struct FlipClockEngine {
    config: ConfigHandle,
    adapter: ConfigAdapter,
    animator: SymbolAnimator,
    scheduler: DriftCorrectingScheduler,
    clock: Arc<dyn WallClock>,
    event_sender: broadcast::Sender<ClockEvent>,
    startup_delay: Duration,
    ticks: Arc<AtomicU64>,
}

impl FlipClockEngine {
    /// Creates an engine with default configuration.
    pub fn new(clock: Arc<dyn WallClock>, renderer: Arc<dyn Renderer>) -> Self {
        const CHANNEL_CAPACITY: usize = 256;
        let (event_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let config = ConfigHandle::default();

        Self {
            adapter: ConfigAdapter::new(config.clone(), renderer.clone(), event_sender.clone()),
            animator: SymbolAnimator::new(renderer, event_sender.clone()),
            scheduler: DriftCorrectingScheduler::new(clock.clone(), event_sender.clone()),
            config,
            clock,
            event_sender,
            startup_delay: Duration::from_millis(DEFAULT_STARTUP_DELAY_MS),
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates an engine and applies startup settings through the adapter,
    /// exactly as if the host had sent them.
    pub async fn with_settings(
        settings: &FlipClockSettings,
        clock: Arc<dyn WallClock>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let mut engine = Self::new(clock, renderer);
        engine.startup_delay = settings.startup_delay();
        for (key, value) in settings.initial_properties() {
            engine.adapter.apply(key, value).await;
        }
        engine
    }

    /// Starts the clock: waits for the host to deliver its initial values,
    /// paints the first reading with a cascade, then arms the scheduler.
    pub async fn start(&self) {
        info!("FlipClockEngine starting up...");
        tokio::time::sleep(self.startup_delay).await;

        self.tick(true, false, 0).await;

        let engine = self.clone();
        self.scheduler
            .start(move |drift| {
                let engine = engine.clone();
                async move {
                    engine.tick(false, true, drift).await;
                }
            })
            .await;
    }

    /// Halts the scheduler. In-flight slot transitions still complete.
    pub async fn stop(&self) {
        self.scheduler.stop().await;
    }

    /// Runs the clock until a Ctrl+C signal is received.
    pub async fn run(&self) -> anyhow::Result<()> {
        self.start().await;
        info!("Clock running. Press Ctrl+C to shut down.");
        tokio::signal::ctrl_c().await?;

        info!("Shutdown signal received.");
        self.stop().await;
        info!("FlipClockEngine has shut down.");
        Ok(())
    }

    /// Computes the symbols for the current time plus the transition lead
    /// and reconciles the display against them.
    pub async fn tick(&self, force: bool, simultaneous: bool, drift_ms: i64) -> Vec<StagedTransition> {
        let config = self.config.snapshot().await;
        let now = self.clock.now();
        let reading = chrono::Duration::from_std(config.transition_duration)
            .ok()
            .and_then(|lead| now.checked_add_signed(lead))
            .unwrap_or_else(|| {
                warn!("Transition lead {:?} is out of range; reading without it.", config.transition_duration);
                now
            });
        let symbols = compute_symbols(&reading, &config);
        trace!("Tick symbols: {}", symbols.iter().collect::<String>());

        let staged = self
            .animator
            .reconcile(
                &symbols,
                ReconcileOptions {
                    simultaneous,
                    force,
                    duration: config.transition_duration,
                },
            )
            .await;

        let tick_count = self.ticks.fetch_add(1, Ordering::Relaxed);
        self.event_sender
            .send(ClockEvent::Tick {
                tick_count,
                drift_ms,
                symbols,
                staged: staged.len(),
            })
            .ok();
        staged
    }

    /// Applies a host property.
    pub async fn set_property(&self, key: &str, value: PropertyValue) -> bool {
        self.adapter.apply(key, value).await.is_some()
    }

    /// A handle for pushing host properties from another task.
    pub fn config_adapter(&self) -> ConfigAdapter {
        self.adapter.clone()
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Snapshot of the slots in display order.
    pub async fn display(&self) -> Vec<SlotView> {
        self.animator.views().await
    }

    /// The committed symbols in display order.
    pub async fn display_text(&self) -> String {
        self.animator.committed_text().await
    }

    pub async fn schedule_state(&self) -> ScheduleState {
        self.scheduler.state().await
    }

    /// Subscribes to the `ClockEvent` stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ClockEvent> {
        self.event_sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::scheduler::SchedulerPhase;
    use crate::render::NullRenderer;
    use crate::time::VirtualWallClock;

    fn engine_at(rfc3339: &str) -> FlipClockEngine {
        let clock = Arc::new(VirtualWallClock::parse(rfc3339).unwrap());
        FlipClockEngine::new(clock, Arc::new(NullRenderer))
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_reads_ahead_by_the_transition_duration() {
        // 06.600 + 100 ms startup delay + 400 ms lead lands on 07.100.
        let engine = engine_at("2026-10-19T09:05:06.600+00:00");
        engine.start().await;

        // The cascade's leftmost slot starts 700 ms in and takes 400 ms.
        advance(1_150).await;
        assert_eq!(engine.display_text().await, "09:05:07");
        engine.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_ticks_land_on_second_boundaries() {
        let engine = engine_at("2026-10-19T23:59:57.300+00:00");
        let mut events = engine.subscribe_events();
        engine.start().await;
        assert_eq!(engine.schedule_state().await.phase, SchedulerPhase::Armed);

        // First scheduled fire is at 58.000 and shows 58.400, i.e. "23:59:58".
        advance(700 + 450).await;
        assert_eq!(engine.display_text().await, "23:59:58");

        advance(2_000).await;
        assert_eq!(engine.display_text().await, "00:00:00");

        engine.stop().await;
        let state = engine.schedule_state().await;
        assert_eq!(state.phase, SchedulerPhase::Idle);
        assert_eq!(state.tick_count, 3);

        let mut scheduled = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let ClockEvent::Tick { drift_ms, symbols, .. } = event {
                scheduled.push((drift_ms, symbols.into_iter().collect::<String>()));
            }
        }
        assert_eq!(
            scheduled,
            [
                (0, "23:59:57".to_string()),
                (0, "23:59:58".to_string()),
                (0, "23:59:59".to_string()),
                (0, "00:00:00".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn property_changes_apply_on_the_next_tick() {
        let engine = engine_at("2026-10-19T21:05:00.000+00:00");
        engine.start().await;
        advance(1_500).await;
        assert_eq!(engine.display_text().await, "21:05:01");

        assert!(engine.set_property("enable-am-pm", PropertyValue::Bool(true)).await);
        assert!(engine.set_property("show-seconds", PropertyValue::Bool(false)).await);
        assert!(!engine.set_property("clock-colour", PropertyValue::Bool(true)).await);
        assert_eq!(engine.display_text().await, "21:05:01");

        advance(1_000).await;
        assert_eq!(engine.display().await.len(), 7);
        assert_eq!(engine.display_text().await, "9:05 PM");
        engine.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_leaves_in_flight_transitions_running() {
        let engine = engine_at("2026-10-19T12:00:00.500+00:00");
        engine.start().await;

        // Initial cascade of eight slots takes 400 + 7 * 100 ms.
        advance(150).await;
        engine.stop().await;
        assert_ne!(engine.display_text().await, "12:00:01");

        advance(1_200).await;
        assert_eq!(engine.display_text().await, "12:00:01");
    }

    #[tokio::test(start_paused = true)]
    async fn an_unrepresentable_lead_falls_back_to_the_plain_reading() {
        let engine = engine_at("2026-10-19T10:20:30.000+00:00");
        engine
            .config()
            .update(|config| config.transition_duration = Duration::from_secs(u64::MAX / 2))
            .await;

        let staged = engine.tick(true, true, 0).await;
        assert_eq!(staged.len(), 8);
        assert!(staged.iter().all(|transition| transition.delay.is_zero()));
        engine.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn settings_seed_the_configuration() {
        let settings = FlipClockSettings {
            enable_am_pm: true,
            number_separator: ".".into(),
            clock_animation_speed: 200,
            startup_delay_ms: 0,
            ..FlipClockSettings::default()
        };
        let clock = Arc::new(VirtualWallClock::parse("2026-10-19T08:30:15.000+00:00").unwrap());
        let engine = FlipClockEngine::with_settings(&settings, clock, Arc::new(NullRenderer)).await;

        let config = engine.config().snapshot().await;
        assert!(config.use_12_hour);
        assert_eq!(config.separator, '.');
        assert_eq!(config.transition_duration, Duration::from_millis(200));

        let staged = engine.tick(true, true, 0).await;
        assert_eq!(staged.len(), 10);
        advance(300).await;
        assert_eq!(engine.display_text().await, "8.30.15 AM");
    }
}
