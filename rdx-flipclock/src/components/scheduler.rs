//! A fixed-interval scheduler that compensates for timer drift.
//!
//! The expected fire time advances by exactly one interval per tick, no matter
//! when the tick actually fired. The delay to the next fire is shortened by
//! the measured drift, so the average rate converges to one tick per interval
//! even when individual fires are late.

use crate::common::TICK_INTERVAL;
use crate::events::ClockEvent;
use crate::time::WallClock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerPhase {
    #[default]
    Idle,
    Armed,
    Firing,
}

/// The timing state of the scheduler. All times are wall-clock epoch
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    pub phase: SchedulerPhase,
    pub expected_fire_ms: i64,
    pub interval_ms: i64,
    pub tick_count: u64,
    pub last_drift_ms: i64,
    pub last_fire_ms: i64,
}

impl ScheduleState {
    pub fn new(interval: Duration) -> Self {
        Self {
            phase: SchedulerPhase::Idle,
            expected_fire_ms: 0,
            interval_ms: interval.as_millis() as i64,
            tick_count: 0,
            last_drift_ms: 0,
            last_fire_ms: 0,
        }
    }

    /// Idle -> Armed. Targets the next whole-interval boundary after `now_ms`
    /// and returns the delay until then.
    pub fn arm(&mut self, now_ms: i64) -> Duration {
        self.expected_fire_ms = now_ms + self.interval_ms - now_ms.rem_euclid(self.interval_ms);
        self.phase = SchedulerPhase::Armed;
        millis(self.expected_fire_ms - now_ms)
    }

    /// Armed -> Firing. Records and returns the drift of this fire.
    pub fn begin_fire(&mut self, actual_ms: i64) -> i64 {
        self.phase = SchedulerPhase::Firing;
        self.last_fire_ms = actual_ms;
        self.last_drift_ms = actual_ms - self.expected_fire_ms;
        self.last_drift_ms
    }

    /// Firing -> Armed. Advances the expected fire time by one interval and
    /// returns the drift-compensated delay to the next fire.
    ///
    /// A drift beyond two intervals means the wall clock was stepped; the
    /// schedule is re-armed from the fire time instead of compensated.
    pub fn finish_fire(&mut self) -> Duration {
        self.tick_count += 1;
        if self.last_drift_ms.abs() > 2 * self.interval_ms {
            warn!("Wall clock stepped by {} ms; re-arming.", self.last_drift_ms);
            return self.arm(self.last_fire_ms);
        }
        self.expected_fire_ms += self.interval_ms;
        self.phase = SchedulerPhase::Armed;
        millis(self.interval_ms - self.last_drift_ms)
    }
}

fn millis(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}

struct RunningLoop {
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

/// Runs a tick callback once per interval on a tokio task.
#[derive(Clone)]
pub struct DriftCorrectingScheduler {
    clock: Arc<dyn WallClock>,
    state: Arc<RwLock<ScheduleState>>,
    running: Arc<Mutex<Option<RunningLoop>>>,
    event_sender: broadcast::Sender<ClockEvent>,
}

impl DriftCorrectingScheduler {
    pub fn new(clock: Arc<dyn WallClock>, event_sender: broadcast::Sender<ClockEvent>) -> Self {
        Self::with_interval(clock, TICK_INTERVAL, event_sender)
    }

    pub fn with_interval(
        clock: Arc<dyn WallClock>,
        interval: Duration,
        event_sender: broadcast::Sender<ClockEvent>,
    ) -> Self {
        Self {
            clock,
            state: Arc::new(RwLock::new(ScheduleState::new(interval))),
            running: Arc::new(Mutex::new(None)),
            event_sender,
        }
    }

    /// A copy of the current timing state.
    pub async fn state(&self) -> ScheduleState {
        *self.state.read().await
    }

    pub async fn phase(&self) -> SchedulerPhase {
        self.state.read().await.phase
    }

    /// Arms the scheduler and spawns its loop. `tick` receives the drift of
    /// each fire in milliseconds.
    ///
    /// Returns `false` without doing anything if the scheduler is already
    /// running.
    pub async fn start<F, Fut>(&self, mut tick: F) -> bool
    where
        F: FnMut(i64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut running = self.running.lock().await;
        if running.is_some() {
            warn!("Scheduler is already running; ignoring start.");
            return false;
        }

        let first_delay = {
            let mut state = self.state.write().await;
            let delay = state.arm(self.clock.now_millis());
            self.event_sender
                .send(ClockEvent::SchedulerArmed {
                    expected_fire_ms: state.expected_fire_ms,
                })
                .ok();
            delay
        };
        self.publish_phase(SchedulerPhase::Armed);
        info!("Scheduler armed; first fire in {:?}.", first_delay);

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let scheduler = self.clone();
        let handle = tokio::spawn(async move {
            let mut deadline = Instant::now() + first_delay;
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => break,
                    _ = tokio::time::sleep_until(deadline) => {
                        let fired_at = Instant::now();
                        let drift = {
                            let mut state = scheduler.state.write().await;
                            state.begin_fire(scheduler.clock.now_millis())
                        };
                        scheduler.publish_phase(SchedulerPhase::Firing);
                        trace!("Scheduler fired with {} ms drift.", drift);

                        tick(drift).await;

                        // Measured from the fire, so a slow tick does not push the next one back.
                        deadline = fired_at + scheduler.state.write().await.finish_fire();
                        scheduler.publish_phase(SchedulerPhase::Armed);
                    }
                }
            }
        });

        *running = Some(RunningLoop {
            shutdown_tx,
            handle,
        });
        true
    }

    /// Halts rescheduling and waits for the loop to exit. A tick that is
    /// already firing completes first. Returns `false` if it was not running.
    pub async fn stop(&self) -> bool {
        let Some(running) = self.running.lock().await.take() else {
            return false;
        };
        running.shutdown_tx.send(()).ok();
        if let Err(e) = running.handle.await {
            warn!("Scheduler loop ended abnormally: {}", e);
        }
        self.state.write().await.phase = SchedulerPhase::Idle;
        self.publish_phase(SchedulerPhase::Idle);
        info!("Scheduler stopped.");
        true
    }

    fn publish_phase(&self, phase: SchedulerPhase) {
        self.event_sender
            .send(ClockEvent::SchedulerPhaseChanged { phase })
            .ok();
    }
}
