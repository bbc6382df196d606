/// Host/join lifecycle state machine and the timed forced-return sequence.
///
/// Automatic path: `Idle` → (host marker) → `AwaitingPeer` → (peer-load
/// marker) → `Countdown` → `Completed`. It fires at most once per fresh load.
/// Manual path: a hotkey activation enters `Countdown` from any other phase,
/// any number of times.
///
/// The countdown is a spawned tokio task that only suspends on
/// `tokio::time::sleep`, so tests drive it on a paused clock.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::classify::{classify, is_host_related, LogEvent, Markers};
use crate::display::{countdown_message, Display, COMPLETION_MESSAGE};
use crate::error::RestartError;
use crate::host::SessionHost;
use crate::reset::NetworkReset;

pub const DEFAULT_COUNTDOWN_SECS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Hosting started; waiting for a peer to finish loading.
    AwaitingPeer,
    Countdown,
    Completed,
}

/// Lifecycle state for one load of the game. Reset by
/// [`RestartCoordinator::reload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    /// Set once a forced return has run; blocks further automatic detection.
    pub has_force_quit: bool,
    /// Whole seconds left. Only meaningful in [`Phase::Countdown`].
    pub countdown_remaining: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            has_force_quit: false,
            countdown_remaining: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTimings {
    pub seconds: u32,
    pub tick: Duration,
    /// Pause between the forced return and the completion message.
    pub post_reset_pause: Duration,
    pub completion_display: Duration,
}

impl Default for CountdownTimings {
    fn default() -> Self {
        Self {
            seconds: DEFAULT_COUNTDOWN_SECS,
            tick: Duration::from_secs(1),
            post_reset_pause: Duration::from_secs(2),
            completion_display: Duration::from_secs(5),
        }
    }
}

/// Receives every line the host writes to its log.
pub trait LogSubscriber {
    fn on_log_line(&mut self, line: &str);
}

/// Lifecycle state plus the generation of the countdown allowed to touch it.
struct Slot {
    state: SessionState,
    /// Bumped on every cancel; a countdown task only writes while its own
    /// generation is still current.
    generation: u64,
}

/// State and collaborators shared between the coordinator and its
/// countdown task.
struct Shared {
    slot: Mutex<Slot>,
    display: Arc<dyn Display>,
    reset: NetworkReset,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `f` only if countdown `generation` has not been cancelled.
    fn with_live<R>(&self, generation: u64, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        let mut slot = self.slot();
        (slot.generation == generation).then(|| f(&mut slot.state))
    }

    /// Synchronous forced return, used when no countdown task can run.
    fn force_return_now(&self) {
        self.slot().state.has_force_quit = true;
        self.display.hide();
        let report = self.reset.run();
        if !report.returned_to_menu() {
            warn!("forced return finished without reaching the main menu");
        }
        let mut slot = self.slot();
        slot.state.phase = Phase::Completed;
        slot.state.countdown_remaining = 0;
    }
}

struct CountdownTask {
    stop_tx: watch::Sender<bool>,
    _handle: JoinHandle<()>,
}

impl CountdownTask {
    fn stop(self) {
        let _ = self.stop_tx.send(true);
    }
}

pub struct RestartCoordinator {
    shared: Arc<Shared>,
    markers: Markers,
    timings: CountdownTimings,
    countdown: Option<CountdownTask>,
}

impl RestartCoordinator {
    pub fn new(host: Arc<dyn SessionHost>, display: Arc<dyn Display>) -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    state: SessionState::default(),
                    generation: 0,
                }),
                display,
                reset: NetworkReset::new(host),
            }),
            markers: Markers::default(),
            timings: CountdownTimings::default(),
            countdown: None,
        }
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_timings(mut self, timings: CountdownTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn snapshot(&self) -> SessionState {
        self.shared.slot().state
    }

    pub fn phase(&self) -> Phase {
        self.shared.slot().state.phase
    }

    pub fn on_log_event(&mut self, event: LogEvent) {
        match event {
            LogEvent::HostStarted => {
                let mut slot = self.shared.slot();
                if slot.state.has_force_quit {
                    info!("host start ignored: forced return already ran this load");
                } else if slot.state.phase == Phase::Idle {
                    slot.state.phase = Phase::AwaitingPeer;
                    info!("host detected; waiting for peer to finish loading");
                }
            }
            LogEvent::PeerLoadComplete => {
                let ready = {
                    let slot = self.shared.slot();
                    slot.state.phase == Phase::AwaitingPeer && !slot.state.has_force_quit
                };
                if ready {
                    info!("peer finished loading; starting countdown");
                    self.start_countdown();
                }
            }
            LogEvent::Irrelevant => {}
        }
    }

    /// Hotkey path. Returns `false` when a countdown is already running.
    pub fn activate_manual(&mut self) -> bool {
        if self.phase() == Phase::Countdown {
            debug!("restart hotkey ignored: countdown already running");
            return false;
        }
        info!("restart hotkey pressed");
        self.start_countdown();
        true
    }

    /// Fresh load of the game: abort any countdown and forget all progress.
    pub fn reload(&mut self) {
        self.cancel();
        self.shared.slot().state = SessionState::default();
        info!("state reset for fresh load");
    }

    /// Stops the countdown task, if any. Once this returns the task makes no
    /// further state changes and never starts the reset.
    pub fn cancel(&mut self) {
        self.shared.slot().generation += 1;
        if let Some(task) = self.countdown.take() {
            task.stop();
        }
    }

    fn start_countdown(&mut self) {
        self.cancel();
        let generation = {
            let mut slot = self.shared.slot();
            slot.state.phase = Phase::Countdown;
            slot.state.countdown_remaining = self.timings.seconds;
            slot.generation
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = run_countdown(Arc::clone(&self.shared), self.timings, generation, stop_rx);

        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                self.countdown = Some(CountdownTask {
                    stop_tx,
                    _handle: rt.spawn(task),
                });
            }
            Err(e) => {
                let err = RestartError::CountdownStart(e.to_string());
                error!("{err}; returning to menu immediately");
                self.shared.force_return_now();
            }
        }
    }
}

impl LogSubscriber for RestartCoordinator {
    fn on_log_line(&mut self, line: &str) {
        if is_host_related(line) {
            debug!("host-related log line: {line:?}");
        }
        let event = classify(line, &self.markers);
        self.on_log_event(event);
    }
}

impl Drop for RestartCoordinator {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Sleeps for `duration` unless stopped first. Returns `false` on stop.
/// A stop that is already pending wins over an elapsed sleep.
async fn pause(duration: Duration, stop: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        biased;
        // A dropped sender means the coordinator is gone.
        _ = stop.wait_for(|stopped| *stopped) => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

async fn run_countdown(
    shared: Arc<Shared>,
    timings: CountdownTimings,
    generation: u64,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        let Some(remaining) = shared.with_live(generation, |s| s.countdown_remaining) else {
            return;
        };
        if remaining == 0 {
            break;
        }
        shared.display.show(&countdown_message(remaining));
        debug!(remaining, "countdown");

        let ticked = pause(timings.tick, &mut stop).await
            && shared
                .with_live(generation, |s| {
                    s.countdown_remaining = s.countdown_remaining.saturating_sub(1)
                })
                .is_some();
        if !ticked {
            shared.display.hide();
            info!("countdown cancelled");
            return;
        }
    }

    // The lock is held through the reset so a concurrent cancel either
    // lands before it (and the reset never starts) or after it finishes.
    let report = {
        let mut slot = shared.slot();
        if slot.generation != generation {
            shared.display.hide();
            return;
        }
        slot.state.has_force_quit = true;
        shared.display.hide();
        shared.reset.run()
    };
    if !report.returned_to_menu() {
        warn!("forced return finished without reaching the main menu");
    }

    if !pause(timings.post_reset_pause, &mut stop).await {
        return;
    }
    shared.display.show(COMPLETION_MESSAGE);
    let finished = pause(timings.completion_display, &mut stop).await;
    shared.display.hide();
    if finished && shared.with_live(generation, |s| s.phase = Phase::Completed).is_some() {
        info!("forced return complete");
    }
}
