/// The cooperative loop that ties the host's inputs to the coordinator.
///
/// One task owns the coordinator and the hotkey watcher. It polls the
/// keyboard on a fixed tick and applies [`ShellEvent`]s as they arrive, so
/// all lifecycle state changes happen on one logical thread.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::Config;
use crate::coordinator::{LogSubscriber, RestartCoordinator, SessionState};
use crate::display::{Display, NullDisplay};
use crate::error::RestartError;
use crate::event::ShellEvent;
use crate::host::{Keyboard, SessionHost};
use crate::hotkey::HotkeyWatcher;

pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

pub struct Shell {
    coordinator: RestartCoordinator,
    hotkey: HotkeyWatcher,
    keyboard: Option<Box<dyn Keyboard>>,
    tick: Duration,
}

/// Keeps an optional subsystem if it came up; otherwise logs why and
/// carries on without it.
fn optional<T>(attempt: Result<T, RestartError>) -> Option<T> {
    match attempt {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("{e}; continuing without it");
            None
        }
    }
}

impl Shell {
    /// Builds the shell. A failed display falls back to [`NullDisplay`] (the
    /// forced return still runs on its timer); a failed keyboard disables the
    /// hotkey.
    pub fn new(
        config: &Config,
        host: Arc<dyn SessionHost>,
        display: Result<Arc<dyn Display>, RestartError>,
        keyboard: Result<Box<dyn Keyboard>, RestartError>,
    ) -> Self {
        let display: Arc<dyn Display> = match optional(display) {
            Some(d) => {
                info!("on-screen display ready");
                d
            }
            None => Arc::new(NullDisplay),
        };
        let keyboard = optional(keyboard);
        if keyboard.is_some() {
            info!("restart hotkey: Ctrl+Shift+Alt+{}", config.general.restart_key);
        }

        Self {
            coordinator: RestartCoordinator::new(host, display),
            hotkey: HotkeyWatcher::new(config.restart_key()),
            keyboard,
            tick: DEFAULT_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Replaces the coordinator, e.g. one built with custom markers.
    pub fn with_coordinator(mut self, coordinator: RestartCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    /// Runs until [`ShellEvent::Shutdown`] or until every sender is dropped.
    /// Returns the lifecycle state as it was when the loop stopped.
    pub async fn run(mut self, mut rx: mpsc::Receiver<ShellEvent>) -> SessionState {
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.hotkey.poll(self.keyboard.as_deref()) {
                        self.coordinator.activate_manual();
                    }
                }
                evt = rx.recv() => match evt {
                    Some(ShellEvent::LogLine(line)) => self.coordinator.on_log_line(&line),
                    Some(ShellEvent::Reload) => self.coordinator.reload(),
                    Some(ShellEvent::Shutdown) | None => break,
                },
            }
        }

        info!("shutting down");
        let state = self.coordinator.snapshot();
        self.coordinator.cancel();
        state
    }
}
