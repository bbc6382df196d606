/// The forced return: leave the session, reset shared state, load the menu.
///
/// Every step is attempted even if an earlier one failed, so a half-broken
/// session still ends with the transport down and the main menu loaded.
use std::sync::Arc;

use tracing::{error, info};

use crate::error::{RestartError, TeardownStep};
use crate::host::{SceneRef, SessionHost, MAIN_MENU_SCENE_INDEX, MAIN_MENU_SCENE_NAME};

/// Outcome of one [`NetworkReset::run`].
#[derive(Debug, Default)]
pub struct ResetReport {
    /// Steps that ran successfully, in order.
    pub completed: Vec<TeardownStep>,
    /// Steps that were attempted and failed.
    pub failures: Vec<RestartError>,
}

impl ResetReport {
    /// True when either main-menu selector succeeded.
    pub fn returned_to_menu(&self) -> bool {
        self.completed.iter().any(|s| {
            matches!(s, TeardownStep::LoadSceneByIndex | TeardownStep::LoadSceneByName)
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, step: TeardownStep, result: anyhow::Result<()>) -> bool {
        match result {
            Ok(()) => {
                info!(%step, "teardown step done");
                self.completed.push(step);
                true
            }
            Err(source) => {
                let err = RestartError::TeardownStep { step, source };
                error!("{err}");
                self.failures.push(err);
                false
            }
        }
    }
}

pub struct NetworkReset {
    host: Arc<dyn SessionHost>,
}

impl NetworkReset {
    pub fn new(host: Arc<dyn SessionHost>) -> Self {
        Self { host }
    }

    /// Runs the full sequence. Never returns early.
    pub fn run(&self) -> ResetReport {
        info!("forcing return to main menu");
        let mut report = ResetReport::default();

        if self.host.is_connected_client() {
            report.record(TeardownStep::Disconnect, self.host.disconnect_gracefully());
        } else {
            info!("not connected as a client; skipping graceful disconnect");
        }

        report.record(
            TeardownStep::ShutdownTransport,
            self.host.force_shutdown_transport(),
        );
        report.record(TeardownStep::ResetState, self.host.reset_to_defaults());

        let by_index = self
            .host
            .load_scene(SceneRef::Index(MAIN_MENU_SCENE_INDEX));
        if !report.record(TeardownStep::LoadSceneByIndex, by_index) {
            let by_name = self.host.load_scene(SceneRef::Name(MAIN_MENU_SCENE_NAME));
            report.record(TeardownStep::LoadSceneByName, by_name);
        }

        if !report.returned_to_menu() {
            error!("main menu could not be loaded by index or by name");
        } else if report.is_clean() {
            info!("forced return finished cleanly");
        }
        report
    }
}
