use std::fmt;

use thiserror::Error;

/// One step of the forced-return sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    Disconnect,
    ShutdownTransport,
    ResetState,
    LoadSceneByIndex,
    LoadSceneByName,
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TeardownStep::Disconnect => "graceful disconnect",
            TeardownStep::ShutdownTransport => "transport shutdown",
            TeardownStep::ResetState => "session state reset",
            TeardownStep::LoadSceneByIndex => "main menu load (index)",
            TeardownStep::LoadSceneByName => "main menu load (name)",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RestartError {
    /// An optional host subsystem (display, keyboard) could not be set up.
    #[error("{subsystem} unavailable: {reason}")]
    Integration {
        subsystem: &'static str,
        reason: String,
    },
    #[error("{step} failed: {source:#}")]
    TeardownStep {
        step: TeardownStep,
        #[source]
        source: anyhow::Error,
    },
    #[error("countdown task could not be started: {0}")]
    CountdownStart(String),
}
