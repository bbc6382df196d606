//! Forces a fresh host session after the first peer finishes loading.
//!
//! Some environmental systems (weather, notably) do not initialize for a peer
//! that joins a freshly started host. `rehost` watches the game's log for the
//! "started host" and "peer finished loading" markers, counts down ten
//! seconds on screen, then disconnects, resets session state and reloads the
//! main menu so the player can host again. Ctrl+Shift+Alt+RestartKey triggers
//! the same return at any time.
//!
//! The game integration supplies a [`SessionHost`], optionally a [`Display`]
//! and a [`Keyboard`], and a stream of log lines (see [`log_tail::tail`]):
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use rehost::{Config, Shell, ShellEvent, SessionHost, NullDisplay, Display};
//! # async fn wire(host: Arc<dyn SessionHost>, log: std::path::PathBuf) {
//! let config = Config::default();
//! let display: Arc<dyn Display> = Arc::new(NullDisplay);
//! let shell = Shell::new(&config, host, Ok(display), rehost::hotkey::system_keyboard());
//! let (tx, rx) = tokio::sync::mpsc::channel::<ShellEvent>(64);
//! tokio::spawn(rehost::log_tail::tail(log, tx.clone()));
//! shell.run(rx).await;
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod error;
pub mod event;
pub mod host;
pub mod hotkey;
pub mod log_tail;
pub mod logging;
pub mod reset;
pub mod shell;

pub use classify::{classify, LogEvent, Markers};
pub use config::{load_or_default, Config};
pub use coordinator::{
    CountdownTimings, LogSubscriber, Phase, RestartCoordinator, SessionState,
};
pub use display::{Display, NullDisplay};
pub use error::{RestartError, TeardownStep};
pub use event::ShellEvent;
pub use host::{Keyboard, SceneRef, SessionHost};
pub use hotkey::{HotkeyWatcher, KeyCode};
pub use reset::{NetworkReset, ResetReport};
pub use shell::Shell;
