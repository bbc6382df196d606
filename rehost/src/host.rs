/// Seams into the game process that `rehost` drives but does not implement.
///
/// The integration layer provides one [`SessionHost`] for the lifetime of the
/// process and, when input is available, one [`Keyboard`].
use anyhow::Result;

use crate::hotkey::KeyCode;

pub const MAIN_MENU_SCENE_INDEX: u32 = 0;
pub const MAIN_MENU_SCENE_NAME: &str = "MainMenu";

/// Selects a scene either by build index or by its canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneRef<'a> {
    Index(u32),
    Name(&'a str),
}

/// Network session and scene primitives exposed by the game.
///
/// Every call is synchronous and may fail independently; the caller decides
/// whether a failure is fatal.
pub trait SessionHost: Send + Sync {
    /// True while the local process holds a live connection to a session.
    fn is_connected_client(&self) -> bool;

    /// Asks the high-level session manager to leave the session cleanly.
    fn disconnect_gracefully(&self) -> Result<()>;

    /// Tears down the low-level transport, regardless of session state.
    fn force_shutdown_transport(&self) -> Result<()>;

    /// Restores shared game/session values to their defaults.
    fn reset_to_defaults(&self) -> Result<()>;

    fn load_scene(&self, scene: SceneRef<'_>) -> Result<()>;
}

/// Instantaneous keyboard state.
pub trait Keyboard: Send {
    /// Whether `key` is held down right now.
    fn is_down(&self, key: KeyCode) -> bool;
}
