/// On-screen message sink for the countdown and completion notices.
///
/// Implementations must tolerate `hide` without a preceding `show` and
/// repeated `show` calls (each one replaces the text).
pub trait Display: Send + Sync {
    fn show(&self, text: &str);
    fn hide(&self);
}

/// Stand-in used when the host has no overlay to draw on.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl Display for NullDisplay {
    fn show(&self, _text: &str) {}
    fn hide(&self) {}
}

pub fn countdown_message(seconds_left: u32) -> String {
    format!(
        "The Mods have Pre-loaded. Returning to menu in {seconds_left} seconds.\n\
         Please re-host the game for proper weather loading."
    )
}

pub const COMPLETION_MESSAGE: &str = "Please start hosting again for proper weather loading.";
