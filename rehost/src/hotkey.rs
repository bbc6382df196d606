/// Manual restart hotkey: Ctrl+Shift+Alt plus one configurable key.
///
/// The keyboard is sampled once per shell tick rather than hooked, so the
/// watcher does its own edge detection. On Windows [`system_keyboard`] polls
/// `GetAsyncKeyState`; on other platforms it reports the keyboard as absent
/// and the hotkey is simply unavailable.
use crate::error::RestartError;
use crate::host::Keyboard;

/// A Windows virtual-key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const SHIFT: KeyCode = KeyCode(0x10);
    pub const CONTROL: KeyCode = KeyCode(0x11);
    /// Alt.
    pub const MENU: KeyCode = KeyCode(0x12);
    pub const R: KeyCode = KeyCode(0x52);
}

/// Converts a key name (e.g. `"R"`, `"F8"`) to its virtual-key code.
///
/// Supported keys:
/// - Function keys `F1`–`F12` (case-insensitive).
/// - ASCII letters `A`–`Z` (normalised to their uppercase VK values, `0x41`–`0x5A`).
/// - ASCII digits `0`–`9` (VK values `0x30`–`0x39`).
///
/// Returns `None` for any unrecognised name.
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let upper = name.trim().to_uppercase();
    if let Some(n) = upper.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
        return (1..=12).contains(&n).then(|| KeyCode(0x6F + n));
    }
    let mut chars = upper.chars();
    match (chars.next(), chars.next()) {
        // 'A'=0x41…'Z'=0x5A; '0'=0x30…'9'=0x39, identical to the VK codes.
        (Some(c), None) if c.is_ascii_alphanumeric() => Some(KeyCode(c as u32)),
        _ => None,
    }
}

/// Edge detector for the restart combination.
#[derive(Debug)]
pub struct HotkeyWatcher {
    key: KeyCode,
    held: bool,
}

impl HotkeyWatcher {
    pub fn new(key: KeyCode) -> Self {
        Self { key, held: false }
    }

    /// Samples the keyboard once. Returns `true` only on the tick where the
    /// full combination goes from released to held.
    pub fn poll(&mut self, keyboard: Option<&dyn Keyboard>) -> bool {
        let Some(kb) = keyboard else {
            self.held = false;
            return false;
        };

        let combo = kb.is_down(KeyCode::CONTROL)
            && kb.is_down(KeyCode::SHIFT)
            && kb.is_down(KeyCode::MENU)
            && kb.is_down(self.key);

        let fired = combo && !self.held;
        self.held = combo;
        fired
    }
}

/// Opens the platform keyboard.
pub fn system_keyboard() -> Result<Box<dyn Keyboard>, RestartError> {
    #[cfg(windows)]
    {
        Ok(Box::new(imp::SystemKeyboard))
    }

    #[cfg(not(windows))]
    {
        Err(RestartError::Integration {
            subsystem: "keyboard",
            reason: "no keyboard backend on this platform".to_string(),
        })
    }
}

// ── Windows implementation ────────────────────────────────────────────────────

#[cfg(windows)]
mod imp {
    use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

    use super::KeyCode;
    use crate::host::Keyboard;

    pub struct SystemKeyboard;

    impl Keyboard for SystemKeyboard {
        fn is_down(&self, key: KeyCode) -> bool {
            // High bit set = key currently down.
            let state = unsafe { GetAsyncKeyState(key.0 as i32) };
            (state as u16 & 0x8000) != 0
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
