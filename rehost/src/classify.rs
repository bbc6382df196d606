/// Classification of raw engine log lines into lifecycle events.
///
/// The marker strings are emitted verbatim by the game build this crate
/// targets. They live in [`Markers`] so a different build can supply its own
/// without touching the state machine.
pub const HOST_STARTED_MARKER: &str = "[Info   : Unity Log] started host!";
pub const PEER_LOAD_COMPLETE_MARKER: &str = "[Info   : Unity Log] Has beta save data:";

/// A log line's meaning to the restart state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    /// The local player began hosting a session.
    HostStarted,
    /// A joining peer finished its load sequence.
    PeerLoadComplete,
    Irrelevant,
}

/// The two substrings that identify lifecycle events in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub host_started: String,
    pub peer_load_complete: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            host_started: HOST_STARTED_MARKER.to_string(),
            peer_load_complete: PEER_LOAD_COMPLETE_MARKER.to_string(),
        }
    }
}

/// Classifies a single log line by case-sensitive substring match.
///
/// A line carrying both markers is reported as [`LogEvent::HostStarted`].
pub fn classify(line: &str, markers: &Markers) -> LogEvent {
    if line.contains(markers.host_started.as_str()) {
        LogEvent::HostStarted
    } else if line.contains(markers.peer_load_complete.as_str()) {
        LogEvent::PeerLoadComplete
    } else {
        LogEvent::Irrelevant
    }
}

/// Advisory check used only for debug output: does the line mention hosting?
///
/// Matches "host" only at the start of a word, so "ghost" and similar
/// compounds are not reported.
pub fn is_host_related(line: &str) -> bool {
    line.match_indices("host").any(|(i, _)| {
        line[..i]
            .chars()
            .next_back()
            .map_or(true, |prev| !prev.is_alphanumeric())
    })
}
