pub enum ShellEvent {
    /// One complete line from the host's log output.
    LogLine(String),
    /// The game finished a fresh load; lifecycle state starts over.
    Reload,
    /// The host process is going away; cancel any countdown and exit.
    Shutdown,
}
