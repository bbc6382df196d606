/// Follows an on-disk engine log and forwards each appended line.
///
/// The host rewrites its log on every launch, so a file that shrinks or is
/// recreated is read again from the start.
use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::event::ShellEvent;

/// Incremental reader that returns only complete lines not yet seen.
#[derive(Debug)]
pub struct LineReader {
    path: PathBuf,
    offset: u64,
    partial: Vec<u8>,
}

impl LineReader {
    /// Starts at the current end of `path`, skipping history. A missing file
    /// is read from the start once it appears.
    pub fn at_end(path: &Path) -> Self {
        let offset = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        Self {
            path: path.to_path_buf(),
            offset,
            partial: Vec::new(),
        }
    }

    pub fn from_start(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            offset: 0,
            partial: Vec::new(),
        }
    }

    fn rewind(&mut self) {
        self.offset = 0;
        self.partial.clear();
    }

    /// Reads whatever was appended since the last call. A trailing line
    /// without a newline is held back until it is completed.
    pub fn read_new_lines(&mut self) -> Result<Vec<String>> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to open log file: {}", self.path.display()))
            }
        };

        let len = file
            .metadata()
            .with_context(|| format!("Failed to stat log file: {}", self.path.display()))?
            .len();
        if len < self.offset {
            info!("log file was truncated; reading from the start");
            self.rewind();
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .with_context(|| format!("Failed to read log file: {}", self.path.display()))?;
        self.offset += buf.len() as u64;
        self.partial.extend_from_slice(&buf);

        let mut lines = Vec::new();
        while let Some(pos) = self.partial.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            lines.push(line.trim_end_matches(['\r', '\n']).to_string());
        }
        Ok(lines)
    }
}

/// Watches the parent directory of `path` and sends a
/// [`ShellEvent::LogLine`] for every line appended to the file.
///
/// Runs until the receiving side of `tx` is dropped or the watcher fails to
/// start.
pub async fn tail(path: PathBuf, tx: mpsc::Sender<ShellEvent>) {
    let (watch_tx, mut watch_rx) = mpsc::channel::<notify::Event>(64);

    let mut watcher = match RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                let _ = watch_tx.blocking_send(event);
            }
        },
        NotifyConfig::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            warn!("failed to create log file watcher: {e}");
            return;
        }
    };

    // Watch the directory so a log recreated on relaunch is still seen.
    let watch_dir = match path.parent() {
        Some(d) => d.to_path_buf(),
        None => {
            warn!("log path has no parent directory: {}", path.display());
            return;
        }
    };

    if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
        warn!("failed to watch log directory {}: {e}", watch_dir.display());
        return;
    }
    info!("following {}", path.display());

    let mut reader = LineReader::at_end(&path);
    // Only the parent is watched, and the watcher may report canonical paths.
    let file_name = path.file_name().map(|n| n.to_os_string());

    while let Some(event) = watch_rx.recv().await {
        if !event.paths.iter().any(|p| p.file_name() == file_name.as_deref()) {
            continue;
        }
        match event.kind {
            notify::EventKind::Create(_) => reader = LineReader::from_start(&path),
            notify::EventKind::Modify(_) => {}
            _ => continue,
        }

        let lines = match reader.read_new_lines() {
            Ok(lines) => lines,
            Err(e) => {
                warn!("{e:#}");
                continue;
            }
        };
        for line in lines {
            if tx.send(ShellEvent::LogLine(line)).await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn append(path: &Path, text: &str) {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        f.write_all(text.as_bytes()).unwrap();
    }

    #[test]
    fn reads_only_new_complete_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LogOutput.log");
        append(&path, "old line\n");

        let mut reader = LineReader::at_end(&path);
        assert!(reader.read_new_lines().unwrap().is_empty());

        append(&path, "first\nsecond\n");
        assert_eq!(reader.read_new_lines().unwrap(), ["first", "second"]);
        assert!(reader.read_new_lines().unwrap().is_empty());
    }

    #[test]
    fn partial_line_is_held_until_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LogOutput.log");
        let mut reader = LineReader::from_start(&path);

        append(&path, "[Info   : Unity Log] started ");
        assert!(reader.read_new_lines().unwrap().is_empty());
        append(&path, "host!\r\n");
        assert_eq!(
            reader.read_new_lines().unwrap(),
            ["[Info   : Unity Log] started host!"]
        );
    }

    #[test]
    fn missing_file_yields_nothing_then_reads_from_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LogOutput.log");
        let mut reader = LineReader::at_end(&path);
        assert!(reader.read_new_lines().unwrap().is_empty());

        append(&path, "created\n");
        assert_eq!(reader.read_new_lines().unwrap(), ["created"]);
    }

    #[test]
    fn truncated_file_is_reread_from_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LogOutput.log");
        append(&path, "a long line from the previous launch\n");
        let mut reader = LineReader::at_end(&path);

        std::fs::write(&path, "new\n").unwrap();
        assert_eq!(reader.read_new_lines().unwrap(), ["new"]);
    }

    #[test]
    fn multibyte_text_split_across_reads_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LogOutput.log");
        let mut reader = LineReader::from_start(&path);

        let text = "Lobby \u{00e9}t\u{00e9}\n".as_bytes().to_vec();
        let (head, tail) = text.split_at(7); // inside the first 'é'
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(head)
            .unwrap();
        assert!(reader.read_new_lines().unwrap().is_empty());
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(tail)
            .unwrap();
        assert_eq!(reader.read_new_lines().unwrap(), ["Lobby \u{00e9}t\u{00e9}"]);
    }
}
