use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Severity levels for engine diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rotation policy for the in-memory log segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRotationPolicy {
    pub max_bytes: usize,
    pub max_files: usize,
}

impl Default for LogRotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 1 << 20,
            max_files: 5,
        }
    }
}

/// One rotated segment of log lines.
#[derive(Debug, Default, Clone)]
pub struct LogFile {
    lines: Vec<String>,
    bytes_written: usize,
}

impl LogFile {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }
}

#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    ts: u64,
    level: &'a str,
    component: &'a str,
    event: &'a str,
    detail: &'a str,
}

/// JSON-line logger with level filtering and deterministic rotation.
///
/// The engine logs structured events (capture, suppression, match outcome,
/// timeout, eviction, persistence failure); the hosting collaborator decides
/// where the lines ultimately go.
#[derive(Debug, Clone)]
pub struct JsonLineLogger {
    policy: LogRotationPolicy,
    current_level: LogLevel,
    rotated: VecDeque<LogFile>,
    active: LogFile,
}

impl Default for JsonLineLogger {
    fn default() -> Self {
        Self::new(LogRotationPolicy::default())
    }
}

impl JsonLineLogger {
    pub fn new(policy: LogRotationPolicy) -> Self {
        Self {
            policy,
            current_level: LogLevel::Info,
            rotated: VecDeque::new(),
            active: LogFile::default(),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.current_level
    }

    /// Applies a dynamic level override.
    pub fn set_level(&mut self, level: LogLevel) {
        self.current_level = level;
    }

    /// Emits one JSON-line entry; entries below the current level are dropped.
    pub fn log(
        &mut self,
        ts_ms: u64,
        level: LogLevel,
        component: &str,
        event: &str,
        detail: &str,
    ) -> Result<(), LoggingError> {
        if level < self.current_level {
            return Ok(());
        }
        let record = LogRecord {
            ts: ts_ms,
            level: level.as_str(),
            component,
            event,
            detail,
        };
        let line = serde_json::to_string(&record)?;
        self.rotate_if_needed(line.len());
        self.active.bytes_written = self.active.bytes_written.saturating_add(line.len());
        self.active.lines.push(line);
        Ok(())
    }

    /// Rotated segments followed by the active one.
    pub fn files(&self) -> impl Iterator<Item = &LogFile> {
        self.rotated.iter().chain(std::iter::once(&self.active))
    }

    /// Every retained line, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.files()
            .flat_map(|file| file.lines().iter().map(String::as_str))
    }

    fn rotate_if_needed(&mut self, next_line_len: usize) {
        if self.active.bytes_written + next_line_len <= self.policy.max_bytes {
            return;
        }
        if !self.active.lines.is_empty() {
            self.rotated.push_back(std::mem::take(&mut self.active));
            while self.rotated.len() > self.policy.max_files {
                self.rotated.pop_front();
            }
        }
        self.active = LogFile::default();
    }
}

/// Errors surfaced while serializing log records.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),
}
