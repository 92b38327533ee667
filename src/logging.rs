use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use serde::{Deserialize, Serialize};

/// Default maximum number of log lines to keep in memory
pub const DEFAULT_MAX_LOG_LINES: usize = 10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub job: Option<String>,
}

/// Panel activity and user notifications.
///
/// Every command the panel dispatches and every recovered failure ends up here,
/// so the presentation layer can show it without the error ever escaping as a fault.
pub struct LogManager {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    max_lines: usize,
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOG_LINES)
    }
}

impl LogManager {
    pub fn new(max_lines: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(max_lines.min(1024)))),
            max_lines,
        }
    }

    pub fn log(&self, level: LogLevel, message: &str, job: Option<&str>) {
        let now = chrono::Utc::now().to_rfc3339();
        let entry = LogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            level,
            message: message.to_string(),
            job: job.map(str::to_string),
        };

        match level {
            LogLevel::Info => tracing::info!(job = ?entry.job, "{}", entry.message),
            LogLevel::Warning => tracing::warn!(job = ?entry.job, "{}", entry.message),
            LogLevel::Error => tracing::error!(job = ?entry.job, "{}", entry.message),
        }

        // A poisoned lock only means another thread panicked mid-push; the deque is still usable.
        let mut logs = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        logs.push_back(entry);

        while logs.len() > self.max_lines {
            logs.pop_front();
        }
    }

    pub fn info(&self, message: &str, job: Option<&str>) {
        self.log(LogLevel::Info, message, job);
    }

    pub fn get_logs(&self, job: Option<&str>) -> Vec<LogEntry> {
        let logs = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match job {
            Some(name) => logs.iter().filter(|l| l.job.as_deref() == Some(name)).cloned().collect(),
            None => logs.iter().cloned().collect(),
        }
    }

    /// Most recent entry, if any.
    pub fn last(&self) -> Option<LogEntry> {
        let logs = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        logs.back().cloned()
    }
}

/// Read the last `max_lines` lines of the daemon log file.
///
/// A missing file yields an empty list; the daemon may simply not have written anything yet.
pub async fn read_log_tail(path: &Path, max_lines: usize) -> anyhow::Result<Vec<String>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(anyhow::anyhow!("Failed to read log file {}: {e}", path.display())),
    };

    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    Ok(lines[start..].iter().map(|l| l.to_string()).collect())
}
