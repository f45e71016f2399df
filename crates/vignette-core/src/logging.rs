use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log severity level, mirrored from tracing for display in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.pad(name)
    }
}

/// A single captured log record.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

/// Shared ring buffer of recent log entries, read by the viewer's log tail.
pub type LogBuffer = Arc<Mutex<VecDeque<LogEntry>>>;

/// Create a new shared log buffer with a given capacity.
pub fn new_log_buffer(capacity: usize) -> LogBuffer {
    Arc::new(Mutex::new(VecDeque::with_capacity(capacity)))
}

/// Copy out the newest `count` entries, oldest first.
pub fn tail(buffer: &LogBuffer, count: usize) -> Vec<LogEntry> {
    match buffer.lock() {
        Ok(buf) => {
            let skip = buf.len().saturating_sub(count);
            buf.iter().skip(skip).cloned().collect()
        }
        Err(_) => Vec::new(),
    }
}

/// Return the log directory path.
///
/// Precedence: `VIGNETTE_LOG_DIR` env var > platform default.
/// macOS: `~/Library/Logs/vignette/`
/// Linux: `$XDG_DATA_HOME/vignette/logs/` or `~/.local/share/vignette/logs/`
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("VIGNETTE_LOG_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            return home.join("Library").join("Logs").join("vignette");
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        if let Some(data) = dirs::data_dir() {
            return data.join("vignette").join("logs");
        }
    }

    PathBuf::from("logs")
}

const LOG_FILE_PREFIX: &str = "vignette.log";
const MAX_BUFFERED_LINES: usize = 500;
const LOG_RETENTION_DAYS: u64 = 7;

/// Remove rolled log files older than `max_age_days`.
///
/// Only files named with [`LOG_FILE_PREFIX`] are considered, so a shared
/// directory keeps its unrelated files.
fn cleanup_old_logs(log_path: &Path, max_age_days: u64) {
    let cutoff = SystemTime::now() - Duration::from_secs(max_age_days * 86400);
    let Ok(entries) = std::fs::read_dir(log_path) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let modified = entry.metadata().and_then(|meta| meta.modified());
        if matches!(modified, Ok(time) if time < cutoff) {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// A tracing layer that pushes log entries into a shared ring buffer.
struct BufferLayer {
    buffer: LogBuffer,
    max_lines: usize,
}

impl<S: tracing::Subscriber> Layer<S> for BufferLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let entry = LogEntry {
            level: event.metadata().level().into(),
            target: event.metadata().target().to_string(),
            message: visitor.finish(),
        };

        if let Ok(mut buf) = self.buffer.lock() {
            if buf.len() >= self.max_lines {
                buf.pop_front();
            }
            buf.push_back(entry);
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match self.message {
            Some(msg) if self.fields.is_empty() => msg,
            Some(msg) => format!("{} {}", msg, self.fields.join(" ")),
            None => self.fields.join(" "),
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

/// Initialize the logging subsystem. Returns the shared buffer of recent entries.
///
/// Filter controlled by `VIGNETTE_LOG` or `RUST_LOG` (default: `info`).
/// File output: daily rotation in `log_dir()`, 7-day retention.
pub fn init() -> LogBuffer {
    let buffer = new_log_buffer(MAX_BUFFERED_LINES);

    let filter = EnvFilter::try_from_env("VIGNETTE_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_path) {
        eprintln!(
            "warning: failed to create log directory {:?}: {}",
            log_path, e
        );
    }

    cleanup_old_logs(&log_path, LOG_RETENTION_DAYS);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(rolling::daily(&log_path, LOG_FILE_PREFIX))
        .with_ansi(false)
        .with_target(true);

    let buffer_layer = BufferLayer {
        buffer: buffer.clone(),
        max_lines: MAX_BUFFERED_LINES,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(buffer_layer)
        .init();

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // Serialize env-mutating tests to avoid data races.
    static ENV_LOCK: StdMutex<()> = StdMutex::new(());

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            level: LogLevel::Info,
            target: "test".into(),
            message: message.into(),
        }
    }

    #[test]
    fn log_dir_respects_env_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        let original = std::env::var("VIGNETTE_LOG_DIR").ok();

        unsafe { std::env::set_var("VIGNETTE_LOG_DIR", "/tmp/vignette-test-logs") };
        assert_eq!(log_dir(), PathBuf::from("/tmp/vignette-test-logs"));

        match original {
            Some(v) => unsafe { std::env::set_var("VIGNETTE_LOG_DIR", v) },
            None => unsafe { std::env::remove_var("VIGNETTE_LOG_DIR") },
        }
    }

    #[test]
    fn tail_returns_newest_entries_in_order() {
        let buf = new_log_buffer(8);
        {
            let mut b = buf.lock().unwrap();
            for i in 0..5 {
                b.push_back(entry(&format!("msg {i}")));
            }
        }
        let newest: Vec<String> = tail(&buf, 2).into_iter().map(|e| e.message).collect();
        assert_eq!(newest, vec!["msg 3", "msg 4"]);
        assert_eq!(tail(&buf, 10).len(), 5);
    }

    #[test]
    fn buffer_layer_caps_at_max() {
        use tracing_subscriber::layer::SubscriberExt;

        let buffer = new_log_buffer(2);
        let subscriber = tracing_subscriber::registry().with(BufferLayer {
            buffer: buffer.clone(),
            max_lines: 2,
        });
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("first");
            tracing::warn!(phase = "loop", "second");
            tracing::info!("third");
        });

        let entries = tail(&buffer, 10);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(entries[0].message, "second phase=loop");
        assert_eq!(entries[1].message, "third");
    }

    #[test]
    fn log_level_display() {
        assert_eq!(format!("{}", LogLevel::Trace), "TRACE");
        assert_eq!(format!("{}", LogLevel::Warn), "WARN");
        assert_eq!(format!("{:5}|", LogLevel::Info), "INFO |");
    }

    #[test]
    fn message_visitor_fields_without_message() {
        let v = MessageVisitor {
            message: None,
            fields: vec!["a=1".into(), "b=2".into()],
        };
        assert_eq!(v.finish(), "a=1 b=2");
    }

    #[test]
    fn message_visitor_empty() {
        assert_eq!(MessageVisitor::default().finish(), "");
    }

    #[test]
    fn cleanup_old_logs_removes_stale_files() {
        let tmp = std::env::temp_dir().join("vignette-test-cleanup");
        let _ = std::fs::create_dir_all(&tmp);

        let rolled_a = tmp.join("vignette.log.2025-01-01");
        let rolled_b = tmp.join("vignette.log.2025-01-02");
        let other = tmp.join("other.txt");
        std::fs::write(&rolled_a, "a").unwrap();
        std::fs::write(&rolled_b, "b").unwrap();
        std::fs::write(&other, "c").unwrap();

        // max_age_days=0 means cutoff is "now", so all matching files get cleaned
        cleanup_old_logs(&tmp, 0);
        assert!(!rolled_a.exists());
        assert!(!rolled_b.exists());
        assert!(other.exists(), "unrelated file should be preserved");

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
