use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::Utc;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Keeps the file writer's background worker alive until [`flush`] is called.
static FILE_GUARD: OnceCell<Mutex<Option<WorkerGuard>>> = OnceCell::new();

const DEFAULT_FILTER: &str = "info";

/// `LogKind` represents the kind of logging: `stdout` or `logfile`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogKind {
    /// It logs to console, the default choice.
    Stdout,

    /// It logs on a file in the temp dir: xfm2ctl-<timestamp>.log
    File,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn log_file_name() -> String {
    format!("xfm2ctl-{}.log", Utc::now().timestamp())
}

fn init_file(dir: &Path) -> PathBuf {
    let filename = log_file_name();
    let path = dir.join(&filename);

    let appender = tracing_appender::rolling::never(dir, filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        FILE_GUARD.get_or_init(|| Mutex::new(None));
        if let Some(slot) = FILE_GUARD.get() {
            if let Ok(mut slot) = slot.lock() {
                *slot = Some(guard);
            }
        }
    }

    path
}

/// Installs the global `tracing` subscriber.
///
/// Returns the log file path for [`LogKind::File`]. Calling it a second time
/// is harmless: the first subscriber stays in place.
pub fn init_logger(kind: LogKind) -> Option<PathBuf> {
    match kind {
        LogKind::Stdout => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .try_init()
                .ok();
            None
        }
        LogKind::File => Some(init_file(&std::env::temp_dir())),
    }
}

/// Flushes any buffered file logs to disk.
///
/// The non-blocking writer only guarantees delivery once its worker guard is
/// dropped, so after this call nothing more reaches the file. Call it right
/// before the process exits. It is a no-op for stdout logging.
pub fn flush() {
    if let Some(slot) = FILE_GUARD.get() {
        if let Ok(mut slot) = slot.lock() {
            slot.take();
        }
    }
}
