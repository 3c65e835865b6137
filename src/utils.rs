use anyhow::Result;
use std::io::Write;
use log::{LevelFilter, Record};
use std::fs::{File, OpenOptions};
use std::path::Path;
use chrono::{DateTime, Local};

// The terminal is in raw mode on the alternate screen while the UI runs, so
// log records go to a file rather than stdout.
pub struct FileLogger {
    log_file: File,
}

impl FileLogger {
    pub fn new(log_file_path: &Path) -> Result<Self> {
        let log_file = OpenOptions::new().create(true).append(true).open(log_file_path)?;
        Ok(FileLogger { log_file })
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let now: DateTime<Local> = Local::now();
        let log_message = format!(
            "[{}] {} [{}:{}] {}\n",
            now.format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args()
        );

        // `&File` implements `Write`, so no clone or lock is needed.
        let _ = (&self.log_file).write_all(log_message.as_bytes());
    }

    fn flush(&self) {
        let _ = (&self.log_file).flush();
    }
}

pub fn setup_logging(log_file: &Path, level: LevelFilter) -> Result<()> {
    let logger = FileLogger::new(log_file)?;
    log::set_boxed_logger(Box::new(logger))
        .map(|()| log::set_max_level(level))?;

    log::info!("Logging initialized at level: {}", level);
    log::info!("App version: {} ({})", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_NAME"));

    Ok(())
}

/// Label shown next to a message sent now, e.g. "14:32".
pub fn time_label(now: DateTime<Local>) -> String {
    now.format("%H:%M").to_string()
}
