/// File-backed logger for the `log` facade.
///
/// The terminal belongs to the renderer (raw mode, alternate screen), so
/// diagnostics go to a file instead of stderr. If the file can't be opened
/// logging is simply off.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};

static LOGGER: OnceLock<FileLogger> = OnceLock::new();

struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(&Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(), record);
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn format_line(timestamp: &str, record: &Record) -> String {
    format!("[{}] [{:<5}] {}: {}\n", timestamp, record.level(), record.target(), record.args())
}

/// Install the file logger. Returns false if the file couldn't be opened
/// or a logger is already installed.
pub fn init(path: &Path, level: LevelFilter) -> bool {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    if LOGGER.set(FileLogger { file: Mutex::new(file), level }).is_err() {
        return false;
    }
    match LOGGER.get() {
        Some(logger) if log::set_logger(logger).is_ok() => {
            log::set_max_level(level);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn line_layout() {
        let line = format_line(
            "2026-01-01 00:00:00.000",
            &Record::builder()
                .args(format_args!("midnight"))
                .level(Level::Info)
                .target("newyear_card::sim::countdown")
                .build(),
        );
        assert_eq!(line, "[2026-01-01 00:00:00.000] [INFO ] newyear_card::sim::countdown: midnight\n");
    }
}
