use std::{
    io::{self, Write},
    sync::OnceLock,
    thread,
};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::PROGRAM_LOG_LEVEL;

enum LogTarget {
    Stderr,
}

/// Stderr logger shared by every burrow binary.
///
/// Population tasks run on named threads, so each line carries the thread
/// name: `2026-01-01 12:00:00.000 WARN (fill-3) [burrow_engine::walker] msg`.
pub struct Logger {
    level: Level,
    target: LogTarget,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(record);
        match &self.target {
            LogTarget::Stderr => {
                // A closed stderr is not worth failing over.
                let _ = writeln!(io::stderr().lock(), "{line}");
            }
        }
    }

    fn flush(&self) {
        match &self.target {
            LogTarget::Stderr => {
                let _ = io::stderr().flush();
            }
        }
    }
}

fn format_line(record: &Record<'_>) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let current = thread::current();
    let thread_name = current.name().unwrap_or("-");

    format!(
        "{} {} ({}) [{}] {}",
        timestamp,
        record.level(),
        thread_name,
        record.target(),
        record.args()
    )
}

/// Level named by `BURROW_LOG_LEVEL`, `warn` when unset, unparseable or `off`.
fn get_level_from_env() -> Level {
    std::env::var(PROGRAM_LOG_LEVEL)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(Level::Warn)
}

pub fn init() -> Result<(), SetLoggerError> {
    init_with_level(get_level_from_env())
}

/// Install the logger at `level`. Only the first call in a process has any effect.
pub fn init_with_level(level: Level) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    // set_max_level must agree with the level the logger was built with,
    // so only the call that builds it may set either.
    let init_call = LOGGER.get().is_none();

    let logger = LOGGER.get_or_init(|| Logger {
        level,
        target: LogTarget::Stderr,
    });

    if init_call {
        log::set_logger(logger)?;
        log::set_max_level(level.to_level_filter());
    }

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
