use std::{
    env, io,
    path::{Component, Path, PathBuf},
    time::Duration,
};

pub const PROGRAM_NAME: &str = "burrow";
pub const PROGRAM_TITLE: &str = "burrow";
pub const PROGRAM_LOG_LEVEL: &str = "BURROW_LOG_LEVEL";

/// Number of directory entries requested from the filesystem per batch.
pub const BATCH_SIZE_ENV: &str = "BURROW_BATCH_SIZE";
/// Pause, in milliseconds, a population task takes after each directory level.
pub const YIELD_MS_ENV: &str = "BURROW_YIELD_MS";
/// Set to `0`/`false` to stop listing synthesized `.` and `..` entries.
pub const DOT_ENTRIES_ENV: &str = "BURROW_DOT_ENTRIES";

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_YIELD_PAUSE: Duration = Duration::from_millis(5);

/// Tunables shared by every population task of a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Entries fetched and inserted per filesystem call.
    pub batch_size: usize,
    /// Pause after each directory level. Zero only yields the timeslice.
    pub yield_pause: Duration,
    /// Whether every listed directory starts with `.` and `..` entries.
    pub dot_entries: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            yield_pause: DEFAULT_YIELD_PAUSE,
            dot_entries: true,
        }
    }
}

impl BrowserConfig {
    /// Defaults overridden by the `BURROW_*` environment variables.
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(n) = env_parse::<usize>(BATCH_SIZE_ENV).filter(|n| *n > 0) {
            cfg.batch_size = n;
        }
        if let Some(ms) = env_parse::<u64>(YIELD_MS_ENV) {
            cfg.yield_pause = Duration::from_millis(ms);
        }
        if let Ok(val) = env::var(DOT_ENTRIES_ENV) {
            cfg.dot_entries = !(val == "0" || val.eq_ignore_ascii_case("false"));
        }

        cfg
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

/// Directory a browser opens when none is given.
pub fn default_start_dir() -> PathBuf {
    dirs::home_dir()
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Make `dir` absolute and lexically normalized, without a trailing separator.
///
/// Relative paths are resolved against the current directory. `.` components
/// are dropped and `..` pops the previous component; symlinks are not resolved.
pub fn normalize_directory(dir: &Path) -> io::Result<PathBuf> {
    let absolute = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        env::current_dir()?.join(dir)
    };

    let mut out = PathBuf::new();
    for comp in absolute.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }

    Ok(out)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
