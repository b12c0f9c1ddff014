mod config;
pub mod logging;

pub use config::{
    BATCH_SIZE_ENV, BrowserConfig, DEFAULT_BATCH_SIZE, DEFAULT_YIELD_PAUSE, DOT_ENTRIES_ENV,
    PROGRAM_NAME, PROGRAM_TITLE, YIELD_MS_ENV, default_start_dir, normalize_directory,
};

pub use logging::init;
