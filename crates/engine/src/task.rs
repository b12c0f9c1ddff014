use std::thread;

use burrow_fs::Filesystem;
use burrow_runtime::BrowserConfig;
use log::warn;
use serde::Serialize;

use crate::{
    cancel::CancelToken,
    error::EngineError,
    host::{Notice, WindowHost},
    window::WindowId,
};

/// Everything a population task borrows from the browser while it runs.
pub struct TaskContext<'a> {
    pub fs: &'a dyn Filesystem,
    pub host: &'a dyn WindowHost,
    pub config: &'a BrowserConfig,
    pub token: &'a CancelToken,
    pub window: WindowId,
}

impl TaskContext<'_> {
    #[inline]
    pub fn cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Give the UI thread a chance to run between directory levels.
    pub fn pause(&self) {
        if self.config.yield_pause.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(self.config.yield_pause);
        }
    }

    /// Log `err` and show it to the user; the task carries on.
    pub fn report(&self, err: &EngineError) {
        warn!("[task] window {}: {err}", self.window);
        self.host.report(Some(self.window), &Notice::from(err));
    }
}

/// What a finished population task did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FillStats {
    /// Directory levels visited.
    pub directories: usize,
    /// Nodes inserted into the target store.
    pub records: usize,
    /// Directories whose listing could not be read.
    pub skipped_dirs: usize,
    /// The task stopped at a cancellation point.
    pub cancelled: bool,
}
