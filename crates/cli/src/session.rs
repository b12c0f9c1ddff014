use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use anyhow::{Context, Result};
use burrow_engine::{Browser, FillStats, WindowId};
use burrow_runtime::BrowserConfig;
use log::{debug, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use crate::host::{ConsoleHost, CountingFilesystem};

const POLL: Duration = Duration::from_millis(50);

/// The UI thread of a command-line run: one browser, its event loop and
/// the interrupt flag.
pub struct Session {
    pub browser: Browser,
    pub host: Arc<ConsoleHost>,
    pub fs: Arc<CountingFilesystem>,
    shutdown: Arc<AtomicBool>,
    closing: bool,
}

impl Session {
    pub fn new(config: BrowserConfig) -> Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));

        // Handlers only set the flag; the event loop closes the windows.
        for sig in [SIGINT, SIGTERM] {
            flag::register(sig, Arc::clone(&shutdown))
                .with_context(|| format!("Failed to register signal handler for {sig}"))?;
        }

        let host = Arc::new(ConsoleHost::default());
        let fs = Arc::new(CountingFilesystem::new(config.dot_entries));
        let browser = Browser::new(fs.clone(), host.clone(), config);

        Ok(Self {
            browser,
            host,
            fs,
            shutdown,
            closing: false,
        })
    }

    /// Run the event loop until `window`'s population task reports back.
    ///
    /// Returns `None` when the window was closed, by an interrupt or
    /// otherwise, before it finished filling.
    pub fn wait(&mut self, window: WindowId) -> Result<Option<FillStats>> {
        loop {
            if !self.closing && self.shutdown.load(Ordering::Relaxed) {
                info!("Interrupted; closing all windows.");
                self.closing = true;
                self.browser.close_all();
            }

            if self.browser.window(window).is_none() {
                return Ok(None);
            }

            let Some(event) = self.browser.recv_event(Some(POLL)) else {
                continue;
            };

            let done = event.window() == window;
            let result = self.browser.handle_event(event);
            if !done {
                continue;
            }

            if self.browser.shutdown_requested(window) {
                return Ok(None);
            }
            return result
                .map(Some)
                .with_context(|| format!("population of window {window} failed"));
        }
    }

    /// Close every window and drain the remaining completion events.
    pub fn finish(mut self) {
        self.closing = true;
        self.browser.close_all();

        while self.browser.live_windows() > 0 {
            if let Some(event) = self.browser.recv_event(Some(POLL)) {
                debug!("[session] late completion for window {}", event.window());
                let _ = self.browser.handle_event(event);
            }
        }
        debug!("[session] done, quit={}", self.host.quit_requested());
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
