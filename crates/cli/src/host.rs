use std::{
    io,
    path::Path,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use burrow_engine::{HostError, Notice, RecordId, WindowHost, WindowId};
use burrow_fs::{DirEntries, FileEntry, Filesystem, OsFilesystem};
use log::{debug, info};
use parking_lot::Mutex;

/// A headless host: windows are log lines, notices go to stderr.
#[derive(Default)]
pub struct ConsoleHost {
    titles: Mutex<Vec<(WindowId, String)>>,
    redraws: AtomicUsize,
    quit: AtomicBool,
}

impl ConsoleHost {
    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::Relaxed)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    pub fn title(&self, window: WindowId) -> Option<String> {
        self.titles
            .lock()
            .iter()
            .rev()
            .find(|(w, _)| *w == window)
            .map(|(_, t)| t.clone())
    }
}

impl WindowHost for ConsoleHost {
    fn create_window(&self, window: WindowId, directory: &Path, shared: bool) -> Result<(), HostError> {
        info!(
            "[host] window {window} on {} ({})",
            directory.display(),
            if shared { "shared" } else { "owned" }
        );
        Ok(())
    }

    fn set_title(&self, window: WindowId, title: &str) {
        debug!("[host] window {window}: {title}");
        self.titles.lock().push((window, title.to_owned()));
    }

    fn request_redraw(&self, _window: WindowId, _record: Option<RecordId>) {
        self.redraws.fetch_add(1, Ordering::Relaxed);
    }

    fn destroy_window(&self, window: WindowId) {
        info!("[host] window {window} destroyed");
    }

    fn quit(&self) {
        debug!("[host] last window closed");
        self.quit.store(true, Ordering::Release);
    }

    fn report(&self, window: Option<WindowId>, notice: &Notice) {
        match window {
            Some(w) => eprintln!("[{:?}] window {w}: {}", notice.kind, notice.message),
            None => eprintln!("[{:?}] {}", notice.kind, notice.message),
        }
    }
}

/// The OS filesystem, counting directory listings.
pub struct CountingFilesystem {
    inner: OsFilesystem,
    reads: AtomicUsize,
}

impl CountingFilesystem {
    pub fn new(dot_entries: bool) -> Self {
        Self {
            inner: OsFilesystem::new(dot_entries),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl Filesystem for CountingFilesystem {
    fn read_dir(&self, dir: &Path) -> io::Result<DirEntries> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.inner.read_dir(dir)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.inner.rename(from, to)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileEntry> {
        self.inner.metadata(path)
    }

    fn max_name_len(&self, dir: &Path) -> usize {
        self.inner.max_name_len(dir)
    }
}
