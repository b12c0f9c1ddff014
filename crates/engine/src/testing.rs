//! Test doubles shared by the engine's unit tests.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use burrow_fs::{DirEntries, FileDate, FileEntry, FileTime, Filesystem, OsFilesystem};
use burrow_runtime::BrowserConfig;
use parking_lot::Mutex;

use crate::{
    browser::Browser,
    cancel::CancelToken,
    host::{HostError, Notice, WindowHost},
    record::{FileRecord, RecordId},
    task::TaskContext,
    window::WindowId,
};

/// A host that remembers every call.
#[derive(Default)]
pub struct RecordingHost {
    pub created: Mutex<Vec<(WindowId, PathBuf, bool)>>,
    pub titles: Mutex<Vec<(WindowId, String)>>,
    pub redraws: Mutex<Vec<(WindowId, Option<RecordId>)>>,
    pub destroyed: Mutex<Vec<WindowId>>,
    pub notices: Mutex<Vec<(Option<WindowId>, Notice)>>,
    pub quit: AtomicBool,
    pub refuse_create: AtomicBool,
    /// Cancelled on the first redraw request, to stop a task mid-way.
    pub cancel_on_redraw: Mutex<Option<CancelToken>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last_title(&self, window: WindowId) -> Option<String> {
        self.titles
            .lock()
            .iter()
            .rev()
            .find(|(w, _)| *w == window)
            .map(|(_, t)| t.clone())
    }

    pub fn redraws_for(&self, window: WindowId) -> Vec<Option<RecordId>> {
        self.redraws
            .lock()
            .iter()
            .filter(|(w, _)| *w == window)
            .map(|(_, r)| *r)
            .collect()
    }

    pub fn notice_count(&self) -> usize {
        self.notices.lock().len()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }
}

impl WindowHost for RecordingHost {
    fn create_window(&self, window: WindowId, directory: &Path, shared: bool) -> Result<(), HostError> {
        if self.refuse_create.load(Ordering::SeqCst) {
            return Err(HostError("no more windows".into()));
        }
        self.created
            .lock()
            .push((window, directory.to_path_buf(), shared));
        Ok(())
    }

    fn set_title(&self, window: WindowId, title: &str) {
        self.titles.lock().push((window, title.to_owned()));
    }

    fn request_redraw(&self, window: WindowId, record: Option<RecordId>) {
        self.redraws.lock().push((window, record));
        if let Some(token) = self.cancel_on_redraw.lock().as_ref() {
            token.cancel();
        }
    }

    fn destroy_window(&self, window: WindowId) {
        self.destroyed.lock().push(window);
    }

    fn quit(&self) {
        self.quit.store(true, Ordering::SeqCst);
    }

    fn report(&self, window: Option<WindowId>, notice: &Notice) {
        self.notices.lock().push((window, notice.clone()));
    }
}

/// Counts the calls made through it to the real filesystem.
#[derive(Default)]
pub struct CountingFs {
    inner: OsFilesystem,
    pub reads: AtomicUsize,
    pub renames: AtomicUsize,
}

impl CountingFs {
    pub fn new(dot_entries: bool) -> Arc<Self> {
        Arc::new(CountingFs {
            inner: OsFilesystem::new(dot_entries),
            reads: AtomicUsize::new(0),
            renames: AtomicUsize::new(0),
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Filesystem for CountingFs {
    fn read_dir(&self, dir: &Path) -> io::Result<DirEntries> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_dir(dir)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.renames.fetch_add(1, Ordering::SeqCst);
        self.inner.rename(from, to)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileEntry> {
        self.inner.metadata(path)
    }
}

/// No pause between levels, no dot entries, small batches.
pub fn test_config() -> BrowserConfig {
    BrowserConfig {
        batch_size: 3,
        yield_pause: Duration::ZERO,
        dot_entries: false,
    }
}

pub fn task_ctx<'a>(
    fs: &'a dyn Filesystem,
    host: &'a dyn WindowHost,
    config: &'a BrowserConfig,
    token: &'a CancelToken,
) -> TaskContext<'a> {
    TaskContext {
        fs,
        host,
        config,
        token,
        window: WindowId(1),
    }
}

pub fn browser(fs: Arc<dyn Filesystem>, host: Arc<RecordingHost>) -> Browser {
    Browser::new(fs, host, test_config())
}

pub fn file_record(name: &str, scan_index: u32) -> FileRecord {
    dated_record(name, scan_index, FileDate::new(2024, 1, 1), FileTime::new(12, 0, 0))
}

pub fn dir_record(name: &str, scan_index: u32) -> FileRecord {
    let mut r = file_record(name, scan_index);
    r.attrs = crate::flags::AttrFlags::DIRECTORY;
    r.icon = crate::record::IconHandle::FOLDER;
    r.size = 0;
    r
}

pub fn dated_record(name: &str, scan_index: u32, date: FileDate, time: FileTime) -> FileRecord {
    FileRecord::from_entry(
        FileEntry {
            name: name.to_owned(),
            size: 10,
            date,
            time,
            is_dir: false,
            is_symlink: false,
            is_special: false,
            readonly: false,
            hidden_os: false,
        },
        scan_index,
    )
}

/// Creates:
///
/// ```text
/// root/
///   b.txt
///   a.txt
///   docs/
///     readme.md
///     notes/
///       todo.txt
///   src/
///     main.rs
/// ```
pub fn sample_tree(root: &Path) {
    fs::create_dir_all(root.join("docs/notes")).expect("create docs/notes");
    fs::create_dir_all(root.join("src")).expect("create src");
    fs::write(root.join("b.txt"), b"bbbb").expect("write b.txt");
    fs::write(root.join("a.txt"), b"a").expect("write a.txt");
    fs::write(root.join("docs/readme.md"), b"# readme").expect("write readme");
    fs::write(root.join("docs/notes/todo.txt"), b"todo").expect("write todo");
    fs::write(root.join("src/main.rs"), b"fn main() {}").expect("write main.rs");
}

/// File names on disk below `dir`, in enumeration order.
pub fn listed_names(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .expect("read_dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect()
}

pub const WAIT: Duration = Duration::from_secs(10);

/// Handle events until no window is still being filled.
pub fn settle(b: &Browser) {
    let deadline = Instant::now() + WAIT;
    while b
        .windows()
        .into_iter()
        .any(|id| b.window(id).is_some_and(|w| w.fill_in_progress()))
    {
        assert!(Instant::now() < deadline, "windows never settled");
        if let Some(event) = b.recv_event(Some(Duration::from_millis(50))) {
            let _ = b.handle_event(event);
        }
    }
}
