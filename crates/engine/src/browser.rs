use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use burrow_fs::Filesystem;
use burrow_runtime::{BrowserConfig, PROGRAM_TITLE, default_start_dir, normalize_directory};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};

use crate::{
    error::{EngineError, Result},
    host::{Notice, WindowHost},
    rename,
    share::share_subtree,
    sort::SortKey,
    store::{NodeId, Ownership, RecordStore, RecordView, StoreId},
    task::{FillStats, TaskContext},
    walker::fill_store,
    window::{BrowserWindow, WindowBase, WindowId, WindowRegistry},
};

/// Messages population tasks send back to the UI thread.
#[derive(Debug)]
pub enum UiEvent {
    /// Sent exactly once per task, whether it finished, failed, was
    /// cancelled or panicked.
    PopulationComplete {
        window: WindowId,
        result: std::result::Result<FillStats, EngineError>,
    },
}

impl UiEvent {
    pub fn window(&self) -> WindowId {
        match self {
            UiEvent::PopulationComplete { window, .. } => *window,
        }
    }
}

struct Shared {
    fs: Arc<dyn Filesystem>,
    host: Arc<dyn WindowHost>,
    config: BrowserConfig,
    registry: WindowRegistry,
    next_window: AtomicU32,
    next_store: AtomicU32,
    events_tx: Sender<UiEvent>,
    events_rx: Receiver<UiEvent>,
}

/// The browser core driven by the UI thread.
///
/// All methods are meant to be called from one thread; population runs on
/// background threads and reports back through [`UiEvent`]s that the caller
/// feeds into [`Browser::handle_event`].
#[derive(Clone)]
pub struct Browser {
    inner: Arc<Shared>,
}

/// Sends the completion event when the task body is done, or a panic
/// notice if it never got that far.
struct CompletionGuard {
    tx: Sender<UiEvent>,
    window: WindowId,
    sent: bool,
}

impl CompletionGuard {
    fn complete(mut self, result: Result<FillStats>) {
        self.sent = true;
        self.send(result);
    }

    fn send(&self, result: Result<FillStats>) {
        let event = UiEvent::PopulationComplete {
            window: self.window,
            result,
        };
        if self.tx.send(event).is_err() {
            debug!("[browser] nobody is listening for window {}", self.window);
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if !self.sent {
            self.send(Err(EngineError::TaskPanicked));
        }
    }
}

impl Browser {
    pub fn new(fs: Arc<dyn Filesystem>, host: Arc<dyn WindowHost>, config: BrowserConfig) -> Self {
        let (events_tx, events_rx) = channel::unbounded();
        Browser {
            inner: Arc::new(Shared {
                fs,
                host,
                config,
                registry: WindowRegistry::new(),
                next_window: AtomicU32::new(1),
                next_store: AtomicU32::new(1),
                events_tx,
                events_rx,
            }),
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.inner.config
    }

    // ---- windows ---------------------------------------------------------

    /// Open a window on `directory` (the start directory when `None`) with a
    /// store of its own, and start walking it.
    pub fn open_window(&self, directory: Option<&Path>) -> Result<WindowId> {
        let result = self.try_open_window(directory);
        self.reported(None, result)
    }

    fn try_open_window(&self, directory: Option<&Path>) -> Result<WindowId> {
        let requested = directory.map_or_else(default_start_dir, Path::to_path_buf);
        let dir = normalize_directory(&requested).map_err(|source| EngineError::Directory {
            path: requested.clone(),
            source,
        })?;

        let store = RecordStore::owned(self.next_store_id());
        let id = self.create_window(Arc::new(WindowBase::Fixed(dir)), store, false)?;
        if let Err(err) = self.try_populate_new_store(id) {
            self.destroy(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Open a window showing the subtree below `node` of window `from`,
    /// sharing its records instead of reading the filesystem again.
    pub fn spawn_window(&self, from: WindowId, node: NodeId) -> Result<WindowId> {
        let result = self.try_spawn_window(from, node);
        self.reported(Some(from), result)
    }

    fn try_spawn_window(&self, from: WindowId, node: NodeId) -> Result<WindowId> {
        let origin = self.lookup(from)?;
        let source = origin.store();

        let record = source.record(node).ok_or(EngineError::NodeNotFound(node))?;
        if !record.is_navigable() {
            return Err(EngineError::NotNavigable(record.name));
        }
        let base = WindowBase::Anchored {
            source: Arc::clone(source),
            anchor: node,
            above: Arc::clone(origin.base()),
        };

        let store = RecordStore::shared_from(self.next_store_id(), source);
        let id = self.create_window(Arc::new(base), store, true)?;
        if let Err(err) = self.try_populate_shared_store(id, source, Some(node), None) {
            self.destroy(id);
            return Err(err);
        }
        Ok(id)
    }

    fn create_window(
        &self,
        base: Arc<WindowBase>,
        store: RecordStore,
        shared: bool,
    ) -> Result<WindowId> {
        let dir = base.resolve()?;
        let id = WindowId(self.inner.next_window.fetch_add(1, Ordering::Relaxed));
        self.inner.host.create_window(id, &dir, shared)?;

        info!("[browser] window {id} opened on {}", dir.display());
        self.inner
            .registry
            .register(Arc::new(BrowserWindow::with_base(id, base, store)));
        Ok(id)
    }

    fn next_store_id(&self) -> StoreId {
        StoreId(self.inner.next_store.fetch_add(1, Ordering::Relaxed))
    }

    /// Start walking the filesystem into the window's empty, owned store.
    pub fn populate_new_store(&self, window: WindowId) -> Result<()> {
        let result = self.try_populate_new_store(window);
        self.reported(Some(window), result)
    }

    fn try_populate_new_store(&self, window: WindowId) -> Result<()> {
        let win = self.lookup(window)?;
        if win.store().ownership() != Ownership::Owned {
            return Err(EngineError::NotOwner(win.store().id()));
        }

        self.spawn_task(win, |ctx, win| {
            fill_store(ctx, &win.directory()?, win.store())
        })
    }

    /// Start filling the window's store with references to the records
    /// below `source_anchor` in `source`.
    pub fn populate_shared_store(
        &self,
        window: WindowId,
        source: &Arc<RecordStore>,
        source_anchor: Option<NodeId>,
        target_anchor: Option<NodeId>,
    ) -> Result<()> {
        let result = self.try_populate_shared_store(window, source, source_anchor, target_anchor);
        self.reported(Some(window), result)
    }

    fn try_populate_shared_store(
        &self,
        window: WindowId,
        source: &Arc<RecordStore>,
        source_anchor: Option<NodeId>,
        target_anchor: Option<NodeId>,
    ) -> Result<()> {
        let win = self.lookup(window)?;
        if !win.store().shares_table_with(source) {
            return Err(EngineError::ForeignStore {
                target: win.store().id(),
                origin: source.id(),
            });
        }

        let source = Arc::clone(source);
        self.spawn_task(win, move |ctx, win| {
            share_subtree(ctx, &source, source_anchor, win.store(), target_anchor)
        })
    }

    fn spawn_task<F>(&self, win: Arc<BrowserWindow>, work: F) -> Result<()>
    where
        F: FnOnce(&TaskContext<'_>, &BrowserWindow) -> Result<FillStats> + Send + 'static,
    {
        let id = win.id();
        if !win.store().is_empty() || !win.begin_fill() {
            return Err(EngineError::AlreadyPopulated(id));
        }

        let inner = Arc::clone(&self.inner);
        let task_win = Arc::clone(&win);
        let spawned = thread::Builder::new()
            .name(format!("fill-{}", id.0))
            .spawn(move || {
                let guard = CompletionGuard {
                    tx: inner.events_tx.clone(),
                    window: id,
                    sent: false,
                };
                let ctx = TaskContext {
                    fs: &*inner.fs,
                    host: &*inner.host,
                    config: &inner.config,
                    token: task_win.token(),
                    window: id,
                };

                let result = work(&ctx, &task_win);
                if let Err(err) = &result {
                    ctx.report(err);
                }
                guard.complete(result);
            });

        match spawned {
            Ok(_) => Ok(()),
            Err(err) => {
                win.end_fill();
                Err(EngineError::Spawn(err))
            }
        }
    }

    /// Close a window. A window still being filled is only asked to stop;
    /// it is destroyed once its task reports completion.
    pub fn close_window(&self, window: WindowId) -> Result<()> {
        let win = self.reported(Some(window), self.lookup(window))?;

        if win.fill_in_progress() {
            debug!("[browser] window {window} closing while filling");
            win.token().cancel();
            self.inner
                .host
                .set_title(window, &format!("{PROGRAM_TITLE}: CLOSING..."));
        } else {
            self.destroy(window);
        }
        Ok(())
    }

    /// Close every open window.
    pub fn close_all(&self) {
        for id in self.inner.registry.ids() {
            if let Err(err) = self.close_window(id) {
                debug!("[browser] close_all: {err}");
            }
        }
    }

    fn destroy(&self, window: WindowId) {
        let Some(win) = self.inner.registry.deregister(window) else {
            debug!("[browser] window {window} already destroyed");
            return;
        };

        self.inner.host.destroy_window(window);
        info!(
            "[browser] window {window} destroyed ({} nodes released)",
            win.store().len()
        );

        if self.inner.registry.is_empty() {
            info!("[browser] last window closed");
            self.inner.host.quit();
        }
    }

    // ---- events ----------------------------------------------------------

    /// Wait up to `timeout` (forever when `None`) for the next task event.
    pub fn recv_event(&self, timeout: Option<Duration>) -> Option<UiEvent> {
        match timeout {
            None => self.inner.events_rx.recv().ok(),
            Some(t) => self.inner.events_rx.recv_timeout(t).ok(),
        }
    }

    /// Apply a task event and hand back the task's outcome.
    pub fn handle_event(&self, event: UiEvent) -> Result<FillStats> {
        let UiEvent::PopulationComplete { window, result } = event;

        let Some(win) = self.inner.registry.get(window) else {
            debug!("[browser] completion for vanished window {window}");
            return result;
        };
        win.end_fill();

        match &result {
            Ok(stats) => debug!("[browser] window {window} filled: {stats:?}"),
            Err(EngineError::TaskPanicked) => self.report(Some(window), &EngineError::TaskPanicked),
            // Already reported by the task.
            Err(err) => debug!("[browser] window {window} fill failed: {err}"),
        }

        if win.shutdown_requested() {
            self.destroy(window);
        } else if let Ok(dir) = win.directory() {
            self.inner
                .host
                .set_title(window, &format!("{PROGRAM_TITLE} [{}]", dir.display()));
        }
        result
    }

    /// Handle every event already queued. Returns how many there were.
    pub fn pump(&self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.inner.events_rx.try_recv() {
            let _ = self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Handle events until `window`'s task completes, returning its
    /// outcome, or `None` if `timeout` passes first.
    pub fn wait_filled(&self, window: WindowId, timeout: Duration) -> Option<Result<FillStats>> {
        let deadline = Instant::now() + timeout;

        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.inner.events_rx.recv_timeout(left) {
                Ok(event) => {
                    let done = event.window() == window;
                    let result = self.handle_event(event);
                    if done {
                        return Some(result);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    // ---- sorting and renaming --------------------------------------------

    pub fn sort_by(&self, window: WindowId, key: SortKey) -> Result<()> {
        let win = self.reported(Some(window), self.lookup(window))?;
        win.store().sort_with(key.comparator());
        self.inner.host.request_redraw(window, None);
        Ok(())
    }

    /// Start editing the name of `node`; returns the longest name the
    /// filesystem accepts.
    pub fn begin_rename(&self, window: WindowId, node: NodeId) -> Result<usize> {
        let result = self.lookup(window).and_then(|win| {
            win.store()
                .record_of(node)
                .ok_or(EngineError::NodeNotFound(node))?;
            Ok(self.inner.fs.max_name_len(&win.directory()?))
        });
        self.reported(Some(window), result)
    }

    /// Rename the file behind `node` and refresh it in every window that
    /// shows it. Returns the windows asked to redraw.
    pub fn commit_rename(
        &self,
        window: WindowId,
        node: NodeId,
        new_name: &str,
    ) -> Result<Vec<WindowId>> {
        let result = self.lookup(window).and_then(|win| {
            let renamed = rename::rename_record(
                &*self.inner.fs,
                &win.directory()?,
                win.store(),
                node,
                new_name,
            )?;
            Ok(match renamed {
                Some(record) => rename::broadcast_refresh(
                    &*self.inner.host,
                    &self.inner.registry.snapshot(),
                    win.store().table(),
                    record,
                ),
                None => Vec::new(),
            })
        });
        self.reported(Some(window), result)
    }

    // ---- accessors -------------------------------------------------------

    pub fn windows(&self) -> Vec<WindowId> {
        self.inner.registry.ids()
    }

    pub fn live_windows(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn window(&self, window: WindowId) -> Option<Arc<BrowserWindow>> {
        self.inner.registry.get(window)
    }

    pub fn window_store(&self, window: WindowId) -> Option<Arc<RecordStore>> {
        self.window(window).map(|w| Arc::clone(w.store()))
    }

    pub fn snapshot(&self, window: WindowId) -> Result<Vec<RecordView>> {
        Ok(self.lookup(window)?.store().snapshot())
    }

    /// Gone windows count as shut down.
    pub fn shutdown_requested(&self, window: WindowId) -> bool {
        self.window(window).is_none_or(|w| w.shutdown_requested())
    }

    pub(crate) fn lookup(&self, window: WindowId) -> Result<Arc<BrowserWindow>> {
        self.inner
            .registry
            .get(window)
            .ok_or(EngineError::WindowNotFound(window))
    }

    pub(crate) fn registry(&self) -> &WindowRegistry {
        &self.inner.registry
    }

    pub(crate) fn report(&self, window: Option<WindowId>, err: &EngineError) {
        warn!("[browser] {err}");
        self.inner.host.report(window, &Notice::from(err));
    }

    pub(crate) fn reported<T>(&self, window: Option<WindowId>, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.report(window, err);
        }
        result
    }
}

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;
