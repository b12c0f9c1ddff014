use std::{
    collections::BTreeMap,
    fmt,
    path::PathBuf,
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::{
    cancel::CancelToken,
    error::Result,
    store::{NodeId, RecordStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Where a window's directory comes from.
///
/// Only windows that own their records keep a fixed path. A window spawned
/// on a record resolves its directory through that record on every use, so
/// renaming the record or any ancestor through another window moves it too.
#[derive(Debug)]
pub enum WindowBase {
    Fixed(PathBuf),
    Anchored {
        source: Arc<RecordStore>,
        anchor: NodeId,
        above: Arc<WindowBase>,
    },
}

impl WindowBase {
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            WindowBase::Fixed(dir) => Ok(dir.clone()),
            WindowBase::Anchored {
                source,
                anchor,
                above,
            } => source.fully_qualify(&above.resolve()?, *anchor),
        }
    }
}

/// Per-window state owned by the browser core.
#[derive(Debug)]
pub struct BrowserWindow {
    id: WindowId,
    base: Arc<WindowBase>,
    store: Arc<RecordStore>,
    token: CancelToken,
    fill_in_progress: AtomicBool,
    /// Node under the pointer while a context menu is open.
    menu: Mutex<Option<NodeId>>,
}

impl BrowserWindow {
    pub fn new(id: WindowId, directory: PathBuf, store: RecordStore) -> Self {
        Self::with_base(id, Arc::new(WindowBase::Fixed(directory)), store)
    }

    pub fn with_base(id: WindowId, base: Arc<WindowBase>, store: RecordStore) -> Self {
        BrowserWindow {
            id,
            base,
            store: Arc::new(store),
            token: CancelToken::new(),
            fill_in_progress: AtomicBool::new(false),
            menu: Mutex::new(None),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    /// The directory the window shows, as it is named now.
    pub fn directory(&self) -> Result<PathBuf> {
        self.base.resolve()
    }

    pub fn base(&self) -> &Arc<WindowBase> {
        &self.base
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn shutdown_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn fill_in_progress(&self) -> bool {
        self.fill_in_progress.load(Ordering::Acquire)
    }

    /// Mark the fill as started. Returns false if one was already running.
    pub(crate) fn begin_fill(&self) -> bool {
        self.fill_in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn end_fill(&self) {
        self.fill_in_progress.store(false, Ordering::Release);
    }

    pub fn menu_node(&self) -> Option<NodeId> {
        *self.menu.lock()
    }

    pub(crate) fn set_menu_node(&self, node: Option<NodeId>) {
        *self.menu.lock() = node;
    }
}

/// Every open browser window, keyed by id.
///
/// Enumeration hands out weak references so callers tolerate a window being
/// destroyed between the snapshot and its use.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: RwLock<BTreeMap<WindowId, Arc<BrowserWindow>>>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, window: Arc<BrowserWindow>) {
        self.windows.write().insert(window.id(), window);
    }

    pub fn deregister(&self, id: WindowId) -> Option<Arc<BrowserWindow>> {
        self.windows.write().remove(&id)
    }

    pub fn get(&self, id: WindowId) -> Option<Arc<BrowserWindow>> {
        self.windows.read().get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.read().keys().copied().collect()
    }

    pub fn snapshot(&self) -> Vec<Weak<BrowserWindow>> {
        self.windows.read().values().map(Arc::downgrade).collect()
    }

    pub fn len(&self) -> usize {
        self.windows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.read().is_empty()
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
