mod browser;
mod cancel;
mod error;
mod flags;
mod host;
mod menu;
mod record;
mod rename;
mod share;
mod sort;
mod store;
mod task;
mod walker;
mod window;

#[cfg(test)]
mod testing;

pub use browser::{Browser, UiEvent};
pub use cancel::CancelToken;
pub use error::{EngineError, ErrorKind};
pub use flags::{AttrFlags, compute_attr_flags};
pub use host::{HostError, Notice, WindowHost};
pub use menu::MenuTargets;
pub use record::{FileRecord, IconHandle, RecordId, RecordTable};
pub use rename::validate_name;
pub use share::share_subtree;
pub use sort::{SortKey, compare_date_time, compare_name, compare_scan_order};
pub use store::{ChildEntry, NodeId, Ownership, RecordStore, RecordView, StoreId};
pub use task::{FillStats, TaskContext};
pub use walker::fill_store;
pub use window::{BrowserWindow, WindowBase, WindowId, WindowRegistry};
