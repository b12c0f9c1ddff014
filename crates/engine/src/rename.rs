use std::{
    io,
    path::{MAIN_SEPARATOR, Path},
    sync::{Arc, Weak},
};

use burrow_fs::{Filesystem, is_dot_name};
use log::{debug, info};

use crate::{
    error::{EngineError, Result},
    host::WindowHost,
    record::{RecordId, RecordTable},
    store::{NodeId, RecordStore},
    window::{BrowserWindow, WindowId},
};

/// Reject names that are not a single, real path segment.
pub fn validate_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || is_dot_name(name)
        || name.contains('/')
        || name.contains(MAIN_SEPARATOR)
        || name.contains('\0');

    if bad {
        return Err(EngineError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// Rename the file behind `node` on disk, then update its record.
///
/// Returns the renamed record, or `None` when `new_name` is the current
/// name and nothing had to be done.
pub(crate) fn rename_record(
    fs: &dyn Filesystem,
    base: &Path,
    store: &RecordStore,
    node: NodeId,
    new_name: &str,
) -> Result<Option<RecordId>> {
    validate_name(new_name)?;

    let record = store.record_of(node).ok_or(EngineError::NodeNotFound(node))?;
    let from = store.fully_qualify(base, node)?;
    if from.file_name().is_some_and(|n| n == new_name) {
        return Ok(None);
    }
    let to = from.with_file_name(new_name);

    // The OS rename replaces an existing target. A case-only change may
    // report the file itself on case-insensitive volumes.
    let case_only = from
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.eq_ignore_ascii_case(new_name));
    if !case_only && fs.metadata(&to).is_ok() {
        let source = io::Error::new(io::ErrorKind::AlreadyExists, "target already exists");
        return Err(EngineError::Rename { from, to, source });
    }

    if let Err(source) = fs.rename(&from, &to) {
        return Err(EngineError::Rename { from, to, source });
    }
    store.table().set_name(record, new_name.to_owned())?;

    info!("[rename] {} -> {}", from.display(), to.display());
    Ok(Some(record))
}

/// Ask every live window showing `record` of `table` to repaint it.
/// Windows destroyed since the snapshot are skipped.
pub(crate) fn broadcast_refresh(
    host: &dyn WindowHost,
    windows: &[Weak<BrowserWindow>],
    table: &Arc<RecordTable>,
    record: RecordId,
) -> Vec<WindowId> {
    let mut refreshed = Vec::new();

    for weak in windows {
        let Some(window) = weak.upgrade() else {
            debug!("[rename] window vanished before refresh of {record}");
            continue;
        };
        let store = window.store();
        if Arc::ptr_eq(store.table(), table) && store.contains_record(record) {
            host.request_redraw(window.id(), Some(record));
            refreshed.push(window.id());
        }
    }

    refreshed
}

#[cfg(test)]
#[path = "rename_tests.rs"]
mod tests;
