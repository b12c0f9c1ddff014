use std::path::{Path, PathBuf};

use burrow_fs::DirBatches;
use burrow_runtime::PROGRAM_TITLE;
use log::debug;

use crate::{
    error::{EngineError, Result},
    record::FileRecord,
    store::{NodeId, RecordStore},
    task::{FillStats, TaskContext},
};

/// Walk the filesystem below `base` into the owned `store`.
///
/// Directories are visited depth-first, parents before children, in the
/// order their records sit in the store. Each directory is listed in
/// batches; every batch is inserted in one call and followed by a redraw
/// request. The walk stops early once `ctx.token` is cancelled, keeping
/// what was already inserted.
pub fn fill_store(ctx: &TaskContext<'_>, base: &Path, store: &RecordStore) -> Result<FillStats> {
    let mut stats = FillStats::default();
    let mut stack: Vec<(Option<NodeId>, PathBuf)> = vec![(None, base.to_path_buf())];

    while let Some((parent, dir)) = stack.pop() {
        if ctx.cancelled() {
            stats.cancelled = true;
            break;
        }

        ctx.host.set_title(
            ctx.window,
            &format!("{PROGRAM_TITLE}: Processing {}...", dir.display()),
        );
        stats.directories += 1;

        fill_directory(ctx, &dir, parent, store, &mut stats)?;
        if stats.cancelled {
            break;
        }

        ctx.pause();
        if ctx.cancelled() {
            stats.cancelled = true;
            break;
        }

        // Reversed so the first child is popped first.
        let children = store.child_entries(parent)?;
        for child in children.into_iter().rev().filter(|c| c.navigable) {
            stack.push((Some(child.node), dir.join(&child.name)));
        }
    }

    debug!(
        "[walker] window {} filled from {}: {} dirs, {} records, cancelled={}",
        ctx.window,
        base.display(),
        stats.directories,
        stats.records,
        stats.cancelled
    );
    Ok(stats)
}

/// List one directory into `store` under `parent`. A directory that cannot
/// be opened is reported and left empty.
fn fill_directory(
    ctx: &TaskContext<'_>,
    dir: &Path,
    parent: Option<NodeId>,
    store: &RecordStore,
    stats: &mut FillStats,
) -> Result<()> {
    let mut batches = match DirBatches::open(ctx.fs, dir, ctx.config.batch_size) {
        Ok(batches) => batches,
        Err(source) => {
            ctx.report(&EngineError::ReadDir {
                path: dir.to_path_buf(),
                source,
            });
            stats.skipped_dirs += 1;
            return Ok(());
        }
    };

    let mut scan_index: u32 = 0;
    loop {
        if ctx.cancelled() {
            stats.cancelled = true;
            break;
        }
        let Some(batch) = batches.next() else {
            break;
        };

        let mut records = Vec::new();
        records
            .try_reserve_exact(batch.len())
            .map_err(|_| EngineError::OutOfMemory("building a record batch"))?;

        for entry in batch {
            scan_index = scan_index
                .checked_add(1)
                .ok_or(EngineError::OutOfMemory("numbering directory entries"))?;
            records.push(FileRecord::from_entry(entry, scan_index));
        }

        stats.records += store.insert_batch(parent, records)?.len();
        ctx.host.request_redraw(ctx.window, None);
    }

    if batches.skipped() > 0 {
        debug!(
            "[walker] {} unreadable entries skipped in {}",
            batches.skipped(),
            dir.display()
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
