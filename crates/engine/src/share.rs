use log::debug;

use crate::{
    error::{EngineError, Result},
    store::{NodeId, RecordStore},
    task::{FillStats, TaskContext},
};

/// Fill `target` with references to the records below `source_anchor` in
/// `source`, placing them under `target_anchor`.
///
/// No record is copied and the filesystem is never touched. Each level is
/// copied in scan order before its directories are descended into. The top
/// level is redrawn once after its sweep; deeper records are redrawn as
/// they arrive.
pub fn share_subtree(
    ctx: &TaskContext<'_>,
    source: &RecordStore,
    source_anchor: Option<NodeId>,
    target: &RecordStore,
    target_anchor: Option<NodeId>,
) -> Result<FillStats> {
    if !target.shares_table_with(source) {
        return Err(EngineError::ForeignStore {
            target: target.id(),
            origin: source.id(),
        });
    }

    let mut stats = FillStats::default();
    let mut stack = vec![(source_anchor, target_anchor, false)];

    while let Some((from, into, nested)) = stack.pop() {
        if ctx.cancelled() {
            stats.cancelled = true;
            break;
        }
        stats.directories += 1;

        // Sibling order in the source may have been re-sorted.
        let mut children = source.child_entries(from)?;
        children.sort_by_key(|c| c.scan_index);

        let mut descend = Vec::new();
        for child in children {
            if ctx.cancelled() {
                stats.cancelled = true;
                break;
            }

            let node = target.insert_reference(into, child.record)?;
            stats.records += 1;
            if nested {
                ctx.host.request_redraw(ctx.window, Some(child.record));
            }
            if child.navigable {
                descend.push((child.node, node));
            }
        }

        if !nested {
            ctx.host.request_redraw(ctx.window, None);
        }
        if stats.cancelled {
            break;
        }

        ctx.pause();
        for (from, into) in descend.into_iter().rev() {
            stack.push((Some(from), Some(into), true));
        }
    }

    debug!(
        "[share] window {} took {} records from store {}, cancelled={}",
        ctx.window,
        stats.records,
        source.id(),
        stats.cancelled
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "share_tests.rs"]
mod tests;
