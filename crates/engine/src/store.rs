use std::{
    cmp::Ordering,
    fmt, mem,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::Serialize;
use smallvec::SmallVec;

use crate::{
    error::{EngineError, Result},
    record::{FileRecord, RecordId, RecordTable},
};

/// Position of a node in one store's arena. Only meaningful for the store
/// that handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StoreId(pub u32);

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Whether a store created its record table or borrowed another store's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    Shared { source: StoreId },
}

#[derive(Debug)]
struct Node {
    record: RecordId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    by_record: HashMap<RecordId, NodeId>,
}

impl Tree {
    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.index()).ok_or(EngineError::NodeNotFound(id))
    }

    fn siblings(&self, parent: Option<NodeId>) -> Result<&[NodeId]> {
        match parent {
            None => Ok(&self.roots),
            Some(p) => Ok(&self.node(p)?.children),
        }
    }

    /// Make room for `additional` nodes under `parent` so the pushes that
    /// follow cannot fail halfway.
    fn reserve(&mut self, parent: Option<NodeId>, additional: usize) -> Result<()> {
        self.nodes
            .len()
            .checked_add(additional)
            .and_then(|total| u32::try_from(total).ok())
            .ok_or(EngineError::OutOfMemory("assigning node ids"))?;

        let siblings = match parent {
            None => &mut self.roots,
            Some(p) => {
                &mut self
                    .nodes
                    .get_mut(p.index())
                    .ok_or(EngineError::NodeNotFound(p))?
                    .children
            }
        };
        siblings.try_reserve(additional).map_err(tree_oom)?;
        self.nodes.try_reserve(additional).map_err(tree_oom)?;
        self.by_record.try_reserve(additional).map_err(tree_oom)?;
        Ok(())
    }

    fn push(&mut self, parent: Option<NodeId>, record: RecordId) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            record,
            parent,
            children: Vec::new(),
        });
        self.by_record.entry(record).or_insert(id);

        match parent {
            None => self.roots.push(id),
            Some(p) => self.nodes[p.index()].children.push(id),
        }
        id
    }
}

fn tree_oom<E>(_: E) -> EngineError {
    EngineError::OutOfMemory("growing the node tree")
}

fn resolve<'r>(nodes: &[Node], records: &'r [FileRecord], id: NodeId) -> &'r FileRecord {
    &records[nodes[id.index()].record.index()]
}

/// A direct child as seen while walking or sharing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub node: NodeId,
    pub record: RecordId,
    pub name: String,
    pub scan_index: u32,
    pub navigable: bool,
}

/// Flattened, pre-order view of one store row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordView {
    pub node: NodeId,
    pub record: RecordId,
    pub depth: usize,
    pub name: String,
    pub size: u64,
    pub date: String,
    pub time: String,
    pub is_dir: bool,
    pub scan_index: u32,
    pub selected: bool,
}

impl RecordView {
    fn new(node: NodeId, record: RecordId, depth: usize, r: &FileRecord) -> Self {
        RecordView {
            node,
            record,
            depth,
            name: r.name.clone(),
            size: r.size,
            date: format!("{:04}-{:02}-{:02}", r.date.year, r.date.month, r.date.day),
            time: format!("{:02}:{:02}:{:02}", r.time.hours, r.time.minutes, r.time.seconds),
            is_dir: r.is_dir(),
            scan_index: r.scan_index,
            selected: r.selected,
        }
    }
}

/// The record tree shown by one window.
///
/// The node tree is private to the store; the records it points at live in
/// a [`RecordTable`] that sharing stores hold on to as well. Whenever both
/// locks are needed the tree lock is taken first.
#[derive(Debug)]
pub struct RecordStore {
    id: StoreId,
    ownership: Ownership,
    table: Arc<RecordTable>,
    tree: RwLock<Tree>,
}

impl RecordStore {
    /// A store with a fresh record table, filled by walking the filesystem.
    pub fn owned(id: StoreId) -> Self {
        RecordStore {
            id,
            ownership: Ownership::Owned,
            table: Arc::new(RecordTable::new()),
            tree: RwLock::new(Tree::default()),
        }
    }

    /// A store that references records of `source` instead of copying them.
    pub fn shared_from(id: StoreId, source: &RecordStore) -> Self {
        RecordStore {
            id,
            ownership: Ownership::Shared { source: source.id },
            table: Arc::clone(&source.table),
            tree: RwLock::new(Tree::default()),
        }
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn table(&self) -> &Arc<RecordTable> {
        &self.table
    }

    pub fn shares_table_with(&self, other: &RecordStore) -> bool {
        Arc::ptr_eq(&self.table, &other.table)
    }

    /// Number of nodes in this store.
    pub fn len(&self) -> usize {
        self.tree.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append freshly created records as the last children of `parent`
    /// (`None` for top level). Only the owning store creates records.
    pub fn insert_batch(
        &self,
        parent: Option<NodeId>,
        batch: Vec<FileRecord>,
    ) -> Result<Vec<NodeId>> {
        if self.ownership != Ownership::Owned {
            return Err(EngineError::NotOwner(self.id));
        }
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let count = batch.len();
        let mut ids = Vec::new();
        ids.try_reserve_exact(count)
            .map_err(|_| EngineError::OutOfMemory("collecting node ids"))?;

        let mut tree = self.tree.write();
        tree.reserve(parent, count)?;
        let first = self.table.append(batch)?;

        for offset in 0..count as u32 {
            ids.push(tree.push(parent, RecordId(first.0 + offset)));
        }
        Ok(ids)
    }

    /// Append a node referencing an existing record of this store's table.
    pub fn insert_reference(&self, parent: Option<NodeId>, record: RecordId) -> Result<NodeId> {
        if !self.table.contains(record) {
            return Err(EngineError::RecordNotFound(record));
        }

        let mut tree = self.tree.write();
        tree.reserve(parent, 1)?;
        Ok(tree.push(parent, record))
    }

    pub fn children(&self, parent: Option<NodeId>) -> Result<Vec<NodeId>> {
        Ok(self.tree.read().siblings(parent)?.to_vec())
    }

    /// Direct children of `parent` in store order, resolved against the table.
    pub fn child_entries(&self, parent: Option<NodeId>) -> Result<Vec<ChildEntry>> {
        let tree = self.tree.read();
        let siblings = tree.siblings(parent)?;
        let records = self.table.read();

        let mut out = Vec::with_capacity(siblings.len());
        for &node in siblings {
            let record = tree.nodes[node.index()].record;
            let r = records
                .get(record.index())
                .ok_or(EngineError::RecordNotFound(record))?;
            out.push(ChildEntry {
                node,
                record,
                name: r.name.clone(),
                scan_index: r.scan_index,
                navigable: r.is_navigable(),
            });
        }
        Ok(out)
    }

    pub fn record_of(&self, node: NodeId) -> Option<RecordId> {
        self.tree.read().node(node).ok().map(|n| n.record)
    }

    pub fn record(&self, node: NodeId) -> Option<FileRecord> {
        self.record_of(node).and_then(|id| self.table.get(id))
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.tree.read().node(node)?.parent)
    }

    pub fn node_for_record(&self, record: RecordId) -> Option<NodeId> {
        self.tree.read().by_record.get(&record).copied()
    }

    pub fn contains_record(&self, record: RecordId) -> bool {
        self.tree.read().by_record.contains_key(&record)
    }

    /// Follow `relative` one name at a time from the top level.
    pub fn find_path(&self, relative: &Path) -> Option<NodeId> {
        let tree = self.tree.read();
        let records = self.table.read();

        let mut found = None;
        for comp in relative.components() {
            let Component::Normal(name) = comp else {
                return None;
            };
            let siblings = tree.siblings(found).ok()?;
            let next = siblings.iter().copied().find(|n| {
                records
                    .get(tree.nodes[n.index()].record.index())
                    .is_some_and(|r| name == r.name.as_str())
            })?;
            found = Some(next);
        }
        found
    }

    /// `base` joined with the name of every ancestor of `node`, then its own.
    pub fn fully_qualify(&self, base: &Path, node: NodeId) -> Result<PathBuf> {
        let tree = self.tree.read();

        let mut chain: SmallVec<[RecordId; 16]> = SmallVec::new();
        let mut cur = Some(node);
        while let Some(id) = cur {
            let n = tree.node(id)?;
            chain.push(n.record);
            cur = n.parent;
        }

        let records = self.table.read();
        let mut path = base.to_path_buf();
        for &record in chain.iter().rev() {
            let r = records
                .get(record.index())
                .ok_or(EngineError::RecordNotFound(record))?;
            path.push(&r.name);
        }
        Ok(path)
    }

    /// Reorder every sibling group with `cmp`. The sort is stable, so equal
    /// records keep their current relative order.
    pub fn sort_with<F>(&self, mut cmp: F)
    where
        F: FnMut(&FileRecord, &FileRecord) -> Ordering,
    {
        let mut guard = self.tree.write();
        let tree = &mut *guard;
        let records = self.table.read();

        tree.roots.sort_by(|&a, &b| {
            cmp(
                resolve(&tree.nodes, &records, a),
                resolve(&tree.nodes, &records, b),
            )
        });

        for i in 0..tree.nodes.len() {
            if tree.nodes[i].children.len() < 2 {
                continue;
            }
            let mut children = mem::take(&mut tree.nodes[i].children);
            children.sort_by(|&a, &b| {
                cmp(
                    resolve(&tree.nodes, &records, a),
                    resolve(&tree.nodes, &records, b),
                )
            });
            tree.nodes[i].children = children;
        }
    }

    /// Every node in display order: depth-first, parents before children.
    pub fn snapshot(&self) -> Vec<RecordView> {
        let tree = self.tree.read();
        let records = self.table.read();

        let mut out = Vec::with_capacity(tree.nodes.len());
        let mut stack: Vec<(NodeId, usize)> = tree.roots.iter().rev().map(|&n| (n, 0)).collect();

        while let Some((node, depth)) = stack.pop() {
            let n = &tree.nodes[node.index()];
            if let Some(r) = records.get(n.record.index()) {
                out.push(RecordView::new(node, n.record, depth, r));
            }
            stack.extend(n.children.iter().rev().map(|&c| (c, depth + 1)));
        }
        out
    }

    /// Reset the `selected` flag of every record this store references.
    pub fn clear_selection(&self) {
        let tree = self.tree.read();
        self.table
            .set_selected(tree.nodes.iter().map(|n| n.record), false);
    }

    pub fn set_selected(&self, nodes: &[NodeId], selected: bool) -> Result<()> {
        let tree = self.tree.read();
        let mut ids: SmallVec<[RecordId; 8]> = SmallVec::with_capacity(nodes.len());
        for &node in nodes {
            ids.push(tree.node(node)?.record);
        }
        self.table.set_selected(ids, selected);
        Ok(())
    }

    /// Nodes whose record is currently marked selected, in arena order.
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        let tree = self.tree.read();
        let records = self.table.read();

        tree.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| records.get(n.record.index()).is_some_and(|r| r.selected))
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
