use std::fmt;

use burrow_fs::{FileDate, FileEntry, FileTime, is_dot_name};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Serialize;

use crate::{
    error::{EngineError, Result},
    flags::{AttrFlags, compute_attr_flags},
};

/// Index of a record in its [`RecordTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecordId(pub u32);

impl RecordId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Process-global icon token. Handles are plain values: records share
/// them and nothing ever releases one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconHandle(u8);

impl IconHandle {
    pub const FILE: IconHandle = IconHandle(1);
    pub const FOLDER: IconHandle = IconHandle(2);
    pub const LINK: IconHandle = IconHandle(3);
    /// Fallback when no better icon applies.
    pub const UNKNOWN: IconHandle = IconHandle(0);

    pub fn for_attrs(attrs: AttrFlags) -> IconHandle {
        if attrs.contains(AttrFlags::SYMLINK) {
            IconHandle::LINK
        } else if attrs.is_dir() {
            IconHandle::FOLDER
        } else if attrs.contains(AttrFlags::SPECIAL) {
            IconHandle::UNKNOWN
        } else {
            IconHandle::FILE
        }
    }
}

/// One file or directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub size: u64,
    pub date: FileDate,
    pub time: FileTime,
    pub attrs: AttrFlags,
    /// 1-based position in the directory listing it came from.
    pub scan_index: u32,
    /// Marked during a context-menu session; reset when the next one begins.
    pub selected: bool,
    pub icon: IconHandle,
}

impl FileRecord {
    pub fn from_entry(entry: FileEntry, scan_index: u32) -> Self {
        let attrs = compute_attr_flags(&entry);
        FileRecord {
            name: entry.name,
            size: entry.size,
            date: entry.date,
            time: entry.time,
            attrs,
            scan_index,
            selected: false,
            icon: IconHandle::for_attrs(attrs),
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.attrs.is_dir()
    }

    /// Directories other than `.` and `..` can be expanded and opened in a
    /// window of their own.
    #[inline]
    pub fn is_navigable(&self) -> bool {
        self.is_dir() && !is_dot_name(&self.name)
    }
}

/// The authoritative records of one walked subtree.
///
/// Created by the store of the first window opened on a directory and shared
/// by every store that references its records. Records are only appended;
/// a rename is the one in-place change.
#[derive(Debug, Default)]
pub struct RecordTable {
    records: RwLock<Vec<FileRecord>>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: RecordId) -> Option<FileRecord> {
        self.records.read().get(id.index()).cloned()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        id.index() < self.len()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<FileRecord>> {
        self.records.read()
    }

    /// Append `batch`, returning the id of its first record. Either the
    /// whole batch is stored or none of it.
    pub(crate) fn append(&self, batch: Vec<FileRecord>) -> Result<RecordId> {
        let mut records = self.records.write();

        let first = u32::try_from(records.len())
            .ok()
            .filter(|first| first.checked_add(batch.len() as u32).is_some())
            .ok_or(EngineError::OutOfMemory("assigning record ids"))?;

        records
            .try_reserve(batch.len())
            .map_err(|_| EngineError::OutOfMemory("growing the record table"))?;
        records.extend(batch);

        Ok(RecordId(first))
    }

    /// The single mutation point for a record's name.
    pub(crate) fn set_name(&self, id: RecordId, name: String) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(id.index())
            .ok_or(EngineError::RecordNotFound(id))?;
        record.name = name;
        Ok(())
    }

    pub(crate) fn set_selected<I>(&self, ids: I, selected: bool)
    where
        I: IntoIterator<Item = RecordId>,
    {
        let mut records = self.records.write();
        for id in ids {
            if let Some(record) = records.get_mut(id.index()) {
                record.selected = selected;
            }
        }
    }
}
