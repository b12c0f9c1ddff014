use std::{
    fs::{self, DirEntry, Metadata},
    io::{self, Result},
    path::Path,
};

use log::{debug, warn};

use crate::record::{FileEntry, is_dot_name, split_timestamp};

/// Longest file name accepted by common Unix filesystems.
pub const MAX_NAME_LEN: usize = 255;

/// Entries of one directory, in enumeration order.
pub type DirEntries = Box<dyn Iterator<Item = Result<FileEntry>> + Send>;

/// The filesystem operations a browser needs: enumerate, rename, metadata.
///
/// Population tasks call this from background threads, so implementations
/// must be shareable.
pub trait Filesystem: Send + Sync {
    /// Enumerate `dir`. Failing to open the directory is an error; failing
    /// to read one entry yields an `Err` item and enumeration continues.
    fn read_dir(&self, dir: &Path) -> Result<DirEntries>;

    /// Rename `from` to `to` as a single operation.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Describe the entry at `path` without following a final symlink.
    fn metadata(&self, path: &Path) -> Result<FileEntry>;

    /// Longest name the filesystem holding `dir` accepts.
    fn max_name_len(&self, _dir: &Path) -> usize {
        MAX_NAME_LEN
    }
}

/// The host operating system's filesystem.
#[derive(Debug, Clone, Copy)]
pub struct OsFilesystem {
    dot_entries: bool,
}

impl OsFilesystem {
    /// With `dot_entries`, every listing starts with `.` and, below the
    /// root, `..`, the way directory searches on some platforms report them.
    pub fn new(dot_entries: bool) -> Self {
        Self { dot_entries }
    }
}

impl Default for OsFilesystem {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Filesystem for OsFilesystem {
    fn read_dir(&self, dir: &Path) -> Result<DirEntries> {
        let rd = fs::read_dir(dir)?;

        let mut dots = Vec::new();
        if self.dot_entries {
            dots.push(Ok(dot_entry(".", &fs::metadata(dir)?)));
            if let Some(parent) = dir.parent()
                && let Ok(meta) = fs::metadata(parent)
            {
                dots.push(Ok(dot_entry("..", &meta)));
            }
        }

        let listed = rd.filter_map(|entry_res| match entry_res {
            Ok(entry) => inspect_fs_entry(&entry).transpose(),
            Err(e) => Some(Err(e)),
        });

        Ok(Box::new(dots.into_iter().chain(listed)))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to)
    }

    fn metadata(&self, path: &Path) -> Result<FileEntry> {
        let meta = fs::symlink_metadata(path)?;
        let name = path
            .file_name()
            .and_then(|os| os.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no UTF-8 file name", path.display()),
                )
            })?;
        Ok(entry_from_metadata(name.to_owned(), &meta))
    }
}

/// Enumerate a directory a fixed number of entries at a time.
///
/// Entries that cannot be read are logged and skipped, so a batch may be
/// shorter than `batch_size` only at the end of the directory.
pub struct DirBatches {
    entries: DirEntries,
    batch_size: usize,
    skipped: usize,
}

impl DirBatches {
    pub fn new(entries: DirEntries, batch_size: usize) -> Self {
        Self {
            entries,
            batch_size: batch_size.max(1),
            skipped: 0,
        }
    }

    /// Open `dir` on `fs` and batch its entries.
    pub fn open(fs: &dyn Filesystem, dir: &Path, batch_size: usize) -> Result<Self> {
        Ok(Self::new(fs.read_dir(dir)?, batch_size))
    }

    /// Number of entries dropped because they could not be read.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for DirBatches {
    type Item = Vec<FileEntry>;

    fn next(&mut self) -> Option<Vec<FileEntry>> {
        let mut batch = Vec::with_capacity(self.batch_size);

        while batch.len() < self.batch_size {
            match self.entries.next() {
                Some(Ok(entry)) => batch.push(entry),
                Some(Err(e)) => {
                    warn!("[fs] skipping unreadable entry: {e}");
                    self.skipped += 1;
                }
                None => break,
            }
        }

        if batch.is_empty() { None } else { Some(batch) }
    }
}

fn inspect_fs_entry(entry: &DirEntry) -> Result<Option<FileEntry>> {
    // DirEntry::metadata does not traverse symlinks on Unix.
    let metadata = entry.metadata()?;

    let name_os = entry.file_name();
    let name = match name_os.to_str() {
        Some(s) => s.to_owned(),
        None => {
            debug!("[fs] skipping non UTF-8 name {:?}", name_os);
            return Ok(None);
        }
    };

    Ok(Some(entry_from_metadata(name, &metadata)))
}

fn entry_from_metadata(name: String, metadata: &Metadata) -> FileEntry {
    let is_dir = metadata.is_dir();
    let is_symlink = metadata.is_symlink();
    let is_file = metadata.is_file();
    let (date, time) = split_timestamp(metadata.modified().ok());

    FileEntry {
        hidden_os: name.starts_with('.') && !is_dot_name(&name),
        size: if is_dir { 0 } else { metadata.len() },
        date,
        time,
        is_dir,
        is_symlink,
        is_special: !is_dir && !is_symlink && !is_file,
        readonly: metadata.permissions().readonly(),
        name,
    }
}

fn dot_entry(name: &str, metadata: &Metadata) -> FileEntry {
    entry_from_metadata(name.to_owned(), metadata)
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
