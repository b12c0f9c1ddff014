mod record;
mod source;

pub use record::{FileDate, FileEntry, FileTime, is_dot_name};
pub use source::{DirBatches, DirEntries, Filesystem, MAX_NAME_LEN, OsFilesystem};
