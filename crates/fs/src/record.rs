use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, Timelike};

/// Calendar date of a file's last write, in local time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// Wall-clock time of a file's last write, in local time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

/// One directory entry as reported by a [`crate::Filesystem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Single path segment, never containing a separator.
    pub name: String,
    pub size: u64,
    pub date: FileDate,
    pub time: FileTime,
    pub is_dir: bool,
    pub is_symlink: bool,
    /// Sockets, fifos, devices.
    pub is_special: bool,
    pub readonly: bool,
    /// Dot-prefixed names other than `.` and `..`.
    pub hidden_os: bool,
}

impl FileDate {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

impl FileTime {
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }
}

/// Split a modification time into local date and time fields.
///
/// A missing timestamp yields the all-zero date and time.
pub fn split_timestamp(t: Option<SystemTime>) -> (FileDate, FileTime) {
    let Some(t) = t else {
        return (FileDate::default(), FileTime::default());
    };

    let local: DateTime<Local> = t.into();
    let year = u16::try_from(local.year()).unwrap_or(0);

    (
        FileDate::new(year, local.month() as u8, local.day() as u8),
        FileTime::new(
            local.hour() as u8,
            local.minute() as u8,
            local.second() as u8,
        ),
    )
}

/// `.` and `..` are listed but never expanded or opened in a new window.
#[inline]
pub fn is_dot_name(name: &str) -> bool {
    name == "." || name == ".."
}
