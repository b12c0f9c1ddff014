use std::{cmp::Ordering, fmt, str::FromStr};

use burrow_fs::{FileDate, FileTime};
use serde::Serialize;

use crate::record::FileRecord;

/// The orders a window can be sorted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    /// Order the filesystem listed the entries in.
    #[default]
    ScanOrder,
    DateTime,
}

impl SortKey {
    pub fn comparator(self) -> fn(&FileRecord, &FileRecord) -> Ordering {
        match self {
            SortKey::Name => compare_name,
            SortKey::ScanOrder => compare_scan_order,
            SortKey::DateTime => compare_date_time,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::ScanOrder => "scan",
            SortKey::DateTime => "date",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "scan" | "scan-order" | "dir" => Ok(SortKey::ScanOrder),
            "date" | "time" | "date-time" => Ok(SortKey::DateTime),
            other => Err(format!("unknown sort key {other:?} (expected name, scan or date)")),
        }
    }
}

/// Byte-wise lexical order of names.
pub fn compare_name(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.name.as_bytes().cmp(b.name.as_bytes())
}

pub fn compare_scan_order(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.scan_index.cmp(&b.scan_index)
}

/// Oldest first: the date as a `YYYYMMDD` number, then seconds of the day.
pub fn compare_date_time(a: &FileRecord, b: &FileRecord) -> Ordering {
    date_key(a.date)
        .cmp(&date_key(b.date))
        .then_with(|| time_key(a.time).cmp(&time_key(b.time)))
}

fn date_key(d: FileDate) -> u32 {
    u32::from(d.year) * 10_000 + u32::from(d.month) * 100 + u32::from(d.day)
}

fn time_key(t: FileTime) -> u32 {
    u32::from(t.hours) * 3600 + u32::from(t.minutes) * 60 + u32::from(t.seconds)
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod tests;
