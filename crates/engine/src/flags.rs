use bitflags::bitflags;
use burrow_fs::FileEntry;

bitflags! {
    /// Attribute flags of a file record. These are derived from metadata,
    /// not the raw OS mode bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttrFlags: u8 {
        const DIRECTORY = 0b0000_0001;
        /// The entry itself is a symlink; it is never expanded.
        const SYMLINK   = 0b0000_0010;
        /// Socket, fifo, device.
        const SPECIAL   = 0b0000_0100;
        const READONLY  = 0b0000_1000;
        /// Dot-prefixed name.
        const HIDDEN    = 0b0001_0000;
    }
}

impl AttrFlags {
    #[inline]
    pub fn is_dir(self) -> bool {
        self.contains(AttrFlags::DIRECTORY)
    }
}

pub fn compute_attr_flags(input: &FileEntry) -> AttrFlags {
    let mut flags = AttrFlags::empty();

    if input.is_dir {
        flags.insert(AttrFlags::DIRECTORY);
    }
    if input.is_symlink {
        flags.insert(AttrFlags::SYMLINK);
    }
    if input.is_special {
        flags.insert(AttrFlags::SPECIAL);
    }
    if input.readonly {
        flags.insert(AttrFlags::READONLY);
    }
    if input.hidden_os {
        flags.insert(AttrFlags::HIDDEN);
    }

    flags
}
