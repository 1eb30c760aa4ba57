//! Core types shared by collection and serialization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Low 12 permission bits. Higher type bits from the raw stat mode never
/// reach a record or its serialized form.
pub const MODE_MASK: u32 = 0o7777;

/// Classification of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Link,
    /// Sockets, devices, pipes. Collection refuses these; the variant exists
    /// so the match on entry kind stays exhaustive.
    #[serde(rename = "other")]
    Unsupported,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Link => "link",
            EntryKind::Unsupported => "other",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<std::fs::FileType> for EntryKind {
    fn from(ft: std::fs::FileType) -> Self {
        if ft.is_file() {
            EntryKind::File
        } else if ft.is_dir() {
            EntryKind::Directory
        } else if ft.is_symlink() {
            EntryKind::Link
        } else {
            EntryKind::Unsupported
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_mask_strips_type_bits() {
        assert_eq!(0o120644 & MODE_MASK, 0o644);
        assert_eq!(0o100755 & MODE_MASK, 0o755);
        assert_eq!(0o7777 & MODE_MASK, 0o7777);
    }

    #[test]
    fn entry_kind_wire_names() {
        assert_eq!(EntryKind::File.as_str(), "file");
        assert_eq!(EntryKind::Directory.as_str(), "directory");
        assert_eq!(EntryKind::Link.as_str(), "link");
        assert_eq!(EntryKind::Unsupported.as_str(), "other");
    }

    #[test]
    fn entry_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EntryKind::Link).unwrap();
        assert_eq!(json, "\"link\"");
        let kind: EntryKind = serde_json::from_str("\"other\"").unwrap();
        assert_eq!(kind, EntryKind::Unsupported);
    }
}
