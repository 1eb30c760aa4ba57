//! Checksum type registry and `{type}value` label handling.
//!
//! Transmitted checksums always carry their algorithm name in braces, e.g.
//! `{sha256}9f86d0…`, so a receiver can verify with the right algorithm
//! without out-of-band context.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

/// Registered checksum algorithms, including the timestamp pseudo-digests.
///
/// Assigning an algorithm goes through [`FromStr`], which rejects unregistered
/// names immediately rather than at digest time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumType {
    #[default]
    Sha256,
    Sha512,
    Blake3,
    /// Modification time rendered as an RFC 3339 UTC timestamp.
    Mtime,
    /// Change time rendered as an RFC 3339 UTC timestamp.
    Ctime,
    /// No fingerprint; digests to the empty string.
    None,
}

impl ChecksumType {
    /// Every algorithm the registry knows about.
    pub const REGISTERED: [ChecksumType; 6] = [
        ChecksumType::Sha256,
        ChecksumType::Sha512,
        ChecksumType::Blake3,
        ChecksumType::Mtime,
        ChecksumType::Ctime,
        ChecksumType::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumType::Sha256 => "sha256",
            ChecksumType::Sha512 => "sha512",
            ChecksumType::Blake3 => "blake3",
            ChecksumType::Mtime => "mtime",
            ChecksumType::Ctime => "ctime",
            ChecksumType::None => "none",
        }
    }
}

impl fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumType {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(ChecksumType::Sha256),
            "sha512" => Ok(ChecksumType::Sha512),
            "blake3" => Ok(ChecksumType::Blake3),
            "mtime" => Ok(ChecksumType::Mtime),
            "ctime" => Ok(ChecksumType::Ctime),
            "none" => Ok(ChecksumType::None),
            other => Err(MetadataError::UnsupportedChecksumType(other.to_string())),
        }
    }
}

/// Render a digest value in the `{type}value` wire form.
pub fn format_label(kind: ChecksumType, value: &str) -> String {
    format!("{{{kind}}}{value}")
}

/// Split a `{type}value` label back into its algorithm and value.
pub fn split_label(label: &str) -> Result<(ChecksumType, &str), MetadataError> {
    let rest = label.strip_prefix('{').ok_or_else(|| {
        MetadataError::InvalidData(format!("checksum label missing type prefix: {label:?}"))
    })?;
    let (name, value) = rest.split_once('}').ok_or_else(|| {
        MetadataError::InvalidData(format!("unterminated checksum label: {label:?}"))
    })?;
    Ok((name.parse()?, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_registered_names() {
        for kind in ChecksumType::REGISTERED {
            assert_eq!(kind.as_str().parse::<ChecksumType>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_rejects_unregistered_name() {
        let err = "not_a_real_algorithm".parse::<ChecksumType>().unwrap_err();
        assert!(matches!(
            err,
            MetadataError::UnsupportedChecksumType(name) if name == "not_a_real_algorithm"
        ));
    }

    #[test]
    fn label_round_trip() {
        for kind in ChecksumType::REGISTERED {
            let label = format_label(kind, "abc123");
            let (parsed, value) = split_label(&label).unwrap();
            assert_eq!(parsed, kind);
            assert_eq!(value, "abc123");
        }
    }

    #[test]
    fn label_format_matches_wire_form() {
        assert_eq!(format_label(ChecksumType::Sha256, "deadbeef"), "{sha256}deadbeef");
    }

    #[test]
    fn split_label_rejects_malformed_input() {
        assert!(split_label("sha256:deadbeef").is_err());
        assert!(split_label("{sha256deadbeef").is_err());
        assert!(split_label("{md5}deadbeef").is_err());
    }
}
