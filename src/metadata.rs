//! The metadata record: collection from a live path and conversion to and
//! from the structured wire form.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::checksum::{self, ChecksumType};
use crate::collector::{AttrCollector, PlatformCapabilities, SourcePermissions};
use crate::digest::Digester;
use crate::error::MetadataError;
use crate::types::{EntryKind, MODE_MASK};

/// Normalized, serializable description of a single filesystem entry.
///
/// A record is populated either by [`collect`](Metadata::collect) against a
/// live path or by [`from_data_hash`](Metadata::from_data_hash) at the wire
/// boundary, and is treated as immutable afterwards; callers needing fresh
/// metadata construct a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    path: PathBuf,
    owner: Option<u32>,
    group: Option<u32>,
    mode: Option<u32>,
    checksum_type: ChecksumType,
    checksum: Option<String>,
    ftype: Option<EntryKind>,
    destination: Option<PathBuf>,
    /// Keys owned by the enclosing file-reference entity; carried through a
    /// round trip untouched.
    extra: Map<String, Value>,
}

impl Metadata {
    /// New record for `path`, fingerprinting with the configured default
    /// digest algorithm. `path` is expected to already be absolute; relative
    /// paths are the caller's base-directory concern.
    pub fn new(path: impl Into<PathBuf>, default_algorithm: ChecksumType) -> Self {
        Self {
            path: path.into(),
            owner: None,
            group: None,
            mode: None,
            checksum_type: default_algorithm,
            checksum: None,
            ftype: None,
            destination: None,
            extra: Map::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn owner(&self) -> Option<u32> {
        self.owner
    }

    pub fn group(&self) -> Option<u32> {
        self.group
    }

    /// Permission bits, always masked to [`MODE_MASK`].
    pub fn mode(&self) -> Option<u32> {
        self.mode
    }

    pub fn checksum_type(&self) -> ChecksumType {
        self.checksum_type
    }

    /// Fingerprint in `{type}value` form, when one has been computed.
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    pub fn ftype(&self) -> Option<EntryKind> {
        self.ftype
    }

    /// Link target; present if and only if the entry is a link.
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Override the digest algorithm by registered name.
    ///
    /// Unregistered names fail here, before any filesystem access.
    pub fn set_checksum_type(&mut self, name: &str) -> Result<(), MetadataError> {
        self.checksum_type = name.parse()?;
        Ok(())
    }

    /// Populate owner/group/mode/type from the filesystem and compute the
    /// entry's fingerprint.
    ///
    /// Directories are always timestamped rather than content-checksummed:
    /// the checksum type is forced to `ctime` no matter what was requested.
    /// A failed link checksum (broken target) is tolerated and leaves the
    /// checksum unset; every other failure propagates. Re-invoking overwrites
    /// the previous result.
    pub fn collect(
        &mut self,
        policy: Option<SourcePermissions>,
        caps: PlatformCapabilities,
        digester: &dyn Digester,
    ) -> Result<(), MetadataError> {
        let collector = AttrCollector::new(caps, policy)?;
        let attrs = collector.collect(&self.path)?;

        self.owner = Some(attrs.owner);
        self.group = Some(attrs.group);
        self.mode = Some(attrs.mode & MODE_MASK);
        self.ftype = Some(attrs.kind);
        self.checksum = None;
        self.destination = None;

        match attrs.kind {
            EntryKind::File => {
                let value = digester.digest(self.checksum_type, &self.path)?;
                self.checksum = Some(checksum::format_label(self.checksum_type, &value));
            }
            EntryKind::Directory => {
                self.checksum_type = ChecksumType::Ctime;
                let value = digester.digest(ChecksumType::Ctime, &self.path)?;
                self.checksum = Some(checksum::format_label(ChecksumType::Ctime, &value));
            }
            EntryKind::Link => {
                let target =
                    fs::read_link(&self.path).map_err(|e| MetadataError::io(&self.path, e))?;
                self.destination = Some(target);
                match digester.digest(self.checksum_type, &self.path) {
                    Ok(value) => {
                        self.checksum =
                            Some(checksum::format_label(self.checksum_type, &value));
                    }
                    Err(err) => {
                        debug!(path = %self.path.display(), %err, "link checksum skipped");
                    }
                }
            }
            EntryKind::Unsupported => {
                return Err(MetadataError::UnsupportedFileType {
                    path: self.path.clone(),
                    ftype: EntryKind::Unsupported.as_str().to_string(),
                });
            }
        }

        debug!(
            path = %self.path.display(),
            ftype = %attrs.kind,
            checksum_type = %self.checksum_type,
            "collected metadata"
        );
        Ok(())
    }

    /// Serialize to the generic string-keyed structured form.
    ///
    /// The checksum is emitted as a nested object with `type` and `value`
    /// sub-fields; pass-through keys reappear at the top level.
    pub fn to_data_hash(&self) -> Result<Map<String, Value>, MetadataError> {
        let data = MetadataData {
            path: self.path.clone(),
            owner: self.owner,
            group: self.group,
            mode: self.mode,
            checksum: Some(ChecksumData {
                kind: self.checksum_type,
                value: self.checksum.clone(),
            }),
            ftype: self.ftype,
            destination: self.destination.clone(),
            extra: self.extra.clone(),
        };
        let value = serde_json::to_value(data)
            .map_err(|e| MetadataError::InvalidData(e.to_string()))?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(MetadataError::InvalidData(format!(
                "expected structured form to be an object, got {other}"
            ))),
        }
    }

    /// Rebuild a record from the structured form.
    ///
    /// `path` is extracted first; when no checksum object is present the
    /// checksum type defaults to `default_algorithm`. Keys this core does not
    /// recognize are retained and re-emitted by
    /// [`to_data_hash`](Metadata::to_data_hash).
    pub fn from_data_hash(
        data: Map<String, Value>,
        default_algorithm: ChecksumType,
    ) -> Result<Self, MetadataError> {
        if !data.contains_key("path") {
            return Err(MetadataError::InvalidData(
                "structured form is missing the path key".to_string(),
            ));
        }
        let data: MetadataData = serde_json::from_value(Value::Object(data))
            .map_err(|e| MetadataError::InvalidData(e.to_string()))?;

        let (checksum_type, checksum) = match data.checksum {
            Some(c) => (c.kind, c.value),
            None => (default_algorithm, None),
        };

        Ok(Self {
            path: data.path,
            owner: data.owner,
            group: data.group,
            mode: data.mode,
            checksum_type,
            checksum,
            ftype: data.ftype,
            destination: data.destination,
            extra: data.extra,
        })
    }
}

/// Nested checksum object in the structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChecksumData {
    #[serde(rename = "type")]
    kind: ChecksumType,
    value: Option<String>,
}

/// Wire shape of a record. Unrecognized keys land in `extra`.
#[derive(Debug, Serialize, Deserialize)]
struct MetadataData {
    path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    checksum: Option<ChecksumData>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    ftype: Option<EntryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    destination: Option<PathBuf>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_checksum_type_rejects_unregistered_before_any_io() {
        let mut record = Metadata::new("/definitely/not/here", ChecksumType::Sha256);
        let err = record.set_checksum_type("not_a_real_algorithm").unwrap_err();
        assert!(matches!(err, MetadataError::UnsupportedChecksumType(_)));
        // Unchanged on failure.
        assert_eq!(record.checksum_type(), ChecksumType::Sha256);
    }

    #[test]
    fn data_hash_contains_nested_checksum_object() {
        let mut record = Metadata::new("/etc/motd", ChecksumType::Sha256);
        record.set_checksum_type("blake3").unwrap();
        let map = record.to_data_hash().unwrap();
        assert_eq!(map["path"], json!("/etc/motd"));
        assert_eq!(map["checksum"]["type"], json!("blake3"));
        assert_eq!(map["checksum"]["value"], Value::Null);
    }

    #[test]
    fn from_data_hash_defaults_checksum_type_when_absent() {
        let mut map = Map::new();
        map.insert("path".to_string(), json!("/etc/motd"));
        let record = Metadata::from_data_hash(map, ChecksumType::Blake3).unwrap();
        assert_eq!(record.checksum_type(), ChecksumType::Blake3);
        assert_eq!(record.checksum(), None);
    }

    #[test]
    fn from_data_hash_requires_path() {
        let map = Map::new();
        let err = Metadata::from_data_hash(map, ChecksumType::Sha256).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidData(_)));
    }

    #[test]
    fn from_data_hash_rejects_unregistered_checksum_type() {
        let mut map = Map::new();
        map.insert("path".to_string(), json!("/etc/motd"));
        map.insert(
            "checksum".to_string(),
            json!({"type": "md5", "value": "{md5}abc"}),
        );
        assert!(Metadata::from_data_hash(map, ChecksumType::Sha256).is_err());
    }

    #[test]
    fn unknown_keys_pass_through_round_trip() {
        let mut map = Map::new();
        map.insert("path".to_string(), json!("/srv/app/config"));
        map.insert("relative_path".to_string(), json!("app/config"));
        map.insert("links".to_string(), json!("manage"));

        let record = Metadata::from_data_hash(map, ChecksumType::Sha256).unwrap();
        let out = record.to_data_hash().unwrap();
        assert_eq!(out["relative_path"], json!("app/config"));
        assert_eq!(out["links"], json!("manage"));
    }
}
