//! Fsmeta: Normalized Filesystem Entry Metadata
//!
//! Collects a platform-independent, checksum-typed description of a single
//! filesystem entry (type, permission metadata, content fingerprint) for
//! configuration-management agents comparing desired state against actual
//! state on a managed host.
//!
//! Collection is synchronous and performs blocking filesystem I/O on the
//! caller's thread; records share no mutable state, so callers fan out across
//! threads themselves when they need parallelism.

pub mod checksum;
pub mod collector;
pub mod config;
pub mod digest;
pub mod error;
pub mod metadata;
pub mod types;

pub use checksum::ChecksumType;
pub use collector::{AttrCollector, EntryAttrs, PlatformCapabilities, SourcePermissions};
pub use config::CoreConfig;
pub use digest::{Digester, FsDigester};
pub use error::MetadataError;
pub use metadata::Metadata;
pub use types::EntryKind;
