//! Attribute collection: raw stat results normalized under a
//! source-permissions policy and a platform capability set.

use std::fs;
use std::path::Path;

use crate::error::MetadataError;
use crate::types::EntryKind;

/// Mode applied when source permissions are ignored. The metadata will be
/// applied to a freshly created file, so the source entry's bits are
/// irrelevant.
pub const DEFAULT_MODE: u32 = 0o644;

/// Sentinel owner and group identifiers reported on platforms with no native
/// ownership model. Fixed constants, not derived from any real account.
pub const SENTINEL_OWNER: u32 = 544;
pub const SENTINEL_GROUP: u32 = 0;

/// Whether collected owner/group/mode reflect the real entry or safe
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourcePermissions {
    /// Owner and group are the executing process; mode is [`DEFAULT_MODE`].
    #[default]
    Ignore,
    /// Owner, group, and mode taken verbatim from the stat result.
    Use,
}

/// What the running platform can report about ownership and mode.
///
/// Built once via [`PlatformCapabilities::detect`] and injected into the
/// collector; there is no platform-conditional subtype.
#[derive(Debug, Clone, Copy)]
pub struct PlatformCapabilities {
    /// Whether the platform has a native owner/group/mode model.
    pub native_permissions: bool,
    pub fallback_owner: u32,
    pub fallback_group: u32,
    pub fallback_mode: u32,
}

impl PlatformCapabilities {
    /// Capabilities of the platform this process runs on.
    pub fn detect() -> Self {
        if cfg!(unix) {
            Self::native()
        } else {
            Self::sentinel()
        }
    }

    /// A platform with real POSIX ownership and mode bits.
    pub fn native() -> Self {
        Self {
            native_permissions: true,
            fallback_owner: SENTINEL_OWNER,
            fallback_group: SENTINEL_GROUP,
            fallback_mode: DEFAULT_MODE,
        }
    }

    /// A platform without a POSIX permission model; the collector reports
    /// the fixed sentinels regardless of policy.
    pub fn sentinel() -> Self {
        Self {
            native_permissions: false,
            fallback_owner: SENTINEL_OWNER,
            fallback_group: SENTINEL_GROUP,
            fallback_mode: DEFAULT_MODE,
        }
    }
}

/// Normalized stat view produced by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryAttrs {
    pub owner: u32,
    pub group: u32,
    /// Raw mode as reported; callers mask to the permission bits.
    pub mode: u32,
    pub kind: EntryKind,
}

/// Translates a raw stat result into normalized owner/group/mode/kind values.
#[derive(Debug, Clone, Copy)]
pub struct AttrCollector {
    caps: PlatformCapabilities,
    policy: SourcePermissions,
}

impl AttrCollector {
    /// Build a collector for the given capability set and policy.
    ///
    /// `None` means the policy was left unset and behaves as `Ignore`.
    /// Requesting `Use` on a platform without native permissions is a
    /// configuration error and fails here, before any filesystem access.
    pub fn new(
        caps: PlatformCapabilities,
        policy: Option<SourcePermissions>,
    ) -> Result<Self, MetadataError> {
        let policy = policy.unwrap_or_default();
        if policy == SourcePermissions::Use && !caps.native_permissions {
            return Err(MetadataError::UnsupportedSourcePermissions(
                "use".to_string(),
            ));
        }
        Ok(Self { caps, policy })
    }

    /// Stat `path` and normalize the result.
    ///
    /// The trailing symlink is not followed: a link is reported as a link.
    /// Stat failures (not found, permission denied) propagate unmodified.
    pub fn collect(&self, path: &Path) -> Result<EntryAttrs, MetadataError> {
        let meta = fs::symlink_metadata(path).map_err(|e| MetadataError::io(path, e))?;
        let kind = EntryKind::from(meta.file_type());

        if !self.caps.native_permissions {
            return Ok(EntryAttrs {
                owner: self.caps.fallback_owner,
                group: self.caps.fallback_group,
                mode: self.caps.fallback_mode,
                kind,
            });
        }

        let attrs = match self.policy {
            SourcePermissions::Ignore => EntryAttrs {
                owner: process_owner(),
                group: process_group(),
                mode: DEFAULT_MODE,
                kind,
            },
            SourcePermissions::Use => EntryAttrs {
                owner: stat_owner(&meta),
                group: stat_group(&meta),
                mode: stat_mode(&meta),
                kind,
            },
        };
        Ok(attrs)
    }
}

#[cfg(unix)]
fn process_owner() -> u32 {
    // geteuid/getegid cannot fail.
    unsafe { libc::geteuid() }
}

#[cfg(unix)]
fn process_group() -> u32 {
    unsafe { libc::getegid() }
}

#[cfg(unix)]
fn stat_owner(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    meta.uid()
}

#[cfg(unix)]
fn stat_group(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    meta.gid()
}

#[cfg(unix)]
fn stat_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    meta.mode()
}

// Off Unix these paths are unreachable through `PlatformCapabilities::detect`;
// the sentinels keep a hand-built native capability set from reading garbage.
#[cfg(not(unix))]
fn process_owner() -> u32 {
    SENTINEL_OWNER
}

#[cfg(not(unix))]
fn process_group() -> u32 {
    SENTINEL_GROUP
}

#[cfg(not(unix))]
fn stat_owner(_meta: &fs::Metadata) -> u32 {
    SENTINEL_OWNER
}

#[cfg(not(unix))]
fn stat_group(_meta: &fs::Metadata) -> u32 {
    SENTINEL_GROUP
}

#[cfg(not(unix))]
fn stat_mode(_meta: &fs::Metadata) -> u32 {
    DEFAULT_MODE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_policy_rejected_without_native_permissions() {
        let err = AttrCollector::new(
            PlatformCapabilities::sentinel(),
            Some(SourcePermissions::Use),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MetadataError::UnsupportedSourcePermissions(_)
        ));
    }

    #[test]
    fn unset_policy_accepted_without_native_permissions() {
        assert!(AttrCollector::new(PlatformCapabilities::sentinel(), None).is_ok());
    }

    #[test]
    fn sentinel_platform_reports_fixed_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "a").unwrap();

        let collector = AttrCollector::new(PlatformCapabilities::sentinel(), None).unwrap();
        let attrs = collector.collect(&path).unwrap();
        assert_eq!(attrs.owner, SENTINEL_OWNER);
        assert_eq!(attrs.group, SENTINEL_GROUP);
        assert_eq!(attrs.mode, DEFAULT_MODE);
        assert_eq!(attrs.kind, EntryKind::File);
    }

    #[test]
    fn missing_path_propagates_not_found() {
        let collector = AttrCollector::new(PlatformCapabilities::detect(), None).unwrap();
        let err = collector
            .collect(Path::new("/no/such/entry"))
            .unwrap_err();
        assert!(matches!(err, MetadataError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn ignore_policy_uses_process_identity_and_default_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "a").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();

        let collector = AttrCollector::new(PlatformCapabilities::native(), None).unwrap();
        let attrs = collector.collect(&path).unwrap();
        assert_eq!(attrs.owner, unsafe { libc::geteuid() });
        assert_eq!(attrs.group, unsafe { libc::getegid() });
        assert_eq!(attrs.mode, DEFAULT_MODE);
    }

    #[cfg(unix)]
    #[test]
    fn use_policy_reports_stat_values() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "a").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();

        let collector = AttrCollector::new(
            PlatformCapabilities::native(),
            Some(SourcePermissions::Use),
        )
        .unwrap();
        let attrs = collector.collect(&path).unwrap();
        assert_eq!(attrs.mode & crate::types::MODE_MASK, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_reported_as_link_not_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, "a").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let collector = AttrCollector::new(PlatformCapabilities::native(), None).unwrap();
        let attrs = collector.collect(&link).unwrap();
        assert_eq!(attrs.kind, EntryKind::Link);
    }
}
