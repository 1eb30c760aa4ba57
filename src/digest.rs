//! Filesystem digest provider behind the [`Digester`] seam.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256, Sha512};

use crate::checksum::ChecksumType;
use crate::error::MetadataError;

/// Pluggable digest boundary: one string digest per registered algorithm.
///
/// The default provider is [`FsDigester`]; tests and callers with remote
/// content can substitute their own.
pub trait Digester {
    fn digest(&self, algorithm: ChecksumType, path: &Path) -> Result<String, MetadataError>;
}

/// Digest provider backed by the local filesystem.
///
/// Content algorithms open the path (following symlinks), so digesting a
/// broken link fails with the underlying not-found error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDigester;

const READ_BUF_SIZE: usize = 64 * 1024;

impl Digester for FsDigester {
    fn digest(&self, algorithm: ChecksumType, path: &Path) -> Result<String, MetadataError> {
        match algorithm {
            ChecksumType::Sha256 => hash_file::<Sha256>(path),
            ChecksumType::Sha512 => hash_file::<Sha512>(path),
            ChecksumType::Blake3 => blake3_file(path),
            ChecksumType::Mtime => mtime(path),
            ChecksumType::Ctime => ctime(path),
            ChecksumType::None => Ok(String::new()),
        }
    }
}

fn hash_file<D: Digest>(path: &Path) -> Result<String, MetadataError> {
    let mut file = File::open(path).map_err(|e| MetadataError::io(path, e))?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; READ_BUF_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|e| MetadataError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn blake3_file(path: &Path) -> Result<String, MetadataError> {
    let mut file = File::open(path).map_err(|e| MetadataError::io(path, e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; READ_BUF_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|e| MetadataError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

fn mtime(path: &Path) -> Result<String, MetadataError> {
    let meta = std::fs::metadata(path).map_err(|e| MetadataError::io(path, e))?;
    let modified = meta.modified().map_err(|e| MetadataError::io(path, e))?;
    Ok(render_timestamp(DateTime::<Utc>::from(modified)))
}

#[cfg(unix)]
fn ctime(path: &Path) -> Result<String, MetadataError> {
    use std::os::unix::fs::MetadataExt;

    let meta = std::fs::metadata(path).map_err(|e| MetadataError::io(path, e))?;
    let ts = DateTime::from_timestamp(meta.ctime(), meta.ctime_nsec() as u32).ok_or_else(|| {
        MetadataError::InvalidData(format!("change time out of range for {}", path.display()))
    })?;
    Ok(render_timestamp(ts))
}

// No separate change time off Unix; modification time is the closest signal.
#[cfg(not(unix))]
fn ctime(path: &Path) -> Result<String, MetadataError> {
    mtime(path)
}

fn render_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
