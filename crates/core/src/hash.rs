//! Content hashing for change detection
//!
//! Hashes are hex SHA-1 digests, matching what the remote build pipeline
//! publishes in the manifest object table. They are an integrity check
//! only, not an authenticity guarantee.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::{Result, SyncError};

/// Compute the hex SHA-1 of a file's contents, streamed in fixed-size
/// chunks to bound memory on large objects.
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| SyncError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha1::new();

    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| SyncError::io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compute the hex SHA-1 of a byte slice.
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn hash_bytes_known_digest() {
        assert_eq!(
            hash_bytes(b"hello world"),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn hash_file_matches_hash_bytes() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        assert_eq!(hash_file(file.path())?, hash_bytes(b"hello world"));
        Ok(())
    }

    #[test]
    fn hash_file_missing_is_io_error() {
        let err = hash_file(Path::new("/nonexistent/file")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
