// src/digest.rs
// SHA-256 checksums for downloaded artifacts, compared against the hashes
// listed in the signature-verified repository metadata.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Compute the SHA-256 checksum of a file, returning lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {}", path.display(), e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Checks a file against an expected SHA-256 hex digest.
///
/// The comparison ignores ASCII case in `expected_hex`; metadata files are
/// not consistent about it.
pub fn matches_sha256(path: &Path, expected_hex: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let actual = sha256_file(path)?;
    Ok(actual.eq_ignore_ascii_case(expected_hex.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    // SHA-256 of the three bytes "abc".
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn file_with(contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn hashes_known_vector() {
        let (_dir, path) = file_with(b"abc");
        assert_eq!(sha256_file(&path).unwrap(), ABC_SHA256);
    }

    #[test]
    fn comparison_ignores_hex_case() {
        let (_dir, path) = file_with(b"abc");
        assert!(matches_sha256(&path, &ABC_SHA256.to_uppercase()).unwrap());
    }

    #[test]
    fn detects_mismatch() {
        let (_dir, path) = file_with(b"abd");
        assert!(!matches_sha256(&path, ABC_SHA256).unwrap());
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let err = sha256_file(Path::new("/nonexistent/artifact")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/artifact"));
    }
}
