// src/sigfile.rs
// Reads signify key and signature files: an optional "untrusted comment:"
// line followed by a single base64 payload line.

use std::fs;
use std::path::Path;

pub const COMMENT_HEADER: &str = "untrusted comment:";

/// Extracts the base64 payload line from signify file contents.
///
/// Comment lines and blank lines are skipped; the first remaining line is
/// returned as-is. A bare base64 string with no comment line passes through
/// unchanged. Whether the payload is a well-formed blob is not decided here.
pub fn base64_payload(contents: &str) -> Result<&str, Box<dyn std::error::Error>> {
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_HEADER) {
            continue;
        }
        return Ok(line);
    }
    Err("no base64 payload line found".into())
}

/// Reads a signify key or signature file and returns its base64 payload.
pub fn read_base64_file(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    Ok(base64_payload(&contents)
        .map_err(|e| format!("{}: {}", path.display(), e))?
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_untrusted_comment_line() {
        let contents = "untrusted comment: verify with release.pub\nQUJDRA==\n";
        assert_eq!(base64_payload(contents).unwrap(), "QUJDRA==");
    }

    #[test]
    fn accepts_bare_payload() {
        assert_eq!(base64_payload("QUJDRA==").unwrap(), "QUJDRA==");
    }

    #[test]
    fn skips_leading_blank_lines() {
        assert_eq!(base64_payload("\n\nQUJDRA==\n").unwrap(), "QUJDRA==");
    }

    #[test]
    fn rejects_file_with_only_comments() {
        assert!(base64_payload("untrusted comment: nothing else here\n").is_err());
        assert!(base64_payload("").is_err());
    }

    #[test]
    fn reads_payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("release.pub");
        fs::write(&path, "untrusted comment: release key\nQUJDRA==\n").unwrap();
        assert_eq!(read_base64_file(&path).unwrap(), "QUJDRA==");
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let err = read_base64_file(Path::new("/nonexistent/release.pub")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/release.pub"));
    }
}
