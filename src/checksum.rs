//! Content checksums for staleness detection
//!
//! Stage documents are hashed when written through the lifecycle manager;
//! the recorded checksum lets status reporting flag documents that were
//! edited out of band.

use sha2::{Digest, Sha256};

/// Normalize content before hashing
///
/// Prevents false "stale" detection from whitespace-only changes:
/// line endings become LF, trailing whitespace per line and trailing
/// newlines are dropped.
fn normalize_for_checksum(content: &str) -> String {
    content
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// SHA256 checksum of normalized content, as `sha256:<hex>`
pub fn calculate_checksum(content: &str) -> String {
    let normalized = normalize_for_checksum(content);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

/// True if `current_content` no longer matches the recorded checksum
pub fn is_stale(recorded_checksum: &str, current_content: &str) -> bool {
    recorded_checksum != calculate_checksum(current_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_format() {
        let checksum = calculate_checksum("hello");
        assert!(checksum.starts_with("sha256:"));
        assert_eq!(checksum.len(), "sha256:".len() + 64);
    }

    #[test]
    fn test_checksum_stable_across_line_endings() {
        let unix = calculate_checksum("line one\nline two\n");
        let windows = calculate_checksum("line one\r\nline two\r\n");
        assert_eq!(unix, windows);
    }

    #[test]
    fn test_trailing_whitespace_ignored() {
        let clean = calculate_checksum("line one\nline two");
        let padded = calculate_checksum("line one   \nline two\n\n");
        assert_eq!(clean, padded);
    }

    #[test]
    fn test_stale_detection() {
        let recorded = calculate_checksum("original");
        assert!(!is_stale(&recorded, "original"));
        assert!(is_stale(&recorded, "edited"));
    }
}
