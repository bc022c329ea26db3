use std::io::ErrorKind;
use std::path::Path;

/// Reads the canonical version of the installation at `dir`.
///
/// Looks for `marker` directly inside `dir` (not recursively) and returns the
/// first line of it, trimmed.
///
/// Returns `Ok(None)` when there is no marker file: `dir` is not an
/// installation. An unreadable marker is an `Err`; callers skip the directory
/// in both cases. An empty first line comes back as `Some("")`.
pub fn probe(dir: &Path, marker: &str) -> std::io::Result<Option<String>> {
    let marker_path = dir.join(marker);
    let content = match std::fs::read_to_string(&marker_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let first = content.lines().next().unwrap_or_default();
    Ok(Some(first.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_probe_takes_trimmed_first_line() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("VERSION"), "go1.20.1  \r\ntime 2023-02-14\n").unwrap();
        assert_eq!(probe(dir.path(), "VERSION").unwrap(), Some("go1.20.1".to_string()));
    }

    #[test]
    fn test_probe_without_trailing_newline() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("VERSION"), "go1.21.0").unwrap();
        assert_eq!(probe(dir.path(), "VERSION").unwrap(), Some("go1.21.0".to_string()));
    }

    #[test]
    fn test_probe_missing_marker_is_absent() {
        let dir = tempdir().unwrap();
        assert_eq!(probe(dir.path(), "VERSION").unwrap(), None);
    }

    #[test]
    fn test_probe_ignores_nested_marker() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src").join("VERSION"), "go1.20.1\n").unwrap();
        assert_eq!(probe(dir.path(), "VERSION").unwrap(), None);
    }

    #[test]
    fn test_probe_empty_file_yields_empty_version() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("VERSION"), "").unwrap();
        assert_eq!(probe(dir.path(), "VERSION").unwrap(), Some(String::new()));
    }

    #[test]
    fn test_probe_unreadable_marker_is_error() {
        let dir = tempdir().unwrap();
        // a directory named like the marker cannot be read as a file
        std::fs::create_dir(dir.path().join("VERSION")).unwrap();
        assert!(probe(dir.path(), "VERSION").is_err());
    }
}
