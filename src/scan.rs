use std::collections::HashSet;
use std::path::{Path, PathBuf};
use regex::Regex;
use tracing::{debug, trace};
use walkdir::WalkDir;
use crate::config::Config;
use crate::error::{GvmError, Result};
use crate::probe::probe;
use crate::search_path::DirIdentity;

/// One installed toolchain found under the configured root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    /// Name of the directory under the root, e.g. `golatest`.
    pub directory_name: String,
    /// First line of the marker file, e.g. `go1.20.1`.
    pub canonical_version: String,
    /// Full path of the installation directory.
    pub path: PathBuf,
}

impl InstalledVersion {
    /// `true` when the directory is named after something other than its version.
    pub fn is_aliased(&self) -> bool {
        self.directory_name != self.canonical_version
    }
    /// Directory holding the toolchain executables.
    pub fn bin_dir(&self) -> PathBuf {
        self.path.join("bin")
    }
}

/// Lazily walks the immediate subdirectories of a root and yields each distinct
/// installed version once.
///
/// Enumeration order is whatever the filesystem returns; it is not sorted. When
/// two directories carry the same canonical version the first one wins and the
/// later one is skipped. Stop iterating to stop scanning.
pub struct Scanner {
    entries: walkdir::IntoIter,
    pattern: Regex,
    marker: String,
    seen: HashSet<String>,
}

impl Scanner {
    pub fn new<P: AsRef<Path>>(root: P, pattern: Regex, marker: &str) -> Scanner {
        let entries = WalkDir::new(root.as_ref())
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter();
        Scanner {
            entries,
            pattern,
            marker: marker.to_string(),
            seen: HashSet::new(),
        }
    }

    /// Scanner using the pattern and marker file from `config`.
    pub fn from_config<P: AsRef<Path>>(root: P, config: &Config) -> Result<Scanner> {
        let pattern = config.dir_regex().map_err(GvmError::Config)?;
        Ok(Scanner::new(root, pattern, &config.marker_file))
    }

    fn candidate(&mut self, entry: walkdir::DirEntry) -> Option<InstalledVersion> {
        if !entry.file_type().is_dir() {
            return None;
        }
        let directory_name = entry.file_name().to_str()?.to_string();
        if !self.pattern.is_match(&directory_name) {
            trace!(dir = %directory_name, "name does not match pattern");
            return None;
        }
        let canonical_version = match probe(entry.path(), &self.marker) {
            Ok(Some(version)) if !version.is_empty() => version,
            Ok(Some(_)) => {
                debug!(dir = %directory_name, "empty {} file, skipping", self.marker);
                return None;
            }
            Ok(None) => {
                trace!(dir = %directory_name, "no {} file", self.marker);
                return None;
            }
            Err(e) => {
                debug!(dir = %directory_name, error = %e, "could not read {}", self.marker);
                return None;
            }
        };
        if !self.seen.insert(canonical_version.clone()) {
            debug!(dir = %directory_name, version = %canonical_version, "duplicate version, skipping");
            return None;
        }
        Some(InstalledVersion {
            directory_name,
            canonical_version,
            path: entry.into_path(),
        })
    }
}

impl Iterator for Scanner {
    type Item = InstalledVersion;

    fn next(&mut self) -> Option<InstalledVersion> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if let Some(found) = self.candidate(entry) {
                return Some(found);
            }
        }
    }
}

/// Scans `root` until the first installation whose canonical version is `canonical`.
pub fn find_version(root: &Path, config: &Config, canonical: &str) -> Result<Option<InstalledVersion>> {
    let found = Scanner::from_config(root, config)?
        .find(|installed| installed.canonical_version == canonical);
    Ok(found)
}

/// A line of `gvm list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedVersion {
    pub installed: InstalledVersion,
    /// The installation the active root pointer refers to.
    pub active: bool,
}

/// Scans all of `root`, marking the installation that `active_root` points at.
pub fn list_versions(
    root: &Path,
    config: &Config,
    active_root: Option<&Path>,
    identity: &impl DirIdentity,
) -> Result<Vec<ListedVersion>> {
    let listed = Scanner::from_config(root, config)?
        .map(|installed| {
            let active = active_root
                .is_some_and(|active| identity.same_directory(&installed.path, active));
            ListedVersion { installed, active }
        })
        .collect();
    Ok(listed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_path::LexicalIdentity;
    use tempfile::tempdir;

    fn install(root: &Path, dir: &str, marker: &str) -> PathBuf {
        let path = root.join(dir);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("VERSION"), marker).unwrap();
        path
    }

    fn scan_all(root: &Path) -> Vec<InstalledVersion> {
        Scanner::from_config(root, &Config::default()).unwrap().collect()
    }

    #[test]
    fn test_scan_finds_marked_directories() {
        let root = tempdir().unwrap();
        install(root.path(), "go1.20.1", "go1.20.1\ntime x\n");
        install(root.path(), "go1.21.0", "go1.21.0\n");

        let mut versions: Vec<_> = scan_all(root.path())
            .into_iter()
            .map(|v| v.canonical_version)
            .collect();
        versions.sort();
        assert_eq!(versions, vec!["go1.20.1", "go1.21.0"]);
    }

    #[test]
    fn test_scan_skips_non_matching_and_unmarked() {
        let root = tempdir().unwrap();
        install(root.path(), "python3", "go1.20.1\n");
        std::fs::create_dir(root.path().join("go1.19.0")).unwrap();
        std::fs::write(root.path().join("go1.18.0"), "not a dir").unwrap();

        assert!(scan_all(root.path()).is_empty());
    }

    #[test]
    fn test_scan_skips_empty_version() {
        let root = tempdir().unwrap();
        install(root.path(), "goempty", "\n");
        assert!(scan_all(root.path()).is_empty());
    }

    #[test]
    fn test_scan_skips_only_unreadable_marker() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("go1.20.1").join("VERSION")).unwrap();
        let readable = install(root.path(), "go1.21.0", "go1.21.0\n");

        let scanned = scan_all(root.path());
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].path, readable);
        assert!(find_version(root.path(), &Config::default(), "go1.20.1").unwrap().is_none());
    }

    #[test]
    fn test_scan_dedups_first_seen_wins() {
        let root = tempdir().unwrap();
        install(root.path(), "go1.20.1", "go1.20.1\n");
        install(root.path(), "golatest", "go1.20.1\n");

        let first_seen = WalkDir::new(root.path())
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .next()
            .unwrap()
            .unwrap()
            .file_name()
            .to_string_lossy()
            .to_string();

        let scanned = scan_all(root.path());
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].canonical_version, "go1.20.1");
        assert_eq!(scanned[0].directory_name, first_seen);
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let root = tempdir().unwrap();
        assert!(scan_all(&root.path().join("nope")).is_empty());
    }

    #[test]
    fn test_scan_is_lazy() {
        let root = tempdir().unwrap();
        install(root.path(), "go1.20.1", "go1.20.1\n");
        install(root.path(), "go1.21.0", "go1.21.0\n");
        install(root.path(), "go1.22.0", "go1.22.0\n");

        let mut scanner = Scanner::from_config(root.path(), &Config::default()).unwrap();
        assert!(scanner.next().is_some());
        assert_eq!(scanner.count(), 2);
    }

    #[test]
    fn test_find_version_matches_canonical_not_dir_name() {
        let root = tempdir().unwrap();
        let path = install(root.path(), "golatest", "go1.22.0\n");

        let found = find_version(root.path(), &Config::default(), "go1.22.0").unwrap().unwrap();
        assert_eq!(found.path, path);
        assert!(found.is_aliased());
        assert!(find_version(root.path(), &Config::default(), "golatest").unwrap().is_none());
    }

    #[test]
    fn test_list_marks_active() {
        let root = tempdir().unwrap();
        let active = install(root.path(), "go1.20.1", "go1.20.1\n");
        install(root.path(), "go1.21.0", "go1.21.0\n");

        let listed = list_versions(root.path(), &Config::default(), Some(&active), &LexicalIdentity).unwrap();
        assert_eq!(listed.len(), 2);
        for line in listed {
            assert_eq!(line.active, line.installed.path == active);
        }
    }
}
