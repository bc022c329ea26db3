use std::fmt;
use std::path::Path;
use tracing::debug;

#[cfg(target_os = "windows")]
pub const PATH_LIST_SEPARATOR: char = ';';

#[cfg(not(target_os = "windows"))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Decides whether two paths denote the same physical directory.
pub trait DirIdentity {
    /// Paths that cannot be resolved are never the same as anything.
    fn same_directory(&self, a: &Path, b: &Path) -> bool;
}

/// Compares what the filesystem says, so symlinked, relative and
/// differently-cased spellings of one directory are equal.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileIdentity;

#[cfg(unix)]
impl DirIdentity for FileIdentity {
    fn same_directory(&self, a: &Path, b: &Path) -> bool {
        use std::os::unix::fs::MetadataExt;
        match (std::fs::metadata(a), std::fs::metadata(b)) {
            (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
            _ => false,
        }
    }
}

#[cfg(not(unix))]
impl DirIdentity for FileIdentity {
    fn same_directory(&self, a: &Path, b: &Path) -> bool {
        match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => {
                a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
            }
            _ => false,
        }
    }
}

/// Compares spelling only, ignoring trailing separators. Never touches the disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalIdentity;

impl DirIdentity for LexicalIdentity {
    fn same_directory(&self, a: &Path, b: &Path) -> bool {
        let a = a.to_string_lossy();
        let b = b.to_string_lossy();
        let a = a.trim_end_matches(['/', '\\']);
        let b = b.trim_end_matches(['/', '\\']);
        !a.is_empty() && a == b
    }
}

/// An ordered, delimiter-joined list of directories, e.g. the `PATH` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    entries: Vec<String>,
    separator: char,
}

impl SearchPath {
    pub fn parse(raw: &str, separator: char) -> SearchPath {
        let entries = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(separator).map(str::to_string).collect()
        };
        SearchPath { entries, separator }
    }

    /// Parses with the platform separator.
    pub fn from_raw(raw: &str) -> SearchPath {
        SearchPath::parse(raw, PATH_LIST_SEPARATOR)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Puts `new_bin` in front and drops every entry that is the same directory
    /// as `old_bin`. All other entries keep their relative order.
    pub fn rewrite(
        &self,
        old_bin: Option<&Path>,
        new_bin: &Path,
        identity: &impl DirIdentity,
    ) -> SearchPath {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(new_bin.to_string_lossy().into_owned());
        for entry in &self.entries {
            let stale = old_bin.is_some_and(|old| identity.same_directory(Path::new(entry), old));
            if stale {
                debug!(entry = %entry, "removing previous toolchain from search path");
                continue;
            }
            entries.push(entry.clone());
        }
        SearchPath {
            entries,
            separator: self.separator,
        }
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; 4];
        let separator: &str = self.separator.encode_utf8(&mut buf);
        write!(f, "{}", self.entries.join(separator))
    }
}
