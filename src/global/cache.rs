use std::path::PathBuf;
use crate::global::utils::get_global_cache_dir;
use anyhow::{Context, Result};
use tracing::debug;

/// Returns the cached copy of `file_name` (e.g. `go1.22.4.linux-amd64.tar.gz`), if any.
pub fn get_cached_archive(file_name: &str) -> Result<Option<PathBuf>> {
    let archive_path = get_global_cache_dir()?.join(file_name);
    if archive_path.is_file() {
        debug!(path = %archive_path.display(), "archive cache hit");
        Ok(Some(archive_path))
    }
    else {
        Ok(None)
    }
}

/// Stores a downloaded archive. A partially written file never lands under the
/// final name.
pub fn cache_archive(file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let cache_dir = get_global_cache_dir()?;
    if !cache_dir.exists() {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Could not create cache dir {:?}", cache_dir))?;
        debug!(path = %cache_dir.display(), "cache directory created");
    }
    let path = cache_dir.join(file_name);
    let mut tmp = tempfile::NamedTempFile::new_in(&cache_dir)
        .with_context(|| format!("Could not create cache file in {:?}", cache_dir))?;
    std::io::Write::write_all(&mut tmp, bytes)?;
    tmp.persist(&path)
        .with_context(|| format!("Could not create cache file {:?}", path))?;
    Ok(path)
}

/// Drops a corrupt or unwanted archive from the cache.
pub fn remove_cached_archive(file_name: &str) -> Result<()> {
    let path = get_global_cache_dir()?.join(file_name);
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("Could not remove cached archive {:?}", path))?;
    }
    Ok(())
}
