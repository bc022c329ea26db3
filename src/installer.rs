use std::fs::File;
use std::path::{Path, PathBuf};
use anyhow::{bail, Context};
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use tracing::{debug, info, warn};
use crate::config::Config;
use crate::env::EnvironmentStore;
use crate::error::{GvmError, Result};
use crate::global::cache::{cache_archive, get_cached_archive, remove_cached_archive};
use crate::scan::{find_version, InstalledVersion};
use crate::switch::configured_root;
use crate::util::archive_name;

/// Gets a release onto disk.
pub trait Fetch {
    /// Downloads `canonical` (e.g. `go1.22.4`) built for `platform` and unpacks
    /// it as `dest_root/<canonical>`. Returns the installation directory.
    fn fetch(&self, canonical: &str, platform: &str, dest_root: &Path) -> anyhow::Result<PathBuf>;
}

/// Fetches official release archives over HTTPS, keeping them in the global cache.
pub struct HttpFetcher {
    base_url: String,
    client: Client,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> anyhow::Result<HttpFetcher> {
        let client = Client::builder()
            .user_agent(concat!("gvm/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Could not create HTTP client")?;
        Ok(HttpFetcher {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn download(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        println!("Downloading {url}");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()?;
        let bytes = response.bytes()?;
        debug!(url, size = bytes.len(), "download finished");
        Ok(bytes.to_vec())
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, canonical: &str, platform: &str, dest_root: &Path) -> anyhow::Result<PathBuf> {
        let file_name = archive_name(canonical, platform);
        let archive = match get_cached_archive(&file_name)? {
            Some(archive) => archive,
            None => {
                let url = format!("{}/{}", self.base_url, file_name);
                let bytes = self.download(&url)?;
                cache_archive(&file_name, &bytes)?
            }
        };
        let dest = dest_root.join(canonical);
        if let Err(e) = unpack_release(&archive, dest_root, &dest) {
            warn!(archive = %archive.display(), "dropping archive that failed to unpack");
            remove_cached_archive(&file_name)?;
            return Err(e);
        }
        Ok(dest)
    }
}

/// Unpacks a release archive (`.zip` or `.tar.gz`) whose top-level directory
/// is `go/` and moves that directory to `dest`.
///
/// Extraction happens in a hidden staging directory inside `dest_root`, so a
/// failed unpack never leaves a half-written installation behind.
pub fn unpack_release(archive: &Path, dest_root: &Path, dest: &Path) -> anyhow::Result<()> {
    let staging = tempfile::Builder::new()
        .prefix(".gvm-staging-")
        .tempdir_in(dest_root)
        .with_context(|| format!("Could not create staging directory in {}", dest_root.display()))?;
    extract_archive(archive, staging.path())?;

    let extracted = staging.path().join("go");
    if !extracted.is_dir() {
        bail!("{} has no top-level go/ directory", archive.display());
    }
    std::fs::rename(&extracted, dest)
        .with_context(|| format!("Could not move release into {}", dest.display()))?;
    Ok(())
}

fn extract_archive(archive: &Path, into: &Path) -> anyhow::Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("Could not open {}", archive.display()))?;
    let is_zip = archive.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if is_zip {
        let mut zip = zip::ZipArchive::new(file)?;
        zip.extract(into)?;
    } else {
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        tar.unpack(into)?;
    }
    Ok(())
}

/// `gvm install <version>`.
pub fn install_version(
    env: &impl EnvironmentStore,
    config: &Config,
    fetcher: &impl Fetch,
    request: &str,
    platform: &str,
) -> Result<PathBuf> {
    let root = configured_root(env, config)?;
    if request.trim().is_empty() {
        return Err(GvmError::MissingArgument("Version not specified."));
    }
    let canonical = config.canonical_version(request);
    let version = config.display_version(&canonical).to_string();

    let existing = match find_version(&root, config, &canonical)? {
        Some(installed) => Some(installed.path),
        None => Some(root.join(&canonical)).filter(|dest| dest.exists()),
    };
    if let Some(path) = existing {
        return Err(GvmError::AlreadyInstalled { version, path });
    }

    std::fs::create_dir_all(&root)
        .map_err(|e| GvmError::io("Could not create root directory", &root, e))?;
    info!(version = %canonical, platform, root = %root.display(), "installing");
    fetcher
        .fetch(&canonical, platform, &root)
        .map_err(|source| GvmError::Fetch { version, source })
}

/// `gvm uninstall <version>`: deletes the first directory carrying `request`.
pub fn uninstall_version(
    env: &impl EnvironmentStore,
    config: &Config,
    request: &str,
) -> Result<InstalledVersion> {
    let root = configured_root(env, config)?;
    if request.trim().is_empty() {
        return Err(GvmError::MissingArgument("A version to uninstall must be specified."));
    }
    let canonical = config.canonical_version(request);
    let installed = find_version(&root, config, &canonical)?.ok_or_else(|| {
        GvmError::VersionNotFound {
            action: "uninstall",
            version: config.display_version(&canonical).to_string(),
        }
    })?;
    std::fs::remove_dir_all(&installed.path)
        .map_err(|e| GvmError::io("Could not remove", &installed.path, e))?;
    info!(path = %installed.path.display(), "removed installation");
    Ok(installed)
}
