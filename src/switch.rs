use std::path::{Path, PathBuf};
use tracing::debug;
use crate::config::Config;
use crate::env::{set_scoped, EnvironmentStore, Scope};
use crate::error::{GvmError, Result};
use crate::scan::{find_version, InstalledVersion};
use crate::search_path::{DirIdentity, SearchPath};
use crate::util::absolute_path;

/// Result of pointing the active root at a new directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// New value of the active root pointer.
    pub root: PathBuf,
    /// New value of the search path.
    pub search_path: String,
}

/// Returns the configured root, or the "not set" error every scan-based
/// command reports.
pub fn configured_root(env: &impl EnvironmentStore, config: &Config) -> Result<PathBuf> {
    env.get(&config.root_var)
        .filter(|root| !root.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| GvmError::RootNotSet {
            var: config.root_var.clone(),
        })
}

/// Returns the directory the active root pointer names, if any.
pub fn active_root(env: &impl EnvironmentStore, config: &Config) -> Option<PathBuf> {
    env.get(&config.active_root_var)
        .filter(|root| !root.trim().is_empty())
        .map(PathBuf::from)
}

/// Stores `path` as the configured root, for this session and every later one.
pub fn set_configured_root(
    env: &mut impl EnvironmentStore,
    config: &Config,
    path: &str,
) -> Result<PathBuf> {
    let root = absolute_path(path)?;
    let mut failures = Vec::new();
    set_scoped(env, Scope::Persistent, &config.root_var, &root.to_string_lossy(), &mut failures);
    report(failures)?;
    Ok(root)
}

/// Makes `new_root` the active toolchain.
///
/// The previous active root's `bin` directory is taken out of the search path
/// and `new_root/bin` goes in front. Both variables are written even if the
/// first write fails.
pub fn switch_root(
    env: &mut impl EnvironmentStore,
    config: &Config,
    identity: &impl DirIdentity,
    new_root: &Path,
    scope: Scope,
) -> Result<Activation> {
    let old_bin = active_root(env, config).map(|root| root.join("bin"));
    let new_bin = new_root.join("bin");
    let current = env.get(&config.path_var).unwrap_or_default();
    let search_path = SearchPath::from_raw(&current)
        .rewrite(old_bin.as_deref(), &new_bin, identity)
        .to_string();
    debug!(old = ?old_bin, new = %new_bin.display(), "rewrote search path");

    let mut failures = Vec::new();
    set_scoped(env, scope, &config.active_root_var, &new_root.to_string_lossy(), &mut failures);
    set_scoped(env, scope, &config.path_var, &search_path, &mut failures);
    report(failures)?;

    Ok(Activation {
        root: new_root.to_path_buf(),
        search_path,
    })
}

/// `gvm goroot <path>`: points the active root at an arbitrary directory.
pub fn set_active_root(
    env: &mut impl EnvironmentStore,
    config: &Config,
    identity: &impl DirIdentity,
    path: &str,
    scope: Scope,
) -> Result<Activation> {
    let new_root = absolute_path(path)?;
    switch_root(env, config, identity, &new_root, scope)
}

/// `gvm use <version>`: activates the installed directory carrying `request`.
pub fn use_version(
    env: &mut impl EnvironmentStore,
    config: &Config,
    identity: &impl DirIdentity,
    request: &str,
    scope: Scope,
) -> Result<(InstalledVersion, Activation)> {
    let root = configured_root(env, config)?;
    if request.trim().is_empty() {
        return Err(GvmError::MissingArgument("A new version must be specified."));
    }
    let canonical = config.canonical_version(request);
    let installed = find_version(&root, config, &canonical)?.ok_or_else(|| {
        GvmError::VersionNotFound {
            action: "use",
            version: config.display_version(&canonical).to_string(),
        }
    })?;
    let activation = switch_root(env, config, identity, &installed.path, scope)?;
    Ok((installed, activation))
}

fn report(failures: Vec<String>) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    for failure in &failures {
        debug!(failure = %failure, "environment write failed");
    }
    Err(GvmError::Environment(failures))
}
