use std::path::PathBuf;
use anyhow::{anyhow, Result};
use directories::ProjectDirs;

/// Overrides every per-user gvm directory when set.
pub const GVM_HOME_VAR: &str = "GVM_HOME";

/// Directory holding `config.toml`, `env.toml` and the session script.
pub fn get_global_config_dir() -> Result<PathBuf> {
    let (config_dir, _) = get_global_dirs()?;
    Ok(config_dir)
}

/// Directory holding downloaded toolchain archives.
pub fn get_global_cache_dir() -> Result<PathBuf> {
    let (_, cache_dir) = get_global_dirs()?;
    Ok(cache_dir)
}

pub fn get_global_dirs() -> Result<(PathBuf, PathBuf)> {
    if let Some(home) = std::env::var_os(GVM_HOME_VAR).filter(|h| !h.is_empty()) {
        let home = PathBuf::from(home);
        let cache_dir = home.join("cache");
        return Ok((home, cache_dir));
    }
    let proj_dirs = ProjectDirs::from("org", "gvm", "gvm")
        .ok_or_else(|| anyhow!("Could not get project directories"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    let cache_dir = proj_dirs.cache_dir().to_path_buf();

    Ok((config_dir, cache_dir))
}
