use std::path::Path;
use serde::Deserialize;
use anyhow::{Context, Result};
use regex::Regex;
use crate::global::utils::get_global_config_dir;

pub const CONFIG_FILE: &str = "config.toml";

/// Represents the contents of `<gvm home>/config.toml`.
///
/// Every key is optional in the file; missing keys take the defaults below.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Variable naming the directory that holds every installed version.
    pub root_var: String,
    /// Variable naming the directory of the active version.
    pub active_root_var: String,
    /// The executable search path variable.
    pub path_var: String,
    /// File inside an installation whose first line is its canonical version.
    pub marker_file: String,
    /// Prefix of every canonical version, e.g. `go` in `go1.22.4`.
    pub product_prefix: String,
    /// Directory names under the root that are considered at all.
    pub dir_pattern: String,
    /// Base URL release archives are downloaded from.
    pub download_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_var: "GVMROOT".to_string(),
            active_root_var: "GOROOT".to_string(),
            path_var: "PATH".to_string(),
            marker_file: "VERSION".to_string(),
            product_prefix: "go".to_string(),
            dir_pattern: r"^go(\d+\.\d+\.\d+)?".to_string(),
            download_url: "https://go.dev/dl".to_string(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the gvm home, or the defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load_or_default() -> Result<Config> {
        let path = get_global_config_dir()?.join(CONFIG_FILE);
        if path.exists() {
            Config::load(&path)
        }
        else {
            Ok(Config::default())
        }
    }
    /// Loads a `Config` from a file path.
    ///
    /// # Errors
    /// Returns an error if the file can't be read, deserialized, or its
    /// `dir_pattern` is not a valid regex.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Could not parse {}", path.display()))?;
        config.dir_regex()?;
        Ok(config)
    }
    /// Compiles `dir_pattern`.
    pub fn dir_regex(&self) -> Result<Regex> {
        Regex::new(&self.dir_pattern)
            .with_context(|| format!("Invalid dir_pattern '{}'", self.dir_pattern))
    }
    /// Turns a user request (`1.22.4` or `go1.22.4`) into a canonical version.
    pub fn canonical_version(&self, request: &str) -> String {
        let request = request.trim();
        if request.starts_with(&self.product_prefix) {
            request.to_string()
        } else {
            format!("{}{}", self.product_prefix, request)
        }
    }
    /// Strips the product prefix for display: `go1.22.4` becomes `1.22.4`.
    pub fn display_version<'a>(&self, canonical: &'a str) -> &'a str {
        canonical.strip_prefix(&self.product_prefix).unwrap_or(canonical)
    }
}
