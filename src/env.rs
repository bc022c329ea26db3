//! Where gvm reads and writes `GVMROOT`, `GOROOT` and `PATH`.
//!
//! A child process cannot change its parent shell's environment, so session
//! writes are collected and emitted as a script for the shell (or a wrapper
//! around `gvm`) to source. Persistent writes go to `env.toml` in the gvm home
//! and are mirrored into a profile script that new shells source.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::search_path::PATH_LIST_SEPARATOR;

/// Read and write access to environment variables.
pub trait EnvironmentStore {
    fn get(&self, name: &str) -> Option<String>;
    /// Sets `name` for the current shell session only.
    fn set_session(&mut self, name: &str, value: &str) -> Result<()>;
    /// Sets `name` for every future session.
    fn set_persistent(&mut self, name: &str, value: &str) -> Result<()>;
}

/// Which stores a write goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Session,
    /// Session and persistent store.
    Persistent,
}

/// Writes `value` to every store `scope` covers, attempting all of them.
///
/// A failed write is recorded in `failures` and does not stop the next one.
pub fn set_scoped(
    env: &mut impl EnvironmentStore,
    scope: Scope,
    name: &str,
    value: &str,
    failures: &mut Vec<String>,
) {
    if let Err(e) = env.set_session(name, value) {
        failures.push(format!("{name} (session): {e:#}"));
    }
    if scope == Scope::Persistent {
        if let Err(e) = env.set_persistent(name, value) {
            failures.push(format!("{name} (persistent): {e:#}"));
        }
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryEnvironment {
    pub session: BTreeMap<String, String>,
    pub persistent: BTreeMap<String, String>,
}

impl MemoryEnvironment {
    pub fn new() -> MemoryEnvironment {
        MemoryEnvironment::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> MemoryEnvironment {
        self.session.insert(name.to_string(), value.to_string());
        self
    }
}

impl EnvironmentStore for MemoryEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        self.session
            .get(name)
            .or_else(|| self.persistent.get(name))
            .cloned()
    }

    fn set_session(&mut self, name: &str, value: &str) -> Result<()> {
        self.session.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_persistent(&mut self, name: &str, value: &str) -> Result<()> {
        self.persistent.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

pub const PERSISTENT_FILE: &str = "env.toml";

#[cfg(target_os = "windows")]
pub const SESSION_SCRIPT: &str = "session.bat";
#[cfg(not(target_os = "windows"))]
pub const SESSION_SCRIPT: &str = "session.sh";

#[cfg(target_os = "windows")]
pub const PROFILE_SCRIPT: &str = "env.bat";
#[cfg(not(target_os = "windows"))]
pub const PROFILE_SCRIPT: &str = "env.sh";

/// Contents of `env.toml`.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct PersistedVars {
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
}

impl PersistedVars {
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<PersistedVars> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(PersistedVars::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Could not parse {}", path.display()))
    }

    /// Replaces the file in one rename, so a failed write leaves the old
    /// contents intact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create {}", dir.display()))?;
        let content = toml::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path)
            .with_context(|| format!("Could not write {}", path.display()))?;
        Ok(())
    }
}

/// The real environment: the process environment plus the files in the gvm home.
#[derive(Debug)]
pub struct SystemEnvironment {
    home: PathBuf,
    path_var: String,
    pending: BTreeMap<String, String>,
    profile_updated: bool,
}

impl SystemEnvironment {
    pub fn new<P: Into<PathBuf>>(home: P) -> SystemEnvironment {
        SystemEnvironment {
            home: home.into(),
            path_var: "PATH".to_string(),
            pending: BTreeMap::new(),
            profile_updated: false,
        }
    }

    /// Names the search path variable, which the profile script only prepends to.
    pub fn with_path_var(mut self, path_var: &str) -> SystemEnvironment {
        self.path_var = path_var.to_string();
        self
    }

    pub fn persistent_path(&self) -> PathBuf {
        self.home.join(PERSISTENT_FILE)
    }

    pub fn session_script_path(&self) -> PathBuf {
        self.home.join(SESSION_SCRIPT)
    }

    pub fn profile_script_path(&self) -> PathBuf {
        self.home.join(PROFILE_SCRIPT)
    }

    /// `true` once a persistent write has rewritten the profile script.
    pub fn profile_updated(&self) -> bool {
        self.profile_updated
    }

    /// Removes the session script an earlier run left behind.
    pub fn discard_session_script(&self) -> std::io::Result<()> {
        match std::fs::remove_file(self.session_script_path()) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Writes every session variable set so far into the session script.
    ///
    /// Returns the script path, or `None` when nothing was set.
    pub fn flush(&self) -> Result<Option<PathBuf>> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        let path = self.session_script_path();
        std::fs::create_dir_all(&self.home)
            .with_context(|| format!("Could not create {}", self.home.display()))?;
        std::fs::write(&path, session_script(&self.pending))
            .with_context(|| format!("Could not write {}", path.display()))?;
        debug!(path = %path.display(), vars = self.pending.len(), "session script written");
        Ok(Some(path))
    }
}

impl EnvironmentStore for SystemEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        if let Some(value) = self.pending.get(name) {
            return Some(value.clone());
        }
        if let Some(value) = std::env::var(name).ok().filter(|v| !v.is_empty()) {
            return Some(value);
        }
        PersistedVars::load_or_default(self.persistent_path())
            .ok()
            .and_then(|persisted| persisted.vars.get(name).cloned())
    }

    fn set_session(&mut self, name: &str, value: &str) -> Result<()> {
        self.pending.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_persistent(&mut self, name: &str, value: &str) -> Result<()> {
        let path = self.persistent_path();
        let mut persisted = PersistedVars::load_or_default(&path)?;
        persisted.vars.insert(name.to_string(), value.to_string());
        persisted.save(&path)?;
        debug!(var = name, path = %path.display(), "persisted variable");

        let profile = self.profile_script_path();
        std::fs::write(&profile, profile_script(&persisted.vars, &self.path_var))
            .with_context(|| format!("Could not write {}", profile.display()))?;
        self.profile_updated = true;
        Ok(())
    }
}

/// Renders session assignments for the platform shell.
#[cfg(target_os = "windows")]
pub fn session_script(vars: &BTreeMap<String, String>) -> String {
    let mut script = String::from("@echo off\r\n");
    for (name, value) in vars {
        script.push_str(&format!("SET \"{name}={value}\"\r\n"));
    }
    script
}

/// Renders session assignments for the platform shell.
#[cfg(not(target_os = "windows"))]
pub fn session_script(vars: &BTreeMap<String, String>) -> String {
    let mut script = String::new();
    for (name, value) in vars {
        let quoted = value.replace('\'', r"'\''");
        script.push_str(&format!("export {name}='{quoted}'\n"));
    }
    script
}

/// Renders persisted variables for new shells.
///
/// The search path is not restored as a whole: only its first entry, the
/// active binary directory, is put in front of the shell's own value.
pub fn profile_script(vars: &BTreeMap<String, String>, path_var: &str) -> String {
    let mut others = vars.clone();
    let bin = others
        .remove(path_var)
        .and_then(|value| value.split(PATH_LIST_SEPARATOR).next().map(str::to_string))
        .filter(|bin| !bin.is_empty());
    let mut script = session_script(&others);
    if let Some(bin) = bin {
        script.push_str(&prepend_line(path_var, &bin));
    }
    script
}

#[cfg(target_os = "windows")]
fn prepend_line(path_var: &str, bin: &str) -> String {
    format!("SET \"{path_var}={bin}{PATH_LIST_SEPARATOR}%{path_var}%\"\r\n")
}

#[cfg(not(target_os = "windows"))]
fn prepend_line(path_var: &str, bin: &str) -> String {
    let quoted = bin.replace('\'', r"'\''");
    format!("export {path_var}='{quoted}'\"{PATH_LIST_SEPARATOR}${path_var}\"\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct FailingStore;

    impl EnvironmentStore for FailingStore {
        fn get(&self, _: &str) -> Option<String> {
            None
        }
        fn set_session(&mut self, _: &str, _: &str) -> Result<()> {
            anyhow::bail!("read-only")
        }
        fn set_persistent(&mut self, _: &str, _: &str) -> Result<()> {
            anyhow::bail!("read-only")
        }
    }

    #[test]
    fn test_set_scoped_attempts_every_store() {
        let mut failures = Vec::new();
        set_scoped(&mut FailingStore, Scope::Persistent, "GOROOT", "/go", &mut failures);
        assert_eq!(failures.len(), 2);
        assert!(failures[0].contains("session"));
        assert!(failures[1].contains("persistent"));
    }

    #[test]
    fn test_memory_session_shadows_persistent() {
        let mut env = MemoryEnvironment::new();
        env.set_persistent("GOROOT", "/old").unwrap();
        assert_eq!(env.get("GOROOT").as_deref(), Some("/old"));
        env.set_session("GOROOT", "/new").unwrap();
        assert_eq!(env.get("GOROOT").as_deref(), Some("/new"));
    }

    #[test]
    fn test_persistent_write_keeps_other_vars() {
        let home = tempdir().unwrap();
        let mut env = SystemEnvironment::new(home.path());
        env.set_persistent("GVM_TEST_A", "1").unwrap();
        env.set_persistent("GVM_TEST_B", "2").unwrap();

        let persisted = PersistedVars::load_or_default(env.persistent_path()).unwrap();
        assert_eq!(persisted.vars.get("GVM_TEST_A").map(String::as_str), Some("1"));
        assert_eq!(persisted.vars.get("GVM_TEST_B").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_system_get_reads_persisted_fallback() {
        let home = tempdir().unwrap();
        let mut env = SystemEnvironment::new(home.path());
        env.set_persistent("GVM_TEST_ONLY_PERSISTED", "/somewhere").unwrap();

        let fresh = SystemEnvironment::new(home.path());
        assert_eq!(fresh.get("GVM_TEST_ONLY_PERSISTED").as_deref(), Some("/somewhere"));
    }

    #[test]
    fn test_flush_writes_session_script() {
        let home = tempdir().unwrap();
        let mut env = SystemEnvironment::new(home.path());
        assert!(env.flush().unwrap().is_none());

        env.set_session("GVM_TEST_ROOT", "/opt/go").unwrap();
        assert_eq!(env.get("GVM_TEST_ROOT").as_deref(), Some("/opt/go"));
        let script = env.flush().unwrap().unwrap();
        let content = std::fs::read_to_string(script).unwrap();
        assert!(content.contains("GVM_TEST_ROOT"));
        assert!(content.contains("/opt/go"));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_session_script_quotes_values() {
        let mut vars = BTreeMap::new();
        vars.insert("PATH".to_string(), "/it's/bin:/usr/bin".to_string());
        assert_eq!(session_script(&vars), "export PATH='/it'\\''s/bin:/usr/bin'\n");
    }

    #[test]
    fn test_persistent_write_renders_profile_script() {
        let home = tempdir().unwrap();
        let mut env = SystemEnvironment::new(home.path());
        let path = format!("/go/bin{PATH_LIST_SEPARATOR}/usr/bin");
        env.set_persistent("GOROOT", "/go").unwrap();
        env.set_persistent("PATH", &path).unwrap();
        env.set_persistent("GVMROOT", "/gos").unwrap();

        let profile = std::fs::read_to_string(env.profile_script_path()).unwrap();
        assert!(profile.contains("GOROOT"));
        assert!(profile.contains("/gos"));
        assert!(profile.contains("/go/bin"));
        assert!(!profile.contains("/usr/bin"));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_profile_script_prepends_only_bin() {
        let mut vars = BTreeMap::new();
        vars.insert("GOROOT".to_string(), "/go".to_string());
        vars.insert("PATH".to_string(), "/go/bin:/usr/bin".to_string());
        assert_eq!(
            profile_script(&vars, "PATH"),
            "export GOROOT='/go'\nexport PATH='/go/bin'\":$PATH\"\n"
        );
    }

    #[test]
    fn test_discard_session_script() {
        let home = tempdir().unwrap();
        let mut env = SystemEnvironment::new(home.path());
        env.discard_session_script().unwrap();

        env.set_session("GVM_TEST_ROOT", "/opt/go").unwrap();
        let script = env.flush().unwrap().unwrap();
        env.discard_session_script().unwrap();
        assert!(!script.exists());
    }

    #[test]
    fn test_corrupt_persisted_file_is_error_not_overwrite() {
        let home = tempdir().unwrap();
        let mut env = SystemEnvironment::new(home.path());
        std::fs::write(env.persistent_path(), "vars = [").unwrap();
        assert!(env.set_persistent("GOROOT", "/go").is_err());
        assert_eq!(std::fs::read_to_string(env.persistent_path()).unwrap(), "vars = [");
    }
}
