use clap::CommandFactory;
use colored::Colorize;
use gvm::config::Config;
use gvm::env::{Scope, SystemEnvironment};
use gvm::error::{GvmError, Result};
use gvm::global::utils::get_global_config_dir;
use gvm::installer::{install_version, uninstall_version, HttpFetcher};
use gvm::scan::list_versions;
use gvm::search_path::FileIdentity;
use gvm::switch::{active_root, configured_root, set_active_root, set_configured_root, use_version};
use gvm::util::{current_arch, current_platform};
use tracing::error;
use crate::cli::{GvmCommand, CLI};

const GVM_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn execute(cli: CLI) -> Result<()> {
    let home = get_global_config_dir().map_err(GvmError::Config)?;
    let env = SystemEnvironment::new(home);
    env.discard_session_script()
        .map_err(|e| GvmError::io("Could not remove stale session script", env.session_script_path(), e))?;

    match cli.command {
        Some(GvmCommand::Arch) => {
            println!("System Architecture: {}", current_arch());
            Ok(())
        }
        Some(GvmCommand::Install { version }) => with_config(env, |env, config| {
            execute_install(env, config, version.as_deref().unwrap_or_default())
        }),
        Some(GvmCommand::Gvmroot { path }) => with_config(env, |env, config| {
            execute_gvmroot(env, config, path)
        }),
        Some(GvmCommand::Goroot { path, persist }) => with_config(env, |env, config| {
            execute_goroot(env, config, path, scope(persist))
        }),
        Some(GvmCommand::List) => with_config(env, |env, config| {
            execute_list(env, config)
        }),
        Some(GvmCommand::Uninstall { version }) => with_config(env, |env, config| {
            execute_uninstall(env, config, version.as_deref().unwrap_or_default())
        }),
        Some(GvmCommand::Use { version, persist }) => with_config(env, |env, config| {
            execute_use(env, config, version.as_deref().unwrap_or_default(), scope(persist))
        }),
        Some(GvmCommand::Version) => {
            println!("{GVM_VERSION}");
            Ok(())
        }
        None => {
            execute_help()
        }
    }
}

/// Loads `config.toml`, runs `verb`, then writes the session script.
fn with_config<F>(env: SystemEnvironment, verb: F) -> Result<()>
where
    F: FnOnce(&mut SystemEnvironment, &Config) -> Result<()>,
{
    let config = Config::load_or_default().map_err(GvmError::Config)?;
    let mut env = env.with_path_var(&config.path_var);
    let result = verb(&mut env, &config);

    match (result, flush_session(&env)) {
        (Ok(()), flushed) => flushed,
        (Err(e), Err(flush_err)) => {
            error!("{flush_err}");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
    }
}

fn scope(persist: bool) -> Scope {
    if persist { Scope::Persistent } else { Scope::Session }
}

/// Writes the session script and tells the user how to load it.
fn flush_session(env: &SystemEnvironment) -> Result<()> {
    let script = env
        .flush()
        .map_err(|e| GvmError::Environment(vec![format!("{e:#}")]))?;
    if let Some(script) = script {
        #[cfg(target_os = "windows")]
        let hint = format!("call \"{}\"", script.display());
        #[cfg(not(target_os = "windows"))]
        let hint = format!(". \"{}\"", script.display());
        println!("{} {}", "Apply to the current shell with:".dimmed(), hint);
    }
    if env.profile_updated() {
        println!(
            "{} {}",
            "New shells pick up persisted variables by sourcing:".dimmed(),
            env.profile_script_path().display()
        );
    }
    Ok(())
}

pub fn execute_install(env: &SystemEnvironment, config: &Config, version: &str) -> Result<()> {
    let fetcher = HttpFetcher::new(&config.download_url).map_err(|source| GvmError::Fetch {
        version: version.to_string(),
        source,
    })?;
    let dest = install_version(env, config, &fetcher, version, &current_platform())?;
    println!("Successfully installed Go version {} in {}.", version.green(), dest.display());
    println!("To use this version, run `gvm use {version}`. This will also set your {}.", config.active_root_var);
    Ok(())
}

pub fn execute_gvmroot(env: &mut SystemEnvironment, config: &Config, path: Option<String>) -> Result<()> {
    match path {
        None => {
            match configured_root(env, config) {
                Ok(root) => println!("{}: {}", config.root_var, root.display()),
                Err(_) => println!("No {} set.", config.root_var),
            }
        }
        Some(path) => {
            let root = set_configured_root(env, config, &path)?;
            println!("Set the {} to {}.", config.root_var, root.display());
        }
    }
    Ok(())
}

pub fn execute_goroot(
    env: &mut SystemEnvironment,
    config: &Config,
    path: Option<String>,
    scope: Scope,
) -> Result<()> {
    match path {
        None => {
            match active_root(env, config) {
                Some(root) => println!("{}: {}", config.active_root_var, root.display()),
                None => println!("No {} set.", config.active_root_var),
            }
        }
        Some(path) => {
            let activation = set_active_root(env, config, &FileIdentity, &path, scope)?;
            println!(
                "Set the {} to {}. Also updated {}.",
                config.active_root_var,
                activation.root.display(),
                config.path_var
            );
        }
    }
    Ok(())
}

pub fn execute_list(env: &SystemEnvironment, config: &Config) -> Result<()> {
    let root = configured_root(env, config)?;
    println!("listing go versions in '{}'", root.display());
    println!();

    let active = active_root(env, config);
    let listed = list_versions(&root, config, active.as_deref(), &FileIdentity)?;
    if listed.is_empty() {
        println!("No Go versions installed.");
        return Ok(());
    }
    for line in listed {
        let version = config.display_version(&line.installed.canonical_version);
        let mut row = if line.active {
            format!("  * {}", version.green())
        } else {
            format!("    {version}")
        };
        if line.installed.is_aliased() {
            row.push_str(&format!(" \t in {}", line.installed.directory_name));
        }
        println!("{row}");
    }
    Ok(())
}

pub fn execute_uninstall(env: &SystemEnvironment, config: &Config, version: &str) -> Result<()> {
    let removed = uninstall_version(env, config, version)?;
    println!(
        "Uninstalled Go version {}.",
        config.display_version(&removed.canonical_version)
    );
    println!(
        "Note: If this was your {}, you should use another Go version with `gvm use <version>`.",
        config.active_root_var
    );
    Ok(())
}

pub fn execute_use(env: &mut SystemEnvironment, config: &Config, version: &str, scope: Scope) -> Result<()> {
    let (installed, activation) = use_version(env, config, &FileIdentity, version, scope)?;
    println!(
        "Now using Go version {}. Set {} to {}. Also updated {}.",
        config.display_version(&installed.canonical_version).green(),
        config.active_root_var,
        activation.root.display(),
        config.path_var
    );
    Ok(())
}

pub fn execute_help() -> Result<()> {
    println!("Running version {GVM_VERSION}.");
    println!();
    CLI::command()
        .print_help()
        .map_err(|e| GvmError::io("Could not print help", "stdout", e))
}
