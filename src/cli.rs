use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    /// Print debug logs to stderr (finer control through `GVM_LOG`)
    #[clap(long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub(crate) command: Option<GvmCommand>,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum GvmCommand {
    /// Show architecture of OS
    Arch,
    /// Download a Go version into the GVMROOT, e.g. `gvm install 1.22.4`
    Install {
        version: Option<String>,
    },
    /// Show the GVMROOT, or set it for this and every later session
    #[command(visible_alias = "root")]
    Gvmroot {
        path: Option<String>,
    },
    /// Show the GOROOT, or point it at a directory and update PATH
    #[command(visible_alias = "active-root")]
    Goroot {
        path: Option<String>,
        /// Also keep the change for later sessions
        #[clap(long)]
        persist: bool,
    },
    /// List the Go installations in the GVMROOT
    #[command(visible_alias = "ls")]
    List,
    /// Remove an installed Go version. If it was your GOROOT, `gvm use` another one after
    Uninstall {
        version: Option<String>,
    },
    /// Switch to an installed Go version. This sets GOROOT and PATH
    Use {
        version: Option<String>,
        /// Also keep the change for later sessions
        #[clap(long)]
        persist: bool,
    },
    /// Print the version of gvm
    #[command(visible_alias = "v")]
    Version,
}
