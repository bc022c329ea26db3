//! # gvm Core Library
//!
//! This crate contains the core logic of `gvm`, a version manager for Go toolchains.
//!
//! All toolchains live under one configured root (`GVMROOT`), one directory per
//! version. The directory name is not trusted: each installation carries a
//! `VERSION` file whose first line is its canonical version, so `go1.20.1` and
//! an alias such as `golatest` are recognised for what they are. Switching
//! versions rewrites `GOROOT` and moves the new `bin` directory to the front
//! of `PATH`.
//!
//! ## Modules Overview
//! - [`probe`] – Reading the canonical version of one installation directory
//! - [`scan`] – Lazily discovering and deduplicating installations under the root
//! - [`search_path`] – Rewriting `PATH` by directory identity
//! - [`env`] – Session and persistent environment stores
//! - [`switch`] – `use` / `goroot` / `gvmroot` operations
//! - [`installer`] – Downloading, unpacking and removing toolchains
//! - [`config`] – `config.toml` with variable names, marker file and download URL
//! - [`global`] – Per-user directories and the archive cache
//! - [`util`] – Platform detection and path helpers
//! - [`error`] – The error type and its exit codes


pub mod config;
pub mod env;
pub mod error;
pub mod global;
pub mod installer;
pub mod probe;
pub mod scan;
pub mod search_path;
pub mod switch;
pub mod util;

pub use config::*;
pub use env::*;
pub use error::GvmError;
pub use installer::*;
pub use probe::*;
pub use scan::*;
pub use search_path::*;
pub use switch::*;
pub use util::*;
