use std::path::{Path, PathBuf};
use crate::error::{GvmError, Result};

/// Returns the CPU architecture class in Go's naming (e.g. `amd64`, `386`).
pub fn current_arch() -> String {
    arch_class(std::env::consts::ARCH)
}

fn arch_class(arch: &str) -> String {
    match arch {
        "x86_64" => "amd64".to_string(),
        "x86" => "386".to_string(),
        "aarch64" => "arm64".to_string(),
        "arm" => "armv6l".to_string(),
        "powerpc64" => "ppc64".to_string(),
        "loongarch64" => "loong64".to_string(),
        other => other.to_string(),
    }
}

/// Returns the operating system in Go's naming (e.g. `linux`, `darwin`).
pub fn current_os() -> String {
    match std::env::consts::OS {
        "macos" => "darwin".to_string(),
        other => other.to_string(),
    }
}

/// Returns the release platform, e.g. `linux-amd64` or `windows-386`.
pub fn current_platform() -> String {
    format!("{}-{}", current_os(), current_arch())
}

/// Archive extension Go releases use on `platform`.
pub fn archive_extension(platform: &str) -> &'static str {
    if platform.starts_with("windows-") {
        "zip"
    } else {
        "tar.gz"
    }
}

/// File name of the release archive, e.g. `go1.22.4.linux-amd64.tar.gz`.
pub fn archive_name(canonical: &str, platform: &str) -> String {
    format!("{canonical}.{platform}.{}", archive_extension(platform))
}

/// Makes a user-given path absolute against the current directory.
pub fn absolute_path(path: &str) -> Result<PathBuf> {
    std::path::absolute(Path::new(path))
        .map_err(|e| GvmError::io("Could not resolve path", path, e))
}
