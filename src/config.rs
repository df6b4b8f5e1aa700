//! CLI wiring: build-root resolution and cache maintenance.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cache;
use crate::cli::Cli;

pub fn resolve_build_root(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.root.clone() {
        return Ok(p);
    }
    std::env::current_dir().context("Failed to resolve current directory")
}

pub fn resolve_cache_path(cli: &Cli) -> Result<PathBuf> {
    Ok(cache::cache_path(&resolve_build_root(cli)?))
}

/// Remove the persisted probe cache along with any leftover temp file or
/// quarantined copy.
pub fn clear_cache(cache_path: &Path) -> Result<()> {
    remove_file_if_exists(cache_path, "probe cache")?;
    remove_file_if_exists(&cache::tmp_path(cache_path), "probe cache temp")?;
    remove_file_if_exists(&cache::corrupt_path(cache_path), "quarantined probe cache")?;
    Ok(())
}

fn remove_file_if_exists(path: &Path, kind: &str) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {kind} file: {}", path.display()))?;
    }
    Ok(())
}
