use anyhow::{Context, Result};
use std::path::PathBuf;

/// `~/.spendscope`, created on first use.
pub fn ensure_spendscope_home() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .context("HOME not set")?;
    let dir = home.join(".spendscope");
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir)
}

pub fn archive_dir() -> Result<PathBuf> {
    let dir = ensure_spendscope_home()?.join("archive");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn logs_dir() -> Result<PathBuf> {
    let dir = ensure_spendscope_home()?.join("logs");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
