//! Saved preferences.
//!
//! A profile is a TOML file holding [`Overrides`], so a setup can be repeated
//! with `--profile` instead of retyping every flag:
//!
//! ```toml
//! toolchain_path = 'C:\mingw64\bin'
//! language = "c++"
//! language_standard = "c++17"
//! compile_args = ["-Wall", "-Wextra"]
//!
//! [toggles]
//! external_terminal = true
//! test_file = "skip"
//! ```

use crate::config::Overrides;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn load(path: &Path) -> Result<Overrides> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    let overrides: Overrides = toml::from_str(&content)
        .with_context(|| format!("Failed to parse profile {}", path.display()))?;
    tracing::info!("Loaded profile {}", path.display());
    Ok(overrides)
}

pub fn save(path: &Path, overrides: &Overrides) -> Result<()> {
    let content = toml::to_string_pretty(overrides).context("Failed to serialize profile")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write profile {}", path.display()))?;
    tracing::info!("Saved profile {}", path.display());
    Ok(())
}
