//! Environment resolution
//!
//! Discovers GCC toolchains and the VS Code executable from the system's PATH
//! lists and the editor's shell registration. Resolution never mutates anything
//! and never caches: every call re-reads the system state.

pub mod probe;
pub mod types;

#[cfg(windows)]
pub mod windows;

pub use probe::{CommandProber, ToolchainProber};
pub use types::{BIN_DIR_NAME, ToolchainInfo, dir_key, normalize_dir};

use crate::host::{EnvScope, Host, PATH_DELIMITER};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

#[cfg(windows)]
pub const EDITOR_EXECUTABLE: &str = "Code.exe";
#[cfg(not(windows))]
pub const EDITOR_EXECUTABLE: &str = "code";

static ENV_VAR_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"%([^%;]+)%").ok());

/// Facts gathered by one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Environment {
    /// VS Code executable, if one was found on disk
    pub editor: Option<PathBuf>,

    /// Working toolchains in discovery order, unique by `bin_directory`
    pub toolchains: Vec<ToolchainInfo>,

    /// Every directory that was searched, in order
    #[serde(skip)]
    pub search_dirs: Vec<PathBuf>,
}

/// Probes every candidate directory and locates the editor.
pub fn resolve(host: &dyn Host, prober: &dyn ToolchainProber) -> Environment {
    tracing::info!("Resolving environment...");
    let candidates = candidate_directories(host);
    tracing::debug!("{} candidate directories", candidates.len());

    let editor = locate_editor(host, &candidates);

    let mut seen = HashSet::new();
    let mut toolchains = Vec::new();
    for dir in &candidates {
        if let Some(info) = prober.probe(dir)
            && seen.insert(info.dedup_key())
        {
            tracing::debug!("found {}: {}", info.bin_directory.display(), info.raw_version_line);
            toolchains.push(info);
        }
    }

    tracing::info!(
        "Resolved editor: {}, {} toolchain(s)",
        editor
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string()),
        toolchains.len()
    );

    Environment {
        editor,
        toolchains,
        search_dirs: candidates,
    }
}

/// First `dirs` entry holding an executable called `name`.
///
/// On Windows a name without extension also matches `name.exe`.
pub fn find_executable(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let with_ext = (cfg!(windows) && Path::new(name).extension().is_none())
        .then(|| format!("{}.exe", name));
    dirs.iter().find_map(|dir| {
        std::iter::once(name)
            .chain(with_ext.as_deref())
            .map(|n| dir.join(n))
            .find(|p| p.is_file())
    })
}

/// Directories listed in the user and machine PATH, expanded and deduplicated.
///
/// The user scope comes first; the first occurrence of a directory wins.
pub fn candidate_directories(host: &dyn Host) -> Vec<PathBuf> {
    let mut all = host.path_variable(EnvScope::User).unwrap_or_default();
    all.push(PATH_DELIMITER);
    all.push_str(&host.path_variable(EnvScope::Machine).unwrap_or_default());

    let mut seen = HashSet::new();
    let mut dirs = Vec::new();
    for segment in split_path_list(&all, PATH_DELIMITER) {
        let expanded = expand_env_vars(&segment, host);
        let unquoted = expanded.trim().trim_matches('"');
        if unquoted.is_empty() {
            continue;
        }
        let dir = normalize_dir(Path::new(unquoted));
        if seen.insert(dir_key(&dir)) {
            dirs.push(dir);
        }
    }
    dirs
}

/// Splits a PATH-like value on `delimiter`, ignoring delimiters inside double quotes.
///
/// Segments are returned verbatim (quotes kept), including empty ones.
pub fn split_path_list(value: &str, delimiter: char) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in value.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            current.push(c);
        } else if c == delimiter && !in_quotes {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    segments.push(current);
    segments
}

/// Replaces `%NAME%` references with their values; unknown names are left untouched.
pub fn expand_env_vars(value: &str, host: &dyn Host) -> String {
    let Some(pattern) = ENV_VAR_PATTERN.as_ref() else {
        return value.to_string();
    };
    pattern
        .replace_all(value, |caps: &regex::Captures| {
            host.env_var(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Extracts the executable from a registered command line such as
/// `"C:\Program Files\Microsoft VS Code\Code.exe" --open-url -- "%1"`.
pub fn parse_editor_command(raw: &str) -> Option<PathBuf> {
    let path = raw.split('"').nth(1)?.trim();
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

fn locate_editor(host: &dyn Host, candidates: &[PathBuf]) -> Option<PathBuf> {
    if let Some(raw) = host.editor_command() {
        tracing::debug!("editor registration: {}", raw);
        return parse_editor_command(&raw).filter(|p| p.is_file());
    }

    // No registration: look for the launcher on PATH. VS Code puts its `bin`
    // directory on PATH while the executable sits one level up on Windows.
    candidates.iter().find_map(|dir| {
        let direct = dir.join(EDITOR_EXECUTABLE);
        if direct.is_file() {
            return Some(direct);
        }
        let is_bin = dir
            .file_name()
            .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(BIN_DIR_NAME));
        if is_bin {
            let parent = dir.parent()?.join(EDITOR_EXECUTABLE);
            if parent.is_file() {
                return Some(parent);
            }
        }
        None
    })
}
