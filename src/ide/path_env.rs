//! User PATH mutation.

use crate::host::{EnvScope, Host, PATH_DELIMITER};
use crate::toolchain::{dir_key, expand_env_vars, normalize_dir, split_path_list};
use std::io;
use std::path::Path;

/// What happened to the user PATH
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    /// The machine PATH already provides the directory
    CoveredByMachine,
    /// The directory was already first
    Unchanged,
    Updated(String),
}

/// Moves `dir` to the front of a PATH value, inserting it if absent.
///
/// Matches compare normalized, unquoted entries, both as written and with
/// `%VAR%` references expanded through `host`; every match is removed so the
/// directory appears exactly once. Empty entries are dropped.
pub fn promote_path_entry(value: &str, dir: &Path, delimiter: char, host: &dyn Host) -> String {
    let key = dir_key(&normalize_dir(dir));
    let rest = split_path_list(value, delimiter)
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .filter(|entry| !entry_matches(entry, &key, host));

    let mut entries = vec![dir.to_string_lossy().into_owned()];
    entries.extend(rest);
    entries.join(&delimiter.to_string())
}

fn entry_key(entry: &str) -> String {
    dir_key(&normalize_dir(Path::new(entry.trim().trim_matches('"'))))
}

fn entry_matches(entry: &str, key: &str, host: &dyn Host) -> bool {
    entry_key(entry) == key || entry_key(&expand_env_vars(entry, host)) == key
}

fn list_contains(value: &str, dir: &Path, host: &dyn Host) -> bool {
    let key = dir_key(&normalize_dir(dir));
    split_path_list(value, PATH_DELIMITER)
        .iter()
        .any(|entry| entry_matches(entry, &key, host))
}

/// Puts `dir` first in the user-scope PATH and persists it through `host`.
pub fn update_user_path(host: &dyn Host, dir: &Path) -> io::Result<PathOutcome> {
    if let Some(machine) = host.path_variable(EnvScope::Machine)
        && list_contains(&machine, dir, host)
    {
        tracing::warn!(
            "Machine PATH already contains {}; leaving the user PATH alone",
            dir.display()
        );
        return Ok(PathOutcome::CoveredByMachine);
    }

    let current = host.path_variable(EnvScope::User).unwrap_or_default();
    let updated = promote_path_entry(&current, dir, PATH_DELIMITER, host);
    if updated == current {
        tracing::info!("{} is already first in the user PATH", dir.display());
        return Ok(PathOutcome::Unchanged);
    }

    tracing::debug!("new user PATH: {}", updated);
    host.set_user_path_variable(&updated)?;
    tracing::info!("Added {} to the front of the user PATH", dir.display());
    Ok(PathOutcome::Updated(updated))
}
