use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the directory that holds the compiler executables inside a MinGW tree
pub const BIN_DIR_NAME: &str = "bin";

#[cfg(windows)]
pub const CXX_COMPILER: &str = "g++.exe";
#[cfg(not(windows))]
pub const CXX_COMPILER: &str = "g++";

#[cfg(windows)]
pub const C_COMPILER: &str = "gcc.exe";
#[cfg(not(windows))]
pub const C_COMPILER: &str = "gcc";

#[cfg(windows)]
pub const DEBUGGER: &str = "gdb.exe";
#[cfg(not(windows))]
pub const DEBUGGER: &str = "gdb";

/// One discovered GCC installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainInfo {
    /// Directory containing the compiler executable, without trailing separator
    pub bin_directory: PathBuf,

    /// First line printed by `g++ --version`
    pub raw_version_line: String,

    /// Last token of the version line, e.g. "10.2.0"
    pub version_number: String,

    /// Package description between the program name and the version, parentheses stripped
    pub package_label: String,

    /// Explicit compiler executable, when it is not the directory's `g++`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<PathBuf>,
}

impl ToolchainInfo {
    /// Builds a record from a probed directory and the version line it printed.
    ///
    /// Compiler output is not a controlled format, so this never fails: a line
    /// with a single token yields an empty `package_label`.
    pub fn from_version_line(bin_directory: &Path, version_line: &str) -> Self {
        let raw = version_line.trim();
        let tokens: Vec<&str> = raw.split_whitespace().collect();

        let version_number = tokens.last().map(|t| t.to_string()).unwrap_or_default();
        let package_label = if tokens.len() > 2 {
            strip_parens(&tokens[1..tokens.len() - 1].join(" ")).to_string()
        } else {
            String::new()
        };

        Self {
            bin_directory: normalize_dir(bin_directory),
            raw_version_line: raw.to_string(),
            version_number,
            package_label,
            compiler: None,
        }
    }

    /// Record for a compiler named directly rather than found by directory
    pub fn for_compiler(compiler: &Path, version_line: &str) -> Self {
        let dir = compiler.parent().unwrap_or_else(|| Path::new(""));
        Self {
            compiler: Some(compiler.to_path_buf()),
            ..Self::from_version_line(dir, version_line)
        }
    }

    /// Key used to collapse duplicates coming from overlapping search paths
    pub fn dedup_key(&self) -> String {
        dir_key(&self.bin_directory)
    }
}

impl std::fmt::Display for ToolchainInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.bin_directory.display(), self.version_number)?;
        if !self.package_label.is_empty() {
            write!(f, " ({})", self.package_label)?;
        }
        Ok(())
    }
}

fn strip_parens(s: &str) -> &str {
    let s = s.strip_prefix('(').unwrap_or(s);
    s.strip_suffix(')').unwrap_or(s)
}

/// Removes surrounding quotes and trailing separators from a directory path
pub fn normalize_dir(dir: &Path) -> PathBuf {
    let raw = dir.to_string_lossy();
    let unquoted = raw.trim().trim_matches('"');
    let trimmed = unquoted.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() || trimmed.ends_with(':') {
        // "/" or "C:\" must keep their separator
        PathBuf::from(unquoted)
    } else {
        PathBuf::from(trimmed)
    }
}

/// Comparison key for directories: normalized, and case-folded on Windows
pub fn dir_key(dir: &Path) -> String {
    let normalized = normalize_dir(dir).to_string_lossy().into_owned();
    if cfg!(windows) {
        normalized.to_lowercase()
    } else {
        normalized
    }
}
