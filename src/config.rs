use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::toolchain::types::{CXX_COMPILER, C_COMPILER};

/// Target language of the generated configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LanguageKind {
    #[default]
    #[serde(rename = "c++", alias = "cpp")]
    Cpp,
    #[serde(rename = "c")]
    C,
}

impl LanguageKind {
    /// Extension of generated source files, with the dot
    pub fn source_ext(&self) -> &'static str {
        match self {
            LanguageKind::Cpp => ".cpp",
            LanguageKind::C => ".c",
        }
    }

    /// Compiler driver executable name
    pub fn compiler_name(&self) -> &'static str {
        match self {
            LanguageKind::Cpp => CXX_COMPILER,
            LanguageKind::C => C_COMPILER,
        }
    }

    /// Key used for the standard in `c_cpp_properties.json`
    pub fn intellisense_key(&self) -> &'static str {
        match self {
            LanguageKind::Cpp => "cppStandard",
            LanguageKind::C => "cStandard",
        }
    }
}

impl std::fmt::Display for LanguageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageKind::Cpp => write!(f, "C++"),
            LanguageKind::C => write!(f, "C"),
        }
    }
}

impl FromStr for LanguageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c++" | "cpp" | "cxx" => Ok(LanguageKind::Cpp),
            "c" => Ok(LanguageKind::C),
            other => Err(format!("unsupported language '{}' (expected c++ or c)", other)),
        }
    }
}

/// When to write the hello-world test file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestFilePolicy {
    /// Only when the workspace has no `helloworld` source yet
    #[default]
    Auto,
    /// Always, choosing a numbered name if needed
    Force,
    Skip,
}

/// Optional behaviors of a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggles {
    /// Run and debug in an external console window
    pub external_terminal: bool,
    /// Warn before debugging files whose names contain non-ASCII characters
    pub apply_non_ascii_check: bool,
    /// Put the toolchain at the front of the user PATH
    pub set_env: bool,
    /// Install the C/C++ extension
    pub install_extensions: bool,
    /// Install the C/C++ extension from a downloaded VSIX instead of the marketplace
    pub offline_cpptools: bool,
    /// Remove extensions known to conflict with the generated setup
    pub uninstall_extensions: bool,
    /// Install the Chinese language pack
    pub install_l10n: bool,
    pub generate_shortcut: bool,
    pub test_file: TestFilePolicy,
    pub open_editor: bool,
    pub send_analytics: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            external_terminal: false,
            apply_non_ascii_check: false,
            set_env: cfg!(windows),
            install_extensions: true,
            offline_cpptools: false,
            uninstall_extensions: false,
            install_l10n: false,
            generate_shortcut: false,
            test_file: TestFilePolicy::Auto,
            open_editor: false,
            send_analytics: true,
        }
    }
}

/// User-supplied choices, before synthesis fills in the gaps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub editor_path: Option<PathBuf>,
    pub toolchain_path: Option<PathBuf>,
    /// Compiler executable, as a bare name looked up on PATH or a path
    pub compiler: Option<PathBuf>,
    pub workspace_path: Option<PathBuf>,
    pub language: LanguageKind,
    pub language_standard: Option<String>,
    /// Use `gnu++NN`/`gnuNN` instead of the strict standard
    pub gnu_extensions: bool,
    pub compile_args: Vec<String>,
    /// Never prompt; take the first candidate and overwrite existing config
    #[serde(skip)]
    pub assume_yes: bool,
    pub toggles: Toggles,
}

/// Fully resolved, generation-ready decision record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOptions {
    pub editor_path: PathBuf,
    pub toolchain_dir: PathBuf,
    /// Explicit compiler; otherwise the language's driver in `toolchain_dir`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<PathBuf>,
    pub workspace_path: PathBuf,
    pub language: LanguageKind,
    pub language_standard: String,
    pub compile_args: Vec<String>,
    #[serde(default)]
    pub toggles: Toggles,
}

impl ConfigOptions {
    /// Full path of the compiler used by the build task
    pub fn compiler_path(&self) -> PathBuf {
        match &self.compiler {
            Some(compiler) => compiler.clone(),
            None => self.toolchain_dir.join(self.language.compiler_name()),
        }
    }

    /// Directory that holds the generated descriptors
    pub fn config_dir(&self) -> PathBuf {
        config_dir_of(&self.workspace_path)
    }

    /// First required field that is missing, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.editor_path.as_os_str().is_empty() {
            Some("editor path")
        } else if self.toolchain_dir.as_os_str().is_empty() {
            Some("toolchain directory")
        } else if self.workspace_path.as_os_str().is_empty() {
            Some("workspace path")
        } else {
            None
        }
    }
}

/// Name of the per-workspace editor configuration directory
pub const CONFIG_DIR_NAME: &str = ".vscode";

pub fn config_dir_of(workspace: &Path) -> PathBuf {
    workspace.join(CONFIG_DIR_NAME)
}
