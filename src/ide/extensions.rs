//! Editor extension management through the `code` command line.

use crate::process::{ProcessError, run_with_timeout};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::NamedTempFile;
use thiserror::Error;

/// The Microsoft C/C++ extension the generated descriptors target
pub const REQUIRED_EXTENSION: &str = "ms-vscode.cpptools";

pub const L10N_EXTENSION: &str = "ms-ceintl.vscode-language-pack-zh-hans";

/// Extensions whose run/format behavior conflicts with the generated tasks
pub const CONFLICTING_EXTENSIONS: &[&str] = &[
    "formulahendry.code-runner",
    "austin.code-gnu-global",
    "danielpinto8zz6.c-cpp-compile-run",
    "mitaki28.vscode-clang",
    "jaycetyle.vscode-gnu-global",
    "franneck94.c-cpp-runner",
    "ajshort.include-autocomplete",
    "xaver.clang-format",
    "jbenden.c-cpp-flylint",
];

/// Marketplace installs can be slow
pub const EXTENSION_TIMEOUT: Duration = Duration::from_secs(180);

/// Mirror of the C/C++ extension package used for offline installs
pub const CPPTOOLS_VSIX_URL: &str =
    "https://guyutongxue.oss-cn-beijing.aliyuncs.com/vscode-cpptools/cpptools-win32_v1.5.1.vsix";

/// Whole-transfer limit for the VSIX download
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("could not store the package: {0}")]
    Io(#[from] io::Error),
}

/// Downloads `url` into a temporary `.vsix` file, deleted when dropped
pub fn download_vsix(url: &str, timeout: Duration) -> Result<NamedTempFile, DownloadError> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into();
    let response = agent.get(url).call()?;

    let mut file = tempfile::Builder::new()
        .prefix("cpptools-")
        .suffix(".vsix")
        .tempfile()?;
    let mut reader = response.into_body().into_reader();
    let bytes = io::copy(&mut reader, file.as_file_mut())?;
    tracing::debug!("downloaded {} bytes to {}", bytes, file.path().display());
    Ok(file)
}

/// CLI entry point for an editor executable
pub fn cli_for(editor: &Path) -> PathBuf {
    if cfg!(windows) {
        editor
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("bin")
            .join("code.cmd")
    } else {
        editor.to_path_buf()
    }
}

/// Lower-cased extension ids, one per non-empty line
pub fn parse_extension_list(stdout: &str) -> BTreeSet<String> {
    stdout
        .lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

pub struct ExtensionManager {
    cli: PathBuf,
    timeout: Duration,
    installed: BTreeSet<String>,
}

impl ExtensionManager {
    /// Reads the installed extensions once; later calls update that view.
    pub fn connect(cli: PathBuf, timeout: Duration) -> Result<Self, ProcessError> {
        let output = run_with_timeout(
            Command::new(&cli).arg("--list-extensions"),
            timeout,
        )?;
        let installed = parse_extension_list(&output.stdout);
        tracing::debug!("installed extensions: {:?}", installed);
        Ok(Self {
            cli,
            timeout,
            installed,
        })
    }

    pub fn is_installed(&self, id: &str) -> bool {
        self.installed.contains(&id.to_lowercase())
    }

    /// Installs `id` unless present. Returns whether anything changed.
    pub fn install(&mut self, id: &str) -> Result<bool, ProcessError> {
        if self.is_installed(id) {
            tracing::info!("Extension {} is already installed", id);
            return Ok(false);
        }
        let id = id.to_lowercase();
        tracing::info!("Installing extension {}...", id);
        self.run(&["--install-extension", &id])?;
        self.installed.insert(id);
        Ok(true)
    }

    /// Installs `id` from the package at `url`, falling back to the
    /// marketplace when the download fails.
    pub fn install_offline(
        &mut self,
        id: &str,
        url: &str,
        timeout: Duration,
    ) -> Result<bool, ProcessError> {
        if self.is_installed(id) {
            tracing::info!("Extension {} is already installed", id);
            return Ok(false);
        }
        tracing::info!("Downloading {} from {}...", id, url);
        let package = match download_vsix(url, timeout) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Offline package unavailable ({}); installing online", e);
                return self.install(id);
            }
        };

        let vsix = package.path().to_string_lossy().into_owned();
        self.run(&["--install-extension", &vsix])?;
        self.installed.insert(id.to_lowercase());
        tracing::info!("Installed {} from {}", id, vsix);
        Ok(true)
    }

    /// Uninstalls `id` if present. Returns whether anything changed.
    pub fn uninstall(&mut self, id: &str) -> Result<bool, ProcessError> {
        if !self.is_installed(id) {
            return Ok(false);
        }
        let id = id.to_lowercase();
        tracing::info!("Uninstalling extension {}...", id);
        self.run(&["--uninstall-extension", &id])?;
        self.installed.remove(&id);
        Ok(true)
    }

    fn run(&self, args: &[&str]) -> Result<(), ProcessError> {
        let output = run_with_timeout(Command::new(&self.cli).args(args), self.timeout)?;
        tracing::debug!("{}", output.stdout.trim());
        Ok(())
    }
}
