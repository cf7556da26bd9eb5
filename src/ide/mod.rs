//! Configuration generation
//!
//! [`Generator::generate`] materializes a [`ConfigOptions`] as a fresh `.vscode`
//! directory plus the side effects the toggles ask for. Steps run in a fixed
//! order. Soft steps (extensions, scripts, shortcut, post-actions) only record a
//! [`SoftFailure`]; hard steps (workspace reset, descriptors, PATH, test file)
//! abort the run. Completed steps are never rolled back: everything written is
//! reproducible from the same options.

pub mod descriptors;
pub mod extensions;
pub mod path_env;
pub mod post;
pub mod scripts;
pub mod test_file;

use crate::config::ConfigOptions;
use crate::host::Host;
use descriptors::{Descriptors, Platform};
use extensions::{ExtensionManager, EXTENSION_TIMEOUT};
use path_env::PathOutcome;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("options are incomplete: missing {0}")]
    IncompleteOptions(&'static str),

    #[error("failed to reset {}: {source}", .path.display())]
    WorkspaceReset { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    ArtifactWrite { path: PathBuf, source: io::Error },

    #[error("failed to update the user PATH: {0}")]
    PathUpdate(#[source] io::Error),

    #[error("failed to write test file {}: {source}", .path.display())]
    TestFile { path: PathBuf, source: io::Error },
}

impl GenerationError {
    /// Step that raised the error; `None` when nothing ran
    pub fn step(&self) -> Option<Step> {
        match self {
            GenerationError::IncompleteOptions(_) => None,
            GenerationError::WorkspaceReset { .. } => Some(Step::WorkspaceReset),
            GenerationError::ArtifactWrite { .. } => Some(Step::Artifacts),
            GenerationError::PathUpdate(_) => Some(Step::PathUpdate),
            GenerationError::TestFile { .. } => Some(Step::TestFile),
        }
    }
}

/// Generation steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Extensions,
    Scripts,
    WorkspaceReset,
    Artifacts,
    PathUpdate,
    TestFile,
    Shortcut,
    PostActions,
}

impl Step {
    /// Whether a failure at this step ends the run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Step::WorkspaceReset | Step::Artifacts | Step::PathUpdate | Step::TestFile
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Extensions => "extensions",
            Step::Scripts => "helper scripts",
            Step::WorkspaceReset => "workspace reset",
            Step::Artifacts => "descriptors",
            Step::PathUpdate => "PATH update",
            Step::TestFile => "test file",
            Step::Shortcut => "shortcut",
            Step::PostActions => "post actions",
        };
        f.write_str(name)
    }
}

/// A step that failed without stopping the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftFailure {
    pub step: Step,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct GenerationReport {
    pub config_dir: PathBuf,
    /// Descriptor files, in write order
    pub artifacts: Vec<PathBuf>,
    pub scripts: Vec<PathBuf>,
    pub path_outcome: Option<PathOutcome>,
    pub test_file: Option<PathBuf>,
    pub shortcut: Option<PathBuf>,
    pub warnings: Vec<SoftFailure>,
}

impl GenerationReport {
    fn soft(&mut self, step: Step, message: impl fmt::Display) {
        debug_assert!(!step.is_fatal(), "{} failures must abort the run", step);
        let message = message.to_string();
        tracing::warn!("{} skipped: {}", step, message);
        self.warnings.push(SoftFailure { step, message });
    }
}

pub struct Generator<'a> {
    host: &'a dyn Host,
    platform: Platform,
    script_dir: Option<PathBuf>,
    keybindings: Option<PathBuf>,
    ping_url: String,
}

impl<'a> Generator<'a> {
    pub fn new(host: &'a dyn Host) -> Self {
        Self {
            host,
            platform: Platform::current(),
            script_dir: None,
            keybindings: scripts::default_keybindings_path(),
            ping_url: post::ANALYTICS_URL.to_string(),
        }
    }

    /// Installs helper scripts here instead of the platform default
    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = Some(dir.into());
        self
    }

    /// Merges the F6 keybinding into this file instead of the editor's own
    pub fn with_keybindings(mut self, path: impl Into<PathBuf>) -> Self {
        self.keybindings = Some(path.into());
        self
    }

    pub fn with_ping_url(mut self, url: impl Into<String>) -> Self {
        self.ping_url = url.into();
        self
    }

    fn script_dir(&self, options: &ConfigOptions) -> PathBuf {
        self.script_dir
            .clone()
            .unwrap_or_else(|| scripts::default_script_dir(&options.toolchain_dir))
    }

    pub fn generate(&self, options: &ConfigOptions) -> Result<GenerationReport, GenerationError> {
        if let Some(field) = options.missing_field() {
            return Err(GenerationError::IncompleteOptions(field));
        }

        let mut report = GenerationReport {
            config_dir: options.config_dir(),
            ..Default::default()
        };
        let toggles = &options.toggles;
        let script_dir = self.script_dir(options);

        // 1. extensions (soft)
        if toggles.install_extensions || toggles.uninstall_extensions || toggles.install_l10n {
            self.manage_extensions(options, &mut report);
        }

        // 2. helper scripts (soft)
        if toggles.external_terminal || toggles.apply_non_ascii_check {
            self.provision_scripts(options, &script_dir, &mut report);
        }

        // 3. fresh .vscode (hard from here on)
        reset_dir(&report.config_dir)?;

        // 4. descriptors
        report.artifacts = self.write_descriptors(options, &script_dir, &report.config_dir)?;

        // 5. user PATH
        if toggles.set_env {
            let outcome = path_env::update_user_path(self.host, &options.toolchain_dir)
                .map_err(GenerationError::PathUpdate)?;
            report.path_outcome = Some(outcome);
        }

        // 6. test file
        report.test_file = test_file::generate(options).map_err(|source| {
            GenerationError::TestFile {
                path: options.workspace_path.clone(),
                source,
            }
        })?;

        // 7. shortcut (soft)
        if toggles.generate_shortcut {
            match post::create_shortcut(self.host, &options.editor_path, &options.workspace_path) {
                Ok(link) => report.shortcut = Some(link),
                Err(e) => report.soft(Step::Shortcut, e),
            }
        }

        // 8. post actions (soft)
        if toggles.open_editor
            && let Err(e) = post::launch_editor(
                &options.editor_path,
                &options.workspace_path,
                report.test_file.as_deref(),
            )
        {
            report.soft(Step::PostActions, format!("could not launch VS Code: {}", e));
        }
        if toggles.send_analytics
            && let Err(e) = post::send_ping(&self.ping_url, post::PING_TIMEOUT)
        {
            report.soft(Step::PostActions, format!("usage ping failed: {}", e));
        }

        tracing::info!("Configuration complete");
        Ok(report)
    }

    /// Renders and writes the three descriptors into `config_dir`, in order
    fn write_descriptors(
        &self,
        options: &ConfigOptions,
        script_dir: &Path,
        config_dir: &Path,
    ) -> Result<Vec<PathBuf>, GenerationError> {
        let set = Descriptors::new(options, self.platform, script_dir);
        let mut written = Vec::new();
        for (name, doc) in set.all() {
            let path = config_dir.join(name);
            let text = descriptors::render(&doc).map_err(|e| GenerationError::ArtifactWrite {
                path: path.clone(),
                source: io::Error::other(e),
            })?;
            fs::write(&path, text).map_err(|source| GenerationError::ArtifactWrite {
                path: path.clone(),
                source,
            })?;
            tracing::info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    fn manage_extensions(&self, options: &ConfigOptions, report: &mut GenerationReport) {
        let toggles = &options.toggles;
        let cli = extensions::cli_for(&options.editor_path);
        let mut manager = match ExtensionManager::connect(cli, EXTENSION_TIMEOUT) {
            Ok(m) => m,
            Err(e) => {
                report.soft(Step::Extensions, format!("cannot list extensions: {}", e));
                return;
            }
        };

        if toggles.uninstall_extensions {
            for id in extensions::CONFLICTING_EXTENSIONS {
                if let Err(e) = manager.uninstall(id) {
                    report.soft(Step::Extensions, format!("uninstall {}: {}", id, e));
                }
            }
        }
        let mut wanted = Vec::new();
        if toggles.install_extensions {
            wanted.push(extensions::REQUIRED_EXTENSION);
        }
        if toggles.install_l10n {
            wanted.push(extensions::L10N_EXTENSION);
        }
        for id in wanted {
            let result = if id == extensions::REQUIRED_EXTENSION && toggles.offline_cpptools {
                manager.install_offline(
                    id,
                    extensions::CPPTOOLS_VSIX_URL,
                    extensions::DOWNLOAD_TIMEOUT,
                )
            } else {
                manager.install(id)
            };
            if let Err(e) = result {
                report.soft(Step::Extensions, format!("install {}: {}", id, e));
            }
        }
    }

    fn provision_scripts(
        &self,
        options: &ConfigOptions,
        script_dir: &Path,
        report: &mut GenerationReport,
    ) {
        let toggles = &options.toggles;
        let wanted = scripts::required_scripts(
            self.platform,
            toggles.external_terminal,
            toggles.apply_non_ascii_check,
        );
        for (name, content) in wanted {
            match scripts::install_script(script_dir, name, content) {
                Ok(_) => report.scripts.push(script_dir.join(name)),
                Err(e) => report.soft(Step::Scripts, format!("{}: {}", name, e)),
            }
        }

        if toggles.external_terminal {
            let merged = match &self.keybindings {
                Some(path) => scripts::merge_keybinding(path),
                None => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no editor settings directory",
                )),
            };
            if let Err(e) = merged {
                report.soft(Step::Scripts, format!("keybinding: {}", e));
            }
        }
    }
}

/// Removes whatever sits at `dir` (a tree or a plain file), then recreates it empty
fn reset_dir(dir: &Path) -> Result<(), GenerationError> {
    let wrap = |source| GenerationError::WorkspaceReset {
        path: dir.to_path_buf(),
        source,
    };
    if let Ok(meta) = fs::symlink_metadata(dir) {
        if meta.is_dir() {
            fs::remove_dir_all(dir).map_err(wrap)?;
        } else {
            fs::remove_file(dir).map_err(wrap)?;
        }
        tracing::info!("Removed existing {}", dir.display());
    }
    fs::create_dir_all(dir).map_err(wrap)
}
