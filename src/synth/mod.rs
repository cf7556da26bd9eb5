//! Option synthesis
//!
//! Turns the facts gathered by [`crate::toolchain::resolve`] and the user's
//! [`Overrides`] into one generation-ready [`ConfigOptions`]. Nothing here touches
//! the filesystem except for existence checks and the explicit probe of an
//! overridden toolchain.

pub mod standard;

use crate::config::{ConfigOptions, LanguageKind, Overrides, config_dir_of};
use crate::toolchain::{
    BIN_DIR_NAME, Environment, ToolchainInfo, ToolchainProber, find_executable, normalize_dir,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no working GCC toolchain was found on PATH (pass --mingw-path to point at one)")]
    NoToolchainFound,

    #[error("VS Code was not found: {0}")]
    EditorNotFound(String),

    #[error("no working compiler in '{}'", .0.display())]
    ToolchainUnverifiable(PathBuf),

    #[error("compiler '{0}' was not found on PATH")]
    CompilerNotFound(String),

    #[error("'{standard}' is not a valid {language} standard")]
    InvalidStandard {
        standard: String,
        language: LanguageKind,
    },

    #[error("no workspace folder was specified (pass --workspace-path)")]
    WorkspaceNotSpecified,

    #[error("workspace path '{}' contains non-ASCII characters", .0.display())]
    NonAsciiWorkspace(PathBuf),

    #[error("aborted by user")]
    Aborted,
}

/// Decisions that need a human when more than one answer is valid
pub trait Interaction {
    /// Index into `candidates`, or `None` to cancel
    fn choose_toolchain(&self, candidates: &[ToolchainInfo]) -> Option<usize>;

    /// Whether an existing configuration directory may be replaced
    fn confirm_overwrite(&self, config_dir: &Path) -> bool;
}

/// Non-interactive policy: first candidate, always overwrite
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Interaction for AutoConfirm {
    fn choose_toolchain(&self, _candidates: &[ToolchainInfo]) -> Option<usize> {
        Some(0)
    }

    fn confirm_overwrite(&self, _config_dir: &Path) -> bool {
        true
    }
}

pub fn synthesize(
    env: &Environment,
    overrides: &Overrides,
    prober: &dyn ToolchainProber,
    interaction: &dyn Interaction,
) -> Result<ConfigOptions, ResolutionError> {
    let toolchain = select_toolchain(env, overrides, prober, interaction)?;
    tracing::info!("Selected toolchain: {}", toolchain);

    let editor_path = select_editor(env, overrides)?;
    tracing::info!("Selected editor: {}", editor_path.display());

    let language = overrides.language;
    let mut language_standard = match &overrides.language_standard {
        Some(token) => standard::normalize(token, language)
            .ok_or_else(|| ResolutionError::InvalidStandard {
                standard: token.clone(),
                language,
            })?
            .to_string(),
        None => standard::default_for(&toolchain.version_number, language).to_string(),
    };
    if overrides.gnu_extensions {
        language_standard = standard::apply_gnu(&language_standard);
    }
    tracing::info!("Language standard: {}", language_standard);

    let compile_args = standard::assemble_args(&overrides.compile_args, &language_standard);

    let workspace_path = select_workspace(overrides)?;
    let config_dir = config_dir_of(&workspace_path);
    if config_dir.exists() {
        tracing::warn!("{} already exists and will be replaced", config_dir.display());
        if !overrides.assume_yes && !interaction.confirm_overwrite(&config_dir) {
            return Err(ResolutionError::Aborted);
        }
    }

    Ok(ConfigOptions {
        editor_path,
        toolchain_dir: toolchain.bin_directory,
        compiler: toolchain.compiler,
        workspace_path,
        language,
        language_standard,
        compile_args,
        toggles: overrides.toggles.clone(),
    })
}

/// Picks the toolchain: explicit compiler, explicit directory, sole candidate,
/// or a choice among many.
pub fn select_toolchain(
    env: &Environment,
    overrides: &Overrides,
    prober: &dyn ToolchainProber,
    interaction: &dyn Interaction,
) -> Result<ToolchainInfo, ResolutionError> {
    if let Some(compiler) = &overrides.compiler {
        let path = locate_compiler(compiler, &env.search_dirs)?;
        tracing::debug!("probing overridden compiler {}", path.display());
        return prober
            .probe_compiler(&path)
            .ok_or(ResolutionError::ToolchainUnverifiable(path));
    }

    if let Some(path) = &overrides.toolchain_path {
        let dir = canonical_bin_dir(path);
        tracing::debug!("probing overridden toolchain {}", dir.display());
        return prober
            .probe(&dir)
            .ok_or(ResolutionError::ToolchainUnverifiable(dir));
    }

    match env.toolchains.as_slice() {
        [] => Err(ResolutionError::NoToolchainFound),
        [only] => Ok(only.clone()),
        many => {
            let index = if overrides.assume_yes {
                0
            } else {
                interaction
                    .choose_toolchain(many)
                    .ok_or(ResolutionError::Aborted)?
            };
            many.get(index).cloned().ok_or(ResolutionError::Aborted)
        }
    }
}

/// A bare name is looked up in `search_dirs`; anything with a directory part is used as is
fn locate_compiler(compiler: &Path, search_dirs: &[PathBuf]) -> Result<PathBuf, ResolutionError> {
    if compiler.components().count() > 1 {
        return Ok(compiler.to_path_buf());
    }
    let name = compiler.to_string_lossy();
    find_executable(&name, search_dirs)
        .ok_or_else(|| ResolutionError::CompilerNotFound(name.into_owned()))
}

/// Appends `bin` unless the path already ends in it
pub fn canonical_bin_dir(path: &Path) -> PathBuf {
    let dir = normalize_dir(path);
    let ends_in_bin = dir
        .file_name()
        .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(BIN_DIR_NAME));
    if ends_in_bin {
        dir
    } else {
        dir.join(BIN_DIR_NAME)
    }
}

fn select_editor(env: &Environment, overrides: &Overrides) -> Result<PathBuf, ResolutionError> {
    if let Some(path) = &overrides.editor_path {
        return if path.is_file() {
            Ok(path.clone())
        } else {
            Err(ResolutionError::EditorNotFound(format!(
                "'{}' is not a file",
                path.display()
            )))
        };
    }
    env.editor.clone().ok_or_else(|| {
        ResolutionError::EditorNotFound(
            "no installation was detected (pass --vscode-path to point at one)".to_string(),
        )
    })
}

fn select_workspace(overrides: &Overrides) -> Result<PathBuf, ResolutionError> {
    let raw = overrides
        .workspace_path
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ResolutionError::WorkspaceNotSpecified)?;
    let workspace = std::path::absolute(raw).unwrap_or_else(|_| raw.clone());

    if overrides.toggles.apply_non_ascii_check && !workspace.to_string_lossy().is_ascii() {
        return Err(ResolutionError::NonAsciiWorkspace(workspace));
    }
    Ok(workspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::probe::testing::FakeProber;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct Scripted {
        choice: Option<usize>,
        overwrite: bool,
        asked: Cell<bool>,
    }

    impl Interaction for Scripted {
        fn choose_toolchain(&self, _candidates: &[ToolchainInfo]) -> Option<usize> {
            self.asked.set(true);
            self.choice
        }

        fn confirm_overwrite(&self, _config_dir: &Path) -> bool {
            self.asked.set(true);
            self.overwrite
        }
    }

    fn scripted(choice: Option<usize>, overwrite: bool) -> Scripted {
        Scripted {
            choice,
            overwrite,
            asked: Cell::new(false),
        }
    }

    fn info(dir: &str, line: &str) -> ToolchainInfo {
        ToolchainInfo::from_version_line(Path::new(dir), line)
    }

    struct Fixture {
        _tmp: TempDir,
        editor: PathBuf,
        workspace: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let editor = tmp.path().join("code");
        std::fs::write(&editor, "").unwrap();
        let workspace = tmp.path().join("ws");
        std::fs::create_dir_all(&workspace).unwrap();
        Fixture {
            _tmp: tmp,
            editor,
            workspace,
        }
    }

    fn env_with(fx: &Fixture, toolchains: Vec<ToolchainInfo>) -> Environment {
        Environment {
            editor: Some(fx.editor.clone()),
            toolchains,
            ..Default::default()
        }
    }

    fn overrides_for(fx: &Fixture) -> Overrides {
        Overrides {
            workspace_path: Some(fx.workspace.clone()),
            assume_yes: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_toolchain_is_selected() {
        let fx = fixture();
        let env = env_with(&fx, vec![info("/opt/a/bin", "g++ (A) 9.2.0")]);
        let options =
            synthesize(&env, &overrides_for(&fx), &FakeProber::default(), &AutoConfirm).unwrap();

        assert_eq!(options.toolchain_dir, PathBuf::from("/opt/a/bin"));
        assert_eq!(options.language_standard, "c++17");
        assert_eq!(options.compile_args, vec!["-std=c++17"]);
        assert_eq!(options.editor_path, fx.editor);
    }

    #[test]
    fn test_no_toolchain_fails() {
        let fx = fixture();
        let env = env_with(&fx, vec![]);
        let err = synthesize(&env, &overrides_for(&fx), &FakeProber::default(), &AutoConfirm)
            .unwrap_err();
        assert!(matches!(err, ResolutionError::NoToolchainFound));
    }

    #[test]
    fn test_multiple_toolchains_auto_confirm_takes_first() {
        let fx = fixture();
        let env = env_with(
            &fx,
            vec![
                info("/opt/a/bin", "g++ (A) 8.1.0"),
                info("/opt/b/bin", "g++ (B) 11.2.0"),
            ],
        );
        let interaction = scripted(Some(1), true);
        let options =
            synthesize(&env, &overrides_for(&fx), &FakeProber::default(), &interaction).unwrap();

        assert!(!interaction.asked.get());
        assert_eq!(options.toolchain_dir, PathBuf::from("/opt/a/bin"));
        assert_eq!(options.language_standard, "c++17");
    }

    #[test]
    fn test_multiple_toolchains_interactive_choice() {
        let fx = fixture();
        let env = env_with(
            &fx,
            vec![
                info("/opt/a/bin", "g++ (A) 8.1.0"),
                info("/opt/b/bin", "g++ (B) 11.2.0"),
            ],
        );
        let mut overrides = overrides_for(&fx);
        overrides.assume_yes = false;

        let options =
            synthesize(&env, &overrides, &FakeProber::default(), &scripted(Some(1), true))
                .unwrap();
        assert_eq!(options.toolchain_dir, PathBuf::from("/opt/b/bin"));
        assert_eq!(options.language_standard, "c++23");

        let out_of_range =
            synthesize(&env, &overrides, &FakeProber::default(), &scripted(Some(5), true));
        assert!(matches!(out_of_range, Err(ResolutionError::Aborted)));

        let cancelled = synthesize(&env, &overrides, &FakeProber::default(), &scripted(None, true));
        assert!(matches!(cancelled, Err(ResolutionError::Aborted)));
    }

    #[test]
    fn test_toolchain_override_appends_bin_and_probes() {
        let fx = fixture();
        let env = env_with(&fx, vec![]);
        let mut overrides = overrides_for(&fx);
        overrides.toolchain_path = Some(PathBuf::from("/opt/mingw64/"));

        let prober = FakeProber::default().with("/opt/mingw64/bin", "g++ (M) 10.3.0");
        let options = synthesize(&env, &overrides, &prober, &AutoConfirm).unwrap();
        assert_eq!(options.toolchain_dir, PathBuf::from("/opt/mingw64/bin"));
        assert_eq!(options.language_standard, "c++20");

        overrides.toolchain_path = Some(PathBuf::from("/opt/broken"));
        let err = synthesize(&env, &overrides, &prober, &AutoConfirm).unwrap_err();
        assert!(
            matches!(err, ResolutionError::ToolchainUnverifiable(ref p) if p == Path::new("/opt/broken/bin"))
        );
    }

    #[test]
    fn test_compiler_override_by_name_is_found_on_path() {
        let fx = fixture();
        let tools = fx.editor.parent().unwrap().join("tools");
        std::fs::create_dir_all(&tools).unwrap();
        std::fs::write(tools.join("g++-13"), "").unwrap();

        let mut env = env_with(&fx, vec![info("/opt/a/bin", "g++ (A) 9.2.0")]);
        env.search_dirs = vec![PathBuf::from("/opt/a/bin"), tools.clone()];
        let mut overrides = overrides_for(&fx);
        overrides.compiler = Some(PathBuf::from("g++-13"));
        overrides.toolchain_path = Some(PathBuf::from("/ignored"));

        let prober = FakeProber::default().with(&tools.to_string_lossy(), "g++-13 (GCC) 13.2.0");
        let options = synthesize(&env, &overrides, &prober, &AutoConfirm).unwrap();
        assert_eq!(options.compiler, Some(tools.join("g++-13")));
        assert_eq!(options.compiler_path(), tools.join("g++-13"));
        assert_eq!(options.toolchain_dir, tools);
        assert_eq!(options.language_standard, "c++23");
    }

    #[test]
    fn test_compiler_override_failures() {
        let fx = fixture();
        let env = env_with(&fx, vec![info("/opt/a/bin", "g++ (A) 9.2.0")]);
        let mut overrides = overrides_for(&fx);

        overrides.compiler = Some(PathBuf::from("clang++"));
        let err = synthesize(&env, &overrides, &FakeProber::default(), &AutoConfirm).unwrap_err();
        assert!(matches!(err, ResolutionError::CompilerNotFound(ref n) if n == "clang++"));

        overrides.compiler = Some(PathBuf::from("/opt/none/g++"));
        let err = synthesize(&env, &overrides, &FakeProber::default(), &AutoConfirm).unwrap_err();
        assert!(
            matches!(err, ResolutionError::ToolchainUnverifiable(ref p) if p == Path::new("/opt/none/g++"))
        );
    }

    #[test]
    fn test_canonical_bin_dir() {
        assert_eq!(canonical_bin_dir(Path::new("/opt/gcc/bin")), PathBuf::from("/opt/gcc/bin"));
        assert_eq!(canonical_bin_dir(Path::new("/opt/gcc/BIN/")), PathBuf::from("/opt/gcc/BIN"));
        assert_eq!(canonical_bin_dir(Path::new("/opt/gcc")), PathBuf::from("/opt/gcc/bin"));
    }

    #[test]
    fn test_editor_missing() {
        let fx = fixture();
        let mut env = env_with(&fx, vec![info("/opt/a/bin", "g++ (A) 9.2.0")]);
        env.editor = None;
        let err = synthesize(&env, &overrides_for(&fx), &FakeProber::default(), &AutoConfirm)
            .unwrap_err();
        assert!(matches!(err, ResolutionError::EditorNotFound(_)));

        let mut overrides = overrides_for(&fx);
        overrides.editor_path = Some(PathBuf::from("/nowhere/code"));
        let err = synthesize(&env, &overrides, &FakeProber::default(), &AutoConfirm).unwrap_err();
        assert!(matches!(err, ResolutionError::EditorNotFound(_)));
    }

    #[test]
    fn test_standard_override_is_validated_before_gnu() {
        let fx = fixture();
        let env = env_with(&fx, vec![info("/opt/a/bin", "g++ (A) 9.2.0")]);
        let mut overrides = overrides_for(&fx);
        overrides.language = LanguageKind::C;
        overrides.language_standard = Some("c99".into());
        overrides.gnu_extensions = true;

        let options = synthesize(&env, &overrides, &FakeProber::default(), &AutoConfirm).unwrap();
        assert_eq!(options.language_standard, "gnu99");
        assert_eq!(options.compile_args, vec!["-std=gnu99"]);

        overrides.language_standard = Some("gnu99".into());
        let err = synthesize(&env, &overrides, &FakeProber::default(), &AutoConfirm).unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidStandard { .. }));
    }

    #[test]
    fn test_user_standard_flag_is_kept() {
        let fx = fixture();
        let env = env_with(&fx, vec![info("/opt/a/bin", "g++ (A) 9.2.0")]);
        let mut overrides = overrides_for(&fx);
        overrides.compile_args = vec!["-Wall".into(), "-std=c++11".into()];

        let options = synthesize(&env, &overrides, &FakeProber::default(), &AutoConfirm).unwrap();
        assert_eq!(options.compile_args, vec!["-Wall", "-std=c++11"]);
    }

    #[test]
    fn test_workspace_required() {
        let fx = fixture();
        let env = env_with(&fx, vec![info("/opt/a/bin", "g++ (A) 9.2.0")]);
        let mut overrides = overrides_for(&fx);
        overrides.workspace_path = None;
        let err = synthesize(&env, &overrides, &FakeProber::default(), &AutoConfirm).unwrap_err();
        assert!(matches!(err, ResolutionError::WorkspaceNotSpecified));
    }

    #[test]
    fn test_non_ascii_workspace_rejected_when_checked() {
        let fx = fixture();
        let env = env_with(&fx, vec![info("/opt/a/bin", "g++ (A) 9.2.0")]);
        let mut overrides = overrides_for(&fx);
        overrides.workspace_path = Some(fx.workspace.join("项目"));
        overrides.toggles.apply_non_ascii_check = true;

        let err = synthesize(&env, &overrides, &FakeProber::default(), &AutoConfirm).unwrap_err();
        assert!(matches!(err, ResolutionError::NonAsciiWorkspace(_)));

        overrides.toggles.apply_non_ascii_check = false;
        assert!(synthesize(&env, &overrides, &FakeProber::default(), &AutoConfirm).is_ok());
    }

    #[test]
    fn test_existing_config_dir_needs_confirmation() {
        let fx = fixture();
        std::fs::create_dir_all(fx.workspace.join(".vscode")).unwrap();
        let env = env_with(&fx, vec![info("/opt/a/bin", "g++ (A) 9.2.0")]);
        let mut overrides = overrides_for(&fx);
        overrides.assume_yes = false;

        let declined = scripted(None, false);
        let err = synthesize(&env, &overrides, &FakeProber::default(), &declined).unwrap_err();
        assert!(declined.asked.get());
        assert!(matches!(err, ResolutionError::Aborted));

        assert!(synthesize(&env, &overrides, &FakeProber::default(), &scripted(None, true)).is_ok());

        overrides.assume_yes = true;
        let silent = scripted(None, false);
        assert!(synthesize(&env, &overrides, &FakeProber::default(), &silent).is_ok());
        assert!(!silent.asked.get());
    }
}
