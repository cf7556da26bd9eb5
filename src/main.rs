//! # vscch CLI Entry Point
//!
//! Parses flags with clap, maps them onto [`Overrides`] (on top of an optional
//! profile) and runs resolve → synthesize → generate. Exits with 0 on success,
//! including runs that only hit soft failures, and 1 otherwise.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

use vscch::config::{LanguageKind, Overrides, TestFilePolicy};
use vscch::host::NativeHost;
use vscch::ide::{self, Generator};
use vscch::logging;
use vscch::profile;
use vscch::synth::{self, AutoConfirm, Interaction};
use vscch::toolchain::{self, CommandProber};
use vscch::ui::{self, InquireInteraction};

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_windows_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_windows_utf8_console() {}

#[derive(Parser, Debug)]
#[command(name = "vscch")]
#[command(about = "Configure VS Code for single-file C/C++ development with GCC")]
#[command(long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print progress details
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Never prompt: take the first toolchain found and replace existing configuration
    #[arg(short = 'y', long)]
    assume_yes: bool,

    /// Print version
    #[arg(short = 'v', long)]
    version: bool,

    /// List detected toolchains and VS Code, then exit
    #[arg(long)]
    list: bool,

    /// Delete installed helper scripts, then exit
    #[arg(long)]
    remove_scripts: bool,

    /// Load options from a TOML profile (flags still win)
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Save the effective options as a TOML profile after a successful run
    #[arg(long, value_name = "FILE")]
    save_profile: Option<PathBuf>,

    /// VS Code executable
    #[arg(long, value_name = "PATH")]
    vscode_path: Option<PathBuf>,

    /// Toolchain directory (`bin` is appended when missing)
    #[arg(long, value_name = "PATH")]
    mingw_path: Option<PathBuf>,

    /// Compiler to use, as a name looked up on PATH or a full path
    #[arg(long, value_name = "NAME|PATH")]
    compiler: Option<PathBuf>,

    /// Folder to configure
    #[arg(long, value_name = "PATH")]
    workspace_path: Option<PathBuf>,

    /// Language: c++ or c
    #[arg(long, value_name = "LANG")]
    language: Option<LanguageKind>,

    /// Language standard, e.g. c++17 or c11 [default: chosen from the GCC version]
    #[arg(long, value_name = "STD")]
    language_standard: Option<String>,

    /// Use the GNU dialect (gnu++17 instead of c++17)
    #[arg(long)]
    gnu_extensions: bool,

    /// Run and debug in a separate console window
    #[arg(long)]
    external_terminal: bool,

    /// Warn before debugging files with non-ASCII names
    #[arg(long = "apply-nonascii-check")]
    apply_non_ascii_check: bool,

    /// Do not add the toolchain to the user PATH
    #[arg(long)]
    no_set_env: bool,

    /// Install the C/C++ extension
    #[arg(long, overrides_with = "no_install_extensions")]
    install_extensions: bool,

    /// Do not install the C/C++ extension
    #[arg(long)]
    no_install_extensions: bool,

    /// Install the C/C++ extension from a downloaded package instead of the marketplace
    #[arg(long)]
    offline_cpptools: bool,

    /// Uninstall extensions that conflict with this setup
    #[arg(long)]
    uninstall_extensions: bool,

    /// Install the Chinese language pack
    #[arg(long)]
    install_chinese: bool,

    /// Create a desktop shortcut opening the workspace
    #[arg(long)]
    generate_shortcut: bool,

    /// Always write a hello-world file (numbered if one exists)
    #[arg(long, overrides_with = "no_generate_test")]
    generate_test: bool,

    /// Never write a hello-world file
    #[arg(long)]
    no_generate_test: bool,

    /// Open VS Code when done
    #[arg(long)]
    open_vscode: bool,

    /// Do not send the anonymous usage ping
    #[arg(long)]
    no_send_analytics: bool,

    /// Extra compiler flags
    #[arg(last = true, value_name = "COMPILE_ARGS")]
    compile_args: Vec<String>,
}

impl Cli {
    /// Applies every flag that was given on top of `base`
    fn apply(&self, mut base: Overrides) -> Overrides {
        if let Some(p) = &self.vscode_path {
            base.editor_path = Some(p.clone());
        }
        if let Some(p) = &self.mingw_path {
            base.toolchain_path = Some(p.clone());
        }
        if let Some(c) = &self.compiler {
            base.compiler = Some(c.clone());
        }
        if let Some(p) = &self.workspace_path {
            base.workspace_path = Some(p.clone());
        }
        if let Some(lang) = self.language {
            base.language = lang;
        }
        if let Some(std) = &self.language_standard {
            base.language_standard = Some(std.clone());
        }
        if !self.compile_args.is_empty() {
            base.compile_args = self.compile_args.clone();
        }
        base.gnu_extensions |= self.gnu_extensions;
        base.assume_yes = self.assume_yes;

        let t = &mut base.toggles;
        t.external_terminal |= self.external_terminal;
        t.apply_non_ascii_check |= self.apply_non_ascii_check;
        t.offline_cpptools |= self.offline_cpptools;
        t.uninstall_extensions |= self.uninstall_extensions;
        t.install_l10n |= self.install_chinese;
        t.generate_shortcut |= self.generate_shortcut;
        t.open_editor |= self.open_vscode;
        if self.no_set_env {
            t.set_env = false;
        }
        if self.install_extensions {
            t.install_extensions = true;
        } else if self.no_install_extensions {
            t.install_extensions = false;
        }
        if self.generate_test {
            t.test_file = TestFilePolicy::Force;
        } else if self.no_generate_test {
            t.test_file = TestFilePolicy::Skip;
        }
        if self.no_send_analytics {
            t.send_analytics = false;
        }
        base
    }
}

fn main() -> ExitCode {
    enable_windows_utf8_console();

    let cli = Cli::parse();
    if cli.version {
        println!("vscch {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    logging::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("{} {:#}", "x".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let base = match &cli.profile {
        Some(path) => profile::load(path)?,
        None => Overrides::default(),
    };
    let overrides = cli.apply(base);

    let host = NativeHost;
    let prober = CommandProber::default();
    let env = toolchain::resolve(&host, &prober);

    if cli.list {
        ui::print_environment(&env);
        return Ok(());
    }

    let interaction: &dyn Interaction = if overrides.assume_yes {
        &AutoConfirm
    } else {
        &InquireInteraction
    };

    if cli.remove_scripts {
        let dir = if cfg!(windows) {
            synth::select_toolchain(&env, &overrides, &prober, interaction)?.bin_directory
        } else {
            ide::scripts::default_script_dir(&PathBuf::new())
        };
        let removed = ide::scripts::remove_scripts(&dir)
            .with_context(|| format!("Failed to remove scripts from {}", dir.display()))?;
        println!(
            "{} Removed {} script(s) from {}",
            "✓".green(),
            removed.len(),
            dir.display()
        );
        return Ok(());
    }

    let options = synth::synthesize(&env, &overrides, &prober, interaction)?;
    let report = Generator::new(&host)
        .generate(&options)
        .map_err(|e| match e.step() {
            Some(step) => anyhow::Error::new(e).context(format!("{} failed", step)),
            None => anyhow::Error::new(e),
        })?;
    ui::print_report(&report);

    if let Some(path) = &cli.save_profile {
        profile::save(path, &overrides)?;
        println!("{} Saved profile to {}", "✓".green(), path.display());
    }
    Ok(())
}
