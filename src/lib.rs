//! # vscch - VS Code C/C++ configuration helper
//!
//! Finds a GCC/MinGW toolchain and VS Code on the local machine, then writes a
//! ready-to-use single-file build, debug and IntelliSense setup into a workspace.
//!
//! ## Pipeline
//!
//! Data flows one way: system state → facts → decision → files.
//!
//! 1. [`toolchain::resolve`] probes every PATH directory for a working `g++` and
//!    locates the editor. Read-only and uncached.
//! 2. [`synth::synthesize`] picks one toolchain, the editor, a language standard
//!    and the compile arguments, producing a [`config::ConfigOptions`].
//! 3. [`ide::Generator::generate`] replaces `.vscode`, writes the descriptors and
//!    applies the requested side effects (PATH, extensions, scripts, shortcut).
//!
//! ```bash
//! vscch --workspace-path ~/cpp --assume-yes -- -Wall -Wextra
//! ```
//!
//! ## Module Organization
//!
//! - [`toolchain`] - Toolchain probing and environment resolution
//! - [`synth`] - Option synthesis and standard selection
//! - [`ide`] - `.vscode` generation and side effects
//! - [`host`] - Operating system seam (registry, PATH, shortcuts)

/// Option records shared by synthesis and generation.
pub mod config;

/// Operating system access behind a trait.
pub mod host;

/// Configuration generation (VSCode).
pub mod ide;

/// Tracing subscriber setup.
pub mod logging;

/// Bounded child process execution.
pub mod process;

/// TOML preference files.
pub mod profile;

/// Option synthesis.
pub mod synth;

/// Toolchain detection.
pub mod toolchain;

/// Terminal UI utilities (tables, prompts).
pub mod ui;
