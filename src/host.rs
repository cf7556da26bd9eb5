//! Narrow interface to the operating system.
//!
//! Registry reads, user environment writes and shortcut files are reached only
//! through [`Host`], so the resolver and generator can run against a fake in tests.

use std::io;
use std::path::{Path, PathBuf};

/// Scope of a PATH-like variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvScope {
    User,
    Machine,
}

/// Separator between entries of a PATH-like variable
#[cfg(windows)]
pub const PATH_DELIMITER: char = ';';
#[cfg(not(windows))]
pub const PATH_DELIMITER: char = ':';

pub trait Host {
    /// Current value of the PATH-like variable at `scope`
    fn path_variable(&self, scope: EnvScope) -> Option<String>;

    /// Persists a new user-scope PATH value
    fn set_user_path_variable(&self, value: &str) -> io::Result<()>;

    /// Command line the editor registered as its shell open handler
    fn editor_command(&self) -> Option<String>;

    /// Value of a single environment variable, used for `%VAR%` expansion
    fn env_var(&self, name: &str) -> Option<String>;

    fn desktop_dir(&self) -> Option<PathBuf>;

    /// Creates (or replaces) a desktop shortcut at `link`
    fn create_shortcut(&self, link: &Path, target: &Path, args: &str, description: &str)
    -> io::Result<()>;
}

/// The real system
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeHost;

impl Host for NativeHost {
    #[cfg(windows)]
    fn path_variable(&self, scope: EnvScope) -> Option<String> {
        use crate::toolchain::windows;
        match scope {
            EnvScope::User => windows::user_path(),
            EnvScope::Machine => windows::machine_path(),
        }
    }

    #[cfg(not(windows))]
    fn path_variable(&self, scope: EnvScope) -> Option<String> {
        // Unix has no persistent per-scope PATH; the process value stands in for the user one
        match scope {
            EnvScope::User => std::env::var("PATH").ok(),
            EnvScope::Machine => None,
        }
    }

    #[cfg(windows)]
    fn set_user_path_variable(&self, value: &str) -> io::Result<()> {
        crate::toolchain::windows::set_user_path(value)
    }

    #[cfg(not(windows))]
    fn set_user_path_variable(&self, _value: &str) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "persisting PATH is only supported on Windows; add the toolchain to your shell profile instead",
        ))
    }

    #[cfg(windows)]
    fn editor_command(&self) -> Option<String> {
        crate::toolchain::windows::vscode_command()
    }

    #[cfg(not(windows))]
    fn editor_command(&self) -> Option<String> {
        None
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn desktop_dir(&self) -> Option<PathBuf> {
        dirs::desktop_dir()
    }

    #[cfg(windows)]
    fn create_shortcut(
        &self,
        link: &Path,
        target: &Path,
        args: &str,
        description: &str,
    ) -> io::Result<()> {
        use crate::process::run_with_timeout;
        use std::process::Command;
        use std::time::Duration;

        // Single quotes are the only metacharacter inside a PowerShell literal string
        let quote = |s: &str| format!("'{}'", s.replace('\'', "''"));
        let script = format!(
            "$s = (New-Object -ComObject WScript.Shell).CreateShortcut({}); \
             $s.TargetPath = {}; $s.Arguments = {}; $s.Description = {}; $s.Save()",
            quote(&link.to_string_lossy()),
            quote(&target.to_string_lossy()),
            quote(args),
            quote(description),
        );
        run_with_timeout(
            Command::new("powershell.exe").args([
                "-NoProfile",
                "-ExecutionPolicy",
                "Bypass",
                "-Command",
                &script,
            ]),
            Duration::from_secs(30),
        )
        .map(|_| ())
        .map_err(io::Error::other)
    }

    #[cfg(not(windows))]
    fn create_shortcut(
        &self,
        link: &Path,
        target: &Path,
        args: &str,
        description: &str,
    ) -> io::Result<()> {
        let entry = format!(
            "[Desktop Entry]\nType=Application\nName=Visual Studio Code\nComment={}\nExec=\"{}\" {}\nTerminal=false\n",
            description,
            target.display(),
            args
        );
        std::fs::write(link, entry)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(link, std::fs::Permissions::from_mode(0o755))?;
        }
        Ok(())
    }
}
