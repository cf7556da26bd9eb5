//! Compiler probing: asks a candidate directory's `g++` for its version.

use super::types::{CXX_COMPILER, ToolchainInfo};
use crate::process::run_with_timeout;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Upper bound for a single `g++ --version` invocation
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Tests whether a directory holds a working compiler
pub trait ToolchainProber {
    /// Returns `None` when the directory has no compiler or the compiler cannot be run.
    fn probe(&self, candidate_dir: &Path) -> Option<ToolchainInfo>;

    /// Probes one named compiler executable instead of a directory's `g++`.
    fn probe_compiler(&self, compiler: &Path) -> Option<ToolchainInfo> {
        let info = self.probe(compiler.parent()?)?;
        Some(ToolchainInfo::for_compiler(compiler, &info.raw_version_line))
    }
}

/// Prober that actually spawns the compiler
#[derive(Debug, Clone)]
pub struct CommandProber {
    pub timeout: Duration,
}

impl Default for CommandProber {
    fn default() -> Self {
        Self {
            timeout: PROBE_TIMEOUT,
        }
    }
}

impl CommandProber {
    /// First line of `compiler --version`
    fn version_line(&self, compiler: &Path) -> Option<String> {
        if !compiler.is_file() {
            return None;
        }

        match run_with_timeout(Command::new(compiler).arg("--version"), self.timeout) {
            Ok(output) => {
                let line = output.first_line()?;
                tracing::debug!("{}: {}", compiler.display(), line);
                Some(line.to_string())
            }
            Err(e) => {
                tracing::debug!("probe of {} failed: {}", compiler.display(), e);
                None
            }
        }
    }
}

impl ToolchainProber for CommandProber {
    fn probe(&self, candidate_dir: &Path) -> Option<ToolchainInfo> {
        let line = self.version_line(&candidate_dir.join(CXX_COMPILER))?;
        Some(ToolchainInfo::from_version_line(candidate_dir, &line))
    }

    fn probe_compiler(&self, compiler: &Path) -> Option<ToolchainInfo> {
        let line = self.version_line(compiler)?;
        Some(ToolchainInfo::for_compiler(compiler, &line))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic prober for resolver and synthesizer tests.

    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[derive(Default)]
    pub struct FakeProber {
        pub lines: HashMap<PathBuf, String>,
    }

    impl FakeProber {
        pub fn with(mut self, dir: &str, line: &str) -> Self {
            self.lines.insert(PathBuf::from(dir), line.to_string());
            self
        }
    }

    impl ToolchainProber for FakeProber {
        fn probe(&self, candidate_dir: &Path) -> Option<ToolchainInfo> {
            self.lines
                .get(candidate_dir)
                .map(|line| ToolchainInfo::from_version_line(candidate_dir, line))
        }
    }
}
