use crate::config::{ConfigOptions, LanguageKind, TestFilePolicy};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const STEM: &str = "helloworld";

/// Where the test file should go under `policy`, or `None` to skip it
pub fn target_path(workspace: &Path, language: LanguageKind, policy: TestFilePolicy) -> Option<PathBuf> {
    let ext = language.source_ext();
    let default = workspace.join(format!("{}{}", STEM, ext));
    match policy {
        TestFilePolicy::Skip => None,
        TestFilePolicy::Auto if default.exists() => None,
        TestFilePolicy::Auto => Some(default),
        TestFilePolicy::Force => {
            let mut path = default;
            let mut n = 1;
            while path.exists() {
                path = workspace.join(format!("{}({}){}", STEM, n, ext));
                n += 1;
            }
            Some(path)
        }
    }
}

/// Hello-world program with usage notes for the generated setup
pub fn render(language: LanguageKind, external_terminal: bool) -> String {
    let comment = |s: &str| match language {
        LanguageKind::Cpp => format!("// {}\n", s),
        LanguageKind::C => format!("/* {} */\n", s),
    };
    let run_key = if external_terminal { "F6" } else { "Ctrl + F5" };
    let output_hint = if external_terminal {
        "After pressing F6 you will see this line in a new console window."
    } else {
        "After pressing Ctrl + F5 you will see this line in the terminal panel below."
    };

    let mut out = String::new();
    out.push_str(&comment("VS Code C/C++ test program \"Hello World\""));
    out.push_str(&comment(&format!(
        "Generated by vscch v{}",
        env!("CARGO_PKG_VERSION")
    )));
    out.push('\n');
    out.push_str(&comment("You can write your own code in this folder."));
    out.push('\n');
    out.push_str(&comment(&format!("Press {} to build and run.", run_key)));
    out.push_str(&comment("Press F5 to build and debug."));
    out.push_str(&comment("Press Ctrl + Shift + B to build without running."));

    out.push_str(match language {
        LanguageKind::Cpp => {
            r#"
#include <iostream>

int main() {
    std::cout << "Hello, world!" << std::endl;
}
"#
        }
        LanguageKind::C => {
            r#"
#include <stdio.h>
#include <stdlib.h>

int main(void) {
    printf("Hello, world!\n");
    return EXIT_SUCCESS;
}
"#
        }
    });

    out.push('\n');
    out.push_str(&comment("Running this program prints \"Hello, world!\"."));
    out.push_str(&comment(output_hint));
    out.push_str(&comment(
        "Keep file names free of non-ASCII and special characters, or debugging will fail.",
    ));
    out
}

/// Writes the test file if the policy asks for one
pub fn generate(options: &ConfigOptions) -> io::Result<Option<PathBuf>> {
    let Some(path) = target_path(
        &options.workspace_path,
        options.language,
        options.toggles.test_file,
    ) else {
        tracing::info!("Skipping test file");
        return Ok(None);
    };

    fs::write(
        &path,
        render(options.language, options.toggles.external_terminal),
    )?;
    tracing::info!("Wrote test file {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_auto_skips_existing() {
        let tmp = TempDir::new().unwrap();
        let ws = tmp.path();
        assert_eq!(
            target_path(ws, LanguageKind::Cpp, TestFilePolicy::Auto),
            Some(ws.join("helloworld.cpp"))
        );
        fs::write(ws.join("helloworld.cpp"), "").unwrap();
        assert_eq!(target_path(ws, LanguageKind::Cpp, TestFilePolicy::Auto), None);
        // other language is unaffected
        assert_eq!(
            target_path(ws, LanguageKind::C, TestFilePolicy::Auto),
            Some(ws.join("helloworld.c"))
        );
    }

    #[test]
    fn test_force_picks_numbered_name() {
        let tmp = TempDir::new().unwrap();
        let ws = tmp.path();
        fs::write(ws.join("helloworld.c"), "").unwrap();
        fs::write(ws.join("helloworld(1).c"), "").unwrap();
        assert_eq!(
            target_path(ws, LanguageKind::C, TestFilePolicy::Force),
            Some(ws.join("helloworld(2).c"))
        );
    }

    #[test]
    fn test_skip() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(target_path(tmp.path(), LanguageKind::Cpp, TestFilePolicy::Skip), None);
    }

    #[test]
    fn test_render_matches_language() {
        let cpp = render(LanguageKind::Cpp, false);
        assert!(cpp.starts_with("// "));
        assert!(cpp.contains("#include <iostream>"));
        assert!(cpp.contains("Ctrl + F5"));

        let c = render(LanguageKind::C, true);
        assert!(c.starts_with("/* "));
        assert!(c.contains("#include <stdio.h>"));
        assert!(c.contains("Press F6"));
    }
}
