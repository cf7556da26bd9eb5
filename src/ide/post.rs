//! Desktop shortcut, editor launch and the usage ping.

use crate::host::Host;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

#[cfg(windows)]
pub const SHORTCUT_NAME: &str = "Visual Studio Code.lnk";
#[cfg(not(windows))]
pub const SHORTCUT_NAME: &str = "Visual Studio Code.desktop";

pub const ANALYTICS_URL: &str =
    "https://api.countapi.xyz/hit/guyutongxue.github.io/b54f2252-e54a-4bd0-b4c2-33b47db6aa98";

pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Creates a desktop shortcut opening `workspace` in the editor, replacing any old one.
pub fn create_shortcut(host: &dyn Host, editor: &Path, workspace: &Path) -> io::Result<PathBuf> {
    let desktop = host
        .desktop_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no desktop directory"))?;
    let link = desktop.join(SHORTCUT_NAME);
    if link.exists() {
        tracing::warn!("{} exists and will be replaced", link.display());
        std::fs::remove_file(&link)?;
    }

    let args = format!("\"{}\"", workspace.display());
    let description = format!("Open VS Code at {}", workspace.display());
    host.create_shortcut(&link, editor, &args, &description)?;
    tracing::info!("Created shortcut {}", link.display());
    Ok(link)
}

/// Argument list for opening the workspace, optionally at a file
pub fn editor_args(workspace: &Path, file: Option<&Path>) -> Vec<String> {
    let mut args = vec![workspace.to_string_lossy().into_owned()];
    if let Some(file) = file {
        args.push("--goto".to_string());
        args.push(file.to_string_lossy().into_owned());
    }
    args
}

/// Starts the editor without waiting for it
pub fn launch_editor(editor: &Path, workspace: &Path, file: Option<&Path>) -> io::Result<()> {
    let args = editor_args(workspace, file);
    tracing::info!("Launching VS Code...");
    tracing::debug!("{} {}", editor.display(), args.join(" "));
    Command::new(editor)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

/// Fire-and-forget GET; the caller decides what a failure means
pub fn send_ping(url: &str, timeout: Duration) -> Result<(), ureq::Error> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into();
    agent.get(url).call()?;
    tracing::info!("Usage ping sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::FakeHost;
    use tempfile::TempDir;

    #[test]
    fn test_editor_args() {
        let ws = Path::new("/home/me/ws");
        assert_eq!(editor_args(ws, None), vec!["/home/me/ws"]);
        assert_eq!(
            editor_args(ws, Some(Path::new("/home/me/ws/helloworld.cpp"))),
            vec!["/home/me/ws", "--goto", "/home/me/ws/helloworld.cpp"]
        );
    }

    #[test]
    fn test_shortcut_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(SHORTCUT_NAME), "stale").unwrap();
        let host = FakeHost {
            desktop: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };

        let link = create_shortcut(&host, Path::new("/usr/bin/code"), Path::new("/ws")).unwrap();
        let content = std::fs::read_to_string(link).unwrap();
        assert_eq!(content, "/usr/bin/code \"/ws\"");
    }

    #[test]
    fn test_shortcut_without_desktop_fails() {
        let host = FakeHost::default();
        assert!(create_shortcut(&host, Path::new("/usr/bin/code"), Path::new("/ws")).is_err());
    }

    #[test]
    fn test_ping_failure_is_reported() {
        // Nothing listens on port 9 of the loopback interface
        assert!(send_ping("http://127.0.0.1:9/", Duration::from_secs(2)).is_err());
    }
}
