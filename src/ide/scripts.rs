//! Helper scripts used by the generated tasks, and the F6 keybinding.

use super::descriptors::{Platform, RUN_TASK};
use serde_json::{Value, json};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CHECK_ASCII_SCRIPT: &str = "check-ascii.ps1";

pub const RUN_KEY: &str = "f6";
const RUN_TASK_COMMAND: &str = "workbench.action.tasks.runTask";

const PAUSE_CONSOLE_PS1: &str = r#"###
# Generated by vscch. Edit it only if you know what you are doing!

$Host.UI.RawUI.BackgroundColor = 'Black'
Clear-Host
if ($args.Length -eq 0) {
    Write-Host "Usage: $PSCommandPath <Executable> [<Arguments...>]"
    exit
}
$Host.UI.RawUI.WindowTitle = $args[0]
$startTime = $(Get-Date)
$proc = Start-Process -FilePath $args[0] -ArgumentList $args[1..($args.Count-1)] -NoNewWindow -PassThru
$handle = $proc.Handle
$proc.WaitForExit()
[TimeSpan]$elapsedTime = $(Get-Date) - $startTime

Write-Host
$exitCode = $proc.ExitCode
if ($exitCode -eq 0) { $exitColor = 'Green' } else { $exitColor = 'Red' }
Write-Host "----------------" -NoNewline
Write-Host (" exit code {0} " -f $exitCode) -BackgroundColor $exitColor -NoNewline
Write-Host (" {0:n4}s " -f $elapsedTime.TotalSeconds) -BackgroundColor 'Yellow' -ForegroundColor 'Black' -NoNewline
Write-Host "----------------"
Write-Host "Process exited. Press any key to close this window..." -NoNewline
[void][System.Console]::ReadKey($true)
"#;

const PAUSE_CONSOLE_SH: &str = r#"#!/usr/bin/env bash
# Generated by vscch. Edit it only if you know what you are doing!

if [ $# -eq 0 ]; then
    echo "Usage: $0 <Executable> [<Arguments...>]"
    exit 1
fi
clear
start=$(date +%s.%N)
"$@"
code=$?
end=$(date +%s.%N)
elapsed=$(echo "$end - $start" | bc 2>/dev/null || echo "?")

echo
if [ $code -eq 0 ]; then color=42; else color=41; fi
printf -- "----------------\033[%sm exit code %d \033[0m\033[43;30m %ss \033[0m----------------\n" "$color" "$code" "$elapsed"
read -n 1 -s -r -p "Process exited. Press any key to close this window..."
echo
"#;

const CHECK_ASCII_PS1: &str = r#"###
# Generated by vscch. Edit it only if you know what you are doing!

if ($args.Length -eq 0) {
    Write-Host "Usage: $PSCommandPath <Filename>"
    exit
}
Add-Type -AssemblyName PresentationCore,PresentationFramework
function isAscii($str) {
    return $str -match '^[\x20-\x7F]*$';
}
if (isAscii($args[0])) {
    exit
} else {
    $result = [System.Windows.MessageBox]::Show('The file name contains non-ASCII characters, which the debugger cannot handle. Continue debugging anyway?', 'Warning', [System.Windows.MessageBoxButton]::YesNo, [System.Windows.MessageBoxImage]::Warning);
    if ($result -eq [System.Windows.MessageBoxResult]::Yes) {
        exit
    } else {
        exit 1
    }
}
"#;

/// Directory the helper scripts are installed into
pub fn default_script_dir(toolchain_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        toolchain_dir.to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local")
            .join("bin")
    }
}

/// Editor's user `keybindings.json`
pub fn default_keybindings_path() -> Option<PathBuf> {
    Some(
        dirs::config_dir()?
            .join("Code")
            .join("User")
            .join("keybindings.json"),
    )
}

/// Scripts needed for the given toggles, as `(file name, content)`
pub fn required_scripts(
    platform: Platform,
    external_terminal: bool,
    ascii_check: bool,
) -> Vec<(&'static str, &'static str)> {
    let mut scripts = Vec::new();
    if external_terminal {
        let content = match platform {
            Platform::Windows => PAUSE_CONSOLE_PS1,
            _ => PAUSE_CONSOLE_SH,
        };
        scripts.push((platform.pause_script(), content));
    }
    if ascii_check && platform == Platform::Windows {
        scripts.push((CHECK_ASCII_SCRIPT, CHECK_ASCII_PS1));
    }
    scripts
}

/// Writes a script unless one already exists. Returns whether it was written.
pub fn install_script(dir: &Path, name: &str, content: &str) -> io::Result<bool> {
    let path = dir.join(name);
    if path.exists() {
        tracing::info!("{} already exists, keeping it", path.display());
        return Ok(false);
    }
    fs::create_dir_all(dir)?;
    fs::write(&path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }
    tracing::info!("Installed {}", path.display());
    Ok(true)
}

/// Deletes every helper script from `dir`; returns the removed paths
pub fn remove_scripts(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for name in [
        CHECK_ASCII_SCRIPT,
        Platform::Windows.pause_script(),
        Platform::Linux.pause_script(),
    ] {
        let path = dir.join(name);
        if path.is_file() {
            fs::remove_file(&path)?;
            tracing::info!("Removed {}", path.display());
            removed.push(path);
        }
    }
    Ok(removed)
}

/// Binds F6 to the run task, replacing any binding already on that key.
///
/// An unreadable or malformed file is overwritten.
pub fn merge_keybinding(path: &Path) -> io::Result<()> {
    let mut bindings: Vec<Value> = match fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str::<Vec<Value>>(&text) {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!("{} is not valid JSON ({}); overwriting", path.display(), e);
                Vec::new()
            }
        },
        Err(_) => Vec::new(),
    };

    bindings.retain(|b| {
        let same_key = b.get("key").and_then(Value::as_str) == Some(RUN_KEY);
        if same_key {
            tracing::warn!("Replacing existing {} keybinding", RUN_KEY);
        }
        !same_key
    });
    bindings.push(json!({
        "key": RUN_KEY,
        "command": RUN_TASK_COMMAND,
        "args": RUN_TASK
    }));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(&bindings).map_err(io::Error::other)?;
    fs::write(path, text)
}
