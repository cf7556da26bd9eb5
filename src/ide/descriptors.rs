//! Builders for the three `.vscode` descriptors.
//!
//! Every document is built field by field from [`ConfigOptions`]; nothing is
//! read back from an existing file.

use crate::config::ConfigOptions;
use crate::synth::standard::intellisense_standard;
use crate::toolchain::types::DEBUGGER;
use serde_json::{Value, json};
use std::path::Path;

pub const TASKS_FILE: &str = "tasks.json";
pub const LAUNCH_FILE: &str = "launch.json";
pub const PROPERTIES_FILE: &str = "c_cpp_properties.json";

pub const BUILD_TASK: &str = "gcc single file build";
pub const RUN_TASK: &str = "run and pause";
pub const ASCII_TASK: &str = "check ascii";

const POWERSHELL: &str = r"C:\Windows\system32\WindowsPowerShell\v1.0\powershell.exe";
const CMD: &str = r"C:\Windows\System32\cmd.exe";

/// Platform the descriptors are written for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            Platform::Windows => "\\",
            _ => "/",
        }
    }

    fn exe_ext(&self) -> &'static str {
        match self {
            Platform::Windows => "exe",
            _ => "out",
        }
    }

    fn intellisense_mode(&self) -> &'static str {
        match self {
            Platform::Windows => "windows-gcc-x64",
            Platform::Linux => "linux-gcc-x64",
            Platform::MacOs => "macos-gcc-x64",
        }
    }

    /// File name of the pause-console helper
    pub fn pause_script(&self) -> &'static str {
        match self {
            Platform::Windows => "pause-console.ps1",
            _ => "pause-console.sh",
        }
    }
}

/// Descriptor set for one option record
pub struct Descriptors<'a> {
    pub options: &'a ConfigOptions,
    pub platform: Platform,
    /// Where the helper scripts live
    pub script_dir: &'a Path,
}

impl<'a> Descriptors<'a> {
    pub fn new(options: &'a ConfigOptions, platform: Platform, script_dir: &'a Path) -> Self {
        Self {
            options,
            platform,
            script_dir,
        }
    }

    /// `(file name, document)` for each descriptor, in write order
    pub fn all(&self) -> [(&'static str, Value); 3] {
        [
            (TASKS_FILE, self.tasks()),
            (LAUNCH_FILE, self.launch()),
            (PROPERTIES_FILE, self.properties()),
        ]
    }

    fn output_file(&self) -> String {
        format!(
            "${{fileDirname}}{}${{fileBasenameNoExtension}}.{}",
            self.platform.separator(),
            self.platform.exe_ext()
        )
    }

    fn script(&self, name: &str) -> String {
        self.script_dir.join(name).to_string_lossy().into_owned()
    }

    fn ascii_check_enabled(&self) -> bool {
        self.platform == Platform::Windows && self.options.toggles.apply_non_ascii_check
    }

    pub fn tasks(&self) -> Value {
        let options = self.options;
        let mut args = options.compile_args.clone();
        args.extend([
            "-g".to_string(),
            "${file}".to_string(),
            "-o".to_string(),
            self.output_file(),
        ]);

        let mut tasks = vec![json!({
            "type": "process",
            "label": BUILD_TASK,
            "command": options.compiler_path().to_string_lossy(),
            "args": args,
            "group": {
                "kind": "build",
                "isDefault": true
            },
            "presentation": presentation("silent"),
            "problemMatcher": "$gcc"
        })];

        if options.toggles.external_terminal {
            let (command, mut run_args) = match self.platform {
                Platform::Windows => (
                    "START",
                    vec![
                        POWERSHELL.to_string(),
                        "-ExecutionPolicy".to_string(),
                        "ByPass".to_string(),
                        "-NoProfile".to_string(),
                        "-File".to_string(),
                    ],
                ),
                _ => ("x-terminal-emulator", vec!["-e".to_string()]),
            };
            run_args.push(self.script(self.platform.pause_script()));
            run_args.push(self.output_file());
            tasks.push(json!({
                "type": "shell",
                "label": RUN_TASK,
                "command": command,
                "dependsOn": BUILD_TASK,
                "args": run_args,
                "presentation": presentation("never"),
                "problemMatcher": []
            }));
        }

        if self.ascii_check_enabled() {
            tasks.push(json!({
                "type": "process",
                "label": ASCII_TASK,
                "command": POWERSHELL,
                "dependsOn": BUILD_TASK,
                "args": [
                    "-ExecutionPolicy",
                    "ByPass",
                    "-NoProfile",
                    "-File",
                    self.script(super::scripts::CHECK_ASCII_SCRIPT),
                    self.output_file()
                ],
                "presentation": presentation("never"),
                "problemMatcher": []
            }));
        }

        let mut doc = json!({
            "version": "2.0.0",
            "tasks": tasks
        });
        if self.platform == Platform::Windows {
            doc["options"] = json!({
                "shell": {
                    "executable": CMD,
                    "args": ["/C"]
                },
                "env": {
                    "Path": format!("{};${{env:Path}}", options.toolchain_dir.display())
                }
            });
        }
        doc
    }

    pub fn launch(&self) -> Value {
        let options = self.options;
        let debugger = match self.platform {
            Platform::Windows => options.toolchain_dir.join(DEBUGGER).to_string_lossy().into_owned(),
            _ => DEBUGGER.to_string(),
        };
        let pre_launch = if self.ascii_check_enabled() {
            ASCII_TASK
        } else {
            BUILD_TASK
        };

        json!({
            "version": "0.2.0",
            "configurations": [{
                "name": "gcc single file debug",
                "type": "cppdbg",
                "request": "launch",
                "program": self.output_file(),
                "args": [],
                "stopAtEntry": false,
                "cwd": "${fileDirname}",
                "environment": [],
                "externalConsole": options.toggles.external_terminal,
                "MIMode": "gdb",
                "miDebuggerPath": debugger,
                "setupCommands": [{
                    "text": "-enable-pretty-printing",
                    "ignoreFailures": true
                }],
                "preLaunchTask": pre_launch,
                "internalConsoleOptions": "neverOpen"
            }]
        })
    }

    pub fn properties(&self) -> Value {
        let options = self.options;
        let mut config = json!({
            "name": "gcc",
            "includePath": ["${workspaceFolder}/**"],
            "compilerPath": options.compiler_path().to_string_lossy(),
            "intelliSenseMode": self.platform.intellisense_mode()
        });
        config[options.language.intellisense_key()] =
            Value::String(intellisense_standard(&options.language_standard));

        json!({
            "version": 4,
            "configurations": [config]
        })
    }
}

fn presentation(reveal: &str) -> Value {
    json!({
        "reveal": reveal,
        "focus": false,
        "echo": false,
        "showReuseMessage": false,
        "panel": "shared",
        "clear": true
    })
}

/// Pretty JSON with a trailing newline, as written to disk
pub fn render(doc: &Value) -> serde_json::Result<String> {
    let mut text = serde_json::to_string_pretty(doc)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LanguageKind, Toggles};
    use std::path::PathBuf;

    fn options(language: LanguageKind, standard: &str) -> ConfigOptions {
        ConfigOptions {
            editor_path: PathBuf::from("/usr/share/code/code"),
            toolchain_dir: PathBuf::from("/opt/gcc/bin"),
            compiler: None,
            workspace_path: PathBuf::from("/home/me/ws"),
            language,
            language_standard: standard.to_string(),
            compile_args: vec!["-Wall".into(), format!("-std={}", standard)],
            toggles: Toggles::default(),
        }
    }

    #[test]
    fn test_build_task_args_order() {
        let opts = options(LanguageKind::Cpp, "c++17");
        let d = Descriptors::new(&opts, Platform::Linux, Path::new("/scripts"));
        let tasks = d.tasks();

        let build = &tasks["tasks"][0];
        assert_eq!(build["label"], BUILD_TASK);
        assert_eq!(build["type"], "process");
        assert_eq!(build["command"], "/opt/gcc/bin/g++");
        assert_eq!(
            build["args"],
            json!([
                "-Wall",
                "-std=c++17",
                "-g",
                "${file}",
                "-o",
                "${fileDirname}/${fileBasenameNoExtension}.out"
            ])
        );
        assert_eq!(build["group"]["isDefault"], true);
        assert_eq!(build["problemMatcher"], "$gcc");
        assert_eq!(tasks["tasks"].as_array().unwrap().len(), 1);
        assert!(tasks.get("options").is_none());
    }

    #[test]
    fn test_c_uses_gcc() {
        let opts = options(LanguageKind::C, "c11");
        let d = Descriptors::new(&opts, Platform::Linux, Path::new("/scripts"));
        assert_eq!(d.tasks()["tasks"][0]["command"], "/opt/gcc/bin/gcc");
        let props = d.properties();
        assert_eq!(props["configurations"][0]["cStandard"], "c11");
        assert!(props["configurations"][0].get("cppStandard").is_none());
    }

    #[test]
    fn test_explicit_compiler_used_for_build_and_intellisense() {
        let mut opts = options(LanguageKind::Cpp, "c++20");
        opts.compiler = Some(PathBuf::from("/usr/local/bin/g++-13"));
        let d = Descriptors::new(&opts, Platform::Linux, Path::new("/scripts"));
        assert_eq!(d.tasks()["tasks"][0]["command"], "/usr/local/bin/g++-13");
        assert_eq!(
            d.properties()["configurations"][0]["compilerPath"],
            "/usr/local/bin/g++-13"
        );
    }

    #[test]
    fn test_external_terminal_adds_run_task() {
        let mut opts = options(LanguageKind::Cpp, "c++17");
        opts.toggles.external_terminal = true;
        let d = Descriptors::new(&opts, Platform::Linux, Path::new("/scripts"));

        let tasks = d.tasks();
        let run = &tasks["tasks"][1];
        assert_eq!(run["label"], RUN_TASK);
        assert_eq!(run["command"], "x-terminal-emulator");
        assert_eq!(run["dependsOn"], BUILD_TASK);
        assert_eq!(run["args"][1], "/scripts/pause-console.sh");

        assert_eq!(d.launch()["configurations"][0]["externalConsole"], true);
    }

    #[test]
    fn test_windows_tasks_and_ascii_check() {
        let mut opts = options(LanguageKind::Cpp, "c++17");
        opts.toggles.apply_non_ascii_check = true;
        let d = Descriptors::new(&opts, Platform::Windows, Path::new("/scripts"));

        let tasks = d.tasks();
        assert_eq!(tasks["options"]["shell"]["args"], json!(["/C"]));
        assert_eq!(tasks["options"]["env"]["Path"], "/opt/gcc/bin;${env:Path}");
        assert_eq!(tasks["tasks"][1]["label"], ASCII_TASK);
        assert_eq!(
            tasks["tasks"][0]["args"][5],
            "${fileDirname}\\${fileBasenameNoExtension}.exe"
        );

        let launch = d.launch();
        assert_eq!(launch["configurations"][0]["preLaunchTask"], ASCII_TASK);
    }

    #[test]
    fn test_ascii_check_ignored_off_windows() {
        let mut opts = options(LanguageKind::Cpp, "c++17");
        opts.toggles.apply_non_ascii_check = true;
        let d = Descriptors::new(&opts, Platform::Linux, Path::new("/scripts"));
        assert_eq!(d.tasks()["tasks"].as_array().unwrap().len(), 1);
        assert_eq!(d.launch()["configurations"][0]["preLaunchTask"], BUILD_TASK);
    }

    #[test]
    fn test_launch_shape() {
        let opts = options(LanguageKind::Cpp, "c++17");
        let launch = Descriptors::new(&opts, Platform::Linux, Path::new("/s")).launch();
        let config = &launch["configurations"][0];
        assert_eq!(launch["version"], "0.2.0");
        assert_eq!(config["type"], "cppdbg");
        assert_eq!(config["MIMode"], "gdb");
        assert_eq!(config["miDebuggerPath"], "gdb");
        assert_eq!(config["externalConsole"], false);
        assert_eq!(config["setupCommands"][0]["text"], "-enable-pretty-printing");
    }

    #[test]
    fn test_properties_downgrade_cpp23() {
        let opts = options(LanguageKind::Cpp, "c++23");
        let props = Descriptors::new(&opts, Platform::MacOs, Path::new("/s")).properties();
        let config = &props["configurations"][0];
        assert_eq!(props["version"], 4);
        assert_eq!(config["cppStandard"], "c++20");
        assert_eq!(config["intelliSenseMode"], "macos-gcc-x64");
        assert_eq!(config["includePath"], json!(["${workspaceFolder}/**"]));
    }

    #[test]
    fn test_render_is_stable() {
        let opts = options(LanguageKind::Cpp, "c++17");
        let d = Descriptors::new(&opts, Platform::Linux, Path::new("/s"));
        let first = render(&d.tasks()).unwrap();
        let second = render(&d.tasks()).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("}\n"));
    }
}
