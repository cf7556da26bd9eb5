//! Windows registry lookups used by environment resolution and PATH updates

use winreg::RegKey;
use winreg::enums::*;

/// Class key VS Code registers for its `vscode://` URL handler
const VSCODE_COMMAND_KEY: &str = r"vscode\shell\open\command";

const USER_ENV_KEY: &str = "Environment";
const MACHINE_ENV_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

const PATH_VALUE: &str = "Path";

/// Raw command line registered for VS Code, e.g.
/// `"C:\...\Code.exe" --open-url -- "%1"`
pub fn vscode_command() -> Option<String> {
    RegKey::predef(HKEY_CLASSES_ROOT)
        .open_subkey(VSCODE_COMMAND_KEY)
        .ok()?
        .get_value::<String, _>("")
        .ok()
}

/// Path value from `HKCU\Environment`
pub fn user_path() -> Option<String> {
    RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey(USER_ENV_KEY)
        .ok()?
        .get_value::<String, _>(PATH_VALUE)
        .ok()
}

/// Path value from the machine-wide environment key
pub fn machine_path() -> Option<String> {
    RegKey::predef(HKEY_LOCAL_MACHINE)
        .open_subkey(MACHINE_ENV_KEY)
        .ok()?
        .get_value::<String, _>(PATH_VALUE)
        .ok()
}

/// Overwrites the user-scope Path value
pub fn set_user_path(value: &str) -> std::io::Result<()> {
    let key = RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey_with_flags(USER_ENV_KEY, KEY_READ | KEY_WRITE)?;
    key.set_value(PATH_VALUE, &value.to_string())
}
