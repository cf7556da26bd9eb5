//! Language standard selection and compile argument assembly.

use crate::config::LanguageKind;

/// Prefix of the GCC language standard flag
pub const STD_FLAG_PREFIX: &str = "-std=";

pub const CPP_STANDARDS: &[&str] = &["c++98", "c++11", "c++14", "c++17", "c++20", "c++23"];
pub const C_STANDARDS: &[&str] = &["c99", "c11", "c18"];

/// Used when the compiler version cannot be read
const FALLBACK: (&str, &str) = ("c++14", "c11");

/// Default `(C++, C)` standards for a GCC version such as `10.2.0`.
///
/// Old releases branch on the minor version: 4.8 was the first with usable C++11.
pub fn default_standards(version: &str) -> (&'static str, &'static str) {
    let Some((major, minor)) = parse_major_minor(version) else {
        return FALLBACK;
    };

    match major {
        4 if minor >= 8 => ("c++11", "c11"),
        0..=4 => ("c++98", "c99"),
        5..=7 => ("c++14", "c11"),
        8 | 9 => ("c++17", "c18"),
        10 => ("c++20", "c18"),
        _ => ("c++23", "c18"),
    }
}

/// Default standard for `language` with the given compiler version
pub fn default_for(version: &str, language: LanguageKind) -> &'static str {
    let (cpp, c) = default_standards(version);
    match language {
        LanguageKind::Cpp => cpp,
        LanguageKind::C => c,
    }
}

/// Normalizes a user-supplied standard and checks it against the legal set.
///
/// Accepts an optional `-std=` prefix and any letter case.
pub fn normalize(token: &str, language: LanguageKind) -> Option<&'static str> {
    let lowered = token.trim().to_lowercase();
    let bare = lowered.strip_prefix(STD_FLAG_PREFIX).unwrap_or(&lowered);
    let legal = match language {
        LanguageKind::Cpp => CPP_STANDARDS,
        LanguageKind::C => C_STANDARDS,
    };
    legal.iter().copied().find(|s| *s == bare)
}

/// `c++17` becomes `gnu++17`, `c11` becomes `gnu11`
pub fn apply_gnu(standard: &str) -> String {
    match standard.strip_prefix('c') {
        Some(rest) => format!("gnu{}", rest),
        None => standard.to_string(),
    }
}

/// The standard as the C/C++ extension understands it.
///
/// The extension does not accept `c++23` yet, so it is reported as `c++20`.
pub fn intellisense_standard(standard: &str) -> String {
    match standard {
        "c++23" => "c++20".to_string(),
        "gnu++23" => "gnu++20".to_string(),
        other => other.to_string(),
    }
}

/// User flags followed by `-std=<standard>` unless one of them already sets it
pub fn assemble_args(user_args: &[String], standard: &str) -> Vec<String> {
    let mut args: Vec<String> = user_args.to_vec();
    if !args.iter().any(|a| a.starts_with(STD_FLAG_PREFIX)) {
        args.push(format!("{}{}", STD_FLAG_PREFIX, standard));
    }
    args
}

fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = leading_number(parts.next()?)?;
    let minor = parts.next().and_then(leading_number).unwrap_or(0);
    Some((major, minor))
}

// "0-win32" -> 0
fn leading_number(part: &str) -> Option<u32> {
    let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
