//! Path spelling for clang command lines.

use std::path::Path;

use binder_shim_core::HostPlatform;

/// Spell `path` the way clang expects it on `host`.
///
/// On Windows `C:\a\b` becomes `/C/a/b`; elsewhere the path is unchanged.
#[must_use]
pub fn normalize_path_for_clang(path: &Path, host: HostPlatform) -> String {
    let raw = path.to_string_lossy();
    if host != HostPlatform::Windows {
        return raw.into_owned();
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() && raw.len() > 2 => {
            format!("/{}{}", drive.to_ascii_uppercase(), raw[2..].replace('\\', "/"))
        }
        _ => raw.replace('\\', "/"),
    }
}

/// `-I<path>` with the path normalized for `host`.
#[must_use]
pub fn include_arg(path: &Path, host: HostPlatform) -> String {
    format!("-I{}", normalize_path_for_clang(path, host))
}
