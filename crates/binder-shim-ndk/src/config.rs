//! Generator configuration passed through from the build environment.
//!
//! Nothing here is owned by the shim: `TARGET`, the NDK location variables
//! and `BINDGEN_EXTRA_CLANG_ARGS*` are the ones cargo and bindgen already
//! define. [`GeneratorConfig::from_lookup`] takes any variable source so
//! tests never touch the process environment.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use binder_shim_core::{HostPlatform, PlatformProfile, TargetArch};

pub const DEFAULT_API_LEVEL: u32 = 33;

/// Checked in order; the first valid installation wins.
pub const NDK_HOME_VARS: [&str; 3] = ["ANDROID_NDK_HOME", "NDK_ROOT", "ANDROID_NDK_ROOT"];
pub const SDK_ROOT_VAR: &str = "ANDROID_SDK_ROOT";
pub const TARGET_VAR: &str = "TARGET";
pub const EXTRA_CLANG_ARGS_VAR: &str = "BINDGEN_EXTRA_CLANG_ARGS";

/// Well-known install locations tried after the environment variables.
pub const COMMON_NDK_PATHS: [&str; 4] = [
    "C:/Android/android-ndk-r28b",
    "D:/android-ndk-r28b",
    "C:/android-ndk-r28b",
    "D:/Android/android-ndk-r28b",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: cannot split clang arguments: {reason}")]
    ExtraArgs { var: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorConfig {
    pub host: HostPlatform,
    pub target_triple: Option<String>,
    pub api_level: u32,
    /// NDK roots in priority order; existence is checked during discovery.
    pub ndk_candidates: Vec<PathBuf>,
    pub extra_clang_args: Vec<String>,
    /// Directory holding the bundled `include_cpp`, `include_ndk` and
    /// `include_platform` header trees.
    pub bundled_include_root: PathBuf,
}

impl GeneratorConfig {
    /// Configuration for `target_triple` with no NDK and no extra arguments.
    #[must_use]
    pub fn new(host: HostPlatform, target_triple: Option<String>) -> Self {
        Self {
            host,
            target_triple,
            api_level: DEFAULT_API_LEVEL,
            ndk_candidates: Vec::new(),
            extra_clang_args: Vec::new(),
            bundled_include_root: PathBuf::from("src"),
        }
    }

    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(HostPlatform::current(), |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(host: HostPlatform, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target_triple = lookup(TARGET_VAR).filter(|t| !t.trim().is_empty());

        let mut ndk_candidates: Vec<PathBuf> = NDK_HOME_VARS
            .iter()
            .filter_map(|&var| lookup(var))
            .map(PathBuf::from)
            .collect();
        ndk_candidates.extend(COMMON_NDK_PATHS.iter().map(PathBuf::from));
        if let Some(sdk_root) = lookup(SDK_ROOT_VAR) {
            ndk_candidates.push(PathBuf::from(sdk_root).join("ndk-bundle"));
        }

        let extra_clang_args = collect_extra_clang_args(target_triple.as_deref(), &lookup)?;

        Ok(Self {
            target_triple,
            ndk_candidates,
            extra_clang_args,
            ..Self::new(host, None)
        })
    }

    #[must_use]
    pub fn with_api_level(mut self, api_level: u32) -> Self {
        self.api_level = api_level;
        self
    }

    #[must_use]
    pub fn with_bundled_include_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.bundled_include_root = root.into();
        self
    }

    #[must_use]
    pub fn with_ndk_candidate(mut self, root: impl Into<PathBuf>) -> Self {
        self.ndk_candidates.insert(0, root.into());
        self
    }

    /// `None` when the triple is missing or names an unsupported architecture.
    #[must_use]
    pub fn target_arch(&self) -> Option<TargetArch> {
        self.target_triple
            .as_deref()
            .and_then(TargetArch::from_target_triple)
    }

    #[must_use]
    pub fn profile(&self) -> PlatformProfile {
        PlatformProfile::for_host(self.host, self.target_arch())
    }
}

/// `BINDGEN_EXTRA_CLANG_ARGS`, then the underscore and verbatim per-target
/// variants, each shell-split.
fn collect_extra_clang_args<F>(target: Option<&str>, lookup: &F) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut vars = vec![EXTRA_CLANG_ARGS_VAR.to_string()];
    if let Some(target) = target {
        let underscored = format!("{EXTRA_CLANG_ARGS_VAR}_{}", target.replace('-', "_"));
        let verbatim = format!("{EXTRA_CLANG_ARGS_VAR}_{target}");
        if verbatim != underscored {
            vars.push(underscored);
            vars.push(verbatim);
        } else {
            vars.push(underscored);
        }
    }

    let mut args = Vec::new();
    for var in vars {
        if let Some(raw) = lookup(var.as_str()) {
            let split = shell_words::split(&raw).map_err(|e| ConfigError::ExtraArgs {
                var: var.clone(),
                reason: e.to_string(),
            })?;
            args.extend(split);
        }
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_has_no_target() {
        let config = GeneratorConfig::from_lookup(HostPlatform::Linux, lookup(&[])).unwrap();
        assert_eq!(config.target_triple, None);
        assert_eq!(config.target_arch(), None);
        assert_eq!(config.api_level, DEFAULT_API_LEVEL);
        assert!(config.extra_clang_args.is_empty());
        assert_eq!(config.ndk_candidates.len(), COMMON_NDK_PATHS.len());
    }

    #[test]
    fn ndk_candidates_keep_priority_order() {
        let config = GeneratorConfig::from_lookup(
            HostPlatform::Linux,
            lookup(&[
                ("ANDROID_NDK_ROOT", "/opt/ndk-c"),
                ("ANDROID_NDK_HOME", "/opt/ndk-a"),
                ("ANDROID_SDK_ROOT", "/opt/sdk"),
            ]),
        )
        .unwrap();
        assert_eq!(config.ndk_candidates[0], PathBuf::from("/opt/ndk-a"));
        assert_eq!(config.ndk_candidates[1], PathBuf::from("/opt/ndk-c"));
        assert_eq!(
            config.ndk_candidates.last().unwrap(),
            &PathBuf::from("/opt/sdk").join("ndk-bundle")
        );
    }

    #[test]
    fn extra_args_are_shell_split_in_order() {
        let config = GeneratorConfig::from_lookup(
            HostPlatform::Linux,
            lookup(&[
                ("TARGET", "aarch64-linux-android"),
                ("BINDGEN_EXTRA_CLANG_ARGS", "-DGLOBAL \"-I/path with space\""),
                ("BINDGEN_EXTRA_CLANG_ARGS_aarch64_linux_android", "-DUNDERSCORE"),
                ("BINDGEN_EXTRA_CLANG_ARGS_aarch64-linux-android", "-DDASH"),
            ]),
        )
        .unwrap();
        assert_eq!(
            config.extra_clang_args,
            vec!["-DGLOBAL", "-I/path with space", "-DUNDERSCORE", "-DDASH"]
        );
        assert_eq!(config.target_arch(), Some(TargetArch::Aarch64));
    }

    #[test]
    fn unbalanced_quotes_are_rejected() {
        let err = GeneratorConfig::from_lookup(
            HostPlatform::Linux,
            lookup(&[("BINDGEN_EXTRA_CLANG_ARGS", "-I\"/unterminated")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("BINDGEN_EXTRA_CLANG_ARGS"));
    }

    #[test]
    fn profile_follows_target() {
        let config = GeneratorConfig::new(HostPlatform::Windows, Some("armv7-linux-androideabi".into()));
        let profile = config.profile();
        assert_eq!(profile.target, Some(TargetArch::Armv7));
        assert_eq!(profile.host, HostPlatform::Windows);
    }
}
