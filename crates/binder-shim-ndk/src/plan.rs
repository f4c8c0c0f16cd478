//! The complete set of inputs handed to the binding generator.
//!
//! A plan is only produced for a profile whose declaration set resolves;
//! any resolution error aborts planning unchanged.

use std::path::PathBuf;

use serde::Serialize;

use binder_shim_core::{DeclarationSet, HostPlatform, IncludeWrapper, ResolveError, TargetArch};

use crate::artifacts::ShimArtifacts;
use crate::clang::{include_arg, normalize_path_for_clang};
use crate::config::GeneratorConfig;
use crate::ndk::{DiscoveryNote, NdkInstall, NdkLayout};

/// Header trees bundled next to the crate, searched before the NDK.
pub const BUNDLED_INCLUDE_DIRS: [&str; 3] = ["include_cpp", "include_ndk", "include_platform"];

pub const ALLOWLIST_TYPES: [&str; 8] = [
    "android::c_interface::.*",
    "AStatus",
    "AIBinder_Class",
    "AIBinder",
    "AIBinder_Weak",
    "AIBinder_DeathRecipient",
    "AParcel",
    "binder_status_t",
];

pub const ALLOWLIST_FUNCTIONS: [&str; 1] = [".*"];

pub const CONSTIFIED_ENUMS: [&str; 1] = ["android::c_interface::consts::.*"];

/// Feature macros the NDK headers expect from a glibc-like environment.
pub const COMPAT_DEFINES: [&str; 4] = [
    "_GNU_SOURCE",
    "__STDC_LIMIT_MACROS",
    "__STDC_CONSTANT_MACROS",
    "__STDC_FORMAT_MACROS",
];

#[derive(Debug, Clone, Serialize)]
pub struct GeneratorPlan {
    pub host: HostPlatform,
    pub target: TargetArch,
    pub clang_target: String,
    pub api_level: u32,
    /// The wrapper header; the generator's only entry point.
    pub header: PathBuf,
    pub clang_args: Vec<String>,
    pub allowlist_types: Vec<String>,
    pub allowlist_functions: Vec<String>,
    pub constified_enums: Vec<String>,
    pub ndk: Option<NdkInstall>,
    pub notes: Vec<DiscoveryNote>,
    pub declarations: DeclarationSet,
}

impl GeneratorPlan {
    /// Pretty JSON for inspection and golden comparisons.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Resolve the declaration set for `config` and assemble the clang command
/// line around the written `artifacts`.
///
/// `ndk` is optional: without one, only the bundled include trees are used.
pub fn build_plan(
    config: &GeneratorConfig,
    artifacts: &ShimArtifacts,
    ndk: Option<&NdkInstall>,
) -> Result<GeneratorPlan, ResolveError> {
    let declarations = IncludeWrapper::default().resolve(&config.profile())?;
    let target = declarations.target;
    let host = config.host;
    let clang_target = target.clang_target(config.api_level);

    let mut clang_args = vec![include_arg(&artifacts.dir, host)];
    for dir in BUNDLED_INCLUDE_DIRS {
        clang_args.push(include_arg(&config.bundled_include_root.join(dir), host));
    }

    let mut notes = Vec::new();
    if let Some(ndk) = ndk {
        // Only the unified sysroot of a modern NDK is handed to clang.
        if ndk.layout == NdkLayout::Modern {
            clang_args.push(format!(
                "--sysroot={}",
                normalize_path_for_clang(&ndk.sysroot(), host)
            ));
        }
        let includes = ndk.include_paths(target);
        clang_args.extend(includes.ordered().map(|p| include_arg(p, host)));
        notes = includes.notes;
    }

    clang_args.extend(config.extra_clang_args.iter().cloned());

    clang_args.push("-target".to_string());
    clang_args.push(clang_target.clone());
    clang_args.push(format!("-D__ANDROID_API__={}", config.api_level));
    clang_args.push("-D__ANDROID__".to_string());
    clang_args.extend(COMPAT_DEFINES.iter().map(|d| format!("-D{d}")));
    clang_args.push("-fno-addrsig".to_string());

    Ok(GeneratorPlan {
        host,
        target,
        clang_target,
        api_level: config.api_level,
        header: artifacts.wrapper_header.clone(),
        clang_args,
        allowlist_types: ALLOWLIST_TYPES.iter().map(|s| (*s).to_string()).collect(),
        allowlist_functions: ALLOWLIST_FUNCTIONS.iter().map(|s| (*s).to_string()).collect(),
        constified_enums: CONSTIFIED_ENUMS.iter().map(|s| (*s).to_string()).collect(),
        ndk: ndk.cloned(),
        notes,
        declarations,
    })
}
