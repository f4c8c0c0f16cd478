//! Android NDK installation discovery and include-path layout.

use std::path::{Path, PathBuf};

use serde::Serialize;

use binder_shim_core::{HostPlatform, TargetArch};

use crate::config::GeneratorConfig;

/// Directory layout of an NDK installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NdkLayout {
    /// r19+: sysroot under `toolchains/llvm/prebuilt/<host>/sysroot`.
    Modern,
    /// Older releases with a top-level `sysroot/`.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Found,
    Missing,
}

/// A path that discovery looked at, for the caller to log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryNote {
    pub kind: NoteKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NdkInstall {
    pub root: PathBuf,
    pub host: HostPlatform,
    pub layout: NdkLayout,
}

/// Include directories in the order they must be passed to clang.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncludePaths {
    /// Clang builtin headers (`stddef.h` and friends); always first.
    pub builtin: Vec<PathBuf>,
    pub sysroot: Vec<PathBuf>,
    pub notes: Vec<DiscoveryNote>,
}

impl IncludePaths {
    pub fn ordered(&self) -> impl Iterator<Item = &PathBuf> {
        self.builtin.iter().chain(self.sysroot.iter())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builtin.is_empty() && self.sysroot.is_empty()
    }
}

impl NdkInstall {
    /// Inspect `root`; `None` unless it looks like a usable NDK for `host`.
    #[must_use]
    pub fn detect(root: &Path, host: HostPlatform) -> Option<Self> {
        let prebuilt = root.join("toolchains/llvm/prebuilt");
        if !prebuilt.is_dir() {
            return None;
        }
        let layout = if prebuilt.join(host.host_tag()).join("sysroot").is_dir() {
            NdkLayout::Modern
        } else if root.join("sysroot").is_dir() {
            NdkLayout::Legacy
        } else {
            return None;
        };
        Some(Self {
            root: root.to_path_buf(),
            host,
            layout,
        })
    }

    /// First valid candidate from the configuration.
    #[must_use]
    pub fn discover(config: &GeneratorConfig) -> Option<Self> {
        config
            .ndk_candidates
            .iter()
            .find_map(|candidate| Self::detect(candidate, config.host))
    }

    #[must_use]
    pub fn prebuilt_dir(&self) -> PathBuf {
        self.root
            .join("toolchains/llvm/prebuilt")
            .join(self.host.host_tag())
    }

    #[must_use]
    pub fn sysroot(&self) -> PathBuf {
        match self.layout {
            NdkLayout::Modern => self.prebuilt_dir().join("sysroot"),
            NdkLayout::Legacy => self.root.join("sysroot"),
        }
    }

    /// Highest-versioned `lib/clang/<version>/include` directory.
    #[must_use]
    pub fn clang_builtin_include(&self) -> Option<PathBuf> {
        let clang_dir = self.prebuilt_dir().join("lib/clang");
        let entries = std::fs::read_dir(&clang_dir).ok()?;
        entries
            .flatten()
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .map(|e| e.path())
            .filter(|p| p.join("include").is_dir())
            .max_by_key(|p| version_key(p))
            .map(|p| p.join("include"))
    }

    /// Sysroot and builtin include directories for `arch`. Missing
    /// directories are dropped and reported in `notes`.
    #[must_use]
    pub fn include_paths(&self, arch: TargetArch) -> IncludePaths {
        let mut paths = IncludePaths::default();

        let usr_include = self.sysroot().join("usr/include");
        let candidates = [
            usr_include.clone(),
            usr_include.join(arch.sysroot_include_dir()),
        ];
        for path in candidates {
            if path.is_dir() {
                paths.notes.push(DiscoveryNote {
                    kind: NoteKind::Found,
                    path: path.clone(),
                });
                paths.sysroot.push(path);
            } else {
                paths.notes.push(DiscoveryNote {
                    kind: NoteKind::Missing,
                    path,
                });
            }
        }

        match self.clang_builtin_include() {
            Some(path) => {
                paths.notes.push(DiscoveryNote {
                    kind: NoteKind::Found,
                    path: path.clone(),
                });
                paths.builtin.push(path);
            }
            None => paths.notes.push(DiscoveryNote {
                kind: NoteKind::Missing,
                path: self.prebuilt_dir().join("lib/clang"),
            }),
        }
        paths
    }
}

/// Numeric version components of a directory name; `18.0.1` sorts after `9`.
fn version_key(path: &Path) -> Vec<u64> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| {
            name.split('.')
                .map(|part| part.parse::<u64>().unwrap_or(0))
                .collect()
        })
        .unwrap_or_default()
}
