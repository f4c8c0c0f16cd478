//! Host/target platform profile and per-group strategy selection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::arch::{PointerWidth, TargetArch};
use crate::primitive::{TypeDefinition, TypeGroup};

/// Standard headers the wrapper pulls in before anything else, in order.
pub const HOST_STANDARD_HEADERS: [&str; 4] = ["stddef.h", "stdbool.h", "stdint.h", "sys/types.h"];

/// Operating system of the machine running the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    Linux,
    MacOs,
    Windows,
}

impl HostPlatform {
    pub const ALL: [Self; 3] = [Self::Linux, Self::MacOs, Self::Windows];

    /// The host this code was compiled for. Unknown systems are treated as Linux.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "macos" | "darwin" | "osx" => Some(Self::MacOs),
            "windows" | "win" | "win32" => Some(Self::Windows),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
        }
    }

    /// NDK prebuilt toolchain directory name for this host.
    #[must_use]
    pub const fn host_tag(self) -> &'static str {
        match self {
            Self::Linux => "linux-x86_64",
            Self::MacOs => "darwin-x86_64",
            Self::Windows => "windows-x86_64",
        }
    }
}

impl std::fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the host's standard headers actually declare for the target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostHeaders {
    pub definitions: Vec<TypeDefinition>,
    pub guard_macros: BTreeSet<String>,
}

impl HostHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers as shipped for the given host when targeting `width`.
    ///
    /// Linux and macOS hosts see complete headers. On Windows the clang
    /// builtin `stdint.h` is found but `size_t`/`ssize_t` are not.
    #[must_use]
    pub fn standard(host: HostPlatform, width: PointerWidth) -> Self {
        match host {
            HostPlatform::Linux | HostPlatform::MacOs => Self::new()
                .with_group(TypeGroup::PointerSized, width)
                .with_group(TypeGroup::FixedWidth, width),
            HostPlatform::Windows => Self::new().with_group(TypeGroup::FixedWidth, width),
        }
    }

    /// Declare every member of `group` and set its guard macro.
    #[must_use]
    pub fn with_group(mut self, group: TypeGroup, width: PointerWidth) -> Self {
        for member in group.members() {
            self.definitions.push(member.fallback_definition(width));
        }
        self.guard_macros.insert(group.guard_macro().to_string());
        self
    }

    #[must_use]
    pub fn with_definition(mut self, definition: TypeDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    #[must_use]
    pub fn with_guard(mut self, guard_macro: impl Into<String>) -> Self {
        self.guard_macros.insert(guard_macro.into());
        self
    }

    #[must_use]
    pub fn provides(&self, name: &str) -> bool {
        self.definitions.iter().any(|d| d.name == name)
    }

    #[must_use]
    pub fn sets_guard(&self, guard_macro: &str) -> bool {
        self.guard_macros.contains(guard_macro)
    }
}

/// How a type group is resolved for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Genuine definitions are visible; emit nothing.
    PassThrough,
    /// Emit the fallback definitions for the active pointer width.
    Synthesize,
}

/// Everything one resolution pass needs to know about host and target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub host: HostPlatform,
    pub target: Option<TargetArch>,
    pub headers: HostHeaders,
}

impl PlatformProfile {
    /// Profile with the host's standard header contents for `target`.
    ///
    /// Without a target there is no pointer width to describe the headers
    /// with, so they are left empty.
    #[must_use]
    pub fn for_host(host: HostPlatform, target: Option<TargetArch>) -> Self {
        let headers = target
            .map(|t| HostHeaders::standard(host, t.pointer_width()))
            .unwrap_or_default();
        Self {
            host,
            target,
            headers,
        }
    }

    /// Replace the host header contents.
    #[must_use]
    pub fn with_headers(mut self, headers: HostHeaders) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn pointer_width(&self) -> Option<PointerWidth> {
        self.target.map(TargetArch::pointer_width)
    }

    /// Does the host toolchain provide `name`?
    #[must_use]
    pub fn provides(&self, name: &str) -> bool {
        self.headers.provides(name)
    }

    /// Macros visible when the shim header is reached: compiler predefines
    /// for the target plus every guard the host headers set.
    #[must_use]
    pub fn macro_environment(&self) -> BTreeSet<String> {
        let mut env: BTreeSet<String> = self.headers.guard_macros.clone();
        env.insert("__ANDROID__".to_string());
        if self.pointer_width().is_some_and(PointerWidth::defines_lp64) {
            env.insert("__LP64__".to_string());
        }
        env
    }
}
