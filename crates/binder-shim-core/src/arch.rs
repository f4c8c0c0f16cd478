//! Target architecture profiles.
//!
//! The only property of the target that matters to type resolution is its
//! pointer width class. Everything else here (clang triples, sysroot include
//! directory names) is carried so the generator configuration can be derived
//! from the same value.

use serde::{Deserialize, Serialize};

/// Pointer width class of the target data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerWidth {
    /// 64-bit `long` and pointers.
    Lp64,
    /// 32-bit `int`, `long` and pointers.
    Ilp32,
}

impl PointerWidth {
    pub const ALL: [Self; 2] = [Self::Lp64, Self::Ilp32];

    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lp64" | "64" | "64-bit" | "64bit" => Some(Self::Lp64),
            "ilp32" | "32" | "32-bit" | "32bit" => Some(Self::Ilp32),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lp64 => "lp64",
            Self::Ilp32 => "ilp32",
        }
    }

    #[must_use]
    pub const fn pointer_bytes(self) -> u8 {
        match self {
            Self::Lp64 => 8,
            Self::Ilp32 => 4,
        }
    }

    /// Whether a compiler targeting this model predefines `__LP64__`.
    #[must_use]
    pub const fn defines_lp64(self) -> bool {
        matches!(self, Self::Lp64)
    }

    /// Pointer width of the machine running this code.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_pointer_width = "64") {
            Self::Lp64
        } else {
            Self::Ilp32
        }
    }
}

/// Android target architectures the Binder NDK ships headers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetArch {
    Aarch64,
    Armv7,
    X86,
    X86_64,
}

impl TargetArch {
    pub const ALL: [Self; 4] = [Self::Aarch64, Self::Armv7, Self::X86, Self::X86_64];

    /// Map a Rust or clang target triple to an architecture.
    ///
    /// Unknown triples yield `None`; there is no default architecture.
    #[must_use]
    pub fn from_target_triple(triple: &str) -> Option<Self> {
        let triple = triple.trim().to_ascii_lowercase();
        if triple.contains("aarch64") {
            Some(Self::Aarch64)
        } else if triple.contains("armv7") {
            Some(Self::Armv7)
        } else if triple.contains("i686") {
            Some(Self::X86)
        } else if triple.contains("x86_64") {
            Some(Self::X86_64)
        } else {
            None
        }
    }

    /// Parse an architecture name or a target triple.
    #[must_use]
    pub fn from_str_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "aarch64" | "arm64" | "arm64-v8a" => Some(Self::Aarch64),
            "armv7" | "arm" | "armeabi-v7a" => Some(Self::Armv7),
            "x86" | "i686" => Some(Self::X86),
            "x86_64" | "x86-64" | "amd64" => Some(Self::X86_64),
            other => Self::from_target_triple(other),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aarch64 => "aarch64",
            Self::Armv7 => "armv7",
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
        }
    }

    #[must_use]
    pub const fn pointer_width(self) -> PointerWidth {
        match self {
            Self::Aarch64 | Self::X86_64 => PointerWidth::Lp64,
            Self::Armv7 | Self::X86 => PointerWidth::Ilp32,
        }
    }

    /// Clang triple without the API level suffix.
    #[must_use]
    pub const fn clang_triple(self) -> &'static str {
        match self {
            Self::Aarch64 => "aarch64-linux-android",
            Self::Armv7 => "armv7a-linux-androideabi",
            Self::X86 => "i686-linux-android",
            Self::X86_64 => "x86_64-linux-android",
        }
    }

    /// Clang `-target` value with the API level appended, e.g. `aarch64-linux-android33`.
    #[must_use]
    pub fn clang_target(self, api_level: u32) -> String {
        format!("{}{api_level}", self.clang_triple())
    }

    /// Architecture-specific subdirectory of the sysroot's `usr/include`.
    #[must_use]
    pub const fn sysroot_include_dir(self) -> &'static str {
        match self {
            Self::Aarch64 => "aarch64-linux-android",
            Self::Armv7 => "arm-linux-androideabi",
            Self::X86 => "i686-linux-android",
            Self::X86_64 => "x86_64-linux-android",
        }
    }
}

impl std::fmt::Display for TargetArch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
