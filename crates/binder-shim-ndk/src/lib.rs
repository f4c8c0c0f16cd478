//! # binder-shim-ndk
//!
//! Connects the shim to a binding generator run: reads the generator's
//! configuration from the build environment, finds the Android NDK, writes
//! the shim headers and assembles the clang arguments around them.

#![deny(unsafe_code)]

pub mod artifacts;
pub mod clang;
pub mod config;
pub mod ndk;
pub mod plan;

pub use artifacts::ShimArtifacts;
pub use config::{ConfigError, GeneratorConfig};
pub use ndk::{DiscoveryNote, IncludePaths, NdkInstall, NdkLayout, NoteKind};
pub use plan::{GeneratorPlan, build_plan};
