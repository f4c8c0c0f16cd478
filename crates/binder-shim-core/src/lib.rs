//! # binder-shim-core
//!
//! Primitive type resolution and inclusion ordering for generating bindings
//! against the Android Binder NDK headers on hosts whose standard headers
//! may not define `size_t`, `ssize_t` or the fixed-width integers for the
//! Android target.
//!
//! This crate provides:
//! - [`PlatformProfile`]: host, target architecture and host header contents
//! - [`IncludeWrapper`]: the fixed host → shim → native resolution order
//! - [`TypeShim`]: guarded fallback definitions selected per type group
//! - [`DeclarationSet`]: the conflict-free result of one pass
//! - [`render`]: the `types_workaround.h` / `wrapper.h` artifacts
//! - [`preprocess`]: a small evaluator used to check the rendered headers

#![deny(unsafe_code)]

pub mod arch;
pub mod declaration;
pub mod error;
pub mod native;
pub mod preprocess;
pub mod primitive;
pub mod profile;
pub mod registry;
pub mod render;
pub mod shim;
pub mod wrapper;

pub use arch::{PointerWidth, TargetArch};
pub use declaration::{DeclarationSet, Diagnostic, DiagnosticKind, Origin, Stage};
pub use error::{ErrorClass, ResolveError};
pub use native::NativeHeaderSet;
pub use primitive::{Primitive, Signedness, TypeDefinition, TypeGroup};
pub use profile::{HostHeaders, HostPlatform, PlatformProfile, Strategy};
pub use shim::TypeShim;
pub use wrapper::{IncludeWrapper, resolve};
