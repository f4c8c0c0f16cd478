//! # binder-shim-harness
//!
//! Verification tooling for the Binder NDK type shim: structured JSONL run
//! logs, an artifact index with SHA-256 digests and the host × target
//! resolution matrix.

#![forbid(unsafe_code)]

pub mod profile_matrix;
pub mod structured_log;

pub use profile_matrix::{
    ProfileMatrixReport, ProfileRow, build_profile_matrix, log_matrix, standard_profiles,
};
pub use structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, validate_log_file, validate_log_line,
};
