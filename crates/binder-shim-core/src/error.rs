//! Resolution failures. Every one of them aborts the pass.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("redefinition of `{symbol}`: {existing} conflicts with {incoming}")]
    RedefinitionConflict {
        symbol: String,
        existing: String,
        incoming: String,
    },
    #[error("unresolved symbol `{symbol}` referenced by {referenced_by}")]
    UnresolvedSymbol {
        symbol: String,
        referenced_by: String,
    },
    #[error("no target architecture profile; width of `{symbol}` is unknown")]
    MissingArchitecture { symbol: String },
}

/// Operator-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Redefinition,
    UnresolvedSymbol,
}

impl ErrorClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Redefinition => "redefinition",
            Self::UnresolvedSymbol => "unresolved_symbol",
        }
    }
}

impl ResolveError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::RedefinitionConflict { .. } => ErrorClass::Redefinition,
            Self::UnresolvedSymbol { .. } | Self::MissingArchitecture { .. } => {
                ErrorClass::UnresolvedSymbol
            }
        }
    }

    /// The offending symbol name.
    #[must_use]
    pub fn symbol(&self) -> &str {
        match self {
            Self::RedefinitionConflict { symbol, .. }
            | Self::UnresolvedSymbol { symbol, .. }
            | Self::MissingArchitecture { symbol } => symbol,
        }
    }
}
