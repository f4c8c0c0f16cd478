//! The opaque native binding header set.
//!
//! Its declarations are never inspected or altered; only the primitive names
//! they depend on are tracked so unresolved references can be reported.

use serde::{Deserialize, Serialize};

use crate::primitive::Primitive;

pub const BINDER_ENTRY_HEADER: &str = "BinderBindings.hpp";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeHeaderSet {
    pub entry_header: String,
    pub references: Vec<String>,
}

impl NativeHeaderSet {
    #[must_use]
    pub fn new(entry_header: impl Into<String>) -> Self {
        Self {
            entry_header: entry_header.into(),
            references: Vec::new(),
        }
    }

    /// The Binder NDK header set, referencing every shimmed primitive.
    #[must_use]
    pub fn binder() -> Self {
        Primitive::ALL
            .iter()
            .fold(Self::new(BINDER_ENTRY_HEADER), |set, p| set.with_reference(p.name()))
    }

    #[must_use]
    pub fn with_reference(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.references.contains(&name) {
            self.references.push(name);
        }
        self
    }
}

impl Default for NativeHeaderSet {
    fn default() -> Self {
        Self::binder()
    }
}
