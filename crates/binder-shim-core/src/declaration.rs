//! The resolved declaration set handed to the generator.

use serde::{Deserialize, Serialize};

use crate::arch::{PointerWidth, TargetArch};
use crate::primitive::{Primitive, TypeDefinition};
use crate::profile::HostPlatform;

/// Where a resolved definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Host,
    Shim,
}

/// Ordered stages of one pass. No stage ever runs before its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    HostStandard,
    TypeShim,
    NativeBindings,
}

impl Stage {
    pub const ORDER: [Self; 3] = [Self::HostStandard, Self::TypeShim, Self::NativeBindings];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HostStandard => "host_standard",
            Self::TypeShim => "type_shim",
            Self::NativeBindings => "native_bindings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDeclaration {
    pub definition: TypeDefinition,
    pub origin: Origin,
    /// Header or component that contributed the definition.
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A fallback group's guard was not set although the host defined one of
    /// its members with the same shape. Harmless, but the guard is stale.
    StaleGuard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub symbol: String,
    pub message: String,
}

/// What one stage contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub emitted: Vec<String>,
}

/// Output of one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSet {
    pub host: HostPlatform,
    pub target: TargetArch,
    pub pointer_width: PointerWidth,
    pub declarations: Vec<ResolvedDeclaration>,
    pub diagnostics: Vec<Diagnostic>,
    pub stages: Vec<StageRecord>,
}

impl DeclarationSet {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedDeclaration> {
        self.declarations.iter().find(|d| d.definition.name == name)
    }

    /// Definitions the shim had to synthesize.
    pub fn synthesized(&self) -> impl Iterator<Item = &ResolvedDeclaration> {
        self.declarations
            .iter()
            .filter(|d| d.origin == Origin::Shim)
    }

    /// Typedefs the rendered shim header activates for this pass, in header
    /// order: every synthesized definition plus any member whose fallback
    /// block opened behind a stale guard. The registry keeps only one
    /// definition of a stale name; the header text still repeats it.
    #[must_use]
    pub fn activated_fallbacks(&self) -> Vec<TypeDefinition> {
        Primitive::ALL
            .into_iter()
            .filter(|p| {
                self.synthesized().any(|d| d.definition.name == p.name())
                    || self
                        .diagnostics
                        .iter()
                        .any(|d| d.kind == DiagnosticKind::StaleGuard && d.symbol == p.name())
            })
            .map(|p| p.fallback_definition(self.pointer_width))
            .collect()
    }

    #[must_use]
    pub fn count_named(&self, name: &str) -> usize {
        self.declarations
            .iter()
            .filter(|d| d.definition.name == name)
            .count()
    }

    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<&StageRecord> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    /// Canonical text form: one typedef per line, tagged with its origin.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        let mut out = format!(
            "# host={} target={} model={}\n",
            self.host,
            self.target,
            self.pointer_width.as_str()
        );
        for decl in &self.declarations {
            let origin = match decl.origin {
                Origin::Host => "host",
                Origin::Shim => "shim",
            };
            out.push_str(&format!(
                "{origin}\t{}\t{}\n",
                decl.source,
                decl.definition.typedef_line()
            ));
        }
        out
    }

    /// BLAKE3 hex digest of [`Self::canonical_text`].
    #[must_use]
    pub fn fingerprint(&self) -> String {
        blake3::hash(self.canonical_text().as_bytes())
            .to_hex()
            .to_string()
    }
}
