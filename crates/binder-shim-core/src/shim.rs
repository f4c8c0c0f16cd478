//! Type-resolution shim: guarded fallback definitions per type group.

use serde::Serialize;

use crate::arch::PointerWidth;
use crate::declaration::{Diagnostic, DiagnosticKind, Origin, ResolvedDeclaration};
use crate::error::ResolveError;
use crate::primitive::TypeGroup;
use crate::profile::Strategy;
use crate::registry::{DeclarationRegistry, Registration};
use crate::render::SHIM_HEADER_NAME;

/// Decision taken for one group during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOutcome {
    pub group: TypeGroup,
    pub strategy: Strategy,
    pub emitted: Vec<String>,
}

/// The fixed set of fallback groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShim {
    groups: Vec<TypeGroup>,
}

impl Default for TypeShim {
    fn default() -> Self {
        Self {
            groups: TypeGroup::ALL.to_vec(),
        }
    }
}

impl TypeShim {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn groups(&self) -> &[TypeGroup] {
        &self.groups
    }

    /// Strategy for `group` given what earlier stages registered.
    #[must_use]
    pub fn strategy(registry: &DeclarationRegistry, group: TypeGroup) -> Strategy {
        if registry.is_guard_defined(group.guard_macro()) {
            Strategy::PassThrough
        } else {
            Strategy::Synthesize
        }
    }

    /// Run every group against the registry.
    ///
    /// A member the host already defined with the same shape is skipped and
    /// reported as a stale guard; a differently shaped one is a conflict.
    pub fn apply(
        &self,
        registry: &mut DeclarationRegistry,
        width: PointerWidth,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<GroupOutcome>, ResolveError> {
        let mut outcomes = Vec::with_capacity(self.groups.len());
        for &group in &self.groups {
            let strategy = Self::strategy(registry, group);
            let mut emitted = Vec::new();
            if strategy == Strategy::Synthesize {
                if group.defines_guard() {
                    registry.define_guard(group.guard_macro());
                }
                for member in group.members() {
                    let decl = ResolvedDeclaration {
                        definition: member.fallback_definition(width),
                        origin: Origin::Shim,
                        source: SHIM_HEADER_NAME.to_string(),
                    };
                    match registry.register(decl)? {
                        Registration::Inserted => emitted.push(member.name().to_string()),
                        Registration::AlreadyPresent => diagnostics.push(Diagnostic {
                            kind: DiagnosticKind::StaleGuard,
                            symbol: member.name().to_string(),
                            message: format!(
                                "host defines `{}` without setting `{}`; fallback stood down",
                                member.name(),
                                group.guard_macro()
                            ),
                        }),
                    }
                }
            }
            outcomes.push(GroupOutcome {
                group,
                strategy,
                emitted,
            });
        }
        Ok(outcomes)
    }
}
