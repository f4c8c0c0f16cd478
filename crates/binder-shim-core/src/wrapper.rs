//! Inclusion-order wrapper: the single entry point the generator is given.
//!
//! Resolution always walks the same three stages:
//! 1. host standard headers (`stddef.h`, `stdbool.h`, `stdint.h`, `sys/types.h`)
//! 2. the type shim
//! 3. the native binding header set
//!
//! Genuine host definitions are therefore registered before the shim looks
//! at anything, and the native set only ever sees the finished registry.

use crate::arch::PointerWidth;
use crate::declaration::{
    DeclarationSet, Diagnostic, Origin, ResolvedDeclaration, Stage, StageRecord,
};
use crate::error::ResolveError;
use crate::native::NativeHeaderSet;
use crate::primitive::Primitive;
use crate::profile::{HOST_STANDARD_HEADERS, PlatformProfile};
use crate::registry::{DeclarationRegistry, Registration};
use crate::shim::{GroupOutcome, TypeShim};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeWrapper {
    shim: TypeShim,
    native: NativeHeaderSet,
}

impl Default for IncludeWrapper {
    fn default() -> Self {
        Self::new(NativeHeaderSet::binder())
    }
}

impl IncludeWrapper {
    #[must_use]
    pub fn new(native: NativeHeaderSet) -> Self {
        Self {
            shim: TypeShim::new(),
            native,
        }
    }

    #[must_use]
    pub fn shim(&self) -> &TypeShim {
        &self.shim
    }

    #[must_use]
    pub fn native(&self) -> &NativeHeaderSet {
        &self.native
    }

    /// Headers in the exact order the wrapper includes them.
    #[must_use]
    pub fn include_sequence(&self) -> Vec<(Stage, String)> {
        let mut seq: Vec<(Stage, String)> = HOST_STANDARD_HEADERS
            .iter()
            .map(|h| (Stage::HostStandard, (*h).to_string()))
            .collect();
        seq.push((Stage::TypeShim, crate::render::SHIM_HEADER_NAME.to_string()));
        seq.push((Stage::NativeBindings, self.native.entry_header.clone()));
        seq
    }

    /// Resolve the full declaration set for `profile`.
    ///
    /// Fails before any stage runs when the profile has no target
    /// architecture, since the pointer-sized fallbacks would have no width.
    pub fn resolve(&self, profile: &PlatformProfile) -> Result<DeclarationSet, ResolveError> {
        let (target, width) = match profile.target {
            Some(target) => (target, target.pointer_width()),
            None => {
                return Err(ResolveError::MissingArchitecture {
                    symbol: Primitive::SizeT.name().to_string(),
                });
            }
        };

        let mut registry = DeclarationRegistry::new();
        let mut diagnostics = Vec::new();
        let mut stages = Vec::with_capacity(Stage::ORDER.len());

        stages.push(self.host_stage(profile, &mut registry)?);
        stages.push(self.shim_stage(width, &mut registry, &mut diagnostics)?);
        stages.push(self.native_stage(&registry)?);

        Ok(DeclarationSet {
            host: profile.host,
            target,
            pointer_width: width,
            declarations: registry.into_declarations(),
            diagnostics,
            stages,
        })
    }

    fn host_stage(
        &self,
        profile: &PlatformProfile,
        registry: &mut DeclarationRegistry,
    ) -> Result<StageRecord, ResolveError> {
        for guard in &profile.headers.guard_macros {
            registry.define_guard(guard);
        }
        let mut emitted = Vec::new();
        for definition in &profile.headers.definitions {
            let decl = ResolvedDeclaration {
                source: host_source_for(&definition.name).to_string(),
                definition: definition.clone(),
                origin: Origin::Host,
            };
            if registry.register(decl)? == Registration::Inserted {
                emitted.push(definition.name.clone());
            }
        }
        Ok(StageRecord {
            stage: Stage::HostStandard,
            emitted,
        })
    }

    fn shim_stage(
        &self,
        width: PointerWidth,
        registry: &mut DeclarationRegistry,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<StageRecord, ResolveError> {
        let outcomes = self.shim.apply(registry, width, diagnostics)?;
        Ok(StageRecord {
            stage: Stage::TypeShim,
            emitted: outcomes
                .into_iter()
                .flat_map(|o: GroupOutcome| o.emitted)
                .collect(),
        })
    }

    fn native_stage(&self, registry: &DeclarationRegistry) -> Result<StageRecord, ResolveError> {
        if let Some(missing) = self
            .native
            .references
            .iter()
            .find(|name| registry.lookup(name).is_none())
        {
            return Err(ResolveError::UnresolvedSymbol {
                symbol: missing.clone(),
                referenced_by: self.native.entry_header.clone(),
            });
        }
        Ok(StageRecord {
            stage: Stage::NativeBindings,
            emitted: Vec::new(),
        })
    }
}

/// Standard header a genuine definition of `name` lives in.
fn host_source_for(name: &str) -> &'static str {
    match name {
        "size_t" => "stddef.h",
        "ssize_t" => "sys/types.h",
        "uint32_t" | "int32_t" => "stdint.h",
        _ => "host",
    }
}

/// Resolve `native` against `profile` through the standard wrapper.
pub fn resolve(
    profile: &PlatformProfile,
    native: &NativeHeaderSet,
) -> Result<DeclarationSet, ResolveError> {
    IncludeWrapper::new(native.clone()).resolve(profile)
}
