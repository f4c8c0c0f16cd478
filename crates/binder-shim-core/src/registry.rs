//! Per-pass record of resolved names and set guard macros.
//!
//! A registry lives for exactly one resolution pass and is consumed when the
//! pass produces its [`DeclarationSet`](crate::DeclarationSet).

use std::collections::{BTreeMap, BTreeSet};

use crate::declaration::ResolvedDeclaration;
use crate::error::ResolveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Inserted,
    /// An identically shaped definition was already registered.
    AlreadyPresent,
}

#[derive(Debug, Default)]
pub struct DeclarationRegistry {
    index: BTreeMap<String, usize>,
    declarations: Vec<ResolvedDeclaration>,
    guards: BTreeSet<String>,
}

impl DeclarationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the guard was already set.
    pub fn define_guard(&mut self, guard_macro: &str) -> bool {
        self.guards.insert(guard_macro.to_string())
    }

    #[must_use]
    pub fn is_guard_defined(&self, guard_macro: &str) -> bool {
        self.guards.contains(guard_macro)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ResolvedDeclaration> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Record a definition, or confirm an identical one is already known.
    ///
    /// A second definition of a name with a different width or signedness is
    /// a redefinition conflict.
    pub fn register(&mut self, decl: ResolvedDeclaration) -> Result<Registration, ResolveError> {
        if let Some(existing) = self.lookup(&decl.definition.name) {
            if existing.definition.same_shape(&decl.definition) {
                return Ok(Registration::AlreadyPresent);
            }
            return Err(ResolveError::RedefinitionConflict {
                symbol: decl.definition.name.clone(),
                existing: format!("{} from {}", existing.definition.describe(), existing.source),
                incoming: format!("{} from {}", decl.definition.describe(), decl.source),
            });
        }
        self.index
            .insert(decl.definition.name.clone(), self.declarations.len());
        self.declarations.push(decl);
        Ok(Registration::Inserted)
    }

    /// Declarations in registration order.
    #[must_use]
    pub fn into_declarations(self) -> Vec<ResolvedDeclaration> {
        self.declarations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::PointerWidth;
    use crate::declaration::Origin;
    use crate::primitive::Primitive;

    fn decl(p: Primitive, w: PointerWidth, origin: Origin) -> ResolvedDeclaration {
        ResolvedDeclaration {
            definition: p.fallback_definition(w),
            origin,
            source: "test".to_string(),
        }
    }

    #[test]
    fn first_registration_inserts() {
        let mut reg = DeclarationRegistry::new();
        let r = reg
            .register(decl(Primitive::SizeT, PointerWidth::Lp64, Origin::Host))
            .unwrap();
        assert_eq!(r, Registration::Inserted);
        assert_eq!(reg.len(), 1);
        assert!(reg.lookup("size_t").is_some());
    }

    #[test]
    fn identical_shape_is_not_duplicated() {
        let mut reg = DeclarationRegistry::new();
        reg.register(decl(Primitive::SizeT, PointerWidth::Lp64, Origin::Host))
            .unwrap();
        let r = reg
            .register(decl(Primitive::SizeT, PointerWidth::Lp64, Origin::Shim))
            .unwrap();
        assert_eq!(r, Registration::AlreadyPresent);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.lookup("size_t").unwrap().origin, Origin::Host);
    }

    #[test]
    fn conflicting_width_is_rejected() {
        let mut reg = DeclarationRegistry::new();
        reg.register(decl(Primitive::SizeT, PointerWidth::Ilp32, Origin::Host))
            .unwrap();
        let err = reg
            .register(decl(Primitive::SizeT, PointerWidth::Lp64, Origin::Shim))
            .unwrap_err();
        assert!(matches!(err, ResolveError::RedefinitionConflict { ref symbol, .. } if symbol == "size_t"));
    }

    #[test]
    fn guards_are_set_once() {
        let mut reg = DeclarationRegistry::new();
        assert!(reg.define_guard("_SIZE_T_DEFINED"));
        assert!(!reg.define_guard("_SIZE_T_DEFINED"));
        assert!(reg.is_guard_defined("_SIZE_T_DEFINED"));
        assert!(!reg.is_guard_defined("_STDINT_H"));
    }
}
