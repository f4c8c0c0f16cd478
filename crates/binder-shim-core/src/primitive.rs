//! The enumerated primitive types and their fallback width table.

use serde::{Deserialize, Serialize};

use crate::arch::PointerWidth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// C spellings the fallback definitions are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    UnsignedLong,
    Long,
    UnsignedInt,
    Int,
}

impl NativeType {
    #[must_use]
    pub const fn c_spelling(self) -> &'static str {
        match self {
            Self::UnsignedLong => "unsigned long",
            Self::Long => "long",
            Self::UnsignedInt => "unsigned int",
            Self::Int => "int",
        }
    }

    #[must_use]
    pub const fn signedness(self) -> Signedness {
        match self {
            Self::UnsignedLong | Self::UnsignedInt => Signedness::Unsigned,
            Self::Long | Self::Int => Signedness::Signed,
        }
    }

    /// Size in bytes under the given data model.
    #[must_use]
    pub const fn size_in(self, width: PointerWidth) -> u8 {
        match self {
            Self::UnsignedLong | Self::Long => match width {
                PointerWidth::Lp64 => 8,
                PointerWidth::Ilp32 => 4,
            },
            Self::UnsignedInt | Self::Int => 4,
        }
    }
}

/// Primitive types the shim knows how to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Primitive {
    SizeT,
    SsizeT,
    Uint32T,
    Int32T,
}

impl Primitive {
    pub const ALL: [Self; 4] = [Self::SizeT, Self::SsizeT, Self::Uint32T, Self::Int32T];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SizeT => "size_t",
            Self::SsizeT => "ssize_t",
            Self::Uint32T => "uint32_t",
            Self::Int32T => "int32_t",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    #[must_use]
    pub const fn signedness(self) -> Signedness {
        match self {
            Self::SizeT | Self::Uint32T => Signedness::Unsigned,
            Self::SsizeT | Self::Int32T => Signedness::Signed,
        }
    }

    /// The C type a fallback definition aliases for this data model.
    #[must_use]
    pub const fn fallback_type(self, width: PointerWidth) -> NativeType {
        match (self, width) {
            (Self::SizeT, PointerWidth::Lp64) => NativeType::UnsignedLong,
            (Self::SsizeT, PointerWidth::Lp64) => NativeType::Long,
            (Self::SizeT, PointerWidth::Ilp32) => NativeType::UnsignedInt,
            (Self::SsizeT, PointerWidth::Ilp32) => NativeType::Int,
            (Self::Uint32T, _) => NativeType::UnsignedInt,
            (Self::Int32T, _) => NativeType::Int,
        }
    }

    #[must_use]
    pub const fn width_bytes(self, width: PointerWidth) -> u8 {
        self.fallback_type(width).size_in(width)
    }

    /// Whether the fallback differs between LP64 and ILP32.
    #[must_use]
    pub const fn depends_on_pointer_width(self) -> bool {
        matches!(self, Self::SizeT | Self::SsizeT)
    }

    #[must_use]
    pub const fn group(self) -> TypeGroup {
        match self {
            Self::SizeT | Self::SsizeT => TypeGroup::PointerSized,
            Self::Uint32T | Self::Int32T => TypeGroup::FixedWidth,
        }
    }

    #[must_use]
    pub fn fallback_definition(self, width: PointerWidth) -> TypeDefinition {
        let native = self.fallback_type(width);
        TypeDefinition::new(
            self.name(),
            native.c_spelling(),
            native.size_in(width),
            native.signedness(),
        )
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Types that share one standard guard macro.
///
/// A genuine header that defines one member of a group sets the group's
/// macro, so the whole group stands down together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeGroup {
    PointerSized,
    FixedWidth,
}

impl TypeGroup {
    pub const ALL: [Self; 2] = [Self::PointerSized, Self::FixedWidth];

    #[must_use]
    pub const fn guard_macro(self) -> &'static str {
        match self {
            Self::PointerSized => "_SIZE_T_DEFINED",
            Self::FixedWidth => "_STDINT_H",
        }
    }

    /// Whether the fallback block sets its own guard macro.
    ///
    /// `_STDINT_H` is left alone: setting it would hide a later genuine
    /// `<stdint.h>` and drop every other fixed-width type with it.
    #[must_use]
    pub const fn defines_guard(self) -> bool {
        matches!(self, Self::PointerSized)
    }

    #[must_use]
    pub const fn members(self) -> &'static [Primitive] {
        match self {
            Self::PointerSized => &[Primitive::SizeT, Primitive::SsizeT],
            Self::FixedWidth => &[Primitive::Uint32T, Primitive::Int32T],
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointerSized => "pointer_sized",
            Self::FixedWidth => "fixed_width",
        }
    }
}

/// One `typedef` as the generator would see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    pub c_type: String,
    pub bytes: u8,
    pub signedness: Signedness,
}

impl TypeDefinition {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        c_type: impl Into<String>,
        bytes: u8,
        signedness: Signedness,
    ) -> Self {
        Self {
            name: name.into(),
            c_type: c_type.into(),
            bytes,
            signedness,
        }
    }

    /// Two definitions are interchangeable when width and signedness agree,
    /// even if spelled differently.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.bytes == other.bytes && self.signedness == other.signedness
    }

    #[must_use]
    pub fn typedef_line(&self) -> String {
        format!("typedef {} {};", self.c_type, self.name)
    }

    /// Short human description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        let sign = match self.signedness {
            Signedness::Signed => "signed",
            Signedness::Unsigned => "unsigned",
        };
        format!("`{}` ({sign}, {} bytes)", self.c_type, self.bytes)
    }
}
