//! Header artifacts rendered from the same tables the model resolves with.

use crate::arch::PointerWidth;
use crate::primitive::TypeGroup;
use crate::shim::TypeShim;
use crate::wrapper::IncludeWrapper;

pub const SHIM_HEADER_NAME: &str = "types_workaround.h";
pub const WRAPPER_HEADER_NAME: &str = "wrapper.h";

pub const SHIM_HEADER_GUARD: &str = "BINDER_SHIM_TYPES_H";
pub const WRAPPER_HEADER_GUARD: &str = "BINDER_SHIM_WRAPPER_H";

/// `types_workaround.h`: one `#ifndef` block per group, keyed to the
/// group's standard guard macro, with an `__LP64__` branch where the
/// fallback width depends on the data model.
#[must_use]
pub fn render_shim_header(shim: &TypeShim) -> String {
    let mut out = String::new();
    out.push_str(&format!("#ifndef {SHIM_HEADER_GUARD}\n"));
    out.push_str(&format!("#define {SHIM_HEADER_GUARD}\n\n"));
    out.push_str("/* Fallback primitive types for hosts whose standard headers lack them. */\n");

    for &group in shim.groups() {
        out.push('\n');
        render_group(&mut out, group);
    }

    out.push_str(&format!("\n#endif /* {SHIM_HEADER_GUARD} */\n"));
    out
}

fn render_group(out: &mut String, group: TypeGroup) {
    out.push_str(&format!("#ifndef {}\n", group.guard_macro()));
    if group.defines_guard() {
        out.push_str(&format!("#define {}\n", group.guard_macro()));
    }
    let varies = group.members().iter().any(|m| m.depends_on_pointer_width());
    if varies {
        out.push_str("#ifdef __LP64__\n");
        render_typedefs(out, group, PointerWidth::Lp64);
        out.push_str("#else\n");
        render_typedefs(out, group, PointerWidth::Ilp32);
        out.push_str("#endif\n");
    } else {
        render_typedefs(out, group, PointerWidth::Lp64);
    }
    out.push_str("#endif\n");
}

fn render_typedefs(out: &mut String, group: TypeGroup, width: PointerWidth) {
    for member in group.members() {
        out.push_str(&member.fallback_definition(width).typedef_line());
        out.push('\n');
    }
}

/// `wrapper.h`: host standard headers, then the shim, then the native set.
#[must_use]
pub fn render_wrapper_header(wrapper: &IncludeWrapper) -> String {
    use crate::declaration::Stage;

    let mut out = String::new();
    out.push_str(&format!("#ifndef {WRAPPER_HEADER_GUARD}\n"));
    out.push_str(&format!("#define {WRAPPER_HEADER_GUARD}\n"));

    let mut current: Option<Stage> = None;
    for (stage, header) in wrapper.include_sequence() {
        if current != Some(stage) {
            out.push('\n');
            out.push_str(match stage {
                Stage::HostStandard => {
                    "/* Host standard type headers first so genuine definitions win. */\n"
                }
                Stage::TypeShim => "/* Fallbacks for primitives the host headers did not define. */\n",
                Stage::NativeBindings => "/* Native Binder NDK declarations, unmodified. */\n",
            });
            current = Some(stage);
        }
        match stage {
            Stage::HostStandard => out.push_str(&format!("#include <{header}>\n")),
            Stage::TypeShim | Stage::NativeBindings => {
                out.push_str(&format!("#include \"{header}\"\n"));
            }
        }
    }

    out.push_str(&format!("\n#endif /* {WRAPPER_HEADER_GUARD} */\n"));
    out
}
