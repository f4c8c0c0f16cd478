//! Integration test: the rendered headers behave like the resolution model.
//!
//! Evaluates `types_workaround.h` and `wrapper.h` under each profile's macro
//! environment and compares what survives with the resolved declaration set.
//!
//! Run: cargo test -p binder-shim-core --test rendered_header_test

use binder_shim_core::preprocess::{IncludeDirective, evaluate};
use binder_shim_core::render::{
    SHIM_HEADER_GUARD, WRAPPER_HEADER_GUARD, render_shim_header, render_wrapper_header,
};
use binder_shim_core::{
    HostHeaders, HostPlatform, IncludeWrapper, PlatformProfile, PointerWidth, Primitive, Stage,
    TargetArch, TypeGroup,
};

#[test]
fn shim_header_emits_exactly_the_synthesized_set() {
    let wrapper = IncludeWrapper::default();
    let header = render_shim_header(wrapper.shim());

    for host in HostPlatform::ALL {
        for arch in TargetArch::ALL {
            let profile = PlatformProfile::for_host(host, Some(arch));
            let set = wrapper.resolve(&profile).unwrap();
            let eval = evaluate(&header, &profile.macro_environment()).unwrap();

            let rendered: Vec<(String, String)> = eval
                .typedefs
                .iter()
                .map(|t| (t.name.clone(), t.c_type.clone()))
                .collect();
            let modeled: Vec<(String, String)> = set
                .synthesized()
                .map(|d| (d.definition.name.clone(), d.definition.c_type.clone()))
                .collect();
            assert_eq!(rendered, modeled, "{host}/{arch}");
        }
    }
}

#[test]
fn stale_guard_profile_matches_activated_fallbacks() {
    // size_t is defined by the host without `_SIZE_T_DEFINED`, so the
    // pointer-sized block still opens and repeats it.
    let headers = HostHeaders::new()
        .with_definition(Primitive::SizeT.fallback_definition(PointerWidth::Lp64))
        .with_group(TypeGroup::FixedWidth, PointerWidth::Lp64);
    let profile = PlatformProfile::for_host(HostPlatform::Windows, Some(TargetArch::X86_64))
        .with_headers(headers);
    let wrapper = IncludeWrapper::default();
    let set = wrapper.resolve(&profile).unwrap();

    let synthesized: Vec<&str> = set
        .synthesized()
        .map(|d| d.definition.name.as_str())
        .collect();
    assert_eq!(synthesized, vec!["ssize_t"]);

    let eval = evaluate(
        &render_shim_header(wrapper.shim()),
        &profile.macro_environment(),
    )
    .unwrap();
    let rendered: Vec<(String, String)> = eval
        .typedefs
        .iter()
        .map(|t| (t.name.clone(), t.c_type.clone()))
        .collect();
    let activated: Vec<(String, String)> = set
        .activated_fallbacks()
        .into_iter()
        .map(|d| (d.name, d.c_type))
        .collect();
    assert_eq!(
        rendered,
        vec![
            ("size_t".to_string(), "unsigned long".to_string()),
            ("ssize_t".to_string(), "long".to_string()),
        ]
    );
    assert_eq!(rendered, activated);
}

#[test]
fn shim_header_is_include_guarded() {
    let header = render_shim_header(IncludeWrapper::default().shim());
    let profile = PlatformProfile::for_host(HostPlatform::Windows, Some(TargetArch::Aarch64));

    let first = evaluate(&header, &profile.macro_environment()).unwrap();
    assert!(first.defined.contains(SHIM_HEADER_GUARD));
    assert!(first.defined.contains("_SIZE_T_DEFINED"));
    assert_eq!(first.typedefs.len(), 2);

    // Second inclusion within the same pass sees the guard and emits nothing.
    let second = evaluate(&header, &first.defined).unwrap();
    assert!(second.typedefs.is_empty());
}

#[test]
fn shim_header_without_lp64_selects_int_widths() {
    let header = render_shim_header(IncludeWrapper::default().shim());
    let profile = PlatformProfile::for_host(HostPlatform::Windows, Some(TargetArch::X86));
    let eval = evaluate(&header, &profile.macro_environment()).unwrap();
    assert_eq!(eval.typedef("size_t").unwrap().c_type, "unsigned int");
    assert_eq!(eval.typedef("ssize_t").unwrap().c_type, "int");
    assert!(eval.typedef("uint32_t").is_none());
}

#[test]
fn wrapper_includes_follow_stage_order() {
    let wrapper = IncludeWrapper::default();
    let header = render_wrapper_header(&wrapper);
    let eval = evaluate(&header, &Default::default()).unwrap();
    assert!(eval.defined.contains(WRAPPER_HEADER_GUARD));
    assert!(eval.typedefs.is_empty());

    let expected: Vec<IncludeDirective> = wrapper
        .include_sequence()
        .into_iter()
        .map(|(stage, path)| IncludeDirective {
            path,
            system: stage == Stage::HostStandard,
        })
        .collect();
    assert_eq!(eval.includes, expected);
}
