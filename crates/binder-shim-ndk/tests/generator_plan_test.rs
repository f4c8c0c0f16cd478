//! Integration test: NDK discovery and generator plan assembly against a
//! synthetic NDK tree.
//!
//! Run: cargo test -p binder-shim-ndk --test generator_plan_test

use std::path::{Path, PathBuf};

use binder_shim_core::{ErrorClass, HostPlatform, IncludeWrapper, Origin, TargetArch};
use binder_shim_ndk::{
    GeneratorConfig, NdkInstall, NdkLayout, NoteKind, ShimArtifacts, build_plan,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "binder-shim-ndk-{name}-{}",
        std::process::id()
    ));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn mkdirs(root: &Path, rels: &[&str]) {
    for rel in rels {
        std::fs::create_dir_all(root.join(rel)).unwrap();
    }
}

/// Modern layout for `host`, clang 9 and 18 builtin includes, aarch64 only.
fn fake_modern_ndk(root: &Path, host: HostPlatform) {
    let prebuilt = format!("toolchains/llvm/prebuilt/{}", host.host_tag());
    let dirs = [
        format!("{prebuilt}/sysroot/usr/include/aarch64-linux-android"),
        format!("{prebuilt}/lib/clang/9/include"),
        format!("{prebuilt}/lib/clang/18/include"),
    ];
    let rels: Vec<&str> = dirs.iter().map(String::as_str).collect();
    mkdirs(root, &rels);
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[test]
fn modern_layout_is_detected() {
    let root = scratch_dir("modern");
    fake_modern_ndk(&root, HostPlatform::Linux);

    let ndk = NdkInstall::detect(&root, HostPlatform::Linux).expect("valid NDK");
    assert_eq!(ndk.layout, NdkLayout::Modern);
    assert!(ndk.sysroot().ends_with("toolchains/llvm/prebuilt/linux-x86_64/sysroot"));

    // Another host's prebuilt directory is not usable.
    assert!(NdkInstall::detect(&root, HostPlatform::MacOs).is_none());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn legacy_layout_is_detected() {
    let root = scratch_dir("legacy");
    mkdirs(&root, &["toolchains/llvm/prebuilt", "sysroot/usr/include"]);

    let ndk = NdkInstall::detect(&root, HostPlatform::Linux).expect("valid NDK");
    assert_eq!(ndk.layout, NdkLayout::Legacy);
    assert_eq!(ndk.sysroot(), root.join("sysroot"));

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn discovery_skips_invalid_candidates() {
    let root = scratch_dir("discover");
    let bogus = root.join("not-an-ndk");
    let real = root.join("ndk");
    std::fs::create_dir_all(&bogus).unwrap();
    fake_modern_ndk(&real, HostPlatform::Linux);

    let config = GeneratorConfig::new(HostPlatform::Linux, None)
        .with_ndk_candidate(&real)
        .with_ndk_candidate(&bogus);
    assert_eq!(config.ndk_candidates[0], bogus);

    let ndk = NdkInstall::discover(&config).expect("second candidate is valid");
    assert_eq!(ndk.root, real);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn include_paths_put_newest_clang_builtins_first() {
    let root = scratch_dir("includes");
    fake_modern_ndk(&root, HostPlatform::Linux);
    let ndk = NdkInstall::detect(&root, HostPlatform::Linux).unwrap();

    let includes = ndk.include_paths(TargetArch::Aarch64);
    let ordered: Vec<&PathBuf> = includes.ordered().collect();
    assert_eq!(ordered.len(), 3);
    assert!(ordered[0].ends_with("lib/clang/18/include"));
    assert!(ordered[1].ends_with("sysroot/usr/include"));
    assert!(ordered[2].ends_with("sysroot/usr/include/aarch64-linux-android"));

    // armv7 subdirectory is absent in the fake tree and is reported missing.
    let armv7 = ndk.include_paths(TargetArch::Armv7);
    assert_eq!(armv7.sysroot.len(), 1);
    assert!(armv7.notes.iter().any(|n| {
        n.kind == NoteKind::Missing && n.path.ends_with("arm-linux-androideabi")
    }));

    std::fs::remove_dir_all(&root).unwrap();
}

// ---------------------------------------------------------------------------
// Artifacts and plan
// ---------------------------------------------------------------------------

#[test]
fn artifacts_are_written_and_stable() {
    let dir = scratch_dir("artifacts");
    let wrapper = IncludeWrapper::default();

    let first = ShimArtifacts::write(&dir, &wrapper).unwrap();
    let shim_a = std::fs::read(&first.shim_header).unwrap();
    let wrap_a = std::fs::read(&first.wrapper_header).unwrap();

    let second = ShimArtifacts::write(&dir, &wrapper).unwrap();
    assert_eq!(first, second);
    assert_eq!(std::fs::read(&second.shim_header).unwrap(), shim_a);
    assert_eq!(std::fs::read(&second.wrapper_header).unwrap(), wrap_a);

    let wrapper_text = String::from_utf8(wrap_a).unwrap();
    let std_pos = wrapper_text.find("#include <sys/types.h>").unwrap();
    let shim_pos = wrapper_text.find("#include \"types_workaround.h\"").unwrap();
    let native_pos = wrapper_text.find("#include \"BinderBindings.hpp\"").unwrap();
    assert!(std_pos < shim_pos && shim_pos < native_pos);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn plan_without_ndk_uses_bundled_includes() {
    let artifacts = ShimArtifacts::locate(Path::new("/out"));
    let config = GeneratorConfig::new(HostPlatform::Windows, Some("aarch64-linux-android".into()));

    let plan = build_plan(&config, &artifacts, None).unwrap();
    assert_eq!(plan.target, TargetArch::Aarch64);
    assert_eq!(plan.clang_target, "aarch64-linux-android33");
    assert_eq!(plan.header, PathBuf::from("/out/wrapper.h"));
    assert_eq!(
        &plan.clang_args[..4],
        &["-I/out", "-Isrc/include_cpp", "-Isrc/include_ndk", "-Isrc/include_platform"]
    );
    assert!(!plan.clang_args.iter().any(|a| a.starts_with("--sysroot")));
    assert!(!plan.clang_args.iter().any(|a| a == "-include"));

    let tail: Vec<&str> = plan.clang_args.iter().map(String::as_str).rev().take(9).collect();
    assert_eq!(
        tail,
        vec![
            "-fno-addrsig",
            "-D__STDC_FORMAT_MACROS",
            "-D__STDC_CONSTANT_MACROS",
            "-D__STDC_LIMIT_MACROS",
            "-D_GNU_SOURCE",
            "-D__ANDROID__",
            "-D__ANDROID_API__=33",
            "aarch64-linux-android33",
            "-target",
        ]
    );

    // Scenario A surfaces through the plan's declaration set.
    assert_eq!(plan.declarations.get("size_t").unwrap().origin, Origin::Shim);
    assert!(plan.allowlist_types.iter().any(|t| t == "AIBinder"));
}

#[test]
fn plan_with_ndk_orders_sysroot_then_includes_then_extra_args() {
    let root = scratch_dir("plan");
    fake_modern_ndk(&root, HostPlatform::Linux);
    let ndk = NdkInstall::detect(&root, HostPlatform::Linux).unwrap();

    let mut config = GeneratorConfig::new(HostPlatform::Linux, Some("aarch64-linux-android".into()))
        .with_api_level(30);
    config.extra_clang_args = vec!["-DEXTRA".to_string()];
    let artifacts = ShimArtifacts::locate(&root.join("out"));

    let plan = build_plan(&config, &artifacts, Some(&ndk)).unwrap();
    let pos = |needle: &str| {
        plan.clang_args
            .iter()
            .position(|a| a.contains(needle))
            .unwrap_or_else(|| panic!("missing {needle} in {:?}", plan.clang_args))
    };
    assert!(pos("--sysroot=") < pos("lib/clang/18/include"));
    assert!(pos("lib/clang/18/include") < pos("include/aarch64-linux-android"));
    assert!(pos("-DEXTRA") < pos("-target"));
    assert_eq!(plan.clang_target, "aarch64-linux-android30");
    assert!(plan.clang_args.contains(&"-D__ANDROID_API__=30".to_string()));
    assert_eq!(plan.declarations.synthesized().count(), 0);
    assert!(plan.notes.iter().all(|n| n.kind == NoteKind::Found));

    let json: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
    assert_eq!(json["target"], "aarch64");
    assert_eq!(json["ndk"]["layout"], "modern");

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn plan_with_legacy_ndk_omits_sysroot() {
    let root = scratch_dir("plan-legacy");
    mkdirs(
        &root,
        &[
            "toolchains/llvm/prebuilt",
            "sysroot/usr/include/aarch64-linux-android",
        ],
    );
    let ndk = NdkInstall::detect(&root, HostPlatform::Linux).unwrap();
    assert_eq!(ndk.layout, NdkLayout::Legacy);

    let config = GeneratorConfig::new(HostPlatform::Linux, Some("aarch64-linux-android".into()));
    let artifacts = ShimArtifacts::locate(&root.join("out"));

    let plan = build_plan(&config, &artifacts, Some(&ndk)).unwrap();
    assert!(!plan.clang_args.iter().any(|a| a.starts_with("--sysroot")));
    assert!(
        plan.clang_args
            .iter()
            .any(|a| a.ends_with("sysroot/usr/include/aarch64-linux-android"))
    );
    assert!(
        plan.notes
            .iter()
            .any(|n| n.kind == NoteKind::Missing && n.path.ends_with("lib/clang"))
    );

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn plan_aborts_on_unknown_target() {
    let artifacts = ShimArtifacts::locate(Path::new("/out"));
    let config = GeneratorConfig::new(HostPlatform::Windows, Some("riscv64-linux-android".into()));
    let err = build_plan(&config, &artifacts, None).unwrap_err();
    assert_eq!(err.class(), ErrorClass::UnresolvedSymbol);
}
