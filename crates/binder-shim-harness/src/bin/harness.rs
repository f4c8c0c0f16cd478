//! CLI entrypoint for the Binder shim verification harness.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use binder_shim_core::{HostPlatform, IncludeWrapper, PlatformProfile, TargetArch};
use binder_shim_harness::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, build_profile_matrix, log_matrix,
    standard_profiles, validate_log_file,
};
use binder_shim_ndk::{GeneratorConfig, NdkInstall, ShimArtifacts, build_plan};

/// Verification tooling for the Binder NDK type shim.
#[derive(Debug, Parser)]
#[command(name = "binder-shim-harness")]
#[command(about = "Resolve, render and verify the Binder NDK type shim")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write `types_workaround.h` and `wrapper.h`.
    Render {
        /// Output directory for the headers.
        #[arg(long)]
        out: PathBuf,
        /// Optional artifact index JSON path.
        #[arg(long)]
        index: Option<PathBuf>,
    },
    /// Run one resolution pass and print the declaration set as JSON.
    Resolve {
        /// Host platform (linux, macos, windows). Defaults to the running host.
        #[arg(long)]
        host: Option<String>,
        /// Target triple or architecture name.
        #[arg(long)]
        target: String,
    },
    /// Resolve every host/target pair and report consistency.
    Matrix {
        /// Output JSON path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Optional structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Run identifier used in trace ids.
        #[arg(long, default_value = "matrix")]
        run_id: String,
    },
    /// Build the binding generator plan from the environment.
    Plan {
        /// Directory the shim headers are written to.
        #[arg(long)]
        out: PathBuf,
        /// Target triple; overrides `TARGET`.
        #[arg(long)]
        target: Option<String>,
        /// Host platform; defaults to the running host.
        #[arg(long)]
        host: Option<String>,
        /// Android API level.
        #[arg(long)]
        api_level: Option<u32>,
        /// Additional NDK root to try before the environment's candidates.
        #[arg(long)]
        ndk: Option<PathBuf>,
    },
    /// Validate a structured JSONL log.
    ValidateLog {
        /// JSONL log path.
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Render { out, index } => {
            let artifacts = ShimArtifacts::write(&out, &IncludeWrapper::default())?;
            for path in artifacts.paths() {
                eprintln!("Wrote {}", path.display());
            }
            if let Some(index_path) = index {
                write_index(&index_path, "render", &artifacts)?;
                eprintln!("Wrote artifact index to {}", index_path.display());
            }
        }
        Command::Resolve { host, target } => {
            let host = parse_host(host.as_deref())?;
            let profile = PlatformProfile::for_host(host, TargetArch::from_str_loose(&target));
            match IncludeWrapper::default().resolve(&profile) {
                Ok(set) => println!("{}", serde_json::to_string_pretty(&set)?),
                Err(err) => {
                    return Err(format!(
                        "{host}/{target}: {} [{}]",
                        err,
                        err.class().as_str()
                    )
                    .into());
                }
            }
        }
        Command::Matrix {
            output,
            log,
            run_id,
        } => {
            let report = build_profile_matrix(&IncludeWrapper::default(), &standard_profiles());
            let json = report.to_json()?;
            if let Some(path) = output {
                std::fs::write(&path, json)?;
                eprintln!("Wrote matrix report to {}", path.display());
            } else {
                println!("{json}");
            }
            if let Some(path) = log {
                let mut emitter = LogEmitter::to_file(&path, &run_id)?;
                log_matrix(&mut emitter, &report)?;
                emitter.flush()?;
            }
            eprintln!(
                "Matrix: {} profiles, {} passed, {} failed",
                report.summary.total_profiles, report.summary.passed, report.summary.failed
            );
            if !report.all_passed() {
                return Err("profile matrix has failing rows".into());
            }
        }
        Command::Plan {
            out,
            target,
            host,
            api_level,
            ndk,
        } => {
            let mut config = GeneratorConfig::from_env()?;
            if let Some(raw) = host.as_deref() {
                config.host = parse_host(Some(raw))?;
            }
            if target.is_some() {
                config.target_triple = target;
            }
            if let Some(level) = api_level {
                config = config.with_api_level(level);
            }
            if let Some(root) = ndk {
                config = config.with_ndk_candidate(root);
            }

            let install = NdkInstall::discover(&config);
            match &install {
                Some(found) => eprintln!("Using NDK at {}", found.root.display()),
                None => eprintln!("No NDK found; using bundled include trees only"),
            }

            let artifacts = ShimArtifacts::write(&out, &IncludeWrapper::default())?;
            let mut emitter = LogEmitter::to_stdout("plan");
            let plan = match build_plan(&config, &artifacts, install.as_ref()) {
                Ok(plan) => plan,
                Err(err) => {
                    emitter.emit_entry(
                        LogEntry::new(LogLevel::Error, "plan_aborted")
                            .with_symbol(err.symbol())
                            .with_error_class(err.class().as_str())
                            .with_outcome(Outcome::Fail)
                            .with_details(serde_json::json!({ "error": err.to_string() })),
                    )?;
                    emitter.flush()?;
                    return Err(err.into());
                }
            };
            for note in &plan.notes {
                eprintln!("{:?}: {}", note.kind, note.path.display());
            }
            std::fs::write(out.join("plan.json"), plan.to_json()?)?;
            emitter.emit_entry(
                LogEntry::new(LogLevel::Info, "plan_ready")
                    .with_profile(plan.host.as_str(), plan.target.as_str())
                    .with_outcome(Outcome::Pass)
                    .with_artifacts(vec![
                        artifacts.shim_header.display().to_string(),
                        artifacts.wrapper_header.display().to_string(),
                        out.join("plan.json").display().to_string(),
                    ])
                    .with_details(serde_json::json!({
                        "clang_target": plan.clang_target,
                        "fingerprint": plan.declarations.fingerprint(),
                        "synthesized": plan
                            .declarations
                            .synthesized()
                            .map(|d| d.definition.name.clone())
                            .collect::<Vec<_>>(),
                    })),
            )?;
            emitter.flush()?;
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            eprintln!("{}: {lines} lines, {} errors", log.display(), errors.len());
            if !errors.is_empty() {
                return Err("structured log validation failed".into());
            }
        }
    }

    Ok(())
}

fn parse_host(raw: Option<&str>) -> Result<HostPlatform, Box<dyn std::error::Error>> {
    match raw {
        None => Ok(HostPlatform::current()),
        Some(raw) => HostPlatform::from_str_loose(raw)
            .ok_or_else(|| format!("Unsupported host '{raw}', expected linux|macos|windows").into()),
    }
}

fn write_index(
    path: &Path,
    run_id: &str,
    artifacts: &ShimArtifacts,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut index = ArtifactIndex::new(run_id);
    index.add_file(&artifacts.shim_header, "shim_header")?;
    index.add_file(&artifacts.wrapper_header, "wrapper_header")?;
    std::fs::write(path, index.to_json()?)?;
    Ok(())
}
