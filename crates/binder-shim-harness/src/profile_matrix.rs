//! Host × target resolution matrix.
//!
//! Runs one resolution pass for every supported host/target pair, checks
//! that a second pass is identical and that the rendered shim header agrees
//! with the model, and emits a machine-readable report.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use binder_shim_core::preprocess::evaluate;
use binder_shim_core::render::render_shim_header;
use binder_shim_core::{HostPlatform, IncludeWrapper, PlatformProfile, TargetArch};

use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

/// One host/target pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub host: String,
    pub target: String,
    pub pointer_width: String,
    pub status: String,
    pub passed: bool,
    /// Names the shim had to synthesize, in resolution order.
    pub synthesized: Vec<String>,
    pub stale_guards: Vec<String>,
    pub fingerprint: Option<String>,
    /// A second pass over the same profile produced the same fingerprint.
    pub idempotent: bool,
    /// The rendered shim header evaluated to the fallbacks the pass activated.
    pub rendered_matches: bool,
    /// Names whose rendered typedef differs from the model's.
    #[serde(default)]
    pub header_mismatch: Vec<String>,
    pub error_class: Option<String>,
    pub error_symbol: Option<String>,
    pub error: Option<String>,
}

/// Per-host aggregate row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostMatrixRow {
    pub host: String,
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub synthesized_total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMatrixSummary {
    pub total_profiles: u64,
    pub passed: u64,
    pub failed: u64,
}

/// Top-level matrix report payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMatrixReport {
    pub schema_version: String,
    pub summary: ProfileMatrixSummary,
    pub host_matrix: Vec<HostMatrixRow>,
    pub rows: Vec<ProfileRow>,
}

impl ProfileMatrixReport {
    /// Returns true when every profile resolved consistently.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.summary.failed == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Every supported host paired with every supported target.
#[must_use]
pub fn standard_profiles() -> Vec<PlatformProfile> {
    HostPlatform::ALL
        .into_iter()
        .flat_map(|host| {
            TargetArch::ALL
                .into_iter()
                .map(move |arch| PlatformProfile::for_host(host, Some(arch)))
        })
        .collect()
}

/// Resolve every profile with `wrapper` and build the report.
#[must_use]
pub fn build_profile_matrix(
    wrapper: &IncludeWrapper,
    profiles: &[PlatformProfile],
) -> ProfileMatrixReport {
    let shim_header = render_shim_header(wrapper.shim());
    let mut rows: Vec<ProfileRow> = profiles
        .iter()
        .map(|profile| run_profile(wrapper, profile, &shim_header))
        .collect();

    rows.sort_by(|a, b| a.host.cmp(&b.host).then_with(|| a.target.cmp(&b.target)));

    let total_profiles = u64::try_from(rows.len()).unwrap_or(u64::MAX);
    let passed = u64::try_from(rows.iter().filter(|row| row.passed).count()).unwrap_or(0);

    let mut buckets: BTreeMap<String, (u64, u64, u64)> = BTreeMap::new();
    for row in &rows {
        let bucket = buckets.entry(row.host.clone()).or_insert((0, 0, 0));
        bucket.0 = bucket.0.saturating_add(1);
        if row.passed {
            bucket.1 = bucket.1.saturating_add(1);
        }
        bucket.2 = bucket
            .2
            .saturating_add(u64::try_from(row.synthesized.len()).unwrap_or(0));
    }

    let host_matrix = buckets
        .into_iter()
        .map(|(host, (total, passed, synthesized_total))| HostMatrixRow {
            host,
            total,
            passed,
            failed: total.saturating_sub(passed),
            synthesized_total,
        })
        .collect();

    ProfileMatrixReport {
        schema_version: "v1".to_string(),
        summary: ProfileMatrixSummary {
            total_profiles,
            passed,
            failed: total_profiles.saturating_sub(passed),
        },
        host_matrix,
        rows,
    }
}

fn run_profile(
    wrapper: &IncludeWrapper,
    profile: &PlatformProfile,
    shim_header: &str,
) -> ProfileRow {
    let mut row = ProfileRow {
        host: profile.host.as_str().to_string(),
        target: profile
            .target
            .map_or_else(|| "unknown".to_string(), |t| t.as_str().to_string()),
        pointer_width: profile
            .pointer_width()
            .map_or_else(|| "unknown".to_string(), |w| w.as_str().to_string()),
        status: "fail".to_string(),
        passed: false,
        synthesized: Vec::new(),
        stale_guards: Vec::new(),
        fingerprint: None,
        idempotent: false,
        rendered_matches: false,
        header_mismatch: Vec::new(),
        error_class: None,
        error_symbol: None,
        error: None,
    };

    let set = match wrapper.resolve(profile) {
        Ok(set) => set,
        Err(err) => {
            row.error_class = Some(err.class().as_str().to_string());
            row.error_symbol = Some(err.symbol().to_string());
            row.error = Some(err.to_string());
            return row;
        }
    };

    row.synthesized = set
        .synthesized()
        .map(|d| d.definition.name.clone())
        .collect();
    row.stale_guards = set.diagnostics.iter().map(|d| d.symbol.clone()).collect();
    let fingerprint = set.fingerprint();
    row.idempotent = wrapper
        .resolve(profile)
        .is_ok_and(|again| again.fingerprint() == fingerprint);
    row.fingerprint = Some(fingerprint);

    match evaluate(shim_header, &profile.macro_environment()) {
        Ok(eval) => {
            let rendered: BTreeMap<&str, &str> = eval
                .typedefs
                .iter()
                .map(|t| (t.name.as_str(), t.c_type.as_str()))
                .collect();
            let activated = set.activated_fallbacks();
            let modeled: BTreeMap<&str, &str> = activated
                .iter()
                .map(|d| (d.name.as_str(), d.c_type.as_str()))
                .collect();
            row.header_mismatch = rendered
                .keys()
                .chain(modeled.keys())
                .filter(|name| rendered.get(*name) != modeled.get(*name))
                .map(|name| (*name).to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            // Duplicate typedefs in the header collapse in the map above.
            row.rendered_matches =
                row.header_mismatch.is_empty() && eval.typedefs.len() == activated.len();
        }
        Err(err) => row.error = Some(format!("shim header evaluation failed: {err}")),
    }

    row.passed = row.idempotent && row.rendered_matches;
    if row.passed {
        row.status = "pass".to_string();
    }
    row
}

/// Emit one log line per matrix row plus a summary line.
pub fn log_matrix(emitter: &mut LogEmitter, report: &ProfileMatrixReport) -> std::io::Result<()> {
    for row in &report.rows {
        let (level, outcome) = match (&row.error_class, row.passed) {
            (Some(_), _) => (LogLevel::Error, Outcome::Fail),
            (None, false) => (LogLevel::Error, Outcome::Error),
            (None, true) if !row.stale_guards.is_empty() => (LogLevel::Warn, Outcome::Pass),
            (None, true) => (LogLevel::Info, Outcome::Pass),
        };
        let mut entry = LogEntry::new(level, "profile_resolved")
            .with_profile(&row.host, &row.target)
            .with_outcome(outcome)
            .with_details(serde_json::json!({
                "pointer_width": row.pointer_width,
                "synthesized": row.synthesized,
                "stale_guards": row.stale_guards,
                "fingerprint": row.fingerprint,
                "idempotent": row.idempotent,
                "rendered_matches": row.rendered_matches,
                "header_mismatch": row.header_mismatch,
                "error": row.error,
            }));
        if let (Some(class), Some(symbol)) = (&row.error_class, &row.error_symbol) {
            entry = entry.with_symbol(symbol).with_error_class(class);
        }
        emitter.emit_entry(entry)?;
    }

    let level = if report.all_passed() { LogLevel::Info } else { LogLevel::Error };
    emitter.emit_entry(LogEntry::new(level, "matrix_summary").with_details(
        serde_json::json!({
            "total_profiles": report.summary.total_profiles,
            "passed": report.summary.passed,
            "failed": report.summary.failed,
        }),
    ))
}
