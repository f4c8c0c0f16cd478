//! JSONL run logs for shim verification.
//!
//! Every line is one [`LogEntry`]. A line always carries `timestamp`,
//! `trace_id`, `level` and `event`; resolution lines add the host/target
//! pair, and failed resolutions name the offending symbol and its error
//! class. [`ArtifactIndex`] pins the rendered headers a run produced by
//! SHA-256.

use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use binder_shim_core::ErrorClass;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    /// The pass succeeded but recorded diagnostics.
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    /// Resolution failed; the entry names the symbol and error class.
    Fail,
    /// The harness itself found an inconsistency outside the resolution
    /// error taxonomy, such as a rendered header disagreeing with the model.
    Error,
}

/// Labels accepted in `error_class`.
const ERROR_CLASSES: [&str; 2] = [
    ErrorClass::Redefinition.as_str(),
    ErrorClass::UnresolvedSymbol.as_str(),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    /// `<run_id>::<seq>`; assigned by [`LogEmitter`] when left empty.
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_refs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    #[must_use]
    pub fn new(level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: String::new(),
            level,
            event: event.into(),
            run_id: None,
            host: None,
            target: None,
            symbol: None,
            error_class: None,
            outcome: None,
            artifact_refs: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_trace(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    /// The host/target pair a resolution line describes.
    #[must_use]
    pub fn with_profile(mut self, host: impl Into<String>, target: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = Some(class.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_artifacts(mut self, refs: Vec<String>) -> Self {
        self.artifact_refs = Some(refs);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Artifact index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub path: String,
    /// `shim_header`, `wrapper_header`, ...
    pub kind: String,
    pub sha256: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub run_id: String,
    pub generated_utc: String,
    pub artifacts: Vec<ArtifactEntry>,
}

impl ArtifactIndex {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            generated_utc: now_utc(),
            artifacts: Vec::new(),
        }
    }

    /// Hash the file at `path` and record it.
    pub fn add_file(&mut self, path: &Path, kind: impl Into<String>) -> std::io::Result<()> {
        let bytes = std::fs::read(path)?;
        self.artifacts.push(ArtifactEntry {
            path: path.display().to_string(),
            kind: kind.into(),
            sha256: sha256_hex(&bytes),
            size_bytes: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
        });
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Numbers entries of one run and writes them as JSONL.
pub struct LogEmitter {
    writer: Box<dyn Write>,
    run_id: String,
    seq: u64,
}

impl LogEmitter {
    /// Write to `path`, creating its parent directory.
    pub fn to_file(path: &Path, run_id: &str) -> std::io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        Ok(Self::to_writer(Box::new(file), run_id))
    }

    #[must_use]
    pub fn to_stdout(run_id: &str) -> Self {
        Self::to_writer(Box::new(std::io::stdout()), run_id)
    }

    #[must_use]
    pub fn to_writer(writer: Box<dyn Write>, run_id: &str) -> Self {
        Self {
            writer,
            run_id: run_id.to_string(),
            seq: 0,
        }
    }

    /// Fill in the trace and run ids if missing and write one line.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        self.seq += 1;
        if entry.trace_id.is_empty() {
            entry.trace_id = format!("{}::{:03}", self.run_id, self.seq);
        }
        entry.run_id.get_or_insert_with(|| self.run_id.clone());
        let line = entry.to_jsonl().map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
#[error("line {line_number}: field '{field}': {message}")]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

/// Collects every problem on one line instead of stopping at the first.
struct LineCheck<'a> {
    line_number: usize,
    obj: &'a serde_json::Map<String, serde_json::Value>,
    errors: Vec<LogValidationError>,
}

impl LineCheck<'_> {
    fn report(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(LogValidationError {
            line_number: self.line_number,
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn text(&self, field: &str) -> Option<&str> {
        self.obj.get(field).and_then(serde_json::Value::as_str)
    }

    fn require(&mut self, field: &str) {
        if !self.obj.contains_key(field) {
            self.report(field, "required field missing");
        }
    }

    /// A present `field` must deserialize as `T`.
    fn one_of<T: DeserializeOwned>(&mut self, field: &str) {
        if let Some(value) = self.obj.get(field)
            && serde_json::from_value::<T>(value.clone()).is_err()
        {
            self.report(field, format!("unknown value {value}"));
        }
    }
}

/// Check one JSONL line and parse it.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let single = |field: &str, message: String| {
        vec![LogValidationError {
            line_number,
            field: field.to_string(),
            message,
        }]
    };

    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| single("<json>", format!("invalid JSON: {e}")))?;
    let Some(obj) = value.as_object() else {
        return Err(single("<root>", "expected JSON object".to_string()));
    };

    let mut check = LineCheck {
        line_number,
        obj,
        errors: Vec::new(),
    };
    for field in ["timestamp", "trace_id", "level", "event"] {
        check.require(field);
    }
    check.one_of::<LogLevel>("level");
    check.one_of::<Outcome>("outcome");

    if let Some(class) = check.text("error_class")
        && !ERROR_CLASSES.contains(&class)
    {
        let message = format!("expected one of {ERROR_CLASSES:?}, got '{class}'");
        check.report("error_class", message);
    }
    if let Some(trace_id) = check.text("trace_id")
        && !trace_id.contains("::")
    {
        let message = format!("expected <run_id>::<seq>, got '{trace_id}'");
        check.report("trace_id", message);
    }
    if check.text("outcome") == Some("fail") {
        for field in ["symbol", "error_class"] {
            if check.text(field).is_none() {
                check.report(field, "failed resolutions must name it");
            }
        }
    }

    if !check.errors.is_empty() {
        return Err(check.errors);
    }
    serde_json::from_value(value).map_err(|e| single("<entry>", format!("failed to parse: {e}")))
}

/// Check every non-blank line of a JSONL file.
///
/// Returns the number of entries and all problems found.
pub fn validate_log_file(path: &Path) -> std::io::Result<(usize, Vec<LogValidationError>)> {
    let content = std::fs::read_to_string(path)?;
    let mut entries = 0;
    let mut errors = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        entries += 1;
        if let Err(found) = validate_log_line(line.trim(), idx + 1) {
            errors.extend(found);
        }
    }
    Ok((entries, errors))
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

fn now_utc() -> String {
    let elapsed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = elapsed.as_secs();
    let (year, month, day) = civil_from_days(secs / 86_400);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        (secs % 86_400) / 3_600,
        (secs % 3_600) / 60,
        secs % 60,
        elapsed.subsec_millis(),
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}
