//! Writes the single JSON record each command produces.

use std::io::Write;
use std::process::ExitCode;

use chrono::Local;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Which field a command uses to report its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStyle {
    /// `"status": "success" | "error"`
    Status,
    /// `"success": true | false`
    Success,
}

impl RecordStyle {
    /// The record written when a command fails before producing its own.
    pub fn error_record(self, message: &str) -> Value {
        let timestamp = Local::now().to_rfc3339();
        match self {
            RecordStyle::Status => serde_json::json!({
                "status": "error",
                "error": message,
                "timestamp": timestamp,
            }),
            RecordStyle::Success => serde_json::json!({
                "success": false,
                "error": message,
                "timestamp": timestamp,
            }),
        }
    }
}

/// A serialized result record and whether it reports success.
#[derive(Debug, Clone)]
pub struct Report {
    pub record: Value,
    pub success: bool,
}

impl Report {
    pub fn new(record: &impl Serialize, success: bool) -> Result<Self> {
        Ok(Self {
            record: serde_json::to_value(record)?,
            success,
        })
    }

    /// Exit code matching the record.
    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// Print the record as one line on stdout.
    pub fn emit(&self) -> ExitCode {
        write_line(&mut std::io::stdout().lock(), &self.record);
        self.exit_code()
    }
}

/// Print an error record on stderr and return the failure code.
pub fn emit_failure(style: RecordStyle, message: &str) -> ExitCode {
    write_line(&mut std::io::stderr().lock(), &style.error_record(message));
    ExitCode::FAILURE
}

fn write_line(out: &mut impl Write, record: &Value) {
    let line = record.to_string();
    if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
        tracing::error!("failed to write result: {e}");
    }
}
