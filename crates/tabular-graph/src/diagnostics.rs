//! Row-level diagnostics
//!
//! A build never fails because of a single bad row. The row (or just the bad
//! field) is skipped, a [`Diagnostic`] is recorded here, and the same event is
//! emitted through `tracing` at the matching level.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Value was defaulted or a field was dropped.
    Warning,
    /// A row was rejected.
    Error,
}

/// Which record list a diagnostic refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// `users` rows.
    User,
    /// `resources` rows.
    Resource,
    /// `entitlements` rows.
    Entitlement,
    /// `grants` rows.
    Grant,
}

impl RecordKind {
    /// Get the string representation of the record kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::User => "user",
            RecordKind::Resource => "resource",
            RecordKind::Entitlement => "entitlement",
            RecordKind::Grant => "grant",
        }
    }
}

/// What went wrong with a row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A required field was empty.
    MissingField,
    /// The row's key was already taken by an earlier row.
    Duplicate,
    /// An enum-like column held an unrecognized value.
    UnrecognizedValue,
    /// A date column could not be parsed.
    InvalidDate,
    /// The row's resource type is not defined.
    UnknownResourceType,
    /// A reference to another record did not resolve.
    UnresolvedReference,
}

/// A single row-level finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    /// Warning or error.
    pub severity: Severity,
    /// Category of the problem.
    pub kind: DiagnosticKind,
    /// Record list the row came from.
    pub record: RecordKind,
    /// Zero-based index of the row within its list.
    pub row: usize,
    /// Human readable description.
    pub message: String,
    /// The offending value, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} row {}: {}", self.record.as_str(), self.row, self.message)?;
        if let Some(ref value) = self.value {
            write!(f, " ({value})")?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics for one build.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn warn(
        &mut self,
        record: RecordKind,
        row: usize,
        kind: DiagnosticKind,
        message: impl Into<String>,
        value: Option<&str>,
    ) {
        let message = message.into();
        tracing::warn!(
            record = record.as_str(),
            row_index = row,
            kind = ?kind,
            value = value.unwrap_or_default(),
            "{}",
            message
        );
        self.push(Severity::Warning, record, row, kind, message, value);
    }

    /// Record an error and log it.
    pub fn error(
        &mut self,
        record: RecordKind,
        row: usize,
        kind: DiagnosticKind,
        message: impl Into<String>,
        value: Option<&str>,
    ) {
        let message = message.into();
        tracing::error!(
            record = record.as_str(),
            row_index = row,
            kind = ?kind,
            value = value.unwrap_or_default(),
            "{}",
            message
        );
        self.push(Severity::Error, record, row, kind, message, value);
    }

    fn push(
        &mut self,
        severity: Severity,
        record: RecordKind,
        row: usize,
        kind: DiagnosticKind,
        message: String,
        value: Option<&str>,
    ) {
        self.entries.push(Diagnostic {
            severity,
            kind,
            record,
            row,
            message,
            value: value.map(str::to_string),
        });
    }

    /// All recorded diagnostics, in the order they were raised.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics for one record list.
    pub fn for_record(&self, record: RecordKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.record == record)
    }

    /// Number of warnings.
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Number of errors.
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Check whether any diagnostic of the given kind was raised for a row.
    pub fn has(&self, record: RecordKind, row: usize, kind: DiagnosticKind) -> bool {
        self.entries
            .iter()
            .any(|d| d.record == record && d.row == row && d.kind == kind)
    }

    /// Get the count of diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
