//! Diagnostics for the sticker sheet generator.
//!
//! Provides [`Diagnostic`] and [`Severity`], used to report records that were
//! skipped during a batch and failures that abort a run. Diagnostic codes are
//! defined in the [`codes`] module and described by [`explain`].

#![warn(missing_docs)]

/// Diagnostic ID constants.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error: the run cannot continue.
    Error,
    /// Warning: one record was left out of the sheet.
    Warn,
    /// Informational note.
    Info,
}

/// A diagnostic message produced by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"STK2001"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Zero-based data row of the input table this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        row: Option<usize>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            row,
            context: None,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        row: Option<usize>,
    ) -> Self {
        Self::new(id, Severity::Error, message, row)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        row: Option<usize>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, row)
    }

    /// Attach machine-readable context metadata (builder pattern).
    ///
    /// Keys are short descriptors like `"code"` or `"column"`.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.row {
            Some(row) => write!(
                f,
                "{}[{}]: row {}: {}",
                self.severity, self.id, row, self.message
            ),
            None => write!(f, "{}[{}]: {}", self.severity, self.id, self.message),
        }
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    match id {
        codes::SOURCE_UNREADABLE => Some(
            "The input table could not be read, or one of the selected code/name/price columns \
             does not exist in its header. No sheet is produced.",
        ),
        codes::PROFILE_INVALID => Some(
            "The sheet profile is not valid JSON, or a grid, page or barcode value is out of \
             range (for example zero columns or a non-positive sticker size). No sheet is \
             produced.",
        ),
        codes::OUTPUT_FAILED => Some(
            "Every label was laid out but the PDF could not be encoded. No sheet is produced.",
        ),
        codes::BARCODE_REJECTED => Some(
            "The barcode encoder rejected the product code, usually because it contains \
             characters outside printable ASCII. The record was skipped and did not use a grid \
             cell.",
        ),
        codes::RENDER_FAILED => Some(
            "The label could not be drawn into the document. Nothing of the failed label was \
             kept; the record was skipped and did not use a grid cell.",
        ),
        codes::GRID_OVERFLOW => Some(
            "The margins and sticker grid extend past the right or bottom edge of the page. \
             The sheet is still written, but stickers beyond the edge are cut off.",
        ),
        _ => None,
    }
}
