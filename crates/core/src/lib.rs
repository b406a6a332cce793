//! Sticker sheet core library.
//!
//! Turns product records (code, name, price) into a grid of barcode labels
//! on a paged document. The main entry points are [`read_table`] for input,
//! [`run_batch`] for layout and [`generate_sheet`] for a whole run. Barcode
//! symbologies and output formats plug in through [`BarcodeEncoder`] and
//! [`DocumentWriter`].

#![warn(missing_docs)]

/// Barcode encoder seam and in-memory barcode images.
pub mod barcode;
/// Label composition into draw instructions.
pub mod compose;
/// Document writer seam.
pub mod document;
/// Error types.
pub mod error;
/// Grid cursor and cell geometry.
pub mod grid;
/// Batch pipeline.
pub mod pipeline;
/// Product records.
pub mod record;
/// Text sanitization for the page encoding.
pub mod sanitize;
/// CSV input.
pub mod source;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Records and sanitization
pub use record::{MISSING_VALUE_MARKER, RawRecord, SanitizedRecord};
pub use sanitize::{
    NAME_MAX_CHARS, encode_winansi, sanitize, sanitize_field, sanitize_opt, sanitize_record,
};

// Layout
pub use compose::{
    DrawOp, FontStyle, LabelLayout, LabelText, TextBand, TextCell, compose,
    compose_with_layout,
};
pub use grid::{CursorState, CursorStep, GridCursor, LabelGeometry};

// Collaborators
pub use barcode::{BarcodeAdapter, BarcodeEncoder, BarcodeImage, EncodeOptions};
pub use document::DocumentWriter;

// Pipeline
pub use pipeline::{
    BatchConfig, BatchProgress, BatchResult, LabelPlacement, Outcome, SkipReason, SkippedRecord,
    generate_sheet, run_batch,
};

// Input
pub use source::{
    ColumnSelection, ColumnSelector, SourceError, Table, read_table,
};

// Errors
pub use error::{EncodingFailure, RecordFailure, RenderFailure, SheetError};

// Profile and diagnostics (re-exported from their crates)
pub use sticker_sheet_diagnostics::{Diagnostic, Severity, codes};
pub use sticker_sheet_profile::{GridConfig, PageSize, SheetProfile};
