//! Typed error types for sheet generation.
//!
//! Per-record failures ([`EncodingFailure`], [`RenderFailure`], wrapped in
//! [`RecordFailure`]) are recovered inside the batch and surface only as
//! skipped-record diagnostics. [`SheetError`] is fatal to the whole run.

use sticker_sheet_profile::ProfileError;

/// The barcode encoder rejected a payload.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingFailure {
    /// There is nothing to encode.
    #[error("barcode payload is empty")]
    Empty,

    /// The payload holds a character the symbology cannot represent.
    #[error("unsupported character {ch:?} at position {position}")]
    UnsupportedChar {
        /// The offending character.
        ch: char,
        /// Zero-based character position within the payload.
        position: usize,
    },

    /// The payload is otherwise malformed for the symbology.
    #[error("malformed barcode payload: {0}")]
    Malformed(String),
}

/// Drawing one label into the document failed.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderFailure {
    /// A draw instruction has a non-finite or negative position or size.
    #[error("invalid geometry for {element}: {details}")]
    InvalidGeometry {
        /// Which kind of instruction was rejected (`"rect"`, `"text"`, `"image"`).
        element: &'static str,
        /// Human-readable description of the problem.
        details: String,
    },

    /// Text contains characters the page font cannot encode.
    #[error("text {text:?} cannot be encoded for the page font")]
    UnencodableText {
        /// The rejected text.
        text: String,
    },

    /// The barcode image has no pixels.
    #[error("barcode image is empty")]
    EmptyImage,

    /// Any other writer-specific failure.
    #[error("render failed: {0}")]
    Other(String),
}

/// Why a single record could not be placed on the sheet.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordFailure {
    /// The barcode encoder rejected the code.
    #[error(transparent)]
    Encoding(#[from] EncodingFailure),

    /// The composed label could not be drawn.
    #[error(transparent)]
    Render(#[from] RenderFailure),
}

/// Errors that abort a sheet run.
///
/// Input problems are reported by [`SourceError`](crate::source::SourceError)
/// while reading the table, before a run starts.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// The sheet profile failed validation.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// The finished document could not be encoded.
    #[error("cannot write document: {0}")]
    Output(#[source] RenderFailure),
}

impl SheetError {
    /// Diagnostic code describing this error (see `sticker_sheet_diagnostics::codes`).
    pub fn code(&self) -> &'static str {
        use sticker_sheet_diagnostics::codes;
        match self {
            SheetError::Profile(_) => codes::PROFILE_INVALID,
            SheetError::Output(_) => codes::OUTPUT_FAILED,
        }
    }
}
