//! PDF output for sticker sheets.
//!
//! [`PdfDocument`] implements [`sticker_sheet_core::DocumentWriter`] on top of
//! `lopdf`, with the base-14 Helvetica fonts in WinAnsi encoding and grey
//! barcode images, so the files need no embedded font data.
//!
//! ```
//! use sticker_sheet_core::{DocumentWriter, PageSize};
//! use sticker_sheet_pdf::PdfDocument;
//!
//! let mut doc = PdfDocument::new(PageSize::A4);
//! doc.rect(7.0, 10.0, 64.0, 34.0, 0.1).unwrap();
//! let bytes = doc.serialize().unwrap();
//! assert!(bytes.starts_with(b"%PDF-1.4"));
//! ```

#![warn(missing_docs)]

mod document;
mod metrics;
mod output;

pub use document::{PdfCheckpoint, PdfDocument};
