//! Barcode symbologies for sticker sheets.
//!
//! Currently Code 128 only, through [`Code128Encoder`], which implements
//! [`sticker_sheet_core::BarcodeEncoder`].

#![warn(missing_docs)]

mod code128;
mod patterns;

pub use code128::{Code128Encoder, CodeSet};
