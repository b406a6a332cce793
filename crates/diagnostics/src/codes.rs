//! Diagnostic ID constants.
//!
//! `STK1xxx` codes are fatal to a whole run. `STK2xxx` codes describe a single
//! record that was skipped while the rest of the batch carried on. `STK3xxx`
//! codes are warnings about the sheet as a whole.

/// The input table could not be read, or a selected column is missing.
pub const SOURCE_UNREADABLE: &str = "STK1001";
/// The sheet profile is malformed or one of its values is out of range.
pub const PROFILE_INVALID: &str = "STK1002";
/// The finished document could not be encoded.
pub const OUTPUT_FAILED: &str = "STK1003";

/// The barcode encoder rejected the record's code.
pub const BARCODE_REJECTED: &str = "STK2001";
/// The label could not be drawn into the document.
pub const RENDER_FAILED: &str = "STK2002";

/// The sticker grid runs past the right or bottom edge of the page.
pub const GRID_OVERFLOW: &str = "STK3001";

/// Every code defined in this module, in numeric order.
pub const ALL: &[&str] = &[
    SOURCE_UNREADABLE,
    PROFILE_INVALID,
    OUTPUT_FAILED,
    BARCODE_REJECTED,
    RENDER_FAILED,
    GRID_OVERFLOW,
];
