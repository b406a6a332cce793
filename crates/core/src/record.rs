//! Input and sanitized product records.

use serde::{Deserialize, Serialize};

/// Value a spreadsheet export writes into an empty numeric cell. A code
/// equal to it (ignoring ASCII case) counts as missing.
pub const MISSING_VALUE_MARKER: &str = "nan";

/// One row of input, exactly as read from the source table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Barcode payload / SKU.
    pub code: String,
    /// Product name.
    pub name: String,
    /// Price text, printed verbatim.
    pub price: String,
}

impl RawRecord {
    /// Build a record from its three fields.
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            price: price.into(),
        }
    }
}

/// A record cleaned for rendering. Produced by
/// [`sanitize_record`](crate::sanitize::sanitize_record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizedRecord {
    /// Sanitized, trimmed code.
    pub code: String,
    /// Sanitized, trimmed name, at most
    /// [`NAME_MAX_CHARS`](crate::sanitize::NAME_MAX_CHARS) characters.
    pub name: String,
    /// Sanitized, trimmed price.
    pub price: String,
    /// `true` when the code is empty or the [`MISSING_VALUE_MARKER`].
    pub is_blank: bool,
}
