//! Sheet profile definitions and validation for the sticker sheet generator.
//!
//! A profile bundles everything that stays constant for one run: the shop
//! header, the currency symbol, the page size, the sticker grid and the
//! barcode raster settings. All lengths are in millimetres.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating a sheet profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// JSON deserialization failed.
    #[error("invalid profile JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// Slack allowed when checking whether the grid fits on the page, so that a
/// grid which fills the page exactly is not reported for float rounding.
const FIT_TOLERANCE_MM: f64 = 1e-6;

/// Everything that stays constant for one sheet run.
///
/// Every field has a default, so `{}` is a valid profile describing the
/// classic A4 sheet of 3×8 stickers at 64×34mm.
///
/// # Example
/// ```
/// let profile = sticker_sheet_profile::SheetProfile {
///     shop_name: "Corner Store".into(),
///     grid: sticker_sheet_profile::GridConfig {
///         columns_per_page: 2,
///         rows_per_page: 5,
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// assert!(profile.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SheetProfile {
    /// Header printed at the top of every sticker.
    pub shop_name: String,
    /// Currency symbol printed on the price line.
    pub currency_symbol: String,
    /// Physical page size.
    pub page: PageSize,
    /// Sticker grid layout.
    pub grid: GridConfig,
    /// Barcode raster settings.
    pub barcode: BarcodeSettings,
}

impl Default for SheetProfile {
    fn default() -> Self {
        Self {
            shop_name: "My Store".into(),
            currency_symbol: "₹".into(),
            page: PageSize::default(),
            grid: GridConfig::default(),
            barcode: BarcodeSettings::default(),
        }
    }
}

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageSize {
    /// Page width in millimetres.
    pub width_mm: f64,
    /// Page height in millimetres.
    pub height_mm: f64,
}

impl PageSize {
    /// ISO A4 portrait.
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// US Letter portrait.
    pub const LETTER: PageSize = PageSize {
        width_mm: 215.9,
        height_mm: 279.4,
    };

    /// Look up a named page size (`"a4"` or `"letter"`, case-insensitive).
    pub fn from_name(name: &str) -> Option<PageSize> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(PageSize::A4),
            "letter" => Some(PageSize::LETTER),
            _ => None,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::A4
    }
}

/// Uniform rectangular sticker grid.
///
/// Cell `(column, row)` has its top-left corner at
/// `(margin_x + column * cell_width, margin_y + row * cell_height)`,
/// measured from the top-left corner of the page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Stickers per row. Must be at least 1.
    pub columns_per_page: u32,
    /// Rows of stickers per page. Must be at least 1.
    pub rows_per_page: u32,
    /// Sticker width in millimetres.
    pub cell_width: f64,
    /// Sticker height in millimetres.
    pub cell_height: f64,
    /// Left page margin in millimetres.
    pub margin_x: f64,
    /// Top page margin in millimetres.
    pub margin_y: f64,
}

impl GridConfig {
    /// Number of stickers that fit on one page.
    pub fn labels_per_page(&self) -> usize {
        self.columns_per_page as usize * self.rows_per_page as usize
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns_per_page: 3,
            rows_per_page: 8,
            cell_width: 64.0,
            cell_height: 34.0,
            margin_x: 7.0,
            margin_y: 10.0,
        }
    }
}

/// Barcode raster settings handed to the encoder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BarcodeSettings {
    /// Bar height in millimetres.
    pub module_height_mm: f64,
    /// Blank margin on each side of the symbol, in millimetres.
    pub quiet_zone_mm: f64,
    /// Width of the narrowest bar, in millimetres.
    pub module_width_mm: f64,
}

impl Default for BarcodeSettings {
    fn default() -> Self {
        Self {
            module_height_mm: 8.0,
            quiet_zone_mm: 1.0,
            module_width_mm: 0.2,
        }
    }
}

impl SheetProfile {
    /// Check the structural invariants of the profile.
    ///
    /// - `grid.columns_per_page` and `grid.rows_per_page` must be >= 1
    /// - cell sizes and page sizes must be finite and > 0
    /// - margins must be finite
    /// - barcode module sizes must be > 0, the quiet zone >= 0
    ///
    /// A grid that runs past the page edge is valid; see
    /// [`SheetProfile::grid_overflow`].
    pub fn validate(&self) -> Result<(), ProfileError> {
        let grid = &self.grid;

        // -- Grid shape --
        if grid.columns_per_page == 0 {
            return Err(invalid("grid.columns_per_page", "must be >= 1"));
        }
        if grid.rows_per_page == 0 {
            return Err(invalid("grid.rows_per_page", "must be >= 1"));
        }

        // -- Lengths --
        positive("grid.cell_width", grid.cell_width)?;
        positive("grid.cell_height", grid.cell_height)?;
        finite("grid.margin_x", grid.margin_x)?;
        finite("grid.margin_y", grid.margin_y)?;
        positive("page.width_mm", self.page.width_mm)?;
        positive("page.height_mm", self.page.height_mm)?;

        // -- Barcode --
        positive("barcode.module_height_mm", self.barcode.module_height_mm)?;
        positive("barcode.module_width_mm", self.barcode.module_width_mm)?;
        non_negative("barcode.quiet_zone_mm", self.barcode.quiet_zone_mm)?;

        Ok(())
    }

    /// How far the grid runs past the right or bottom page edge, if it does.
    ///
    /// Overflowing cells are still drawn and get clipped by the page.
    pub fn grid_overflow(&self) -> Option<String> {
        let grid = &self.grid;
        let mut problems = Vec::new();
        let grid_right = grid.margin_x + f64::from(grid.columns_per_page) * grid.cell_width;
        if grid_right > self.page.width_mm + FIT_TOLERANCE_MM {
            problems.push(format!(
                "{} columns of {}mm from a {}mm margin need {grid_right}mm, page is {}mm wide",
                grid.columns_per_page, grid.cell_width, grid.margin_x, self.page.width_mm
            ));
        }
        let grid_bottom = grid.margin_y + f64::from(grid.rows_per_page) * grid.cell_height;
        if grid_bottom > self.page.height_mm + FIT_TOLERANCE_MM {
            problems.push(format!(
                "{} rows of {}mm from a {}mm margin need {grid_bottom}mm, page is {}mm tall",
                grid.rows_per_page, grid.cell_height, grid.margin_y, self.page.height_mm
            ));
        }
        if problems.is_empty() {
            None
        } else {
            Some(problems.join("; "))
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ProfileError {
    ProfileError::InvalidField {
        field: field.into(),
        reason: reason.into(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ProfileError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, format!("{value} must be a finite number > 0")));
    }
    Ok(())
}

fn finite(field: &str, value: f64) -> Result<(), ProfileError> {
    if !value.is_finite() {
        return Err(invalid(field, format!("{value} must be a finite number")));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<(), ProfileError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, format!("{value} must be a finite number >= 0")));
    }
    Ok(())
}

/// Load and validate a [`SheetProfile`] from a JSON string.
///
/// Missing fields take their defaults; see [`SheetProfile::validate`] for the
/// checks applied afterwards.
pub fn load_profile_from_str(s: &str) -> Result<SheetProfile, ProfileError> {
    let profile: SheetProfile = serde_json::from_str(s)?;
    profile.validate()?;
    Ok(profile)
}
