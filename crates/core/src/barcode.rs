//! Barcode collaborator seam.
//!
//! [`BarcodeEncoder`] is implemented by a symbology crate; the pipeline only
//! talks to it through [`BarcodeAdapter`], which keeps the rendered image in
//! memory and scoped to a single record.

use image::{GrayImage, Luma};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use sticker_sheet_profile::BarcodeSettings;

use crate::error::{EncodingFailure, RecordFailure, RenderFailure};

/// Raster options passed to the encoder. Lengths in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeOptions {
    /// Bar height.
    pub module_height_mm: f64,
    /// Blank margin on each side of the symbol.
    pub quiet_zone_mm: f64,
    /// Width of the narrowest bar.
    pub module_width_mm: f64,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        BarcodeSettings::default().into()
    }
}

impl From<BarcodeSettings> for EncodeOptions {
    fn from(s: BarcodeSettings) -> Self {
        Self {
            module_height_mm: s.module_height_mm,
            quiet_zone_mm: s.quiet_zone_mm,
            module_width_mm: s.module_width_mm,
        }
    }
}

/// An in-memory 8-bit grey barcode raster: black bars on white.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeImage {
    raster: GrayImage,
}

impl BarcodeImage {
    /// Wrap an existing raster.
    pub fn new(raster: GrayImage) -> Self {
        Self { raster }
    }

    /// Rasterise a one-dimensional module pattern (`true` = bar) at one pixel
    /// per module, adding the quiet zone on both sides.
    pub fn from_modules(modules: &[bool], options: &EncodeOptions) -> Result<Self, EncodingFailure> {
        if modules.is_empty() {
            return Err(EncodingFailure::Malformed("no modules to rasterise".into()));
        }
        if !is_positive(options.module_width_mm) || !is_positive(options.module_height_mm) {
            return Err(EncodingFailure::Malformed(format!(
                "module size {}x{}mm is not positive",
                options.module_width_mm, options.module_height_mm
            )));
        }
        let quiet = (options.quiet_zone_mm.max(0.0) / options.module_width_mm).round() as u32;
        let rows = ((options.module_height_mm / options.module_width_mm).round() as u32).max(1);
        let width = modules.len() as u32 + 2 * quiet;
        let raster = GrayImage::from_fn(width, rows, |x, _| {
            let bar = x
                .checked_sub(quiet)
                .and_then(|i| modules.get(i as usize))
                .copied()
                .unwrap_or(false);
            if bar { Luma([0]) } else { Luma([255]) }
        });
        Ok(Self { raster })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Row-major grey samples, one byte per pixel.
    pub fn pixels(&self) -> &[u8] {
        self.raster.as_raw()
    }

    /// `true` when the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.raster.width() == 0 || self.raster.height() == 0
    }

    /// The underlying raster.
    pub fn as_gray(&self) -> &GrayImage {
        &self.raster
    }
}

impl Serialize for BarcodeImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("BarcodeImage", 3)?;
        s.serialize_field("width", &self.width())?;
        s.serialize_field("height", &self.height())?;
        s.serialize_field("pixels", self.pixels())?;
        s.end()
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// A barcode symbology: turns a text payload into a raster or rejects it.
pub trait BarcodeEncoder {
    /// Encode `text` into an image.
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<BarcodeImage, EncodingFailure>;
}

impl<E: BarcodeEncoder + ?Sized> BarcodeEncoder for &E {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<BarcodeImage, EncodingFailure> {
        (**self).encode(text, options)
    }
}

impl<E: BarcodeEncoder + ?Sized> BarcodeEncoder for Box<E> {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<BarcodeImage, EncodingFailure> {
        (**self).encode(text, options)
    }
}

/// Owns the encoder and the raster options for one batch.
#[derive(Debug, Clone)]
pub struct BarcodeAdapter<E> {
    encoder: E,
    options: EncodeOptions,
}

impl<E: BarcodeEncoder> BarcodeAdapter<E> {
    /// Wrap `encoder` with fixed raster options.
    pub fn new(encoder: E, options: EncodeOptions) -> Self {
        Self { encoder, options }
    }

    /// Raster options handed to every encode call.
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encode `code` and lend the image to `use_image`.
    ///
    /// The image is dropped before this returns, whichever way `use_image`
    /// exits; `use_image` is not called at all when encoding fails.
    pub fn with_image<R, F>(&self, code: &str, use_image: F) -> Result<R, RecordFailure>
    where
        F: FnOnce(&BarcodeImage) -> Result<R, RenderFailure>,
    {
        let image = self.encoder.encode(code, &self.options)?;
        if image.is_empty() {
            return Err(RenderFailure::EmptyImage.into());
        }
        Ok(use_image(&image)?)
    }
}
