//! In-memory PDF document that labels are drawn onto.
//!
//! Drawing calls are buffered per page as [`PageOp`]s in PDF page space.
//! Nothing is encoded until [`DocumentWriter::serialize`], so undoing a
//! failed label is a plain truncation of the buffers.

use sticker_sheet_core::{
    BarcodeImage, DocumentWriter, FontStyle, PageSize, RenderFailure, TextCell, encode_winansi,
};

use crate::metrics::text_width;
use crate::output;

/// Points per millimetre.
pub(crate) const PT_PER_MM: f64 = 72.0 / 25.4;

/// Baseline offset below the vertical cell centre, as a fraction of the font
/// size.
const BASELINE_FACTOR: f64 = 0.3;

/// A grey raster copied into the document for one image placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EmbeddedImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) pixels: Vec<u8>,
}

/// One drawing operation in points, origin at the bottom-left of the page.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PageOp {
    /// Stroked rectangle outline.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        line_width: f64,
    },
    /// WinAnsi text starting at its baseline origin.
    Text {
        style: FontStyle,
        size: f64,
        x: f64,
        y: f64,
        bytes: Vec<u8>,
    },
    /// `Page::images[image]` scaled into a box.
    Image {
        image: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// One page: buffered operations and the images they place.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Page {
    pub(crate) ops: Vec<PageOp>,
    pub(crate) images: Vec<EmbeddedImage>,
}

/// State captured by [`DocumentWriter::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfCheckpoint {
    pages: usize,
    ops: usize,
    images: usize,
}

/// A PDF document of equally sized pages, built up in memory.
///
/// Coordinates arrive in millimetres from the top-left corner and are
/// stored in points from the bottom-left, as PDF expects.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfDocument {
    size: PageSize,
    pages: Vec<Page>,
}

impl PdfDocument {
    /// A document holding one empty page of `size`.
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: vec![Page::default()],
        }
    }

    /// Page size in millimetres.
    pub fn page_size(&self) -> PageSize {
        self.size
    }

    pub(crate) fn pages(&self) -> &[Page] {
        &self.pages
    }

    fn page_height_pt(&self) -> f64 {
        self.size.height_mm * PT_PER_MM
    }

    fn current(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

impl DocumentWriter for PdfDocument {
    type Checkpoint = PdfCheckpoint;

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
    }

    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        line_width: f64,
    ) -> Result<(), RenderFailure> {
        check_box("rect", x, y, width, height)?;
        if !(line_width.is_finite() && line_width >= 0.0) {
            return Err(RenderFailure::InvalidGeometry {
                element: "rect",
                details: format!("line width {line_width} is negative or not finite"),
            });
        }
        let page_h = self.page_height_pt();
        self.current().ops.push(PageOp::Rect {
            x: x * PT_PER_MM,
            y: page_h - (y + height) * PT_PER_MM,
            width: width * PT_PER_MM,
            height: height * PT_PER_MM,
            line_width: line_width * PT_PER_MM,
        });
        Ok(())
    }

    fn text_cell(&mut self, cell: &TextCell) -> Result<(), RenderFailure> {
        check_box("text", cell.x, cell.y, cell.width, cell.height)?;
        if !(cell.size_pt.is_finite() && cell.size_pt > 0.0) {
            return Err(RenderFailure::InvalidGeometry {
                element: "text",
                details: format!("font size {} is not positive", cell.size_pt),
            });
        }
        let bytes = encode_winansi(&cell.text).ok_or_else(|| RenderFailure::UnencodableText {
            text: cell.text.clone(),
        })?;
        if bytes.is_empty() {
            return Ok(());
        }

        let width_pt = text_width(cell.style, &bytes, cell.size_pt);
        let x = cell.x * PT_PER_MM + (cell.width * PT_PER_MM - width_pt) / 2.0;
        let size_mm = cell.size_pt / PT_PER_MM;
        let baseline_mm = cell.y + cell.height / 2.0 + BASELINE_FACTOR * size_mm;
        let y = self.page_height_pt() - baseline_mm * PT_PER_MM;

        self.current().ops.push(PageOp::Text {
            style: cell.style,
            size: cell.size_pt,
            x,
            y,
            bytes,
        });
        Ok(())
    }

    fn image(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: &BarcodeImage,
    ) -> Result<(), RenderFailure> {
        if image.is_empty() {
            return Err(RenderFailure::EmptyImage);
        }
        check_box("image", x, y, width, height)?;
        let page_h = self.page_height_pt();
        let page = self.current();
        page.images.push(EmbeddedImage {
            width: image.width(),
            height: image.height(),
            pixels: image.pixels().to_vec(),
        });
        page.ops.push(PageOp::Image {
            image: page.images.len() - 1,
            x: x * PT_PER_MM,
            y: page_h - (y + height) * PT_PER_MM,
            width: width * PT_PER_MM,
            height: height * PT_PER_MM,
        });
        Ok(())
    }

    fn checkpoint(&self) -> PdfCheckpoint {
        let last = self.pages.last();
        PdfCheckpoint {
            pages: self.pages.len(),
            ops: last.map_or(0, |p| p.ops.len()),
            images: last.map_or(0, |p| p.images.len()),
        }
    }

    fn rollback(&mut self, checkpoint: PdfCheckpoint) {
        self.pages.truncate(checkpoint.pages);
        if let Some(page) = self.pages.last_mut() {
            page.ops.truncate(checkpoint.ops);
            page.images.truncate(checkpoint.images);
        }
    }

    fn serialize(&self) -> Result<Vec<u8>, RenderFailure> {
        output::write_pdf(self).map_err(|err| RenderFailure::Other(err.to_string()))
    }
}

/// Positions may fall outside the page; sizes must be positive.
fn check_box(
    element: &'static str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Result<(), RenderFailure> {
    for (what, value) in [("x", x), ("y", y)] {
        if !value.is_finite() {
            return Err(RenderFailure::InvalidGeometry {
                element,
                details: format!("{what} {value} is not finite"),
            });
        }
    }
    for (what, value) in [("width", width), ("height", height)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(RenderFailure::InvalidGeometry {
                element,
                details: format!("{what} {value} is not positive"),
            });
        }
    }
    Ok(())
}
