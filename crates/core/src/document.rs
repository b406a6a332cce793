//! Document writer seam.
//!
//! A writer owns the pages of one output document. The batch only ever calls
//! [`DocumentWriter::commit`], which applies a whole label or nothing.

use crate::barcode::BarcodeImage;
use crate::compose::{DrawOp, TextCell};
use crate::error::RenderFailure;

/// A paged output document drawn in millimetres from the top-left corner of
/// each page. Drawing always targets the last page.
pub trait DocumentWriter {
    /// Opaque snapshot of the document state, restored by
    /// [`rollback`](Self::rollback).
    type Checkpoint;

    /// Number of pages allocated so far.
    fn page_count(&self) -> u32;

    /// Append an empty page and make it current.
    fn new_page(&mut self);

    /// Stroke a rectangle outline.
    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        line_width: f64,
    ) -> Result<(), RenderFailure>;

    /// Draw one line of text inside its cell.
    fn text_cell(&mut self, cell: &TextCell) -> Result<(), RenderFailure>;

    /// Draw `image` scaled into the given box.
    fn image(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: &BarcodeImage,
    ) -> Result<(), RenderFailure>;

    /// Snapshot the current state.
    fn checkpoint(&self) -> Self::Checkpoint;

    /// Discard everything added since `checkpoint` was taken, pages included.
    fn rollback(&mut self, checkpoint: Self::Checkpoint);

    /// Finish the document and return its bytes.
    fn serialize(&self) -> Result<Vec<u8>, RenderFailure>;

    /// Apply one draw instruction.
    fn draw(&mut self, op: &DrawOp<'_>) -> Result<(), RenderFailure> {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                line_width,
            } => self.rect(*x, *y, *width, *height, *line_width),
            DrawOp::Text(cell) => self.text_cell(cell),
            DrawOp::Image {
                x,
                y,
                width,
                height,
                image,
            } => self.image(*x, *y, *width, *height, image),
        }
    }

    /// Draw `ops` on page `page` (one-based), allocating pages up to it.
    ///
    /// All-or-nothing: on the first failing instruction the document is
    /// rolled back to its state before the call, so neither partial label
    /// content nor a freshly allocated page survives.
    fn commit(&mut self, page: u32, ops: &[DrawOp<'_>]) -> Result<(), RenderFailure> {
        let checkpoint = self.checkpoint();
        while self.page_count() < page {
            self.new_page();
        }
        for op in ops {
            if let Err(err) = self.draw(op) {
                self.rollback(checkpoint);
                return Err(err);
            }
        }
        Ok(())
    }
}
