//! Batch pipeline: records in, committed labels and a [`BatchResult`] out.
//!
//! Each record is handled in isolation. A record that cannot be encoded or
//! drawn is listed in [`BatchResult::skipped`] and leaves both the cursor and
//! the document exactly as they were, so the next record takes its cell.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use serde::Serialize;
use sticker_sheet_diagnostics::{Diagnostic, codes};
use sticker_sheet_profile::{GridConfig, SheetProfile};

use crate::barcode::{BarcodeAdapter, BarcodeEncoder, EncodeOptions};
use crate::compose::{LabelLayout, LabelText, compose_with_layout};
use crate::document::DocumentWriter;
use crate::error::{RecordFailure, SheetError};
use crate::grid::GridCursor;
use crate::record::{RawRecord, SanitizedRecord};
use crate::sanitize::sanitize_record;

// ── Result types ────────────────────────────────────────────────────────

/// Why a record was left off the sheet.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The barcode encoder rejected the code.
    EncodingFailure,
    /// The label could not be drawn.
    RenderFailure,
}

impl SkipReason {
    /// Diagnostic code for this reason.
    pub fn code(self) -> &'static str {
        match self {
            SkipReason::EncodingFailure => codes::BARCODE_REJECTED,
            SkipReason::RenderFailure => codes::RENDER_FAILED,
        }
    }

    fn of(failure: &RecordFailure) -> Self {
        match failure {
            RecordFailure::Encoding(_) => SkipReason::EncodingFailure,
            RecordFailure::Render(_) => SkipReason::RenderFailure,
        }
    }
}

/// One record that was not placed on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Zero-based position of the record in the input.
    pub index: usize,
    /// Failure category.
    pub reason: SkipReason,
    /// The code as it appeared in the input.
    pub raw_code: String,
    /// Human-readable failure detail.
    pub message: String,
}

impl SkippedRecord {
    /// Render this entry as a warning diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let context = BTreeMap::from([
            ("code".to_string(), self.raw_code.clone()),
            ("reason".to_string(), self.message.clone()),
        ]);
        Diagnostic::warn(
            self.reason.code(),
            format!("skipped code {:?}: {}", self.raw_code, self.message),
            Some(self.index),
        )
        .with_context(context)
    }
}

/// Summary of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// Labels drawn on the sheet.
    pub success_count: usize,
    /// Records that failed, in input order.
    pub skipped: Vec<SkippedRecord>,
    /// Pages the document holds.
    pub pages: u32,
    /// Records with an empty or missing code, passed over without a cell.
    pub blank_count: usize,
}

/// Where a successful label landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelPlacement {
    /// Zero-based cell index counted across pages.
    pub slot: usize,
    /// One-based page number.
    pub page: u32,
}

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Drawn at the given placement.
    Rendered(LabelPlacement),
    /// Passed over because its code is blank.
    Blank,
    /// Left off the sheet.
    Skipped(SkipReason),
}

/// Progress report handed to the `on_progress` callback after each record.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Records handled so far, this one included.
    pub processed: usize,
    /// Total records, when the input length is known up front.
    pub total: Option<usize>,
    /// Outcome of the record just handled.
    pub outcome: Outcome,
}

// ── Configuration ───────────────────────────────────────────────────────

/// Everything a batch needs besides the records and its collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Page grid.
    pub grid: GridConfig,
    /// Shop name and currency symbol.
    pub text: LabelText,
    /// Element positions within a label.
    pub layout: LabelLayout,
}

impl BatchConfig {
    /// Batch settings for `profile` with the default label layout.
    pub fn from_profile(profile: &SheetProfile) -> Self {
        Self {
            grid: profile.grid,
            text: LabelText::new(&profile.shop_name, &profile.currency_symbol),
            layout: LabelLayout::default(),
        }
    }
}

// ── Batch ───────────────────────────────────────────────────────────────

/// Lay `records` out on `document`, left to right, top to bottom, page by
/// page.
///
/// Blank records are counted and passed over. A failing record is listed in
/// the result and does not consume a cell. `on_progress` may return
/// [`ControlFlow::Break`] to stop before the remaining records.
///
/// # Panics
/// Panics if `config.grid` has zero columns or rows; validate the profile
/// first (as [`generate_sheet`] does).
pub fn run_batch<I, E, D, F>(
    records: I,
    config: &BatchConfig,
    barcodes: &BarcodeAdapter<E>,
    document: &mut D,
    mut on_progress: F,
) -> BatchResult
where
    I: IntoIterator<Item = RawRecord>,
    E: BarcodeEncoder,
    D: DocumentWriter,
    F: FnMut(BatchProgress) -> ControlFlow<()>,
{
    let records = records.into_iter();
    let total = match records.size_hint() {
        (lower, Some(upper)) if lower == upper => Some(upper),
        _ => None,
    };
    let mut cursor = GridCursor::new(config.grid);
    let mut result = BatchResult::default();

    for (index, raw) in records.enumerate() {
        let record = sanitize_record(&raw);
        let outcome = if record.is_blank {
            result.blank_count += 1;
            tracing::debug!(index, "blank code, row passed over");
            Outcome::Blank
        } else {
            match place_label(&record, config, &cursor, barcodes, document) {
                Ok(placement) => {
                    result.success_count += 1;
                    tracing::debug!(index, slot = placement.slot, page = placement.page, "label drawn");
                    cursor.advance();
                    Outcome::Rendered(placement)
                }
                Err(failure) => {
                    let reason = SkipReason::of(&failure);
                    tracing::warn!(index, code = %raw.code, reason = %failure, "record skipped");
                    result.skipped.push(SkippedRecord {
                        index,
                        reason,
                        raw_code: raw.code,
                        message: failure.to_string(),
                    });
                    Outcome::Skipped(reason)
                }
            }
        };

        let progress = BatchProgress {
            processed: index + 1,
            total,
            outcome,
        };
        if let ControlFlow::Break(()) = on_progress(progress) {
            tracing::info!(processed = index + 1, "batch stopped early");
            break;
        }
    }

    result.pages = document.page_count();
    tracing::info!(
        labels = result.success_count,
        skipped = result.skipped.len(),
        blank = result.blank_count,
        pages = result.pages,
        "batch finished"
    );
    result
}

fn place_label<E, D>(
    record: &SanitizedRecord,
    config: &BatchConfig,
    cursor: &GridCursor,
    barcodes: &BarcodeAdapter<E>,
    document: &mut D,
) -> Result<LabelPlacement, RecordFailure>
where
    E: BarcodeEncoder,
    D: DocumentWriter,
{
    let page = cursor.page();
    let geometry = cursor.current_geometry();
    barcodes.with_image(&record.code, |image| {
        let ops = compose_with_layout(record, geometry, &config.text, image, &config.layout);
        if document.page_count() < page {
            tracing::debug!(page, "allocating page");
        }
        document.commit(page, &ops)?;
        Ok(LabelPlacement {
            slot: cursor.slot_index(),
            page,
        })
    })
}

/// Validate `profile`, run the batch into `document` and serialize it.
pub fn generate_sheet<I, E, D, F>(
    records: I,
    profile: &SheetProfile,
    encoder: E,
    mut document: D,
    on_progress: F,
) -> Result<(BatchResult, Vec<u8>), SheetError>
where
    I: IntoIterator<Item = RawRecord>,
    E: BarcodeEncoder,
    D: DocumentWriter,
    F: FnMut(BatchProgress) -> ControlFlow<()>,
{
    profile.validate()?;
    if let Some(overflow) = profile.grid_overflow() {
        tracing::warn!(%overflow, "grid runs past the page edge");
    }
    let config = BatchConfig::from_profile(profile);
    let barcodes = BarcodeAdapter::new(encoder, EncodeOptions::from(profile.barcode));
    let result = run_batch(records, &config, &barcodes, &mut document, on_progress);
    let bytes = document.serialize().map_err(SheetError::Output)?;
    Ok((result, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::BarcodeImage;
    use crate::document::testing::RecordingWriter;
    use crate::error::EncodingFailure;

    /// Rejects any code containing `'!'`; otherwise one module per byte.
    struct Picky;

    impl BarcodeEncoder for Picky {
        fn encode(&self, text: &str, options: &EncodeOptions) -> Result<BarcodeImage, EncodingFailure> {
            if let Some(position) = text.find('!') {
                return Err(EncodingFailure::UnsupportedChar { ch: '!', position });
            }
            let modules: Vec<bool> = text.bytes().map(|b| b % 2 == 0).collect();
            BarcodeImage::from_modules(&modules, options)
        }
    }

    fn grid(columns: u32, rows: u32) -> GridConfig {
        GridConfig {
            columns_per_page: columns,
            rows_per_page: rows,
            ..Default::default()
        }
    }

    fn config(columns: u32, rows: u32) -> BatchConfig {
        BatchConfig {
            grid: grid(columns, rows),
            text: LabelText::new("My Store", "₹"),
            layout: LabelLayout::default(),
        }
    }

    fn records(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| RawRecord::new(format!("SKU{i:03}"), format!("Item {i}"), "10"))
            .collect()
    }

    struct Run {
        result: BatchResult,
        outcomes: Vec<Outcome>,
        writer: RecordingWriter,
    }

    fn run(records: Vec<RawRecord>, config: &BatchConfig) -> Run {
        let adapter = BarcodeAdapter::new(Picky, EncodeOptions::default());
        let mut writer = RecordingWriter::with_first_page();
        let mut outcomes = Vec::new();
        let result = run_batch(records, config, &adapter, &mut writer, |p| {
            outcomes.push(p.outcome);
            ControlFlow::Continue(())
        });
        Run {
            result,
            outcomes,
            writer,
        }
    }

    fn placements(outcomes: &[Outcome]) -> Vec<LabelPlacement> {
        outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Rendered(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn page_count_is_ceiling_of_labels_over_capacity() {
        for (n, columns, rows, expected) in [
            (1, 3, 8, 1),
            (23, 3, 8, 1),
            (24, 3, 8, 1),
            (25, 3, 8, 2),
            (48, 3, 8, 2),
            (49, 3, 8, 3),
            (7, 2, 2, 2),
            (5, 1, 1, 5),
        ] {
            let run = run(records(n), &config(columns, rows));
            assert_eq!(run.result.success_count, n);
            assert_eq!(run.result.pages, expected, "{n} labels on {columns}x{rows}");
            assert_eq!(run.writer.page_count(), expected);
        }
    }

    #[test]
    fn labels_fill_cells_in_reading_order() {
        let run = run(records(30), &config(3, 8));
        for (k, placement) in placements(&run.outcomes).iter().enumerate() {
            assert_eq!(placement.slot, k);
            assert_eq!(placement.page as usize, 1 + k / 24);
        }
    }

    #[test]
    fn twenty_fourth_label_fills_page_without_trailing_page() {
        let run = run(records(24), &config(3, 8));
        assert_eq!(run.result.pages, 1);
        assert_eq!(run.writer.pages.len(), 1);
    }

    #[test]
    fn twenty_fifth_label_starts_page_two_at_origin() {
        let run = run(records(25), &config(3, 8));
        assert_eq!(run.result.pages, 2);
        let last = placements(&run.outcomes)[24];
        assert_eq!(last, LabelPlacement { slot: 24, page: 2 });
        // Border of the only label on page 2 sits in the top-left cell.
        assert_eq!(run.writer.pages[1][0], "rect 7 10 64 34");
        assert_eq!(run.writer.pages[1].len(), 6);
    }

    #[test]
    fn blank_codes_passed_over_silently() {
        let mut input = records(9);
        input.insert(4, RawRecord::new("nan", "ghost", "0"));
        let run = run(input, &config(3, 8));
        assert_eq!(run.result.success_count, 9);
        assert_eq!(run.result.blank_count, 1);
        assert!(run.result.skipped.is_empty());
        assert_eq!(run.outcomes[4], Outcome::Blank);
        // No cell consumed: the nine labels occupy slots 0..9.
        let slots: Vec<usize> = placements(&run.outcomes).iter().map(|p| p.slot).collect();
        assert_eq!(slots, (0..9).collect::<Vec<_>>());
        let drawn = String::from_utf8(run.writer.serialize().unwrap()).unwrap();
        assert!(!drawn.contains("ghost"));
    }

    #[test]
    fn rejected_code_does_not_consume_a_cell() {
        let mut input = records(10);
        input[3].code = "BAD!3".into();
        let run = run(input, &config(3, 8));
        assert_eq!(run.result.success_count, 9);
        assert_eq!(
            run.result.skipped,
            vec![SkippedRecord {
                index: 3,
                reason: SkipReason::EncodingFailure,
                raw_code: "BAD!3".into(),
                message: "unsupported character '!' at position 3".into(),
            }]
        );
        assert_eq!(run.outcomes[3], Outcome::Skipped(SkipReason::EncodingFailure));
        let placed = placements(&run.outcomes);
        // Record 4 takes the cell record 3 would have used.
        assert_eq!(placed[3].slot, 3);
        assert_eq!(placed[8], LabelPlacement { slot: 8, page: 1 });
    }

    #[test]
    fn render_failure_rolls_back_label() {
        let config = config(3, 8);
        let adapter = BarcodeAdapter::new(Picky, EncodeOptions::default());
        let mut writer = RecordingWriter::with_first_page();
        writer.reject_text = Some("Cursed".into());
        let input = vec![
            RawRecord::new("A1", "Fine", "1"),
            RawRecord::new("A2", "Cursed", "1"),
            RawRecord::new("A3", "Fine too", "1"),
        ];
        let result = run_batch(input, &config, &adapter, &mut writer, |_| {
            ControlFlow::Continue(())
        });
        assert_eq!(result.success_count, 2);
        assert_eq!(result.skipped[0].index, 1);
        assert_eq!(result.skipped[0].reason, SkipReason::RenderFailure);
        // Two labels of six instructions each, nothing from the failed one.
        assert_eq!(writer.pages[0].len(), 12);
        assert_eq!(writer.pages[0][6], "rect 71 10 64 34");
    }

    #[test]
    fn failure_on_fresh_page_releases_it() {
        let mut input = records(3);
        input[2].code = "X!".into();
        let run = run(input, &config(1, 2));
        assert_eq!(run.result.pages, 1);
        assert_eq!(run.result.skipped.len(), 1);
    }

    #[test]
    fn empty_input_yields_single_page() {
        let run = run(Vec::new(), &config(3, 8));
        assert_eq!(run.result, BatchResult { pages: 1, ..Default::default() });
    }

    #[test]
    fn progress_reports_every_record() {
        let adapter = BarcodeAdapter::new(Picky, EncodeOptions::default());
        let mut writer = RecordingWriter::with_first_page();
        let mut reports = Vec::new();
        let mut input = records(3);
        input[1].code = String::new();
        run_batch(input, &config(3, 8), &adapter, &mut writer, |p| {
            reports.push(p);
            ControlFlow::Continue(())
        });
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[1].outcome, Outcome::Blank);
        assert!(reports.iter().all(|p| p.total == Some(3)));
        assert_eq!(
            reports.iter().map(|p| p.processed).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn progress_break_stops_batch() {
        let adapter = BarcodeAdapter::new(Picky, EncodeOptions::default());
        let mut writer = RecordingWriter::with_first_page();
        let result = run_batch(records(10), &config(3, 8), &adapter, &mut writer, |p| {
            if p.processed == 4 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(result.success_count, 4);
    }

    #[test]
    fn batch_is_deterministic() {
        let mut input = records(30);
        input[7].code = "no!".into();
        input[11].code = "NaN".into();
        let a = run(input.clone(), &config(3, 8));
        let b = run(input, &config(3, 8));
        assert_eq!(a.result, b.result);
        assert_eq!(a.writer.serialize().unwrap(), b.writer.serialize().unwrap());
    }

    #[test]
    fn skipped_record_diagnostic() {
        let skipped = SkippedRecord {
            index: 3,
            reason: SkipReason::EncodingFailure,
            raw_code: "BAD!".into(),
            message: "unsupported character '!' at position 3".into(),
        };
        let diag = skipped.to_diagnostic();
        assert_eq!(diag.id, "STK2001");
        assert_eq!(diag.row, Some(3));
        let ctx = diag.context.unwrap();
        assert_eq!(ctx["code"], "BAD!");
        assert_eq!(SkipReason::RenderFailure.code(), "STK2002");
    }

    #[test]
    fn generate_sheet_rejects_invalid_profile() {
        let mut profile = SheetProfile::default();
        profile.grid.columns_per_page = 0;
        let err = generate_sheet(
            records(1),
            &profile,
            Picky,
            RecordingWriter::with_first_page(),
            |_| ControlFlow::Continue(()),
        )
        .unwrap_err();
        assert_eq!(err.code(), "STK1002");
    }

    #[test]
    fn generate_sheet_serializes_document() {
        let (result, bytes) = generate_sheet(
            records(2),
            &SheetProfile::default(),
            Picky,
            RecordingWriter::with_first_page(),
            |_| ControlFlow::Continue(()),
        )
        .unwrap();
        assert_eq!(result.success_count, 2);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("text MRP: Rs. 10"));
        assert!(text.contains("text My Store"));
    }

    #[test]
    fn generate_sheet_draws_grid_past_page_edge() {
        let mut profile = SheetProfile::default();
        profile.grid.columns_per_page = 4;
        profile.grid.margin_x = -2.0;
        let (result, bytes) = generate_sheet(
            records(5),
            &profile,
            Picky,
            RecordingWriter::with_first_page(),
            |_| ControlFlow::Continue(()),
        )
        .unwrap();
        assert_eq!(result.success_count, 5);
        assert_eq!(result.pages, 1);
        let text = String::from_utf8(bytes).unwrap();
        let rects: Vec<&str> = text.lines().filter(|l| l.starts_with("rect ")).collect();
        assert_eq!(
            rects,
            vec![
                "rect -2 10 64 34",
                "rect 62 10 64 34",
                "rect 126 10 64 34",
                "rect 190 10 64 34",
                "rect -2 44 64 34",
            ]
        );
    }
}
