//! Advance widths of the two base-14 fonts used on labels.
//!
//! Values are the Adobe core-font metrics in 1/1000 em for the printable
//! ASCII range, indexed from the space character.

use sticker_sheet_core::FontStyle;

/// Width used for bytes outside the tabled range.
pub(crate) const FALLBACK_WIDTH: u16 = 556;

/// Helvetica, 0x20..=0x7E.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold, 0x20..=0x7E.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// PDF base font name for `style`.
pub(crate) fn base_font(style: FontStyle) -> &'static str {
    match style {
        FontStyle::Regular => "Helvetica",
        FontStyle::Bold => "Helvetica-Bold",
    }
}

/// Advance width of one WinAnsi byte, in 1/1000 em.
pub(crate) fn glyph_width(style: FontStyle, byte: u8) -> u16 {
    let table = match style {
        FontStyle::Regular => &HELVETICA,
        FontStyle::Bold => &HELVETICA_BOLD,
    };
    byte.checked_sub(b' ')
        .and_then(|i| table.get(usize::from(i)))
        .copied()
        .unwrap_or(FALLBACK_WIDTH)
}

/// Width of `bytes` set at `size_pt`, in points.
pub(crate) fn text_width(style: FontStyle, bytes: &[u8], size_pt: f64) -> f64 {
    let units: u32 = bytes.iter().map(|&b| u32::from(glyph_width(style, b))).sum();
    f64::from(units) * size_pt / 1000.0
}
