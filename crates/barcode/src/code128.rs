//! Code 128 encoder.
//!
//! Printable ASCII is encoded in code set B. A payload made only of digits,
//! of even length and at least four long, is packed two digits per symbol in
//! code set C instead.

use sticker_sheet_core::barcode::{BarcodeEncoder, BarcodeImage, EncodeOptions};
use sticker_sheet_core::error::EncodingFailure;

use crate::patterns::{PATTERNS, START_B, START_C, STOP, STOP_MODULES, SYMBOL_MODULES};

/// Code set a symbol sequence starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSet {
    /// ASCII 0x20–0x7E, one character per symbol.
    B,
    /// Digit pairs 00–99, two characters per symbol.
    C,
}

impl CodeSet {
    /// The code set used for `text`.
    pub fn for_payload(text: &str) -> Self {
        if text.len() >= 4 && text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_digit()) {
            CodeSet::C
        } else {
            CodeSet::B
        }
    }

    fn start(self) -> u8 {
        match self {
            CodeSet::B => START_B,
            CodeSet::C => START_C,
        }
    }
}

/// Code 128 barcode encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code128Encoder;

impl Code128Encoder {
    /// Symbol values for `text`: start, data, check. The stop pattern is not
    /// a value and is left out.
    pub fn symbols(text: &str) -> Result<Vec<u8>, EncodingFailure> {
        if text.is_empty() {
            return Err(EncodingFailure::Empty);
        }
        if let Some((position, ch)) = text
            .chars()
            .enumerate()
            .find(|&(_, c)| !(' '..='~').contains(&c))
        {
            return Err(EncodingFailure::UnsupportedChar { ch, position });
        }

        let set = CodeSet::for_payload(text);
        let mut symbols = vec![set.start()];
        match set {
            CodeSet::B => symbols.extend(text.bytes().map(|b| b - b' ')),
            CodeSet::C => symbols.extend(
                text.as_bytes()
                    .chunks(2)
                    .map(|pair| (pair[0] - b'0') * 10 + (pair[1] - b'0')),
            ),
        }
        symbols.push(check_symbol(&symbols));
        Ok(symbols)
    }

    /// Module pattern for `text`, `true` = bar, stop pattern included.
    pub fn modules(text: &str) -> Result<Vec<bool>, EncodingFailure> {
        let symbols = Self::symbols(text)?;
        let mut modules = Vec::with_capacity(symbols.len() * SYMBOL_MODULES + STOP_MODULES);
        for &symbol in &symbols {
            push_pattern(&mut modules, PATTERNS[usize::from(symbol)], SYMBOL_MODULES);
        }
        push_pattern(&mut modules, STOP, STOP_MODULES);
        Ok(modules)
    }
}

impl BarcodeEncoder for Code128Encoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<BarcodeImage, EncodingFailure> {
        let modules = Self::modules(text)?;
        BarcodeImage::from_modules(&modules, options)
    }
}

/// Modulo-103 weighted sum; the start symbol has weight 1, as does the first
/// data symbol.
fn check_symbol(symbols: &[u8]) -> u8 {
    let sum = symbols
        .iter()
        .enumerate()
        .map(|(i, &s)| u32::from(s) * (i as u32).max(1))
        .sum::<u32>();
    (sum % 103) as u8
}

fn push_pattern(out: &mut Vec<bool>, pattern: u16, width: usize) {
    out.extend((0..width).rev().map(|bit| pattern & (1 << bit) != 0));
}
