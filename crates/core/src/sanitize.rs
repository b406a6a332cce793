//! Text cleanup for the single-byte page encoding.
//!
//! Labels are rendered with PDF base-14 fonts in WinAnsi encoding, the PDF
//! name for Windows-1252. Anything that encoding cannot carry is dropped, not
//! transliterated and not replaced by a placeholder. The one deliberate
//! substitution is the Indian rupee sign, which becomes `"Rs. "`.

use encoding_rs::WINDOWS_1252;

use crate::record::{MISSING_VALUE_MARKER, RawRecord, SanitizedRecord};

/// The currency glyph that gets spelled out.
pub const RUPEE_SIGN: char = '₹';

/// Replacement text for [`RUPEE_SIGN`].
pub const RUPEE_REPLACEMENT: &str = "Rs. ";

/// Maximum product-name length, in characters, after sanitization.
pub const NAME_MAX_CHARS: usize = 25;

/// Map `text` to its renderable form.
///
/// Replaces every [`RUPEE_SIGN`] with [`RUPEE_REPLACEMENT`] and drops every
/// character that is a control character or has no Windows-1252 byte.
/// Idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == RUPEE_SIGN {
            out.push_str(RUPEE_REPLACEMENT);
        } else if is_renderable(c) {
            out.push(c);
        }
    }
    out
}

/// [`sanitize`] for optional input; `None` yields an empty string.
pub fn sanitize_opt(text: Option<&str>) -> String {
    text.map(sanitize).unwrap_or_default()
}

/// [`sanitize`] followed by trimming surrounding whitespace.
///
/// Used for every field printed on a label, including the shop name and the
/// currency symbol.
pub fn sanitize_field(text: &str) -> String {
    let cleaned = sanitize(text);
    let trimmed = cleaned.trim();
    if trimmed.len() == cleaned.len() {
        cleaned
    } else {
        trimmed.to_string()
    }
}

/// Whether a single character survives sanitization.
pub fn is_renderable(c: char) -> bool {
    if c.is_control() {
        return false;
    }
    if c.is_ascii() {
        return true;
    }
    let mut buf = [0u8; 4];
    let (_, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
    !had_errors
}

/// Encode sanitized text into WinAnsi bytes.
///
/// Returns `None` when `text` holds a character [`sanitize`] would have
/// dropped.
pub fn encode_winansi(text: &str) -> Option<Vec<u8>> {
    if !text.chars().all(is_renderable) {
        return None;
    }
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if had_errors {
        None
    } else {
        Some(bytes.into_owned())
    }
}

/// Derive the render-ready form of one input row.
///
/// Every field is sanitized and trimmed; the name is then cut to its first
/// [`NAME_MAX_CHARS`] characters, so truncation counts cleaned characters.
pub fn sanitize_record(raw: &RawRecord) -> SanitizedRecord {
    let code = sanitize_field(&raw.code);
    let name = truncate_chars(&sanitize_field(&raw.name), NAME_MAX_CHARS);
    let price = sanitize_field(&raw.price);
    let is_blank = code.is_empty() || code.eq_ignore_ascii_case(MISSING_VALUE_MARKER);
    SanitizedRecord {
        code,
        name,
        price,
        is_blank,
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── sanitize ────────────────────────────────────────────────────────

    #[test]
    fn rupee_sign_spelled_out() {
        assert_eq!(sanitize("₹"), "Rs. ");
        assert_eq!(sanitize("₹120"), "Rs. 120");
        assert_eq!(sanitize("₹1 or ₹2"), "Rs. 1 or Rs. 2");
    }

    #[test]
    fn latin1_text_kept() {
        assert_eq!(sanitize("Café crème"), "Café crème");
        assert_eq!(sanitize("Größe 5½"), "Größe 5½");
    }

    #[test]
    fn windows_1252_extras_kept() {
        // € and curly quotes live in the 0x80–0x9F block of Windows-1252.
        assert_eq!(sanitize("€5 “deal”"), "€5 “deal”");
    }

    #[test]
    fn unrepresentable_characters_dropped() {
        assert_eq!(sanitize("દુકાન Shop"), " Shop");
        assert_eq!(sanitize("Tea 🍵"), "Tea ");
        assert_eq!(sanitize("北京"), "");
    }

    #[test]
    fn control_characters_dropped() {
        assert_eq!(sanitize("a\tb\nc\u{7f}d\u{85}e"), "abcde");
    }

    #[test]
    fn empty_and_missing_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize_opt(None), "");
        assert_eq!(sanitize_opt(Some("₹")), "Rs. ");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "",
            "plain",
            "₹99",
            "દુકાન ₹ Store",
            "mixed 🍵 € “q” \t tabs",
            "Rs. already",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn sanitize_field_trims() {
        assert_eq!(sanitize_field("  Soap  "), "Soap");
        assert_eq!(sanitize_field("₹"), "Rs.");
        assert_eq!(sanitize_field("દુકાન"), "");
    }

    // ── encode_winansi ──────────────────────────────────────────────────

    #[test]
    fn encode_winansi_bytes() {
        assert_eq!(encode_winansi("Abc").unwrap(), b"Abc");
        assert_eq!(encode_winansi("é€").unwrap(), vec![0xE9, 0x80]);
    }

    #[test]
    fn encode_winansi_rejects_unsanitized_text() {
        assert!(encode_winansi("₹").is_none());
        assert!(encode_winansi("a\nb").is_none());
    }

    // ── sanitize_record ─────────────────────────────────────────────────

    #[test]
    fn record_fields_cleaned() {
        let rec = sanitize_record(&RawRecord::new(" SKU-1 ", " Basmati Rice ", " ₹120 "));
        assert_eq!(rec.code, "SKU-1");
        assert_eq!(rec.name, "Basmati Rice");
        assert_eq!(rec.price, "Rs. 120");
        assert!(!rec.is_blank);
    }

    #[test]
    fn long_name_truncated_to_25_chars() {
        let rec = sanitize_record(&RawRecord::new(
            "1",
            "Extra Long Premium Quality Basmati Rice 5kg",
            "1",
        ));
        assert_eq!(rec.name.chars().count(), NAME_MAX_CHARS);
        assert_eq!(rec.name, "Extra Long Premium Qualit");
    }

    #[test]
    fn truncation_counts_cleaned_characters() {
        // 10 Gujarati characters are dropped first, leaving 30 ASCII letters.
        let raw = format!("{}{}", "દ".repeat(10), "abcdefghijklmnopqrstuvwxyzABCD");
        let rec = sanitize_record(&RawRecord::new("1", raw, "1"));
        assert_eq!(rec.name, "abcdefghijklmnopqrstuvwxy");
    }

    #[test]
    fn truncation_is_character_based() {
        let rec = sanitize_record(&RawRecord::new("1", "é".repeat(30), "1"));
        assert_eq!(rec.name, "é".repeat(25));
    }

    #[test]
    fn blank_codes_detected() {
        assert!(sanitize_record(&RawRecord::new("", "x", "1")).is_blank);
        assert!(sanitize_record(&RawRecord::new("   ", "x", "1")).is_blank);
        assert!(sanitize_record(&RawRecord::new("nan", "x", "1")).is_blank);
        assert!(sanitize_record(&RawRecord::new("NaN", "x", "1")).is_blank);
        // A code made only of unrenderable characters is blank after cleanup.
        assert!(sanitize_record(&RawRecord::new("દુ", "x", "1")).is_blank);
        assert!(!sanitize_record(&RawRecord::new("nano", "x", "1")).is_blank);
    }
}
