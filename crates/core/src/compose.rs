//! Label composition: one sticker cell as an ordered list of draw instructions.
//!
//! [`compose`] is a pure function of its arguments. It knows nothing about
//! the batch, the cursor or the document, so the same call renders a single
//! preview label as well as a cell in a full sheet.

use serde::Serialize;

use crate::barcode::BarcodeImage;
use crate::grid::LabelGeometry;
use crate::record::SanitizedRecord;
use crate::sanitize::sanitize_field;

/// Font weight. Both map to the Helvetica family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    /// Helvetica.
    Regular,
    /// Helvetica-Bold.
    Bold,
}

/// One line of text centred inside a rectangular cell. Lengths in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextCell {
    /// Left edge of the cell.
    pub x: f64,
    /// Top edge of the cell.
    pub y: f64,
    /// Cell width.
    pub width: f64,
    /// Cell height.
    pub height: f64,
    /// Sanitized text.
    pub text: String,
    /// Font weight.
    pub style: FontStyle,
    /// Font size in points.
    pub size_pt: f64,
}

/// A single drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp<'a> {
    /// Stroked rectangle outline.
    Rect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Stroke width.
        line_width: f64,
    },
    /// Text line.
    Text(TextCell),
    /// Raster image scaled into a box.
    Image {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Box width.
        width: f64,
        /// Box height.
        height: f64,
        /// The barcode raster, borrowed for the current record only.
        image: &'a BarcodeImage,
    },
}

/// Vertical band of a label holding one text line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBand {
    /// Distance from the top of the cell.
    pub offset: f64,
    /// Band height.
    pub height: f64,
    /// Font weight.
    pub style: FontStyle,
    /// Font size in points.
    pub size_pt: f64,
}

/// Fixed positions of the elements inside a sticker, relative to the cell's
/// top-left corner. Lengths in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLayout {
    /// Border stroke width.
    pub border_width: f64,
    /// Shop name line.
    pub shop: TextBand,
    /// Inset of the barcode from the left and right cell edges. Cells
    /// narrower than four insets use a quarter of their width instead.
    pub barcode_inset_x: f64,
    /// Distance of the barcode from the top of the cell.
    pub barcode_offset_y: f64,
    /// Barcode height.
    pub barcode_height: f64,
    /// Human-readable code line under the barcode.
    pub code: TextBand,
    /// Product name line.
    pub name: TextBand,
    /// Price line.
    pub price: TextBand,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            border_width: 0.1,
            shop: TextBand {
                offset: 2.0,
                height: 4.0,
                style: FontStyle::Bold,
                size_pt: 8.0,
            },
            barcode_inset_x: 5.0,
            barcode_offset_y: 7.0,
            barcode_height: 12.0,
            code: TextBand {
                offset: 19.0,
                height: 3.0,
                style: FontStyle::Regular,
                size_pt: 6.0,
            },
            name: TextBand {
                offset: 23.0,
                height: 4.0,
                style: FontStyle::Regular,
                size_pt: 7.0,
            },
            price: TextBand {
                offset: 27.0,
                height: 5.0,
                style: FontStyle::Bold,
                size_pt: 10.0,
            },
        }
    }
}

/// Per-run header text, sanitized once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelText {
    /// Shop name printed at the top of every label.
    pub shop_name: String,
    /// Currency symbol printed before the price.
    pub currency_symbol: String,
}

impl LabelText {
    /// Sanitize and store the shop name and currency symbol.
    pub fn new(shop_name: &str, currency_symbol: &str) -> Self {
        Self {
            shop_name: sanitize_field(shop_name),
            currency_symbol: sanitize_field(currency_symbol),
        }
    }

    /// The price line, `"MRP: {currency} {price}"`.
    ///
    /// An empty currency symbol is left out together with its separator.
    pub fn price_line(&self, price: &str) -> String {
        if self.currency_symbol.is_empty() {
            format!("MRP: {price}")
        } else {
            format!("MRP: {} {price}", self.currency_symbol)
        }
    }
}

/// Compose one label with the default [`LabelLayout`].
pub fn compose<'a>(
    record: &SanitizedRecord,
    geometry: LabelGeometry,
    text: &LabelText,
    barcode: &'a BarcodeImage,
) -> Vec<DrawOp<'a>> {
    compose_with_layout(record, geometry, text, barcode, &LabelLayout::default())
}

/// Compose one label: border, shop name, barcode, code, name, price, in that
/// order.
pub fn compose_with_layout<'a>(
    record: &SanitizedRecord,
    geometry: LabelGeometry,
    text: &LabelText,
    barcode: &'a BarcodeImage,
    layout: &LabelLayout,
) -> Vec<DrawOp<'a>> {
    let LabelGeometry {
        x,
        y,
        width,
        height,
    } = geometry;
    let line = |band: &TextBand, content: String| {
        DrawOp::Text(TextCell {
            x,
            y: y + band.offset,
            width,
            height: band.height,
            text: content,
            style: band.style,
            size_pt: band.size_pt,
        })
    };

    let inset = layout.barcode_inset_x.min(width / 4.0);

    vec![
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            line_width: layout.border_width,
        },
        line(&layout.shop, text.shop_name.clone()),
        DrawOp::Image {
            x: x + inset,
            y: y + layout.barcode_offset_y,
            width: width - 2.0 * inset,
            height: layout.barcode_height,
            image: barcode,
        },
        line(&layout.code, record.code.clone()),
        line(&layout.name, record.name.clone()),
        line(&layout.price, text.price_line(&record.price)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::EncodeOptions;
    use crate::record::RawRecord;
    use crate::sanitize::sanitize_record;

    fn geometry() -> LabelGeometry {
        LabelGeometry {
            x: 71.0,
            y: 44.0,
            width: 64.0,
            height: 34.0,
        }
    }

    fn barcode() -> BarcodeImage {
        BarcodeImage::from_modules(&[true, false, true, true], &EncodeOptions::default()).unwrap()
    }

    fn record() -> SanitizedRecord {
        sanitize_record(&RawRecord::new("8901234", "Basmati Rice 1kg", "120"))
    }

    fn texts(ops: &[DrawOp<'_>]) -> Vec<String> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text(cell) => Some(cell.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn elements_in_fixed_order() {
        let image = barcode();
        let ops = compose(&record(), geometry(), &LabelText::new("My Store", "₹"), &image);
        assert_eq!(ops.len(), 6);
        assert!(matches!(ops[0], DrawOp::Rect { .. }));
        assert!(matches!(ops[1], DrawOp::Text(_)));
        assert!(matches!(ops[2], DrawOp::Image { .. }));
        assert_eq!(
            texts(&ops),
            vec!["My Store", "8901234", "Basmati Rice 1kg", "MRP: Rs. 120"]
        );
    }

    #[test]
    fn border_spans_whole_cell() {
        let image = barcode();
        let ops = compose(&record(), geometry(), &LabelText::new("S", "$"), &image);
        assert_eq!(
            ops[0],
            DrawOp::Rect {
                x: 71.0,
                y: 44.0,
                width: 64.0,
                height: 34.0,
                line_width: 0.1
            }
        );
    }

    #[test]
    fn barcode_is_inset_and_centred() {
        let image = barcode();
        let ops = compose(&record(), geometry(), &LabelText::new("S", "$"), &image);
        let DrawOp::Image {
            x,
            y,
            width,
            height,
            image: drawn,
        } = &ops[2]
        else {
            panic!("expected image op, got {:?}", ops[2]);
        };
        assert_eq!((*x, *y, *width, *height), (76.0, 51.0, 54.0, 12.0));
        // Equal inset on both sides.
        assert_eq!(x - 71.0, (71.0 + 64.0) - (x + width));
        assert_eq!(*drawn, &image);
    }

    #[test]
    fn narrow_cell_keeps_barcode_box_positive() {
        let image = barcode();
        for cell_width in [10.0, 8.0, 0.5] {
            let narrow = LabelGeometry {
                width: cell_width,
                ..geometry()
            };
            let ops = compose(&record(), narrow, &LabelText::new("S", "$"), &image);
            let DrawOp::Image { x, width, .. } = ops[2] else {
                panic!("expected image op, got {:?}", ops[2]);
            };
            assert_eq!(width, cell_width / 2.0);
            assert_eq!(x, 71.0 + cell_width / 4.0);
        }
        // Wide enough for the full inset on both sides.
        let exact = LabelGeometry {
            width: 20.0,
            ..geometry()
        };
        let ops = compose(&record(), exact, &LabelText::new("S", "$"), &image);
        let DrawOp::Image { width, .. } = ops[2] else {
            panic!("expected image op, got {:?}", ops[2]);
        };
        assert_eq!(width, 10.0);
    }

    #[test]
    fn text_bands_follow_layout() {
        let image = barcode();
        let ops = compose(&record(), geometry(), &LabelText::new("S", "$"), &image);
        let cells: Vec<&TextCell> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(cell) => Some(cell),
                _ => None,
            })
            .collect();
        let bands: Vec<(f64, f64, FontStyle, f64)> = cells
            .iter()
            .map(|c| (c.y - 44.0, c.height, c.style, c.size_pt))
            .collect();
        assert_eq!(
            bands,
            vec![
                (2.0, 4.0, FontStyle::Bold, 8.0),
                (19.0, 3.0, FontStyle::Regular, 6.0),
                (23.0, 4.0, FontStyle::Regular, 7.0),
                (27.0, 5.0, FontStyle::Bold, 10.0),
            ]
        );
        for cell in cells {
            assert_eq!((cell.x, cell.width), (71.0, 64.0));
        }
    }

    #[test]
    fn price_line_format() {
        let text = LabelText::new("S", "$");
        assert_eq!(text.price_line("9.99"), "MRP: $ 9.99");
        let rupee = LabelText::new("S", "₹");
        assert_eq!(rupee.currency_symbol, "Rs.");
        assert_eq!(rupee.price_line("50"), "MRP: Rs. 50");
        let none = LabelText::new("S", "");
        assert_eq!(none.price_line("50"), "MRP: 50");
    }

    #[test]
    fn label_text_is_sanitized() {
        let text = LabelText::new("  દુકાન Patel Stores ", "€");
        assert_eq!(text.shop_name, "Patel Stores");
        assert_eq!(text.currency_symbol, "€");
    }

    #[test]
    fn long_name_rendered_truncated() {
        let image = barcode();
        let rec = sanitize_record(&RawRecord::new("1", "A".repeat(40), "1"));
        let ops = compose(&rec, geometry(), &LabelText::new("S", "$"), &image);
        assert_eq!(texts(&ops)[2], "A".repeat(25));
    }

    #[test]
    fn compose_is_deterministic() {
        let image = barcode();
        let text = LabelText::new("My Store", "₹");
        let a = compose(&record(), geometry(), &text, &image);
        let b = compose(&record(), geometry(), &text, &image);
        assert_eq!(a, b);
        let json_a = serde_json::to_vec(&a).unwrap();
        let json_b = serde_json::to_vec(&b).unwrap();
        assert_eq!(json_a, json_b);
    }

    #[test]
    fn draw_ops_serialize_with_tag() {
        let image = barcode();
        let ops = compose(&record(), geometry(), &LabelText::new("S", "$"), &image);
        let json = serde_json::to_value(&ops).unwrap();
        assert_eq!(json[0]["op"], "rect");
        assert_eq!(json[1]["op"], "text");
        assert_eq!(json[1]["style"], "bold");
        assert_eq!(json[2]["op"], "image");
        assert_eq!(json[2]["image"]["height"], 40);
    }
}
