//! PDF file assembly through lopdf.
//!
//! The page tree, the two fonts and the info dictionary are allocated first,
//! then the images, content stream and page object of each page in order,
//! then the catalog. Streams are Flate-compressed. Nothing time-dependent is
//! written, so equal documents serialize to equal bytes.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use sticker_sheet_core::FontStyle;

use crate::document::{EmbeddedImage, PT_PER_MM, PageOp, PdfDocument};
use crate::metrics::base_font;

const PDF_VERSION: &str = "1.4";

/// Resource name of the font for `style`.
pub(crate) fn font_resource(style: FontStyle) -> &'static str {
    match style {
        FontStyle::Regular => "F1",
        FontStyle::Bold => "F2",
    }
}

/// Resource name of the `index`-th image on a page: `Im1`, `Im2`, ...
pub(crate) fn image_resource(index: usize) -> String {
    format!("Im{}", index + 1)
}

/// A coordinate rounded to three decimals, written as an integer when whole.
fn number(value: f64) -> Object {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        Object::Integer(rounded as i64)
    } else {
        Object::Real(rounded as _)
    }
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn operations(op: &PageOp) -> Vec<Operation> {
    match op {
        PageOp::Rect {
            x,
            y,
            width,
            height,
            line_width,
        } => vec![
            Operation::new("w", vec![number(*line_width)]),
            Operation::new(
                "re",
                vec![number(*x), number(*y), number(*width), number(*height)],
            ),
            Operation::new("S", vec![]),
        ],
        PageOp::Text {
            style,
            size,
            x,
            y,
            bytes,
        } => vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![name(font_resource(*style)), number(*size)]),
            Operation::new("Td", vec![number(*x), number(*y)]),
            Operation::new("Tj", vec![Object::string_literal(bytes.clone())]),
            Operation::new("ET", vec![]),
        ],
        PageOp::Image {
            image,
            x,
            y,
            width,
            height,
        } => vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    number(*width),
                    Object::Integer(0),
                    Object::Integer(0),
                    number(*height),
                    number(*x),
                    number(*y),
                ],
            ),
            Operation::new("Do", vec![name(&image_resource(*image))]),
            Operation::new("Q", vec![]),
        ],
    }
}

fn font_dictionary(style: FontStyle) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font(style),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn image_stream(image: &EmbeddedImage) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(i64::from(image.width)),
            "Height" => Object::Integer(i64::from(image.height)),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => Object::Integer(8),
        },
        image.pixels.clone(),
    )
}

/// Build the lopdf object graph for `doc`.
pub(crate) fn build(doc: &PdfDocument) -> lopdf::Result<Document> {
    let mut pdf = Document::with_version(PDF_VERSION);
    let pages_id = pdf.new_object_id();
    let regular = pdf.add_object(font_dictionary(FontStyle::Regular));
    let bold = pdf.add_object(font_dictionary(FontStyle::Bold));
    let info_id = pdf.add_object(dictionary! {
        "Producer" => Object::string_literal("sticker-sheet"),
        "Creator" => Object::string_literal("stickers"),
    });

    let size = doc.page_size();
    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        number(size.width_mm * PT_PER_MM),
        number(size.height_mm * PT_PER_MM),
    ];

    let mut kids = Vec::with_capacity(doc.pages().len());
    for page in doc.pages() {
        let mut resources = dictionary! {
            "Font" => dictionary! {
                font_resource(FontStyle::Regular) => regular,
                font_resource(FontStyle::Bold) => bold,
            },
        };
        if !page.images.is_empty() {
            let mut xobjects = Dictionary::new();
            for (i, image) in page.images.iter().enumerate() {
                let image_id = pdf.add_object(image_stream(image));
                xobjects.set(image_resource(i), image_id);
            }
            resources.set("XObject", xobjects);
        }

        let content: Content<Vec<Operation>> = Content {
            operations: page.ops.iter().flat_map(operations).collect(),
        };
        let content_id = pdf.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Resources" => resources,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );
    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.trailer.set("Info", info_id);
    pdf.compress();
    Ok(pdf)
}

/// Serialize `doc` into a complete PDF file.
pub(crate) fn write_pdf(doc: &PdfDocument) -> lopdf::Result<Vec<u8>> {
    let mut pdf = build(doc)?;
    let mut out = Vec::new();
    pdf.save_to(&mut out)?;
    tracing::debug!(pages = doc.pages().len(), bytes = out.len(), "pdf written");
    Ok(out)
}
