/// Rasterization of the report display list
///
/// The display list is serialised to an SVG scene in logical units, parsed
/// with `usvg` and rendered by `resvg` into a pixmap scaled by
/// `OUTPUT_SCALE`, then encoded as JPEG.
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use image::{DynamicImage, RgbaImage};
use tracing::debug;

use super::draw::{Anchor, Baseline, DrawOp, ImageDraw, TextDraw};
use super::layout::{Rect, ReportLayout, OUTPUT_SCALE};
use crate::error::{SnapError, SnapResult};
use crate::photo::normalize::encode_jpeg;

/// JPEG quality of the finished composite (0.90)
pub const REPORT_QUALITY: u8 = 90;

/// Largest edge a baseline JPEG can carry
pub const MAX_PIXEL_EDGE: u32 = 65_535;

/// Serialise `ops` into a standalone SVG document sized to `layout`.
pub fn to_svg(layout: &ReportLayout, ops: &[DrawOp]) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = layout.width(),
        h = layout.height(),
    );

    for (n, op) in ops.iter().enumerate() {
        match op {
            DrawOp::Fill { rect, color } => {
                let _ = write!(
                    svg,
                    r#"<rect {} fill="{}" fill-opacity="{}"/>"#,
                    rect_attrs(rect),
                    color.hex(),
                    color.alpha
                );
            }
            DrawOp::Stroke { rect, color, width } => {
                let _ = write!(
                    svg,
                    r#"<rect {} fill="none" stroke="{}" stroke-opacity="{}" stroke-width="{width}"/>"#,
                    rect_attrs(rect),
                    color.hex(),
                    color.alpha
                );
            }
            DrawOp::Image(img) => write_image(&mut svg, n, img),
            DrawOp::Text(text) => write_text(&mut svg, n, text),
        }
    }

    svg.push_str("</svg>");
    svg
}

fn rect_attrs(rect: &Rect) -> String {
    format!(
        r#"x="{}" y="{}" width="{}" height="{}""#,
        rect.x, rect.y, rect.w, rect.h
    )
}

fn write_image(svg: &mut String, n: usize, img: &ImageDraw) {
    let _ = write!(
        svg,
        r#"<defs><clipPath id="clip-{n}"><rect {}/></clipPath></defs><g clip-path="url(#clip-{n})"><image {} preserveAspectRatio="none" xlink:href="{}"/></g>"#,
        rect_attrs(&img.clip),
        rect_attrs(&img.dest),
        escape_xml(&img.href),
    );
}

fn write_text(svg: &mut String, n: usize, text: &TextDraw) {
    let mut filter = String::new();
    if let Some(shadow) = &text.shadow {
        let _ = write!(
            svg,
            r#"<defs><filter id="shadow-{n}" x="-50%" y="-50%" width="200%" height="200%"><feDropShadow dx="{}" dy="{}" stdDeviation="{}" flood-color="{}" flood-opacity="{}"/></filter></defs>"#,
            shadow.offset_x,
            shadow.offset_y,
            shadow.blur / 2.0,
            shadow.color.hex(),
            shadow.color.alpha,
        );
        filter = format!(r#" filter="url(#shadow-{n})""#);
    }

    let anchor = match text.anchor {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    };
    let baseline = match text.baseline {
        Baseline::Top => "text-before-edge",
        Baseline::Middle => "central",
    };
    let weight = if text.bold { "bold" } else { "normal" };

    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" font-family="{}" font-size="{}" font-weight="{weight}" fill="{}" fill-opacity="{}" text-anchor="{anchor}" dominant-baseline="{baseline}"{filter}>{}</text>"#,
        text.x,
        text.y,
        escape_xml(text.family),
        text.size,
        text.fill.hex(),
        text.fill.alpha,
        escape_xml(&text.text),
    );
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// System fonts, loaded once per process
fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

/// Render `ops` into JPEG bytes at `OUTPUT_SCALE`.
pub fn rasterize(layout: &ReportLayout, ops: &[DrawOp]) -> SnapResult<Vec<u8>> {
    let (width, height) = layout.pixel_size();
    if width > MAX_PIXEL_EDGE || height > MAX_PIXEL_EDGE {
        return Err(SnapError::surface(format!(
            "{width}x{height} report exceeds the {MAX_PIXEL_EDGE}px JPEG limit ({} pairs)",
            layout.pairs()
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SnapError::surface(format!("cannot allocate {width}x{height} canvas")))?;

    let svg = to_svg(layout, ops);
    let opts = usvg::Options {
        fontdb: font_database(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| SnapError::surface(format!("composite scene rejected: {e}")))?;

    let xform = resvg::tiny_skia::Transform::from_scale(OUTPUT_SCALE, OUTPUT_SCALE);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // Every pixel is covered by an opaque fill, so premultiplied == straight
    let rgba = RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| SnapError::surface("pixmap size mismatch"))?;
    encode_jpeg(&DynamicImage::ImageRgba8(rgba), REPORT_QUALITY)
}
