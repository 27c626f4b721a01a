/// Display list for the report composite
///
/// Every drawing step is an explicit value carrying its own geometry, fill
/// and shadow, so there is no implicit cursor or style state between steps.
/// Only list order matters: later ops paint over earlier ones.
use super::layout::{cover_fit, Rect, ReportLayout};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in 0.0..=1.0
    pub alpha: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self { r, g, b, alpha }
    }

    /// `#rrggbb`, opacity is carried separately
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub const PANEL_BG: Color = Color::rgb(0x36, 0x36, 0x36);
pub const DIVIDER_BG: Color = Color::rgb(0x00, 0x00, 0x00);
pub const FOOTER_BG: Color = Color::rgb(0x00, 0x00, 0x00);
pub const TEXT_WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
pub const PLACEHOLDER_TEXT: Color = Color::rgb(0x55, 0x55, 0x55);

pub const LABEL_PADDING: f32 = 20.0;
pub const LABEL_FONT_SIZE: f32 = 72.0;
pub const FOOTER_FONT_SIZE: f32 = 14.0;
pub const FOOTER_PADDING: f32 = 10.0;

pub const BEFORE_LABEL: &str = "Before";
pub const AFTER_LABEL: &str = "After";
pub const PLACEHOLDER_LABEL: &str = "No photo";

const LABEL_FAMILY: &str = "Syne, sans-serif";
const FOOTER_FAMILY: &str = "Helvetica Neue, sans-serif";

/// Soft shadow behind the panel labels
pub const LABEL_SHADOW: Shadow = Shadow {
    color: Color::rgba(0, 0, 0, 0.5),
    blur: 20.0,
    offset_x: 0.0,
    offset_y: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    /// Blur extent; the gaussian deviation is half of it
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    Top,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub anchor: Anchor,
    pub baseline: Baseline,
    pub family: &'static str,
    pub size: f32,
    pub bold: bool,
    pub fill: Color,
    pub shadow: Option<Shadow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageDraw {
    /// Encoded image as a data URL
    pub href: String,
    /// Where the whole image lands (may overflow `clip`)
    pub dest: Rect,
    pub clip: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill { rect: Rect, color: Color },
    Stroke { rect: Rect, color: Color, width: f32 },
    Image(ImageDraw),
    Text(TextDraw),
}

/// A decoded photo ready to place in a panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelImage {
    pub href: String,
    pub width: u32,
    pub height: u32,
}

/// Everything the planner needs to know about one report
#[derive(Debug, Clone, Copy)]
pub struct ReportContent<'a> {
    pub title: &'a str,
    /// Already formatted footer date
    pub date_label: &'a str,
    pub before: &'a [Option<PanelImage>],
    pub after: &'a [Option<PanelImage>],
}

/// Build the full display list for `content` laid out by `layout`.
pub fn plan_report(layout: &ReportLayout, content: &ReportContent<'_>) -> Vec<DrawOp> {
    let mut ops = Vec::new();

    for row in 0..layout.pairs() {
        let left = layout.before_panel(row);
        push_panel(&mut ops, left, slot(content.before, row));
        ops.push(label(left, BEFORE_LABEL, Anchor::Start));

        ops.push(DrawOp::Fill {
            rect: layout.center_divider(row),
            color: DIVIDER_BG,
        });

        let right = layout.after_panel(row);
        push_panel(&mut ops, right, slot(content.after, row));
        ops.push(label(right, AFTER_LABEL, Anchor::End));

        if let Some(rect) = layout.row_divider(row) {
            ops.push(DrawOp::Fill {
                rect,
                color: DIVIDER_BG,
            });
        }
    }

    ops.push(DrawOp::Fill {
        rect: layout.footer_divider(),
        color: DIVIDER_BG,
    });

    let footer = layout.footer();
    ops.push(DrawOp::Fill {
        rect: footer,
        color: FOOTER_BG,
    });
    let (_, mid_y) = footer.center();
    ops.push(footer_text(content.title, footer.x + FOOTER_PADDING, mid_y, Anchor::Start));
    ops.push(footer_text(
        content.date_label,
        footer.right() - FOOTER_PADDING,
        mid_y,
        Anchor::End,
    ));

    ops.push(DrawOp::Stroke {
        rect: layout.border(),
        color: DIVIDER_BG,
        width: super::layout::LINE_W,
    });

    ops
}

fn slot(images: &[Option<PanelImage>], row: usize) -> Option<&PanelImage> {
    images.get(row).and_then(Option::as_ref)
}

/// Panel background, then either the photo or the placeholder marker
fn push_panel(ops: &mut Vec<DrawOp>, panel: Rect, image: Option<&PanelImage>) {
    ops.push(DrawOp::Fill {
        rect: panel,
        color: PANEL_BG,
    });

    match image {
        Some(img) => ops.push(DrawOp::Image(ImageDraw {
            href: img.href.clone(),
            dest: cover_fit(img.width, img.height, panel),
            clip: panel,
        })),
        None => {
            let (cx, cy) = panel.center();
            ops.push(DrawOp::Text(TextDraw {
                text: PLACEHOLDER_LABEL.to_string(),
                x: cx,
                y: cy,
                anchor: Anchor::Middle,
                baseline: Baseline::Middle,
                family: FOOTER_FAMILY,
                size: FOOTER_FONT_SIZE,
                bold: false,
                fill: PLACEHOLDER_TEXT,
                shadow: None,
            }));
        }
    }
}

fn label(panel: Rect, text: &str, anchor: Anchor) -> DrawOp {
    let x = match anchor {
        Anchor::End => panel.right() - LABEL_PADDING,
        _ => panel.x + LABEL_PADDING,
    };
    DrawOp::Text(TextDraw {
        text: text.to_string(),
        x,
        y: panel.y + LABEL_PADDING,
        anchor,
        baseline: Baseline::Top,
        family: LABEL_FAMILY,
        size: LABEL_FONT_SIZE,
        bold: true,
        fill: TEXT_WHITE,
        shadow: Some(LABEL_SHADOW),
    })
}

fn footer_text(text: &str, x: f32, y: f32, anchor: Anchor) -> DrawOp {
    DrawOp::Text(TextDraw {
        text: text.to_string(),
        x,
        y,
        anchor,
        baseline: Baseline::Middle,
        family: FOOTER_FAMILY,
        size: FOOTER_FONT_SIZE,
        bold: false,
        fill: TEXT_WHITE,
        shadow: None,
    })
}
