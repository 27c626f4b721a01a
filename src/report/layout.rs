/// Report geometry in logical units
///
/// Rows of two equal panels split by a vertical divider, stacked with
/// horizontal dividers, followed by a divider and a footer band. The
/// rasterizer multiplies everything by `OUTPUT_SCALE`.

/// Canvas width
pub const CANVAS_W: f32 = 1200.0;
/// Thickness of every divider and of the outer border
pub const LINE_W: f32 = 2.0;
/// Width of one panel
pub const SLOT_W: f32 = (CANVAS_W - LINE_W) / 2.0;
/// Height of one row
pub const SLOT_H: f32 = 560.0;
pub const FOOTER_H: f32 = 56.0;
/// Pixels per logical unit in the output image
pub const OUTPUT_SCALE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Geometry of a report with a given number of rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportLayout {
    pairs: usize,
}

impl ReportLayout {
    /// `None` when there is nothing to lay out
    pub fn new(pairs: usize) -> Option<Self> {
        (pairs > 0).then_some(Self { pairs })
    }

    pub fn pairs(&self) -> usize {
        self.pairs
    }

    pub fn width(&self) -> f32 {
        CANVAS_W
    }

    /// All rows plus the dividers between them
    pub fn content_height(&self) -> f32 {
        let p = self.pairs as f32;
        p * SLOT_H + (p - 1.0) * LINE_W
    }

    pub fn height(&self) -> f32 {
        self.content_height() + LINE_W + FOOTER_H
    }

    /// Output raster size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width() * OUTPUT_SCALE).round() as u32,
            (self.height() * OUTPUT_SCALE).round() as u32,
        )
    }

    fn row_top(&self, row: usize) -> f32 {
        row as f32 * (SLOT_H + LINE_W)
    }

    pub fn before_panel(&self, row: usize) -> Rect {
        Rect::new(0.0, self.row_top(row), SLOT_W, SLOT_H)
    }

    pub fn after_panel(&self, row: usize) -> Rect {
        Rect::new(SLOT_W + LINE_W, self.row_top(row), SLOT_W, SLOT_H)
    }

    pub fn center_divider(&self, row: usize) -> Rect {
        Rect::new(SLOT_W, self.row_top(row), LINE_W, SLOT_H)
    }

    /// Divider below `row`; `None` for the last row
    pub fn row_divider(&self, row: usize) -> Option<Rect> {
        (row + 1 < self.pairs)
            .then(|| Rect::new(0.0, self.row_top(row) + SLOT_H, CANVAS_W, LINE_W))
    }

    pub fn footer_divider(&self) -> Rect {
        Rect::new(0.0, self.content_height(), CANVAS_W, LINE_W)
    }

    pub fn footer(&self) -> Rect {
        Rect::new(0.0, self.content_height() + LINE_W, CANVAS_W, FOOTER_H)
    }

    /// Stroke rectangle for the outer frame (centered on the canvas edge)
    pub fn border(&self) -> Rect {
        Rect::new(
            LINE_W / 2.0,
            LINE_W / 2.0,
            CANVAS_W - LINE_W,
            self.height() - LINE_W,
        )
    }
}

/// Placement of an `img_w` x `img_h` image that covers `panel` without
/// distortion; the result overflows the panel on one axis and is centered.
pub fn cover_fit(img_w: u32, img_h: u32, panel: Rect) -> Rect {
    let (iw, ih) = (img_w.max(1) as f32, img_h.max(1) as f32);
    let scale = (panel.w / iw).max(panel.h / ih);
    let (w, h) = (iw * scale, ih * scale);
    Rect::new(
        panel.x + (panel.w - w) / 2.0,
        panel.y + (panel.h - h) / 2.0,
        w,
        h,
    )
}
