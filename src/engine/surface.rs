//! Drawing seam between the scene and whatever paints it.

/// The handful of 2D primitives the scene needs. `web::CanvasSurface` implements
/// this over a `CanvasRenderingContext2d`; tests record the calls instead.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &str);
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, style: &str, alpha: f64);
    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, style: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &str, font: &str);

    /// True when nothing drawn here is ever visible, letting the scene skip
    /// work that only exists for rendering.
    fn is_detached(&self) -> bool {
        false
    }
}

/// Stand-in when the page has no canvas.
pub struct NullSurface;

impl Surface for NullSurface {
    fn clear(&mut self, _width: f64, _height: f64) {}
    fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, _style: &str) {}
    fn fill_circle(&mut self, _x: f64, _y: f64, _radius: f64, _style: &str, _alpha: f64) {}
    fn stroke_line(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64, _width: f64, _style: &str) {}
    fn fill_text(&mut self, _text: &str, _x: f64, _y: f64, _style: &str, _font: &str) {}

    fn is_detached(&self) -> bool {
        true
    }
}

/// Call log produced by `RecordingSurface`.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Rect { x: f64, y: f64, w: f64, h: f64, style: String },
    Circle { x: f64, y: f64, radius: f64, alpha: f64 },
    Line { width: f64 },
    Text { text: String, x: f64, y: f64 },
}

/// Surface that only remembers what it was asked to draw.
#[derive(Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, _width: f64, _height: f64) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &str) {
        self.ops.push(DrawOp::Rect { x, y, w, h, style: style.to_string() });
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, _style: &str, alpha: f64) {
        self.ops.push(DrawOp::Circle { x, y, radius, alpha });
    }

    fn stroke_line(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64, width: f64, _style: &str) {
        self.ops.push(DrawOp::Line { width });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, _style: &str, _font: &str) {
        self.ops.push(DrawOp::Text { text: text.to_string(), x, y });
    }
}
