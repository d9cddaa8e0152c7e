//! Drawing primitives the chart renderer needs from a 2D surface.

use crate::domain::chart::{ChartArea, Color};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_css(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
    pub dashed: bool,
}

impl LineStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dashed: false }
    }

    pub fn dashed(color: Color, width: f64) -> Self {
        Self { color, width, dashed: true }
    }
}

/// A 2D surface in logical pixels; implementations handle device pixel ratio.
pub trait DrawSurface {
    /// Logical width and height.
    fn size(&self) -> (f64, f64);
    fn clear(&mut self);
    fn vertical_gradient(&mut self, area: ChartArea, top: Color, bottom: Color);
    fn fill_rect(&mut self, area: ChartArea, color: Color);
    fn stroke_rect(&mut self, area: ChartArea, style: LineStyle);
    fn line(&mut self, from: (f64, f64), to: (f64, f64), style: LineStyle);
    fn path(&mut self, points: &[(f64, f64)], style: LineStyle);
    fn circle(&mut self, center: (f64, f64), radius: f64, color: Color);
    /// Text vertically centred on `y`.
    fn text(&mut self, text: &str, x: f64, y: f64, align: TextAlign, color: Color, font_px: f64);
    fn measure_text(&self, text: &str, font_px: f64) -> f64;
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Gradient { area: ChartArea, top: Color, bottom: Color },
    FillRect { area: ChartArea, color: Color },
    StrokeRect { area: ChartArea, style: LineStyle },
    Line { from: (f64, f64), to: (f64, f64), style: LineStyle },
    Path { points: Vec<(f64, f64)>, style: LineStyle },
    Circle { center: (f64, f64), radius: f64, color: Color },
    Text { text: String, x: f64, y: f64, align: TextAlign, color: Color },
}

/// Surface that only remembers what was drawn
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, ops: Vec::new() }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }

    /// Every coordinate recorded so far, for finiteness checks.
    pub fn coordinates(&self) -> Vec<f64> {
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                DrawOp::Clear => {}
                DrawOp::Gradient { area, .. } | DrawOp::FillRect { area, .. } | DrawOp::StrokeRect { area, .. } => {
                    out.extend([area.x, area.y, area.width, area.height])
                }
                DrawOp::Line { from, to, .. } => out.extend([from.0, from.1, to.0, to.1]),
                DrawOp::Path { points, .. } => out.extend(points.iter().flat_map(|p| [p.0, p.1])),
                DrawOp::Circle { center, radius, .. } => out.extend([center.0, center.1, *radius]),
                DrawOp::Text { x, y, .. } => out.extend([*x, *y]),
            }
        }
        out
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn vertical_gradient(&mut self, area: ChartArea, top: Color, bottom: Color) {
        self.ops.push(DrawOp::Gradient { area, top, bottom });
    }

    fn fill_rect(&mut self, area: ChartArea, color: Color) {
        self.ops.push(DrawOp::FillRect { area, color });
    }

    fn stroke_rect(&mut self, area: ChartArea, style: LineStyle) {
        self.ops.push(DrawOp::StrokeRect { area, style });
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), style: LineStyle) {
        self.ops.push(DrawOp::Line { from, to, style });
    }

    fn path(&mut self, points: &[(f64, f64)], style: LineStyle) {
        self.ops.push(DrawOp::Path { points: points.to_vec(), style });
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, color: Color) {
        self.ops.push(DrawOp::Circle { center, radius, color });
    }

    fn text(&mut self, text: &str, x: f64, y: f64, align: TextAlign, color: Color, _font_px: f64) {
        self.ops.push(DrawOp::Text { text: text.to_string(), x, y, align, color });
    }

    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        text.chars().count() as f64 * font_px * 0.6
    }
}
