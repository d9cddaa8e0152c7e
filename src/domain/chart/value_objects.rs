use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Value Object - Chart variant
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    #[display(fmt = "Candlestick")]
    #[strum(serialize = "candlestick")]
    Candlestick,
    #[display(fmt = "Scatter")]
    #[strum(serialize = "scatter")]
    Scatter,
    #[display(fmt = "Line")]
    #[strum(serialize = "line")]
    Line,
    #[display(fmt = "Histogram")]
    #[strum(serialize = "histogram")]
    Histogram,
}

/// Value Object - drawing rectangle in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ChartArea {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width: width.max(0.0), height: height.max(0.0) }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open on the right and bottom edges.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    pub fn contains_x(&self, px: f64) -> bool {
        px >= self.x && px < self.right()
    }

    /// Split off a bottom band of `ratio` height (volume sub-panel).
    /// Returns `(upper, lower)`; `gap` pixels separate them.
    pub fn split_bottom(&self, ratio: f64, gap: f64) -> (ChartArea, ChartArea) {
        let lower_h = (self.height * ratio.clamp(0.0, 1.0)).max(0.0);
        let upper_h = (self.height - lower_h - gap).max(0.0);
        let upper = ChartArea::new(self.x, self.y, self.width, upper_h);
        let lower = ChartArea::new(self.x, self.bottom() - lower_h, self.width, lower_h);
        (upper, lower)
    }
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub const fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }

    /// CSS color string accepted by a 2D canvas context
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:06x}", self.to_hex())
        } else {
            let hex = self.to_hex();
            format!(
                "rgba({}, {}, {}, {:.3})",
                (hex >> 16) & 0xFF,
                (hex >> 8) & 0xFF,
                hex & 0xFF,
                self.a.clamp(0.0, 1.0)
            )
        }
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

/// Fixed cluster palette; lookups outside it fall back to entry 0.
pub const CLUSTER_PALETTE: [Color; 8] = [
    Color::from_hex(0x4e79a7),
    Color::from_hex(0xf28e2b),
    Color::from_hex(0xe15759),
    Color::from_hex(0x76b7b2),
    Color::from_hex(0x59a14f),
    Color::from_hex(0xedc948),
    Color::from_hex(0xb07aa1),
    Color::from_hex(0xff9da7),
];

/// Colors used when records are painted by direction instead of cluster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub bullish: Color,
    pub bearish: Color,
    pub neutral: Color,
    pub background_top: Color,
    pub background_bottom: Color,
    pub grid: Color,
    pub axis_text: Color,
    pub crosshair: Color,
    pub tooltip_background: Color,
    pub tooltip_text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bullish: Color::from_hex(0x26a69a),
            bearish: Color::from_hex(0xef5350),
            neutral: Color::from_hex(0x9e9e9e),
            background_top: Color::from_hex(0x1e222d),
            background_bottom: Color::from_hex(0x131722),
            grid: Color::from_hex(0x2a2e39),
            axis_text: Color::from_hex(0xb2b5be),
            crosshair: Color::from_hex(0x787b86).with_alpha(0.8),
            tooltip_background: Color::from_hex(0x000000).with_alpha(0.85),
            tooltip_text: Color::WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_output_for_opaque_and_translucent() {
        assert_eq!(Color::from_hex(0x26a69a).to_css(), "#26a69a");
        assert_eq!(Color::from_hex(0xff0000).with_alpha(0.5).to_css(), "rgba(255, 0, 0, 0.500)");
    }

    #[test]
    fn split_bottom_keeps_bands_inside_area() {
        let area = ChartArea::new(10.0, 20.0, 300.0, 200.0);
        let (upper, lower) = area.split_bottom(0.2, 10.0);
        assert_eq!(lower.height, 40.0);
        assert_eq!(upper.height, 150.0);
        assert_eq!(lower.bottom(), area.bottom());
    }
}
