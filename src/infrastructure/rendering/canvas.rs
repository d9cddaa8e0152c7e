use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::domain::chart::{ChartArea, Color};
use crate::domain::errors::AppError;
use crate::domain::logging::LogComponent;
use crate::infrastructure::rendering::surface::{DrawSurface, LineStyle, TextAlign};
use crate::{log_debug, log_warn};

const FONT_FAMILY: &str = "12px 'JetBrains Mono', monospace";

/// Canvas 2D surface sized to the element's CSS box times the device pixel ratio
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    pixel_ratio: f64,
}

impl CanvasSurface {
    pub fn from_element_id(canvas_id: &str) -> Result<Self, AppError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| AppError::Rendering("document not available".to_string()))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| AppError::Rendering(format!("canvas '{}' not found", canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| AppError::Rendering(format!("'{}' is not a canvas", canvas_id)))?;
        Self::new(canvas)
    }

    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, AppError> {
        let context = canvas
            .get_context("2d")
            .map_err(|e| AppError::Rendering(format!("2d context request failed: {:?}", e)))?
            .ok_or_else(|| AppError::Rendering("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AppError::Rendering("failed to cast to 2d context".to_string()))?;

        let mut surface = Self { canvas, context, width: 0.0, height: 0.0, pixel_ratio: 1.0 };
        surface.sync_size();
        Ok(surface)
    }

    /// Match the backing store to the element's current CSS size; returns the
    /// logical size.
    pub fn sync_size(&mut self) -> (f64, f64) {
        let pixel_ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio()).max(1.0);
        let width = f64::from(self.canvas.client_width().max(0));
        let height = f64::from(self.canvas.client_height().max(0));

        if (width, height, pixel_ratio) != (self.width, self.height, self.pixel_ratio) {
            self.canvas.set_width((width * pixel_ratio).round() as u32);
            self.canvas.set_height((height * pixel_ratio).round() as u32);
            log_debug!(
                LogComponent::Infrastructure("CanvasSurface"),
                "resized to {}x{} @{}x",
                width,
                height,
                pixel_ratio
            );
        }
        // Assigning width/height resets the transform, so always reapply it.
        if let Err(e) = self.context.set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0) {
            log_warn!(LogComponent::Infrastructure("CanvasSurface"), "set_transform failed: {:?}", e);
        }

        self.width = width;
        self.height = height;
        self.pixel_ratio = pixel_ratio;
        (width, height)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn apply_line_style(&self, style: LineStyle) {
        self.context.set_stroke_style_str(&style.color.to_css());
        self.context.set_line_width(style.width);
        let dash = if style.dashed {
            js_sys::Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(4.0))
        } else {
            js_sys::Array::new()
        };
        let _ = self.context.set_line_dash(&dash);
    }
}

impl DrawSurface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.context.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn vertical_gradient(&mut self, area: ChartArea, top: Color, bottom: Color) {
        let gradient = self.context.create_linear_gradient(area.x, area.y, area.x, area.bottom());
        let stops = gradient
            .add_color_stop(0.0, &top.to_css())
            .and_then(|_| gradient.add_color_stop(1.0, &bottom.to_css()));
        match stops {
            Ok(()) => self.context.set_fill_style_canvas_gradient(&gradient),
            Err(_) => self.context.set_fill_style_str(&bottom.to_css()),
        }
        self.context.fill_rect(area.x, area.y, area.width, area.height);
    }

    fn fill_rect(&mut self, area: ChartArea, color: Color) {
        self.context.set_fill_style_str(&color.to_css());
        self.context.fill_rect(area.x, area.y, area.width, area.height);
    }

    fn stroke_rect(&mut self, area: ChartArea, style: LineStyle) {
        self.apply_line_style(style);
        self.context.stroke_rect(area.x, area.y, area.width, area.height);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), style: LineStyle) {
        self.apply_line_style(style);
        self.context.begin_path();
        self.context.move_to(from.0, from.1);
        self.context.line_to(to.0, to.1);
        self.context.stroke();
    }

    fn path(&mut self, points: &[(f64, f64)], style: LineStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.apply_line_style(style);
        self.context.begin_path();
        self.context.move_to(first.0, first.1);
        for point in rest {
            self.context.line_to(point.0, point.1);
        }
        self.context.stroke();
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, color: Color) {
        self.context.set_fill_style_str(&color.to_css());
        self.context.begin_path();
        if self.context.arc(center.0, center.1, radius, 0.0, TAU).is_ok() {
            self.context.fill();
        }
    }

    fn text(&mut self, text: &str, x: f64, y: f64, align: TextAlign, color: Color, font_px: f64) {
        self.context.set_font(&font(font_px));
        self.context.set_text_align(align.as_css());
        self.context.set_text_baseline("middle");
        self.context.set_fill_style_str(&color.to_css());
        let _ = self.context.fill_text(text, x, y);
    }

    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        self.context.set_font(&font(font_px));
        self.context
            .measure_text(text)
            .map(|m| m.width())
            .unwrap_or(text.chars().count() as f64 * font_px * 0.6)
    }
}

fn font(font_px: f64) -> String {
    FONT_FAMILY.replacen("12px", &format!("{}px", font_px.round()), 1)
}
