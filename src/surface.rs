//! The 2D drawing surface the compositor paints onto.
//!
//! [`Surface`] mirrors the subset of the HTML canvas 2D API the compositor
//! uses, including which calls can fail. The browser implementation wraps
//! [`web_sys::CanvasRenderingContext2d`]; tests substitute a recorder.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// A drawing call the surface rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("drawing call failed: {0}")]
pub struct SurfaceError(pub String);

impl From<JsValue> for SurfaceError {
    fn from(value: JsValue) -> Self {
        Self(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Canvas-style 2D drawing primitives.
pub trait Surface {
    fn save(&self);
    fn restore(&self);

    /// # Errors
    /// Fails if the underlying context rejects the transform.
    fn translate(&self, x: f64, y: f64) -> Result<(), SurfaceError>;

    /// Rotate the current transform by `radians`.
    ///
    /// # Errors
    /// Fails if the underlying context rejects the transform.
    fn rotate(&self, radians: f64) -> Result<(), SurfaceError>;

    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64);
    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64);

    fn set_fill_style(&self, color: &str);
    fn set_stroke_style(&self, color: &str);
    fn set_line_width(&self, width: f64);
    fn set_global_alpha(&self, alpha: f64);

    /// Set the dash pattern; an empty slice draws solid lines.
    ///
    /// # Errors
    /// Fails if the underlying context rejects the pattern.
    fn set_line_dash(&self, segments: &[f64]) -> Result<(), SurfaceError>;

    fn begin_path(&self);
    fn close_path(&self);
    fn move_to(&self, x: f64, y: f64);
    fn line_to(&self, x: f64, y: f64);
    fn rect(&self, x: f64, y: f64, w: f64, h: f64);

    /// # Errors
    /// Fails for a negative radius.
    fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), SurfaceError>;

    /// # Errors
    /// Fails for a negative radius.
    fn ellipse(&self, x: f64, y: f64, rx: f64, ry: f64) -> Result<(), SurfaceError>;

    fn fill(&self);
    fn stroke(&self);
    fn clip(&self);

    fn set_font(&self, font: &str);
    fn set_text_align(&self, align: &str);
    fn set_text_baseline(&self, baseline: &str);

    /// # Errors
    /// Fails if the context cannot draw text.
    fn fill_text(&self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError>;

    /// Advance width of `text` in the current font.
    ///
    /// # Errors
    /// Fails if the context cannot measure text.
    fn measure_text(&self, text: &str) -> Result<f64, SurfaceError>;
}

impl Surface for CanvasRenderingContext2d {
    fn save(&self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn translate(&self, x: f64, y: f64) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::translate(self, x, y).map_err(SurfaceError::from)
    }

    fn rotate(&self, radians: f64) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::rotate(self, radians).map_err(SurfaceError::from)
    }

    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, w, h);
    }

    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
    }

    fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::stroke_rect(self, x, y, w, h);
    }

    fn set_fill_style(&self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn set_stroke_style(&self, color: &str) {
        self.set_stroke_style_str(color);
    }

    fn set_line_width(&self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn set_global_alpha(&self, alpha: f64) {
        CanvasRenderingContext2d::set_global_alpha(self, alpha);
    }

    fn set_line_dash(&self, segments: &[f64]) -> Result<(), SurfaceError> {
        let array = js_sys::Array::new();
        for segment in segments {
            array.push(&JsValue::from_f64(*segment));
        }
        CanvasRenderingContext2d::set_line_dash(self, &array).map_err(SurfaceError::from)
    }

    fn begin_path(&self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn close_path(&self) {
        CanvasRenderingContext2d::close_path(self);
    }

    fn move_to(&self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::rect(self, x, y, w, h);
    }

    fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::arc(self, x, y, radius, start, end).map_err(SurfaceError::from)
    }

    fn ellipse(&self, x: f64, y: f64, rx: f64, ry: f64) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::ellipse(self, x, y, rx, ry, 0.0, 0.0, std::f64::consts::TAU).map_err(SurfaceError::from)
    }

    fn fill(&self) {
        CanvasRenderingContext2d::fill(self);
    }

    fn stroke(&self) {
        CanvasRenderingContext2d::stroke(self);
    }

    fn clip(&self) {
        CanvasRenderingContext2d::clip(self);
    }

    fn set_font(&self, font: &str) {
        CanvasRenderingContext2d::set_font(self, font);
    }

    fn set_text_align(&self, align: &str) {
        CanvasRenderingContext2d::set_text_align(self, align);
    }

    fn set_text_baseline(&self, baseline: &str) {
        CanvasRenderingContext2d::set_text_baseline(self, baseline);
    }

    fn fill_text(&self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::fill_text(self, text, x, y).map_err(SurfaceError::from)
    }

    fn measure_text(&self, text: &str) -> Result<f64, SurfaceError> {
        Ok(CanvasRenderingContext2d::measure_text(self, text)?.width())
    }
}
