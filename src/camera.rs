use serde::Serialize;

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

/// A point in either viewport (screen) or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle, `x`/`y` at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.w && pt.y >= self.y && pt.y <= self.y + self.h
    }
}

/// Placement of the canvas document inside the viewport.
///
/// `origin_x` / `origin_y` are the viewport position (CSS pixels) of the
/// canvas' top-left corner. `scale` is the uniform factor applied to the whole
/// document: `1.0` in the editor, `target_width / logical_width` for previews.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub origin_x: f64,
    pub origin_y: f64,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { origin_x: 0.0, origin_y: 0.0, scale: 1.0 }
    }
}

impl Camera {
    /// Camera that fits a canvas of `logical_width` into `target_width` pixels.
    ///
    /// Non-positive or non-finite widths fall back to identity scale.
    #[must_use]
    pub fn fit_width(logical_width: f64, target_width: f64) -> Self {
        let usable = |w: f64| w.is_finite() && w > 0.0;
        let scale = if usable(logical_width) && usable(target_width) { target_width / logical_width } else { 1.0 };
        Self { scale, ..Self::default() }
    }

    /// Convert a viewport point to canvas coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.origin_x) / self.scale,
            y: (screen.y - self.origin_y) / self.scale,
        }
    }

    /// Convert a canvas point to viewport coordinates.
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point {
            x: canvas.x * self.scale + self.origin_x,
            y: canvas.y * self.scale + self.origin_y,
        }
    }

    /// Convert a canvas rectangle to a viewport rectangle.
    #[must_use]
    pub fn rect_to_screen(&self, rect: Rect) -> Rect {
        let origin = self.canvas_to_screen(Point::new(rect.x, rect.y));
        Rect::new(origin.x, origin.y, rect.w * self.scale, rect.h * self.scale)
    }

    /// Convert a viewport distance (pixels) to a canvas distance.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }
}
