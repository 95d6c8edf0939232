//! The drawing surface the effect renders onto.

use flurry_core::Rgb;

/// A canvas-like 2D surface with a path and fill API.
///
/// Sizes are read every frame, so a host that resizes its surface only has
/// to report the new dimensions.
pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Reset any transform back to identity.
    fn reset_transform(&mut self) {}

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    /// Append an arc subpath centred on `(x, y)`. Angles are in radians.
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64);
    fn set_fill_color(&mut self, color: Rgb);
    fn set_global_alpha(&mut self, alpha: f64);
    /// Fill the accumulated path with the current color and alpha.
    fn fill(&mut self);

    /// Release the surface from whatever hosts it.
    fn detach(&mut self) {}
}

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    ResetTransform,
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    BeginPath,
    MoveTo {
        x: f64,
        y: f64,
    },
    Arc {
        x: f64,
        y: f64,
        radius: f64,
    },
    SetFillColor(Rgb),
    SetGlobalAlpha(f64),
    Fill,
    Detach,
}

/// A headless surface that records every drawing call.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
    detached: bool,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Change the reported size, as a host window resize would.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Forget recorded calls, typically between frames.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Number of arcs appended since the last recorded clear.
    pub fn arcs_in_last_frame(&self) -> usize {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::ClearRect { .. }))
            .map_or(0, |i| i + 1);
        self.ops[start..]
            .iter()
            .filter(|op| matches!(op, DrawOp::Arc { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn reset_transform(&mut self) {
        self.ops.push(DrawOp::ResetTransform);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::MoveTo { x, y });
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, _start_angle: f64, _end_angle: f64) {
        self.ops.push(DrawOp::Arc { x, y, radius });
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.ops.push(DrawOp::SetFillColor(color));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ops.push(DrawOp::SetGlobalAlpha(alpha));
    }

    fn fill(&mut self) {
        self.ops.push(DrawOp::Fill);
    }

    fn detach(&mut self) {
        self.detached = true;
        self.ops.push(DrawOp::Detach);
    }
}
