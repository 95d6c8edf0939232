//! Terminal drawing surface backed by a braille-resolution dot buffer.

use flurry_core::Rgb;
use flurry_effect::Surface;
use ratatui::{
    style::Color,
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Points},
    },
};

/// Braille dots per terminal cell, horizontally.
pub const DOTS_PER_COLUMN: u16 = 2;
/// Braille dots per terminal cell, vertically.
pub const DOTS_PER_ROW: u16 = 4;

#[derive(Debug, Clone, Copy)]
struct Circle {
    x: f64,
    y: f64,
    radius: f64,
}

/// Dots painted by one fill, in surface pixel coordinates.
#[derive(Debug, Clone)]
struct Layer {
    color: Rgb,
    dots: Vec<(f64, f64)>,
}

/// A [`Surface`] that rasterises filled circles into terminal braille dots.
#[derive(Debug)]
pub struct TerminalSurface {
    width: f64,
    height: f64,
    path: Vec<Circle>,
    fill_color: Rgb,
    alpha: f64,
    layers: Vec<Layer>,
    attached: bool,
}

impl TerminalSurface {
    /// Create a surface covering `columns` x `rows` terminal cells.
    pub fn new(columns: u16, rows: u16) -> Self {
        let mut surface = Self {
            width: 0.0,
            height: 0.0,
            path: Vec::new(),
            fill_color: Rgb::new(255, 255, 255),
            alpha: 1.0,
            layers: Vec::new(),
            attached: true,
        };
        surface.resize(columns, rows);
        surface
    }

    /// Match a new terminal size. Returns whether the size changed.
    pub fn resize(&mut self, columns: u16, rows: u16) -> bool {
        let width = f64::from(columns) * f64::from(DOTS_PER_COLUMN);
        let height = f64::from(rows) * f64::from(DOTS_PER_ROW);
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Number of painted dots, counting overlaps.
    pub fn dot_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.dots.len()).sum()
    }

    /// Colors of the painted layers in paint order.
    pub fn layer_colors(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.layers.iter().map(|layer| layer.color)
    }

    /// A canvas widget showing the current dots.
    pub fn widget(&self) -> impl Widget + '_ {
        let height = self.height;
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, self.width])
            .y_bounds([0.0, self.height])
            .paint(move |ctx| {
                for layer in &self.layers {
                    // Canvas y grows upward, surface y grows downward.
                    let coords: Vec<(f64, f64)> = layer
                        .dots
                        .iter()
                        .map(|&(x, y)| (x + 0.5, height - (y + 0.5)))
                        .collect();
                    let Rgb { r, g, b } = layer.color;
                    ctx.draw(&Points {
                        coords: &coords,
                        color: Color::Rgb(r, g, b),
                    });
                }
            })
    }

    fn rasterize(&self, circle: Circle, dots: &mut Vec<(f64, f64)>) {
        let max_x = self.width - 1.0;
        let max_y = self.height - 1.0;
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }

        let r2 = circle.radius * circle.radius;
        let x0 = (circle.x - circle.radius).floor().max(0.0);
        let x1 = (circle.x + circle.radius).ceil().min(max_x);
        let y0 = (circle.y - circle.radius).floor().max(0.0);
        let y1 = (circle.y + circle.radius).ceil().min(max_y);

        let mut painted = false;
        let mut py = y0;
        while py <= y1 {
            let mut px = x0;
            while px <= x1 {
                let dx = px + 0.5 - circle.x;
                let dy = py + 0.5 - circle.y;
                if dx * dx + dy * dy <= r2 {
                    dots.push((px, py));
                    painted = true;
                }
                px += 1.0;
            }
            py += 1.0;
        }

        // Circles smaller than a dot still show up as one dot.
        let (cx, cy) = (circle.x.floor(), circle.y.floor());
        if !painted && (0.0..=max_x).contains(&cx) && (0.0..=max_y).contains(&cy) {
            dots.push((cx, cy));
        }
    }
}

impl Surface for TerminalSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if x <= 0.0 && y <= 0.0 && x + width >= self.width && y + height >= self.height {
            self.layers.clear();
            return;
        }
        for layer in &mut self.layers {
            layer.dots.retain(|&(px, py)| {
                px < x || px >= x + width || py < y || py >= y + height
            });
        }
        self.layers.retain(|layer| !layer.dots.is_empty());
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, _x: f64, _y: f64) {}

    fn arc(&mut self, x: f64, y: f64, radius: f64, _start_angle: f64, _end_angle: f64) {
        self.path.push(Circle { x, y, radius });
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn fill(&mut self) {
        let mut dots = Vec::new();
        for &circle in &self.path {
            self.rasterize(circle, &mut dots);
        }
        if !dots.is_empty() {
            self.layers.push(Layer {
                color: self.fill_color.blend_over_black(self.alpha),
                dots,
            });
        }
    }

    fn detach(&mut self) {
        self.attached = false;
        self.layers.clear();
        self.path.clear();
    }
}
