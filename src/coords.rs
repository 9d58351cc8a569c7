//! Cartesian <-> pixel mapping under continuous pan and zoom.

use crate::ticks::{GridConfig, GridSpacing, grid_spacing};

// ================================================================================
// Utility Types
// ================================================================================

/// A point in Cartesian (math) space, y pointing up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

impl PlotPoint {
    pub const ORIGIN: PlotPoint = PlotPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in device pixels relative to the drawing surface, y pointing down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }
}

impl From<ScreenPoint> for iced::Point {
    fn from(p: ScreenPoint) -> Self {
        iced::Point::new(p.x as f32, p.y as f32)
    }
}

impl From<iced::Point> for ScreenPoint {
    fn from(p: iced::Point) -> Self {
        ScreenPoint::new(f64::from(p.x), f64::from(p.y))
    }
}

/// The pixel rectangle the plot content is drawn into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Viewport {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// True if the point lies strictly inside the viewport grown by `tolerance`.
    pub fn contains(&self, p: ScreenPoint, tolerance: f64) -> bool {
        p.x < self.x_max + tolerance
            && p.x > self.x_min - tolerance
            && p.y < self.y_max + tolerance
            && p.y > self.y_min - tolerance
    }

    pub fn clamp_x(&self, x: f64) -> f64 {
        x.clamp(self.x_min, self.x_max)
    }

    pub fn clamp_y(&self, y: f64) -> f64 {
        y.clamp(self.y_min, self.y_max)
    }
}

/// One grid line: its Cartesian value and its pixel coordinate along the
/// perpendicular screen axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLine {
    pub value: f64,
    pub screen: f64,
}

// ================================================================================
// Coordinate System
// ================================================================================

/// Affine map between Cartesian units and surface pixels.
///
/// `origin` is the pixel location of Cartesian `(0, 0)`; `pixels_per_unit`
/// is the zoom scale. The y axis is flipped between the two spaces.
#[derive(Clone, Debug)]
pub struct CoordinateSystem {
    pixels_per_unit: f64,
    origin: ScreenPoint,
    width: f64,
    height: f64,
    inset: f64,
    grid_config: GridConfig,
    grid: GridSpacing,
}

impl CoordinateSystem {
    /// Creates a system for a `width` x `height` surface with `center`
    /// shown in the middle of the surface.
    pub fn new(width: f64, height: f64, center: PlotPoint, pixels_per_unit: f64) -> Self {
        let grid_config = GridConfig::default();
        let grid = grid_spacing(pixels_per_unit, &grid_config);
        Self {
            pixels_per_unit,
            origin: ScreenPoint::new(
                width / 2.0 - center.x * pixels_per_unit,
                height / 2.0 + center.y * pixels_per_unit,
            ),
            width,
            height,
            inset: 0.0,
            grid_config,
            grid,
        }
    }

    /// Shrinks the viewport by `inset` pixels on every side.
    pub fn with_inset(mut self, inset: f64) -> Self {
        self.inset = inset.max(0.0);
        self
    }

    pub fn pixels_per_unit(&self) -> f64 {
        self.pixels_per_unit
    }

    pub fn origin(&self) -> ScreenPoint {
        self.origin
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn grid(&self) -> &GridSpacing {
        &self.grid
    }

    /// Plot area inside the inset. Collapses to an empty line instead of
    /// inverting when the inset exceeds half the surface.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            x_min: self.inset,
            x_max: (self.width - self.inset).max(self.inset),
            y_min: self.inset,
            y_max: (self.height - self.inset).max(self.inset),
        }
    }

    /// Pixel centre of the drawing surface.
    pub fn screen_center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }

    /// Cartesian point currently shown at the centre of the surface.
    pub fn view_center(&self) -> PlotPoint {
        self.to_cartesian(self.screen_center())
    }

    // ---- Mapping ----

    pub fn to_screen(&self, p: PlotPoint) -> ScreenPoint {
        ScreenPoint::new(self.to_screen_x(p.x), self.to_screen_y(p.y))
    }

    pub fn to_cartesian(&self, p: ScreenPoint) -> PlotPoint {
        PlotPoint::new(self.to_cartesian_x(p.x), self.to_cartesian_y(p.y))
    }

    pub fn to_screen_x(&self, x: f64) -> f64 {
        self.origin.x + x * self.pixels_per_unit
    }

    pub fn to_screen_y(&self, y: f64) -> f64 {
        self.origin.y - y * self.pixels_per_unit
    }

    pub fn to_cartesian_x(&self, x: f64) -> f64 {
        (x - self.origin.x) / self.pixels_per_unit
    }

    pub fn to_cartesian_y(&self, y: f64) -> f64 {
        (self.origin.y - y) / self.pixels_per_unit
    }

    // ---- Mutation ----

    /// Pans by a pixel delta. Panning is unbounded.
    pub fn translate_origin(&mut self, dx: f64, dy: f64) {
        self.origin.x += dx;
        self.origin.y += dy;
    }

    /// Scales by `factor` keeping the Cartesian point under `center` fixed.
    pub fn update_zoom(&mut self, factor: f64, center: ScreenPoint) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        self.pixels_per_unit *= factor;
        self.origin.x = center.x + (self.origin.x - center.x) * factor;
        self.origin.y = center.y + (self.origin.y - center.y) * factor;
        self.grid = grid_spacing(self.pixels_per_unit, &self.grid_config);
    }

    /// Adopts a new surface size, keeping the Cartesian centre of view.
    pub fn update_system(&mut self, width: f64, height: f64) {
        let center = self.view_center();
        self.width = width;
        self.height = height;
        self.origin = ScreenPoint::new(
            width / 2.0 - center.x * self.pixels_per_unit,
            height / 2.0 + center.y * self.pixels_per_unit,
        );
        self.grid = grid_spacing(self.pixels_per_unit, &self.grid_config);
    }

    // ---- Grid ----

    /// Vertical lines at every multiple of `step` whose pixel column lies
    /// strictly inside the viewport grown by `tolerance`.
    pub fn vertical_lines(&self, step: f64, tolerance: f64) -> Vec<GridLine> {
        let viewport = self.viewport();
        let lo = self.to_cartesian_x(viewport.x_min - tolerance);
        let hi = self.to_cartesian_x(viewport.x_max + tolerance);
        multiples(lo, hi, step)
            .map(|value| GridLine {
                value,
                screen: self.to_screen_x(value),
            })
            .filter(|line| {
                line.screen > viewport.x_min - tolerance && line.screen < viewport.x_max + tolerance
            })
            .collect()
    }

    /// Horizontal lines at every multiple of `step` whose pixel row lies
    /// strictly inside the viewport grown by `tolerance`.
    pub fn horizontal_lines(&self, step: f64, tolerance: f64) -> Vec<GridLine> {
        let viewport = self.viewport();
        let lo = self.to_cartesian_y(viewport.y_max + tolerance);
        let hi = self.to_cartesian_y(viewport.y_min - tolerance);
        multiples(lo, hi, step)
            .map(|value| GridLine {
                value,
                screen: self.to_screen_y(value),
            })
            .filter(|line| {
                line.screen > viewport.y_min - tolerance && line.screen < viewport.y_max + tolerance
            })
            .collect()
    }
}

/// Multiples of `step` in `[lo, hi]`, computed from integer indices so that
/// long runs of lines do not accumulate rounding error.
fn multiples(lo: f64, hi: f64, step: f64) -> impl Iterator<Item = f64> {
    let valid = lo.is_finite() && hi.is_finite() && step > 0.0 && step.is_finite();
    let (first, last) = if valid {
        ((lo / step).ceil() as i64, (hi / step).floor() as i64)
    } else {
        (1, 0)
    };
    (first..=last).map(move |k| k as f64 * step)
}
