//! Layer geometry and drawing.
//!
//! Every layer is built in two passes: a pure function computes the shapes
//! in screen space from the coordinate system and the current state, and a
//! `draw_*` function turns those shapes into canvas paths. Only the first
//! pass contains decisions worth testing.

use std::f64::consts::TAU;

use iced::widget::canvas::{self, LineDash, Path, Stroke};
use iced::{Color, Pixels, Point, Radians, Size};

use crate::config::{Palette, PlotConfig, PointDescriptor};
use crate::coords::{CoordinateSystem, GridLine, PlotPoint, ScreenPoint, Viewport};
use crate::error::Result;
use crate::params::Parameters;
use crate::series::{SeriesState, TERM_COUNT, direction};
use crate::ticks::round_to_digits;

const DASH_PATTERN: [f32; 2] = [5.0, 10.0];
const ORIGIN_DOT_RADIUS: f64 = 4.0;
const LABEL_HALO_WIDTH: f32 = 1.5;
const LABEL_TOLERANCE: f64 = 2.0;
const POINT_HALO: f64 = 3.0;

// ================================================================================
// Style
// ================================================================================

/// Resolved drawing options shared by every layer.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStyle {
    pub palette: Palette,
    pub label_size: f32,
    pub vector_width: f32,
    pub arrow_size: f64,
    pub geometric_aid_width: f32,
    pub axis_line_width: f32,
    pub grid_line_width: f32,
    pub secondary_grid_line_width: f32,
}

impl RenderStyle {
    pub fn from_config(config: &PlotConfig) -> Result<Self> {
        Ok(Self {
            palette: config.palette()?,
            label_size: config.label_size,
            vector_width: config.vector_width,
            arrow_size: config.arrow_size,
            geometric_aid_width: config.geometric_aid_width,
            axis_line_width: config.axis_line_width,
            grid_line_width: config.grid_line_width,
            secondary_grid_line_width: config.secondary_grid_line_width,
        })
    }
}

// ================================================================================
// Shapes
// ================================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: ScreenPoint,
    pub to: ScreenPoint,
}

impl Segment {
    fn new(from: ScreenPoint, to: ScreenPoint) -> Self {
        Self { from, to }
    }

    fn path(&self) -> Path {
        Path::line(self.from.into(), self.to.into())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    /// Left end of the text baseline.
    pub baseline: ScreenPoint,
}

/// Horizontal extent of `text` at `size`, for placement only.
pub fn approx_text_width(text: &str, size: f32) -> f64 {
    text.chars().count() as f64 * f64::from(size) * 0.6
}

// ================================================================================
// Axis layer
// ================================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisLayout {
    pub secondary_grid: Vec<Segment>,
    pub grid: Vec<Segment>,
    pub axes: Vec<Segment>,
    pub borders: Vec<Segment>,
    pub labels: Vec<Label>,
    pub origin: Option<ScreenPoint>,
}

/// Computes the axis layer. With the grid hidden only the border remains.
pub fn axis_layout(cs: &CoordinateSystem, label_size: f32, grid_visible: bool) -> AxisLayout {
    let borders = border_segments(cs);
    if !grid_visible {
        return AxisLayout {
            borders,
            ..AxisLayout::default()
        };
    }

    let spacing = cs.grid();
    let origin = cs.to_screen(PlotPoint::ORIGIN);
    let origin = cs
        .viewport()
        .contains(origin, ORIGIN_DOT_RADIUS)
        .then_some(origin);

    AxisLayout {
        secondary_grid: grid_segments(cs, spacing.secondary_step),
        grid: grid_segments(cs, spacing.step),
        axes: axis_segments(cs),
        borders,
        labels: tick_labels(cs, label_size),
        origin,
    }
}

fn grid_segments(cs: &CoordinateSystem, step: f64) -> Vec<Segment> {
    let viewport = cs.viewport();
    let vertical = cs.vertical_lines(step, 0.0).into_iter().map(|line| {
        Segment::new(
            ScreenPoint::new(line.screen, viewport.y_min),
            ScreenPoint::new(line.screen, viewport.y_max),
        )
    });
    let horizontal = cs.horizontal_lines(step, 0.0).into_iter().map(|line| {
        Segment::new(
            ScreenPoint::new(viewport.x_min, line.screen),
            ScreenPoint::new(viewport.x_max, line.screen),
        )
    });
    vertical.chain(horizontal).collect()
}

fn axis_segments(cs: &CoordinateSystem) -> Vec<Segment> {
    let viewport = cs.viewport();
    let origin = cs.to_screen(PlotPoint::ORIGIN);
    let mut axes = Vec::with_capacity(2);
    if origin.x > viewport.x_min && origin.x < viewport.x_max {
        axes.push(Segment::new(
            ScreenPoint::new(origin.x, viewport.y_min),
            ScreenPoint::new(origin.x, viewport.y_max),
        ));
    }
    if origin.y > viewport.y_min && origin.y < viewport.y_max {
        axes.push(Segment::new(
            ScreenPoint::new(viewport.x_min, origin.y),
            ScreenPoint::new(viewport.x_max, origin.y),
        ));
    }
    axes
}

/// Border lines on the viewport edges that are inset from the surface.
fn border_segments(cs: &CoordinateSystem) -> Vec<Segment> {
    let v = cs.viewport();
    let top_left = ScreenPoint::new(v.x_min, v.y_min);
    let top_right = ScreenPoint::new(v.x_max, v.y_min);
    let bottom_left = ScreenPoint::new(v.x_min, v.y_max);
    let bottom_right = ScreenPoint::new(v.x_max, v.y_max);

    let mut borders = Vec::new();
    if v.x_min > 0.0 {
        borders.push(Segment::new(top_left, bottom_left));
    }
    if v.x_max < cs.width() {
        borders.push(Segment::new(top_right, bottom_right));
    }
    if v.y_min > 0.0 {
        borders.push(Segment::new(top_left, top_right));
    }
    if v.y_max < cs.height() {
        borders.push(Segment::new(bottom_left, bottom_right));
    }
    borders
}

/// Where to put a label along one screen axis: next to the axis line when
/// it is visible, otherwise pinned to the nearest viewport edge.
#[derive(Clone, Copy, Debug)]
struct Placement {
    tolerance_min: f64,
    tolerance_max: f64,
    offset_default: f64,
    offset_min: f64,
    offset_max: f64,
}

impl Placement {
    fn resolve(&self, axis: f64, min: f64, max: f64) -> f64 {
        if axis < min + self.tolerance_min {
            min + self.offset_min
        } else if axis > max + self.tolerance_max {
            max + self.offset_max
        } else {
            axis + self.offset_default
        }
    }
}

fn label_text(line: &GridLine, digits: u32) -> Option<String> {
    let value = round_to_digits(line.value, digits);
    // the origin gets a single "0" label of its own
    (value != 0.0).then(|| value.to_string())
}

fn tick_labels(cs: &CoordinateSystem, label_size: f32) -> Vec<Label> {
    let viewport = cs.viewport();
    let spacing = cs.grid();
    let size = f64::from(label_size);
    let origin = cs.to_screen(PlotPoint::ORIGIN);
    let mut labels = Vec::new();

    // below the horizontal axis, pinned to the top or bottom edge
    let below_axis = Placement {
        tolerance_min: 0.0,
        tolerance_max: -5.0 - size,
        offset_default: size,
        offset_min: size,
        offset_max: -5.0,
    };
    let baseline_y = below_axis.resolve(origin.y, viewport.y_min, viewport.y_max);
    for line in cs.vertical_lines(spacing.step, LABEL_TOLERANCE) {
        let Some(text) = label_text(&line, spacing.label_digits) else {
            continue;
        };
        // centre the digits, not the minus sign
        let mut width = approx_text_width(&text, label_size);
        if text.starts_with('-') {
            width += approx_text_width("-", label_size);
        }
        labels.push(Label {
            baseline: ScreenPoint::new(line.screen - width / 2.0, baseline_y),
            text,
        });
    }

    // left of the vertical axis, pinned to the left or right edge
    for line in cs.horizontal_lines(spacing.step, LABEL_TOLERANCE) {
        let Some(text) = label_text(&line, spacing.label_digits) else {
            continue;
        };
        let offset = approx_text_width(&text, label_size) + 8.0;
        let left_of_axis = Placement {
            tolerance_min: offset + 8.0,
            tolerance_max: 0.0,
            offset_default: -offset,
            offset_min: 5.0,
            offset_max: -offset,
        };
        let x = left_of_axis.resolve(origin.x, viewport.x_min, viewport.x_max);
        labels.push(Label {
            baseline: ScreenPoint::new(x, line.screen + size / 2.0),
            text,
        });
    }

    let zero_width = approx_text_width("0", label_size);
    if origin.x > viewport.x_min
        && origin.x < viewport.x_max + zero_width + 8.0
        && origin.y > viewport.y_min - size
        && origin.y < viewport.y_max
    {
        labels.push(Label {
            text: "0".to_string(),
            baseline: ScreenPoint::new(origin.x - zero_width - 8.0, origin.y + size),
        });
    }

    labels
}

// ================================================================================
// Geometric aid layer
// ================================================================================

/// A screen-space arc around the plot origin. Angles follow the surface's
/// y-down convention, so Cartesian angle `a` is screen angle `-a`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcSpec {
    pub start_angle: f64,
    pub end_angle: f64,
    pub width: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeometricAid {
    pub center: ScreenPoint,
    /// Circle radius in pixels.
    pub radius: f64,
    /// End of the radius drawn at angle `x`.
    pub radius_end: ScreenPoint,
    pub arcs: Vec<ArcSpec>,
}

/// Circle of radius `r`, the radius at angle `x`, and the arcs sweeping
/// from angle 0 to `x`. A second, thicker arc shows the part past one
/// full turn when `|x| > 2π`.
pub fn geometric_aid(cs: &CoordinateSystem, x: f64, r: f64, width: f32) -> GeometricAid {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };

    let mut arcs = vec![ArcSpec {
        start_angle: 0.0,
        end_angle: -sign * x.abs().min(TAU),
        width: width - 1.0,
    }];
    if x.abs() > TAU {
        arcs.push(ArcSpec {
            start_angle: 0.0,
            end_angle: -sign * (x.abs() - TAU).min(TAU),
            width: width + 1.0,
        });
    }

    GeometricAid {
        center: cs.to_screen(PlotPoint::ORIGIN),
        radius: r.abs() * cs.pixels_per_unit(),
        radius_end: cs.to_screen(PlotPoint::new(r * x.cos(), r * x.sin())),
        arcs,
    }
}

// ================================================================================
// Vector layer
// ================================================================================

/// Which axis a term lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Real,
    Imaginary,
}

/// Filled arrowhead triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrow {
    pub tip: ScreenPoint,
    pub left: ScreenPoint,
    pub right: ScreenPoint,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VectorShape {
    pub index: usize,
    pub component: Component,
    pub shaft: Option<Segment>,
    pub arrow: Option<Arrow>,
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Screen shapes of the vector chain.
///
/// Terms shorter than one pixel are skipped; once such a term appears past
/// the series' decreasing index the remaining terms are all negligible and
/// the walk stops.
pub fn vector_shapes(series: &SeriesState, cs: &CoordinateSystem, arrow_size: f64) -> Vec<VectorShape> {
    let viewport = cs.viewport();
    let ppu = cs.pixels_per_unit();
    let mut shapes = Vec::new();

    for n in 0..TERM_COUNT - 1 {
        let term = series.terms[n];
        let length = term.abs() * ppu;

        if length <= 1.0 {
            if series.decreasing_index.is_some_and(|index| n > index) {
                break;
            }
            continue;
        }

        let size = (0.5 * length).min(arrow_size);
        let start = series.partial_sums[n];
        let tip = cs.to_screen(series.partial_sums[n + 1]);
        let dir = direction(n);

        let (component, (shaft, arrow)) = if n % 2 == 0 {
            let directional_size = dir.x * sign(term) * size;
            (
                Component::Real,
                horizontal_vector(cs, &viewport, start, tip, directional_size, size),
            )
        } else {
            let directional_size = dir.y * sign(term) * size;
            (
                Component::Imaginary,
                vertical_vector(cs, &viewport, start, tip, directional_size, size),
            )
        };

        shapes.push(VectorShape {
            index: n,
            component,
            shaft,
            arrow,
        });
    }

    shapes
}

fn horizontal_vector(
    cs: &CoordinateSystem,
    viewport: &Viewport,
    start: PlotPoint,
    tip: ScreenPoint,
    directional_size: f64,
    size: f64,
) -> (Option<Segment>, Option<Arrow>) {
    let start_y = cs.to_screen_y(start.y);
    let shaft = (start_y > viewport.y_min && start_y < viewport.y_max).then(|| {
        Segment::new(
            ScreenPoint::new(viewport.clamp_x(cs.to_screen_x(start.x)), start_y),
            ScreenPoint::new(viewport.clamp_x(tip.x - directional_size), tip.y),
        )
    });
    let arrow = viewport.contains(tip, size).then(|| {
        let base_x = tip.x - directional_size;
        Arrow {
            tip,
            left: ScreenPoint::new(base_x, tip.y - size / 2.0),
            right: ScreenPoint::new(base_x, tip.y + size / 2.0),
        }
    });
    (shaft, arrow)
}

fn vertical_vector(
    cs: &CoordinateSystem,
    viewport: &Viewport,
    start: PlotPoint,
    tip: ScreenPoint,
    directional_size: f64,
    size: f64,
) -> (Option<Segment>, Option<Arrow>) {
    let start_x = cs.to_screen_x(start.x);
    // screen y grows downwards, so the arrow base sits below an upward tip
    let shaft = (start_x > viewport.x_min && start_x < viewport.x_max).then(|| {
        Segment::new(
            ScreenPoint::new(start_x, viewport.clamp_y(cs.to_screen_y(start.y))),
            ScreenPoint::new(tip.x, viewport.clamp_y(tip.y + directional_size)),
        )
    });
    let arrow = viewport.contains(tip, size).then(|| {
        let base_y = tip.y + directional_size;
        Arrow {
            tip,
            left: ScreenPoint::new(tip.x - size / 2.0, base_y),
            right: ScreenPoint::new(tip.x + size / 2.0, base_y),
        }
    });
    (shaft, arrow)
}

// ================================================================================
// Points layer
// ================================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub center: ScreenPoint,
    pub radius: f64,
    pub color: Color,
    /// Radius of the background-colored disc drawn underneath, if any.
    pub halo: Option<f64>,
}

/// Evaluates every point descriptor at the current parameter values.
pub fn point_markers(
    points: &[PointDescriptor],
    params: &Parameters,
    cs: &CoordinateSystem,
) -> Vec<Marker> {
    points
        .iter()
        .map(|point| Marker {
            center: cs.to_screen(PlotPoint::new(point.x(params), point.y(params))),
            radius: point.size,
            color: point.color,
            halo: point.outline.then_some(point.size + POINT_HALO),
        })
        .collect()
}

// ================================================================================
// Drawing
// ================================================================================

fn solid(color: Color, width: f32) -> Stroke<'static> {
    Stroke::default().with_color(color).with_width(width)
}

fn dashed(color: Color, width: f32) -> Stroke<'static> {
    Stroke {
        line_dash: LineDash {
            segments: &DASH_PATTERN,
            offset: 0,
        },
        ..solid(color, width)
    }
}

fn circle(center: ScreenPoint, radius: f64) -> Path {
    Path::circle(center.into(), radius as f32)
}

fn stroke_segments(frame: &mut canvas::Frame, segments: &[Segment], stroke: Stroke<'_>) {
    if segments.is_empty() {
        return;
    }
    let path = Path::new(|builder| {
        for segment in segments {
            builder.move_to(segment.from.into());
            builder.line_to(segment.to.into());
        }
    });
    frame.stroke(&path, stroke);
}

pub fn draw_background(frame: &mut canvas::Frame, size: Size, color: Color) {
    frame.fill_rectangle(Point::ORIGIN, size, color);
}

pub fn draw_axis_layer(frame: &mut canvas::Frame, layout: &AxisLayout, style: &RenderStyle) {
    let palette = &style.palette;
    stroke_segments(
        frame,
        &layout.secondary_grid,
        solid(palette.secondary_grid, style.secondary_grid_line_width),
    );
    stroke_segments(frame, &layout.grid, solid(palette.grid, style.grid_line_width));
    stroke_segments(frame, &layout.axes, solid(palette.axis, style.axis_line_width));
    stroke_segments(
        frame,
        &layout.borders,
        solid(palette.grid, style.grid_line_width + 1.0),
    );

    for label in &layout.labels {
        draw_label(frame, label, style);
    }

    if let Some(origin) = layout.origin {
        frame.fill(&circle(origin, ORIGIN_DOT_RADIUS), palette.axis);
    }
}

/// Draws a tick label over a background-colored halo so it stays legible
/// on top of grid lines.
fn draw_label(frame: &mut canvas::Frame, label: &Label, style: &RenderStyle) {
    let size = style.label_size;
    let top_left = Point::new(
        label.baseline.x as f32,
        label.baseline.y as f32 - size,
    );
    let text = |position: Point, color: Color| canvas::Text {
        content: label.text.clone(),
        position,
        color,
        size: Pixels(size),
        ..canvas::Text::default()
    };

    let h = LABEL_HALO_WIDTH;
    for (dx, dy) in [(-h, 0.0), (h, 0.0), (0.0, -h), (0.0, h)] {
        frame.fill_text(text(
            Point::new(top_left.x + dx, top_left.y + dy),
            style.palette.background,
        ));
    }
    frame.fill_text(text(top_left, style.palette.grid));
}

pub fn draw_geometric_aid(frame: &mut canvas::Frame, aid: &GeometricAid, style: &RenderStyle) {
    let color = style.palette.geometric_aid;
    let width = style.geometric_aid_width - 1.0;

    frame.stroke(&circle(aid.center, aid.radius), dashed(color, width));
    frame.stroke(
        &Path::line(aid.center.into(), aid.radius_end.into()),
        dashed(color, width),
    );

    for arc in &aid.arcs {
        let path = Path::new(|builder| {
            builder.arc(canvas::path::Arc {
                center: aid.center.into(),
                radius: aid.radius as f32,
                start_angle: Radians(arc.start_angle as f32),
                end_angle: Radians(arc.end_angle as f32),
            });
        });
        frame.stroke(&path, solid(color, arc.width));
    }
}

pub fn draw_vectors(frame: &mut canvas::Frame, shapes: &[VectorShape], style: &RenderStyle) {
    for shape in shapes {
        let color = match shape.component {
            Component::Real => style.palette.real,
            Component::Imaginary => style.palette.imaginary,
        };
        if let Some(shaft) = &shape.shaft {
            frame.stroke(&shaft.path(), solid(color, style.vector_width));
        }
        if let Some(arrow) = &shape.arrow {
            let head = Path::new(|builder| {
                builder.move_to(arrow.tip.into());
                builder.line_to(arrow.left.into());
                builder.line_to(arrow.right.into());
                builder.close();
            });
            frame.fill(&head, color);
        }
    }
}

pub fn draw_points(frame: &mut canvas::Frame, markers: &[Marker], style: &RenderStyle) {
    for marker in markers {
        if let Some(halo) = marker.halo {
            frame.fill(&circle(marker.center, halo), style.palette.background);
        }
        frame.fill(&circle(marker.center, marker.radius), marker.color);
    }
}
