//! A single complex-exponential plot and its state transitions.

use std::collections::BTreeMap;
use std::time::Instant;

use iced::widget::canvas::{self, Canvas, Geometry};
use iced::{Color, Element, Length, Rectangle, Renderer};
use tracing::{debug, trace, warn};

use crate::animation::{Gesture, Scheduler, SchedulerState, ZoomAnimation};
use crate::canvas::PlotCanvas;
use crate::config::{PlotConfig, PointDescriptor};
use crate::coords::{CoordinateSystem, PlotPoint};
use crate::error::{PlotError, Result};
use crate::fullscreen::{FullscreenPhase, FullscreenTransition};
use crate::interaction::{PlotEvent, PointerState, ViewChange, wheel_zoom_factor};
use crate::layers::{Layer, Layers, Redraw};
use crate::params::{LabelTypesetter, ParameterControl, Parameters, PlainLabels, SweepState};
use crate::renderer::{self, RenderStyle};
use crate::series::SeriesState;

/// Angle parameter of the series.
pub const ANGLE: &str = "x";
/// Radius parameter of the series.
pub const RADIUS: &str = "r";

pub struct ComplexpPlot {
    config: PlotConfig,
    style: RenderStyle,
    cs: CoordinateSystem,
    series: SeriesState,
    params: Parameters,
    controls: Vec<ParameterControl>,
    labels: BTreeMap<String, String>,
    typesetter: Box<dyn LabelTypesetter>,
    points: Vec<PointDescriptor>,

    scheduler: Scheduler,
    pointer: PointerState,
    layers: Layers,

    is_grid_visible: bool,
    is_geometric_aid_visible: bool,
    is_fullscreen: bool,
    transition: Option<FullscreenTransition>,
    opacity: f32,
    /// Size last reported by the host, which may be ahead of the
    /// coordinate system while a resize is debounced.
    surface_size: Option<(f64, f64)>,
    /// Set by [`ComplexpPlot::clear_plot`]: only the background is drawn.
    cleared: bool,
}

#[bon::bon]
impl ComplexpPlot {
    /// Builds a plot. `config` must declare the `x` and `r` parameters.
    #[builder]
    pub fn new(
        config: PlotConfig,
        #[builder(default)] points: Vec<PointDescriptor>,
        #[builder(default = Box::new(PlainLabels) as Box<dyn LabelTypesetter>)] typesetter: Box<dyn LabelTypesetter>,
    ) -> Result<Self> {
        config.validate()?;
        for id in [ANGLE, RADIUS] {
            if config.parameter(id).is_none() {
                return Err(PlotError::MissingParameter(id));
            }
        }
        let style = RenderStyle::from_config(&config)?;

        let [cx, cy] = config.viewport_center;
        let cs = CoordinateSystem::new(0.0, 0.0, PlotPoint::new(cx, cy), config.initial_pixels_per_unit)
            .with_inset(config.inset);

        let mut params = Parameters::default();
        let mut controls = Vec::with_capacity(config.parameters.len());
        let mut labels = BTreeMap::new();
        for p in &config.parameters {
            let bounds = p.bounds();
            let value = bounds.clamp(p.value);
            params.set(p.id.clone(), value);
            labels.insert(p.id.clone(), typesetter.typeset(&p.id, value));
            controls.push(ParameterControl {
                id: p.id.clone(),
                bounds,
                sweep: SweepState::new(p.animation_speed),
            });
        }

        let series = SeriesState::compute(params.value(ANGLE), params.value(RADIUS));
        debug!(parameters = controls.len(), points = points.len(), "plot created");

        Ok(Self {
            is_grid_visible: config.is_grid_visible,
            config,
            style,
            cs,
            series,
            params,
            controls,
            labels,
            typesetter,
            points,
            scheduler: Scheduler::default(),
            pointer: PointerState::default(),
            layers: Layers::default(),
            is_geometric_aid_visible: false,
            is_fullscreen: false,
            transition: None,
            opacity: 1.0,
            surface_size: None,
            cleared: false,
        })
    }
}

impl ComplexpPlot {
    // ---- Accessors ----

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn coordinate_system(&self) -> &CoordinateSystem {
        &self.cs
    }

    pub fn series(&self) -> &SeriesState {
        &self.series
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn controls(&self) -> &[ParameterControl] {
        &self.controls
    }

    pub fn control(&self, id: &str) -> Option<&ParameterControl> {
        self.controls.iter().find(|c| c.id == id)
    }

    /// Displayed text for parameter `id`.
    pub fn label(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn is_grid_visible(&self) -> bool {
        self.is_grid_visible
    }

    pub fn is_geometric_aid_visible(&self) -> bool {
        self.is_geometric_aid_visible
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_dragging()
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Opacity the plot is currently shown with; below 1 while fading in
    /// after a fullscreen toggle.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn surface_size(&self) -> Option<(f64, f64)> {
        self.surface_size
    }

    /// True while frame ticks are needed.
    pub fn is_animating(&self) -> bool {
        self.scheduler.is_running() || self.transition.is_some()
    }

    // ---- Exposed operations ----

    /// Redraws every layer.
    pub fn draw_plot(&mut self) {
        self.cleared = false;
        self.layers.invalidate(Redraw::ALL);
    }

    /// Blanks every layer down to the background until the next
    /// [`ComplexpPlot::draw_plot`].
    pub fn clear_plot(&mut self) {
        self.cleared = true;
        self.layers.invalidate(Redraw::ALL);
    }

    /// Adopts a new surface size, keeping the Cartesian centre of view.
    pub fn resize_canvas(&mut self, width: f64, height: f64) {
        debug!(width, height, "resizing plot");
        self.surface_size = Some((width, height));
        self.cs.update_system(width, height);
        self.layers.invalidate(Redraw::ALL);
    }

    /// Records a size reported by the host without applying it yet.
    pub(crate) fn note_surface_size(&mut self, width: f64, height: f64) {
        self.surface_size = Some((width, height));
    }

    // ---- Events ----

    /// Applies one event and invalidates the layers it changed.
    pub fn handle(&mut self, event: PlotEvent) -> Redraw {
        let redraw = self.apply(event);
        if !redraw.is_none() {
            trace!(?redraw, "invalidating layers");
            self.layers.invalidate(redraw);
        }
        redraw
    }

    fn apply(&mut self, event: PlotEvent) -> Redraw {
        let options = &self.config;
        match event {
            PlotEvent::PointerPressed(position) => {
                if options.is_translation_active {
                    self.pointer.press(position);
                }
                Redraw::NONE
            }
            PlotEvent::PointerMoved(position) => {
                let change = self.pointer.drag_to(position);
                self.apply_view_change(change)
            }
            PlotEvent::PointerReleased => {
                self.pointer.release();
                Redraw::NONE
            }
            PlotEvent::WheelScrolled { delta_y, position } => {
                if !options.is_zoom_active {
                    return Redraw::NONE;
                }
                self.scheduler.cancel_gesture();
                self.apply_view_change(Some(ViewChange::Zoom {
                    factor: wheel_zoom_factor(delta_y),
                    center: position,
                }))
            }
            PlotEvent::FingerPressed { id, position } => {
                self.pointer.finger_pressed(id, position);
                Redraw::NONE
            }
            PlotEvent::FingerMoved { id, position } => {
                let change = self.pointer.finger_moved(id, position);
                self.apply_view_change(change)
            }
            PlotEvent::FingerLifted { id } => {
                self.pointer.finger_lifted(id);
                Redraw::NONE
            }

            PlotEvent::ZoomIn if options.is_zoom_active => {
                self.scheduler
                    .start_gesture(Gesture::Zoom(ZoomAnimation::zoom_in()));
                Redraw::NONE
            }
            PlotEvent::ZoomOut if options.is_zoom_active => {
                self.scheduler
                    .start_gesture(Gesture::Zoom(ZoomAnimation::zoom_out()));
                Redraw::NONE
            }
            PlotEvent::Refresh if options.is_refresh_active => {
                let [cx, cy] = options.viewport_center;
                let gesture = Gesture::refresh(
                    PlotPoint::new(cx, cy),
                    options.initial_pixels_per_unit,
                    &self.cs,
                );
                self.scheduler.start_gesture(gesture);
                Redraw::NONE
            }
            PlotEvent::ToggleGrid if options.is_grid_toggle_active => {
                self.is_grid_visible = !self.is_grid_visible;
                debug!(visible = self.is_grid_visible, "grid toggled");
                Redraw {
                    axis: true,
                    ..Redraw::NONE
                }
            }
            PlotEvent::ToggleGeometricAid => {
                self.is_geometric_aid_visible = !self.is_geometric_aid_visible;
                debug!(visible = self.is_geometric_aid_visible, "geometric aid toggled");
                Redraw {
                    geometric_aid: true,
                    ..Redraw::NONE
                }
            }
            PlotEvent::ToggleFullscreen if options.is_fullscreen_toggle_active => {
                self.is_fullscreen = !self.is_fullscreen;
                debug!(fullscreen = self.is_fullscreen, "fullscreen toggled");
                self.transition = Some(FullscreenTransition::new());
                self.opacity = 0.0;
                Redraw::NONE
            }
            PlotEvent::TogglePlay(id) => {
                let Some(control) = self.controls.iter_mut().find(|c| c.id == id) else {
                    warn!(%id, "play toggled for unknown parameter");
                    return Redraw::NONE;
                };
                control.sweep.is_playing = !control.sweep.is_playing;
                self.scheduler.sync_sweep(&self.controls);
                Redraw::NONE
            }
            PlotEvent::ParameterChanged(id, value) => self.set_parameter(&id, value),

            PlotEvent::SurfaceResized { width, height } => {
                self.resize_canvas(width, height);
                Redraw::ALL
            }
            PlotEvent::Frame(now) => self.tick(now),

            PlotEvent::ZoomIn
            | PlotEvent::ZoomOut
            | PlotEvent::Refresh
            | PlotEvent::ToggleGrid
            | PlotEvent::ToggleFullscreen => {
                debug!(?event, "ignored, disabled by options");
                Redraw::NONE
            }
        }
    }

    fn apply_view_change(&mut self, change: Option<ViewChange>) -> Redraw {
        match change {
            Some(ViewChange::Pan { dx, dy }) if self.config.is_translation_active => {
                self.cs.translate_origin(dx, dy);
                Redraw::ALL
            }
            Some(ViewChange::Zoom { factor, center }) if self.config.is_zoom_active => {
                self.cs.update_zoom(factor, center);
                Redraw::ALL
            }
            _ => Redraw::NONE,
        }
    }

    /// Stores a clamped parameter value and recomputes the series.
    fn set_parameter(&mut self, id: &str, value: f64) -> Redraw {
        let Some(control) = self.controls.iter().find(|c| c.id == id) else {
            warn!(%id, "value set for unknown parameter");
            return Redraw::NONE;
        };
        let value = control.bounds.clamp(value);
        self.params.set(id, value);
        self.refresh_label(id);
        self.recompute_series();
        Redraw::PARAMETER_LAYERS
    }

    fn refresh_label(&mut self, id: &str) {
        let text = self.typesetter.typeset(id, self.params.value(id));
        self.labels.insert(id.to_string(), text);
    }

    fn recompute_series(&mut self) {
        self.series = SeriesState::compute(self.params.value(ANGLE), self.params.value(RADIUS));
    }

    /// Runs one frame: animations mutate state first, then the series is
    /// recomputed, and the returned layers are redrawn last.
    fn tick(&mut self, now: Instant) -> Redraw {
        let outcome = self
            .scheduler
            .tick(&mut self.cs, &mut self.controls, &mut self.params);

        for id in &outcome.swept {
            self.refresh_label(id);
        }
        if !outcome.swept.is_empty() {
            self.recompute_series();
        }

        let mut redraw = outcome.redraw;
        if let Some(transition) = self.transition.as_mut() {
            let step = transition.poll(now);
            self.opacity = step.opacity;
            if step.settled_now {
                redraw = Redraw::ALL;
            }
            if step.phase == FullscreenPhase::Complete {
                debug!("fullscreen transition complete");
                self.transition = None;
            }
        }
        redraw
    }

    // ---- Drawing ----

    pub fn view(&self) -> Element<'_, PlotEvent> {
        Canvas::new(PlotCanvas::new(self))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Produces the layer geometries, bottom first, reusing every layer
    /// whose cache is still valid.
    pub fn draw(&self, renderer: &Renderer, bounds: Rectangle) -> Vec<Geometry> {
        let size = bounds.size();
        let mut geometries: Vec<Geometry> = Layer::ALL
            .iter()
            .map(|&layer| {
                self.layers
                    .cache(layer)
                    .draw(renderer, size, |frame| self.draw_layer(layer, frame))
            })
            .collect();

        if self.opacity < 1.0 {
            let mut frame = canvas::Frame::new(renderer, size);
            let background = self.style.palette.background;
            let veil = Color {
                a: background.a * (1.0 - self.opacity),
                ..background
            };
            renderer::draw_background(&mut frame, size, veil);
            geometries.push(frame.into_geometry());
        }
        geometries
    }

    fn draw_layer(&self, layer: Layer, frame: &mut canvas::Frame) {
        if layer == Layer::Axis {
            let size = frame.size();
            renderer::draw_background(frame, size, self.style.palette.background);
        }
        if self.cleared {
            return;
        }

        match layer {
            Layer::Axis => {
                let layout =
                    renderer::axis_layout(&self.cs, self.style.label_size, self.is_grid_visible);
                renderer::draw_axis_layer(frame, &layout, &self.style);
            }
            Layer::GeometricAid if self.is_geometric_aid_visible => {
                let aid = renderer::geometric_aid(
                    &self.cs,
                    self.params.value(ANGLE),
                    self.params.value(RADIUS),
                    self.style.geometric_aid_width,
                );
                renderer::draw_geometric_aid(frame, &aid, &self.style);
            }
            Layer::GeometricAid => {}
            Layer::Vectors => {
                let shapes =
                    renderer::vector_shapes(&self.series, &self.cs, self.style.arrow_size);
                renderer::draw_vectors(frame, &shapes, &self.style);
            }
            Layer::Points => {
                let markers = renderer::point_markers(&self.points, &self.params, &self.cs);
                renderer::draw_points(frame, &markers, &self.style);
            }
        }
    }
}

impl std::fmt::Debug for ComplexpPlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplexpPlot")
            .field("cs", &self.cs)
            .field("params", &self.params)
            .field("scheduler", &self.scheduler.state())
            .field("is_fullscreen", &self.is_fullscreen)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterConfig;
    use crate::coords::ScreenPoint;

    fn config() -> PlotConfig {
        PlotConfig {
            parameters: vec![
                ParameterConfig::new(ANGLE, -10.0, 10.0, 0.01, 1.0),
                ParameterConfig::new(RADIUS, 0.0, 5.0, 0.01, 1.0),
            ],
            ..PlotConfig::default()
        }
    }

    fn plot() -> ComplexpPlot {
        let mut plot = ComplexpPlot::builder().config(config()).build().unwrap();
        plot.handle(PlotEvent::SurfaceResized {
            width: 800.0,
            height: 600.0,
        });
        plot
    }

    #[test]
    fn test_missing_parameter_is_rejected() {
        let mut config = config();
        config.parameters.retain(|p| p.id != RADIUS);
        assert!(matches!(
            ComplexpPlot::builder().config(config).build(),
            Err(PlotError::MissingParameter("r"))
        ));
    }

    #[test]
    fn test_initial_values_are_clamped() {
        let mut config = config();
        config.parameters[1].value = 50.0;
        let plot = ComplexpPlot::builder().config(config).build().unwrap();
        assert_eq!(plot.parameters().value(RADIUS), 5.0);
        assert_eq!(plot.label(RADIUS), Some("r = 5"));
    }

    #[test]
    fn test_parameter_change_skips_axis_layer() {
        let mut plot = plot();
        let redraw = plot.handle(PlotEvent::ParameterChanged(ANGLE.to_string(), 42.0));
        assert_eq!(redraw, Redraw::PARAMETER_LAYERS);
        assert_eq!(plot.parameters().value(ANGLE), 10.0);
        assert_eq!(plot.label(ANGLE), Some("x = 10"));
        assert_eq!(plot.series(), &SeriesState::compute(10.0, 1.0));
    }

    #[test]
    fn test_unknown_parameter_is_ignored() {
        let mut plot = plot();
        let before = plot.parameters().clone();
        assert!(plot.handle(PlotEvent::ParameterChanged("q".into(), 1.0)).is_none());
        assert!(plot.handle(PlotEvent::TogglePlay("q".into())).is_none());
        assert_eq!(plot.parameters(), &before);
        assert_eq!(plot.scheduler_state(), SchedulerState::Idle);
    }

    #[test]
    fn test_drag_pans() {
        let mut plot = plot();
        let origin = plot.coordinate_system().origin();
        plot.handle(PlotEvent::PointerPressed(ScreenPoint::new(10.0, 10.0)));
        let redraw = plot.handle(PlotEvent::PointerMoved(ScreenPoint::new(40.0, 30.0)));
        assert_eq!(redraw, Redraw::ALL);
        plot.handle(PlotEvent::PointerReleased);
        assert!(plot.handle(PlotEvent::PointerMoved(ScreenPoint::new(0.0, 0.0))).is_none());

        let moved = plot.coordinate_system().origin();
        assert_eq!(moved.x - origin.x, 30.0);
        assert_eq!(moved.y - origin.y, 20.0);
    }

    #[test]
    fn test_disabled_translation_blocks_drag() {
        let mut config = config();
        config.is_translation_active = false;
        let mut plot = ComplexpPlot::builder().config(config).build().unwrap();
        plot.handle(PlotEvent::PointerPressed(ScreenPoint::new(10.0, 10.0)));
        assert!(plot.handle(PlotEvent::PointerMoved(ScreenPoint::new(40.0, 30.0))).is_none());
    }

    #[test]
    fn test_wheel_cancels_gesture() {
        let mut plot = plot();
        plot.handle(PlotEvent::ZoomIn);
        assert_eq!(plot.scheduler_state(), SchedulerState::GestureRunning);

        let cursor = ScreenPoint::new(100.0, 100.0);
        let under_cursor = plot.coordinate_system().to_cartesian(cursor);
        plot.handle(PlotEvent::WheelScrolled {
            delta_y: 120.0,
            position: cursor,
        });
        assert_eq!(plot.scheduler_state(), SchedulerState::Idle);
        assert!(plot.coordinate_system().pixels_per_unit() < 100.0);
        let after = plot.coordinate_system().to_cartesian(cursor);
        assert!((after.x - under_cursor.x).abs() < 1e-9);
    }

    #[test]
    fn test_toggles_respect_options() {
        let mut config = config();
        config.is_grid_toggle_active = false;
        config.is_zoom_active = false;
        let mut plot = ComplexpPlot::builder().config(config).build().unwrap();

        assert!(plot.handle(PlotEvent::ToggleGrid).is_none());
        assert!(plot.is_grid_visible());
        plot.handle(PlotEvent::ZoomIn);
        assert!(!plot.is_animating());

        let redraw = plot.handle(PlotEvent::ToggleGeometricAid);
        assert!(redraw.geometric_aid && !redraw.axis);
        assert!(plot.is_geometric_aid_visible());
    }

    #[test]
    fn test_sweep_runs_until_paused() {
        let mut plot = plot();
        let now = Instant::now();
        plot.handle(PlotEvent::TogglePlay(ANGLE.to_string()));
        assert_eq!(plot.scheduler_state(), SchedulerState::SweepRunning);

        let redraw = plot.handle(PlotEvent::Frame(now));
        assert_eq!(redraw, Redraw::PARAMETER_LAYERS);
        assert!((plot.parameters().value(ANGLE) - 1.005).abs() < 1e-12);
        assert_eq!(plot.label(ANGLE), Some("x = 1"));

        plot.handle(PlotEvent::TogglePlay(ANGLE.to_string()));
        assert!(!plot.is_animating());
        assert!(plot.handle(PlotEvent::Frame(now)).is_none());
    }

    #[test]
    fn test_fullscreen_transition_redraws_once_settled() {
        let mut plot = plot();
        let start = Instant::now();
        plot.handle(PlotEvent::ToggleFullscreen);
        assert!(plot.is_fullscreen());
        assert!(plot.is_animating());
        assert_eq!(plot.opacity(), 0.0);

        assert!(plot.handle(PlotEvent::Frame(start)).is_none());
        let settled = start + crate::fullscreen::LAYOUT_SETTLE;
        assert_eq!(plot.handle(PlotEvent::Frame(settled)), Redraw::ALL);

        let done = start + crate::fullscreen::FADE_DURATION;
        plot.handle(PlotEvent::Frame(done));
        assert_eq!(plot.opacity(), 1.0);
        assert!(!plot.is_animating());
    }

    #[test]
    fn test_clear_and_draw() {
        let mut plot = plot();
        plot.clear_plot();
        assert!(plot.is_cleared());
        plot.draw_plot();
        assert!(!plot.is_cleared());
    }
}
