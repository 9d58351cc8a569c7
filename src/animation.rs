//! Frame-driven animations: zoom/refresh gestures and parameter sweeps.
//!
//! A single [`Scheduler`] owns both animation families. Each frame tick
//! first mutates the coordinate system and parameter values, and reports
//! which layers need to be redrawn; recomputing the series and redrawing
//! is left to the caller so that ordering within a tick stays explicit.

use tracing::{debug, trace};

use crate::coords::{CoordinateSystem, PlotPoint};
use crate::layers::Redraw;
use crate::params::{ParameterControl, Parameters};

/// Per-frame zoom multiplier of the button gestures.
pub const ZOOM_INCREMENT: f64 = 1.05;
/// Zoom reached by one press of the zoom-in button, relative to the start.
pub const ZOOM_IN_TARGET: f64 = 2.0;
/// Zoom reached by one press of the zoom-out button, relative to the start.
pub const ZOOM_OUT_TARGET: f64 = 0.5;
/// Fraction of the remaining distance covered by one auto-translate step.
pub const TRANSLATION_FACTOR: f64 = 0.05;

// ================================================================================
// Zoom
// ================================================================================

/// Screen point a zoom animation scales around, resolved every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomCenter {
    SurfaceCenter,
    CartesianOrigin,
}

/// Multiplicative zoom easing towards a target relative zoom.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomAnimation {
    current_zoom: f64,
    increment: f64,
    end_zoom: f64,
    center: ZoomCenter,
    done: bool,
}

impl ZoomAnimation {
    pub fn new(end_zoom: f64, center: ZoomCenter) -> Self {
        let increment = if end_zoom > 1.0 {
            ZOOM_INCREMENT
        } else {
            1.0 / ZOOM_INCREMENT
        };
        Self {
            current_zoom: 1.0,
            increment,
            end_zoom,
            center,
            done: false,
        }
    }

    pub fn zoom_in() -> Self {
        Self::new(ZOOM_IN_TARGET, ZoomCenter::SurfaceCenter)
    }

    pub fn zoom_out() -> Self {
        Self::new(ZOOM_OUT_TARGET, ZoomCenter::SurfaceCenter)
    }

    /// Zooms about the Cartesian origin until the scale is `pixels_per_unit`.
    pub fn to_scale(pixels_per_unit: f64, cs: &CoordinateSystem) -> Self {
        Self::new(
            pixels_per_unit / cs.pixels_per_unit(),
            ZoomCenter::CartesianOrigin,
        )
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Accumulated zoom relative to the start of the gesture.
    pub fn current_zoom(&self) -> f64 {
        self.current_zoom
    }

    pub fn step(&mut self, cs: &mut CoordinateSystem) {
        if self.done {
            return;
        }

        let previous = self.current_zoom;
        self.current_zoom *= self.increment;

        let mut factor = self.increment;
        if self.reached_end() {
            // land exactly on the target with the last frame
            factor = self.end_zoom / previous;
            self.current_zoom = self.end_zoom;
            self.done = true;
        }

        let center = match self.center {
            ZoomCenter::SurfaceCenter => cs.screen_center(),
            ZoomCenter::CartesianOrigin => cs.to_screen(PlotPoint::ORIGIN),
        };
        cs.update_zoom(factor, center);
    }

    fn reached_end(&self) -> bool {
        if self.increment > 1.0 {
            self.current_zoom > self.end_zoom / self.increment
        } else {
            self.current_zoom <= self.end_zoom * self.increment
        }
    }
}

// ================================================================================
// Auto-translate
// ================================================================================

/// Exponential-decay approach that brings `target` to the surface centre.
///
/// Each axis moves `factor` of its remaining pixel distance plus one pixel
/// per step, and stops on its own once the remaining distance is consumed.
#[derive(Clone, Debug, PartialEq)]
pub struct AutoTranslate {
    target: PlotPoint,
    factor: f64,
    translating_x: bool,
    translating_y: bool,
}

impl AutoTranslate {
    pub fn new(target: PlotPoint, factor: f64) -> Self {
        Self {
            target,
            factor,
            translating_x: true,
            translating_y: true,
        }
    }

    pub fn is_translating(&self) -> bool {
        self.translating_x || self.translating_y
    }

    pub fn is_translating_x(&self) -> bool {
        self.translating_x
    }

    pub fn is_translating_y(&self) -> bool {
        self.translating_y
    }

    /// Remaining pixel offset `(x, y)` to move the origin by.
    pub fn remaining(&self, cs: &CoordinateSystem) -> (f64, f64) {
        let center = cs.view_center();
        let ppu = cs.pixels_per_unit();
        (
            (center.x - self.target.x) * ppu,
            -(center.y - self.target.y) * ppu,
        )
    }

    pub fn step(&mut self, cs: &mut CoordinateSystem) {
        let (total_x, total_y) = self.remaining(cs);
        let dx = axis_step(total_x, self.factor, &mut self.translating_x);
        let dy = axis_step(total_y, self.factor, &mut self.translating_y);
        cs.translate_origin(dx, dy);
    }
}

fn axis_step(total: f64, factor: f64, translating: &mut bool) -> f64 {
    if !*translating {
        return 0.0;
    }
    let mut increment = factor * total.abs() + 1.0;
    if increment >= total.abs() {
        increment = total.abs();
        *translating = false;
    }
    total.signum() * increment
}

// ================================================================================
// Scheduler
// ================================================================================

/// A bounded, run-until-done animation started by a button.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    Zoom(ZoomAnimation),
    /// Simultaneous zoom back to the initial scale and translation back to
    /// the initial centre; runs until both have finished.
    Refresh {
        zoom: ZoomAnimation,
        translate: AutoTranslate,
    },
}

impl Gesture {
    pub fn refresh(center: PlotPoint, pixels_per_unit: f64, cs: &CoordinateSystem) -> Self {
        Gesture::Refresh {
            zoom: ZoomAnimation::to_scale(pixels_per_unit, cs),
            translate: AutoTranslate::new(center, TRANSLATION_FACTOR),
        }
    }

    /// Advances one frame. Returns `true` while the gesture is still running.
    pub fn step(&mut self, cs: &mut CoordinateSystem) -> bool {
        match self {
            Gesture::Zoom(zoom) => {
                zoom.step(cs);
                !zoom.is_done()
            }
            Gesture::Refresh { zoom, translate } => {
                zoom.step(cs);
                translate.step(cs);
                !zoom.is_done() || translate.is_translating()
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    GestureRunning,
    SweepRunning,
    /// A gesture and a sweep share the same frame ticks.
    GestureAndSweep,
}

/// What one frame tick changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickOutcome {
    pub redraw: Redraw,
    /// Ids of parameters whose value moved this tick.
    pub swept: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    gesture: Option<Gesture>,
    sweeping: bool,
}

impl Scheduler {
    pub fn state(&self) -> SchedulerState {
        match (self.gesture.is_some(), self.sweeping) {
            (false, false) => SchedulerState::Idle,
            (true, false) => SchedulerState::GestureRunning,
            (false, true) => SchedulerState::SweepRunning,
            (true, true) => SchedulerState::GestureAndSweep,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() != SchedulerState::Idle
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// Starts `gesture`, replacing any gesture already running.
    pub fn start_gesture(&mut self, gesture: Gesture) {
        debug!(?gesture, "starting gesture");
        self.gesture = Some(gesture);
    }

    /// Stops the running gesture; the current frame is not rolled back.
    pub fn cancel_gesture(&mut self) {
        if self.gesture.take().is_some() {
            debug!("gesture cancelled");
        }
    }

    /// Re-evaluates whether any parameter is playing.
    pub fn sync_sweep(&mut self, controls: &[ParameterControl]) {
        let playing = controls.iter().any(|c| c.sweep.is_playing);
        if playing != self.sweeping {
            debug!(playing, "parameter sweep toggled");
            self.sweeping = playing;
        }
    }

    /// Runs one frame of every active animation.
    pub fn tick(
        &mut self,
        cs: &mut CoordinateSystem,
        controls: &mut [ParameterControl],
        params: &mut Parameters,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if let Some(gesture) = self.gesture.as_mut() {
            let running = gesture.step(cs);
            outcome.redraw = Redraw::ALL;
            if !running {
                debug!(ppu = cs.pixels_per_unit(), "gesture finished");
                self.gesture = None;
            }
        }

        if self.sweeping {
            for control in controls.iter_mut().filter(|c| c.sweep.is_playing) {
                let value = control.sweep.advance(params.value(&control.id), &control.bounds);
                trace!(id = %control.id, value, "sweep step");
                params.set(control.id.clone(), value);
                outcome.swept.push(control.id.clone());
            }
            outcome.redraw = outcome.redraw | Redraw::PARAMETER_LAYERS;
            self.sync_sweep(controls);
        }

        outcome
    }
}
