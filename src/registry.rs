//! Application-level collection of plots.
//!
//! Routes events to plots by id and debounces surface resizes: a plot that
//! changes size is blanked immediately and resized only once no further
//! size change has arrived for [`RESIZE_DEBOUNCE`].

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::interaction::PlotEvent;
use crate::layers::Redraw;
use crate::plot::ComplexpPlot;

pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Default)]
pub struct PlotRegistry {
    plots: BTreeMap<String, ComplexpPlot>,
    /// Sizes waiting for the debounce to elapse.
    pending: BTreeMap<String, (f64, f64)>,
    last_resize: Option<Instant>,
}

impl PlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plot` under `id`, returning the plot it replaces.
    pub fn insert(&mut self, id: impl Into<String>, plot: ComplexpPlot) -> Option<ComplexpPlot> {
        let id = id.into();
        debug!(%id, "plot registered");
        self.pending.remove(&id);
        self.plots.insert(id, plot)
    }

    pub fn remove(&mut self, id: &str) -> Option<ComplexpPlot> {
        self.pending.remove(id);
        self.plots.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&ComplexpPlot> {
        self.plots.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ComplexpPlot> {
        self.plots.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComplexpPlot)> {
        self.plots.iter().map(|(id, plot)| (id.as_str(), plot))
    }

    pub fn is_resize_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// True while any plot needs frame ticks or a resize is waiting.
    pub fn is_animating(&self) -> bool {
        !self.pending.is_empty() || self.plots.values().any(ComplexpPlot::is_animating)
    }

    /// Delivers `event` to plot `id`. Resizes go through the debounce.
    pub fn dispatch(&mut self, id: &str, event: PlotEvent, now: Instant) -> Redraw {
        let Some(plot) = self.plots.get_mut(id) else {
            warn!(%id, "event for unknown plot");
            return Redraw::NONE;
        };

        match event {
            PlotEvent::SurfaceResized { width, height } if plot.surface_size().is_some() => {
                if self.pending.get(id) == Some(&(width, height)) {
                    return Redraw::NONE;
                }
                debug!(%id, width, height, "resize deferred");
                plot.note_surface_size(width, height);
                plot.clear_plot();
                self.pending.insert(id.to_string(), (width, height));
                self.last_resize = Some(now);
                Redraw::ALL
            }
            // the first sizing is applied right away
            event => plot.handle(event),
        }
    }

    /// Runs one frame for every plot and applies resizes whose debounce has
    /// elapsed.
    pub fn tick(&mut self, now: Instant) {
        for plot in self.plots.values_mut() {
            plot.handle(PlotEvent::Frame(now));
        }

        let Some(last) = self.last_resize else {
            return;
        };
        if now.saturating_duration_since(last) < RESIZE_DEBOUNCE {
            return;
        }

        self.last_resize = None;
        for (id, (width, height)) in std::mem::take(&mut self.pending) {
            if let Some(plot) = self.plots.get_mut(&id) {
                plot.resize_canvas(width, height);
                plot.draw_plot();
            }
        }
    }
}
