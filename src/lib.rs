//! Interactive plot of the Taylor series of `r * e^(ix)` drawn as a chain of
//! axis-aligned vectors, built on `iced` canvas.
//!
//! A [`ComplexpPlot`] owns everything about one plot: its coordinate system,
//! parameter values, animations and cached layers. Hosts feed it
//! [`PlotEvent`]s (directly or through a [`PlotRegistry`]) and embed
//! [`ComplexpPlot::view`] in their widget tree.

pub mod animation;
pub mod canvas;
pub mod config;
pub mod coords;
pub mod error;
pub mod fullscreen;
pub mod interaction;
pub mod layers;
pub mod params;
pub mod plot;
pub mod registry;
pub mod renderer;
pub mod series;
pub mod ticks;

pub use config::{ParameterConfig, PlotConfig, PointDescriptor};
pub use coords::{CoordinateSystem, PlotPoint, ScreenPoint};
pub use error::{PlotError, Result};
pub use interaction::PlotEvent;
pub use layers::{Layer, Redraw};
pub use params::{LabelTypesetter, Parameters, PlainLabels};
pub use plot::ComplexpPlot;
pub use registry::PlotRegistry;
pub use series::SeriesState;
