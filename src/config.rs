//! Plot configuration: styling, toggles, parameter and point descriptors.
//!
//! Everything except point descriptors can be loaded from TOML. Missing
//! options fall back to their documented defaults; colors are hex strings
//! resolved once into a [`Palette`] when the plot is built.

use std::collections::BTreeSet;
use std::path::Path;

use iced::Color;
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};
use crate::params::{Parameters, SliderBounds};

// ================================================================================
// Serializable configuration
// ================================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Cartesian point shown at the centre of the surface initially.
    pub viewport_center: [f64; 2],
    /// Initial zoom scale in pixels per Cartesian unit.
    pub initial_pixels_per_unit: f64,
    /// Gap in pixels between the surface edge and the plot viewport.
    pub inset: f64,

    pub label_size: f32,
    pub real_color: String,
    pub imaginary_color: String,
    pub vector_width: f32,
    pub arrow_size: f64,
    pub background_color: String,
    pub geometric_aid_color: String,
    pub geometric_aid_width: f32,
    pub axis_color: String,
    pub axis_line_width: f32,
    pub grid_color: String,
    pub grid_line_width: f32,
    pub secondary_grid_color: String,
    pub secondary_grid_line_width: f32,

    pub is_grid_visible: bool,
    pub is_grid_toggle_active: bool,
    pub is_refresh_active: bool,
    pub is_translation_active: bool,
    pub is_zoom_active: bool,
    pub is_fullscreen_toggle_active: bool,

    pub parameters: Vec<ParameterConfig>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            viewport_center: [0.0, 0.0],
            initial_pixels_per_unit: 100.0,
            inset: 0.0,
            label_size: 15.0,
            real_color: "#1484e6".to_string(),
            imaginary_color: "#B01A00".to_string(),
            vector_width: 3.0,
            arrow_size: 10.0,
            background_color: "#ffffff".to_string(),
            geometric_aid_color: "#222222".to_string(),
            geometric_aid_width: 2.0,
            axis_color: "#3c3c3c".to_string(),
            axis_line_width: 2.0,
            grid_color: "#777777".to_string(),
            grid_line_width: 1.0,
            secondary_grid_color: "#7777776e".to_string(),
            secondary_grid_line_width: 1.0,
            is_grid_visible: true,
            is_grid_toggle_active: true,
            is_refresh_active: true,
            is_translation_active: true,
            is_zoom_active: true,
            is_fullscreen_toggle_active: true,
            parameters: Vec::new(),
        }
    }
}

/// A parameter and the numeric input it is bound to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterConfig {
    pub id: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Starting value, clamped into `[min, max]`.
    pub value: f64,
    #[serde(default = "default_animation_speed")]
    pub animation_speed: f64,
}

fn default_animation_speed() -> f64 {
    0.5
}

impl ParameterConfig {
    pub fn new(id: impl Into<String>, min: f64, max: f64, step: f64, value: f64) -> Self {
        Self {
            id: id.into(),
            min,
            max,
            step,
            value,
            animation_speed: default_animation_speed(),
        }
    }

    pub fn bounds(&self) -> SliderBounds {
        SliderBounds {
            min: self.min,
            max: self.max,
            step: self.step,
        }
    }
}

impl PlotConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| PlotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn parameter(&self, id: &str) -> Option<&ParameterConfig> {
        self.parameters.iter().find(|p| p.id == id)
    }

    /// Checks scale and parameter declarations.
    pub fn validate(&self) -> Result<()> {
        let scale = self.initial_pixels_per_unit;
        if scale <= 0.0 || !scale.is_finite() {
            return Err(PlotError::InvalidScale(scale));
        }

        let mut seen = BTreeSet::new();
        for p in &self.parameters {
            let finite = p.min.is_finite() && p.max.is_finite() && p.step.is_finite();
            if !finite || p.min > p.max || p.step <= 0.0 {
                return Err(PlotError::InvalidBounds {
                    id: p.id.clone(),
                    min: p.min,
                    max: p.max,
                    step: p.step,
                });
            }
            if !p.value.is_finite() {
                return Err(PlotError::InvalidValue {
                    id: p.id.clone(),
                    value: p.value,
                });
            }
            // a non-positive speed never reaches the bound it should bounce off
            if !p.animation_speed.is_finite() || p.animation_speed <= 0.0 {
                return Err(PlotError::InvalidAnimationSpeed {
                    id: p.id.clone(),
                    speed: p.animation_speed,
                });
            }
            if !seen.insert(p.id.as_str()) {
                return Err(PlotError::DuplicateParameter(p.id.clone()));
            }
        }
        Ok(())
    }

    /// Resolves every color option.
    pub fn palette(&self) -> Result<Palette> {
        Ok(Palette {
            real: parse_color("real_color", &self.real_color)?,
            imaginary: parse_color("imaginary_color", &self.imaginary_color)?,
            background: parse_color("background_color", &self.background_color)?,
            geometric_aid: parse_color("geometric_aid_color", &self.geometric_aid_color)?,
            axis: parse_color("axis_color", &self.axis_color)?,
            grid: parse_color("grid_color", &self.grid_color)?,
            secondary_grid: parse_color("secondary_grid_color", &self.secondary_grid_color)?,
        })
    }
}

/// Parses `#rrggbb` / `#rrggbbaa` hex notation.
pub fn parse_color(option: &'static str, value: &str) -> Result<Color> {
    value.parse::<Color>().ok().ok_or_else(|| PlotError::InvalidColor {
        option,
        value: value.to_string(),
    })
}

/// Resolved colors of every visual element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub real: Color,
    pub imaginary: Color,
    pub background: Color,
    pub geometric_aid: Color,
    pub axis: Color,
    pub grid: Color,
    pub secondary_grid: Color,
}

// ================================================================================
// Point descriptors
// ================================================================================

type Accessor = Box<dyn Fn(&Parameters) -> f64>;

/// A marker whose Cartesian position is a function of the parameters.
pub struct PointDescriptor {
    x: Accessor,
    y: Accessor,
    pub color: Color,
    pub size: f64,
    pub outline: bool,
}

#[bon::bon]
impl PointDescriptor {
    #[builder]
    pub fn new(
        x: impl Fn(&Parameters) -> f64 + 'static,
        y: impl Fn(&Parameters) -> f64 + 'static,
        #[builder(into, default = "#1484e6".to_string())] color: String,
        #[builder(default = 2.0)] size: f64,
        #[builder(default = true)] outline: bool,
    ) -> Result<Self> {
        Ok(Self {
            x: Box::new(x),
            y: Box::new(y),
            color: parse_color("point color", &color)?,
            size,
            outline,
        })
    }

    pub fn x(&self, params: &Parameters) -> f64 {
        (self.x)(params)
    }

    pub fn y(&self, params: &Parameters) -> f64 {
        (self.y)(params)
    }
}

impl std::fmt::Debug for PointDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointDescriptor")
            .field("color", &self.color)
            .field("size", &self.size)
            .field("outline", &self.outline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve() {
        let config = PlotConfig::default();
        let palette = config.palette().unwrap();
        assert_eq!(palette.background, Color::WHITE);
        assert!(palette.secondary_grid.a < 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PlotConfig::from_toml_str(
            r##"
            initial_pixels_per_unit = 80.0
            real_color = "#ff0000"

            [[parameters]]
            id = "x"
            min = -10.0
            max = 10.0
            step = 0.01
            value = 1.0
            "##,
        )
        .unwrap();

        assert_eq!(config.initial_pixels_per_unit, 80.0);
        assert_eq!(config.label_size, 15.0);
        assert_eq!(config.arrow_size, 10.0);
        assert_eq!(config.parameters.len(), 1);
        assert_eq!(config.parameters[0].animation_speed, 0.5);
        assert_eq!(config.palette().unwrap().real, Color::from_rgb8(255, 0, 0));
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let config = PlotConfig {
            grid_color: "not a color".to_string(),
            ..PlotConfig::default()
        };
        assert!(matches!(
            config.palette(),
            Err(PlotError::InvalidColor { option: "grid_color", .. })
        ));
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let mut config = PlotConfig::default();
        config.parameters.push(ParameterConfig::new("x", 1.0, -1.0, 0.1, 0.0));
        assert!(matches!(config.validate(), Err(PlotError::InvalidBounds { .. })));

        let mut config = PlotConfig::default();
        config.parameters.push(ParameterConfig::new("x", -1.0, 1.0, 0.1, 0.0));
        config.parameters.push(ParameterConfig::new("x", -1.0, 1.0, 0.1, 0.0));
        assert!(matches!(config.validate(), Err(PlotError::DuplicateParameter(_))));

        let config = PlotConfig {
            initial_pixels_per_unit: 0.0,
            ..PlotConfig::default()
        };
        assert!(matches!(config.validate(), Err(PlotError::InvalidScale(_))));
    }

    #[test]
    fn test_sweep_settings_are_validated() {
        let mut config = PlotConfig::default();
        let mut p = ParameterConfig::new("x", -1.0, 1.0, 0.5, 0.0);
        p.animation_speed = -1.0;
        config.parameters.push(p);
        assert!(matches!(
            config.validate(),
            Err(PlotError::InvalidAnimationSpeed { speed, .. }) if speed == -1.0
        ));

        config.parameters[0].animation_speed = 0.0;
        assert!(matches!(config.validate(), Err(PlotError::InvalidAnimationSpeed { .. })));

        config.parameters[0].animation_speed = 0.5;
        assert!(config.validate().is_ok());

        let config = PlotConfig::from_toml_str(
            r##"
            [[parameters]]
            id = "x"
            min = -1.0
            max = 1.0
            step = 0.5
            value = nan
            "##,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(PlotError::InvalidValue { .. })));
    }

    #[test]
    fn test_hex_colors_resolve() {
        assert_eq!(parse_color("axis_color", "#000000").unwrap(), Color::BLACK);
        assert!(parse_color("axis_color", "#12").is_err());
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        assert!(matches!(
            PlotConfig::from_toml_str("label_size = \"big\""),
            Err(PlotError::Parse(_))
        ));
    }

    #[test]
    fn test_point_builder_defaults() {
        let point = PointDescriptor::builder()
            .x(|p: &Parameters| p.value("r") * p.value("x").cos())
            .y(|p: &Parameters| p.value("r") * p.value("x").sin())
            .build()
            .unwrap();
        assert_eq!(point.size, 2.0);
        assert!(point.outline);

        let params: Parameters = [("x", 0.0), ("r", 2.0)].into_iter().collect();
        assert_eq!(point.x(&params), 2.0);
        assert_eq!(point.y(&params), 0.0);
    }
}
