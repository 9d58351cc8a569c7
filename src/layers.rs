//! The four independently clearable drawing surfaces of a plot.

use std::ops::BitOr;

use iced::widget::canvas::Cache;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    /// Background, grid, axes, border, tick labels and origin dot.
    Axis,
    GeometricAid,
    Vectors,
    Points,
}

impl Layer {
    /// Compositing order, bottom first.
    pub const ALL: [Layer; 4] = [Layer::Axis, Layer::GeometricAid, Layer::Vectors, Layer::Points];
}

/// Set of layers that must be redrawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Redraw {
    pub axis: bool,
    pub geometric_aid: bool,
    pub vectors: bool,
    pub points: bool,
}

impl Redraw {
    pub const NONE: Redraw = Redraw {
        axis: false,
        geometric_aid: false,
        vectors: false,
        points: false,
    };

    pub const ALL: Redraw = Redraw {
        axis: true,
        geometric_aid: true,
        vectors: true,
        points: true,
    };

    /// Layers that depend on parameter values. The axis layer does not.
    pub const PARAMETER_LAYERS: Redraw = Redraw {
        axis: false,
        geometric_aid: true,
        vectors: true,
        points: true,
    };

    pub fn is_none(&self) -> bool {
        *self == Redraw::NONE
    }

    pub fn contains(&self, layer: Layer) -> bool {
        match layer {
            Layer::Axis => self.axis,
            Layer::GeometricAid => self.geometric_aid,
            Layer::Vectors => self.vectors,
            Layer::Points => self.points,
        }
    }
}

impl BitOr for Redraw {
    type Output = Redraw;

    fn bitor(self, rhs: Redraw) -> Redraw {
        Redraw {
            axis: self.axis || rhs.axis,
            geometric_aid: self.geometric_aid || rhs.geometric_aid,
            vectors: self.vectors || rhs.vectors,
            points: self.points || rhs.points,
        }
    }
}

/// Cached geometry of each layer. Clearing a layer only invalidates its own
/// cache; the others are reused as-is on the next frame.
pub struct Layers {
    axis: Cache,
    geometric_aid: Cache,
    vectors: Cache,
    points: Cache,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            axis: Cache::new(),
            geometric_aid: Cache::new(),
            vectors: Cache::new(),
            points: Cache::new(),
        }
    }
}

impl Layers {
    pub fn cache(&self, layer: Layer) -> &Cache {
        match layer {
            Layer::Axis => &self.axis,
            Layer::GeometricAid => &self.geometric_aid,
            Layer::Vectors => &self.vectors,
            Layer::Points => &self.points,
        }
    }

    pub fn clear(&self, layer: Layer) {
        self.cache(layer).clear();
    }

    pub fn invalidate(&self, redraw: Redraw) {
        for layer in Layer::ALL {
            if redraw.contains(layer) {
                self.clear(layer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union() {
        let axis_only = Redraw {
            axis: true,
            ..Redraw::NONE
        };
        assert_eq!(axis_only | Redraw::PARAMETER_LAYERS, Redraw::ALL);
        assert_eq!(Redraw::NONE | Redraw::NONE, Redraw::NONE);
        assert!(Redraw::default().is_none());
    }

    #[test]
    fn test_parameter_layers_skip_axis() {
        assert!(!Redraw::PARAMETER_LAYERS.contains(Layer::Axis));
        for layer in [Layer::GeometricAid, Layer::Vectors, Layer::Points] {
            assert!(Redraw::PARAMETER_LAYERS.contains(layer));
        }
    }
}
