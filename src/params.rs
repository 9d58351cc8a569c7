//! User-tunable parameters: current values, slider bounds and sweep state.

use std::collections::BTreeMap;

use crate::ticks::round_to_digits;

/// Current parameter values by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, f64>,
}

impl Parameters {
    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    /// Value of `id`, or `0.0` when no such parameter exists.
    pub fn value(&self, id: &str) -> f64 {
        self.get(id).unwrap_or_default()
    }

    pub fn set(&mut self, id: impl Into<String>, value: f64) {
        self.values.insert(id.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Range and increment of the input a parameter is bound to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderBounds {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Play/pause state of one parameter's sweep animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepState {
    pub is_playing: bool,
    pub is_increasing: bool,
    pub animation_speed: f64,
}

impl SweepState {
    pub fn new(animation_speed: f64) -> Self {
        Self {
            is_playing: false,
            is_increasing: true,
            animation_speed,
        }
    }

    /// Moves `value` one sweep step, bouncing off the slider bounds.
    pub fn advance(&mut self, value: f64, bounds: &SliderBounds) -> f64 {
        let increment = bounds.step * self.animation_speed;
        if self.is_increasing {
            let next = value + increment;
            if next >= bounds.max {
                self.is_increasing = false;
                bounds.max
            } else {
                next
            }
        } else {
            let next = value - increment;
            if next <= bounds.min {
                self.is_increasing = true;
                bounds.min
            } else {
                next
            }
        }
    }
}

/// A parameter's slider binding together with its sweep state.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterControl {
    pub id: String,
    pub bounds: SliderBounds,
    pub sweep: SweepState,
}

/// Turns a parameter value into the text shown next to its slider.
pub trait LabelTypesetter {
    fn typeset(&self, id: &str, value: f64) -> String;
}

/// Plain `id = value` labels rounded to two decimals.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainLabels;

impl LabelTypesetter for PlainLabels {
    fn typeset(&self, id: &str, value: f64) -> String {
        format!("{id} = {}", round_to_digits(value, 2))
    }
}
