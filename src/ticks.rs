//! Readable grid spacing derived from the current zoom scale.

#[derive(Clone, Debug)]
pub struct GridConfig {
    /// Smallest on-screen distance between two main grid lines, in pixels.
    pub min_spacing: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { min_spacing: 36.0 }
    }
}

/// Main and secondary grid steps in Cartesian units, plus the number of
/// decimal digits the tick labels need at that step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpacing {
    pub step: f64,
    pub secondary_step: f64,
    pub label_digits: u32,
}

/// Picks the smallest step of the form {1, 2, 5} x 10^k whose on-screen
/// spacing is at least `config.min_spacing` pixels.
///
/// Consecutive candidates differ by at most x2.5, so the resulting screen
/// spacing stays within `[min_spacing, 2.5 * min_spacing]`.
pub fn grid_spacing(pixels_per_unit: f64, config: &GridConfig) -> GridSpacing {
    let min_step = config.min_spacing / pixels_per_unit;

    let magnitude = 10.0_f64.powf(min_step.log10().floor());
    let normalized = min_step / magnitude;

    let (nice_factor, subdivisions) = if normalized <= 1.0 {
        (1.0, 5.0)
    } else if normalized <= 2.0 {
        (2.0, 4.0)
    } else if normalized <= 5.0 {
        (5.0, 5.0)
    } else {
        (10.0, 5.0)
    };

    let step = nice_factor * magnitude;

    GridSpacing {
        step,
        secondary_step: step / subdivisions,
        label_digits: label_digits(step),
    }
}

fn label_digits(step: f64) -> u32 {
    // nudge so that 0.1 computed as 0.09999.. still reports one digit
    let exponent = (step.log10() + 1e-9).floor();
    if exponent >= 0.0 { 0 } else { (-exponent) as u32 }
}

/// Rounds `value` to `digits` decimal places, mapping `-0.0` to `0.0`.
pub fn round_to_digits(value: f64, digits: u32) -> f64 {
    let factor = 10.0_f64.powi(digits as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scale_uses_half_units() {
        let spacing = grid_spacing(100.0, &GridConfig::default());
        assert!((spacing.step - 0.5).abs() < 1e-12);
        assert!((spacing.secondary_step - 0.1).abs() < 1e-12);
        assert_eq!(spacing.label_digits, 1);
    }

    #[test]
    fn test_screen_spacing_stays_readable() {
        let config = GridConfig::default();
        let mut ppu = 0.013;
        while ppu < 1.0e6 {
            let spacing = grid_spacing(ppu, &config);
            let pixels = spacing.step * ppu;
            assert!(pixels >= config.min_spacing - 1e-9, "ppu {ppu}: {pixels}px");
            assert!(pixels <= config.min_spacing * 2.5 + 1e-9, "ppu {ppu}: {pixels}px");
            ppu *= 1.37;
        }
    }

    #[test]
    fn test_step_grows_when_zooming_out() {
        let config = GridConfig::default();
        let mut previous = grid_spacing(1.0e5, &config).step;
        let mut ppu = 1.0e5;
        while ppu > 0.01 {
            ppu /= 1.05;
            let step = grid_spacing(ppu, &config).step;
            assert!(step >= previous);
            previous = step;
        }
    }

    #[test]
    fn test_label_digits() {
        assert_eq!(label_digits(10.0), 0);
        assert_eq!(label_digits(1.0), 0);
        assert_eq!(label_digits(0.1), 1);
        assert_eq!(label_digits(0.05), 2);
        assert_eq!(label_digits(0.002), 3);
    }

    #[test]
    fn test_round_to_digits() {
        assert_eq!(round_to_digits(1.23456, 2), 1.23);
        assert_eq!(round_to_digits(-0.0001, 2), 0.0);
        assert!(round_to_digits(-0.0001, 2).is_sign_positive());
        assert_eq!(round_to_digits(2.5, 0), 3.0);
    }
}
