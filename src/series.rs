//! Taylor series of `r * e^(ix)` turned into a chain of axis-aligned vectors.

use crate::coords::PlotPoint;

/// Number of series terms computed on every update.
pub const TERM_COUNT: usize = 100;

/// Unit directions of successive terms: `i^n` cycles through
/// real, imaginary, negative real, negative imaginary.
pub const DIRECTIONS: [PlotPoint; 4] = [
    PlotPoint { x: 1.0, y: 0.0 },
    PlotPoint { x: 0.0, y: 1.0 },
    PlotPoint { x: -1.0, y: 0.0 },
    PlotPoint { x: 0.0, y: -1.0 },
];

/// Direction of term `n`.
pub fn direction(n: usize) -> PlotPoint {
    DIRECTIONS[n % 4]
}

/// Terms and partial sums of the series for one pair of parameter values.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesState {
    /// Signed term values `r * x^n / n!`.
    pub terms: Vec<f64>,
    /// Cumulative chain: `partial_sums[0]` is the origin and
    /// `partial_sums[n + 1] = partial_sums[n] + direction(n) * terms[n]`.
    pub partial_sums: Vec<PlotPoint>,
    /// First `n > 0` with `|terms[n]| < |terms[n - 1]|`, if any.
    pub decreasing_index: Option<usize>,
}

impl SeriesState {
    /// Computes the series for angle `x` and radius `r`.
    ///
    /// The factorial is carried forward from term to term; precision loss
    /// for the last terms is irrelevant at display resolution.
    pub fn compute(x: f64, r: f64) -> Self {
        let mut terms: Vec<f64> = Vec::with_capacity(TERM_COUNT);
        let mut partial_sums = Vec::with_capacity(TERM_COUNT + 1);
        let mut decreasing_index = None;

        partial_sums.push(PlotPoint::ORIGIN);
        let mut factorial = 1.0_f64;

        for n in 0..TERM_COUNT {
            let term = r * x.powi(n as i32) / factorial;

            if decreasing_index.is_none() && n > 0 && terms[n - 1].abs() > term.abs() {
                decreasing_index = Some(n);
            }

            let previous = partial_sums[n];
            let dir = direction(n);
            partial_sums.push(PlotPoint::new(
                previous.x + dir.x * term,
                previous.y + dir.y * term,
            ));
            terms.push(term);

            factorial *= (n + 1) as f64;
        }

        Self {
            terms,
            partial_sums,
            decreasing_index,
        }
    }

    /// End point of the whole chain.
    pub fn sum(&self) -> PlotPoint {
        self.partial_sums[TERM_COUNT]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_zero_angle_collapses_after_first_term() {
        let series = SeriesState::compute(0.0, 1.0);
        assert_eq!(series.terms.len(), TERM_COUNT);
        assert_eq!(series.partial_sums.len(), TERM_COUNT + 1);
        assert_eq!(series.terms[0], 1.0);
        assert_eq!(series.partial_sums[0], PlotPoint::ORIGIN);
        assert_eq!(series.partial_sums[1], PlotPoint::new(1.0, 0.0));
        for n in 1..TERM_COUNT {
            assert_eq!(series.terms[n], 0.0);
            assert_eq!(series.partial_sums[n + 1], PlotPoint::new(1.0, 0.0));
        }
        assert_eq!(series.decreasing_index, Some(1));
    }

    #[test]
    fn test_converges_to_euler_at_pi() {
        let series = SeriesState::compute(PI, 1.0);
        let sum = series.sum();
        assert!((sum.x - PI.cos()).abs() < 1e-6);
        assert!((sum.y - PI.sin()).abs() < 1e-6);
    }

    #[test]
    fn test_converges_for_scaled_radius() {
        let (x, r) = (2.3, 1.7);
        let sum = SeriesState::compute(x, r).sum();
        assert!((sum.x - r * x.cos()).abs() < 1e-9);
        assert!((sum.y - r * x.sin()).abs() < 1e-9);
    }

    #[test]
    fn test_direction_cycle() {
        let expected = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];
        for n in 0..40 {
            let (x, y) = expected[n % 4];
            assert_eq!(direction(n), PlotPoint::new(x, y));
        }
    }

    #[test]
    fn test_chain_follows_directions() {
        let series = SeriesState::compute(-1.3, 0.8);
        for n in 0..TERM_COUNT {
            let dir = direction(n);
            let a = series.partial_sums[n];
            let b = series.partial_sums[n + 1];
            assert!((b.x - (a.x + dir.x * series.terms[n])).abs() < 1e-15);
            assert!((b.y - (a.y + dir.y * series.terms[n])).abs() < 1e-15);
        }
    }

    #[test]
    fn test_decreasing_index_small_angle() {
        // magnitudes 1, 0.5, 0.125, 0.0208..: first decrease at n = 1
        let series = SeriesState::compute(0.5, 1.0);
        assert_eq!(series.decreasing_index, Some(1));
    }

    #[test]
    fn test_decreasing_index_after_growth() {
        // magnitudes 1, 2, 2, 1.33..: equal terms do not count as decreasing
        let series = SeriesState::compute(2.0, 1.0);
        assert_eq!(series.decreasing_index, Some(3));

        let series = SeriesState::compute(-2.0, 1.0);
        assert_eq!(series.decreasing_index, Some(3));
    }

    #[test]
    fn test_decreasing_index_unset_when_terms_keep_growing() {
        let series = SeriesState::compute(500.0, 1.0);
        assert_eq!(series.decreasing_index, None);

        // all terms zero: nothing ever decreases
        let series = SeriesState::compute(1.0, 0.0);
        assert_eq!(series.decreasing_index, None);
    }
}
