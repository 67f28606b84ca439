//! Seeded synthetic frames for exercising mask generators.
//!
//! [`simple_normal_array`] produces a reproducible Gaussian background and
//! [`inject_defects`] plants hot pixels and non-finite values at random
//! distinct positions, reporting where each one went so tests and the CLI
//! can check what a mask caught.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, NormalError};
use serde::{Deserialize, Serialize};

/// Generate a 2D array of normally distributed values.
///
/// The same `seed` always produces the same frame.
///
/// # Arguments
/// * `size` - Tuple of (height, width) for the output array dimensions
/// * `mean` - Mean value of the normal distribution
/// * `std_dev` - Standard deviation of the normal distribution
/// * `seed` - Random seed for deterministic output
///
/// # Errors
/// Returns [`NormalError`] if `std_dev` is negative or not finite.
pub fn simple_normal_array(
    size: (usize, usize),
    mean: f64,
    std_dev: f64,
    seed: u64,
) -> Result<Array2<f64>, NormalError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal_dist = Normal::new(mean, std_dev)?;
    Ok(Array2::from_shape_fn(size, |_| normal_dist.sample(&mut rng)))
}

fn default_hot_value() -> f64 {
    65535.0
}

/// Number of each defect kind to plant in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectPlan {
    #[serde(default)]
    pub hot_pixels: usize,
    #[serde(default)]
    pub nan_pixels: usize,
    /// Alternates between `+inf` and `-inf`, starting with `+inf`.
    #[serde(default)]
    pub inf_pixels: usize,
    #[serde(default = "default_hot_value")]
    pub hot_value: f64,
}

impl Default for DefectPlan {
    fn default() -> Self {
        Self {
            hot_pixels: 0,
            nan_pixels: 0,
            inf_pixels: 0,
            hot_value: default_hot_value(),
        }
    }
}

impl DefectPlan {
    pub fn total(&self) -> usize {
        self.hot_pixels
            .saturating_add(self.nan_pixels)
            .saturating_add(self.inf_pixels)
    }
}

/// Where each planted defect landed, as `(column, row)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefectLocations {
    pub hot: Vec<(usize, usize)>,
    pub nan: Vec<(usize, usize)>,
    pub infinite: Vec<(usize, usize)>,
}

impl DefectLocations {
    /// Every planted position, hot pixels first.
    pub fn all(&self) -> Vec<(usize, usize)> {
        self.hot
            .iter()
            .chain(&self.nan)
            .chain(&self.infinite)
            .copied()
            .collect()
    }
}

/// Overwrite randomly chosen distinct pixels of `frame` with defects.
///
/// If the plan asks for more defects than the frame has pixels, only the
/// first `frame.len()` are planted, in the order hot, NaN, infinite.
pub fn inject_defects(frame: &mut Array2<f64>, plan: &DefectPlan, seed: u64) -> DefectLocations {
    let mut rng = StdRng::seed_from_u64(seed);
    let width = frame.ncols();
    let amount = plan.total().min(frame.len());

    let mut positions = sample(&mut rng, frame.len(), amount)
        .into_iter()
        .map(|flat| (flat % width, flat / width));

    let mut locations = DefectLocations::default();
    for (column, row) in positions.by_ref().take(plan.hot_pixels) {
        frame[[row, column]] = plan.hot_value;
        locations.hot.push((column, row));
    }
    for (column, row) in positions.by_ref().take(plan.nan_pixels) {
        frame[[row, column]] = f64::NAN;
        locations.nan.push((column, row));
    }
    for (i, (column, row)) in positions.take(plan.inf_pixels).enumerate() {
        frame[[row, column]] = if i % 2 == 0 {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };
        locations.infinite.push((column, row));
    }

    locations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    #[test]
    fn test_simple_normal_array_is_deterministic() {
        let a = simple_normal_array((8, 12), 100.0, 5.0, 42).unwrap();
        let b = simple_normal_array((8, 12), 100.0, 5.0, 42).unwrap();
        let c = simple_normal_array((8, 12), 100.0, 5.0, 43).unwrap();
        assert_eq!(a.dim(), (8, 12));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_simple_normal_array_statistics() {
        let frame = simple_normal_array((200, 200), 1000.0, 10.0, 7).unwrap();
        let values: Vec<f64> = frame.iter().copied().collect();
        assert_relative_eq!(stats::mean(&values).unwrap(), 1000.0, epsilon = 0.5);
        assert_relative_eq!(
            stats::standard_deviation(&values, 0).unwrap(),
            10.0,
            epsilon = 0.5
        );
    }

    #[test]
    fn test_simple_normal_array_rejects_bad_std_dev() {
        assert!(simple_normal_array((2, 2), 0.0, -1.0, 0).is_err());
    }

    #[test]
    fn test_inject_defects_places_distinct_pixels() {
        let mut frame = Array2::zeros((10, 15));
        let plan = DefectPlan {
            hot_pixels: 4,
            nan_pixels: 3,
            inf_pixels: 2,
            ..DefectPlan::default()
        };
        let locations = inject_defects(&mut frame, &plan, 11);

        assert_eq!(locations.hot.len(), 4);
        assert_eq!(locations.nan.len(), 3);
        assert_eq!(locations.infinite.len(), 2);

        let unique: HashSet<_> = locations.all().into_iter().collect();
        assert_eq!(unique.len(), 9);

        for &(column, row) in &locations.hot {
            assert_eq!(frame[[row, column]], 65535.0);
        }
        for &(column, row) in &locations.nan {
            assert!(frame[[row, column]].is_nan());
        }
        assert_eq!(frame[[locations.infinite[0].1, locations.infinite[0].0]], f64::INFINITY);
        assert_eq!(
            frame[[locations.infinite[1].1, locations.infinite[1].0]],
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn test_inject_defects_caps_at_frame_size() {
        let mut frame = Array2::zeros((2, 2));
        let plan = DefectPlan {
            hot_pixels: 3,
            nan_pixels: 3,
            ..DefectPlan::default()
        };
        let locations = inject_defects(&mut frame, &plan, 0);
        assert_eq!(locations.hot.len(), 3);
        assert_eq!(locations.nan.len(), 1);
    }

    #[test]
    fn test_huge_plan_saturates_and_fills_frame() {
        let plan = DefectPlan {
            hot_pixels: usize::MAX,
            nan_pixels: usize::MAX,
            inf_pixels: 1,
            ..DefectPlan::default()
        };
        assert_eq!(plan.total(), usize::MAX);

        let mut frame = Array2::zeros((3, 3));
        let locations = inject_defects(&mut frame, &plan, 5);
        assert_eq!(locations.hot.len(), 9);
        assert!(locations.nan.is_empty());
        assert!(frame.iter().all(|&v| v == 65535.0));
    }

    #[test]
    fn test_defect_plan_serde_defaults() {
        let plan: DefectPlan = serde_json::from_str(r#"{"nan_pixels": 2}"#).unwrap();
        assert_eq!(plan.nan_pixels, 2);
        assert_eq!(plan.hot_value, 65535.0);
        assert_eq!(plan.total(), 2);
    }
}
