//! Basic descriptive statistics consumed by the value-based masks.

use thiserror::Error;

/// Errors from statistical reductions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StatsError {
    #[error("Insufficient data points: 0 valid values")]
    Empty,
    #[error("Delta degrees of freedom {ddof} leaves no denominator for {len} values")]
    DegreesOfFreedom { ddof: usize, len: usize },
}

/// Arithmetic mean of a slice of values.
pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::Empty);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with a `len - ddof` divisor.
///
/// `ddof = 0` gives the population standard deviation, `ddof = 1` the
/// unbiased sample estimate.
pub fn standard_deviation(values: &[f64], ddof: usize) -> Result<f64, StatsError> {
    let mean = mean(values)?;
    if ddof >= values.len() {
        return Err(StatsError::DegreesOfFreedom {
            ddof,
            len: values.len(),
        });
    }

    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Ok((sum_sq / (values.len() - ddof) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_basic() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), Err(StatsError::Empty));
    }

    #[test]
    fn test_population_standard_deviation() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(standard_deviation(&values, 0).unwrap(), 2.0);
    }

    #[test]
    fn test_sample_standard_deviation() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = (32.0_f64 / 7.0).sqrt();
        assert_relative_eq!(
            standard_deviation(&values, 1).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_standard_deviation_ddof_too_large() {
        let result = standard_deviation(&[1.0, 2.0], 2);
        assert_eq!(result, Err(StatsError::DegreesOfFreedom { ddof: 2, len: 2 }));
    }

    #[test]
    fn test_standard_deviation_constant() {
        assert_eq!(standard_deviation(&[3.0; 10], 0).unwrap(), 0.0);
    }
}
