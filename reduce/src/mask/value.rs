//! Masks computed from the values of the array.
//!
//! # Key Algorithms
//!
//! ## Threshold masks
//! Strict `>` / `<` comparisons against a bound, and a tolerance-based
//! closeness test for exact values.
//!
//! ## Order-statistic truncation
//! The array is sorted once and the cut values are read at the requested
//! ranks. The cut is applied by VALUE, so entries tied with the boundary
//! value are masked or kept together and the realized count can exceed the
//! requested one.
//!
//! ## Sigma clipping
//! Iteratively rejects entries outside `mean - lower * std` and
//! `mean + upper * std`, recomputing the statistics from the surviving
//! entries each round. Rejections accumulate across iterations.

use super::combine::combine_masks_or;
use super::geometric::{mask_everything, mask_nothing};
use super::Pixel;
use crate::diagnostics::{self, DiagnosticCategory};
use crate::errors::MaskError;
use crate::stats;
use ndarray::{Array, ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

/// Digits of headroom below float resolution before a percent truncation
/// is reported as imprecise.
const PRECISION_WARNING_MARGIN: u32 = 5;

/// Mask entries strictly greater than `maximum_value`.
pub fn mask_maximum_value<S, T, D>(data: &ArrayBase<S, D>, maximum_value: f64) -> Array<bool, D>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    data.map(|&value| value.value() > maximum_value)
}

/// Mask entries strictly less than `minimum_value`.
pub fn mask_minimum_value<S, T, D>(data: &ArrayBase<S, D>, minimum_value: f64) -> Array<bool, D>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    data.map(|&value| value.value() < minimum_value)
}

/// Closeness tolerance for [`mask_exact_value_with_tolerance`].
///
/// Two values `a` and `b` are close when
/// `|a - b| <= absolute + relative * |b|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: 1e-5,
            absolute: 1e-8,
        }
    }
}

impl Tolerance {
    /// Equal infinities are close; NaN is never close to anything.
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        if a == b {
            return true;
        }
        if !a.is_finite() || !b.is_finite() {
            return false;
        }
        (a - b).abs() <= self.absolute + self.relative * b.abs()
    }
}

/// Mask entries approximately equal to `exact_value` under the default
/// [`Tolerance`].
pub fn mask_exact_value<S, T, D>(data: &ArrayBase<S, D>, exact_value: f64) -> Array<bool, D>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    mask_exact_value_with_tolerance(data, exact_value, Tolerance::default())
}

/// Mask entries within `tolerance` of `exact_value`.
pub fn mask_exact_value_with_tolerance<S, T, D>(
    data: &ArrayBase<S, D>,
    exact_value: f64,
    tolerance: Tolerance,
) -> Array<bool, D>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    data.map(|&value| tolerance.is_close(value.value(), exact_value))
}

/// Mask the `top_count` highest and `bottom_count` lowest entries.
///
/// The cut values are the order statistics at ranks `bottom_count` and
/// `len - top_count - 1`; entries strictly beyond them are masked. A count
/// of zero masks nothing on that side, and when the two counts together
/// reach the array size everything is masked.
///
/// Every NaN sorts above every number whatever its sign bit, so NaN is
/// never chosen as the lower cut.
pub fn mask_count_truncation<S, T, D>(
    data: &ArrayBase<S, D>,
    top_count: usize,
    bottom_count: usize,
) -> Array<bool, D>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    let total = data.len();
    if top_count.saturating_add(bottom_count) >= total {
        return mask_everything(data);
    }

    let mut sorted: Vec<f64> = data.iter().map(|&value| value.value()).collect();
    sorted.sort_unstable_by(|a, b| a.is_nan().cmp(&b.is_nan()).then_with(|| a.total_cmp(b)));

    let mut mask = mask_nothing(data);
    if top_count > 0 {
        let upper_value = sorted[total - top_count - 1];
        mask.zip_mut_with(data, |masked, &value| {
            *masked |= value.value() > upper_value;
        });
    }
    if bottom_count > 0 {
        let lower_value = sorted[bottom_count];
        mask.zip_mut_with(data, |masked, &value| {
            *masked |= value.value() < lower_value;
        });
    }

    mask
}

/// Mask the top and bottom fractions of entries by value.
///
/// Each fraction is converted to a count with `floor(percent * len)` and
/// handed to [`mask_count_truncation`].
///
/// # Errors
/// * [`MaskError::PercentOutOfRange`] if either fraction is outside `[0, 1]`
/// * [`MaskError::Imprecision`] if the element count exceeds float resolution
pub fn mask_percent_truncation<S, T, D>(
    data: &ArrayBase<S, D>,
    top_percent: f64,
    bottom_percent: f64,
) -> Result<Array<bool, D>, MaskError>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    check_percent("top_percent", top_percent)?;
    check_percent("bottom_percent", bottom_percent)?;

    let total = data.len();
    check_count_precision(total)?;

    let top_count = (top_percent * total as f64).floor() as usize;
    let bottom_count = (bottom_percent * total as f64).floor() as usize;

    Ok(mask_count_truncation(data, top_count, bottom_count))
}

fn check_percent(parameter: &'static str, value: f64) -> Result<(), MaskError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(MaskError::PercentOutOfRange { parameter, value });
    }
    Ok(())
}

/// Check that `element_count` can be scaled by a fraction in `f64` without
/// losing whole elements.
///
/// Fails when `log10(element_count)` exceeds the decimal digits `f64`
/// resolves, and warns once it comes within five digits of that limit.
pub fn check_count_precision(element_count: usize) -> Result<(), MaskError> {
    if element_count == 0 {
        return Ok(());
    }

    let magnitude = (element_count as f64).log10();
    let digits = f64::DIGITS;

    if magnitude > digits as f64 {
        return Err(MaskError::Imprecision {
            element_count,
            digits,
        });
    }

    if magnitude > (digits - PRECISION_WARNING_MARGIN) as f64 {
        diagnostics::warn(
            DiagnosticCategory::Imprecision,
            &format!(
                "Percent truncation of {element_count} elements uses float multiplication \
                 close to its {digits}-digit resolution."
            ),
        );
    }

    Ok(())
}

/// Sigma multiple for [`mask_sigma_value`].
///
/// Deserializes from either a bare number or `{"lower": .., "upper": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SigmaMultiple {
    /// Same multiple below and above the mean.
    Symmetric(f64),
    /// Separate multiples below and above the mean.
    Asymmetric { lower: f64, upper: f64 },
}

impl SigmaMultiple {
    /// The `(lower, upper)` multiples.
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            SigmaMultiple::Symmetric(multiple) => (multiple, multiple),
            SigmaMultiple::Asymmetric { lower, upper } => (lower, upper),
        }
    }
}

impl From<f64> for SigmaMultiple {
    fn from(multiple: f64) -> Self {
        SigmaMultiple::Symmetric(multiple)
    }
}

impl From<(f64, f64)> for SigmaMultiple {
    fn from((lower, upper): (f64, f64)) -> Self {
        SigmaMultiple::Asymmetric { lower, upper }
    }
}

impl From<[f64; 2]> for SigmaMultiple {
    fn from([lower, upper]: [f64; 2]) -> Self {
        SigmaMultiple::Asymmetric { lower, upper }
    }
}

/// Iterative sigma clipping.
///
/// Each iteration computes the mean and population standard deviation of
/// the entries not yet masked, then masks everything outside
/// `[mean - lower * std, mean + upper * std]`. Masks accumulate, so an entry
/// rejected once stays rejected. Clipping stops early if no entries survive.
///
/// Non-finite entries are left out of the statistics. Infinities still fall
/// outside every finite bound and are masked; NaN never is.
///
/// # Errors
/// * [`MaskError::InvalidIterations`] if `sigma_iterations` is zero
pub fn mask_sigma_value<S, T, D>(
    data: &ArrayBase<S, D>,
    sigma_multiple: impl Into<SigmaMultiple>,
    sigma_iterations: usize,
) -> Result<Array<bool, D>, MaskError>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    if sigma_iterations < 1 {
        return Err(MaskError::InvalidIterations {
            iterations: sigma_iterations,
        });
    }

    let (lower_multiple, upper_multiple) = sigma_multiple.into().bounds();

    let mut final_mask = mask_nothing(data);
    for iteration in 0..sigma_iterations {
        let surviving: Vec<f64> = data
            .iter()
            .zip(final_mask.iter())
            .filter(|(_, &masked)| !masked)
            .map(|(&value, _)| value.value())
            .filter(|value| value.is_finite())
            .collect();

        if surviving.is_empty() {
            diagnostics::log(
                DiagnosticCategory::Masking,
                &format!("Sigma clipping exhausted all entries after {iteration} iterations."),
            );
            break;
        }

        let mean = stats::mean(&surviving)?;
        let stddev = stats::standard_deviation(&surviving, 0)?;

        let min_mask = mask_minimum_value(data, mean - stddev * lower_multiple);
        let max_mask = mask_maximum_value(data, mean + stddev * upper_multiple);

        final_mask = combine_masks_or(&[final_mask.view(), min_mask.view(), max_mask.view()])?;
    }

    Ok(final_mask)
}
