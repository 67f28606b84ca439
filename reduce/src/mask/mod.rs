//! Boolean rejection masks over pixel arrays.
//!
//! Every generator returns a freshly allocated `Array<bool, D>` with the
//! shape of its input, following the convention that `true` marks a
//! rejected (masked) entry and `false` a valid one. Masks can be merged
//! with the combinators in [`combine`] and applied by the caller.
//!
//! # Module Organization
//!
//! - **geometric**: masks derived from array shape and coordinates only
//! - **invalid**: masks of non-finite entries (infinities, NaN)
//! - **value**: thresholds, order-statistic truncation, sigma clipping
//! - **combine**: logical OR / AND synthesis of several masks

pub mod combine;
pub mod geometric;
pub mod invalid;
pub mod value;

pub use combine::{combine_masks_and, combine_masks_or};
pub use geometric::{
    mask_columns, mask_everything, mask_nothing, mask_rectangle, mask_rows, mask_single_pixels,
    mask_subarray,
};
pub use invalid::{
    mask_invalid_all, mask_invalid_infinity, mask_invalid_nan, mask_invalid_negative_infinity,
    mask_invalid_positive_infinity, InvalidPredicate, INVALID_PREDICATES,
};
pub use value::{
    check_count_precision, mask_count_truncation, mask_exact_value,
    mask_exact_value_with_tolerance, mask_maximum_value, mask_minimum_value,
    mask_percent_truncation, mask_sigma_value, SigmaMultiple, Tolerance,
};

use ndarray::{ArrayBase, Data, Dimension, Ix2};
use num_traits::AsPrimitive;

/// Element types a mask can be computed from.
///
/// Implemented for every primitive integer and float. Value comparisons are
/// done on the element's `f64` image.
pub trait Pixel: AsPrimitive<f64> {
    #[inline]
    fn value(self) -> f64 {
        self.as_()
    }
}

impl<T: AsPrimitive<f64>> Pixel for T {}

/// Number of masked (`true`) entries.
pub fn masked_count<S, D>(mask: &ArrayBase<S, D>) -> usize
where
    S: Data<Elem = bool>,
    D: Dimension,
{
    mask.iter().filter(|&&masked| masked).count()
}

/// Coordinates of masked entries in a 2-D mask as `(column, row)` pairs,
/// in row-major order.
pub fn masked_coordinates<S>(mask: &ArrayBase<S, Ix2>) -> Vec<(usize, usize)>
where
    S: Data<Elem = bool>,
{
    mask.indexed_iter()
        .filter(|(_, &masked)| masked)
        .map(|((row, column), _)| (column, row))
        .collect()
}
