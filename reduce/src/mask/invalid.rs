//! Masks of entries outside the finite real number line.
//!
//! Integer arrays never produce a masked entry here; their `f64` image is
//! always finite.

use super::combine::combine_masks_or;
use super::Pixel;
use crate::errors::MaskError;
use ndarray::{Array, ArrayBase, Data, Dimension};

/// A named predicate flagging one kind of invalid value.
#[derive(Debug, Clone, Copy)]
pub struct InvalidPredicate {
    pub name: &'static str,
    pub predicate: fn(f64) -> bool,
}

fn is_positive_infinity(value: f64) -> bool {
    value == f64::INFINITY
}

fn is_negative_infinity(value: f64) -> bool {
    value == f64::NEG_INFINITY
}

/// Every invalid-value predicate folded into [`mask_invalid_all`].
///
/// Adding an entry here is all it takes for a new kind of invalid value to
/// be picked up by the aggregate mask.
pub const INVALID_PREDICATES: &[InvalidPredicate] = &[
    InvalidPredicate {
        name: "infinity",
        predicate: f64::is_infinite,
    },
    InvalidPredicate {
        name: "positive_infinity",
        predicate: is_positive_infinity,
    },
    InvalidPredicate {
        name: "negative_infinity",
        predicate: is_negative_infinity,
    },
    InvalidPredicate {
        name: "nan",
        predicate: f64::is_nan,
    },
];

fn mask_where<S, T, D>(data: &ArrayBase<S, D>, predicate: fn(f64) -> bool) -> Array<bool, D>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    data.map(|&value| predicate(value.value()))
}

/// Mask `+inf` and `-inf`.
pub fn mask_invalid_infinity<S, T, D>(data: &ArrayBase<S, D>) -> Array<bool, D>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    mask_where(data, f64::is_infinite)
}

/// Mask `+inf` only.
pub fn mask_invalid_positive_infinity<S, T, D>(data: &ArrayBase<S, D>) -> Array<bool, D>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    mask_where(data, is_positive_infinity)
}

/// Mask `-inf` only.
pub fn mask_invalid_negative_infinity<S, T, D>(data: &ArrayBase<S, D>) -> Array<bool, D>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    mask_where(data, is_negative_infinity)
}

/// Mask NaN.
pub fn mask_invalid_nan<S, T, D>(data: &ArrayBase<S, D>) -> Array<bool, D>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    mask_where(data, f64::is_nan)
}

/// Mask every entry flagged by any predicate in [`INVALID_PREDICATES`].
pub fn mask_invalid_all<S, T, D>(data: &ArrayBase<S, D>) -> Result<Array<bool, D>, MaskError>
where
    S: Data<Elem = T>,
    T: Pixel,
    D: Dimension,
{
    let masks: Vec<Array<bool, D>> = INVALID_PREDICATES
        .iter()
        .map(|entry| mask_where(data, entry.predicate))
        .collect();
    let views: Vec<_> = masks.iter().map(|mask| mask.view()).collect();

    combine_masks_or(&views).map_err(|err| match err {
        MaskError::NoMasks => {
            MaskError::Internal("no invalid-value predicates are registered".to_string())
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    const INF: f64 = f64::INFINITY;
    const NAN: f64 = f64::NAN;

    fn infinity_frame() -> Array2<f64> {
        array![
            [0.0, -INF, 0.0, 0.0, 0.0, -INF],
            [0.0, INF, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, -INF, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, INF, 0.0],
            [INF, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, INF, 0.0, 0.0]
        ]
    }

    fn coords(mask: &Array2<bool>) -> Vec<(usize, usize)> {
        mask.indexed_iter()
            .filter(|(_, &m)| m)
            .map(|(idx, _)| idx)
            .collect()
    }

    #[test]
    fn test_mask_invalid_infinity() {
        let mask = mask_invalid_infinity(&infinity_frame());
        assert_eq!(
            coords(&mask),
            vec![(0, 1), (0, 5), (1, 1), (2, 2), (3, 4), (4, 0), (5, 3)]
        );
    }

    #[test]
    fn test_signed_infinities() {
        let data = infinity_frame();
        assert_eq!(
            coords(&mask_invalid_positive_infinity(&data)),
            vec![(1, 1), (3, 4), (4, 0), (5, 3)]
        );
        assert_eq!(
            coords(&mask_invalid_negative_infinity(&data)),
            vec![(0, 1), (0, 5), (2, 2)]
        );
    }

    #[test]
    fn test_mask_invalid_nan() {
        let data = array![
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, NAN, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, NAN, 0.0],
            [0.0, 0.0, NAN, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [NAN, 0.0, 0.0, NAN, 0.0, 0.0]
        ];
        let mask = mask_invalid_nan(&data);
        assert_eq!(coords(&mask), vec![(1, 1), (2, 4), (3, 2), (5, 0), (5, 3)]);
        assert!(!mask_invalid_infinity(&data).iter().any(|&m| m));
    }

    #[test]
    fn test_mask_invalid_all() {
        let data = array![[1.0, NAN, INF], [-INF, 2.0, 3.0]];
        let mask = mask_invalid_all(&data).unwrap();
        assert_eq!(mask, array![[false, true, true], [true, false, false]]);
    }

    #[test]
    fn test_mask_invalid_all_matches_union_of_registry() {
        let data = array![0.0, NAN, -INF, INF, 5.0, f32::MAX as f64];
        let mask = mask_invalid_all(&data).unwrap();
        for (i, &value) in data.iter().enumerate() {
            let flagged = INVALID_PREDICATES.iter().any(|p| (p.predicate)(value));
            assert_eq!(mask[i], flagged);
        }
    }

    #[test]
    fn test_integer_arrays_are_always_valid() {
        let data = Array2::<u16>::from_elem((4, 4), u16::MAX);
        assert!(!mask_invalid_all(&data).unwrap().iter().any(|&m| m));
    }

    #[test]
    fn test_f32_input() {
        let data = array![f32::NAN, 1.0f32, f32::NEG_INFINITY];
        assert_eq!(mask_invalid_all(&data).unwrap(), array![true, false, true]);
    }
}
