//! Logical synthesis of several masks into one.

use crate::diagnostics::{self, DiagnosticCategory};
use crate::errors::MaskError;
use ndarray::{Array, ArrayView, Dimension, Zip};

/// Combine masks so an entry is masked if ANY input masks it.
///
/// # Errors
/// * [`MaskError::NoMasks`] if `masks` is empty
/// * [`MaskError::ShapeMismatch`] if any mask differs in shape from the first
pub fn combine_masks_or<D>(masks: &[ArrayView<'_, bool, D>]) -> Result<Array<bool, D>, MaskError>
where
    D: Dimension,
{
    combine_with(masks, |acc, &masked| *acc = *acc || masked)
}

/// Combine masks so an entry is masked only if ALL inputs mask it.
///
/// # Errors
/// * [`MaskError::NoMasks`] if `masks` is empty
/// * [`MaskError::ShapeMismatch`] if any mask differs in shape from the first
pub fn combine_masks_and<D>(masks: &[ArrayView<'_, bool, D>]) -> Result<Array<bool, D>, MaskError>
where
    D: Dimension,
{
    combine_with(masks, |acc, &masked| *acc = *acc && masked)
}

fn combine_with<D, F>(masks: &[ArrayView<'_, bool, D>], fold: F) -> Result<Array<bool, D>, MaskError>
where
    D: Dimension,
    F: Fn(&mut bool, &bool),
{
    let (first, rest) = masks.split_first().ok_or(MaskError::NoMasks)?;

    for (offset, mask) in rest.iter().enumerate() {
        if mask.shape() != first.shape() {
            return Err(MaskError::ShapeMismatch {
                index: offset + 1,
                shape: mask.shape().to_vec(),
                expected: first.shape().to_vec(),
            });
        }
    }

    if rest.is_empty() {
        diagnostics::warn(
            DiagnosticCategory::Input,
            "Only one mask was provided; synthesis is not needed and the mask is returned unchanged.",
        );
    }

    let mut combined = first.to_owned();
    for mask in rest {
        Zip::from(&mut combined).and(mask).for_each(|acc, masked| fold(acc, masked));
    }

    Ok(combined)
}
