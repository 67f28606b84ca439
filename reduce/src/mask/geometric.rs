//! Masks computed from array geometry alone.
//!
//! The data array only supplies the shape; its values are never read.
//! Two-dimensional generators index frames as `[row, column]`, matching
//! how frames are laid out everywhere else in this crate.

use crate::diagnostics::{self, DiagnosticCategory};
use crate::errors::MaskError;
use ndarray::{s, Array, Array2, ArrayBase, Dimension, Ix2, RawData};
use std::ops::Range;

/// Mask with every entry valid.
pub fn mask_nothing<S, D>(data: &ArrayBase<S, D>) -> Array<bool, D>
where
    S: RawData,
    D: Dimension,
{
    Array::from_elem(data.raw_dim(), false)
}

/// Mask with every entry rejected.
pub fn mask_everything<S, D>(data: &ArrayBase<S, D>) -> Array<bool, D>
where
    S: RawData,
    D: Dimension,
{
    Array::from_elem(data.raw_dim(), true)
}

/// Mask individual pixels given as parallel lists of column and row indexes.
///
/// # Errors
/// * [`MaskError::ParallelLengthMismatch`] if the lists differ in length
/// * [`MaskError::IndexOutOfBounds`] if a coordinate lies outside the frame
pub fn mask_single_pixels<S>(
    data: &ArrayBase<S, Ix2>,
    column_indexes: &[usize],
    row_indexes: &[usize],
) -> Result<Array2<bool>, MaskError>
where
    S: RawData,
{
    if column_indexes.len() != row_indexes.len() {
        return Err(MaskError::ParallelLengthMismatch {
            columns: column_indexes.len(),
            rows: row_indexes.len(),
        });
    }

    let (height, width) = data.dim();
    let mut mask = mask_nothing(data);
    for (&column, &row) in column_indexes.iter().zip(row_indexes) {
        check_index("column", column, width)?;
        check_index("row", row, height)?;
        mask[[row, column]] = true;
    }

    Ok(mask)
}

/// Mask an inclusive rectangle.
///
/// The first and last entries of each range are its bounds; with more than
/// two entries the inner ones are ignored and a diagnostic is emitted. Bounds
/// past the edge of the frame are clipped, and a range whose first bound
/// exceeds its last selects nothing.
///
/// # Errors
/// * [`MaskError::EmptyRange`] if either range has no entries
pub fn mask_rectangle<S>(
    data: &ArrayBase<S, Ix2>,
    column_range: &[usize],
    row_range: &[usize],
) -> Result<Array2<bool>, MaskError>
where
    S: RawData,
{
    let (height, width) = data.dim();
    let columns = inclusive_bounds("column", column_range, width)?;
    let rows = inclusive_bounds("row", row_range, height)?;

    let mut mask = mask_nothing(data);
    mask.slice_mut(s![rows, columns]).fill(true);
    Ok(mask)
}

/// Mask everything except an inclusive sub-array.
///
/// The exact negation of [`mask_rectangle`] with the same bounds.
pub fn mask_subarray<S>(
    data: &ArrayBase<S, Ix2>,
    column_range: &[usize],
    row_range: &[usize],
) -> Result<Array2<bool>, MaskError>
where
    S: RawData,
{
    let rectangle = mask_rectangle(data, column_range, row_range)?;
    Ok(rectangle.mapv(|masked| !masked))
}

/// Mask every pixel in the listed columns. Repeated indexes are harmless.
pub fn mask_columns<S>(
    data: &ArrayBase<S, Ix2>,
    column_list: &[usize],
) -> Result<Array2<bool>, MaskError>
where
    S: RawData,
{
    let mut mask = mask_nothing(data);
    let width = mask.ncols();
    for &column in column_list {
        check_index("column", column, width)?;
        mask.column_mut(column).fill(true);
    }
    Ok(mask)
}

/// Mask every pixel in the listed rows. Repeated indexes are harmless.
pub fn mask_rows<S>(data: &ArrayBase<S, Ix2>, row_list: &[usize]) -> Result<Array2<bool>, MaskError>
where
    S: RawData,
{
    let mut mask = mask_nothing(data);
    let height = mask.nrows();
    for &row in row_list {
        check_index("row", row, height)?;
        mask.row_mut(row).fill(true);
    }
    Ok(mask)
}

fn check_index(axis: &'static str, index: usize, len: usize) -> Result<(), MaskError> {
    if index >= len {
        return Err(MaskError::IndexOutOfBounds { axis, index, len });
    }
    Ok(())
}

/// Resolve a range list to a half-open index range clipped to `len`.
fn inclusive_bounds(
    axis: &'static str,
    range: &[usize],
    len: usize,
) -> Result<Range<usize>, MaskError> {
    let (first, last) = match (range.first(), range.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(MaskError::EmptyRange { axis }),
    };

    if range.len() > 2 {
        diagnostics::warn(
            DiagnosticCategory::Input,
            &format!(
                "The {axis} range has {} entries; only the first and last are used as bounds.",
                range.len()
            ),
        );
    }

    let start = first.min(len);
    let end = last.saturating_add(1).min(len).max(start);
    Ok(start..end)
}
