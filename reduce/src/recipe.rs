//! JSON-described masking pipelines over 2-D frames.
//!
//! A [`MaskRecipe`] lists mask generators as [`MaskStep`]s and how their
//! results are merged. Recipes round-trip through pretty-printed JSON so a
//! reduction can be repeated with the same rejection rules.
//!
//! ```json
//! {
//!   "combine": "or",
//!   "steps": [
//!     { "kind": "invalid_all" },
//!     { "kind": "columns", "columns": [0, 511] },
//!     { "kind": "sigma_value", "sigma": { "lower": 3.0, "upper": 5.0 }, "iterations": 3 }
//!   ]
//! }
//! ```

use crate::errors::MaskError;
use crate::mask::{self, Pixel, SigmaMultiple};
use ndarray::{Array2, ArrayBase, Data, Ix2};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_iterations() -> usize {
    1
}

/// One mask generator and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaskStep {
    Nothing,
    Everything,
    SinglePixels {
        columns: Vec<usize>,
        rows: Vec<usize>,
    },
    Rectangle {
        column_range: Vec<usize>,
        row_range: Vec<usize>,
    },
    Subarray {
        column_range: Vec<usize>,
        row_range: Vec<usize>,
    },
    Columns {
        columns: Vec<usize>,
    },
    Rows {
        rows: Vec<usize>,
    },
    InvalidInfinity,
    InvalidPositiveInfinity,
    InvalidNegativeInfinity,
    InvalidNan,
    InvalidAll,
    MaximumValue {
        maximum: f64,
    },
    MinimumValue {
        minimum: f64,
    },
    ExactValue {
        value: f64,
    },
    CountTruncation {
        #[serde(default)]
        top: usize,
        #[serde(default)]
        bottom: usize,
    },
    PercentTruncation {
        #[serde(default)]
        top: f64,
        #[serde(default)]
        bottom: f64,
    },
    SigmaValue {
        sigma: SigmaMultiple,
        #[serde(default = "default_iterations")]
        iterations: usize,
    },
}

impl MaskStep {
    /// Evaluate this step against `frame`.
    pub fn apply<S, T>(&self, frame: &ArrayBase<S, Ix2>) -> Result<Array2<bool>, MaskError>
    where
        S: Data<Elem = T>,
        T: Pixel,
    {
        let generated = match self {
            MaskStep::Nothing => mask::mask_nothing(frame),
            MaskStep::Everything => mask::mask_everything(frame),
            MaskStep::SinglePixels { columns, rows } => {
                mask::mask_single_pixels(frame, columns, rows)?
            }
            MaskStep::Rectangle {
                column_range,
                row_range,
            } => mask::mask_rectangle(frame, column_range, row_range)?,
            MaskStep::Subarray {
                column_range,
                row_range,
            } => mask::mask_subarray(frame, column_range, row_range)?,
            MaskStep::Columns { columns } => mask::mask_columns(frame, columns)?,
            MaskStep::Rows { rows } => mask::mask_rows(frame, rows)?,
            MaskStep::InvalidInfinity => mask::mask_invalid_infinity(frame),
            MaskStep::InvalidPositiveInfinity => mask::mask_invalid_positive_infinity(frame),
            MaskStep::InvalidNegativeInfinity => mask::mask_invalid_negative_infinity(frame),
            MaskStep::InvalidNan => mask::mask_invalid_nan(frame),
            MaskStep::InvalidAll => mask::mask_invalid_all(frame)?,
            MaskStep::MaximumValue { maximum } => mask::mask_maximum_value(frame, *maximum),
            MaskStep::MinimumValue { minimum } => mask::mask_minimum_value(frame, *minimum),
            MaskStep::ExactValue { value } => mask::mask_exact_value(frame, *value),
            MaskStep::CountTruncation { top, bottom } => {
                mask::mask_count_truncation(frame, *top, *bottom)
            }
            MaskStep::PercentTruncation { top, bottom } => {
                mask::mask_percent_truncation(frame, *top, *bottom)?
            }
            MaskStep::SigmaValue { sigma, iterations } => {
                mask::mask_sigma_value(frame, *sigma, *iterations)?
            }
        };
        Ok(generated)
    }
}

/// How the masks of a recipe are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combination {
    #[default]
    Or,
    And,
}

/// A masking pipeline: every step is evaluated against the same frame and
/// the resulting masks are merged with `combine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskRecipe {
    #[serde(default)]
    pub combine: Combination,
    pub steps: Vec<MaskStep>,
}

impl MaskRecipe {
    pub fn new(combine: Combination, steps: Vec<MaskStep>) -> Self {
        Self { combine, steps }
    }

    /// Evaluate every step and merge the results.
    ///
    /// A recipe with one step returns that step's mask directly.
    ///
    /// # Errors
    /// * [`MaskError::NoMasks`] if the recipe has no steps
    /// * any error raised by an individual step
    pub fn apply<S, T>(&self, frame: &ArrayBase<S, Ix2>) -> Result<Array2<bool>, MaskError>
    where
        S: Data<Elem = T>,
        T: Pixel,
    {
        let mut masks = self
            .steps
            .iter()
            .map(|step| step.apply(frame))
            .collect::<Result<Vec<_>, _>>()?;

        match masks.len() {
            0 => Err(MaskError::NoMasks),
            1 => Ok(masks.remove(0)),
            _ => {
                let views: Vec<_> = masks.iter().map(|mask| mask.view()).collect();
                match self.combine {
                    Combination::Or => mask::combine_masks_or(&views),
                    Combination::And => mask::combine_masks_and(&views),
                }
            }
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
