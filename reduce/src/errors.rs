//! Error types for mask generation and synthesis.

use crate::stats::StatsError;
use std::fmt;
use thiserror::Error;

/// Broad classification of a [`MaskError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A parameter was malformed or out of its domain.
    Input,
    /// Masks handed to a combinator do not share one shape.
    DataMismatch,
    /// The data itself cannot support the requested computation.
    Data,
    /// The element count exceeds what float arithmetic can resolve.
    Imprecision,
    /// A code path presumed unreachable was taken.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorKind::Input => "input",
            ErrorKind::DataMismatch => "data mismatch",
            ErrorKind::Data => "data",
            ErrorKind::Imprecision => "imprecision",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Errors raised while computing or combining masks.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MaskError {
    #[error(
        "column and row indexes must be parallel arrays, got {columns} column indexes and {rows} row indexes"
    )]
    ParallelLengthMismatch { columns: usize, rows: usize },

    #[error("the {axis} range is empty, at least one bound is required")]
    EmptyRange { axis: &'static str },

    #[error("{axis} index {index} is out of bounds for an axis of length {len}")]
    IndexOutOfBounds {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{parameter} must be within [0, 1], got {value}")]
    PercentOutOfRange { parameter: &'static str, value: f64 },

    #[error("sigma clipping needs at least 1 iteration, got {iterations}")]
    InvalidIterations { iterations: usize },

    #[error("there are no input masks to combine")]
    NoMasks,

    #[error("mask {index} has shape {shape:?}, expected shape {expected:?}")]
    ShapeMismatch {
        index: usize,
        shape: Vec<usize>,
        expected: Vec<usize>,
    },

    #[error(
        "{element_count} elements exceed the {digits}-digit resolution of float multiplication; percent truncation would be inaccurate"
    )]
    Imprecision { element_count: usize, digits: u32 },

    #[error("statistics failed: {0}")]
    Statistics(#[from] StatsError),

    #[error("internal inconsistency: {0}")]
    Internal(String),
}

impl MaskError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MaskError::ParallelLengthMismatch { .. }
            | MaskError::EmptyRange { .. }
            | MaskError::IndexOutOfBounds { .. }
            | MaskError::PercentOutOfRange { .. }
            | MaskError::InvalidIterations { .. }
            | MaskError::NoMasks => ErrorKind::Input,
            MaskError::ShapeMismatch { .. } => ErrorKind::DataMismatch,
            MaskError::Statistics(_) => ErrorKind::Data,
            MaskError::Imprecision { .. } => ErrorKind::Imprecision,
            MaskError::Internal(_) => ErrorKind::Internal,
        }
    }
}
