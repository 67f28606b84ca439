//! Pixel rejection masks for astronomical frame reduction.
//!
//! Masks are boolean arrays with the shape of the data they describe, where
//! `true` marks an entry to reject. The [`mask`] module holds the generators
//! (geometric, invalid-value and value-based) and the OR / AND combinators;
//! [`recipe`] describes whole masking pipelines as JSON; [`synthetic`]
//! builds seeded test frames with planted defects.
//!
//! Recoverable conditions are reported as `tracing` events through
//! [`diagnostics`]; fatal ones are returned as [`MaskError`].

pub mod diagnostics;
pub mod errors;
pub mod mask;
pub mod recipe;
pub mod stats;
pub mod synthetic;

pub use diagnostics::{DiagnosticCategory, DiagnosticsCapture, DiagnosticsConfig};
pub use errors::{ErrorKind, MaskError};
pub use mask::{masked_coordinates, masked_count, Pixel};
pub use recipe::{Combination, MaskRecipe, MaskStep};
