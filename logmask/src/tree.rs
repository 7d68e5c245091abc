//! The value tree that masking operates on.
//!
//! Arguments and results are converted into a `serde_json::Value` before any
//! masking happens. Conversion goes through `Serialize` and always builds a
//! fresh tree, so the caller's value is only ever borrowed and never changes.
//! The nesting limit is enforced while serializing, so a value that refers
//! back to itself fails to convert instead of overflowing the stack.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{
    bounded::{Bounded, DepthGuard},
    error::ConversionError,
};

/// Default nesting limit for converted trees.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Object-safe view of a value that can be logged.
///
/// Blanket-implemented for every `Serialize + Debug` type, so arguments of
/// different types can be passed together as `&[&dyn LogValue]`.
pub trait LogValue {
    /// Builds a fresh value tree from `self`, nesting at most `max_depth`
    /// levels deep.
    fn to_tree(&self, max_depth: usize) -> Result<Value, ConversionError>;

    /// Formats `self` without masking. Used only when conversion fails and the
    /// interceptor is configured to log the original value.
    fn fmt_unmasked(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T> LogValue for T
where
    T: Serialize + fmt::Debug + ?Sized,
{
    fn to_tree(&self, max_depth: usize) -> Result<Value, ConversionError> {
        let guard = DepthGuard::new(max_depth);
        serde_json::to_value(Bounded::root(self, &guard)).map_err(|err| {
            if guard.exceeded() {
                ConversionError::TooDeep {
                    limit: guard.limit(),
                }
            } else {
                ConversionError::Serialize(err)
            }
        })
    }

    fn fmt_unmasked(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Converts `value` into a tree no deeper than `max_depth`.
pub(crate) fn convert(value: &dyn LogValue, max_depth: usize) -> Result<Value, ConversionError> {
    value.to_tree(max_depth)
}
