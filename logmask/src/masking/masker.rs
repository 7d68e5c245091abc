//! Turning one argument or result into a safe-to-log copy.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde_json::Value;
use slog::{warn, Logger};

use super::{format::mask_by_formats, path::mask_by_path, registry::FormatRegistry};
use crate::{
    config::FailureFallback,
    error::ConversionError,
    markers::FieldPath,
    tree::{convert, LogValue},
};

/// Text logged in place of a value that could not be masked, when the
/// interceptor is configured with [`FailureFallback::Placeholder`].
pub const UNMASKABLE_PLACEHOLDER: &str = "[UNMASKABLE]";

/// The logged view of a value.
pub enum Masked<'a> {
    /// A masked copy of the value.
    Tree(Value),
    /// Conversion failed; the original value is logged as is.
    ///
    /// This is the one way sensitive data can reach the log sink.
    Unmasked(&'a dyn LogValue),
    /// Conversion failed; a fixed placeholder is logged instead.
    Placeholder,
}

impl Masked<'_> {
    /// Returns the masked tree, if masking succeeded.
    #[must_use]
    pub fn tree(&self) -> Option<&Value> {
        match self {
            Masked::Tree(tree) => Some(tree),
            Masked::Unmasked(_) | Masked::Placeholder => None,
        }
    }
}

impl fmt::Display for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Masked::Tree(tree) => write!(f, "{tree}"),
            Masked::Unmasked(original) => original.fmt_unmasked(f),
            Masked::Placeholder => f.write_str(UNMASKABLE_PLACEHOLDER),
        }
    }
}

impl fmt::Debug for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Masked::Tree(tree) => f.debug_tuple("Tree").field(tree).finish(),
            Masked::Unmasked(_) => f.write_str("Unmasked(..)"),
            Masked::Placeholder => f.write_str("Placeholder"),
        }
    }
}

/// Converts a value into a fresh tree and applies path rules, then formats.
///
/// `original` is only read. Path rules run first so explicit rules decide how
/// their fields look; the format pass then catches anything they missed.
pub fn mask_tree(
    original: &dyn LogValue,
    paths: &BTreeMap<FieldPath, String>,
    formats: &BTreeSet<String>,
    registry: &FormatRegistry,
    max_depth: usize,
) -> Result<Value, ConversionError> {
    let mut tree = convert(original, max_depth)?;
    if tree.is_null() {
        return Ok(tree);
    }
    for (path, format) in paths {
        mask_by_path(&mut tree, path.segments(), format, registry);
    }
    if !formats.is_empty() {
        mask_by_formats(&mut tree, formats, registry);
    }
    Ok(tree)
}

/// Call-scoped masking pipeline with failure recovery.
pub struct Masker<'a> {
    registry: &'a FormatRegistry,
    logger: &'a Logger,
    max_depth: usize,
    fallback: FailureFallback,
}

impl<'a> Masker<'a> {
    #[must_use]
    pub fn new(
        registry: &'a FormatRegistry,
        logger: &'a Logger,
        max_depth: usize,
        fallback: FailureFallback,
    ) -> Self {
        Self {
            registry,
            logger,
            max_depth,
            fallback,
        }
    }

    /// Masks `original`, never failing.
    ///
    /// On conversion failure a warning is logged and the configured fallback
    /// is returned in place of the masked copy.
    pub fn mask<'v>(
        &self,
        original: &'v dyn LogValue,
        paths: &BTreeMap<FieldPath, String>,
        formats: &BTreeSet<String>,
    ) -> Masked<'v> {
        match mask_tree(original, paths, formats, self.registry, self.max_depth) {
            Ok(tree) => Masked::Tree(tree),
            Err(err) => {
                warn!(self.logger, "Masking failed: {}", err; "error" => %err);
                match self.fallback {
                    FailureFallback::Unmasked => Masked::Unmasked(original),
                    FailureFallback::Placeholder => Masked::Placeholder,
                }
            }
        }
    }
}
