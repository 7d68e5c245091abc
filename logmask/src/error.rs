//! Error types.
//!
//! None of these ever reach the caller of an intercepted operation. Conversion
//! failures are logged and degrade the logged view; rule errors surface only
//! while markers are being declared at startup.

use thiserror::Error;

/// A value could not be turned into a value tree.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The value's `Serialize` implementation failed or produced something
    /// JSON cannot represent (for example a map with non-string keys).
    #[error("value is not representable as a tree: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The converted tree nests deeper than the configured limit.
    #[error("value nests deeper than {limit} levels")]
    TooDeep {
        /// The limit that was exceeded.
        limit: usize,
    },
}

/// A `path=format` declaration could not be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("mask rule has an empty field path")]
    EmptyPath,
    #[error("mask rule `{rule}` has an empty path segment")]
    EmptySegment { rule: String },
    #[error("mask rule `{rule}` has an empty format after `=`")]
    EmptyFormat { rule: String },
}
