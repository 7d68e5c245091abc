//! Interceptor configuration.
//!
//! Loading is left to the host; `LogConfig` derives `Deserialize` so it can be
//! bound from whatever source the host already uses.

use serde::Deserialize;

use crate::{policy::LogMode, tree::DEFAULT_MAX_DEPTH};

/// Scope prefix of this crate. Always excluded so the interceptor never logs
/// its own calls.
pub const OWN_SCOPE: &str = "logmask";

/// What is logged when a value cannot be converted for masking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureFallback {
    /// Log the original value through its `Debug` output, unmasked.
    #[default]
    Unmasked,
    /// Log a fixed placeholder.
    Placeholder,
}

/// Which calls are intercepted and how.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LogConfig {
    /// Owner path prefixes to handle. Empty means nothing is handled.
    pub include: Vec<String>,
    /// Owner path prefixes to leave alone, checked after `include`.
    pub exclude: Vec<String>,
    pub mode: LogMode,
    /// Deepest nesting a logged value may have before masking gives up on it.
    pub max_depth: usize,
    pub on_failure: FailureFallback,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            mode: LogMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            on_failure: FailureFallback::default(),
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include(mut self, prefix: impl Into<String>) -> Self {
        self.include.push(prefix.into());
        self
    }

    #[must_use]
    pub fn exclude(mut self, prefix: impl Into<String>) -> Self {
        self.exclude.push(prefix.into());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: LogMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_failure_fallback(mut self, fallback: FailureFallback) -> Self {
        self.on_failure = fallback;
        self
    }

    /// Adds [`OWN_SCOPE`] to `exclude` if it is not already there.
    pub(crate) fn exclude_own_scope(&mut self) {
        if !self.exclude.iter().any(|prefix| prefix == OWN_SCOPE) {
            self.exclude.push(OWN_SCOPE.to_string());
        }
    }

    /// Whether calls on `owner` go through masking and logging at all.
    #[must_use]
    pub fn applies_to(&self, owner: &str) -> bool {
        let included = self.include.iter().any(|prefix| owner.starts_with(prefix.as_str()));
        let excluded = self.exclude.iter().any(|prefix| owner.starts_with(prefix.as_str()));
        included && !excluded
    }
}
