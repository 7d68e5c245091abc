//! Named formats: a detector paired with a masking strategy.
//!
//! Strategies are pure string transformations. They do not traverse trees or
//! decide which fields are sensitive; that is the job of the path and format
//! maskers.

use std::{borrow::Cow, collections::HashMap, fmt, sync::Arc};

use once_cell::sync::Lazy;
use regex::Regex;

/// Name of the fallback format used for unknown format names.
pub const DEFAULT_FORMAT: &str = "default";

/// Text substituted for the hidden part of a value.
pub const MASK: &str = "****";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+@.+\..+$").expect("email pattern should compile"));

static MOBILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("mobile pattern should compile"));

/// Decides whether a string has the shape of a format.
#[derive(Clone)]
pub enum Detector {
    /// Matches every value.
    Any,
    /// Matches values the regular expression matches.
    Pattern(Regex),
    /// Matches values the predicate accepts.
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Detector {
    /// Wraps a predicate.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Detector::Any => true,
            Detector::Pattern(pattern) => pattern.is_match(value),
            Detector::Custom(predicate) => predicate(value),
        }
    }
}

impl fmt::Debug for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detector::Any => f.write_str("Any"),
            Detector::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Detector::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How a detected value is rewritten.
///
/// All strategies operate on Unicode scalar values and return an owned `String`.
#[derive(Clone)]
pub enum MaskStrategy {
    /// Replace the entire value with a fixed placeholder.
    Fixed {
        /// The placeholder text to use.
        placeholder: Cow<'static, str>,
    },
    /// Keep `prefix` leading and `suffix` trailing characters around [`MASK`].
    ///
    /// Values no longer than `prefix + suffix` become [`MASK`] alone.
    KeepEnds { prefix: usize, suffix: usize },
    /// Hide the local part of an address, keeping its first character when
    /// the local part is longer than one character. Everything from the
    /// first `@` on is kept.
    EmailLocal,
    /// Replace the characters in `start..end` with [`MASK`].
    ///
    /// Values shorter than `end` become [`MASK`] alone.
    Splice { start: usize, end: usize },
    /// Rewrite with an arbitrary function.
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl MaskStrategy {
    /// Constructs [`MaskStrategy::Fixed`].
    #[must_use]
    pub fn fixed<P>(placeholder: P) -> Self
    where
        P: Into<Cow<'static, str>>,
    {
        Self::Fixed {
            placeholder: placeholder.into(),
        }
    }

    /// Wraps a function.
    pub fn custom<F>(strategy: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(strategy))
    }

    /// Applies the strategy to `value`.
    ///
    /// This method is total (it does not return errors).
    #[must_use]
    pub fn apply_to(&self, value: &str) -> String {
        match self {
            MaskStrategy::Fixed { placeholder } => placeholder.clone().into_owned(),
            MaskStrategy::KeepEnds { prefix, suffix } => keep_ends(value, *prefix, *suffix),
            MaskStrategy::EmailLocal => email_local(value),
            MaskStrategy::Splice { start, end } => splice(value, *start, *end),
            MaskStrategy::Custom(strategy) => strategy(value),
        }
    }
}

impl fmt::Debug for MaskStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskStrategy::Fixed { placeholder } => f
                .debug_struct("Fixed")
                .field("placeholder", placeholder)
                .finish(),
            MaskStrategy::KeepEnds { prefix, suffix } => f
                .debug_struct("KeepEnds")
                .field("prefix", prefix)
                .field("suffix", suffix)
                .finish(),
            MaskStrategy::EmailLocal => f.write_str("EmailLocal"),
            MaskStrategy::Splice { start, end } => f
                .debug_struct("Splice")
                .field("start", start)
                .field("end", end)
                .finish(),
            MaskStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn keep_ends(value: &str, prefix: usize, suffix: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let total = chars.len();
    if total <= prefix.saturating_add(suffix) {
        return MASK.to_string();
    }
    let mut masked: String = chars[..prefix].iter().collect();
    masked.push_str(MASK);
    masked.extend(&chars[total - suffix..]);
    masked
}

fn email_local(value: &str) -> String {
    let Some(at) = value.find('@') else {
        return MASK.to_string();
    };
    let local = &value[..at];
    let mut local_chars = local.chars();
    match (local_chars.next(), local_chars.next()) {
        (Some(first), Some(_)) => format!("{first}{MASK}{}", &value[at..]),
        _ => format!("{MASK}{}", &value[at..]),
    }
}

fn splice(value: &str, start: usize, end: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < end || start > end {
        return MASK.to_string();
    }
    let mut masked: String = chars[..start].iter().collect();
    masked.push_str(MASK);
    masked.extend(&chars[end..]);
    masked
}

/// A detector paired with the strategy applied to values it matches.
#[derive(Clone, Debug)]
pub struct Format {
    pub detector: Detector,
    pub strategy: MaskStrategy,
}

impl Format {
    #[must_use]
    pub fn new(detector: Detector, strategy: MaskStrategy) -> Self {
        Self { detector, strategy }
    }

    /// Returns the masked value if the detector matches.
    #[must_use]
    pub fn try_apply(&self, value: &str) -> Option<String> {
        self.detector
            .matches(value)
            .then(|| self.strategy.apply_to(value))
    }
}

/// Format name to (detector, strategy) lookup.
///
/// A registry is populated at startup with [`FormatRegistry::register`] and
/// then frozen behind an `Arc` when handed to a
/// [`LogInterceptor`](crate::LogInterceptor). Registration takes `&mut self`,
/// so a shared registry cannot change while calls are reading it and no
/// locking is needed on the read path.
#[derive(Clone, Debug)]
pub struct FormatRegistry {
    formats: HashMap<String, Format>,
    fallback: Format,
}

impl FormatRegistry {
    /// A registry holding the `default`, `email` and `mobile` formats.
    #[must_use]
    pub fn builtin() -> Self {
        let fallback = Format::new(
            Detector::Any,
            MaskStrategy::KeepEnds {
                prefix: 2,
                suffix: 2,
            },
        );
        let mut registry = Self {
            formats: HashMap::new(),
            fallback: fallback.clone(),
        };
        registry.register(DEFAULT_FORMAT, fallback.detector, fallback.strategy);
        registry.register(
            "email",
            Detector::Pattern(EMAIL_PATTERN.clone()),
            MaskStrategy::EmailLocal,
        );
        registry.register(
            "mobile",
            Detector::Pattern(MOBILE_PATTERN.clone()),
            MaskStrategy::Splice { start: 3, end: 7 },
        );
        registry
    }

    /// Inserts or replaces the format called `name`.
    ///
    /// Replacing `default` also replaces the fallback used for unknown names.
    pub fn register(&mut self, name: impl Into<String>, detector: Detector, strategy: MaskStrategy) {
        let name = name.into();
        let format = Format::new(detector, strategy);
        if name == DEFAULT_FORMAT {
            self.fallback = format.clone();
        }
        self.formats.insert(name, format);
    }

    /// Inserts or replaces a format built from two closures.
    pub fn register_fn<D, S>(&mut self, name: impl Into<String>, detector: D, strategy: S)
    where
        D: Fn(&str) -> bool + Send + Sync + 'static,
        S: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.register(name, Detector::custom(detector), MaskStrategy::custom(strategy));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Format> {
        self.formats.get(name)
    }

    /// Masks `value` with the format called `name`, or with `default` when no
    /// such format exists. Values the detector rejects are returned unchanged.
    #[must_use]
    pub fn mask_by_format(&self, value: &str, name: &str) -> String {
        let format = self.formats.get(name).unwrap_or(&self.fallback);
        format
            .try_apply(value)
            .unwrap_or_else(|| value.to_string())
    }

    /// Masks `value` only if `name` is registered and its detector matches.
    ///
    /// Unlike [`FormatRegistry::mask_by_format`] there is no fallback: an
    /// unknown name never matches.
    #[must_use]
    pub fn try_mask(&self, value: &str, name: &str) -> Option<String> {
        self.formats.get(name)?.try_apply(value)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
