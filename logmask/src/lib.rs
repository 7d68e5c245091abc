//! Logging of intercepted calls with sensitive fields masked.
//!
//! The host's interception layer hands each call to a [`LogInterceptor`],
//! which:
//! - decides whether the call is logged, from the global [`LogMode`] and the
//!   markers declared for the owner type and operation,
//! - converts every argument and the result into a fresh value tree,
//! - masks fields named by dotted paths (`user.password`) and any string that
//!   matches a registered format (`email`, `mobile`, ...),
//! - logs the masked copies through `slog` and returns the real result.
//!
//! Key rules:
//! - The caller's values are only borrowed. Masking works on a copy.
//! - Masking is total. A value that cannot be converted is logged through its
//!   `Debug` output instead (or as a placeholder, see [`FailureFallback`]),
//!   which means it is logged **unmasked**.
//! - The intercepted operation's own error always reaches the caller
//!   unchanged.
//!
//! Markers are declared statically, with `#[derive(LogTarget)]` or by building
//! [`TargetMarkers`], and collected in a [`MarkerRegistry`] at startup.
//! Format registries are likewise built at startup and then shared read-only.
//!
//! What this crate does not do:
//! - provide the interception mechanism itself
//! - load configuration from files or the environment
//! - configure `slog` drains

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[cfg(feature = "derive")]
pub use logmask_derive::LogTarget;

#[allow(unused_extern_crates)]
extern crate self as logmask;

// Module declarations
mod bounded;
mod config;
mod error;
mod interceptor;
mod markers;
mod masking;
mod policy;
mod sink;
mod tree;

// Re-exports
pub use config::{FailureFallback, LogConfig, OWN_SCOPE};
pub use error::{ConversionError, RuleError};
pub use interceptor::{CallArgs, Decorated, LogInterceptor, Operation};
pub use markers::{
    DeclaredMarkers, EnableLog, FieldPath, LogTarget, MarkerRegistry, MaskRule, ScopeMarkers,
    TargetMarkers,
};
pub use masking::{
    mask_by_formats, mask_by_path, mask_tree, Detector, Format, FormatRegistry, MaskStrategy,
    Masked, Masker, DEFAULT_FORMAT, MASK, UNMASKABLE_PLACEHOLDER,
};
pub use policy::{decide, Decision, EffectiveMaskConfig, LogMode};
pub use tree::{LogValue, DEFAULT_MAX_DEPTH};
