//! The masking engine.
//!
//! - **`registry`**: named formats, each a detector plus a masking strategy
//! - **`path`**: masks one field addressed by a dotted path
//! - **`format`**: masks every string that looks like a known format
//! - **`masker`**: converts a value to a tree and runs both passes on it

mod format;
mod masker;
mod path;
mod registry;

pub use format::mask_by_formats;
pub use masker::{mask_tree, Masked, Masker, UNMASKABLE_PLACEHOLDER};
pub use path::mask_by_path;
pub use registry::{Detector, Format, FormatRegistry, MaskStrategy, DEFAULT_FORMAT, MASK};
