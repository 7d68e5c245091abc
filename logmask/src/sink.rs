//! Adapters for emitting masked values through `slog`.
//!
//! [`Masked`] implements `slog::Value`, so the logged view of an argument or
//! result can be attached to a record as a key/value pair as well as rendered
//! into the message text.
//!
//! A masked tree is emitted as a nested serde value. Fallbacks are emitted as
//! strings. Nothing here returns serialization errors of its own.

use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::masking::{Masked, UNMASKABLE_PLACEHOLDER};

impl SlogValue for Masked<'_> {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        match self {
            Masked::Tree(tree) => {
                let nested = slog::Serde(tree.clone());
                SlogValue::serialize(&nested, record, key, serializer)
            }
            Masked::Unmasked(_) => serializer.emit_arguments(key, &format_args!("{self}")),
            Masked::Placeholder => serializer.emit_str(key, UNMASKABLE_PLACEHOLDER),
        }
    }
}
