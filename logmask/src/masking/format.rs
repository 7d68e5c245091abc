//! Masking every string that looks like a registered format.

use std::collections::BTreeSet;

use serde_json::Value;

use super::registry::FormatRegistry;

/// Masks every string value held under a mapping key whose text matches one of
/// `formats`.
///
/// Formats are tried in the set's (sorted) order and the first match wins.
/// Names missing from the registry never match. Sequences are walked element
/// by element, but strings sitting directly in a sequence are not mapping
/// values and stay as they are, as do numbers, booleans and nulls.
pub fn mask_by_formats(tree: &mut Value, formats: &BTreeSet<String>, registry: &FormatRegistry) {
    if formats.is_empty() {
        return;
    }

    match tree {
        Value::Array(items) => {
            for item in items {
                mask_by_formats(item, formats, registry);
            }
        }
        Value::Object(map) => {
            for value in map.values_mut() {
                match value {
                    Value::String(text) => {
                        if let Some(masked) = first_match(text, formats, registry) {
                            *text = masked;
                        }
                    }
                    _ => mask_by_formats(value, formats, registry),
                }
            }
        }
        _ => {}
    }
}

fn first_match(text: &str, formats: &BTreeSet<String>, registry: &FormatRegistry) -> Option<String> {
    formats
        .iter()
        .find_map(|format| registry.try_mask(text, format))
}
