//! Masking a single field addressed by a dotted path.

use serde_json::Value;

use super::registry::FormatRegistry;

/// Masks the string reached by descending `path` through `tree`.
///
/// Each segment names a mapping key. A sequence encountered anywhere along the
/// way receives the same, unreduced path for every element, so `email`
/// reaches the `email` field of every record in a list. Missing keys, type
/// mismatches and non-string targets are ignored.
pub fn mask_by_path(tree: &mut Value, path: &[String], format: &str, registry: &FormatRegistry) {
    let Some((field, rest)) = path.split_first() else {
        return;
    };

    match tree {
        Value::Object(map) => {
            let Some(next) = map.get_mut(field) else {
                return;
            };
            if rest.is_empty() {
                if let Value::String(text) = next {
                    *text = registry.mask_by_format(text, format);
                }
                return;
            }
            mask_by_path(next, rest, format, registry);
        }
        Value::Array(items) => {
            for item in items {
                mask_by_path(item, path, format, registry);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::mask_by_path;
    use crate::masking::registry::FormatRegistry;

    fn path(dotted: &str) -> Vec<String> {
        dotted.split('.').map(str::to_string).collect()
    }

    fn masked(mut tree: Value, dotted: &str, format: &str) -> Value {
        mask_by_path(&mut tree, &path(dotted), format, &FormatRegistry::builtin());
        tree
    }

    #[test]
    fn masks_nested_field_only() {
        let tree = json!({"user": {"name": "Tom", "password": "12345678"}, "status": "OK"});
        assert_eq!(
            masked(tree, "user.password", "default"),
            json!({"user": {"name": "Tom", "password": "12****78"}, "status": "OK"})
        );
    }

    #[test]
    fn applies_same_path_to_every_element() {
        let tree = json!([{"email": "a@x.com"}, {"email": "bob@y.com"}]);
        assert_eq!(
            masked(tree, "email", "email"),
            json!([{"email": "****@x.com"}, {"email": "b****@y.com"}])
        );
    }

    #[test]
    fn descends_through_nested_sequences() {
        let tree = json!({"users": [{"secret": "abcdefgh"}, {"secret": "ijklmnop"}]});
        assert_eq!(
            masked(tree, "users.secret", "default"),
            json!({"users": [{"secret": "ab****gh"}, {"secret": "ij****op"}]})
        );
    }

    #[test]
    fn missing_keys_are_ignored() {
        let tree = json!({"user": {"name": "Tom"}});
        assert_eq!(masked(tree.clone(), "user.password", "default"), tree);
        assert_eq!(masked(tree.clone(), "account.number", "default"), tree);
    }

    #[test]
    fn non_string_targets_are_ignored() {
        let tree = json!({"pin": 1234, "flags": {"admin": true}, "tags": ["abcdefg"]});
        assert_eq!(masked(tree.clone(), "pin", "default"), tree);
        assert_eq!(masked(tree.clone(), "flags.admin", "default"), tree);
        assert_eq!(masked(tree.clone(), "tags", "default"), tree);
    }

    #[test]
    fn path_through_scalar_is_ignored() {
        let tree = json!({"user": "plain"});
        assert_eq!(masked(tree.clone(), "user.password", "default"), tree);
    }

    #[test]
    fn empty_path_is_a_no_op() {
        let mut tree = json!({"password": "12345678"});
        let expected = tree.clone();
        mask_by_path(&mut tree, &[], "default", &FormatRegistry::builtin());
        assert_eq!(tree, expected);
    }

    #[test]
    fn null_tree_is_a_no_op() {
        assert_eq!(masked(Value::Null, "a", "default"), Value::Null);
    }

    #[test]
    fn undetected_value_is_left_alone() {
        let tree = json!({"contact": "not-an-email"});
        assert_eq!(masked(tree.clone(), "contact", "email"), tree);
    }
}
