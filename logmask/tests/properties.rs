//! Property tests for the built-in formats and tree masking.

use std::collections::{BTreeMap, BTreeSet};

use logmask::{mask_tree, FieldPath, FormatRegistry, DEFAULT_MAX_DEPTH, MASK};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn default_keeps_two_chars_on_each_end(value in "\\PC{5,40}") {
        let registry = FormatRegistry::builtin();
        let masked = registry.mask_by_format(&value, "default");
        let chars: Vec<char> = value.chars().collect();
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[chars.len() - 2..].iter().collect();
        prop_assert_eq!(masked, format!("{head}{MASK}{tail}"));
    }

    #[test]
    fn default_hides_short_values(value in "\\PC{0,4}") {
        let registry = FormatRegistry::builtin();
        prop_assert_eq!(registry.mask_by_format(&value, "default"), MASK);
    }

    #[test]
    fn unknown_format_behaves_like_default(value in "\\PC{0,20}", name in "[a-z]{12}") {
        let registry = FormatRegistry::builtin();
        prop_assert_eq!(
            registry.mask_by_format(&value, &name),
            registry.mask_by_format(&value, "default")
        );
        prop_assert!(registry.try_mask(&value, &name).is_none());
    }

    #[test]
    fn mobile_numbers_keep_prefix_and_suffix(digits in "[0-9]{10}") {
        let registry = FormatRegistry::builtin();
        let masked = registry.try_mask(&digits, "mobile").unwrap();
        prop_assert_eq!(masked, format!("{}{MASK}{}", &digits[..3], &digits[7..]));
    }

    #[test]
    fn masking_leaves_the_input_tree_alone(
        password in "[a-z0-9]{0,16}",
        phone in "[0-9]{10}",
    ) {
        let original = json!({"user": {"password": password, "phone": phone}});
        let snapshot = original.clone();
        let mut paths = BTreeMap::new();
        paths.insert(FieldPath::parse("user.password").unwrap(), "default".to_string());
        let formats: BTreeSet<String> = ["mobile".to_string()].into();

        let masked = mask_tree(
            &original,
            &paths,
            &formats,
            &FormatRegistry::builtin(),
            DEFAULT_MAX_DEPTH,
        )
        .unwrap();

        prop_assert_eq!(&original, &snapshot);
        prop_assert_ne!(&masked["user"]["phone"], &original["user"]["phone"]);
    }
}
