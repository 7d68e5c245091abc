//! Compile-time validation of `path=format` rule strings.
//!
//! Accepts exactly what `logmask::MaskRule::parse` accepts, so rules from the
//! derive can be emitted pre-split and built without a runtime check.

use syn::{LitStr, Result};

const DEFAULT_FORMAT: &str = "default";

/// A validated rule, split into path segments and format name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RuleDecl {
    pub(crate) segments: Vec<String>,
    pub(crate) format: String,
}

pub(crate) fn parse_rule(lit: &LitStr) -> Result<RuleDecl> {
    let declaration = lit.value();
    let (path, format) = match declaration.split_once('=') {
        Some((path, format)) => {
            if format.is_empty() {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("mask rule `{declaration}` has an empty format after `=`"),
                ));
            }
            (path, format)
        }
        None => (declaration.as_str(), DEFAULT_FORMAT),
    };

    if path.is_empty() {
        return Err(syn::Error::new(
            lit.span(),
            "mask rule has an empty field path",
        ));
    }
    let segments: Vec<String> = path.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(syn::Error::new(
            lit.span(),
            format!("mask rule `{declaration}` has an empty path segment"),
        ));
    }

    Ok(RuleDecl {
        segments,
        format: format.to_string(),
    })
}
