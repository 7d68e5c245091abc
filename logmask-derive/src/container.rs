//! Container-level attribute parsing for `#[derive(LogTarget)]`.
//!
//! Recognized attributes:
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `#[enable_log]` | Opt the type in with no masks |
//! | `#[enable_log(request(..), response(..), formats(..))]` | Opt in with masks |
//! | `#[disable_log]` | Opt the type out |
//! | `#[log_operation(name = "op", enable_log(..))]` | Same, for one operation |
//! | `#[log_operation(name = "op", disable_log)]` | Opt one operation out |

use std::collections::HashSet;

use syn::{
    meta::ParseNestedMeta, punctuated::Punctuated, spanned::Spanned, Attribute, LitStr, Meta,
    Result, Token,
};

use crate::rules::{parse_rule, RuleDecl};

/// Parsed `enable_log` marker.
#[derive(Clone, Debug, Default)]
pub(crate) struct EnableDecl {
    pub(crate) request: Vec<RuleDecl>,
    pub(crate) response: Vec<RuleDecl>,
    pub(crate) formats: Vec<String>,
}

/// Markers of one scope: the type itself or one operation.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScopeDecl {
    pub(crate) enable: Option<EnableDecl>,
    pub(crate) disable: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct OperationDecl {
    pub(crate) name: String,
    pub(crate) scope: ScopeDecl,
}

/// Options parsed from container-level attributes.
#[derive(Clone, Debug, Default)]
pub(crate) struct ContainerOptions {
    pub(crate) scope: ScopeDecl,
    pub(crate) operations: Vec<OperationDecl>,
}

/// Parses container-level logging attributes.
pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();
    let mut seen_operations = HashSet::new();

    for attr in attrs {
        if attr.path().is_ident("enable_log") {
            let enable = match &attr.meta {
                Meta::Path(_) => EnableDecl::default(),
                Meta::List(_) => {
                    let mut enable = EnableDecl::default();
                    attr.parse_nested_meta(|meta| parse_enable_item(&meta, &mut enable))?;
                    enable
                }
                Meta::NameValue(nv) => {
                    return Err(syn::Error::new_spanned(
                        nv,
                        "name-value syntax is not supported for #[enable_log]",
                    ));
                }
            };
            set_enable(&mut options.scope, enable, attr.span())?;
        } else if attr.path().is_ident("disable_log") {
            if !matches!(attr.meta, Meta::Path(_)) {
                return Err(syn::Error::new(
                    attr.span(),
                    "#[disable_log] takes no arguments",
                ));
            }
            options.scope.disable = true;
        } else if attr.path().is_ident("log_operation") {
            let operation = parse_operation(attr)?;
            if !seen_operations.insert(operation.name.clone()) {
                return Err(syn::Error::new(
                    attr.span(),
                    format!("operation `{}` is declared more than once", operation.name),
                ));
            }
            options.operations.push(operation);
        }
    }

    Ok(options)
}

fn set_enable(scope: &mut ScopeDecl, enable: EnableDecl, span: proc_macro2::Span) -> Result<()> {
    if scope.enable.is_some() {
        return Err(syn::Error::new(
            span,
            "multiple enable_log markers specified on the same scope",
        ));
    }
    scope.enable = Some(enable);
    Ok(())
}

fn parse_enable_item(meta: &ParseNestedMeta<'_>, enable: &mut EnableDecl) -> Result<()> {
    if meta.path.is_ident("request") {
        for lit in parse_str_list(meta)? {
            enable.request.push(parse_rule(&lit)?);
        }
        Ok(())
    } else if meta.path.is_ident("response") {
        for lit in parse_str_list(meta)? {
            enable.response.push(parse_rule(&lit)?);
        }
        Ok(())
    } else if meta.path.is_ident("formats") {
        for lit in parse_str_list(meta)? {
            let name = lit.value();
            if name.is_empty() {
                return Err(syn::Error::new(lit.span(), "format name must not be empty"));
            }
            enable.formats.push(name);
        }
        Ok(())
    } else {
        Err(meta.error(format!(
            "unknown enable_log option `{}`; expected `request`, `response` or `formats`",
            path_name(&meta.path)
        )))
    }
}

fn parse_str_list(meta: &ParseNestedMeta<'_>) -> Result<Vec<LitStr>> {
    let content;
    syn::parenthesized!(content in meta.input);
    let items = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
    Ok(items.into_iter().collect())
}

fn parse_operation(attr: &Attribute) -> Result<OperationDecl> {
    let mut name: Option<String> = None;
    let mut scope = ScopeDecl::default();

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let lit: LitStr = meta.value()?.parse()?;
            if lit.value().is_empty() {
                return Err(syn::Error::new(lit.span(), "operation name must not be empty"));
            }
            name = Some(lit.value());
            Ok(())
        } else if meta.path.is_ident("enable_log") {
            let mut enable = EnableDecl::default();
            if meta.input.peek(syn::token::Paren) {
                meta.parse_nested_meta(|inner| parse_enable_item(&inner, &mut enable))?;
            }
            set_enable(&mut scope, enable, meta.path.span())
        } else if meta.path.is_ident("disable_log") {
            scope.disable = true;
            Ok(())
        } else {
            Err(meta.error(format!(
                "unknown log_operation option `{}`; expected `name`, `enable_log` or `disable_log`",
                path_name(&meta.path)
            )))
        }
    })?;

    let name = name.ok_or_else(|| {
        syn::Error::new(attr.span(), "#[log_operation] requires `name = \"...\"`")
    })?;
    Ok(OperationDecl { name, scope })
}

fn path_name(path: &syn::Path) -> String {
    path.get_ident()
        .map_or_else(|| "?".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .expect("should parse as DeriveInput");
        input.attrs
    }

    #[test]
    fn no_attribute_returns_defaults() {
        let attrs = parse_attrs(quote! {});
        let options = parse_container_options(&attrs).unwrap();
        assert!(options.scope.enable.is_none());
        assert!(!options.scope.disable);
        assert!(options.operations.is_empty());
    }

    #[test]
    fn bare_enable_log_enables_without_masks() {
        let attrs = parse_attrs(quote! { #[enable_log] });
        let options = parse_container_options(&attrs).unwrap();
        let enable = options.scope.enable.unwrap();
        assert!(enable.request.is_empty());
        assert!(enable.formats.is_empty());
    }

    #[test]
    fn enable_log_lists_are_parsed() {
        let attrs = parse_attrs(quote! {
            #[enable_log(
                request("user.password=default", "pin"),
                response("account.cardNumber=creditCard"),
                formats("email", "mobile")
            )]
        });
        let options = parse_container_options(&attrs).unwrap();
        let enable = options.scope.enable.unwrap();
        assert_eq!(enable.request.len(), 2);
        assert_eq!(enable.request[1].format, "default");
        assert_eq!(enable.response[0].segments, ["account", "cardNumber"]);
        assert_eq!(enable.formats, ["email", "mobile"]);
    }

    #[test]
    fn disable_log_is_parsed() {
        let attrs = parse_attrs(quote! { #[disable_log] });
        let options = parse_container_options(&attrs).unwrap();
        assert!(options.scope.disable);
    }

    #[test]
    fn disable_log_with_arguments_errors() {
        let attrs = parse_attrs(quote! { #[disable_log(all)] });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("takes no arguments"));
    }

    #[test]
    fn operations_are_parsed() {
        let attrs = parse_attrs(quote! {
            #[log_operation(name = "handle_request", enable_log(formats("email")))]
            #[log_operation(name = "health", disable_log)]
            #[log_operation(name = "ping", enable_log)]
        });
        let options = parse_container_options(&attrs).unwrap();
        assert_eq!(options.operations.len(), 3);
        assert_eq!(options.operations[0].name, "handle_request");
        assert_eq!(
            options.operations[0].scope.enable.as_ref().unwrap().formats,
            ["email"]
        );
        assert!(options.operations[1].scope.disable);
        assert!(options.operations[2].scope.enable.is_some());
    }

    #[test]
    fn operation_without_name_errors() {
        let attrs = parse_attrs(quote! { #[log_operation(disable_log)] });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("requires `name"));
    }

    #[test]
    fn duplicate_operation_errors() {
        let attrs = parse_attrs(quote! {
            #[log_operation(name = "run", disable_log)]
            #[log_operation(name = "run", enable_log)]
        });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("declared more than once"));
    }

    #[test]
    fn multiple_enable_log_errors() {
        let attrs = parse_attrs(quote! {
            #[enable_log]
            #[enable_log(formats("email"))]
        });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("multiple enable_log markers"));
    }

    #[test]
    fn unknown_enable_option_errors() {
        let attrs = parse_attrs(quote! { #[enable_log(headers("x"))] });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("unknown enable_log option"));
    }

    #[test]
    fn invalid_rule_errors() {
        let attrs = parse_attrs(quote! { #[enable_log(request("user..password"))] });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("empty path segment"));
    }

    #[test]
    fn other_attributes_ignored() {
        let attrs = parse_attrs(quote! {
            #[derive(Clone)]
            #[serde(rename_all = "camelCase")]
        });
        let options = parse_container_options(&attrs).unwrap();
        assert!(options.scope.enable.is_none());
    }
}
