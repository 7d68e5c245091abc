//! Derive macro for `logmask`.
//!
//! `#[derive(LogTarget)]` turns container-level logging attributes into a
//! `logmask::LogTarget` implementation, so markers are declared next to the
//! type and registered without any runtime discovery. It:
//! - reads `#[enable_log(...)]`, `#[disable_log]` and `#[log_operation(...)]`
//! - validates `path=format` rules at compile time
//! - emits the markers as plain constructor calls
//!
//! It does **not** intercept calls or mask anything. That lives in `logmask`.

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

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput, LitStr, Result};

mod container;
mod rules;
use container::{parse_container_options, ContainerOptions, EnableDecl, ScopeDecl};
use rules::RuleDecl;

/// Derives `logmask::LogTarget` for structs, enums and unions.
///
/// The owner path is `module_path!()` followed by the type name.
///
/// # Container Attributes
///
/// - `#[enable_log]`: opts the type in to logging when the interceptor runs in
///   `disable-by-default` mode.
/// - `#[enable_log(request("a.b=format", ...), response(...), formats("email", ...))]`:
///   same, with masks. `request` rules apply to every argument and `response`
///   rules to the result. A rule without `=format` uses `default`. `formats`
///   are detected in both.
/// - `#[disable_log]`: opts the type out when the interceptor runs in
///   `enable-by-default` mode.
/// - `#[log_operation(name = "op", enable_log(...))]`,
///   `#[log_operation(name = "op", disable_log)]`: the same markers for a single
///   operation of the type. Repeat the attribute once per operation.
///
/// Malformed rules (empty path, empty segment, empty format after `=`) are
/// compile errors.
#[proc_macro_derive(LogTarget, attributes(enable_log, disable_log, log_operation))]
pub fn derive_log_target(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the logmask crate root.
///
/// Handles crate renaming (e.g., `my_log = { package = "logmask", ... }`).
/// Inside logmask itself, `::logmask` resolves through its
/// `extern crate self as logmask`.
fn crate_root() -> TokenStream {
    match crate_name("logmask") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::logmask },
    }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        attrs,
        ..
    } = input;

    let ContainerOptions { scope, operations } = parse_container_options(&attrs)?;

    let root = crate_root();
    let type_name = LitStr::new(&ident.to_string(), ident.span());
    let class_scope = scope_tokens(&root, &scope);
    let operation_names = operations
        .iter()
        .map(|operation| LitStr::new(&operation.name, ident.span()));
    let operation_scopes = operations
        .iter()
        .map(|operation| scope_tokens(&root, &operation.scope));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #root::LogTarget for #ident #ty_generics #where_clause {
            fn owner() -> &'static str {
                ::core::concat!(::core::module_path!(), "::", #type_name)
            }

            fn markers() -> #root::TargetMarkers {
                #root::TargetMarkers::new()
                    .with_scope(#class_scope)
                    #(.with_operation(#operation_names, #operation_scopes))*
            }
        }
    })
}

fn scope_tokens(root: &TokenStream, scope: &ScopeDecl) -> TokenStream {
    let enable = match &scope.enable {
        Some(enable) => {
            let enable = enable_tokens(root, enable);
            quote! { ::core::option::Option::Some(#enable) }
        }
        None => quote! { ::core::option::Option::None },
    };
    let disable = scope.disable;
    quote! {
        #root::ScopeMarkers {
            enable: #enable,
            disable: #disable,
        }
    }
}

fn enable_tokens(root: &TokenStream, enable: &EnableDecl) -> TokenStream {
    let request = enable.request.iter().map(|rule| rule_tokens(root, rule));
    let response = enable.response.iter().map(|rule| rule_tokens(root, rule));
    let formats = &enable.formats;
    quote! {
        #root::EnableLog {
            request: ::std::vec![#(#request),*],
            response: ::std::vec![#(#response),*],
            formats: ::std::vec![#(::std::string::String::from(#formats)),*],
        }
    }
}

fn rule_tokens(root: &TokenStream, rule: &RuleDecl) -> TokenStream {
    let segments = &rule.segments;
    let format = &rule.format;
    quote! {
        #root::MaskRule::from_parts(&[#(#segments),*], #format)
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::expand;

    fn expand_str(tokens: proc_macro2::TokenStream) -> String {
        let input: DeriveInput = syn::parse2(tokens).expect("should parse as DeriveInput");
        expand(input).expect("should expand").to_string()
    }

    #[test]
    fn owner_uses_module_path_and_type_name() {
        let out = expand_str(quote! { struct AccountService; });
        assert!(out.contains("module_path"));
        assert!(out.contains("\"AccountService\""));
    }

    #[test]
    fn rules_are_emitted_pre_split() {
        let out = expand_str(quote! {
            #[enable_log(request("user.password"))]
            struct AccountService;
        });
        assert!(out.contains("from_parts"));
        assert!(out.contains("\"user\" , \"password\""));
        assert!(out.contains("\"default\""));
    }

    #[test]
    fn operations_are_chained() {
        let out = expand_str(quote! {
            #[log_operation(name = "health", disable_log)]
            struct AccountService;
        });
        assert!(out.contains("with_operation"));
        assert!(out.contains("\"health\""));
    }

    #[test]
    fn owner_and_operation_scopes_are_both_emitted() {
        let out = expand_str(quote! {
            #[enable_log(formats("email"))]
            #[log_operation(name = "handle_request", enable_log(request("token")))]
            #[log_operation(name = "health", disable_log)]
            struct AccountService;
        });
        assert!(out.contains("with_scope"));
        assert_eq!(out.matches("with_operation").count(), 2);
        assert!(out.contains("\"token\""));
        assert!(out.contains("\"email\""));
    }

    #[test]
    fn generics_are_carried_over() {
        let out = expand_str(quote! { struct Repo<T: Clone> { items: Vec<T> } });
        assert!(out.contains("impl < T : Clone >"));
        assert!(out.contains("for Repo < T >"));
    }
}
