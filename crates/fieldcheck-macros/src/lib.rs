//! Procedural macros for fieldcheck
//!
//! - `#[derive(Record)]` - member table for the flattening walk
//!
//! ## Attributes
//!
//! ```rust,ignore
//! #[derive(Deserialize, Record)]
//! struct Signup {
//!     #[field(json = "email", form = "user_email")]
//!     email: String,
//!     #[serde(rename = "years")]   // used as the `json` annotation
//!     age: Int,
//!     #[field(skip)]               // not visible to validation
//!     cache: Vec<u8>,
//! }
//! ```
//!
//! Every `identifier = "annotation"` pair inside `#[field(...)]` is kept; the
//! validator picks the one matching its configured tag identifier. Without
//! an explicit `json` pair, `#[serde(rename = "...")]` supplies it and
//! `#[serde(skip)]` maps to the suppression marker `-`.
//!
//! Generated code refers to `::fieldcheck`. Use `#[field(crate = "path")]`
//! on the struct when depending on the engine crate directly.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Path};

/// Derive `Record` and `Flatten` for a struct with named fields.
///
/// # Example
///
/// ```rust,ignore
/// use fieldcheck::prelude::*;
///
/// #[derive(Record)]
/// struct Address {
///     #[field(json = "zip")]
///     zip: String,
///     city: String, // flattened as "Address.city" when nested
/// }
/// ```
#[proc_macro_derive(Record, attributes(field))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct MemberSpec {
    ident: syn::Ident,
    name: String,
    tags: Vec<(String, String)>,
}

fn expand_record(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Record)] does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "#[derive(Record)] requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "#[derive(Record)] can only be used on structs",
            ))
        }
    };

    let krate = crate_path(&input.attrs)?;

    let mut members = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        if let Some(member) = member_spec(ident, &field.attrs)? {
            members.push(member);
        }
    }

    let type_name = name.unraw().to_string();
    let entries = members.iter().map(|m| {
        let ident = &m.ident;
        let member_name = &m.name;
        let tags = m.tags.iter().map(|(id, value)| quote!((#id, #value)));
        quote! {
            #krate::Member::new(#member_name, &[#(#tags),*], &self.#ident)
        }
    });

    Ok(quote! {
        impl #krate::Record for #name {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn members(&self) -> ::std::vec::Vec<#krate::Member<'_>> {
                ::std::vec![#(#entries),*]
            }
        }

        impl #krate::Flatten for #name {
            fn kind(&self) -> #krate::Kind<'_> {
                #krate::Kind::Record(self)
            }

            fn is_composite() -> bool {
                true
            }
        }
    })
}

/// `#[field(crate = "...")]` on the struct, `::fieldcheck` otherwise.
fn crate_path(attrs: &[Attribute]) -> syn::Result<Path> {
    let mut path: Path = syn::parse_quote!(::fieldcheck);
    for attr in attrs.iter().filter(|a| a.path().is_ident("field")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                path = lit.parse()?;
                Ok(())
            } else {
                Err(meta.error("unsupported struct attribute, expected `crate`"))
            }
        })?;
    }
    Ok(path)
}

/// Collect the annotations of one field; `None` when the field is skipped.
fn member_spec(ident: syn::Ident, attrs: &[Attribute]) -> syn::Result<Option<MemberSpec>> {
    let mut tags: Vec<(String, String)> = Vec::new();
    let mut skip = false;

    for attr in attrs.iter().filter(|a| a.path().is_ident("field")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                return Ok(());
            }
            let Some(id) = meta.path.get_ident() else {
                return Err(meta.error("expected `identifier = \"annotation\"` or `skip`"));
            };
            let lit: LitStr = meta.value()?.parse()?;
            let id = id.unraw().to_string();
            if tags.iter().any(|(existing, _)| *existing == id) {
                return Err(meta.error(format!("duplicate `{}` annotation", id)));
            }
            tags.push((id, lit.value()));
            Ok(())
        })?;
    }

    if skip {
        return Ok(None);
    }

    if !tags.iter().any(|(id, _)| id == "json") {
        if let Some(json) = serde_annotation(attrs) {
            tags.push(("json".to_string(), json));
        }
    }

    Ok(Some(MemberSpec {
        name: ident.unraw().to_string(),
        ident,
        tags,
    }))
}

/// `rename = "..."` or `skip` from `#[serde(...)]`. Other serde options are
/// ignored here; serde validates its own attributes.
fn serde_annotation(attrs: &[Attribute]) -> Option<String> {
    let mut found = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                found = Some("-".to_string());
            } else if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                let lit: LitStr = meta.value()?.parse()?;
                if found.is_none() {
                    found = Some(lit.value());
                }
            } else if meta.input.peek(syn::Token![=]) {
                meta.value()?.parse::<syn::Expr>()?;
            } else if meta.input.peek(syn::token::Paren) {
                meta.parse_nested_meta(|inner| {
                    if inner.input.peek(syn::Token![=]) {
                        inner.value()?.parse::<syn::Expr>()?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        });
    }
    found
}
