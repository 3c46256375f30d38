//! Proc macros for Lorekeeper creature records.
//!
//! Provides `#[stat_properties]`, which turns an inherent impl block into a
//! static property registry: every zero-argument, integer-returning accessor
//! in the block becomes a name that ability text may substitute.
//!
//! # Example
//!
//! ```ignore
//! #[stat_properties]
//! impl Dnd5eGuard {
//!     /// Strength modifier.
//!     pub fn str(&self) -> i64 {
//!         ability_modifier(self.record.int("strength"))
//!     }
//!
//!     /// Not an integer, so never registered.
//!     pub fn cr(&self) -> f64 {
//!         parse_challenge(self.record.text("challenge"))
//!     }
//!
//!     #[property(skip)]
//!     pub fn hit_die_count(&self) -> i64 {
//!         1
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, FnArg, ImplItem, ImplItemFn, ItemImpl, Lit, Meta, ReturnType,
    Type,
};

/// Attribute macro generating a `PropertyTable` implementation.
///
/// # Attributes
///
/// - `#[property(skip)]` on a method - Never register it
/// - `#[property(rename = "...")]` on a method - Register it under another name
#[proc_macro_attribute]
pub fn stat_properties(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = TokenStream2::from(attr);
    let input = parse_macro_input!(item as ItemImpl);
    expand_stat_properties(attr, input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand_stat_properties(attr: TokenStream2, mut input: ItemImpl) -> syn::Result<TokenStream2> {
    if !attr.is_empty() {
        return Err(syn::Error::new_spanned(attr, "stat_properties takes no arguments"));
    }
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "stat_properties only supports inherent impl blocks",
        ));
    }

    let mut names = Vec::new();
    let mut idents = Vec::new();

    for item in input.items.iter_mut() {
        let ImplItem::Fn(method) = item else {
            continue;
        };

        let options = take_property_options(&mut method.attrs)?;
        if options.skip || !is_property_accessor(method) {
            continue;
        }

        let name = options
            .rename
            .unwrap_or_else(|| method.sig.ident.to_string());
        if names.contains(&name) {
            return Err(syn::Error::new_spanned(
                &method.sig.ident,
                format!("duplicate property name `{name}`"),
            ));
        }
        names.push(name);
        idents.push(method.sig.ident.clone());
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::lorekeeper_core::properties::PropertyTable for #self_ty #where_clause {
            const PROPERTY_NAMES: &'static [&'static str] = &[#(#names),*];

            #[allow(clippy::unnecessary_cast)]
            fn property(&self, name: &str) -> ::core::option::Option<i64> {
                match name {
                    #(#names => ::core::option::Option::Some(self.#idents() as i64),)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

#[derive(Default)]
struct PropertyOptions {
    skip: bool,
    rename: Option<String>,
}

/// Parse and strip `#[property(...)]` attributes from a method.
///
/// The attribute is not a registered helper of any derive, so it must not
/// survive into the emitted impl block.
fn take_property_options(attrs: &mut Vec<Attribute>) -> syn::Result<PropertyOptions> {
    let mut options = PropertyOptions::default();
    let mut kept = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if !attr.path().is_ident("property") {
            kept.push(attr);
            continue;
        }
        match attr.parse_args::<Meta>()? {
            Meta::Path(path) if path.is_ident("skip") => options.skip = true,
            Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                if let syn::Expr::Lit(expr_lit) = &nv.value {
                    if let Lit::Str(s) = &expr_lit.lit {
                        options.rename = Some(s.value());
                        continue;
                    }
                }
                return Err(syn::Error::new_spanned(nv, "rename expects a string literal"));
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "expected `skip` or `rename = \"...\"`",
                ))
            }
        }
    }

    *attrs = kept;
    Ok(options)
}

/// A property accessor takes `&self` only and returns a primitive integer.
fn is_property_accessor(method: &ImplItemFn) -> bool {
    let sig = &method.sig;
    if sig.asyncness.is_some() || !sig.generics.params.is_empty() || sig.inputs.len() != 1 {
        return false;
    }
    let Some(FnArg::Receiver(receiver)) = sig.inputs.first() else {
        return false;
    };
    if receiver.reference.is_none() || receiver.mutability.is_some() {
        return false;
    }
    match &sig.output {
        ReturnType::Type(_, ty) => is_integer_type(ty),
        ReturnType::Default => false,
    }
}

fn is_integer_type(ty: &Type) -> bool {
    match ty {
        Type::Paren(inner) => is_integer_type(&inner.elem),
        Type::Group(inner) => is_integer_type(&inner.elem),
        Type::Path(type_path) if type_path.qself.is_none() => {
            let Some(segment) = type_path.path.segments.last() else {
                return false;
            };
            segment.arguments.is_none()
                && matches!(
                    segment.ident.to_string().as_str(),
                    "i8" | "i16"
                        | "i32"
                        | "i64"
                        | "i128"
                        | "isize"
                        | "u8"
                        | "u16"
                        | "u32"
                        | "u64"
                        | "u128"
                        | "usize"
                )
        }
        _ => false,
    }
}
