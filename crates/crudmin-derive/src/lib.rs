//! Derive macro for crudmin records.
//!
//! This crate provides the `#[derive(Record)]` macro, which describes a
//! struct's fields to the admin in declaration order so that it can be
//! rendered as an editable field tree without runtime reflection.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Type};

/// Derives `crudmin::Record` and `crudmin::ToField` for a struct.
///
/// Every field type must implement `crudmin::ToField` unless the field is
/// marked `display` or `skip`. Deriving `Record` on a struct makes it usable
/// as a nested field of another record, on its own or inside `Vec`/`Option`.
///
/// # Field Attributes
///
/// - `#[record(display)]` - Renders the field through its `Display` impl
///   instead of its `ToField` value. Such fields report the `struct` kind.
/// - `#[record(skip)]` - Hides the field from the admin entirely
/// - `#[record(rename = "Name")]` - Reports the field under another name
///   (defaults to the Rust field name)
///
/// # Example
///
/// ```ignore
/// use crudmin::Record;
///
/// #[derive(Record)]
/// struct Widget {
///     #[record(rename = "ID")]
///     id: u64,
///     name: String,
///     parts: Vec<Part>,
///     #[record(skip)]
///     cache: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Record derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Record derive only supports structs",
            ));
        }
    };

    let mut field_infos: Vec<FieldInfo> = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let attrs = parse_record_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        field_infos.push(FieldInfo {
            display_name: attrs.rename.unwrap_or_else(|| ident.to_string()),
            ident,
            ty: field.ty.clone(),
            display: attrs.display,
        });
    }

    let entries: Vec<TokenStream2> = field_infos
        .iter()
        .map(|info| {
            let ident = &info.ident;
            let name = &info.display_name;
            let ty = &info.ty;
            if info.display {
                quote! {
                    ::crudmin::Field::new(
                        #name,
                        ::crudmin::FieldKind::Struct,
                        ::crudmin::FieldValue::Display(
                            ::std::string::ToString::to_string(&self.#ident),
                        ),
                    )
                }
            } else {
                quote! {
                    ::crudmin::Field::new(
                        #name,
                        <#ty as ::crudmin::ToField>::KIND,
                        ::crudmin::ToField::to_field_value(&self.#ident),
                    )
                }
            }
        })
        .collect();

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::crudmin::Record for #struct_name #ty_generics #where_clause {
            fn fields(&self) -> ::std::vec::Vec<::crudmin::Field<'_>> {
                ::std::vec![#(#entries),*]
            }
        }

        impl #impl_generics ::crudmin::ToField for #struct_name #ty_generics #where_clause {
            const KIND: ::crudmin::FieldKind = ::crudmin::FieldKind::Struct;

            fn to_field_value(&self) -> ::crudmin::FieldValue<'_> {
                ::crudmin::FieldValue::Record(self)
            }
        }
    };

    Ok(expanded)
}

struct FieldInfo {
    ident: Ident,
    ty: Type,
    display_name: String,
    display: bool,
}

#[derive(Default)]
struct RecordAttrs {
    rename: Option<String>,
    display: bool,
    skip: bool,
}

fn parse_record_attrs(attrs: &[Attribute]) -> syn::Result<RecordAttrs> {
    let mut result = RecordAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("display") {
                result.display = true;
            } else if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("rename") {
                let value: Expr = meta.value()?.parse()?;
                match value {
                    Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) => result.rename = Some(s.value()),
                    other => {
                        return Err(syn::Error::new_spanned(
                            other,
                            "rename expects a string literal",
                        ));
                    }
                }
            } else {
                return Err(meta.error("unknown record attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}
