use proc_macro2::TokenStream;
use quote::quote;
use syn::{Fields, ItemEnum};

/// Enumeration stored as its integral code, the discriminant of each variant.
pub fn db_enum(item: &ItemEnum) -> TokenStream {
    let name = &item.ident;
    if !item.generics.params.is_empty() {
        panic!("DbEnum `{}` cannot be generic", name);
    }
    let variants = item
        .variants
        .iter()
        .map(|v| {
            if !matches!(v.fields, Fields::Unit) {
                panic!(
                    "DbEnum `{}` can only have unit variants, `{}` has fields",
                    name, v.ident
                );
            }
            &v.ident
        })
        .collect::<Vec<_>>();
    let labels = variants.iter().map(|v| v.to_string()).collect::<Vec<_>>();
    quote! {
        impl ::quill::DbEnum for #name {
            fn code(&self) -> i64 {
                match self {
                    #(Self::#variants => Self::#variants as i64,)*
                }
            }

            fn variant_name(&self) -> &'static str {
                match self {
                    #(Self::#variants => #labels,)*
                }
            }

            fn from_code(code: i64) -> Option<Self> {
                #(
                    if code == Self::#variants as i64 {
                        return Some(Self::#variants);
                    }
                )*
                None
            }

            fn from_name(name: &str) -> Option<Self> {
                #(
                    if name.eq_ignore_ascii_case(#labels) {
                        return Some(Self::#variants);
                    }
                )*
                None
            }
        }

        impl ::quill::AsValue for #name {
            fn as_empty_value() -> ::quill::Value {
                ::quill::Value::Int64(None)
            }

            fn as_value(self) -> ::quill::Value {
                ::quill::Value::Int64(Some(::quill::DbEnum::code(&self)))
            }

            fn try_from_value(value: ::quill::Value) -> ::quill::Result<Self> {
                ::quill::enum_from_value::<Self>(value)
            }

            fn is_enum() -> bool {
                true
            }
        }
    }
}
