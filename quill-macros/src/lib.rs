mod db_enum;
mod decode_entity;
mod decode_expression;

use db_enum::db_enum;
use decode_entity::{MemberKind, decode_entity};
use decode_expression::decode_lambda;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemEnum, ItemStruct, parse_macro_input};

#[proc_macro_derive(Entity, attributes(quill))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    let metadata = decode_entity(&item);
    let table = &metadata.table;
    let schema = &metadata.schema;
    let prefix = &metadata.prefix;
    let stored = metadata
        .members
        .iter()
        .filter(|v| !matches!(v.kind, MemberKind::Ignored))
        .collect::<Vec<_>>();
    let members = stored.iter().map(|member| {
        let member_name = &member.name;
        let ty = &member.ty;
        match &member.kind {
            MemberKind::Navigation {
                target,
                foreign_key,
                ..
            } => quote! {
                ::quill::MemberMapper::navigation(
                    #member_name,
                    <#target as ::quill::Entity>::mapper,
                    #foreign_key,
                )
            },
            _ => {
                let mut result = quote!(::quill::MemberMapper::column::<#ty>(#member_name));
                if let Some(field_name) = &member.field_name {
                    result = quote!(#result.field_name(#field_name));
                }
                if member.primary_key {
                    result = quote!(#result.primary_key());
                }
                if member.auto_increment {
                    result = quote!(#result.auto_increment());
                }
                if let Some(handler) = &member.handler {
                    result = quote!(#result.handler(&#handler));
                }
                result
            }
        }
    });
    let mut position = 0usize;
    let assemble = metadata.members.iter().map(|member| {
        let ident = &member.ident;
        let ty = &member.ty;
        let value = match &member.kind {
            MemberKind::Ignored => return quote!(#ident: ::std::default::Default::default()),
            MemberKind::Column => quote!(parts.take::<#ty>(#position)?),
            MemberKind::Navigation {
                target,
                optional: true,
                ..
            } => quote!(parts.take_nested_optional::<#target>(#position)?),
            MemberKind::Navigation { target, .. } => {
                quote!(parts.take_nested::<#target>(#position)?)
            }
        };
        position += 1;
        quote!(#ident: #value)
    });
    let assemble = assemble.collect::<Vec<_>>();
    let values = stored.iter().map(|member| {
        let ident = &member.ident;
        match member.kind {
            MemberKind::Column => quote! {
                ::quill::AsValue::as_value(::std::clone::Clone::clone(&self.#ident))
            },
            _ => quote!(::quill::Value::Null),
        }
    });
    quote! {
        impl ::quill::Entity for #name {
            fn mapper() -> &'static ::quill::EntityMapper {
                static MAPPER: ::std::sync::LazyLock<::quill::EntityMapper> =
                    ::std::sync::LazyLock::new(|| {
                        ::quill::EntityMapper::new::<#name>(
                            #table,
                            #schema,
                            #prefix,
                            vec![#(#members),*],
                        )
                    });
                &MAPPER
            }

            fn assemble(parts: &mut ::quill::EntityParts) -> ::quill::Result<Self> {
                Ok(Self {
                    #(#assemble),*
                })
            }

            fn values(&self) -> Vec<::quill::Value> {
                vec![#(#values),*]
            }
        }

        impl ::quill::FromRow for #name {
            fn shape() -> ::quill::Shape {
                ::quill::Shape::Entity(<#name as ::quill::Entity>::mapper)
            }

            fn from_built(built: ::quill::Built) -> ::quill::Result<Self> {
                built.into_required_entity::<#name>()
            }
        }
    }
    .into()
}

#[proc_macro_derive(DbEnum)]
pub fn derive_db_enum(input: TokenStream) -> TokenStream {
    let item: ItemEnum = parse_macro_input!(input as ItemEnum);
    db_enum(&item).into()
}

/// Closure syntax to a `Lambda`, the expression tree the query builder compiles.
///
/// ```ignore
/// expr!(|o: Order| o.customer_id == customer && o.total > dec!(100))
/// ```
#[proc_macro]
pub fn expr(input: TokenStream) -> TokenStream {
    let input: syn::Expr = parse_macro_input!(input as syn::Expr);
    decode_lambda(&input).into()
}
