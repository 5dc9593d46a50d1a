use convert_case::{Case, Casing};
use quote::ToTokens;
use syn::{
    Expr, Field, GenericArgument, Ident, ItemStruct, LitStr, PathArguments, Type, TypePath,
    parse::ParseBuffer,
};

pub(crate) enum MemberKind {
    Column,
    /// Navigation holding the target type and whether it is wrapped in `Option`.
    Navigation {
        target: Type,
        optional: bool,
        foreign_key: String,
    },
    Ignored,
}

pub(crate) struct MemberMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    pub(crate) field_name: Option<String>,
    pub(crate) primary_key: bool,
    pub(crate) auto_increment: bool,
    pub(crate) handler: Option<Expr>,
    pub(crate) kind: MemberKind,
}

pub(crate) struct EntityMetadata {
    pub(crate) table: String,
    pub(crate) schema: String,
    pub(crate) prefix: String,
    pub(crate) members: Vec<MemberMetadata>,
}

fn string_value(arg: &syn::meta::ParseNestedMeta, usage: &str) -> String {
    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
        panic!("Error while parsing `{}`, use it like: `{}`", arg.path.to_token_stream(), usage);
    };
    value.value()
}

fn flag(arg: &syn::meta::ParseNestedMeta, usage: &str) {
    // value() is Err for Meta::Path
    let Err(..) = arg.value() else {
        panic!("Error while parsing `{}`, use it like: `{}`", arg.path.to_token_stream(), usage);
    };
}

/// `T` out of `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(TypePath { path, qself: None }) = ty else {
        return None;
    };
    let last = path.segments.last()?;
    if last.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}

pub fn decode_member(field: &Field) -> MemberMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Entity fields are expected to have a name");
    let mut name = ident.to_string();
    if name.starts_with("r#") {
        name.drain(..2);
    }
    let mut metadata = MemberMetadata {
        ident,
        ty: field.ty.clone(),
        name,
        field_name: None,
        primary_key: false,
        auto_increment: false,
        handler: None,
        kind: MemberKind::Column,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("quill") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `quill`, use it like: `#[quill(attribute = value, ...)]`");
        };
        let _ = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                metadata.field_name = Some(string_value(&arg, "#[quill(name = \"column_name\")]"));
            } else if arg.path.is_ident("primary_key") {
                flag(&arg, "#[quill(primary_key)]");
                metadata.primary_key = true;
            } else if arg.path.is_ident("auto_increment") {
                flag(&arg, "#[quill(auto_increment)]");
                metadata.auto_increment = true;
            } else if arg.path.is_ident("ignore") {
                flag(&arg, "#[quill(ignore)]");
                metadata.kind = MemberKind::Ignored;
            } else if arg.path.is_ident("include") {
                let foreign_key = string_value(&arg, "#[quill(include = \"customer_id\")]");
                let (target, optional) = match option_inner(&field.ty) {
                    Some(inner) => (inner.clone(), true),
                    None => (field.ty.clone(), false),
                };
                metadata.kind = MemberKind::Navigation {
                    target,
                    optional,
                    foreign_key,
                };
            } else if arg.path.is_ident("handler") {
                let Ok(value) = arg.value().and_then(ParseBuffer::parse::<Expr>) else {
                    panic!("Error while parsing `handler`, use it like: `#[quill(handler = MY_HANDLER)]`");
                };
                metadata.handler = Some(value);
            } else {
                panic!(
                    "Unknown attribute `{}` inside quill macro",
                    arg.path.to_token_stream()
                );
            }
            Ok(())
        });
    }
    if !matches!(metadata.kind, MemberKind::Column)
        && (metadata.primary_key || metadata.auto_increment || metadata.handler.is_some())
    {
        panic!(
            "Field `{}` is not a column, it cannot be a primary key, auto increment or have a handler",
            metadata.name
        );
    }
    metadata
}

pub fn decode_entity(item: &ItemStruct) -> EntityMetadata {
    if !item.generics.params.is_empty() {
        panic!("Entity `{}` cannot be generic", item.ident);
    }
    let mut table = item.ident.to_string().to_case(Case::Snake);
    if table.starts_with('_') {
        table.remove(0);
    }
    let mut schema = String::new();
    let mut prefix = String::new();
    for attr in &item.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("quill") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `quill`, use it like: `#[quill(attribute = value, ..)]`");
        };
        let _ = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("table") {
                table = string_value(&arg, "#[quill(table = \"my_table\")]");
            } else if arg.path.is_ident("schema") {
                schema = string_value(&arg, "#[quill(schema = \"my_schema\")]");
            } else if arg.path.is_ident("prefix") {
                prefix = string_value(&arg, "#[quill(prefix = \"ord_\")]");
            } else {
                panic!(
                    "Unknown attribute `{}` inside quill macro",
                    arg.path.to_token_stream()
                );
            }
            Ok(())
        });
    }
    let members = item.fields.iter().map(decode_member).collect();
    EntityMetadata {
        table,
        schema,
        prefix,
        members,
    }
}
