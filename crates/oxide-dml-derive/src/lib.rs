//! Derive macros for typed DML entities.
//!
//! This crate provides the `#[derive(Entity)]` macro, which turns a struct
//! into a target for the clause builders of `oxide-dml-core`: table metadata
//! plus one typed column handle per field.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Ident, Lit,
    Meta, PathArguments, Type,
};

/// Derives the `Entity` trait, generating typed column handles.
///
/// # Attributes
///
/// - `#[entity(table = "table_name")]` - Specifies the SQL table name
///   (optional, defaults to snake_case of struct name)
/// - `#[entity(schema = "schema_name")]` - Qualifies the table with a schema
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
///
/// An `Option<T>` field yields a nullable `Path<T>`.
///
/// # Generated Items
///
/// For a struct `Survey`, this macro generates:
///
/// - `SurveyEntity` - A type implementing `Entity` with table metadata
/// - Column accessors returning `Path<T>` on both `SurveyEntity` and `Survey`
#[proc_macro_derive(Entity, attributes(entity, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_entity_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let entity_attrs = parse_entity_attrs(&input.attrs)?;
    let table_name = entity_attrs
        .table
        .unwrap_or_else(|| to_snake_case(&struct_name.to_string()));

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity derive only supports structs",
            ));
        }
    };

    let mut column_infos: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let column_name = parse_column_name(&field.attrs)?;
        let (value_type, nullable) = match option_inner(&field.ty) {
            Some(inner) => (inner.clone(), true),
            None => (field.ty.clone(), false),
        };

        column_infos.push(ColumnInfo {
            field_name: field_name.clone(),
            value_type,
            column_name: column_name.unwrap_or_else(|| field_name.to_string()),
            nullable,
        });
    }

    let entity_struct_name = format_ident!("{}Entity", struct_name);

    let column_accessors: Vec<TokenStream2> = column_infos
        .iter()
        .map(|info| {
            let method_name = &info.field_name;
            let value_type = &info.value_type;
            let column_name = &info.column_name;
            let nullable = if info.nullable {
                quote! { .nullable() }
            } else {
                quote! {}
            };
            quote! {
                /// Returns the typed handle of this column.
                #[inline]
                #[must_use]
                pub fn #method_name() -> ::oxide_dml_core::schema::Path<#value_type> {
                    ::oxide_dml_core::schema::Path::new(#column_name)#nullable
                }
            }
        })
        .collect();

    let all_column_names: Vec<&str> = column_infos
        .iter()
        .map(|c| c.column_name.as_str())
        .collect();

    let schema_impl = match &entity_attrs.schema {
        Some(schema) => quote! { Some(#schema) },
        None => quote! { None },
    };

    let expanded = quote! {
        /// Entity metadata for `#struct_name`.
        #[derive(Debug, Clone, Copy)]
        pub struct #entity_struct_name;

        impl ::oxide_dml_core::schema::Entity for #entity_struct_name {
            const TABLE: &'static str = #table_name;
            const SCHEMA: Option<&'static str> = #schema_impl;
            const COLUMNS: &'static [&'static str] = &[#(#all_column_names),*];
        }

        impl #entity_struct_name {
            #(#column_accessors)*
        }

        impl #struct_name {
            #(#column_accessors)*
        }
    };

    Ok(expanded)
}

struct ColumnInfo {
    field_name: Ident,
    value_type: Type,
    column_name: String,
    nullable: bool,
}

#[derive(Default)]
struct EntityAttrs {
    table: Option<String>,
    schema: Option<String>,
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Option<String>> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = value {
        if let Lit::Str(s) = lit.lit {
            return Ok(Some(s.value()));
        }
    }
    Err(meta.error("expected a string literal"))
}

fn parse_entity_attrs(attrs: &[Attribute]) -> syn::Result<EntityAttrs> {
    let mut result = EntityAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    result.table = string_value(&meta)?;
                } else if meta.path.is_ident("schema") {
                    result.schema = string_value(&meta)?;
                } else {
                    return Err(meta.error("unsupported entity attribute"));
                }
                Ok(())
            })?;
        }
    }
    Ok(result)
}

fn parse_column_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    name = string_value(&meta)?;
                    Ok(())
                } else {
                    Err(meta.error("unsupported column attribute"))
                }
            })?;
        }
    }
    Ok(name)
}

/// Returns `T` when `ty` is `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
