//! Derive macro for quarry records.
//!
//! This crate provides `#[derive(Record)]`, which maps a struct with named
//! fields onto one table row by implementing `quarry_core::Entity`. A field
//! marked `#[record(db)]` holds the database handle and additionally
//! implements `quarry_record::ActiveRecord`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta};

/// Derives `Entity` (and `ActiveRecord` when a db field exists).
///
/// # Attributes
///
/// - `#[record(table = "User")]` - The table name without prefix
///   (optional, defaults to the struct name)
/// - `#[record(id = "idColumn")]` - The id column (optional, defaults to
///   `id`)
///
/// # Field Attributes
///
/// - `#[record(name = "column")]` - The column name (optional, defaults to
///   the field name)
/// - `#[record(skip)]` - The field is not mapped to any column
/// - `#[record(db)]` - The field is an `Option<quarry_record::Db>` handle;
///   it is not mapped and generates the `ActiveRecord` implementation
///
/// Mapped field types must implement `Clone`, `ToSqlValue` and
/// `FromSqlValue`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record derive does not support generic structs",
        ));
    }
    let record_attrs = parse_record_attrs(&input.attrs)?;
    let table_name = record_attrs
        .table
        .unwrap_or_else(|| struct_name.to_string());
    let id_column = record_attrs.id.unwrap_or_else(|| String::from("id"));

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

    let mut columns: Vec<(Ident, String)> = Vec::new();
    let mut db_field: Option<Ident> = None;
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            continue;
        };
        let attrs = parse_field_attrs(&field.attrs)?;

        if attrs.db {
            if db_field.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked #[record(db)]",
                ));
            }
            db_field = Some(field_name);
            continue;
        }
        if attrs.skip {
            continue;
        }

        let column = attrs.name.unwrap_or_else(|| field_name.to_string());
        columns.push((field_name, column));
    }

    let field_entries: Vec<TokenStream2> = columns
        .iter()
        .map(|(field_name, column)| {
            quote! {
                ::quarry_core::schema::Field::new(
                    #column,
                    |record: &#struct_name| {
                        ::quarry_core::ToSqlValue::to_sql_value(
                            ::core::clone::Clone::clone(&record.#field_name),
                        )
                    },
                    |record: &mut #struct_name, value| {
                        record.#field_name = ::quarry_core::FromSqlValue::from_sql_value(value)?;
                        ::core::result::Result::Ok(())
                    },
                )
            }
        })
        .collect();

    let active_record_impl = db_field.map(|db| {
        quote! {
            impl ::quarry_record::ActiveRecord for #struct_name {
                fn db(&self) -> ::core::option::Option<&::quarry_record::Db> {
                    self.#db.as_ref()
                }

                fn set_db(&mut self, db: ::quarry_record::Db) {
                    self.#db = ::core::option::Option::Some(db);
                }
            }
        }
    });

    Ok(quote! {
        impl ::quarry_core::schema::Entity for #struct_name {
            const TABLE: &'static str = #table_name;
            const ID_COLUMN: &'static str = #id_column;

            fn fields() -> &'static [::quarry_core::schema::Field<Self>] {
                const FIELDS: &[::quarry_core::schema::Field<#struct_name>] = &[
                    #(#field_entries),*
                ];
                FIELDS
            }
        }

        #active_record_impl
    })
}

#[derive(Default)]
struct RecordAttrs {
    table: Option<String>,
    id: Option<String>,
}

#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    skip: bool,
    db: bool,
}

fn parse_record_attrs(attrs: &[Attribute]) -> syn::Result<RecordAttrs> {
    let mut result = RecordAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                result.table = Some(string_value(&meta)?);
            } else if meta.path.is_ident("id") {
                result.id = Some(string_value(&meta)?);
            } else {
                return Err(meta.error("unknown record attribute, expected `table` or `id`"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        // Bare #[record] changes nothing.
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("db") {
                result.db = true;
            } else if meta.path.is_ident("name") {
                result.name = Some(string_value(&meta)?);
            } else {
                return Err(meta.error("unknown field attribute, expected `name`, `skip` or `db`"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}
