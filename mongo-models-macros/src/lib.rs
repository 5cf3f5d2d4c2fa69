//! Procedural macros for the mongo-models project.
//!
//! Provides `#[derive(Model)]`, which binds a serde type to a collection:
//!
//! ```ignore
//! use mongo_models::prelude::*;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Model)]
//! #[model(collection = "dummies", schema = dummy_schema, indexes = dummy_indexes)]
//! pub struct Dummy {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub name: String,
//! }
//! ```
//!
//! Supported keys:
//!
//! - `collection = "..."` (required): the collection name
//! - `schema = path`: a `fn() -> Schema`
//! - `indexes = path`: a `fn() -> Vec<IndexSpec>`
//! - `id = path`: a `fn(Bson) -> ModelResult<Bson>` replacing the default ObjectId coercion

#[allow(unused_extern_crates)]
extern crate self as mongo_models_macros;

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, Path, parse_macro_input};

#[derive(Default)]
struct ModelArgs {
    collection: Option<LitStr>,
    schema: Option<Path>,
    indexes: Option<Path>,
    id: Option<Path>,
}

impl ModelArgs {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut args = ModelArgs::default();

        for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("model")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    args.collection = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("schema") {
                    args.schema = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("indexes") {
                    args.indexes = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("id") {
                    args.id = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("expected one of `collection`, `schema`, `indexes` or `id`"));
                }

                Ok(())
            })?;
        }

        Ok(args)
    }
}

/// Derives `mongo_models::model::Model`.
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let args = ModelArgs::parse(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let collection = args.collection.ok_or_else(|| {
        syn::Error::new_spanned(name, "missing `#[model(collection = \"...\")]` attribute")
    })?;

    let schema = args.schema.map(|path| {
        quote! {
            fn schema() -> ::mongo_models::schema::Schema {
                #path()
            }
        }
    });

    let indexes = args.indexes.map(|path| {
        quote! {
            fn indexes() -> ::core::option::Option<::std::vec::Vec<::mongo_models::index::IndexSpec>> {
                ::core::option::Option::Some(#path())
            }
        }
    });

    let id = args.id.map(|path| {
        quote! {
            fn coerce_id(
                id: ::mongo_models::bson::Bson,
            ) -> ::mongo_models::error::ModelResult<::mongo_models::bson::Bson> {
                #path(id)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::mongo_models::model::Model for #name #ty_generics #where_clause {
            fn collection_name() -> &'static str {
                #collection
            }

            #schema
            #indexes
            #id
        }
    })
}
