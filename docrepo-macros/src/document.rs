//! Implementation of #[derive(Document)] proc-macro.

use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{parse_macro_input, DeriveInput, Field, Ident};

use crate::fields::named_fields;

pub fn derive_document_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(input, "Document")?;

    let id_field = find_field(fields, "id", "id")?.ok_or_else(|| {
        syn::Error::new_spanned(
            input,
            "Document requires an `id` field or a field marked #[document(id)]",
        )
    })?;

    let extra_field = find_field(fields, "extra", "extra_elements")?.ok_or_else(|| {
        syn::Error::new_spanned(
            input,
            "Document requires an `extra_elements` field or a field marked #[document(extra)]",
        )
    })?;

    let collection_fn = parse_collection_name(input)?.map(|collection| {
        quote! {
            fn collection_name() -> &'static str {
                #collection
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::docrepo::Document for #name #ty_generics #where_clause {
            fn id(&self) -> Option<&::docrepo::DocumentId> {
                self.#id_field.as_ref()
            }

            fn set_id(&mut self, id: ::docrepo::DocumentId) {
                self.#id_field = Some(id);
            }

            fn extra_elements(&self) -> &::docrepo::ExtraElements {
                &self.#extra_field
            }

            fn extra_elements_mut(&mut self) -> &mut ::docrepo::ExtraElements {
                &mut self.#extra_field
            }

            #collection_fn
        }
    })
}

/// Finds the field tagged `#[document(<marker>)]`, falling back to the field
/// named `fallback`.
fn find_field<'a>(
    fields: &'a Punctuated<Field, Comma>,
    marker: &str,
    fallback: &str,
) -> syn::Result<Option<&'a Ident>> {
    for field in fields {
        if field_markers(field)?.iter().any(|m| *m == marker) {
            return Ok(field.ident.as_ref());
        }
    }
    Ok(fields
        .iter()
        .find(|field| field.ident.as_ref().is_some_and(|i| i == fallback))
        .and_then(|field| field.ident.as_ref()))
}

/// Reads the `#[document(id)]` / `#[document(extra)]` markers of a field.
fn field_markers(field: &Field) -> syn::Result<Vec<&'static str>> {
    let mut markers = Vec::new();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("document")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                markers.push("id");
                Ok(())
            } else if meta.path.is_ident("extra") {
                markers.push("extra");
                Ok(())
            } else {
                Err(meta.error("expected `id` or `extra`"))
            }
        })?;
    }
    Ok(markers)
}

/// Parses `#[document(collection = "name")]` on the struct.
fn parse_collection_name(input: &DeriveInput) -> syn::Result<Option<syn::LitStr>> {
    let mut collection = None;
    for attr in &input.attrs {
        if attr.path().is_ident("document") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    collection = Some(meta.value()?.parse::<syn::LitStr>()?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported document attribute"))
                }
            })?;
        }
    }
    Ok(collection)
}
