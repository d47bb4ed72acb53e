use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr};

pub fn derive_tracked(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (kind, collection) = extract_names(input)?;
    let fields = TrackedFields::extract(input)?;

    let key_field = &fields.key;
    let identity = match fields.identity.as_slice() {
        [] => quote! { ::std::string::ToString::to_string(&self.#key_field) },
        [single] => quote! { ::std::string::ToString::to_string(&self.#single) },
        many => quote! {
            ::tlparser::entity::join_identity(&[
                #(::std::string::ToString::to_string(&self.#many)),*
            ])
        },
    };

    let stamp = fields.parsed_at.as_ref().map(|field| {
        quote! {
            fn stamp_parsed_at(&mut self, at: ::tlparser::entity::Timestamp) {
                self.#field = at;
            }
        }
    });

    Ok(quote! {
        impl ::tlparser::Tracked for #name {
            const KIND: &'static str = #kind;
            const COLLECTION: &'static str = #collection;

            fn key(&self) -> &str {
                &self.#key_field
            }

            fn identity(&self) -> ::std::string::String {
                #identity
            }

            #stamp
        }
    })
}

fn extract_names(input: &DeriveInput) -> syn::Result<(String, String)> {
    let mut kind = None;
    let mut collection = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("tracked") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("kind") {
                let value: LitStr = meta.value()?.parse()?;
                kind = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `kind` or `collection`"))
            }
        })?;
    }

    let kind = kind.unwrap_or_else(|| to_snake_case(&input.ident.to_string()));
    let collection = collection.unwrap_or_else(|| format!("{}s", kind));
    Ok((kind, collection))
}

struct TrackedFields {
    key: syn::Ident,
    identity: Vec<syn::Ident>,
    parsed_at: Option<syn::Ident>,
}

impl TrackedFields {
    fn extract(input: &DeriveInput) -> syn::Result<Self> {
        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(fields) => &fields.named,
                _ => {
                    return Err(syn::Error::new_spanned(
                        &input.ident,
                        "Tracked derive: expected a struct with named fields",
                    ))
                }
            },
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Tracked derive: only structs are supported",
                ))
            }
        };

        let mut key = None;
        let mut identity = Vec::new();
        let mut parsed_at = None;

        for field in named {
            let Some(ident) = field.ident.clone() else {
                continue;
            };
            for attr in &field.attrs {
                if !attr.path().is_ident("tracked") {
                    continue;
                }
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("key") {
                        key = Some(ident.clone());
                        Ok(())
                    } else if meta.path.is_ident("identity") {
                        identity.push(ident.clone());
                        Ok(())
                    } else if meta.path.is_ident("parsed_at") {
                        parsed_at = Some(ident.clone());
                        Ok(())
                    } else {
                        Err(meta.error("expected `key`, `identity` or `parsed_at`"))
                    }
                })?;
            }
        }

        let key = match key {
            Some(key) => key,
            None => named
                .iter()
                .filter_map(|f| f.ident.clone())
                .find(|ident| ident == "key")
                .ok_or_else(|| {
                    syn::Error::new_spanned(
                        &input.ident,
                        "Tracked derive: no field marked with #[tracked(key)] and no field named `key`",
                    )
                })?,
        };

        Ok(Self {
            key,
            identity,
            parsed_at,
        })
    }
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
