use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Meta, parse_macro_input};

/// Derive macro for entity field mapping declarations.
///
/// Implements `tikmap_api::Entity` for the annotated struct: `mapping()`
/// returns one `PropertyAccessor` per `#[field]` in declaration order.
/// Fields without `#[field]` are not mapped and keep their `Default` value.
///
/// The struct must implement `Default`, every mapped field type must
/// implement `tikmap_api::FieldValue`. An optional field without `default`
/// keeps its `Default` value when the key is absent.
///
/// # Example
///
/// ```ignore
/// #[derive(Entity, Default)]
/// pub struct Interface {
///     #[field(key = ".id", mandatory)]
///     pub id: String,
///
///     #[field(default = "false")]
///     pub disabled: bool,
///
///     // key defaults to the field name with `_` -> `-`: "mac-address"
///     #[field]
///     pub mac_address: Option<String>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(field))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Entity only supports structs with named fields",
                ));
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Entity only supports structs")),
    };

    let mut accessor_tokens = Vec::new();
    let mut seen_keys: Vec<String> = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_name.to_string();

        // Parse #[field] / #[field(...)] attribute.
        let mut mapped = false;
        let mut key_str: Option<String> = None;
        let mut default_str: Option<String> = None;
        let mut mandatory = false;

        for attr in &field.attrs {
            if !attr.path().is_ident("field") {
                continue;
            }
            mapped = true;
            if let Meta::Path(_) = attr.meta {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("key") {
                    let value: LitStr = meta.value()?.parse()?;
                    key_str = Some(value.value());
                } else if meta.path.is_ident("default") {
                    let value: LitStr = meta.value()?.parse()?;
                    default_str = Some(value.value());
                } else if meta.path.is_ident("mandatory") {
                    mandatory = true;
                } else {
                    return Err(meta.error("unknown field option (expected key, default, mandatory)"));
                }
                Ok(())
            })?;
        }

        if !mapped {
            continue;
        }

        if mandatory && default_str.is_some() {
            return Err(syn::Error::new_spanned(
                field_name,
                "a mandatory field cannot declare a default",
            ));
        }

        let key_str = key_str.unwrap_or_else(|| field_name_str.replace('_', "-"));
        if key_str.is_empty() {
            return Err(syn::Error::new_spanned(field_name, "field key must not be empty"));
        }
        if seen_keys.contains(&key_str) {
            return Err(syn::Error::new_spanned(
                field_name,
                format!("key '{key_str}' is already mapped by another field"),
            ));
        }
        seen_keys.push(key_str.clone());

        let default_tokens = match default_str {
            Some(lit) => quote! { ::core::option::Option::Some(#lit) },
            None => quote! { ::core::option::Option::None },
        };

        accessor_tokens.push(quote! {
            tikmap_api::mapping::PropertyAccessor {
                field: #field_name_str,
                key: #key_str,
                mandatory: #mandatory,
                default: #default_tokens,
                get: |__entity: &Self| -> ::std::string::String {
                    tikmap_api::value::FieldValue::format_field(&__entity.#field_name)
                },
                set: |__entity: &mut Self, __raw: &str| -> ::core::result::Result<(), ::std::string::String> {
                    __entity.#field_name = tikmap_api::value::FieldValue::parse_field(__raw)?;
                    ::core::result::Result::Ok(())
                },
            }
        });
    }

    let expanded = quote! {
        impl #impl_generics tikmap_api::mapping::Entity for #name #ty_generics #where_clause {
            fn mapping() -> ::std::vec::Vec<tikmap_api::mapping::PropertyAccessor<Self>> {
                ::std::vec![
                    #(#accessor_tokens),*
                ]
            }
        }
    };

    Ok(TokenStream::from(expanded))
}
