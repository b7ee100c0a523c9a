use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, DeriveInput, Expr, Fields, Ident, Lit, Token};

struct VariantAttrs {
    ident: Ident,
    fields: Fields,
    code: TokenStream,
    message: Option<String>,
}

pub(crate) fn http_error_derive_impl(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data_enum = match &input.data {
        syn::Data::Enum(data_enum) => data_enum,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "HttpError can only be derived for enums",
            ))
        }
    };

    let mut variants = Vec::new();
    for variant in &data_enum.variants {
        let (code, message) = parse_variant_attrs(&variant.ident, &variant.attrs)?;
        variants.push(VariantAttrs {
            ident: variant.ident.clone(),
            fields: variant.fields.clone(),
            code,
            message,
        });
    }

    let code_arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let code = &v.code;
        match &v.fields {
            Fields::Unit => quote! { Self::#ident => #code, },
            Fields::Unnamed(_) => quote! { Self::#ident(..) => #code, },
            Fields::Named(_) => quote! { Self::#ident { .. } => #code, },
        }
    });

    let message_arms = variants.iter().map(message_arm);

    Ok(quote! {
        impl #impl_generics ::atelier::error::HttpError for #name #ty_generics #where_clause {
            fn http_code(&self) -> ::atelier::http::StatusCode {
                match self {
                    #(#code_arms)*
                }
            }

            fn http_message(&self) -> ::std::string::String {
                match self {
                    #(#message_arms)*
                }
            }
        }
    })
}

fn parse_variant_attrs(
    variant: &Ident,
    attrs: &[Attribute],
) -> syn::Result<(TokenStream, Option<String>)> {
    let attr = attrs
        .iter()
        .find(|attr| attr.path().is_ident("http_error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(variant, "missing #[http_error(...)] on variant")
        })?;

    let list = attr.meta.require_list()?;
    let args = Punctuated::<Expr, Token![,]>::parse_terminated.parse2(list.tokens.clone())?;
    let mut args = args.into_iter();

    let code = match args.next() {
        Some(Expr::Path(path)) => {
            let code = &path.path;
            quote! { ::atelier::http::StatusCode::#code }
        }
        Some(Expr::Lit(lit)) => match &lit.lit {
            Lit::Int(int_lit) => {
                let code = int_lit.base10_parse::<u16>()?;
                if !(100..=999).contains(&code) {
                    return Err(syn::Error::new_spanned(int_lit, "invalid HTTP status code"));
                }
                quote! {
                    ::atelier::http::StatusCode::from_u16(#code)
                        .unwrap_or(::atelier::http::StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
            other => return Err(syn::Error::new_spanned(other, "expected a status code")),
        },
        Some(other) => return Err(syn::Error::new_spanned(other, "expected a status code")),
        None => return Err(syn::Error::new_spanned(attr, "missing status code")),
    };

    let message = match args.next() {
        Some(Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        })) => Some(s.value()),
        Some(other) => return Err(syn::Error::new_spanned(other, "expected a string literal")),
        None => None,
    };

    Ok((code, message))
}

fn message_arm(v: &VariantAttrs) -> TokenStream {
    let ident = &v.ident;
    match &v.fields {
        Fields::Unit => {
            let expr = match &v.message {
                Some(msg) => quote! { ::std::string::String::from(#msg) },
                None => quote! { ::std::string::ToString::to_string(self) },
            };
            quote! { Self::#ident => #expr, }
        }
        Fields::Unnamed(fields) => {
            let names: Vec<Ident> = (0..fields.unnamed.len())
                .map(|i| Ident::new(&format!("__self_{}", i), proc_macro2::Span::call_site()))
                .collect();
            let expr = match &v.message {
                Some(msg) => {
                    let msg = prefix_numbers_in_braces(msg);
                    quote! { ::std::format!(#msg) }
                }
                None => quote! { ::std::string::ToString::to_string(self) },
            };
            quote! {
                #[allow(unused_variables)]
                Self::#ident(#(#names),*) => #expr,
            }
        }
        Fields::Named(fields) => {
            let names: Vec<&Ident> = fields.named.iter().filter_map(|f| f.ident.as_ref()).collect();
            let expr = match &v.message {
                Some(msg) => quote! { ::std::format!(#msg) },
                None => quote! { ::std::string::ToString::to_string(self) },
            };
            quote! {
                #[allow(unused_variables)]
                Self::#ident { #(#names),* } => #expr,
            }
        }
    }
}

/// Rewrites positional placeholders (`{0}`) to the bindings used in tuple arms (`{__self_0}`).
/// Escaped braces (`{{`, `}}`) are literal text and pass through unchanged.
fn prefix_numbers_in_braces(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                result.push_str("{{");
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                result.push_str("}}");
            }
            '{' => {
                result.push('{');
                if chars.peek().is_some_and(char::is_ascii_digit) {
                    result.push_str("__self_");
                }
            }
            _ => result.push(c),
        }
    }

    result
}
