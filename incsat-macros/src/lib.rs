//! Derive macros that turn the field documentation of a config struct into code.
use quote::quote;
use syn::{parse_quote, Attribute, Expr, Lit, LitStr, Meta, MetaNameValue};
use synstructure::decl_derive;

/// Doc comment lines of a field, trimmed of the leading space rustdoc keeps.
fn doc_lines(attrs: &[Attribute]) -> Vec<LitStr> {
    attrs
        .iter()
        .filter_map(|attr| match attr.parse_meta() {
            Ok(Meta::NameValue(MetaNameValue {
                ident,
                lit: Lit::Str(doc_str),
                ..
            })) => {
                if ident == "doc" {
                    Some(doc_str)
                } else {
                    None
                }
            }
            _ => None,
        })
        .collect()
}

/// Derives `Default` from `(Default: <expr>)` markers in the field docs.
///
/// Fields without a marker use `Default::default()`.
fn derive_doc_default(s: synstructure::Structure) -> proc_macro2::TokenStream {
    let variant = match s.variants() {
        [variant] => variant,
        _ => panic!("DocDefault requires a struct"),
    };

    let default_re = regex::Regex::new(r"\(Default: (.*)\)").unwrap();

    let body = variant.construct(|field, _| {
        let mut default_value: Expr = parse_quote!(Default::default());
        for doc_str in doc_lines(&field.attrs) {
            if let Some(captures) = default_re.captures(&doc_str.value()) {
                let default_str = captures.get(1).unwrap().as_str();
                let default_str = LitStr::new(default_str, doc_str.span());
                default_value = default_str
                    .parse()
                    .expect("error parsing default expression");
            }
        }
        default_value
    });

    s.gen_impl(quote! {
        gen impl Default for @Self {
            fn default() -> Self {
                #body
            }
        }
    })
}

/// Derives an inherent `help()` returning every field name followed by its indented docs.
fn derive_config_help(s: synstructure::Structure) -> proc_macro2::TokenStream {
    let variant = match s.variants() {
        [variant] => variant,
        _ => panic!("ConfigHelp requires a struct"),
    };

    let mut text = String::new();

    for binding in variant.bindings() {
        let field = binding.ast();
        let name = match &field.ident {
            Some(ident) => ident.to_string(),
            None => panic!("ConfigHelp requires named fields"),
        };
        text.push_str(&name);
        text.push_str(":\n");
        for doc_str in doc_lines(&field.attrs) {
            let line = doc_str.value();
            text.push_str("    ");
            text.push_str(line.strip_prefix(' ').unwrap_or(&line));
            text.push('\n');
        }
    }

    let ast = s.ast();
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Names and documentation of all fields.
            pub fn help() -> &'static str {
                #text
            }
        }
    }
}

decl_derive!([DocDefault] => derive_doc_default);
decl_derive!([ConfigHelp] => derive_config_help);
