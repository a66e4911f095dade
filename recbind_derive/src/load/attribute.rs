use crate::model::{DeriveValue, IntermediateAttributes};
use quote::{quote, ToTokens};
use std::collections::{HashMap, HashSet};

impl From<&syn::Attribute> for IntermediateAttributes {
    fn from(value: &syn::Attribute) -> Self {
        let attributes_parser =
            syn::punctuated::Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated;
        let attributes_parse = value.parse_args_with(attributes_parser);
        let mut singletons = HashSet::default();
        let mut pairs: HashMap<String, Vec<DeriveValue>> = HashMap::default();
        let mut calls: HashMap<String, Vec<DeriveValue>> = HashMap::default();

        for expression in
            attributes_parse.expect("syn::Attribute must parse as comma separated syn::Expr")
        {
            match expression {
                syn::Expr::Assign(assignment) => {
                    let left = assignment.left.to_token_stream();
                    let values = pairs.entry(left.to_string()).or_insert(Vec::default());
                    values.push(DeriveValue {
                        tokens: assignment.right.to_token_stream(),
                    });
                }
                syn::Expr::Path(path) => {
                    if let Some(ident) = path.path.get_ident() {
                        singletons.insert(ident.to_string());
                    }
                }
                syn::Expr::Call(call) => {
                    let name = call.func.to_token_stream().to_string();
                    let arguments = call
                        .args
                        .iter()
                        .map(|argument| DeriveValue {
                            tokens: argument.to_token_stream(),
                        })
                        .collect();
                    calls.insert(name, arguments);
                }
                _ => {
                    let tts = expression.to_token_stream();
                    let expression_string = quote! {
                        #tts
                    };
                    panic!("Unparseable attribute: {expression_string}");
                }
            };
        }

        Self {
            singletons,
            pairs,
            calls,
        }
    }
}
