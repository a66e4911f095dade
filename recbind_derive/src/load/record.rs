use quote::ToTokens;

use crate::load::incompatible_error;
use crate::model::{
    BoundAttributes, DeclaratorKind, DeriveBinding, DeriveParameter, DeriveRecord, DeriveValue,
    FieldShape, IntermediateAttributes,
};

impl TryFrom<&syn::DeriveInput> for DeriveRecord {
    type Error = syn::Error;

    fn try_from(value: &syn::DeriveInput) -> Result<Self, Self::Error> {
        match &value.data {
            syn::Data::Struct(syn::DataStruct {
                fields: syn::Fields::Named(fields),
                ..
            }) => {
                let parameters = fields
                    .named
                    .iter()
                    .map(DeriveParameter::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DeriveRecord {
                    struct_name: value.ident.clone(),
                    parameters,
                })
            }
            _ => Err(syn::Error::new(
                value.ident.span(),
                "Invalid - ArgRecord expects a struct with named fields.",
            )),
        }
    }
}

impl TryFrom<&syn::Field> for DeriveParameter {
    type Error = syn::Error;

    fn try_from(value: &syn::Field) -> Result<Self, Self::Error> {
        let mut attributes = IntermediateAttributes::default();

        for attribute in &value.attrs {
            if attribute.path().is_ident("bind") {
                attributes = IntermediateAttributes::from(attribute);
            }
        }

        let field_name = value
            .ident
            .clone()
            .expect("named fields must carry an identifier");
        let flatten = attributes.singletons.contains("flatten");
        let explicit_option = attributes.singletons.contains("option")
            || attributes.calls.contains_key("option");
        let explicit_argument = attributes.singletons.contains("argument")
            || attributes.calls.contains_key("argument");
        let is_flag = attributes.singletons.contains("flag");
        let multiple = attributes.singletons.contains("multiple");

        let pair = |key: &str| -> Option<DeriveValue> {
            attributes.pairs.get(key).map(|values| {
                values
                    .first()
                    .expect("attribute pair values must be non-empty")
                    .clone()
            })
        };
        let nargs = pair("nargs");
        let required = pair("required");
        let default = pair("default");
        let param_type = pair("param_type");
        let help = pair("help");
        let fallback = pair("fallback");

        if explicit_option && explicit_argument {
            return Err(incompatible_error(
                &field_name,
                "#[bind(option)]",
                "#[bind(argument)]",
            ));
        }

        if flatten {
            disallow(
                &field_name,
                "#[bind(flatten)]",
                &[
                    (explicit_option, "option"),
                    (explicit_argument, "argument"),
                    (is_flag, "flag"),
                    (multiple, "multiple"),
                    (nargs.is_some(), "nargs = .."),
                    (required.is_some(), "required = .."),
                    (default.is_some(), "default = .."),
                    (param_type.is_some(), "param_type = .."),
                    (help.is_some(), "help = .."),
                    (fallback.is_some(), "fallback = .."),
                ],
            )?;
        }

        let binding = if flatten {
            DeriveBinding::Flatten
        } else if !explicit_option && !explicit_argument {
            let orphans = [
                (is_flag, "flag"),
                (multiple, "multiple"),
                (nargs.is_some(), "nargs = .."),
                (required.is_some(), "required = .."),
                (default.is_some(), "default = .."),
                (param_type.is_some(), "param_type = .."),
                (help.is_some(), "help = .."),
            ];
            if let Some((_, name)) = orphans.iter().find(|(condition, _)| *condition) {
                return Err(syn::Error::new(
                    field_name.span(),
                    format!("Invalid - `#[bind({name})]` requires `option` or `argument`."),
                ));
            }
            DeriveBinding::Unbound
        } else {
            if explicit_argument && is_flag {
                return Err(incompatible_error(
                    &field_name,
                    "#[bind(argument)]",
                    "#[bind(flag)]",
                ));
            }
            if multiple && nargs.is_some() {
                return Err(incompatible_error(
                    &field_name,
                    "#[bind(multiple)]",
                    "#[bind(nargs = ..)]",
                ));
            }

            let (declarator, call) = if explicit_option {
                (DeclaratorKind::Option, "option")
            } else {
                (DeclaratorKind::Argument, "argument")
            };
            DeriveBinding::Bound(BoundAttributes {
                declarator,
                names: attributes.calls.get(call).cloned().unwrap_or_default(),
                is_flag,
                multiple,
                nargs,
                required,
                default,
                param_type,
                help,
            })
        };

        Ok(DeriveParameter {
            field_name,
            ty: DeriveValue {
                tokens: value.ty.to_token_stream(),
            },
            shape: classify(&value.ty),
            binding,
            fallback,
        })
    }
}

fn classify(ty: &syn::Type) -> FieldShape {
    let scalar = || FieldShape::Scalar {
        ty: DeriveValue {
            tokens: ty.to_token_stream(),
        },
    };

    match ty {
        syn::Type::Path(path) => match path.path.segments.first() {
            Some(segment) => match segment.ident.to_string().as_str() {
                "Option" => match generic_argument(segment) {
                    Some(inner) => FieldShape::Optional {
                        inner: Box::new(classify(inner)),
                    },
                    None => scalar(),
                },
                "Vec" => match generic_argument(segment) {
                    Some(element) => FieldShape::Repeated {
                        element: Box::new(classify(element)),
                    },
                    None => scalar(),
                },
                _ => scalar(),
            },
            None => scalar(),
        },
        syn::Type::Tuple(tuple) => FieldShape::Tuple {
            members: tuple.elems.iter().map(classify).collect(),
        },
        _ => scalar(),
    }
}

fn generic_argument(segment: &syn::PathSegment) -> Option<&syn::Type> {
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(arguments) => {
            arguments.args.iter().find_map(|argument| match argument {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
        }
        _ => None,
    }
}

fn disallow(
    field_name: &syn::Ident,
    antecedent: impl Into<String>,
    condition_names: &[(bool, &str)],
) -> Result<(), syn::Error> {
    let antecedent = antecedent.into();
    for (condition, name) in condition_names {
        if *condition {
            return Err(incompatible_error(
                field_name,
                antecedent.as_str(),
                format!("#[bind({name})]").as_str(),
            ));
        }
    }

    Ok(())
}
