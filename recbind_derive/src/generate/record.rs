use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

use crate::model::{
    BoundAttributes, DeclaratorKind, DeriveBinding, DeriveParameter, DeriveRecord, FieldShape,
};

impl FieldShape {
    pub(crate) fn generate(&self) -> TokenStream2 {
        match self {
            FieldShape::Scalar { ty } => {
                let ty = &ty.tokens;
                quote! { ::recbind::TypeHint::scalar::<#ty>() }
            }
            FieldShape::Optional { inner } => {
                let inner = inner.generate();
                quote! { ::recbind::TypeHint::optional(#inner) }
            }
            FieldShape::Repeated { element } => {
                let element = element.generate();
                quote! { ::recbind::TypeHint::repeated(#element) }
            }
            FieldShape::Tuple { members } => {
                let members = members.iter().map(FieldShape::generate).collect::<Vec<_>>();
                quote! { ::recbind::TypeHint::tuple(vec![#( #members ),*]) }
            }
        }
    }
}

impl BoundAttributes {
    pub(crate) fn generate(&self) -> TokenStream2 {
        let mut binding = match self.declarator {
            DeclaratorKind::Option => quote! { ::recbind::option() },
            DeclaratorKind::Argument => quote! { ::recbind::argument() },
        };
        for name in &self.names {
            let tokens = &name.tokens;
            binding = quote! { #binding.name(#tokens) };
        }
        if self.is_flag {
            binding = quote! { #binding.flag() };
        }
        if self.multiple {
            binding = quote! { #binding.multiple() };
        }
        if let Some(nargs) = &self.nargs {
            let tokens = &nargs.tokens;
            binding = quote! { #binding.nargs(#tokens) };
        }
        if let Some(required) = &self.required {
            let tokens = &required.tokens;
            binding = quote! { #binding.required(#tokens) };
        }
        if let Some(default) = &self.default {
            let tokens = &default.tokens;
            binding = quote! { #binding.default(#tokens) };
        }
        if let Some(param_type) = &self.param_type {
            let tokens = &param_type.tokens;
            binding = quote! { #binding.param_type(#tokens) };
        }
        if let Some(help) = &self.help {
            let tokens = &help.tokens;
            binding = quote! { #binding.help(#tokens) };
        }
        binding
    }
}

impl DeriveParameter {
    pub(crate) fn field_spec(&self) -> TokenStream2 {
        let field_name_str = format!("{}", self.field_name);

        match &self.binding {
            DeriveBinding::Flatten => {
                let ty = &self.ty.tokens;
                quote! {
                    fields.extend(<#ty as ::recbind::ArgRecord>::fields());
                }
            }
            DeriveBinding::Unbound => {
                let hint = self.shape.generate();
                quote! {
                    fields.push(::recbind::FieldSpec::new(#field_name_str, #hint, vec![]));
                }
            }
            DeriveBinding::Bound(attributes) => {
                let hint = self.shape.generate();
                let binding = attributes.generate();
                quote! {
                    fields.push(::recbind::FieldSpec::new(
                        #field_name_str,
                        #hint,
                        vec![::recbind::Metadata::Binding(#binding)],
                    ));
                }
            }
        }
    }

    pub(crate) fn construct_arm(&self) -> TokenStream2 {
        let field_name = &self.field_name;
        let field_name_str = format!("{field_name}");

        match &self.binding {
            DeriveBinding::Flatten => {
                let ty = &self.ty.tokens;
                quote! {
                    #field_name: <#ty as ::recbind::ArgRecord>::construct(values)?,
                }
            }
            _ => {
                let missing = if let Some(fallback) = &self.fallback {
                    let tokens = &fallback.tokens;
                    quote! { #tokens }
                } else if self.shape.is_optional() {
                    quote! { ::core::option::Option::None }
                } else if matches!(self.binding, DeriveBinding::Unbound) {
                    quote! { ::core::default::Default::default() }
                } else {
                    quote! {
                        return ::core::result::Result::Err(
                            ::recbind::ConstructError::missing(#field_name_str),
                        )
                    }
                };
                quote! {
                    #field_name: match values.take(#field_name_str) {
                        ::core::option::Option::Some(value) => {
                            ::recbind::FromValue::from_value(value).map_err(|message| {
                                ::recbind::ConstructError::invalid(#field_name_str, message)
                            })?
                        }
                        ::core::option::Option::None => #missing,
                    },
                }
            }
        }
    }
}

impl TryFrom<DeriveRecord> for TokenStream2 {
    type Error = syn::Error;

    fn try_from(value: DeriveRecord) -> Result<Self, Self::Error> {
        let DeriveRecord {
            struct_name,
            parameters,
        } = value;
        let field_specs = parameters
            .iter()
            .map(DeriveParameter::field_spec)
            .collect::<Vec<_>>();
        let construct_arms = parameters
            .iter()
            .map(DeriveParameter::construct_arm)
            .collect::<Vec<_>>();

        Ok(quote! {
            impl ::recbind::ArgRecord for #struct_name {
                fn fields() -> ::std::vec::Vec<::recbind::FieldSpec> {
                    let mut fields = ::std::vec::Vec::new();
                    #( #field_specs )*
                    fields
                }

                fn construct(
                    values: &mut ::recbind::ValueBag,
                ) -> ::core::result::Result<Self, ::recbind::ConstructError> {
                    ::core::result::Result::Ok(Self {
                        #( #construct_arms )*
                    })
                }
            }
        })
    }
}
