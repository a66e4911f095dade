use proc_macro2::TokenStream as TokenStream2;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct DeriveValue {
    pub tokens: TokenStream2,
}

impl PartialEq for DeriveValue {
    fn eq(&self, other: &Self) -> bool {
        let st = &self.tokens.to_string();
        let ot = &other.tokens.to_string();
        st == ot
    }
}

impl Eq for DeriveValue {}

/// The raw contents of a `#[bind(..)]` attribute: bare words, `key = value`
/// pairs, and `name(..)` calls.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IntermediateAttributes {
    pub singletons: HashSet<String>,
    pub pairs: HashMap<String, Vec<DeriveValue>>,
    pub calls: HashMap<String, Vec<DeriveValue>>,
}

/// The structural shape of a field's type, classified by its outermost layers.
#[derive(Debug, PartialEq, Eq)]
pub enum FieldShape {
    Scalar { ty: DeriveValue },
    Optional { inner: Box<FieldShape> },
    Repeated { element: Box<FieldShape> },
    Tuple { members: Vec<FieldShape> },
}

impl FieldShape {
    pub fn is_optional(&self) -> bool {
        matches!(self, FieldShape::Optional { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaratorKind {
    Option,
    Argument,
}

/// The settled attributes of a bound field.
#[derive(Debug, PartialEq, Eq)]
pub struct BoundAttributes {
    pub declarator: DeclaratorKind,
    pub names: Vec<DeriveValue>,
    pub is_flag: bool,
    pub multiple: bool,
    pub nargs: Option<DeriveValue>,
    pub required: Option<DeriveValue>,
    pub default: Option<DeriveValue>,
    pub param_type: Option<DeriveValue>,
    pub help: Option<DeriveValue>,
}

impl Default for BoundAttributes {
    fn default() -> Self {
        Self {
            declarator: DeclaratorKind::Option,
            names: Vec::default(),
            is_flag: false,
            multiple: false,
            nargs: None,
            required: None,
            default: None,
            param_type: None,
            help: None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeriveBinding {
    /// No `#[bind(..)]` declarator; the field is constructed from its own default.
    Unbound,
    /// `#[bind(flatten)]`; the field's type contributes its own bound fields.
    Flatten,
    /// `#[bind(option ..)]` or `#[bind(argument ..)]`.
    Bound(BoundAttributes),
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveParameter {
    pub field_name: syn::Ident,
    pub ty: DeriveValue,
    pub shape: FieldShape,
    pub binding: DeriveBinding,
    pub fallback: Option<DeriveValue>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveRecord {
    pub struct_name: syn::Ident,
    pub parameters: Vec<DeriveParameter>,
}
