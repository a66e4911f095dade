use std::any::{Any, TypeId};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use uuid::Uuid;

/// A value collected for a parameter (or injected into a call) at invocation time.
///
/// `Value` is the dynamic currency between the parsing engine and the record
/// constructor: the engine converts raw Cli tokens into `Value`s, and
/// [FromValue](trait.FromValue.html) moves them into the record's field types.
#[derive(Clone)]
pub enum Value {
    /// A signed integer.
    Int(i64),
    /// A piece of text.
    Text(String),
    /// A real number.
    Real(f64),
    /// A boolean.
    Bool(bool),
    /// A unique identifier.
    Identifier(Uuid),
    /// A timestamp without timezone.
    Timestamp(NaiveDateTime),
    /// A filesystem path.
    Path(PathBuf),
    /// The values of a multi-valued parameter.
    Seq(Vec<Value>),
    /// The values of a fixed-arity parameter.
    Tuple(Vec<Value>),
    /// A constructed record, injected into the call by the wrapper.
    Record(Rc<dyn Any>),
    /// A value of a custom registered type.
    Other(Rc<dyn Any>),
    /// The "don't pass" sentinel; see [DONT_PASS](constant.DONT_PASS.html).
    DontPass,
}

/// Marker meaning "omit this field from record construction".
///
/// Distinguishable from every legitimate field value.
/// May also be set as a binding `default` to defer to the record's own default
/// instead of forcing a parser-level value.
pub const DONT_PASS: Value = Value::DontPass;

impl Value {
    /// Wrap a constructed record for injection into a call.
    pub fn record<R: Any>(record: R) -> Self {
        Value::Record(Rc::new(record))
    }

    /// Wrap a value of a custom registered type.
    pub fn other<T: Any>(value: T) -> Self {
        Value::Other(Rc::new(value))
    }

    /// Borrow the injected record, if this value is one of type `R`.
    pub fn downcast_record<R: Any>(&self) -> Option<&R> {
        match self {
            Value::Record(record) => record.downcast_ref(),
            _ => None,
        }
    }

    /// Borrow the custom-typed value, if this value is one of type `T`.
    pub fn downcast_other<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Other(value) => value.downcast_ref(),
            _ => None,
        }
    }

    /// Check for the "don't pass" sentinel.
    pub fn is_dont_pass(&self) -> bool {
        matches!(self, Value::DontPass)
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Text(_) => "text",
            Value::Real(_) => "real",
            Value::Bool(_) => "boolean",
            Value::Identifier(_) => "identifier",
            Value::Timestamp(_) => "timestamp",
            Value::Path(_) => "path",
            Value::Seq(_) => "sequence",
            Value::Tuple(_) => "tuple",
            Value::Record(_) => "record",
            Value::Other(_) => "custom",
            Value::DontPass => "dont-pass",
        }
    }

    /// Render a scalar value the way it would appear on the Cli.
    /// Containers, records, and the sentinel have no Cli form.
    pub(crate) fn render_cli(&self) -> Option<String> {
        match self {
            Value::Int(value) => Some(value.to_string()),
            Value::Text(value) => Some(value.clone()),
            Value::Real(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            Value::Identifier(value) => Some(value.to_string()),
            Value::Timestamp(value) => Some(value.format("%Y-%m-%dT%H:%M:%S").to_string()),
            Value::Path(value) => Some(value.display().to_string()),
            _ => None,
        }
    }
}

// Manual: `dyn Any` carries no Debug of its own.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Value::Text(value) => f.debug_tuple("Text").field(value).finish(),
            Value::Real(value) => f.debug_tuple("Real").field(value).finish(),
            Value::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Value::Identifier(value) => f.debug_tuple("Identifier").field(value).finish(),
            Value::Timestamp(value) => f.debug_tuple("Timestamp").field(value).finish(),
            Value::Path(value) => f.debug_tuple("Path").field(value).finish(),
            Value::Seq(values) => f.debug_tuple("Seq").field(values).finish(),
            Value::Tuple(values) => f.debug_tuple("Tuple").field(values).finish(),
            Value::Record(_) => f.write_str("Record(..)"),
            Value::Other(_) => f.write_str("Other(..)"),
            Value::DontPass => f.write_str("DontPass"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(left), Value::Int(right)) => left == right,
            (Value::Text(left), Value::Text(right)) => left == right,
            (Value::Real(left), Value::Real(right)) => left == right,
            (Value::Bool(left), Value::Bool(right)) => left == right,
            (Value::Identifier(left), Value::Identifier(right)) => left == right,
            (Value::Timestamp(left), Value::Timestamp(right)) => left == right,
            (Value::Path(left), Value::Path(right)) => left == right,
            (Value::Seq(left), Value::Seq(right)) => left == right,
            (Value::Tuple(left), Value::Tuple(right)) => left == right,
            (Value::Record(left), Value::Record(right)) => Rc::ptr_eq(left, right),
            (Value::Other(left), Value::Other(right)) => Rc::ptr_eq(left, right),
            (Value::DontPass, Value::DontPass) => true,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Identifier(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl From<PathBuf> for Value {
    fn from(value: PathBuf) -> Self {
        Value::Path(value)
    }
}

/// Identity of a semantic value type: the key space of the type-inference registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// The key for the type `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The diagnostic name of the type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn id(&self) -> TypeId {
        self.id
    }
}

/// Structural description of a field's declared type.
///
/// Built by the derive (or by hand for manual [ArgRecord](trait.ArgRecord.html)
/// implementations) and consumed by the type-inference and requiredness passes.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeHint {
    /// A single value of the keyed type.
    Scalar(TypeKey),
    /// An `Option<..>` wrapper: the "union with no-value" shape.
    Optional(Box<TypeHint>),
    /// A fixed-size tuple with per-member types.
    Tuple(Vec<TypeHint>),
    /// A homogeneous repeated shape (`Vec<T>`).
    Repeated(Box<TypeHint>),
}

impl TypeHint {
    /// The hint for a scalar field of type `T`.
    pub fn scalar<T: 'static>() -> Self {
        TypeHint::Scalar(TypeKey::of::<T>())
    }

    /// Wrap a hint in the optional shape.
    pub fn optional(inner: TypeHint) -> Self {
        TypeHint::Optional(Box::new(inner))
    }

    /// The hint for a repeated field with the given element hint.
    pub fn repeated(element: TypeHint) -> Self {
        TypeHint::Repeated(Box::new(element))
    }

    /// The hint for a fixed-size tuple field.
    pub fn tuple(members: Vec<TypeHint>) -> Self {
        TypeHint::Tuple(members)
    }

    /// Strip the optional wrapper, reporting whether one was present.
    pub(crate) fn unwrap_optional(&self) -> (&TypeHint, bool) {
        match self {
            TypeHint::Optional(inner) => (inner, true),
            other => (other, false),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            TypeHint::Scalar(key) => key.name().to_string(),
            TypeHint::Optional(inner) => format!("Option<{}>", inner.describe()),
            TypeHint::Tuple(members) => {
                let members: Vec<String> = members.iter().map(TypeHint::describe).collect();
                format!("({})", members.join(", "))
            }
            TypeHint::Repeated(element) => format!("Vec<{}>", element.describe()),
        }
    }
}

/// A custom parameter-type descriptor: a name for diagnostics plus a conversion.
#[derive(Debug, Clone)]
pub struct CustomType {
    name: &'static str,
    convert: fn(&str) -> Result<Value, String>,
}

impl CustomType {
    /// Create a custom parameter type.
    ///
    /// ### Example
    /// ```
    /// use recbind_builder::{CustomType, Value};
    ///
    /// fn convert(raw: &str) -> Result<Value, String> {
    ///     let percent: u8 = raw
    ///         .strip_suffix('%')
    ///         .ok_or_else(|| format!("'{raw}' is missing the '%' suffix"))?
    ///         .parse()
    ///         .map_err(|_| format!("'{raw}' is not a percentage"))?;
    ///     Ok(Value::other(percent))
    /// }
    ///
    /// let percentage = CustomType::new("percentage", convert);
    /// ```
    pub fn new(name: &'static str, convert: fn(&str) -> Result<Value, String>) -> Self {
        Self { name, convert }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn convert(&self, raw: &str) -> Result<Value, String> {
        (self.convert)(raw)
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.convert == other.convert
    }
}

/// The parameter-type descriptor assigned to a binding, explicitly or by inference.
///
/// Each descriptor knows how to convert one raw Cli token into a [Value](enum.Value.html).
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    /// Signed integer input.
    Int,
    /// Free text input.
    Text,
    /// Real number input.
    Real,
    /// Boolean input (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`).
    Bool,
    /// Uuid input.
    Identifier,
    /// Timestamp input (`%Y-%m-%d`, `%Y-%m-%dT%H:%M:%S`, or `%Y-%m-%d %H:%M:%S`).
    Timestamp,
    /// Filesystem path input.
    Path,
    /// A caller-supplied conversion.
    Custom(CustomType),
}

impl ParamType {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            ParamType::Int => "integer",
            ParamType::Text => "text",
            ParamType::Real => "real",
            ParamType::Bool => "boolean",
            ParamType::Identifier => "identifier",
            ParamType::Timestamp => "timestamp",
            ParamType::Path => "path",
            ParamType::Custom(custom) => custom.name(),
        }
    }

    /// Convert one raw Cli token.
    pub fn convert(&self, raw: &str) -> Result<Value, String> {
        match self {
            ParamType::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("'{raw}' is not an integer")),
            ParamType::Text => Ok(Value::Text(raw.to_string())),
            ParamType::Real => raw
                .parse::<f64>()
                .map(Value::Real)
                .map_err(|_| format!("'{raw}' is not a real number")),
            ParamType::Bool => match raw.to_lowercase().as_str() {
                "1" | "true" | "t" | "yes" | "y" | "on" => Ok(Value::Bool(true)),
                "0" | "false" | "f" | "no" | "n" | "off" => Ok(Value::Bool(false)),
                _ => Err(format!("'{raw}' is not a boolean")),
            },
            ParamType::Identifier => Uuid::parse_str(raw)
                .map(Value::Identifier)
                .map_err(|_| format!("'{raw}' is not an identifier")),
            ParamType::Timestamp => parse_timestamp(raw)
                .map(Value::Timestamp)
                .ok_or_else(|| format!("'{raw}' is not a timestamp")),
            ParamType::Path => Ok(Value::Path(PathBuf::from(raw))),
            ParamType::Custom(custom) => custom.convert(raw),
        }
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Move a collected [Value](enum.Value.html) into a concrete field type.
///
/// Implemented for the built-in scalar types, `Option<T>`, `Vec<T>`, and
/// 2/3-member tuples. Implement it by hand for custom registered types
/// (downcast via [Value::downcast_other](enum.Value.html#method.downcast_other)).
pub trait FromValue: Sized {
    /// Perform the conversion, reporting a message on mismatch.
    fn from_value(value: Value) -> Result<Self, String>;
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {expected}, found {found}", found = value.kind())
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Int(value) => Ok(value),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| format!("{wide} is out of range"))
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        u32::try_from(wide).map_err(|_| format!("{wide} is out of range"))
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        u64::try_from(wide).map_err(|_| format!("{wide} is out of range"))
    }
}

impl FromValue for usize {
    fn from_value(value: Value) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        usize::try_from(wide).map_err(|_| format!("{wide} is out of range"))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Real(value) => Ok(value),
            Value::Int(value) => Ok(value as f64),
            other => Err(mismatch("real", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Text(value) => Ok(value),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Bool(value) => Ok(value),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Identifier(value) => Ok(value),
            other => Err(mismatch("identifier", &other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(value) => Ok(value),
            other => Err(mismatch("timestamp", &other)),
        }
    }
}

impl FromValue for PathBuf {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Path(value) => Ok(value),
            Value::Text(value) => Ok(PathBuf::from(value)),
            other => Err(mismatch("path", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::DontPass => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Seq(values) => values.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("sequence", &other)),
        }
    }
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Tuple(values) if values.len() == 2 => {
                let mut values = values.into_iter();
                let a = values.next().ok_or_else(|| "empty tuple".to_string())?;
                let b = values.next().ok_or_else(|| "short tuple".to_string())?;
                Ok((A::from_value(a)?, B::from_value(b)?))
            }
            other => Err(mismatch("2-tuple", &other)),
        }
    }
}

impl<A: FromValue, B: FromValue, C: FromValue> FromValue for (A, B, C) {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Tuple(values) if values.len() == 3 => {
                let mut values = values.into_iter();
                let a = values.next().ok_or_else(|| "empty tuple".to_string())?;
                let b = values.next().ok_or_else(|| "short tuple".to_string())?;
                let c = values.next().ok_or_else(|| "short tuple".to_string())?;
                Ok((A::from_value(a)?, B::from_value(b)?, C::from_value(c)?))
            }
            other => Err(mismatch("3-tuple", &other)),
        }
    }
}

/// The non-sentinel field values handed to the record constructor or factory.
#[derive(Debug, Default, PartialEq)]
pub struct ValueBag {
    entries: Vec<(String, Value)>,
}

impl ValueBag {
    /// Store a field value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push((name.into(), value));
    }

    /// Remove and return the value for `name`, if one was collected.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    /// The number of remaining values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no values remain.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Failure to construct a record from collected values.
///
/// Propagated unchanged from the record's constructor or factory.
#[derive(Debug, Error)]
pub enum ConstructError {
    /// A field with no record-level default was not supplied.
    #[error("missing value for field '{field}'")]
    MissingField {
        /// The record field.
        field: &'static str,
    },
    /// A collected value did not fit the field's type.
    #[error("field '{field}': {message}")]
    InvalidField {
        /// The record field.
        field: &'static str,
        /// What went wrong.
        message: String,
    },
}

impl ConstructError {
    /// A missing-field error.
    pub fn missing(field: &'static str) -> Self {
        ConstructError::MissingField { field }
    }

    /// An invalid-field error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConstructError::InvalidField {
            field,
            message: message.into(),
        }
    }
}
