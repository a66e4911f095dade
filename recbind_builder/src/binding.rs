use crate::model::{ConstructError, ParamType, TypeHint, Value, ValueBag};

/// Which of the two parameter kinds a binding declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declarator {
    /// An option-like parameter, specified via `--..`/`-..` syntax.
    Option,
    /// An argument-like parameter, specified positionally.
    Argument,
}

/// A keyword value stored on a [Binding](struct.Binding.html).
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A boolean keyword (`is_flag`, `multiple`, `required`).
    Bool(bool),
    /// An integer keyword (`nargs`).
    Int(i64),
    /// A text keyword (`help`).
    Text(String),
    /// A value keyword (`default`).
    Value(Value),
    /// A parameter-type keyword (`type`).
    ParamType(ParamType),
    /// Per-member parameter types for a fixed-arity binding.
    ParamTypes(Vec<ParamType>),
}

/// One declared parameter binding: a deferred declaration carrying the
/// declarator kind plus the positional and keyword arguments it will be
/// applied with.
///
/// Build one with [option()](fn.option.html) or [argument()](fn.argument.html);
/// the resolution pass fills in anything left unspecified.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    declarator: Declarator,
    args: Vec<String>,
    kwargs: Vec<(&'static str, AttrValue)>,
}

/// Declare an option binding.
///
/// ### Example
/// ```
/// use recbind_builder::option;
///
/// option().name("--foo").name("-f").help("The foo value.");
/// ```
pub fn option() -> Binding {
    Binding::new(Declarator::Option)
}

/// Declare an argument binding.
///
/// ### Example
/// ```
/// use recbind_builder::argument;
///
/// argument().help("The foo value.");
/// ```
pub fn argument() -> Binding {
    Binding::new(Declarator::Argument)
}

impl Binding {
    fn new(declarator: Declarator) -> Self {
        Self {
            declarator,
            args: Vec::default(),
            kwargs: Vec::default(),
        }
    }

    /// The declarator kind of this binding.
    pub fn declarator(&self) -> Declarator {
        self.declarator
    }

    /// Add a parameter name (`--long` or `-s` for options).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.args.push(name.into());
        self
    }

    /// Document the help message for this parameter.
    pub fn help(self, text: impl Into<String>) -> Self {
        self.with_kwarg("help", AttrValue::Text(text.into()))
    }

    /// Declare a boolean flag (no value on the Cli).
    pub fn flag(self) -> Self {
        self.with_kwarg("is_flag", AttrValue::Bool(true))
    }

    /// Declare a multi-valued parameter.
    pub fn multiple(self) -> Self {
        self.with_kwarg("multiple", AttrValue::Bool(true))
    }

    /// Declare a fixed arity greater than one.
    pub fn nargs(self, count: usize) -> Self {
        self.with_kwarg("nargs", AttrValue::Int(count as i64))
    }

    /// Set requiredness explicitly, suppressing inference.
    pub fn required(self, required: bool) -> Self {
        self.with_kwarg("required", AttrValue::Bool(required))
    }

    /// Set a parser-level default, suppressing requiredness inference.
    /// Pass [DONT_PASS](constant.DONT_PASS.html) to defer to the record's own default.
    pub fn default(self, value: impl Into<Value>) -> Self {
        self.with_kwarg("default", AttrValue::Value(value.into()))
    }

    /// Set the parameter type explicitly, suppressing type inference.
    pub fn param_type(self, param_type: ParamType) -> Self {
        self.with_kwarg("type", AttrValue::ParamType(param_type))
    }

    fn with_kwarg(mut self, key: &'static str, value: AttrValue) -> Self {
        self.set_kwarg(key, value);
        self
    }

    /// The positional arguments, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Look up a keyword argument.
    pub fn kwarg(&self, key: &str) -> Option<&AttrValue> {
        self.kwargs
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    /// Whether a keyword argument is present.
    pub fn has_kwarg(&self, key: &str) -> bool {
        self.kwarg(key).is_some()
    }

    pub(crate) fn prepend_arg(&mut self, arg: impl Into<String>) {
        self.args.insert(0, arg.into());
    }

    pub(crate) fn set_kwarg(&mut self, key: &'static str, value: AttrValue) {
        match self.kwargs.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => *existing = value,
            None => self.kwargs.push((key, value)),
        }
    }
}

/// A metadata value attached to a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
    /// A parameter binding; the first one on a field wins.
    Binding(Binding),
    /// Free-form metadata, ignored by the scanner.
    Note(String),
}

/// One field of a record type, as reported by [ArgRecord::fields](trait.ArgRecord.html#tymethod.fields).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: &'static str,
    hint: TypeHint,
    metadata: Vec<Metadata>,
}

impl FieldSpec {
    /// Describe a field: its name, its structural type hint, and its attached metadata.
    pub fn new(name: &'static str, hint: TypeHint, metadata: Vec<Metadata>) -> Self {
        Self {
            name,
            hint,
            metadata,
        }
    }

    /// The field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The field's structural type hint.
    pub fn hint(&self) -> &TypeHint {
        &self.hint
    }

    pub(crate) fn into_parts(self) -> (&'static str, TypeHint, Vec<Metadata>) {
        (self.name, self.hint, self.metadata)
    }
}

/// A record type whose fields can drive command line parameters.
///
/// Usually implemented via `#[derive(ArgRecord)]`; implement it by hand to
/// control field specs or construction precisely.
pub trait ArgRecord: Sized + 'static {
    /// The record's fields in declaration order, fresh on every call so that
    /// resolution passes for different commands never share binding state.
    fn fields() -> Vec<FieldSpec>;

    /// Construct the record from the collected, non-sentinel field values.
    /// Omitted fields fall back to the record's own defaults; a field with no
    /// default reports [ConstructError::MissingField](enum.ConstructError.html).
    fn construct(values: &mut ValueBag) -> Result<Self, ConstructError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_binding() {
        // Execute
        let binding = option().name("--foo").name("-f").help("help message");

        // Verify
        assert_eq!(binding.declarator(), Declarator::Option);
        assert_eq!(binding.args(), &["--foo".to_string(), "-f".to_string()]);
        assert_eq!(
            binding.kwarg("help"),
            Some(&AttrValue::Text("help message".to_string()))
        );
    }

    #[test]
    fn argument_binding() {
        // Execute
        let binding = argument();

        // Verify
        assert_eq!(binding.declarator(), Declarator::Argument);
        assert!(binding.args().is_empty());
        assert!(!binding.has_kwarg("help"));
    }

    #[test]
    fn kwarg_overwrite() {
        // Setup
        let binding = option().required(false).required(true);

        // Verify: mapping semantics, the later value wins without duplication.
        assert_eq!(binding.kwarg("required"), Some(&AttrValue::Bool(true)));
        assert_eq!(
            binding
                .kwargs
                .iter()
                .filter(|(key, _)| *key == "required")
                .count(),
            1
        );
    }

    #[test]
    fn default_sentinel() {
        // Setup
        let binding = option().default(crate::model::DONT_PASS);

        // Verify
        assert_eq!(
            binding.kwarg("default"),
            Some(&AttrValue::Value(Value::DontPass))
        );
    }

    #[test]
    fn prepend_arg() {
        // Setup
        let mut binding = option().name("--foo");

        // Execute
        binding.prepend_arg("baz");

        // Verify
        assert_eq!(binding.args(), &["baz".to_string(), "--foo".to_string()]);
    }
}
