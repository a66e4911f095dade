use clap::{ArgMatches, Command};
use thiserror::Error;

use crate::binding::ArgRecord;
use crate::engine;
use crate::model::{ConstructError, Value, ValueBag, DONT_PASS};
use crate::registry::TypeOverrides;
use crate::resolve::{self, BindError};
use crate::scan::FieldTable;

/// The values flowing into a call: positional values plus keyword values.
///
/// [BoundRecord::collect](struct.BoundRecord.html#method.collect) fills one of
/// these from parsed matches; [BoundRecord::call](struct.BoundRecord.html#method.call)
/// injects the constructed record and hands the rest through to the handler.
#[derive(Debug, Default, PartialEq)]
pub struct CallValues {
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
}

impl CallValues {
    /// Append a positional value.
    pub fn push_arg(&mut self, value: Value) {
        self.args.push(value);
    }

    /// Insert a positional value at the front.
    pub fn prepend_arg(&mut self, value: Value) {
        self.args.insert(0, value);
    }

    /// Store a keyword value.
    pub fn insert_kwarg(&mut self, name: impl Into<String>, value: Value) {
        self.kwargs.push((name.into(), value));
    }

    /// Remove and return the keyword value for `name`, if present.
    pub fn pop_kwarg(&mut self, name: &str) -> Option<Value> {
        let index = self.kwargs.iter().position(|(key, _)| key == name)?;
        Some(self.kwargs.remove(index).1)
    }

    /// Look up a keyword value.
    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// The positional values, in order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The keyword values, in insertion order.
    pub fn kwargs(&self) -> &[(String, Value)] {
        &self.kwargs
    }
}

/// Failure at invocation time: either the engine rejected the command line, or
/// the collected values did not construct the record.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The engine rejected the command line.
    #[error(transparent)]
    Parse(#[from] clap::Error),
    /// The collected values did not construct the record.
    #[error(transparent)]
    Construct(#[from] ConstructError),
}

/// Bind the record type `R`'s fields to command line parameters.
///
/// Resolution runs at [Binder::finish](struct.Binder.html#method.finish):
/// names, parameter types, and requiredness are all settled there, against the
/// type-inference registry as it stands at that moment.
///
/// ### Example
/// ```
/// use recbind_builder::*;
/// use clap::Command;
///
/// struct Config {
///     foo: i64,
/// }
///
/// impl ArgRecord for Config {
///     fn fields() -> Vec<FieldSpec> {
///         vec![FieldSpec::new(
///             "foo",
///             TypeHint::scalar::<i64>(),
///             vec![Metadata::Binding(option())],
///         )]
///     }
///
///     fn construct(values: &mut ValueBag) -> Result<Self, ConstructError> {
///         Ok(Self {
///             foo: match values.take("foo") {
///                 Some(value) => FromValue::from_value(value)
///                     .map_err(|message| ConstructError::invalid("foo", message))?,
///                 None => return Err(ConstructError::missing("foo")),
///             },
///         })
///     }
/// }
///
/// let bound = bind_record::<Config>().finish().unwrap();
/// let command = bound.augment(Command::new("demo")).unwrap();
/// let matches = command
///     .try_get_matches_from(vec!["demo", "--foo", "10"])
///     .unwrap();
/// let config = bound.extract(&matches).unwrap();
/// assert_eq!(config.foo, 10);
/// ```
pub fn bind_record<R: ArgRecord>() -> Binder<R> {
    Binder {
        keyword: None,
        overrides: None,
        factory: None,
    }
}

/// Builder for a [BoundRecord](struct.BoundRecord.html); see [bind_record](fn.bind_record.html).
pub struct Binder<R: ArgRecord> {
    keyword: Option<String>,
    overrides: Option<TypeOverrides>,
    factory: Option<FactoryFn<R>>,
}

type FactoryFn<R> = Box<dyn Fn(&mut ValueBag) -> Result<R, ConstructError>>;

impl<R: ArgRecord> Binder<R> {
    /// Inject the constructed record into calls as the keyword `name` instead
    /// of as the leading positional value.
    pub fn keyword(mut self, name: impl Into<String>) -> Self {
        self.keyword = Some(name.into());
        self
    }

    /// Merge per-binder type inferences on top of the process-wide registry.
    pub fn type_overrides(mut self, overrides: TypeOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Construct the record through `factory` instead of
    /// [ArgRecord::construct](trait.ArgRecord.html#tymethod.construct).
    pub fn factory(
        mut self,
        factory: impl Fn(&mut ValueBag) -> Result<R, ConstructError> + 'static,
    ) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Resolve the record's bindings.
    ///
    /// Scans a fresh set of field specs, so binding two commands to the same
    /// record type never shares resolution state.
    pub fn finish(self) -> Result<BoundRecord<R>, BindError> {
        let mut table = FieldTable::scan(R::fields());
        resolve::patch_names(&mut table);
        resolve::patch_types(&mut table, self.overrides.as_ref())?;
        resolve::patch_required(&mut table)?;
        Ok(BoundRecord {
            table,
            keyword: self.keyword,
            factory: self.factory,
        })
    }
}

/// A record type with fully resolved parameter bindings, ready to augment a
/// command and to reconstruct records from its matches.
pub struct BoundRecord<R: ArgRecord> {
    table: FieldTable,
    keyword: Option<String>,
    factory: Option<FactoryFn<R>>,
}

impl<R: ArgRecord> std::fmt::Debug for BoundRecord<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundRecord")
            .field("table", &self.table)
            .field("keyword", &self.keyword)
            .field("factory", &self.factory.as_ref().map(|_| ".."))
            .finish()
    }
}

impl<R: ArgRecord> BoundRecord<R> {
    /// The resolved field table.
    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    /// Add one parameter per bound field to `command`.
    pub fn augment(&self, command: Command) -> Result<Command, BindError> {
        engine::augment(&self.table, command)
    }

    /// Collect parsed matches into call values, converting raw tokens via each
    /// binding's parameter type. Parameters outside the bound fields pass
    /// through as extra keyword values.
    pub fn collect(&self, matches: &ArgMatches) -> Result<CallValues, clap::Error> {
        engine::collect(&self.table, matches)
    }

    /// Construct the record, consuming its fields out of `values`.
    ///
    /// Sentinel values are dropped rather than passed, so the record's own
    /// defaults apply to omitted parameters.
    pub fn construct(&self, values: &mut CallValues) -> Result<R, ConstructError> {
        let mut bag = ValueBag::default();
        for name in self.table.names() {
            let value = values.pop_kwarg(name).unwrap_or(DONT_PASS);
            if !value.is_dont_pass() {
                bag.insert(name, value);
            }
        }
        match &self.factory {
            Some(factory) => factory(&mut bag),
            None => R::construct(&mut bag),
        }
    }

    /// Construct the record, inject it into `values` (positionally, or under
    /// the configured keyword), and invoke the handler with what remains.
    pub fn call<T>(
        &self,
        mut values: CallValues,
        handler: impl FnOnce(CallValues) -> T,
    ) -> Result<T, ConstructError> {
        let record = self.construct(&mut values)?;
        match &self.keyword {
            Some(keyword) => values.insert_kwarg(keyword.clone(), Value::record(record)),
            None => values.prepend_arg(Value::record(record)),
        }
        Ok(handler(values))
    }

    /// Collect and construct in one step, for callers that only want the record.
    pub fn extract(&self, matches: &ArgMatches) -> Result<R, InvokeError> {
        let mut values = self.collect(matches)?;
        Ok(self.construct(&mut values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{option, FieldSpec, Metadata};
    use crate::model::{FromValue, TypeHint};

    #[derive(Debug, PartialEq)]
    struct Config {
        foo: i64,
        quiet: Option<bool>,
    }

    impl ArgRecord for Config {
        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new(
                    "foo",
                    TypeHint::scalar::<i64>(),
                    vec![Metadata::Binding(option())],
                ),
                FieldSpec::new(
                    "quiet",
                    TypeHint::optional(TypeHint::scalar::<bool>()),
                    vec![Metadata::Binding(option().flag())],
                ),
            ]
        }

        fn construct(values: &mut ValueBag) -> Result<Self, ConstructError> {
            Ok(Self {
                foo: match values.take("foo") {
                    Some(value) => FromValue::from_value(value)
                        .map_err(|message| ConstructError::invalid("foo", message))?,
                    None => return Err(ConstructError::missing("foo")),
                },
                quiet: match values.take("quiet") {
                    Some(value) => FromValue::from_value(value)
                        .map_err(|message| ConstructError::invalid("quiet", message))?,
                    None => None,
                },
            })
        }
    }

    fn matches_of(bound: &BoundRecord<Config>, cli: Vec<&str>) -> ArgMatches {
        bound
            .augment(Command::new("test").no_binary_name(true))
            .unwrap()
            .try_get_matches_from(cli)
            .unwrap()
    }

    #[test]
    fn extract_record() {
        // Setup
        let bound = bind_record::<Config>().finish().unwrap();
        let matches = matches_of(&bound, vec!["--foo", "10", "--quiet"]);

        // Execute
        let config = bound.extract(&matches).unwrap();

        // Verify
        assert_eq!(
            config,
            Config {
                foo: 10,
                quiet: Some(true),
            }
        );
    }

    #[test]
    fn construct_missing_field() {
        // Setup
        let bound = bind_record::<Config>().finish().unwrap();
        let mut values = CallValues::default();

        // Execute
        let error = bound.construct(&mut values).unwrap_err();

        // Verify
        assert_matches!(error, ConstructError::MissingField { field: "foo" });
    }

    #[test]
    fn call_injects_positionally() {
        // Setup
        let bound = bind_record::<Config>().finish().unwrap();
        let matches = matches_of(&bound, vec!["--foo", "10"]);
        let values = bound.collect(&matches).unwrap();

        // Execute
        let observed = bound
            .call(values, |values| {
                let config: &Config = values.args()[0].downcast_record().unwrap();
                config.foo
            })
            .unwrap();

        // Verify
        assert_eq!(observed, 10);
    }

    #[test]
    fn call_injects_keyword() {
        // Setup
        let bound = bind_record::<Config>().keyword("cfg").finish().unwrap();
        let matches = matches_of(&bound, vec!["--foo", "10"]);
        let values = bound.collect(&matches).unwrap();

        // Execute
        let observed = bound
            .call(values, |values| {
                assert!(values.args().is_empty());
                let config: &Config = values.kwarg("cfg").unwrap().downcast_record().unwrap();
                config.foo
            })
            .unwrap();

        // Verify
        assert_eq!(observed, 10);
    }

    #[test]
    fn call_passes_extras_through() {
        // Setup
        let bound = bind_record::<Config>().finish().unwrap();
        let matches = bound
            .augment(Command::new("test").no_binary_name(true))
            .unwrap()
            .arg(clap::Arg::new("extra").long("extra"))
            .try_get_matches_from(vec!["--foo", "10", "--extra", "abc"])
            .unwrap();
        let values = bound.collect(&matches).unwrap();

        // Execute & verify: the record's fields are consumed, the extra is not.
        bound
            .call(values, |values| {
                assert_eq!(
                    values.kwarg("extra"),
                    Some(&Value::Text("abc".to_string()))
                );
                assert!(values.kwarg("foo").is_none());
            })
            .unwrap();
    }

    #[test]
    fn factory_construction() {
        // Setup
        let bound = bind_record::<Config>()
            .factory(|values| {
                let foo: i64 = match values.take("foo") {
                    Some(value) => FromValue::from_value(value)
                        .map_err(|message| ConstructError::invalid("foo", message))?,
                    None => 0,
                };
                Ok(Config {
                    foo: foo * 2,
                    quiet: None,
                })
            })
            .finish()
            .unwrap();
        let matches = matches_of(&bound, vec!["--foo", "10"]);

        // Execute
        let config = bound.extract(&matches).unwrap();

        // Verify
        assert_eq!(config.foo, 20);
    }

    #[test]
    fn bind_twice_no_shared_state() {
        // Setup
        let first = bind_record::<Config>().finish().unwrap();
        let second = bind_record::<Config>().finish().unwrap();

        // Verify: each resolution names the parameters independently.
        assert_eq!(
            first.table().binding("foo").unwrap().args(),
            second.table().binding("foo").unwrap().args(),
        );
        assert_eq!(
            first.table().binding("foo").unwrap().args(),
            &["foo".to_string(), "--foo".to_string()]
        );
    }
}
