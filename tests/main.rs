use std::path::PathBuf;

use chrono::NaiveDateTime;
use rstest::rstest;
use uuid::Uuid;

use recbind::clap::{Arg, Command};
use recbind::derive::ArgRecord;
use recbind::{
    bind_record, register_type_inference, BindError, BoundRecord, CustomType, FromValue,
    InferenceScope, InvokeError, ParamType, Value, DONT_PASS,
};

fn bound_command<R: recbind::ArgRecord>() -> (BoundRecord<R>, Command) {
    let bound = bind_record::<R>().finish().unwrap();
    let command = bound
        .augment(Command::new("test").no_binary_name(true))
        .unwrap();
    (bound, command)
}

fn extract<R: recbind::ArgRecord>(cli: Vec<&str>) -> Result<R, InvokeError> {
    let (bound, command) = bound_command::<R>();
    let matches = command.try_get_matches_from(cli)?;
    bound.extract(&matches)
}

fn parse_error<R: recbind::ArgRecord>(cli: Vec<&str>) -> recbind::clap::Error {
    let (_, command) = bound_command::<R>();
    command.try_get_matches_from(cli).unwrap_err()
}

//# Built-in type inference

#[derive(ArgRecord, Debug, PartialEq)]
struct Builtins {
    #[bind(option)]
    int_value: Option<i64>,
    #[bind(option)]
    text_value: Option<String>,
    #[bind(option)]
    real_value: Option<f64>,
    #[bind(option)]
    bool_value: Option<bool>,
    #[bind(option)]
    id_value: Option<Uuid>,
    #[bind(option)]
    stamp_value: Option<NaiveDateTime>,
    #[bind(option)]
    path_value: Option<PathBuf>,
}

#[test]
fn builtins_roundtrip() {
    // Setup
    let id = "550e8400-e29b-41d4-a716-446655440000";

    // Execute
    let config: Builtins = extract(vec![
        "--int-value",
        "10",
        "--text-value",
        "abc",
        "--real-value",
        "1.5",
        "--bool-value",
        "true",
        "--id-value",
        id,
        "--stamp-value",
        "2024-01-02T03:04:05",
        "--path-value",
        "/tmp/x",
    ])
    .unwrap();

    // Verify
    assert_eq!(
        config,
        Builtins {
            int_value: Some(10),
            text_value: Some("abc".to_string()),
            real_value: Some(1.5),
            bool_value: Some(true),
            id_value: Some(Uuid::parse_str(id).unwrap()),
            stamp_value: Some(
                NaiveDateTime::parse_from_str("2024-01-02T03:04:05", "%Y-%m-%dT%H:%M:%S").unwrap()
            ),
            path_value: Some(PathBuf::from("/tmp/x")),
        }
    );
}

#[test]
fn builtins_all_absent() {
    // Execute
    let config: Builtins = extract(vec![]).unwrap();

    // Verify
    assert_eq!(
        config,
        Builtins {
            int_value: None,
            text_value: None,
            real_value: None,
            bool_value: None,
            id_value: None,
            stamp_value: None,
            path_value: None,
        }
    );
}

#[rstest]
#[case("2024-01-02", "2024-01-02T00:00:00")]
#[case("2024-01-02T03:04:05", "2024-01-02T03:04:05")]
#[case("2024-01-02 03:04:05", "2024-01-02T03:04:05")]
fn timestamp_formats(#[case] raw: &str, #[case] expected: &str) {
    // Setup
    let expected = NaiveDateTime::parse_from_str(expected, "%Y-%m-%dT%H:%M:%S").unwrap();

    // Execute
    let config: Builtins = extract(vec!["--stamp-value", raw]).unwrap();

    // Verify
    assert_eq!(config.stamp_value, Some(expected));
}

#[rstest]
#[case(vec!["--int-value", "blah"])]
#[case(vec!["--real-value", "blah"])]
#[case(vec!["--bool-value", "blah"])]
#[case(vec!["--id-value", "blah"])]
#[case(vec!["--stamp-value", "blah"])]
fn builtins_invalid_value_exits_2(#[case] cli: Vec<&str>) {
    // Execute
    let error = parse_error::<Builtins>(cli);

    // Verify
    assert_eq!(error.exit_code(), 2);
}

//# Name resolution

#[derive(ArgRecord, Debug, PartialEq)]
struct Mapped {
    #[bind(option("--foo"))]
    baz: i64,
}

#[test]
fn mapped_name() {
    // Execute: the Cli name is '--foo', the record field is 'baz'.
    let config: Mapped = extract(vec!["--foo", "10"]).unwrap();

    // Verify
    assert_eq!(config, Mapped { baz: 10 });
}

#[derive(ArgRecord, Debug, PartialEq)]
struct Underscored {
    #[bind(option)]
    imply_required: i64,
}

#[test]
fn synthesized_name() {
    // Execute: underscores become dashes in the synthesized name.
    let config: Underscored = extract(vec!["--imply-required", "10"]).unwrap();

    // Verify
    assert_eq!(config, Underscored { imply_required: 10 });
}

#[test]
fn bind_twice_no_shared_state() {
    // Setup
    let first = bind_record::<Mapped>().finish().unwrap();
    let second = bind_record::<Mapped>().finish().unwrap();

    // Verify: a second resolution starts from fresh field specs.
    assert_eq!(
        first.table().binding("baz").unwrap().args(),
        &["baz".to_string(), "--foo".to_string()]
    );
    assert_eq!(
        first.table().binding("baz").unwrap().args(),
        second.table().binding("baz").unwrap().args(),
    );
}

//# Requiredness inference

#[test]
fn implied_required_missing_exits_2() {
    // Execute
    let error = parse_error::<Underscored>(vec![]);

    // Verify
    assert_eq!(error.exit_code(), 2);
}

#[derive(ArgRecord, Debug, PartialEq)]
struct Defaulted {
    #[bind(option, default = 10)]
    foo: i64,
}

#[test]
fn default_suppresses_required() {
    // Execute
    let config: Defaulted = extract(vec![]).unwrap();

    // Verify
    assert_eq!(config, Defaulted { foo: 10 });
}

#[derive(ArgRecord, Debug, PartialEq)]
struct SentinelDefaulted {
    #[bind(option, default = DONT_PASS, fallback = 7)]
    foo: i64,
}

#[test]
fn sentinel_default_defers_to_fallback() {
    // Execute: the sentinel default suppresses requiredness without choosing
    // a parser-level value, so the record-side fallback applies.
    let config: SentinelDefaulted = extract(vec![]).unwrap();

    // Verify
    assert_eq!(config, SentinelDefaulted { foo: 7 });
}

#[test]
fn sentinel_default_overridden_on_cli() {
    // Execute
    let config: SentinelDefaulted = extract(vec!["--foo", "3"]).unwrap();

    // Verify
    assert_eq!(config, SentinelDefaulted { foo: 3 });
}

#[derive(ArgRecord, Debug, PartialEq)]
struct Unrequired {
    #[bind(option, required = false)]
    foo: Option<i64>,
}

#[test]
fn explicit_required_false() {
    // Execute
    let config: Unrequired = extract(vec![]).unwrap();

    // Verify
    assert_eq!(config, Unrequired { foo: None });
}

//# Flags

#[derive(ArgRecord, Debug, PartialEq)]
struct Flags {
    #[bind(option("--verbose", "-v"), flag)]
    verbose: bool,
}

#[test]
fn flag_present() {
    // Execute
    let config: Flags = extract(vec!["-v"]).unwrap();

    // Verify
    assert_eq!(config, Flags { verbose: true });
}

#[test]
fn flag_absent() {
    // Execute: flags are never required; omission collects false.
    let config: Flags = extract(vec![]).unwrap();

    // Verify
    assert_eq!(config, Flags { verbose: false });
}

//# Shapes: arguments, tuples, repeats

#[derive(ArgRecord, Debug, PartialEq)]
struct Shapes {
    #[bind(argument)]
    name: String,
    #[bind(option, nargs = 2)]
    point: (i64, f64),
    #[bind(option, multiple)]
    items: Vec<i64>,
}

#[test]
fn shapes_roundtrip() {
    // Execute
    let config: Shapes = extract(vec![
        "abc", "--point", "1", "2.5", "--items", "1", "--items", "2",
    ])
    .unwrap();

    // Verify
    assert_eq!(
        config,
        Shapes {
            name: "abc".to_string(),
            point: (1, 2.5),
            items: vec![1, 2],
        }
    );
}

#[test]
fn shapes_absent_multiple_collects_empty() {
    // Execute
    let config: Shapes = extract(vec!["abc", "--point", "1", "2.5"]).unwrap();

    // Verify
    assert_eq!(config.items, Vec::<i64>::default());
}

#[test]
fn shapes_missing_argument_exits_2() {
    // Execute
    let error = parse_error::<Shapes>(vec!["--point", "1", "2.5"]);

    // Verify
    assert_eq!(error.exit_code(), 2);
}

//# Custom types

#[derive(Debug, Clone, Copy, PartialEq)]
struct Percent(u8);

impl FromValue for Percent {
    fn from_value(value: Value) -> Result<Self, String> {
        value
            .downcast_other::<Percent>()
            .copied()
            .ok_or_else(|| "expected a percent value".to_string())
    }
}

fn convert_percent(raw: &str) -> Result<Value, String> {
    let digits = raw
        .strip_suffix('%')
        .ok_or_else(|| format!("'{raw}' is missing the '%' suffix"))?;
    let value: u8 = digits
        .parse()
        .map_err(|_| format!("'{raw}' is not a percentage"))?;
    Ok(Value::other(Percent(value)))
}

fn percent_type() -> ParamType {
    ParamType::Custom(CustomType::new("percent", convert_percent))
}

#[derive(ArgRecord, Debug, PartialEq)]
struct Explicit {
    #[bind(option, param_type = percent_type())]
    ratio: Percent,
}

#[test]
fn explicit_param_type_suppresses_inference() {
    // Execute: 'Percent' has no registered inference, yet resolution succeeds.
    let config: Explicit = extract(vec!["--ratio", "50%"]).unwrap();

    // Verify
    assert_eq!(config, Explicit { ratio: Percent(50) });
}

#[test]
fn explicit_param_type_invalid_exits_2() {
    // Execute
    let error = parse_error::<Explicit>(vec!["--ratio", "50"]);

    // Verify
    assert_eq!(error.exit_code(), 2);
}

#[derive(ArgRecord, Debug, PartialEq)]
struct Registered {
    #[bind(option)]
    ratio: Percent,
}

#[test]
fn registered_type_inference() {
    // Setup
    let _scope = InferenceScope::new();
    register_type_inference::<Percent>(percent_type(), false).unwrap();

    // Execute
    let config: Registered = extract(vec!["--ratio", "25%"]).unwrap();

    // Verify
    assert_eq!(config, Registered { ratio: Percent(25) });
}

#[derive(Debug)]
struct Widget;

impl FromValue for Widget {
    fn from_value(_: Value) -> Result<Self, String> {
        Err("unsupported".to_string())
    }
}

#[derive(ArgRecord, Debug)]
struct Uninferrable {
    #[bind(option)]
    widget: Widget,
}

#[test]
fn unknown_type_fails_resolution() {
    // Execute: resolution fails when binding, not when parsing.
    let error = bind_record::<Uninferrable>().finish().unwrap_err();

    // Verify
    assert!(matches!(error, BindError::UnknownType { field: "widget", .. }));
    assert!(error.to_string().contains("Widget"));
    assert!(error.to_string().contains("param_type"));
}

//# Call injection

#[test]
fn call_injects_record_positionally() {
    // Setup
    let (bound, command) = bound_command::<Mapped>();
    let matches = command.try_get_matches_from(vec!["--foo", "10"]).unwrap();
    let values = bound.collect(&matches).unwrap();

    // Execute
    let observed = bound
        .call(values, |values| {
            let config: &Mapped = values.args()[0].downcast_record().unwrap();
            config.baz
        })
        .unwrap();

    // Verify
    assert_eq!(observed, 10);
}

#[test]
fn call_injects_record_keyword() {
    // Setup
    let bound = bind_record::<Mapped>().keyword("cfg").finish().unwrap();
    let command = bound
        .augment(Command::new("test").no_binary_name(true))
        .unwrap();
    let matches = command.try_get_matches_from(vec!["--foo", "10"]).unwrap();
    let values = bound.collect(&matches).unwrap();

    // Execute
    let observed = bound
        .call(values, |values| {
            assert!(values.args().is_empty());
            let config: &Mapped = values.kwarg("cfg").unwrap().downcast_record().unwrap();
            config.baz
        })
        .unwrap();

    // Verify
    assert_eq!(observed, 10);
}

#[test]
fn extra_parameters_pass_through() {
    // Setup
    let bound = bind_record::<Mapped>().finish().unwrap();
    let command = bound
        .augment(Command::new("test").no_binary_name(true))
        .unwrap()
        .arg(Arg::new("extra").long("extra"));
    let matches = command
        .try_get_matches_from(vec!["--foo", "10", "--extra", "abc"])
        .unwrap();
    let values = bound.collect(&matches).unwrap();

    // Execute
    let observed = bound
        .call(values, |values| {
            let config: &Mapped = values.args()[0].downcast_record().unwrap();
            (config.baz, values.kwarg("extra").cloned())
        })
        .unwrap();

    // Verify
    assert_eq!(observed, (10, Some(Value::Text("abc".to_string()))));
}

//# Flatten

#[derive(ArgRecord, Debug, PartialEq)]
struct Base {
    #[bind(option, flag)]
    verbose: bool,
}

#[derive(ArgRecord, Debug, PartialEq)]
struct Derived {
    #[bind(flatten)]
    base: Base,
    #[bind(option)]
    foo: i64,
}

#[test]
fn flatten_splices_fields() {
    // Execute
    let config: Derived = extract(vec!["--foo", "1", "--verbose"]).unwrap();

    // Verify
    assert_eq!(
        config,
        Derived {
            base: Base { verbose: true },
            foo: 1,
        }
    );
}

//# Unbound fields

#[derive(ArgRecord, Debug, PartialEq)]
struct Partial {
    #[bind(option)]
    foo: i64,
    internal: usize,
    #[bind(fallback = 42)]
    tuned: i64,
}

#[test]
fn unbound_fields_never_touch_the_cli() {
    // Execute
    let config: Partial = extract(vec!["--foo", "1"]).unwrap();

    // Verify
    assert_eq!(
        config,
        Partial {
            foo: 1,
            internal: 0,
            tuned: 42,
        }
    );
}
