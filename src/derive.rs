//! Derive Api for `recbind` configuration.
//!
//! ### Getting Started
//! Instrument a struct with `#[derive(ArgRecord)]` and annotate the fields
//! that should appear on the command line:
//!
//! ```
//! use recbind::bind_record;
//! use recbind::clap::Command;
//! use recbind::derive::ArgRecord;
//!
//! #[derive(ArgRecord)]
//! struct Config {
//!     #[bind(argument)]
//!     target: String,
//!     #[bind(option)]
//!     retries: Option<i64>,
//! }
//!
//! let bound = bind_record::<Config>().finish().unwrap();
//! let command = bound.augment(Command::new("demo")).unwrap();
//! let matches = command
//!     .try_get_matches_from(vec!["demo", "abc"])
//!     .unwrap();
//! let config = bound.extract(&matches).unwrap();
//! assert_eq!(config.target, "abc");
//! assert_eq!(config.retries, None);
//! ```
//!
//! ### Field Attributes
//! A field participates in the command line when its `#[bind(..)]` attribute
//! carries a declarator:
//! * `#[bind(option)]` or `#[bind(argument)]` declares the parameter kind.
//!   Only one may be used on the same field.
//! * `#[bind(option("--name", "-n"))]` additionally sets the parameter names.
//!   Without names, options are named after the field (`my_field` becomes
//!   `--my-field`); arguments are always positional.
//! * `#[bind(option, flag)]` declares a boolean flag, collecting `true` when
//!   present and `false` when absent.
//! * `#[bind(option, multiple)]` declares a repeatable parameter; the field
//!   type must be `Vec<..>` for type inference to apply.
//! * `#[bind(option, nargs = N)]` declares a fixed arity of `N` values; the
//!   field type must be an `N`-member tuple for type inference to apply.
//! * `#[bind(option, required = B)]`, `#[bind(option, default = V)]`, and
//!   `#[bind(option, help = "..")]` pass through to the binding, suppressing
//!   the corresponding inference.
//!   `default = DONT_PASS` defers to the record-side default instead.
//! * `#[bind(option, param_type = P)]` sets the [ParamType](../enum.ParamType.html)
//!   explicitly, suppressing type inference; `P` is any `ParamType` expression.
//!
//! ### Record Attributes
//! * `#[bind(flatten)]` splices another `ArgRecord` type's fields into this
//!   record, the equivalent of record inheritance.
//! * `#[bind(fallback = E)]` constructs the field from the expression `E` when
//!   no value was collected, instead of requiring one.
//! * Fields without any `#[bind(..)]` declarator never touch the command
//!   line; they are constructed from `fallback` or `Default::default()`.
//!
//! ### Type Inference
//! The field type drives the inferred parameter type:
//! ```console
//! Type          | Inference
//! ---------------------------------------------------
//! Option<T>     | as T, and the parameter is not required
//! Vec<T>        | as T per value (requires `multiple`)
//! (A, B, ..)    | as A, B, .. per position (requires `nargs`)
//! T             | registry lookup for T
//! ```
//! The registry seeds `i64`, `String`, `f64`, `bool`, `Uuid`, `NaiveDateTime`,
//! and `PathBuf`; extend it with
//! [register_type_inference](../fn.register_type_inference.html), or per
//! binder with [Binder::type_overrides](../struct.Binder.html#method.type_overrides).

pub use recbind_derive::*;
