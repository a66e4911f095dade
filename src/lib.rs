//! `recbind` binds the fields of a plain Rust struct to command line parameters.
//!
//! Command line parsers make you describe your parameters twice: once as the
//! struct your program actually consumes, and once as the parameter
//! declarations the parser consumes.
//! `recbind` folds the second description into the first.
//! Annotate the struct's fields, and `recbind` derives the parameter
//! declarations from the fields themselves:
//! * *Names* come from the field names (`imply_required` becomes
//!   `--imply-required`), unless the annotation names the parameter
//!   explicitly.
//! * *Types* come from the field types, via a process-wide inference registry
//!   covering `i64`, `String`, `f64`, `bool`, `Uuid`, `NaiveDateTime`, and
//!   `PathBuf` out of the box.
//!   Register your own types with [`register_type_inference`].
//! * *Requiredness* comes from the field's optionality: a non-`Option` option
//!   field with no default is required on the Cli.
//!
//! The actual parsing engine is [clap](https://docs.rs/clap); `recbind` sits
//! in front of it, turning a resolved record type into `clap::Arg`s and the
//! resulting `clap::ArgMatches` back into a constructed record.
//! Parameters you add to the `clap::Command` yourself pass through untouched.
//!
//! # Usage
//! via [derive Api](./derive/index.html):
//! ```
//! use recbind::bind_record;
//! use recbind::clap::Command;
//! use recbind::derive::ArgRecord;
//!
//! #[derive(ArgRecord)]
//! struct Config {
//!     #[bind(option)]
//!     foo: i64,
//!     #[bind(option("--verbose", "-v"), flag)]
//!     verbose: bool,
//! }
//!
//! let bound = bind_record::<Config>().finish().unwrap();
//! let command = bound.augment(Command::new("demo")).unwrap();
//! let matches = command
//!     .try_get_matches_from(vec!["demo", "--foo", "10", "-v"])
//!     .unwrap();
//! let config = bound.extract(&matches).unwrap();
//! assert_eq!(config.foo, 10);
//! assert!(config.verbose);
//! ```
//!
//! # Resolution
//! [`bind_record`] scans the record's fields and resolves each binding in
//! three passes, all at [`Binder::finish`] time (never at parse time):
//! 1. *Names*: every option binding without a `-`-prefixed name gets one
//!    synthesized from its field name.
//! 2. *Types*: every binding without an explicit `param_type` gets one
//!    inferred from its field type, through `Option<..>` wrappers, `Vec<..>`
//!    elements, and tuple members.
//!    An uninferrable type fails resolution with [`BindError::UnknownType`].
//! 3. *Requiredness*: every non-`Option` option field that sets neither
//!    `required` nor `default` becomes required, except flags and
//!    multi-valued parameters, whose omission is already meaningful.
//!
//! # Construction
//! After parsing, the collected values flow back into the record.
//! An omitted parameter collects the [`DONT_PASS`] sentinel, which is dropped
//! before construction so the record's own defaults (`fallback = ..`, `Option`
//! fields, `Default::default()`) apply.
//! `DONT_PASS` can also be set as a binding's `default` to make an inferred
//! required parameter optional without choosing a parser-level value.
//!
//! For handler-style dispatch, [`BoundRecord::call`] constructs the record,
//! injects it into the call (positionally, or under a keyword chosen with
//! [`Binder::keyword`]), and forwards any pass-through parameters.
pub mod derive;
pub use recbind_builder::*;
