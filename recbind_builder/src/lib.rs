//! Builder module for `recbind`.
//! See [documentation root](https://docs.rs/recbind/latest/recbind/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod binding;
mod engine;
mod model;
mod registry;
mod resolve;
mod scan;

pub use api::*;
pub use binding::*;
pub use model::*;
pub use registry::{
    register_type_inference, unregister_type_inference, InferenceScope, RegistryError,
    TypeOverrides,
};
pub use resolve::BindError;
pub use scan::FieldTable;

/// The command line engine; re-exported so that callers and the derive agree
/// on its version.
pub use clap;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
