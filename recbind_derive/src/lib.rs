//! Derive module for `recbind`.
//! See [documentation root](https://docs.rs/recbind/latest/recbind/index.html) for full details.
extern crate proc_macro;

mod generate;
mod load;
mod model;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;

use crate::model::DeriveRecord;

/// Derive `ArgRecord` for a struct with named fields.
///
/// Fields opt in to the command line via `#[bind(..)]` attributes:
///
/// ```ignore
/// #[derive(ArgRecord)]
/// struct Config {
///     #[bind(option)]
///     foo: i64,
///     #[bind(option("--verbose", "-v"), flag)]
///     verbose: bool,
///     #[bind(argument)]
///     target: String,
///     #[bind(flatten)]
///     base: BaseConfig,
///     internal: usize,
/// }
/// ```
///
/// Unannotated fields are constructed from `Default::default()` (or from a
/// `fallback = ..` expression); `flatten` splices in another record's fields.
#[proc_macro_derive(ArgRecord, attributes(bind))]
pub fn arg_record(input: TokenStream) -> TokenStream {
    let ast: syn::DeriveInput = match syn::parse(input) {
        Ok(ast) => ast,
        Err(error) => return error.to_compile_error().into(),
    };

    match DeriveRecord::try_from(&ast).and_then(TokenStream2::try_from) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}
