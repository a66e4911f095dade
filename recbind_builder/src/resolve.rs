use thiserror::Error;

use crate::binding::{AttrValue, Declarator};
use crate::engine::Trial;
use crate::model::{ParamType, TypeHint};
use crate::registry::{self, TypeOverrides};
use crate::scan::FieldTable;

/// Failure to resolve a record type's bindings at decoration time.
#[derive(Debug, Error)]
pub enum BindError {
    /// No inference is registered for the field's type and none was supplied.
    #[error("cannot infer a parameter type for field '{field}' of type {type_name}; set param_type explicitly")]
    UnknownType {
        /// The record field.
        field: &'static str,
        /// The uninferrable type.
        type_name: String,
    },
    /// The field's type shape does not fit the binding's runtime behaviour.
    #[error("field '{field}' of type {type_name} cannot drive a {expected} parameter")]
    ShapeMismatch {
        /// The record field.
        field: &'static str,
        /// The field's type.
        type_name: String,
        /// The behaviour the binding declares.
        expected: String,
    },
    /// A fixed-arity binding and its tuple type disagree on member count.
    #[error("field '{field}' takes {expected} values but its type {type_name} has {actual} members")]
    ArityMismatch {
        /// The record field.
        field: &'static str,
        /// The field's tuple type.
        type_name: String,
        /// The arity the binding declares.
        expected: usize,
        /// The member count of the tuple type.
        actual: usize,
    },
    /// The binding's arguments cannot form a parameter at all.
    #[error("field '{field}': {message}")]
    InvalidBinding {
        /// The record field.
        field: &'static str,
        /// What went wrong.
        message: String,
    },
}

/// Ensure every binding carries a user-facing parameter name, then prepend the
/// field name so the engine reports results keyed by field name.
/// Runs exactly once per resolution pass.
pub(crate) fn patch_names(table: &mut FieldTable) {
    for entry in table.iter_mut() {
        if entry.binding.declarator() == Declarator::Option
            && !entry.binding.args().iter().any(|arg| arg.starts_with('-'))
        {
            entry.binding.prepend_arg(option_name(entry.name));
        }
        entry.binding.prepend_arg(entry.name);
    }
}

fn option_name(field_name: &str) -> String {
    format!("--{}", field_name.to_lowercase().replace('_', "-"))
}

/// Assign a parameter type to every binding that lacks an explicit one,
/// consulting the process-wide registry (with `overrides` merged on top).
pub(crate) fn patch_types(
    table: &mut FieldTable,
    overrides: Option<&TypeOverrides>,
) -> Result<(), BindError> {
    for entry in table.iter_mut() {
        if entry.binding.has_kwarg("type") {
            continue;
        }

        let (hint, _) = entry.hint.unwrap_optional();
        let trial = Trial::probe(entry.name, &entry.binding)?;

        if trial.is_flag {
            // Flags collect no value; nothing to infer.
            continue;
        }

        if trial.multiple {
            let TypeHint::Repeated(element) = hint else {
                return Err(BindError::ShapeMismatch {
                    field: entry.name,
                    type_name: hint.describe(),
                    expected: "multi-valued".to_string(),
                });
            };
            let param_type = lookup_scalar(entry.name, element, overrides)?;
            entry
                .binding
                .set_kwarg("type", AttrValue::ParamType(param_type));
            continue;
        }

        if trial.arity > 1 {
            let TypeHint::Tuple(members) = hint else {
                return Err(BindError::ShapeMismatch {
                    field: entry.name,
                    type_name: hint.describe(),
                    expected: format!("{}-value", trial.arity),
                });
            };
            if members.len() != trial.arity {
                return Err(BindError::ArityMismatch {
                    field: entry.name,
                    type_name: hint.describe(),
                    expected: trial.arity,
                    actual: members.len(),
                });
            }
            let mut param_types = Vec::with_capacity(members.len());
            for member in members {
                param_types.push(lookup_scalar(entry.name, member, overrides)?);
            }
            entry
                .binding
                .set_kwarg("type", AttrValue::ParamTypes(param_types));
            continue;
        }

        let param_type = lookup_scalar(entry.name, hint, overrides)?;
        entry
            .binding
            .set_kwarg("type", AttrValue::ParamType(param_type));
    }
    Ok(())
}

fn lookup_scalar(
    field: &'static str,
    hint: &TypeHint,
    overrides: Option<&TypeOverrides>,
) -> Result<ParamType, BindError> {
    let TypeHint::Scalar(key) = hint else {
        return Err(BindError::ShapeMismatch {
            field,
            type_name: hint.describe(),
            expected: "single-value".to_string(),
        });
    };
    registry::lookup(key, overrides).ok_or_else(|| BindError::UnknownType {
        field,
        type_name: key.name().to_string(),
    })
}

/// Mark required every option binding whose type hint is not optional and which
/// sets neither `required` nor `default` explicitly. Flags and multi-valued
/// bindings are exempt: omitting them already has sensible semantics.
pub(crate) fn patch_required(table: &mut FieldTable) -> Result<(), BindError> {
    for entry in table.iter_mut() {
        if entry.binding.declarator() != Declarator::Option {
            continue;
        }
        let (_, was_optional) = entry.hint.unwrap_optional();
        if was_optional {
            continue;
        }
        if entry.binding.has_kwarg("required") || entry.binding.has_kwarg("default") {
            continue;
        }
        let trial = Trial::probe(entry.name, &entry.binding)?;
        if !trial.is_flag && !trial.multiple {
            entry.binding.set_kwarg("required", AttrValue::Bool(true));
        }
    }
    Ok(())
}
