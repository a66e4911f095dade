use clap::builder::BoolishValueParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::api::CallValues;
use crate::binding::{AttrValue, Binding, Declarator};
use crate::model::{ParamType, Value};
use crate::resolve::BindError;
use crate::scan::FieldTable;

/// The runtime behaviour of a binding, as the engine will execute it.
/// Probed by constructing the parameter and reading the engine's view back,
/// so that resolution and execution can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Trial {
    pub(crate) is_flag: bool,
    pub(crate) multiple: bool,
    pub(crate) arity: usize,
}

impl Trial {
    pub(crate) fn probe(field: &'static str, binding: &Binding) -> Result<Trial, BindError> {
        let arg = base_arg(field, binding)?;
        let is_flag = matches!(
            arg.get_action(),
            ArgAction::SetTrue | ArgAction::SetFalse | ArgAction::Count
        );
        let (multiple, arity) = match arg.get_num_args() {
            Some(range) if range.max_values() == usize::MAX => (true, 1),
            Some(range) => (
                matches!(arg.get_action(), ArgAction::Append),
                range.max_values(),
            ),
            None => (matches!(arg.get_action(), ArgAction::Append), 1),
        };
        Ok(Trial {
            is_flag,
            multiple,
            arity: if is_flag { 0 } else { arity },
        })
    }
}

/// The structural part of the parameter: identity, names, and shape.
/// Shared by trial probes and the full build.
fn base_arg(field: &'static str, binding: &Binding) -> Result<Arg, BindError> {
    let mut arg = Arg::new(field);

    for name in binding.args() {
        if name == field {
            continue;
        }
        if let Some(long) = name.strip_prefix("--") {
            arg = arg.long(long.to_string());
        } else if let Some(short) = name.strip_prefix('-') {
            let mut characters = short.chars();
            match (characters.next(), characters.next()) {
                (Some(character), None) => arg = arg.short(character),
                _ => {
                    return Err(BindError::InvalidBinding {
                        field,
                        message: format!("short name '{name}' must be a single character"),
                    });
                }
            }
        } else if binding.declarator() == Declarator::Option {
            return Err(BindError::InvalidBinding {
                field,
                message: format!("option name '{name}' must begin with '-'"),
            });
        } else {
            arg = arg.value_name(name.to_uppercase());
        }
    }

    let is_flag = matches!(binding.kwarg("is_flag"), Some(AttrValue::Bool(true)));
    let multiple = matches!(binding.kwarg("multiple"), Some(AttrValue::Bool(true)));
    let nargs = match binding.kwarg("nargs") {
        Some(&AttrValue::Int(count)) => Some(count as usize),
        _ => None,
    };

    if is_flag {
        if binding.declarator() == Declarator::Argument {
            return Err(BindError::InvalidBinding {
                field,
                message: "a positional argument cannot be a flag".to_string(),
            });
        }
        arg = arg.action(ArgAction::SetTrue);
        return Ok(arg);
    }

    if multiple && nargs.is_some() {
        return Err(BindError::InvalidBinding {
            field,
            message: "multiple and nargs are mutually exclusive".to_string(),
        });
    }

    if multiple {
        arg = match binding.declarator() {
            Declarator::Option => arg.action(ArgAction::Append),
            Declarator::Argument => arg.num_args(0..),
        };
    } else if let Some(count) = nargs {
        arg = arg.num_args(count);
    }

    Ok(arg)
}

/// Build the complete parameter for `field`: structure plus requiredness,
/// default, help, and the value validator for its parameter type.
pub(crate) fn build_arg(field: &'static str, binding: &Binding) -> Result<Arg, BindError> {
    let mut arg = base_arg(field, binding)?;

    match binding.kwarg("required") {
        Some(&AttrValue::Bool(required)) => arg = arg.required(required),
        _ => {
            if binding.declarator() == Declarator::Argument
                && !matches!(binding.kwarg("multiple"), Some(AttrValue::Bool(true)))
                && !binding.has_kwarg("default")
            {
                arg = arg.required(true);
            }
        }
    }

    if let Some(AttrValue::Value(default)) = binding.kwarg("default") {
        if !default.is_dont_pass() {
            match default.render_cli() {
                Some(rendered) => arg = arg.default_value(rendered),
                None => {
                    return Err(BindError::InvalidBinding {
                        field,
                        message: format!(
                            "a {} default has no command line form",
                            default.kind()
                        ),
                    });
                }
            }
        }
    }

    if let Some(AttrValue::Text(help)) = binding.kwarg("help") {
        arg = arg.help(help.clone());
    }

    match binding.kwarg("type") {
        Some(AttrValue::ParamType(ParamType::Text | ParamType::Path)) => {}
        Some(AttrValue::ParamType(ParamType::Bool)) => {
            arg = arg.value_parser(BoolishValueParser::new());
        }
        Some(AttrValue::ParamType(param_type)) => {
            let param_type = param_type.clone();
            arg = arg.value_parser(move |raw: &str| {
                param_type.convert(raw).map(|_| raw.to_string())
            });
        }
        // Per-member types are validated at collection, where position is known.
        Some(AttrValue::ParamTypes(_)) | None => {}
        Some(other) => {
            return Err(BindError::InvalidBinding {
                field,
                message: format!("'{other:?}' is not a parameter type"),
            });
        }
    }

    Ok(arg)
}

/// Add one parameter per bound field to `command`, in field declaration order.
pub(crate) fn augment(table: &FieldTable, mut command: Command) -> Result<Command, BindError> {
    for entry in table.iter() {
        command = command.arg(build_arg(entry.name, &entry.binding)?);
    }
    Ok(command)
}

/// Collect the parsed matches into per-field values, converting raw tokens via
/// each binding's parameter type. Parameters outside the table pass through
/// untouched, keyed by their own identifiers.
pub(crate) fn collect(table: &FieldTable, matches: &ArgMatches) -> Result<CallValues, clap::Error> {
    let mut values = CallValues::default();

    for entry in table.iter() {
        let trial = Trial::probe(entry.name, &entry.binding)
            .map_err(|error| clap::Error::raw(ErrorKind::ValueValidation, error.to_string()))?;

        if trial.is_flag {
            values.insert_kwarg(entry.name, Value::Bool(matches.get_flag(entry.name)));
            continue;
        }

        let raws: Option<Vec<String>> = matches
            .get_raw(entry.name)
            .map(|raws| raws.map(|raw| raw.to_string_lossy().into_owned()).collect());

        let value = match raws {
            None if trial.multiple => Value::Seq(Vec::default()),
            None => Value::DontPass,
            Some(raws) => convert_raws(entry.name, &entry.binding, trial, raws)?,
        };
        values.insert_kwarg(entry.name, value);
    }

    for id in matches.ids() {
        if table.contains(id.as_str()) {
            continue;
        }
        let value = match matches.try_get_raw(id.as_str()) {
            Ok(Some(raws)) => {
                let mut raws: Vec<Value> = raws
                    .map(|raw| Value::Text(raw.to_string_lossy().into_owned()))
                    .collect();
                if raws.len() == 1 {
                    raws.remove(0)
                } else {
                    Value::Seq(raws)
                }
            }
            Ok(None) => continue,
            // Typed storage, most commonly a flag.
            Err(_) => Value::Bool(true),
        };
        values.insert_kwarg(id.as_str(), value);
    }

    Ok(values)
}

fn convert_raws(
    field: &'static str,
    binding: &Binding,
    trial: Trial,
    raws: Vec<String>,
) -> Result<Value, clap::Error> {
    let invalid = |message: String| {
        clap::Error::raw(
            ErrorKind::ValueValidation,
            format!("invalid value for '{field}': {message}\n"),
        )
    };

    match binding.kwarg("type") {
        Some(AttrValue::ParamTypes(param_types)) => {
            if raws.len() != param_types.len() {
                return Err(invalid(format!(
                    "takes {} values, got {}",
                    param_types.len(),
                    raws.len()
                )));
            }
            let members: Result<Vec<Value>, clap::Error> = param_types
                .iter()
                .zip(raws)
                .map(|(param_type, raw)| param_type.convert(&raw).map_err(invalid))
                .collect();
            Ok(Value::Tuple(members?))
        }
        Some(AttrValue::ParamType(param_type)) => {
            if trial.multiple {
                let members: Result<Vec<Value>, clap::Error> = raws
                    .into_iter()
                    .map(|raw| param_type.convert(&raw).map_err(invalid))
                    .collect();
                Ok(Value::Seq(members?))
            } else if trial.arity > 1 {
                let members: Result<Vec<Value>, clap::Error> = raws
                    .into_iter()
                    .map(|raw| param_type.convert(&raw).map_err(invalid))
                    .collect();
                Ok(Value::Tuple(members?))
            } else {
                let raw = raws
                    .last()
                    .ok_or_else(|| invalid("no value collected".to_string()))?;
                param_type.convert(raw).map_err(invalid)
            }
        }
        _ => {
            if trial.multiple {
                Ok(Value::Seq(raws.into_iter().map(Value::Text).collect()))
            } else if trial.arity > 1 {
                Ok(Value::Tuple(raws.into_iter().map(Value::Text).collect()))
            } else {
                let raw = raws
                    .into_iter()
                    .last()
                    .ok_or_else(|| invalid("no value collected".to_string()))?;
                Ok(Value::Text(raw))
            }
        }
    }
}
