use std::any::TypeId;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{ParamType, TypeKey};

lazy_static! {
    /// Process-wide mapping from semantic value type to parameter type.
    /// The lock serializes mutation; concurrent registration remains
    /// unsupported usage and callers needing isolation should scope via
    /// `InferenceScope`.
    static ref TYPE_INFERENCE: RwLock<HashMap<TypeId, ParamType>> =
        RwLock::new(built_in_inferences());
}

fn built_in_inferences() -> HashMap<TypeId, ParamType> {
    HashMap::from([
        (TypeId::of::<i64>(), ParamType::Int),
        (TypeId::of::<String>(), ParamType::Text),
        (TypeId::of::<f64>(), ParamType::Real),
        (TypeId::of::<bool>(), ParamType::Bool),
        (TypeId::of::<Uuid>(), ParamType::Identifier),
        (TypeId::of::<NaiveDateTime>(), ParamType::Timestamp),
        (TypeId::of::<PathBuf>(), ParamType::Path),
    ])
}

/// Failure to change the type-inference registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The type already has an inference and override was not allowed.
    #[error("an inference for {type_name} is already registered; pass allow_override to replace it")]
    Conflict {
        /// The type in question.
        type_name: &'static str,
    },
    /// Optional types cannot carry an inference; optionality is unwrapped structurally.
    #[error("cannot register an inference for the optional type {type_name}; optionality is unwrapped structurally")]
    OptionalUnsupported {
        /// The type in question.
        type_name: &'static str,
    },
}

/// Register the inference `T` -> `param_type` in the process-wide registry.
///
/// Fails with [RegistryError::Conflict](enum.RegistryError.html) when `T`
/// already has an inference, unless `allow_override` is set.
///
/// ### Example
/// ```
/// use recbind_builder::{register_type_inference, ParamType};
///
/// struct Port(u16);
///
/// register_type_inference::<Port>(ParamType::Int, false).unwrap();
/// ```
pub fn register_type_inference<T: 'static>(
    param_type: ParamType,
    allow_override: bool,
) -> Result<(), RegistryError> {
    let key = TypeKey::of::<T>();
    if key.name().starts_with("core::option::Option<") {
        return Err(RegistryError::OptionalUnsupported {
            type_name: key.name(),
        });
    }

    let mut registry = TYPE_INFERENCE.write().expect("type inference registry poisoned");
    if !allow_override && registry.contains_key(&key.id()) {
        return Err(RegistryError::Conflict {
            type_name: key.name(),
        });
    }
    registry.insert(key.id(), param_type);
    Ok(())
}

/// Remove the inference for `T`, if any.
pub fn unregister_type_inference<T: 'static>() {
    let mut registry = TYPE_INFERENCE.write().expect("type inference registry poisoned");
    registry.remove(&TypeId::of::<T>());
}

pub(crate) fn lookup(key: &TypeKey, overrides: Option<&TypeOverrides>) -> Option<ParamType> {
    if let Some(overrides) = overrides {
        if let Some(param_type) = overrides.entries.get(&key.id()) {
            return Some(param_type.clone());
        }
    }
    let registry = TYPE_INFERENCE.read().expect("type inference registry poisoned");
    registry.get(&key.id()).cloned()
}

/// Per-resolution inferences merged on top of the process-wide registry.
/// An override wins on key collision; the base registry is unchanged.
#[derive(Debug, Clone, Default)]
pub struct TypeOverrides {
    entries: HashMap<TypeId, ParamType>,
}

impl TypeOverrides {
    /// An empty override set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the override `T` -> `param_type`.
    pub fn with<T: 'static>(mut self, param_type: ParamType) -> Self {
        self.entries.insert(TypeId::of::<T>(), param_type);
        self
    }
}

/// Snapshot of the process-wide registry, restored on drop.
/// Scope registry mutations in tests with this guard.
///
/// ### Example
/// ```
/// use recbind_builder::{register_type_inference, InferenceScope, ParamType};
///
/// struct Knob(u8);
///
/// {
///     let _scope = InferenceScope::new();
///     register_type_inference::<Knob>(ParamType::Int, false).unwrap();
///     // .. resolve with the extra inference ..
/// }
/// // The `Knob` inference is gone again.
/// ```
#[derive(Debug)]
pub struct InferenceScope {
    saved: HashMap<TypeId, ParamType>,
}

impl InferenceScope {
    /// Snapshot the current registry contents.
    pub fn new() -> Self {
        let registry = TYPE_INFERENCE.read().expect("type inference registry poisoned");
        Self {
            saved: registry.clone(),
        }
    }
}

impl Default for InferenceScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InferenceScope {
    fn drop(&mut self) {
        let mut registry = TYPE_INFERENCE.write().expect("type inference registry poisoned");
        *registry = std::mem::take(&mut self.saved);
    }
}
