use crate::binding::{Binding, FieldSpec, Metadata};
use crate::model::TypeHint;

#[derive(Debug, Clone)]
pub(crate) struct FieldEntry {
    pub(crate) name: &'static str,
    pub(crate) hint: TypeHint,
    pub(crate) binding: Binding,
}

/// The ordered mapping from field name to binding produced by scanning a
/// record type, insertion order matching field declaration order.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    entries: Vec<FieldEntry>,
}

impl FieldTable {
    /// Scan field specs into a table: per field, the first
    /// [Metadata::Binding](enum.Metadata.html) wins; fields with no binding
    /// metadata are skipped; a duplicate field name keeps the first occurrence.
    pub fn scan(specs: Vec<FieldSpec>) -> Self {
        let mut entries: Vec<FieldEntry> = Vec::default();

        for spec in specs {
            let (name, hint, metadata) = spec.into_parts();
            if entries.iter().any(|entry| entry.name == name) {
                continue;
            }
            let binding = metadata.into_iter().find_map(|metadata| match metadata {
                Metadata::Binding(binding) => Some(binding),
                _ => None,
            });
            if let Some(binding) = binding {
                entries.push(FieldEntry {
                    name,
                    hint,
                    binding,
                });
            }
        }

        Self { entries }
    }

    /// The number of bound fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no fields are bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The bound field names, in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    /// The binding for `name`, if the field is bound.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.binding)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldEntry> {
        self.entries.iter_mut()
    }
}
