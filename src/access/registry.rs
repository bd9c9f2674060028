//! Field descriptors and the per-entity registry of filterable fields.

use crate::access::{DataType, Value};
use crate::error::{BindError, RegistryError};
use std::fmt;
use std::sync::Arc;

type Accessor<T> = dyn Fn(&T) -> Value + Send + Sync;

/// A filterable field of entity type `T`
pub struct FieldDescriptor<T> {
    name: String,
    data_type: DataType,
    accessor: Box<Accessor<T>>,
}

impl<T> FieldDescriptor<T> {
    pub fn new<F>(name: impl Into<String>, data_type: DataType, accessor: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            data_type,
            accessor: Box::new(accessor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Read this field's value from an entity
    pub fn read(&self, entity: &T) -> Value {
        (self.accessor)(entity)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .finish_non_exhaustive()
    }
}

/// Characters allowed in a field name. Anything else could collide with the
/// operator, bracket or quote lexemes.
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Immutable, ordered catalogue of the filterable fields of `T`.
///
/// Cloning is cheap; clones share the same descriptors.
pub struct FieldRegistry<T> {
    fields: Arc<[Arc<FieldDescriptor<T>>]>,
}

impl<T> Clone for FieldRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            fields: Arc::clone(&self.fields),
        }
    }
}

impl<T> fmt::Debug for FieldRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.iter()).finish()
    }
}

impl<T> FieldRegistry<T> {
    pub fn builder() -> RegistryBuilder<T> {
        RegistryBuilder::new()
    }

    pub fn fields(&self) -> impl Iterator<Item = &Arc<FieldDescriptor<T>>> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolve a field by case-insensitive name. Exactly one descriptor must
    /// match.
    pub fn lookup(&self, name: &str) -> Result<&Arc<FieldDescriptor<T>>, BindError> {
        let mut matches = self
            .fields
            .iter()
            .filter(|f| names_equal(f.name(), name));

        let first = matches.next().ok_or_else(|| BindError::UnknownField {
            field: name.to_string(),
        })?;

        let others: Vec<String> = matches.map(|f| f.name().to_string()).collect();
        if !others.is_empty() {
            let mut candidates = vec![first.name().to_string()];
            candidates.extend(others);
            return Err(BindError::AmbiguousField {
                field: name.to_string(),
                candidates,
            });
        }

        Ok(first)
    }
}

/// Case-insensitive name comparison that also covers non-ASCII names
pub(crate) fn names_equal(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Builder for a [`FieldRegistry`]
pub struct RegistryBuilder<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> Default for RegistryBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RegistryBuilder<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Register a field with an accessor reading its value from an entity
    pub fn field<F>(mut self, name: impl Into<String>, data_type: DataType, accessor: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.fields
            .push(FieldDescriptor::new(name, data_type, accessor));
        self
    }

    /// Register an already constructed descriptor
    pub fn descriptor(mut self, descriptor: FieldDescriptor<T>) -> Self {
        self.fields.push(descriptor);
        self
    }

    /// Validate the names and freeze the registry.
    ///
    /// Names that differ only in case are accepted here; using such a name
    /// in a query is reported as ambiguous when it is bound.
    pub fn build(self) -> Result<FieldRegistry<T>, RegistryError> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(RegistryError::EmptyFieldName);
            }
            if !field.name.chars().all(is_name_char) {
                return Err(RegistryError::InvalidFieldName(field.name.clone()));
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(RegistryError::DuplicateField(field.name.clone()));
            }
        }

        let case_variants = self
            .fields
            .iter()
            .enumerate()
            .filter(|(i, f)| {
                self.fields[..*i]
                    .iter()
                    .any(|other| names_equal(&other.name, &f.name))
            })
            .count();
        if case_variants > 0 {
            log::debug!(
                "Field registry has {} name(s) differing only in case; they cannot be used in queries",
                case_variants
            );
        }

        Ok(FieldRegistry {
            fields: self.fields.into_iter().map(Arc::new).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person {
        id: i64,
        name: String,
    }

    fn registry() -> FieldRegistry<Person> {
        FieldRegistry::builder()
            .field("Id", DataType::Int64, |p: &Person| p.id.into())
            .field("Name", DataType::String, |p: &Person| p.name.clone().into())
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = registry();
        assert_eq!(registry.lookup("id").unwrap().name(), "Id");
        assert_eq!(registry.lookup("NAME").unwrap().name(), "Name");
        assert_eq!(
            registry.lookup("Age").unwrap_err(),
            BindError::UnknownField {
                field: "Age".to_string()
            }
        );
    }

    #[test]
    fn test_accessor_reads_entity() {
        let registry = registry();
        let person = Person {
            id: 7,
            name: "Ada".to_string(),
        };
        let id = registry.lookup("Id").unwrap();
        assert_eq!(id.read(&person), Value::Int64(7));
        assert_eq!(id.data_type(), DataType::Int64);
    }

    #[test]
    fn test_case_variants_are_ambiguous() {
        let registry = FieldRegistry::builder()
            .field("Name", DataType::String, |p: &Person| p.name.clone().into())
            .field("name", DataType::String, |p: &Person| p.name.clone().into())
            .build()
            .unwrap();

        match registry.lookup("NAME").unwrap_err() {
            BindError::AmbiguousField { field, candidates } => {
                assert_eq!(field, "NAME");
                assert_eq!(candidates, vec!["Name".to_string(), "name".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_build_rejects_bad_names() {
        let dup = FieldRegistry::builder()
            .field("Id", DataType::Int64, |p: &Person| p.id.into())
            .field("Id", DataType::Int32, |_: &Person| Value::Null)
            .build();
        assert_eq!(
            dup.unwrap_err(),
            RegistryError::DuplicateField("Id".to_string())
        );

        let empty = FieldRegistry::builder()
            .field("", DataType::Int64, |p: &Person| p.id.into())
            .build();
        assert_eq!(empty.unwrap_err(), RegistryError::EmptyFieldName);

        let spaced = FieldRegistry::builder()
            .field("First Name", DataType::String, |p: &Person| p.name.clone().into())
            .build();
        assert_eq!(
            spaced.unwrap_err(),
            RegistryError::InvalidFieldName("First Name".to_string())
        );
    }

    #[test]
    fn test_dotted_names_and_order() {
        let registry = FieldRegistry::builder()
            .field("Address.City", DataType::String, |_: &Person| Value::Null)
            .field("Id", DataType::Int64, |p: &Person| p.id.into())
            .build()
            .unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Address.City", "Id"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }
}
