//! Deferred references held by composite objects.

use std::num::NonZeroU32;

use crate::error::{ObjectError, ObjectResult};
use crate::table::ReferenceTable;
use crate::value::Value;

/// A slot that holds either a value or a not-yet-resolved back-reference.
///
/// Decoding produces [`Field::Unresolved`] for every back-reference it
/// reads; once the whole stream is in the reference table a single
/// [`Field::resolve`] pass replaces each position with the value it names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Resolved(Value),
    Unresolved(NonZeroU32),
}

impl Field {
    pub fn new(value: Value) -> Self {
        Self::Resolved(value)
    }

    /// A back-reference to a 1-based table position.
    pub fn unresolved(position: u32) -> ObjectResult<Self> {
        NonZeroU32::new(position)
            .map(Self::Unresolved)
            .ok_or_else(|| ObjectError::malformed("BackReference", "position 0"))
    }

    pub fn get(&self) -> ObjectResult<&Value> {
        match self {
            Self::Resolved(value) => Ok(value),
            Self::Unresolved(position) => Err(ObjectError::UnresolvedReference(position.get())),
        }
    }

    pub fn set(&mut self, value: Value) {
        *self = Self::Resolved(value);
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn position(&self) -> Option<u32> {
        match self {
            Self::Unresolved(position) => Some(position.get()),
            Self::Resolved(_) => None,
        }
    }

    /// Replace a pending position with the table entry it names.
    /// Resolved fields are left alone.
    pub fn resolve(&mut self, table: &ReferenceTable) -> ObjectResult<()> {
        if let Self::Unresolved(position) = *self {
            let value = table
                .get(position.get())
                .ok_or(ObjectError::DanglingReference {
                    position: position.get(),
                    len: table.len(),
                })?;
            *self = Self::Resolved(value.clone());
        }
        Ok(())
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Self::Resolved(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_field_cannot_be_read() {
        let field = Field::unresolved(3).unwrap();
        assert!(matches!(field.get(), Err(ObjectError::UnresolvedReference(3))));
        assert_eq!(field.position(), Some(3));
    }

    #[test]
    fn position_zero_is_malformed() {
        assert!(matches!(
            Field::unresolved(0),
            Err(ObjectError::MalformedBody { .. })
        ));
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut table = ReferenceTable::new();
        table.append(Value::True);
        let mut field = Field::unresolved(1).unwrap();
        field.resolve(&table).unwrap();
        assert_eq!(field.get().unwrap(), &Value::True);
        field.resolve(&ReferenceTable::new()).unwrap();
        assert_eq!(field.get().unwrap(), &Value::True);
    }

    #[test]
    fn dangling_position_is_an_error() {
        let mut field = Field::unresolved(2).unwrap();
        let err = field.resolve(&ReferenceTable::new()).unwrap_err();
        assert_eq!(err, ObjectError::DanglingReference { position: 2, len: 0 });
        assert!(!field.is_resolved());
    }
}
