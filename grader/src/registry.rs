//! Exercise identifier registry.
//!
//! Uniqueness of exercise identifiers is enforced by an explicit registry
//! object passed to exercise constructors, not by a module-lifetime static:
//! callers own the registry's lifetime, and two registries never interfere.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::GraderError;

/// Tracks the set of registered exercise identifiers.
#[derive(Debug, Default)]
pub struct ExerciseRegistry {
    ids: HashSet<Uuid>,
}

impl ExerciseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an identifier, rejecting duplicates.
    pub fn register(&mut self, id: Uuid) -> Result<(), GraderError> {
        if !self.ids.insert(id) {
            return Err(GraderError::DuplicateIdentifier(id.to_string()));
        }
        Ok(())
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    /// Fails with [`GraderError::ExerciseNotFound`] for unknown identifiers.
    pub fn ensure_registered(&self, id: &Uuid) -> Result<(), GraderError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(GraderError::ExerciseNotFound(id.to_string()))
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ExerciseRegistry::new();
        let id = Uuid::new_v4();
        registry.register(id).unwrap();
        assert!(registry.contains(&id));
        assert!(registry.ensure_registered(&id).is_ok());
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let mut registry = ExerciseRegistry::new();
        let id = Uuid::new_v4();
        registry.register(id).unwrap();
        let err = registry.register(id).unwrap_err();
        assert_eq!(err, GraderError::DuplicateIdentifier(id.to_string()));
    }

    #[test]
    fn test_unknown_identifier_is_not_found() {
        let registry = ExerciseRegistry::new();
        let err = registry.ensure_registered(&Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, GraderError::ExerciseNotFound(_)));
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = ExerciseRegistry::new();
        let mut second = ExerciseRegistry::new();
        let id = Uuid::new_v4();
        first.register(id).unwrap();
        assert!(second.register(id).is_ok());
    }
}
