use std::collections::{HashMap, HashSet};

use super::model::TypeDef;
use super::types::TypeRef;
use crate::error::{Result, TypesyncError};

/// A supplier of type definitions for one generation run.
pub trait TypeSource {
    /// All primary type definitions, in source order.
    fn types(&self) -> &[TypeDef];

    /// Look up a definition by dotted full name.
    fn resolve(&self, full_name: &str) -> Option<&TypeDef>;

    /// Check whether `ty` derives, directly or transitively, from the generic
    /// definition `full_name` with `arity` type arguments.
    ///
    /// The walk stops at the first base that cannot be resolved.
    fn is_subclass_of(&self, ty: &TypeDef, full_name: &str, arity: usize) -> Result<bool> {
        let mut visited = HashSet::new();
        visited.insert(ty.full_name());
        let mut current = ty.base.as_ref();

        while let Some(TypeRef::Named { name, args }) = current {
            if name == full_name && args.len() == arity {
                return Ok(true);
            }
            let Some(base) = self.resolve(name) else {
                return Ok(false);
            };
            if !visited.insert(base.full_name()) {
                return Err(TypesyncError::extraction(format!(
                    "cyclic inheritance through {}",
                    name
                )));
            }
            current = base.base.as_ref();
        }

        Ok(false)
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Primary(usize),
    Reference(usize),
}

/// Ordered registry of type definitions, indexed by full name.
///
/// Primary types are the ones a run visits. Reference types come from
/// dependencies: they resolve, but are only generated when something
/// primary refers to them.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<TypeDef>,
    references: Vec<TypeDef>,
    index: HashMap<String, Slot>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type definition. The first definition of a full name wins.
    pub fn register(&mut self, def: TypeDef) -> bool {
        let full_name = def.full_name();
        if self.index.contains_key(&full_name) {
            tracing::warn!(type_name = %full_name, "Duplicate type definition ignored");
            return false;
        }
        self.index.insert(full_name, Slot::Primary(self.types.len()));
        self.types.push(def);
        true
    }

    /// Register a resolvable, non-primary definition. Any existing
    /// definition of the same full name wins.
    pub fn register_reference(&mut self, def: TypeDef) -> bool {
        let full_name = def.full_name();
        if self.index.contains_key(&full_name) {
            tracing::debug!(type_name = %full_name, "Reference type already registered");
            return false;
        }
        self.index
            .insert(full_name, Slot::Reference(self.references.len()));
        self.references.push(def);
        true
    }

    /// Register every type of one compiled unit, preserving order.
    pub fn register_unit(&mut self, unit: &str, types: Vec<TypeDef>) -> usize {
        let mut count = 0;
        for def in types {
            if self.register(def) {
                count += 1;
            }
        }
        tracing::debug!(unit, count, "Registered compiled unit");
        count
    }

    /// Number of primary types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeSource for TypeRegistry {
    fn types(&self) -> &[TypeDef] {
        &self.types
    }

    fn resolve(&self, full_name: &str) -> Option<&TypeDef> {
        match self.index.get(full_name)? {
            Slot::Primary(i) => self.types.get(*i),
            Slot::Reference(i) => self.references.get(*i),
        }
    }
}

impl FromIterator<TypeDef> for TypeRegistry {
    fn from_iter<I: IntoIterator<Item = TypeDef>>(iter: I) -> Self {
        let mut registry = TypeRegistry::new();
        for def in iter {
            registry.register(def);
        }
        registry
    }
}
