//! The resolved type registry: one descriptor per record, inheritance as
//! pre-resolved ancestor chains.
//!
//! The registry is built in full by [`build::build_registry`] before any
//! config node is constructed against it, and is read-only afterwards. It is
//! passed by reference to whoever needs type lookups; there is no global.

pub mod build;

pub use build::build_registry;

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::param::ParameterSpec;

/// Name of the seeded universal base type. Always present, abstract and
/// parameter-free; every record derives from it directly or transitively,
/// and bare grouping nodes instantiate it as-is.
pub const UNIVERSAL_BASE: &str = "Object";

/// Handle into a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeId(usize);

/// One registered type.
#[derive(Debug)]
pub struct TypeDescriptor {
    pub name: String,
    pub parent: Option<TypeId>,
    pub is_abstract: bool,
    /// Own declarations only, in declared order. Inherited parameters are
    /// reached through `chain`.
    pub own_params: Vec<(String, ParameterSpec)>,
    /// Self first, then ancestors up to the universal base. Resolved once at
    /// registration instead of being re-walked on every lookup.
    chain: Vec<TypeId>,
}

/// Write-once registry of every known type.
#[derive(Debug)]
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
    by_name: BTreeMap<String, TypeId>,
}

impl TypeRegistry {
    /// An empty registry holding only the seeded universal base.
    pub fn new() -> Self {
        let base = TypeDescriptor {
            name: UNIVERSAL_BASE.to_string(),
            parent: None,
            is_abstract: true,
            own_params: Vec::new(),
            chain: vec![TypeId(0)],
        };
        let mut by_name = BTreeMap::new();
        by_name.insert(UNIVERSAL_BASE.to_string(), TypeId(0));
        Self {
            types: vec![base],
            by_name,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn descriptor(&self, id: TypeId) -> &TypeDescriptor {
        &self.types[id.0]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.by_name.values().map(|id| self.descriptor(*id))
    }

    /// Resolve a parameter by walking the ancestor chain, most-derived first.
    pub fn find_param(&self, id: TypeId, name: &str) -> Option<&ParameterSpec> {
        for &tid in &self.descriptor(id).chain {
            let hit = self
                .descriptor(tid)
                .own_params
                .iter()
                .find(|(n, _)| n == name);
            if let Some((_, spec)) = hit {
                return Some(spec);
            }
        }
        None
    }

    /// Every parameter name visible on `id`: chain order (the most derived
    /// type's own declarations first), first declaration of a name winning.
    pub fn param_names(&self, id: TypeId) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for &tid in &self.descriptor(id).chain {
            for (name, _) in &self.descriptor(tid).own_params {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Register a parameter-free descriptor under `parent`.
    pub(crate) fn register(&mut self, name: &str, parent: TypeId) -> Result<TypeId> {
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateType {
                name: name.to_string(),
            });
        }
        let id = TypeId(self.types.len());
        let mut chain = vec![id];
        chain.extend(self.descriptor(parent).chain.iter().copied());
        self.types.push(TypeDescriptor {
            name: name.to_string(),
            parent: Some(parent),
            is_abstract: false,
            own_params: Vec::new(),
            chain,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Attach a type's parameter table. A second attach is a no-op.
    pub(crate) fn attach_params(&mut self, id: TypeId, params: Vec<(String, ParameterSpec)>) {
        let desc = &mut self.types[id.0];
        if desc.own_params.is_empty() {
            desc.own_params = params;
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
