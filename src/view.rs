//! Flattened, serde-friendly views of a resolved registry for the JSON dump.

use serde::Serialize;

use crate::registry::TypeRegistry;

#[derive(Debug, Clone, Serialize)]
pub struct RegistryView {
    pub types: Vec<TypeView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeView {
    pub name: String,
    pub parent: Option<String>,
    /// Own declarations only, in declared order.
    pub params: Vec<ParamView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamView {
    pub name: String,
    pub kind: String,
    pub vector: bool,
    pub default: Option<String>,
    pub desc: String,
}

/// Flatten a registry, types in name order.
pub fn registry_view(registry: &TypeRegistry) -> RegistryView {
    let mut types = Vec::new();
    for desc in registry.iter() {
        let params = desc
            .own_params
            .iter()
            .map(|(name, spec)| ParamView {
                name: name.clone(),
                kind: spec.kind.to_string(),
                vector: spec.is_vector,
                default: spec.default.as_ref().map(|v| v.to_string()),
                desc: spec.desc.clone(),
            })
            .collect();
        types.push(TypeView {
            name: desc.name.clone(),
            parent: desc
                .parent
                .map(|pid| registry.descriptor(pid).name.clone()),
            params,
        });
    }
    RegistryView { types }
}
