//! Two-pass construction of the type registry from an enumerated record set.
//!
//! Pass one registers a parameter-free descriptor per record in dependency
//! order: a record's parent is resolved before the record itself, recursing
//! on demand. Pass two evaluates each record's declaration block and
//! attaches the parameter table, coercing declared defaults through the
//! same path instance assignments take later.
//!
//! Any failure aborts the whole build; no partial registry escapes.

use std::collections::BTreeMap;

use crate::desc::{self, RecordParts, RecordSet};
use crate::error::{Error, Result};
use crate::param::ParameterSpec;
use crate::registry::{TypeId, TypeRegistry};

enum Resolve {
    Resolving,
    Resolved(TypeId),
}

/// Build a complete registry from `records`.
pub fn build_registry(records: &RecordSet) -> Result<TypeRegistry> {
    // Parse every record up front; one malformed record aborts the load.
    let mut parsed: BTreeMap<&str, RecordParts> = BTreeMap::new();
    for (name, source) in records.iter() {
        parsed.insert(name, desc::parse_record(name, source)?);
    }

    let mut registry = TypeRegistry::new();
    let mut state: BTreeMap<&str, Resolve> = BTreeMap::new();
    let mut stack: Vec<String> = Vec::new();

    // Skeleton pass.
    for (&name, _) in &parsed {
        stack.clear();
        resolve(name, &parsed, &mut registry, &mut state, &mut stack)?;
    }

    // Parameter pass. Resolving an already resolved type is a no-op that
    // simply hands back its id.
    for (&name, parts) in &parsed {
        let id = resolve(name, &parsed, &mut registry, &mut state, &mut stack)?;
        let mut table: Vec<(String, ParameterSpec)> = Vec::new();
        for decl in desc::parse_decls(name, &parts.params_src)? {
            let mut spec = ParameterSpec::new(decl.kind, decl.desc, decl.is_vector);
            spec.default = spec.make_value(&decl.name, decl.default)?;
            table.push((decl.name, spec));
        }
        registry.attach_params(id, table);
    }

    Ok(registry)
}

/// Register `name`, resolving its parent first. Tri-state bookkeeping turns
/// re-entry into a cycle report and repeat calls into no-ops.
fn resolve<'a>(
    name: &'a str,
    parsed: &BTreeMap<&'a str, RecordParts>,
    registry: &mut TypeRegistry,
    state: &mut BTreeMap<&'a str, Resolve>,
    stack: &mut Vec<String>,
) -> Result<TypeId> {
    match state.get(name) {
        Some(Resolve::Resolved(id)) => return Ok(*id),
        Some(Resolve::Resolving) => {
            // `name` is in the current resolution stack.
            stack.push(name.to_string());
            return Err(Error::CyclicInheritance {
                chain: stack.join(" -> "),
            });
        }
        None => {}
    }

    let Some(parts) = parsed.get(name) else {
        return Err(Error::UnknownParent {
            ty: stack.last().cloned().unwrap_or_default(),
            parent: name.to_string(),
        });
    };

    state.insert(name, Resolve::Resolving);
    stack.push(name.to_string());

    let parent_id = if let Some((&pkey, _)) = parsed.get_key_value(parts.parent.as_str()) {
        resolve(pkey, parsed, registry, state, stack)?
    } else if let Some(id) = registry.lookup(&parts.parent) {
        // Only the seeded base exists outside the record set.
        id
    } else {
        return Err(Error::UnknownParent {
            ty: name.to_string(),
            parent: parts.parent.clone(),
        });
    };

    let id = registry.register(name, parent_id)?;
    state.insert(name, Resolve::Resolved(id));
    stack.pop();
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Value;
    use pretty_assertions::assert_eq;

    fn records(entries: &[(&str, &str)]) -> RecordSet {
        let mut set = RecordSet::new();
        for (name, text) in entries {
            set.insert(*name, *text).unwrap();
        }
        set
    }

    const BASE_CACHE: &str = "OBJECT: BaseCache (Object)\nPARAMS:\n    size = Param(Addr, \"capacity in bytes\", 64*K)\n    assoc = Param(Int, \"associativity\")\n";
    const L1: &str =
        "OBJECT: L1Cache (BaseCache)\nPARAMS:\n    latency = Param(Tick, \"hit latency\", 1)\n";

    #[test]
    fn one_descriptor_per_record_with_inherited_lookup() {
        let reg =
            build_registry(&records(&[("L1Cache", L1), ("BaseCache", BASE_CACHE)])).unwrap();
        assert_eq!(reg.len(), 3); // the universal base plus two records

        let l1 = reg.lookup("L1Cache").unwrap();
        assert!(reg.find_param(l1, "size").is_some());
        assert!(reg.find_param(l1, "latency").is_some());
        assert!(reg.find_param(l1, "missing").is_none());
        // Own declarations first, then the ancestor's, in declared order.
        assert_eq!(reg.param_names(l1), vec!["latency", "size", "assoc"]);

        let base = reg.lookup("BaseCache").unwrap();
        assert_eq!(reg.descriptor(l1).parent, Some(base));
    }

    #[test]
    fn defaults_are_coerced_at_load() {
        let reg = build_registry(&records(&[("BaseCache", BASE_CACHE)])).unwrap();
        let id = reg.lookup("BaseCache").unwrap();
        assert_eq!(
            reg.find_param(id, "size").unwrap().default,
            Some(Value::Int(64 * 1024))
        );
        assert_eq!(reg.find_param(id, "assoc").unwrap().default, None);
    }

    #[test]
    fn bad_default_aborts_the_load() {
        let text = "OBJECT: Broken (Object)\nPARAMS:\n    size = Param(Int, \"bytes\", 'big')\n";
        let err = build_registry(&records(&[("Broken", text)])).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn redeclared_name_shadows_the_ancestor() {
        let shadow =
            "OBJECT: Wide (BaseCache)\nPARAMS:\n    assoc = Param(Int, \"associativity\", 16)\n";
        let reg =
            build_registry(&records(&[("BaseCache", BASE_CACHE), ("Wide", shadow)])).unwrap();
        let id = reg.lookup("Wide").unwrap();
        assert_eq!(
            reg.find_param(id, "assoc").unwrap().default,
            Some(Value::Int(16))
        );
        assert_eq!(reg.param_names(id), vec!["assoc", "size"]);
    }

    #[test]
    fn parent_cycle_aborts_the_build() {
        let a = "OBJECT: A (B)\nPARAMS:\n";
        let b = "OBJECT: B (A)\nPARAMS:\n";
        let err = build_registry(&records(&[("A", a), ("B", b)])).unwrap_err();
        match err {
            Error::CyclicInheritance { chain } => assert_eq!(chain, "A -> B -> A"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let a = "OBJECT: A (A)\nPARAMS:\n";
        let err = build_registry(&records(&[("A", a)])).unwrap_err();
        match err {
            Error::CyclicInheritance { chain } => assert_eq!(chain, "A -> A"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_parent_is_reported() {
        let a = "OBJECT: A (Ghost)\nPARAMS:\n";
        let err = build_registry(&records(&[("A", a)])).unwrap_err();
        match err {
            Error::UnknownParent { ty, parent } => {
                assert_eq!(ty, "A");
                assert_eq!(parent, "Ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_record_aborts_the_build() {
        let err = build_registry(&records(&[("A", "not a record\n")])).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn empty_record_set_yields_just_the_base() {
        let reg = build_registry(&RecordSet::new()).unwrap();
        assert_eq!(reg.len(), 1);
        let base = reg.lookup(super::super::UNIVERSAL_BASE).unwrap();
        assert!(reg.descriptor(base).is_abstract);
        assert_eq!(reg.param_names(base), Vec::<&str>::new());
    }
}
