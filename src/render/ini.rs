//! Deterministic .ini emission of a configuration tree.
//!
//! One stanza per node, depth-first. The downstream consumer depends on the
//! exact shape: `children =` names sorted lexicographically, each stanza
//! immediately after its header, child stanzas following in the same sorted
//! order.

use crate::tree::{Attr, ConfigTree, NodeId};

/// Serialize the tree rooted at `root` into the flat text artifact.
pub fn render_ini(tree: &ConfigTree<'_>, root: NodeId) -> String {
    let mut out = String::new();
    emit_node(tree, root, &mut out);
    out
}

fn emit_node(tree: &ConfigTree<'_>, id: NodeId, out: &mut String) {
    let registry = tree.registry();

    out.push_str(&format!("[{}]\n", tree.path(id)));

    // BTreeMap iteration already gives lexicographic order.
    let children: Vec<(&str, NodeId)> = tree.children(id).collect();
    if !children.is_empty() {
        let names: Vec<&str> = children.iter().map(|(name, _)| *name).collect();
        out.push_str(&format!("children = {}\n", names.join(" ")));
    }

    let desc = registry.descriptor(tree.node_type(id));
    if !desc.is_abstract {
        // Bare grouping nodes carry children but no type line.
        out.push_str(&format!("type = {}\n", desc.name));
    }

    // Most derived declarations first, each type's own declared order within
    // that; unset parameters are omitted entirely.
    for pname in registry.param_names(tree.node_type(id)) {
        if let Ok(Attr::Param(value)) = tree.get(id, pname) {
            out.push_str(&format!("{} = {}\n", pname, value));
        }
    }

    out.push('\n');

    for (_, child) in children {
        emit_node(tree, child, out);
    }
}
