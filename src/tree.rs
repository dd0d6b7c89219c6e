//! The configuration node tree.
//!
//! Nodes are arena-owned: the tree owns every node, handles are copyable
//! ids, and a node's parent link is a plain back-reference used for path
//! computation. Attribute assignment routes a name to exactly one store:
//! the private store (leading underscore, no type lookup) or the typed
//! parameter store. Children are never created by assignment.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::param::{Raw, Value};
use crate::registry::{TypeId, TypeRegistry};

/// Handle to a node in a [`ConfigTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
    name: String,
    ty: TypeId,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
    params: BTreeMap<String, Value>,
    private: BTreeMap<String, Raw>,
}

/// Result of an attribute read.
#[derive(Debug, PartialEq)]
pub enum Attr<'a> {
    /// A parameter with a value: instance override or declared default.
    Param(&'a Value),
    /// A parameter that resolves but has neither override nor default.
    Unset,
    /// A hierarchy child.
    Child(NodeId),
    /// A private entry.
    Private(&'a Raw),
}

/// A tree of configuration nodes typed against a finished registry.
#[derive(Debug)]
pub struct ConfigTree<'r> {
    registry: &'r TypeRegistry,
    nodes: Vec<NodeData>,
}

impl<'r> ConfigTree<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            nodes: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Create a node. With a parent the node is linked immediately (sibling
    /// names must be unique); without one it is a root until adopted.
    pub fn insert(&mut self, name: &str, ty: TypeId, parent: Option<NodeId>) -> Result<NodeId> {
        if let Some(pid) = parent {
            if self.nodes[pid.0].children.contains_key(name) {
                return Err(Error::DuplicateChildName {
                    parent: self.nodes[pid.0].name.clone(),
                    child: name.to_string(),
                });
            }
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.to_string(),
            ty,
            parent,
            children: BTreeMap::new(),
            params: BTreeMap::new(),
            private: BTreeMap::new(),
        });
        if let Some(pid) = parent {
            self.nodes[pid.0].children.insert(name.to_string(), id);
        }
        Ok(id)
    }

    /// [`ConfigTree::insert`] plus initial attribute assignments. Everything
    /// is validated before the node is created, so a bad value leaves no
    /// half-initialized node behind.
    pub fn insert_with<I, S, V>(
        &mut self,
        name: &str,
        ty: TypeId,
        parent: Option<NodeId>,
        attrs: I,
    ) -> Result<NodeId>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Raw>,
    {
        let mut private: Vec<(String, Raw)> = Vec::new();
        let mut params: Vec<(String, Value)> = Vec::new();
        for (aname, value) in attrs {
            let aname = aname.as_ref();
            let raw = value.into();
            if aname.starts_with('_') {
                private.push((aname.to_string(), raw));
                continue;
            }
            let Some(spec) = self.registry.find_param(ty, aname) else {
                return Err(Error::UnknownParameter {
                    ty: self.registry.descriptor(ty).name.clone(),
                    param: aname.to_string(),
                });
            };
            params.push((aname.to_string(), spec.coerce(aname, raw)?));
        }

        let id = self.insert(name, ty, parent)?;
        let node = &mut self.nodes[id.0];
        node.private.extend(private);
        node.params.extend(params);
        Ok(id)
    }

    /// Attach a parentless node under `parent`. A node's parent link is
    /// permanent once set.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.nodes[child.0].parent.is_some() {
            return Err(Error::AlreadyParented {
                child: self.nodes[child.0].name.clone(),
            });
        }
        // The adopter must not sit below the adoptee.
        let mut cur = Some(parent);
        while let Some(id) = cur {
            if id == child {
                return Err(Error::AdoptionCycle {
                    parent: self.nodes[parent.0].name.clone(),
                    child: self.nodes[child.0].name.clone(),
                });
            }
            cur = self.nodes[id.0].parent;
        }
        let cname = self.nodes[child.0].name.clone();
        if self.nodes[parent.0].children.contains_key(&cname) {
            return Err(Error::DuplicateChildName {
                parent: self.nodes[parent.0].name.clone(),
                child: cname,
            });
        }
        self.nodes[parent.0].children.insert(cname, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Assign an attribute. Routes to the private store or to a declared
    /// parameter; children are never created by assignment. A failed
    /// assignment leaves the node untouched.
    pub fn set(&mut self, id: NodeId, name: &str, value: impl Into<Raw>) -> Result<()> {
        let raw = value.into();
        if name.starts_with('_') {
            self.nodes[id.0].private.insert(name.to_string(), raw);
            return Ok(());
        }
        let ty = self.nodes[id.0].ty;
        let Some(spec) = self.registry.find_param(ty, name) else {
            return Err(Error::UnknownParameter {
                ty: self.registry.descriptor(ty).name.clone(),
                param: name.to_string(),
            });
        };
        let value = spec.coerce(name, raw)?;
        self.nodes[id.0].params.insert(name.to_string(), value);
        Ok(())
    }

    /// Read an attribute: private entry, then parameter (instance value,
    /// else the most derived declared default, else unset), then child.
    pub fn get(&self, id: NodeId, name: &str) -> Result<Attr<'_>> {
        let node = &self.nodes[id.0];
        if name.starts_with('_') {
            return match node.private.get(name) {
                Some(raw) => Ok(Attr::Private(raw)),
                None => Err(Error::NoSuchAttribute {
                    node: node.name.clone(),
                    attr: name.to_string(),
                }),
            };
        }
        if let Some(value) = node.params.get(name) {
            return Ok(Attr::Param(value));
        }
        if let Some(spec) = self.registry.find_param(node.ty, name) {
            return Ok(match &spec.default {
                Some(value) => Attr::Param(value),
                None => Attr::Unset,
            });
        }
        if let Some(&child) = node.children.get(name) {
            return Ok(Attr::Child(child));
        }
        Err(Error::NoSuchAttribute {
            node: node.name.clone(),
            attr: name.to_string(),
        })
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn node_type(&self, id: NodeId) -> TypeId {
        self.nodes[id.0].ty
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children in name order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> {
        self.nodes[id.0]
            .children
            .iter()
            .map(|(name, &cid)| (name.as_str(), cid))
    }

    /// Dotted path from the root: the root's own name, then one segment per
    /// level.
    pub fn path(&self, id: NodeId) -> String {
        let mut segs = vec![self.nodes[id.0].name.as_str()];
        let mut cur = self.nodes[id.0].parent;
        while let Some(pid) = cur {
            segs.push(self.nodes[pid.0].name.as_str());
            cur = self.nodes[pid.0].parent;
        }
        segs.reverse();
        segs.join(".")
    }
}
