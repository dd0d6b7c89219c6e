//! Error types for the configuration core.

/// Result type for configuration-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while loading descriptions, building the
/// type registry, or assembling a configuration tree.
///
/// Registry-build errors (`MalformedRecord`, `UnknownParent`,
/// `CyclicInheritance`, `DuplicateType`) abort the whole load; there is no
/// partial registry. Tree errors are reported at the offending call and
/// leave previously valid state untouched.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Record text does not match the OBJECT/PARAMS shape, or a declaration
    /// inside its parameter block does not parse.
    #[error("malformed record '{name}': {reason}")]
    MalformedRecord { name: String, reason: String },

    /// A record names a parent that has no record of its own.
    #[error("type '{ty}' has unknown parent '{parent}'")]
    UnknownParent { ty: String, parent: String },

    /// Parent resolution re-entered a type that was already mid-resolution.
    #[error("cyclic inheritance: {chain}")]
    CyclicInheritance { chain: String },

    /// A second definition of an already registered type name.
    #[error("duplicate definition of type '{name}'")]
    DuplicateType { name: String },

    /// A value failed coercion against a parameter's declared kind.
    #[error("parameter '{param}' expects {expected}, got {value}")]
    TypeMismatch {
        param: String,
        expected: String,
        value: String,
    },

    /// Assignment to a name that is neither private nor a declared parameter.
    #[error("type '{ty}' has no parameter '{param}'")]
    UnknownParameter { ty: String, param: String },

    /// Read of a name that is no parameter, child, or private entry.
    #[error("node '{node}' has no attribute or child '{attr}'")]
    NoSuchAttribute { node: String, attr: String },

    /// A sibling with the same name already exists.
    #[error("node '{parent}' already has a child '{child}'")]
    DuplicateChildName { parent: String, child: String },

    /// The node is already attached somewhere in a tree.
    #[error("node '{child}' already has a parent")]
    AlreadyParented { child: String },

    /// Adoption that would make a node its own ancestor.
    #[error("adopting '{child}' under '{parent}' would create a cycle")]
    AdoptionCycle { parent: String, child: String },

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}
