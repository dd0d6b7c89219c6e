//! Description records: the enumerated record mapping, record-header
//! parsing, and the parameter-declaration language.
//!
//! Discovery of record files on disk is deliberately not here. The caller
//! enumerates records however it likes and hands the core a [`RecordSet`].

pub mod decl;
pub mod record;

pub use decl::{ParamDecl, parse_decls};
pub use record::{RecordParts, parse_record};

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// The enumerated mapping record-name -> record source text.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: BTreeMap<String, String>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one record source. A second record under the same name is
    /// rejected rather than clobbering the first.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.records.contains_key(&name) {
            return Err(Error::DuplicateType { name });
        }
        self.records.insert(name, source.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.records.get(name).map(|s| s.as_str())
    }

    /// Records in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
