//! Record parsing: split a raw description record into its header (name,
//! parent) and opaque parameter block.
//!
//! Record shape:
//!
//! ```text
//! OBJECT: BaseCache (Object)
//! PARAMS:
//!     size = Param(Addr, "capacity in bytes", 64*K)
//!     assoc = Param(Int, "associativity")
//! ```

use regex::Regex;

use crate::error::{Error, Result};

/// Parsed record pieces. The parameter block stays opaque here; the class
/// graph builder evaluates it against the declaration vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordParts {
    pub name: String,
    pub parent: String,
    pub params_src: String,
}

/// Extract `(name, parent, parameter block)` from one record.
///
/// `key` is the name the record was enumerated under; the header must agree
/// with it.
pub fn parse_record(key: &str, text: &str) -> Result<RecordParts> {
    let re = Regex::new(
        r"(?m)^OBJECT:[ \t]*(\w+)[ \t]*\([ \t]*(\w+)[ \t]*\)[ \t]*\s*^PARAMS:[ \t]*\r?\n((?:[ \t]+.*(?:\r?\n)?)*)",
    )?;

    let caps = match re.captures(text) {
        Some(c) => c,
        None => {
            return Err(Error::MalformedRecord {
                name: key.to_string(),
                reason: "expected 'OBJECT: Name (Parent)' followed by a 'PARAMS:' block".to_string(),
            });
        }
    };

    let name = caps[1].to_string();
    let parent = caps[2].to_string();
    if name != key {
        return Err(Error::MalformedRecord {
            name: key.to_string(),
            reason: format!("header declares '{}' but the record is enumerated as '{}'", name, key),
        });
    }

    Ok(RecordParts {
        name,
        parent,
        params_src: caps[3].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_header_and_block() {
        let text = "OBJECT: BaseCache (Object)\nPARAMS:\n    size = Param(Int, \"bytes\", 4)\n    assoc = Param(Int, \"ways\")\n";
        let parts = parse_record("BaseCache", text).unwrap();
        assert_eq!(parts.name, "BaseCache");
        assert_eq!(parts.parent, "Object");
        assert_eq!(
            parts.params_src,
            "    size = Param(Int, \"bytes\", 4)\n    assoc = Param(Int, \"ways\")\n"
        );
    }

    #[test]
    fn tolerates_loose_spacing_and_empty_blocks() {
        let text = "OBJECT:Root( Object )\nPARAMS:\n";
        let parts = parse_record("Root", text).unwrap();
        assert_eq!(parts.parent, "Object");
        assert_eq!(parts.params_src, "");
    }

    #[test]
    fn missing_header_is_malformed() {
        let err = parse_record("Thing", "just some text\n").unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn header_must_match_the_enumerated_name() {
        let text = "OBJECT: Other (Object)\nPARAMS:\n";
        let err = parse_record("Thing", text).unwrap_err();
        match err {
            Error::MalformedRecord { name, reason } => {
                assert_eq!(name, "Thing");
                assert!(reason.contains("Other"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
