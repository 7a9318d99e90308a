//! Schema descriptors consumed by the compiler
//!
//! A schema is a map from module name to [`ModuleDescriptor`], in the
//! dictionary form produced by an ASN.1 module parser. For example:
//!
//! ```json
//! {
//!     "Foo": {
//!         "types": {
//!             "Question": {
//!                 "type": "SEQUENCE",
//!                 "members": [
//!                     {"name": "id", "type": "INTEGER", "restricted-to": [[0, 255]]},
//!                     {"name": "question", "type": "IA5String"},
//!                     "..."
//!                 ]
//!             }
//!         }
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extension marker in member, value and range lists
pub const EXTENSION_MARKER: &str = "...";

/// Modules of a schema, by name
pub type SchemaDescriptor = BTreeMap<String, ModuleDescriptor>;

/// One ASN.1 module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    #[serde(default)]
    pub types: BTreeMap<String, TypeDescriptor>,
    /// Named values, usable as range and size bounds
    #[serde(default)]
    pub values: BTreeMap<String, ValueDescriptor>,
    /// Names visible from other modules, by module name
    #[serde(default)]
    pub imports: BTreeMap<String, Vec<String>>,
}

/// A named value assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDescriptor {
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: serde_json::Value,
}

/// Tag override of a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDescriptor {
    /// `APPLICATION`, `PRIVATE`, or absent for context-specific
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub number: u32,
}

/// Description of one type or member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TypeDescriptor {
    /// Built-in type name (`SEQUENCE`, `INTEGER`, ...) or a reference to a
    /// user-defined type
    #[serde(rename = "type")]
    pub type_name: String,
    /// Member name, for members of SEQUENCE, SET and CHOICE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<MemberEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<TypeDescriptor>>,
    /// ENUMERATED values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<EnumEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec<RangeEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_to: Option<Vec<RangeEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagDescriptor>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl TypeDescriptor {
    /// Create a descriptor of the given type with no other attributes
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            members: None,
            element: None,
            values: None,
            size: None,
            restricted_to: None,
            tag: None,
            optional: false,
            default: None,
        }
    }
}

/// Entry of a SEQUENCE, SET or CHOICE member list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberEntry {
    /// Extension marker; any other string is rejected by the compiler
    Marker(String),
    /// Extension addition group
    Group(Vec<TypeDescriptor>),
    Member(Box<TypeDescriptor>),
}

/// Entry of an ENUMERATED value list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumEntry {
    /// `[name, number]`
    Numbered(String, i64),
    /// Name without number, or the extension marker
    Name(String),
}

/// Bound of a range: an integer, `MIN`, `MAX` or a named value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeBound {
    Unsigned(u64),
    Signed(i64),
    Name(String),
}

/// Entry of a `size` or `restricted-to` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeEntry {
    /// `[lower, upper]`
    Range(RangeBound, RangeBound),
    /// A single value, or the extension marker
    Value(RangeBound),
}

impl RangeEntry {
    pub fn is_extension_marker(&self) -> bool {
        matches!(self, RangeEntry::Value(RangeBound::Name(name)) if name == EXTENSION_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_module() {
        let schema: SchemaDescriptor = serde_json::from_value(json!({
            "Foo": {
                "types": {
                    "Question": {
                        "type": "SEQUENCE",
                        "members": [
                            {"name": "id", "type": "INTEGER", "restricted-to": [[0, "MAX"]]},
                            "...",
                            [{"name": "a", "type": "BOOLEAN", "optional": true}]
                        ]
                    },
                    "Color": {
                        "type": "ENUMERATED",
                        "values": [["red", 0], "green", "..."]
                    }
                },
                "values": {
                    "max-id": {"type": "INTEGER", "value": 10}
                }
            }
        }))
        .unwrap();

        let module = &schema["Foo"];
        let question = &module.types["Question"];
        assert_eq!(question.type_name, "SEQUENCE");

        let members = question.members.as_ref().unwrap();
        assert_eq!(members.len(), 3);

        let MemberEntry::Member(id) = &members[0] else {
            panic!("expected a member");
        };
        assert_eq!(id.name.as_deref(), Some("id"));
        assert_eq!(
            id.restricted_to,
            Some(vec![RangeEntry::Range(
                RangeBound::Unsigned(0),
                RangeBound::Name("MAX".to_string())
            )])
        );
        assert_eq!(members[1], MemberEntry::Marker("...".to_string()));
        assert!(matches!(&members[2], MemberEntry::Group(group) if group[0].optional));

        let values = module.types["Color"].values.as_ref().unwrap();
        assert_eq!(values[0], EnumEntry::Numbered("red".to_string(), 0));
        assert_eq!(values[1], EnumEntry::Name("green".to_string()));
        assert_eq!(module.values["max-id"].value, json!(10));
    }

    #[test]
    fn test_tag_descriptor() {
        let descriptor: TypeDescriptor = serde_json::from_value(json!({
            "type": "INTEGER",
            "tag": {"class": "APPLICATION", "number": 5}
        }))
        .unwrap();
        assert_eq!(
            descriptor.tag,
            Some(TagDescriptor {
                class: Some("APPLICATION".to_string()),
                number: 5
            })
        );
    }

    #[test]
    fn test_negative_bound() {
        let entry: RangeEntry = serde_json::from_value(json!([-5, 5])).unwrap();
        assert_eq!(
            entry,
            RangeEntry::Range(RangeBound::Signed(-5), RangeBound::Unsigned(5))
        );
        assert!(serde_json::from_value::<RangeEntry>(json!("...")).unwrap().is_extension_marker());
    }
}
