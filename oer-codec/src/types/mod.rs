//! OER type hierarchy
//!
//! A compiled schema is a tree of [`Type`] nodes. Each node carries the
//! attributes every ASN.1 type shares (member name, tag, OPTIONAL, DEFAULT)
//! and a [`TypeKind`] holding the variant specific state. Encoding and
//! decoding dispatch on the kind:
//!
//! - Primitives: BOOLEAN, INTEGER, ENUMERATED, NULL
//! - Strings: BIT STRING, OCTET STRING and the known-multiplier character
//!   strings
//! - Structured: SEQUENCE and SET ([`MembersType`]), SEQUENCE OF and SET OF
//!   ([`ArrayType`]), CHOICE ([`Choice`])
//! - Stubs without an OER implementation ([`StubKind`])
//! - [`Recursive`] references back into the compiled type arena
//!
//! Nodes are immutable once built; the builder methods (`with_tag`,
//! `with_optional`, ...) consume a node and return the modified one.

pub mod array;
pub mod choice;
pub mod members;
pub mod primitive;
pub mod recursive;
pub mod string;

pub use array::ArrayType;
pub use choice::Choice;
pub use members::MembersType;
pub use primitive::{Enumerated, Integer, StubKind};
pub use recursive::Recursive;
pub use string::{BitStringType, KnownMultiplierString, OctetStringType, StringKind};

use crate::bits::{Decoder, Encoder};
use crate::tag::{Tag, TagClass, universal};
use oer_core::{Error, OerResult, Value};
use std::fmt;

/// Value range (`restricted-to`) or size range of a type
///
/// `None` bounds stand for `MIN` and `MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range {
    pub minimum: Option<i128>,
    pub maximum: Option<i128>,
    pub has_extension_marker: bool,
}

impl Range {
    pub fn new(minimum: Option<i128>, maximum: Option<i128>, has_extension_marker: bool) -> Self {
        Self {
            minimum,
            maximum,
            has_extension_marker,
        }
    }

    /// The only permitted value of a non-extensible range with equal bounds
    pub fn fixed(&self) -> Option<i128> {
        if self.has_extension_marker {
            return None;
        }

        match (self.minimum, self.maximum) {
            (Some(minimum), Some(maximum)) if minimum == maximum => Some(minimum),
            _ => None,
        }
    }

    /// Check whether `value` lies within the bounds
    pub fn contains(&self, value: i128) -> bool {
        self.minimum.is_none_or(|minimum| value >= minimum)
            && self.maximum.is_none_or(|maximum| value <= maximum)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minimum {
            Some(minimum) => write!(f, "{}", minimum)?,
            None => f.write_str("MIN")?,
        }

        match self.maximum {
            Some(maximum) => write!(f, "..{}", maximum),
            None => f.write_str("..MAX"),
        }
    }
}

/// Variant specific part of a [`Type`]
#[derive(Debug, Clone)]
pub enum TypeKind {
    Boolean,
    Integer(Integer),
    Enumerated(Enumerated),
    Null,
    BitString(BitStringType),
    OctetString(OctetStringType),
    KnownMultiplierString(KnownMultiplierString),
    Sequence(MembersType),
    Set(MembersType),
    SequenceOf(ArrayType),
    SetOf(ArrayType),
    Choice(Choice),
    Unimplemented(StubKind),
    Recursive(Recursive),
}

impl TypeKind {
    /// ASN.1 type name, as used in error messages
    pub fn type_name(&self) -> &str {
        match self {
            TypeKind::Boolean => "BOOLEAN",
            TypeKind::Integer(_) => "INTEGER",
            TypeKind::Enumerated(_) => "ENUMERATED",
            TypeKind::Null => "NULL",
            TypeKind::BitString(_) => "BIT STRING",
            TypeKind::OctetString(_) => "OCTET STRING",
            TypeKind::KnownMultiplierString(string) => string.kind().type_name(),
            TypeKind::Sequence(_) => "SEQUENCE",
            TypeKind::Set(_) => "SET",
            TypeKind::SequenceOf(_) => "SEQUENCE OF",
            TypeKind::SetOf(_) => "SET OF",
            TypeKind::Choice(_) => "CHOICE",
            TypeKind::Unimplemented(stub) => stub.type_name(),
            TypeKind::Recursive(recursive) => recursive.type_name(),
        }
    }

    fn universal_tag(&self) -> Option<u32> {
        match self {
            TypeKind::Boolean => Some(universal::BOOLEAN),
            TypeKind::Integer(_) => Some(universal::INTEGER),
            TypeKind::Enumerated(_) => Some(universal::ENUMERATED),
            TypeKind::Null => Some(universal::NULL),
            TypeKind::BitString(_) => Some(universal::BIT_STRING),
            TypeKind::OctetString(_) => Some(universal::OCTET_STRING),
            TypeKind::KnownMultiplierString(string) => Some(string.kind().tag_number()),
            TypeKind::Sequence(_) | TypeKind::SequenceOf(_) => Some(universal::SEQUENCE),
            TypeKind::Set(_) | TypeKind::SetOf(_) => Some(universal::SET),
            TypeKind::Unimplemented(stub) => stub.tag_number(),
            TypeKind::Choice(_) | TypeKind::Recursive(_) => None,
        }
    }
}

/// One node of a compiled schema
#[derive(Debug, Clone)]
pub struct Type {
    name: String,
    tag: Option<Tag>,
    optional: bool,
    default: Option<Value>,
    kind: TypeKind,
}

impl Type {
    /// Create a node with the universal tag of its kind
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            tag: kind.universal_tag().map(Tag::universal),
            optional: false,
            default: None,
            kind,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Boolean)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Integer(Integer::new()))
    }

    pub fn enumerated(name: impl Into<String>, enumerated: Enumerated) -> Self {
        Self::new(name, TypeKind::Enumerated(enumerated))
    }

    pub fn null(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Null)
    }

    pub fn bit_string(name: impl Into<String>, size: Option<&Range>) -> Self {
        Self::new(name, TypeKind::BitString(BitStringType::new(size)))
    }

    pub fn octet_string(name: impl Into<String>, size: Option<&Range>) -> Self {
        Self::new(name, TypeKind::OctetString(OctetStringType::new(size)))
    }

    pub fn string(name: impl Into<String>, kind: StringKind, size: Option<&Range>) -> Self {
        Self::new(
            name,
            TypeKind::KnownMultiplierString(KnownMultiplierString::new(kind, size)),
        )
    }

    pub fn sequence(name: impl Into<String>, members: MembersType) -> Self {
        Self::new(name, TypeKind::Sequence(members))
    }

    pub fn set(name: impl Into<String>, members: MembersType) -> Self {
        Self::new(name, TypeKind::Set(members))
    }

    pub fn sequence_of(name: impl Into<String>, element_type: Type) -> Self {
        Self::new(name, TypeKind::SequenceOf(ArrayType::new(element_type)))
    }

    pub fn set_of(name: impl Into<String>, element_type: Type) -> Self {
        Self::new(name, TypeKind::SetOf(ArrayType::new(element_type)))
    }

    pub fn choice(name: impl Into<String>, choice: Choice) -> Self {
        Self::new(name, TypeKind::Choice(choice))
    }

    pub fn unimplemented(name: impl Into<String>, stub: StubKind) -> Self {
        Self::new(name, TypeKind::Unimplemented(stub))
    }

    pub fn recursive(name: impl Into<String>, recursive: Recursive) -> Self {
        Self::new(name, TypeKind::Recursive(recursive))
    }

    /// Replace the tag
    ///
    /// APPLICATION and PRIVATE classes are kept, any other class becomes
    /// context-specific.
    pub fn with_tag(mut self, number: u32, class: TagClass) -> Self {
        let class = match class {
            TagClass::Application | TagClass::Private => class,
            _ => TagClass::ContextSpecific,
        };

        self.tag = Some(Tag::new(class, number));
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
    }

    /// Apply a `restricted-to` value range
    ///
    /// Only INTEGER uses the range on the wire; other kinds are unchanged.
    pub fn with_restricted_to_range(mut self, range: &Range) -> Self {
        if let TypeKind::Integer(integer) = &mut self.kind {
            integer.set_restricted_to_range(range);
        }

        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }

    /// Encoded tag octets, if the type has a tag
    pub fn tag_bytes(&self) -> Option<Vec<u8>> {
        self.tag.map(|tag| tag.encode())
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    /// Check if `value` equals the DEFAULT of this type
    pub fn is_default(&self, value: &Value) -> bool {
        self.default.as_ref() == Some(value)
    }

    /// Encode `value` onto `encoder`
    pub fn encode(&self, value: &Value, encoder: &mut Encoder) -> OerResult<()> {
        match &self.kind {
            TypeKind::Boolean => match value {
                Value::Boolean(value) => {
                    encoder.append_u8(if *value { 0xFF } else { 0x00 });
                    Ok(())
                }
                _ => Err(mismatch(self.type_name(), value)),
            },
            TypeKind::Integer(integer) => match value {
                Value::Integer(value) => integer.encode(*value, encoder),
                _ => Err(mismatch(self.type_name(), value)),
            },
            TypeKind::Enumerated(enumerated) => enumerated.encode(value, encoder),
            TypeKind::Null => Ok(()),
            TypeKind::BitString(bit_string) => match value {
                Value::BitString(value) => bit_string.encode(value, encoder),
                _ => Err(mismatch(self.type_name(), value)),
            },
            TypeKind::OctetString(octet_string) => match value {
                Value::OctetString(value) => octet_string.encode(value, encoder),
                _ => Err(mismatch(self.type_name(), value)),
            },
            TypeKind::KnownMultiplierString(string) => match value {
                Value::String(value) => string.encode(value, encoder),
                _ => Err(mismatch(self.type_name(), value)),
            },
            TypeKind::Sequence(members) | TypeKind::Set(members) => {
                members.encode(self.type_name(), value, encoder)
            }
            TypeKind::SequenceOf(array) | TypeKind::SetOf(array) => {
                array.encode(self.type_name(), value, encoder)
            }
            TypeKind::Choice(choice) => choice.encode(value, encoder),
            TypeKind::Unimplemented(stub) => Err(stub.not_implemented()),
            TypeKind::Recursive(recursive) => recursive.encode(value, encoder),
        }
    }

    /// Decode a value of this type from `decoder`
    pub fn decode(&self, decoder: &mut Decoder<'_>) -> OerResult<Value> {
        match &self.kind {
            TypeKind::Boolean => Ok(Value::Boolean(decoder.read_u8()? != 0)),
            TypeKind::Integer(integer) => Ok(Value::Integer(integer.decode(decoder)?)),
            TypeKind::Enumerated(enumerated) => enumerated.decode(decoder),
            TypeKind::Null => Ok(Value::Null),
            TypeKind::BitString(bit_string) => Ok(Value::BitString(bit_string.decode(decoder)?)),
            TypeKind::OctetString(octet_string) => {
                Ok(Value::OctetString(octet_string.decode(decoder)?))
            }
            TypeKind::KnownMultiplierString(string) => Ok(Value::String(string.decode(decoder)?)),
            TypeKind::Sequence(members) | TypeKind::Set(members) => members.decode(decoder),
            TypeKind::SequenceOf(array) | TypeKind::SetOf(array) => array.decode(decoder),
            TypeKind::Choice(choice) => choice.decode(decoder),
            TypeKind::Unimplemented(stub) => Err(stub.not_implemented()),
            TypeKind::Recursive(recursive) => recursive.decode(decoder),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.name;

        match &self.kind {
            TypeKind::Boolean => write!(f, "Boolean({})", name),
            TypeKind::Integer(_) => write!(f, "Integer({})", name),
            TypeKind::Enumerated(_) => write!(f, "Enumerated({})", name),
            TypeKind::Null => write!(f, "Null({})", name),
            TypeKind::BitString(_) => write!(f, "BitString({})", name),
            TypeKind::OctetString(_) => write!(f, "OctetString({})", name),
            TypeKind::KnownMultiplierString(string) => {
                write!(f, "{}({})", string.kind().type_name(), name)
            }
            TypeKind::Sequence(members) => {
                write!(f, "Sequence({}, [{}])", name, join(members.root_members()))
            }
            TypeKind::Set(members) => write!(f, "Set({}, [{}])", name, join(members.root_members())),
            TypeKind::SequenceOf(array) => {
                write!(f, "SequenceOf({}, {})", name, array.element_type())
            }
            TypeKind::SetOf(array) => write!(f, "SetOf({}, {})", name, array.element_type()),
            TypeKind::Choice(choice) => {
                let members: Vec<String> = choice.members().map(ToString::to_string).collect();
                write!(f, "Choice({}, [{}])", name, members.join(", "))
            }
            TypeKind::Unimplemented(stub) => write!(f, "{}({})", stub, name),
            TypeKind::Recursive(_) => write!(f, "Recursive({})", name),
        }
    }
}

fn join(types: &[Type]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Encode error for a value of the wrong variant
pub(crate) fn mismatch(type_name: &str, value: &Value) -> Error {
    Error::Encode(format!(
        "Expected {} value, but got {}.",
        type_name,
        value.kind_name()
    ))
}

/// Join items as `a, b or c`
pub(crate) fn format_or(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [item] => item.clone(),
        [head @ .., last] => format!("{} or {}", head.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(type_: &Type, value: &Value) -> Vec<u8> {
        let mut encoder = Encoder::new();
        type_.encode(value, &mut encoder).unwrap();
        encoder.into_bytes()
    }

    #[test]
    fn test_boolean() {
        let boolean = Type::boolean("b");
        assert_eq!(encode(&boolean, &Value::Boolean(true)), vec![0xFF]);
        assert_eq!(encode(&boolean, &Value::Boolean(false)), vec![0x00]);

        for data in [[0x01], [0xFF]] {
            let mut decoder = Decoder::new(&data);
            assert_eq!(boolean.decode(&mut decoder).unwrap(), Value::Boolean(true));
        }
    }

    #[test]
    fn test_value_mismatch() {
        let mut encoder = Encoder::new();
        let err = Type::boolean("b")
            .encode(&Value::Integer(1), &mut encoder)
            .unwrap_err();
        assert_eq!(
            err,
            Error::Encode("Expected BOOLEAN value, but got integer.".to_string())
        );
    }

    #[test]
    fn test_null_is_empty() {
        let null = Type::null("n");
        assert!(encode(&null, &Value::Null).is_empty());
        let mut decoder = Decoder::new(&[]);
        assert_eq!(null.decode(&mut decoder).unwrap(), Value::Null);
    }

    #[test]
    fn test_with_tag_class() {
        let integer = Type::integer("i").with_tag(3, TagClass::Universal);
        assert_eq!(integer.tag(), Some(Tag::context_specific(3)));
        let integer = Type::integer("i").with_tag(3, TagClass::Application);
        assert_eq!(integer.tag_bytes(), Some(vec![0x43]));
        let integer = Type::integer("i").with_tag(3, TagClass::Private);
        assert_eq!(integer.tag_bytes(), Some(vec![0xC3]));
    }

    #[test]
    fn test_universal_tags() {
        assert_eq!(Type::integer("").tag_bytes(), Some(vec![0x02]));
        assert_eq!(Type::sequence("", MembersType::new(vec![], None)).tag_bytes(), Some(vec![0x10]));
        assert_eq!(Type::set("", MembersType::new(vec![], None)).tag_bytes(), Some(vec![0x11]));
        assert_eq!(
            Type::string("", StringKind::Ia5, None).tag_bytes(),
            Some(vec![0x16])
        );
    }

    #[test]
    fn test_range() {
        let range = Range::new(Some(0), Some(255), false);
        assert!(range.contains(0));
        assert!(range.contains(255));
        assert!(!range.contains(256));
        assert_eq!(range.fixed(), None);
        assert_eq!(range.to_string(), "0..255");
        assert_eq!(Range::new(Some(4), Some(4), false).fixed(), Some(4));
        assert_eq!(Range::new(Some(4), Some(4), true).fixed(), None);
        assert_eq!(Range::new(None, Some(4), false).to_string(), "MIN..4");
    }

    #[test]
    fn test_format_or() {
        assert_eq!(format_or(&[]), "");
        assert_eq!(format_or(&["a".to_string()]), "a");
        assert_eq!(
            format_or(&["a".to_string(), "b".to_string(), "c".to_string()]),
            "a, b or c"
        );
    }

    #[test]
    fn test_display() {
        let sequence = Type::sequence(
            "a",
            MembersType::new(vec![Type::integer("b"), Type::boolean("c")], None),
        );
        assert_eq!(sequence.to_string(), "Sequence(a, [Integer(b), Boolean(c)])");
    }
}
