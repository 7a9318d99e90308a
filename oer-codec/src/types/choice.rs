//! CHOICE
//!
//! The chosen alternative is identified by its tag. Root alternatives
//! follow their tag directly; extension addition alternatives are open
//! types, prefixed by a length determinant.

use super::{Type, format_or, mismatch};
use crate::bits::{Decoder, Encoder};
use crate::tag::format_tag;
use oer_core::{Error, OerResult, Value};
use std::collections::HashMap;

/// CHOICE alternatives with name and tag lookup tables
#[derive(Debug, Clone)]
pub struct Choice {
    root_members: Vec<Type>,
    additions: Vec<Type>,
    name_to_root_member: HashMap<String, usize>,
    name_to_addition: HashMap<String, usize>,
    tag_to_root_member: HashMap<Vec<u8>, usize>,
    tag_to_addition: HashMap<Vec<u8>, usize>,
}

impl Choice {
    /// Create from root and extension addition alternatives
    ///
    /// # Errors
    /// Returns `Error::Compile` if an alternative has no tag.
    pub fn new(root_members: Vec<Type>, additions: Option<Vec<Type>>) -> OerResult<Self> {
        let additions = additions.unwrap_or_default();

        Ok(Self {
            name_to_root_member: name_index(&root_members),
            name_to_addition: name_index(&additions),
            tag_to_root_member: tag_index(&root_members)?,
            tag_to_addition: tag_index(&additions)?,
            root_members,
            additions,
        })
    }

    pub fn root_members(&self) -> &[Type] {
        &self.root_members
    }

    pub fn additions(&self) -> &[Type] {
        &self.additions
    }

    /// Root alternatives followed by additions
    pub fn members(&self) -> impl Iterator<Item = &Type> {
        self.root_members.iter().chain(self.additions.iter())
    }

    fn format_names(&self) -> String {
        let names: Vec<String> = self.members().map(|member| member.name().to_string()).collect();
        format_or(&names)
    }

    fn format_tags(&self) -> String {
        let mut tags: Vec<String> = self
            .members()
            .filter_map(Type::tag_bytes)
            .map(|tag| format!("'{}'", format_tag(&tag)))
            .collect();
        tags.sort();
        format_or(&tags)
    }

    pub fn encode(&self, value: &Value, encoder: &mut Encoder) -> OerResult<()> {
        let Value::Choice(name, value) = value else {
            return Err(mismatch("CHOICE", value));
        };

        if let Some(&index) = self.name_to_root_member.get(name) {
            let member = &self.root_members[index];
            encoder.append_bytes(&member.tag_bytes().unwrap_or_default());
            member.encode(value, encoder)
        } else if let Some(&index) = self.name_to_addition.get(name) {
            let member = &self.additions[index];
            encoder.append_bytes(&member.tag_bytes().unwrap_or_default());
            let mut addition_encoder = Encoder::new();
            member.encode(value, &mut addition_encoder)?;
            encoder.append_open_type(addition_encoder)
        } else {
            Err(Error::Encode(format!(
                "Expected choice {}, but got '{}'.",
                self.format_names(),
                name
            )))
        }
    }

    pub fn decode(&self, decoder: &mut Decoder<'_>) -> OerResult<Value> {
        let tag = decoder.read_tag()?;

        if let Some(&index) = self.tag_to_root_member.get(&tag) {
            let member = &self.root_members[index];
            let value = member
                .decode(decoder)
                .map_err(|e| e.with_location(member.name()))?;

            Ok(Value::new_choice(member.name(), value))
        } else if let Some(&index) = self.tag_to_addition.get(&tag) {
            let member = &self.additions[index];
            let length = decoder.read_length_determinant()?;
            let offset = decoder.number_of_read_bits();
            let value = member
                .decode(decoder)
                .map_err(|e| e.with_location(member.name()))?;
            let consumed = decoder.number_of_read_bits() - offset;

            if consumed < 8 * length {
                decoder.skip_bits(8 * length - consumed)?;
            }

            Ok(Value::new_choice(member.name(), value))
        } else {
            Err(Error::decode(format!(
                "Expected choice member tag {}, but got '{}'.",
                self.format_tags(),
                format_tag(&tag)
            )))
        }
    }
}

fn name_index(members: &[Type]) -> HashMap<String, usize> {
    members
        .iter()
        .enumerate()
        .map(|(index, member)| (member.name().to_string(), index))
        .collect()
}

fn tag_index(members: &[Type]) -> OerResult<HashMap<Vec<u8>, usize>> {
    members
        .iter()
        .enumerate()
        .map(|(index, member)| {
            member.tag_bytes().map(|tag| (tag, index)).ok_or_else(|| {
                Error::Compile(format!(
                    "CHOICE member '{}' of type {} has no tag.",
                    member.name(),
                    member.type_name()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagClass;

    fn choice() -> Type {
        let choice = Choice::new(
            vec![
                Type::integer("a").with_tag(0, TagClass::ContextSpecific),
                Type::boolean("b").with_tag(1, TagClass::ContextSpecific),
            ],
            Some(vec![Type::integer("c").with_tag(2, TagClass::ContextSpecific)]),
        )
        .unwrap();

        Type::choice("C", choice)
    }

    fn encode(type_: &Type, value: &Value) -> Vec<u8> {
        let mut encoder = Encoder::new();
        type_.encode(value, &mut encoder).unwrap();
        encoder.into_bytes()
    }

    #[test]
    fn test_root_alternative() {
        let choice = choice();
        let value = Value::new_choice("b", Value::Boolean(true));
        let bytes = encode(&choice, &value);
        assert_eq!(bytes, vec![0x81, 0xFF]);

        let mut decoder = Decoder::new(&bytes);
        assert_eq!(choice.decode(&mut decoder).unwrap(), value);
    }

    #[test]
    fn test_addition_alternative() {
        let choice = choice();
        let value = Value::new_choice("c", Value::Integer(5));
        let bytes = encode(&choice, &value);
        assert_eq!(bytes, vec![0x82, 0x02, 0x01, 0x05]);

        let mut decoder = Decoder::new(&bytes);
        assert_eq!(choice.decode(&mut decoder).unwrap(), value);
        assert_eq!(decoder.number_of_bits(), 0);
    }

    #[test]
    fn test_unknown_name() {
        let mut encoder = Encoder::new();
        let err = choice()
            .encode(&Value::new_choice("d", Value::Null), &mut encoder)
            .unwrap_err();
        assert_eq!(err.to_string(), "Expected choice a, b or c, but got 'd'.");
    }

    #[test]
    fn test_unknown_tag() {
        let data = [0x83, 0x00];
        let mut decoder = Decoder::new(&data);
        let err = choice().decode(&mut decoder).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected choice member tag '80', '81' or '82', but got '83'."
        );
    }

    #[test]
    fn test_untagged_member_rejected() {
        let inner = Type::choice("inner", Choice::new(vec![], None).unwrap());
        let err = Choice::new(vec![inner], None).unwrap_err();
        assert!(matches!(err, Error::Compile(_)));
    }

    #[test]
    fn test_decode_error_location() {
        let data = [0x80];
        let mut decoder = Decoder::new(&data);
        let err = choice().decode(&mut decoder).unwrap_err();
        assert_eq!(err.location(), vec!["a"]);
        assert_eq!(err, Error::out_of_data(8).with_location("a"));
    }
}
