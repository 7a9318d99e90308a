//! SEQUENCE and SET
//!
//! # Encoding Format
//!
//! ```text
//! [extension bit] [presence bits] [padding] root members...
//!     [length] [unused bits] [addition presence bits] [padding]
//!     ([length] addition)...
//! ```
//!
//! The extension bit is only present if the type has an extension marker.
//! There is one presence bit per OPTIONAL or DEFAULT root member. Every
//! extension addition is an open type, so receivers can skip additions
//! they do not know.

use super::{Type, mismatch};
use crate::bits::{Decoder, Encoder};
use log::{debug, trace};
use oer_core::{Error, OerResult, Value};
use std::collections::BTreeMap;

/// Members shared by SEQUENCE and SET
#[derive(Debug, Clone)]
pub struct MembersType {
    root_members: Vec<Type>,
    additions: Option<Vec<Type>>,
    /// Indices of the OPTIONAL and DEFAULT root members, in presence bit order
    optionals: Vec<usize>,
}

impl MembersType {
    /// Create from root members and extension additions
    ///
    /// `additions` is `None` if the type has no extension marker.
    pub fn new(root_members: Vec<Type>, additions: Option<Vec<Type>>) -> Self {
        let optionals = root_members
            .iter()
            .enumerate()
            .filter(|(_, member)| member.is_optional() || member.default().is_some())
            .map(|(index, _)| index)
            .collect();

        Self {
            root_members,
            additions,
            optionals,
        }
    }

    pub fn root_members(&self) -> &[Type] {
        &self.root_members
    }

    pub fn additions(&self) -> Option<&[Type]> {
        self.additions.as_deref()
    }

    pub fn encode(&self, type_name: &str, value: &Value, encoder: &mut Encoder) -> OerResult<()> {
        let Value::Structure(data) = value else {
            return Err(mismatch(type_name, value));
        };

        match &self.additions {
            Some(additions) => {
                let offset = encoder.number_of_bits();
                encoder.append_bit(false);
                self.encode_root(type_name, data, encoder)?;

                if !additions.is_empty() && self.encode_additions(additions, data, encoder)? {
                    encoder.set_bit(offset);
                }
            }
            None => self.encode_root(type_name, data, encoder)?,
        }

        Ok(())
    }

    fn encode_root(
        &self,
        type_name: &str,
        data: &BTreeMap<String, Value>,
        encoder: &mut Encoder,
    ) -> OerResult<()> {
        for &index in &self.optionals {
            let optional = &self.root_members[index];
            let present = match data.get(optional.name()) {
                Some(_) if optional.is_optional() => true,
                Some(value) => !optional.is_default(value),
                None => false,
            };

            encoder.append_bit(present);
        }

        encoder.align();

        for member in &self.root_members {
            match data.get(member.name()) {
                Some(value) if member.default().is_none() || !member.is_default(value) => {
                    member.encode(value, encoder)?;
                }
                Some(_) => {}
                None if member.is_optional() || member.default().is_some() => {}
                None => {
                    return Err(Error::Encode(format!(
                        "{} member '{}' not found.",
                        type_name,
                        member.name()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Encode the present extension additions
    ///
    /// Returns `false` if no addition produced any bytes.
    fn encode_additions(
        &self,
        additions: &[Type],
        data: &BTreeMap<String, Value>,
        encoder: &mut Encoder,
    ) -> OerResult<bool> {
        let mut presence_bits = Encoder::new();
        let mut addition_encoders = Vec::new();

        for addition in additions {
            let mut addition_encoder = Encoder::new();
            let present = match data.get(addition.name()) {
                Some(value) => match addition.encode(value, &mut addition_encoder) {
                    Ok(()) => addition_encoder.number_of_bits() > 0,
                    Err(e) => {
                        debug!("Dropping extension addition '{}': {}", addition.name(), e);
                        false
                    }
                },
                None => false,
            };

            presence_bits.append_bit(present);

            if present {
                addition_encoders.push(addition_encoder);
            }
        }

        if addition_encoders.is_empty() {
            return Ok(false);
        }

        let number_of_additions = additions.len();
        let number_of_unused_bits = (8 - number_of_additions % 8) % 8;
        encoder.append_length_determinant(number_of_additions + 1)?;
        encoder.append_u8(number_of_unused_bits as u8);
        *encoder += &presence_bits;
        encoder.align();

        for addition_encoder in addition_encoders {
            encoder.append_open_type(addition_encoder)?;
        }

        Ok(true)
    }

    pub fn decode(&self, decoder: &mut Decoder<'_>) -> OerResult<Value> {
        let extended = match self.additions {
            Some(_) => decoder.read_bit()?,
            None => false,
        };

        let mut values = self.decode_root(decoder)?;

        if extended {
            self.decode_additions(decoder, &mut values)?;
        }

        Ok(Value::Structure(values))
    }

    fn decode_root(&self, decoder: &mut Decoder<'_>) -> OerResult<BTreeMap<String, Value>> {
        let mut present = vec![true; self.root_members.len()];

        for &index in &self.optionals {
            present[index] = decoder.read_bit()?;
        }

        decoder.align();

        let mut values = BTreeMap::new();

        for (member, present) in self.root_members.iter().zip(present) {
            if present {
                let value = member
                    .decode(decoder)
                    .map_err(|e| e.with_location(member.name()))?;
                values.insert(member.name().to_string(), value);
            } else if let Some(default) = member.default() {
                values.insert(member.name().to_string(), default.clone());
            }
        }

        Ok(values)
    }

    fn decode_additions(
        &self,
        decoder: &mut Decoder<'_>,
        values: &mut BTreeMap<String, Value>,
    ) -> OerResult<()> {
        let additions = self.additions.as_deref().unwrap_or_default();
        let length = decoder.read_length_determinant()?;

        let Some(number_of_presence_bits) = length.checked_sub(1) else {
            return Err(Error::decode("Extension bitmap length must be at least 1."));
        };

        decoder.read_u8()?;
        let presence_bits = decoder.read_bits(number_of_presence_bits)?;
        decoder.align();

        for index in 0..number_of_presence_bits {
            if presence_bits[index / 8] & (0x80 >> (index % 8)) == 0 {
                continue;
            }

            let member_length = decoder.read_length_determinant()?;
            let offset = decoder.number_of_read_bits();

            match additions.get(index) {
                Some(addition) => {
                    let value = addition
                        .decode(decoder)
                        .map_err(|e| e.with_location(addition.name()))?;
                    values.insert(addition.name().to_string(), value);

                    let consumed = decoder.number_of_read_bits() - offset;

                    if consumed < 8 * member_length {
                        decoder.skip_bits(8 * member_length - consumed)?;
                    }
                }
                None => {
                    trace!(
                        "Skipping unknown extension addition {} of {} bytes",
                        index, member_length
                    );
                    decoder.skip_bits(8 * member_length)?;
                }
            }
        }

        Ok(())
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

    fn decode(type_: &Type, data: &[u8]) -> Value {
        let mut decoder = Decoder::new(data);
        type_.decode(&mut decoder).unwrap()
    }

    fn optional_sequence() -> Type {
        Type::sequence(
            "S",
            MembersType::new(
                vec![Type::integer("a"), Type::integer("b").with_optional(true)],
                None,
            ),
        )
    }

    #[test]
    fn test_optional_member_absent() {
        let sequence = optional_sequence();
        let value = Value::new_structure([("a", Value::Integer(1))]);
        let bytes = encode(&sequence, &value);
        assert_eq!(bytes, vec![0x00, 0x01, 0x01]);
        assert_eq!(decode(&sequence, &bytes), value);
    }

    #[test]
    fn test_optional_member_present() {
        let sequence = optional_sequence();
        let value = Value::new_structure([("a", Value::Integer(1)), ("b", Value::Integer(2))]);
        let bytes = encode(&sequence, &value);
        assert_eq!(bytes, vec![0x80, 0x01, 0x01, 0x01, 0x02]);
        assert_eq!(decode(&sequence, &bytes), value);
    }

    #[test]
    fn test_missing_member() {
        let sequence = optional_sequence();
        let mut encoder = Encoder::new();
        let err = sequence
            .encode(&Value::new_structure([("b", Value::Integer(2))]), &mut encoder)
            .unwrap_err();
        assert_eq!(err.to_string(), "SEQUENCE member 'a' not found.");
    }

    #[test]
    fn test_default_member() {
        let sequence = Type::sequence(
            "S",
            MembersType::new(
                vec![Type::boolean("flag").with_default(Some(Value::Boolean(true)))],
                None,
            ),
        );

        let bytes = encode(&sequence, &Value::new_structure([("flag", Value::Boolean(true))]));
        assert_eq!(bytes, vec![0x00]);
        assert_eq!(
            decode(&sequence, &bytes),
            Value::new_structure([("flag", Value::Boolean(true))])
        );

        let value = Value::new_structure([("flag", Value::Boolean(false))]);
        let bytes = encode(&sequence, &value);
        assert_eq!(bytes, vec![0x80, 0x00]);
        assert_eq!(decode(&sequence, &bytes), value);
    }

    #[test]
    fn test_extension_without_additions_present() {
        let sequence = Type::sequence(
            "S",
            MembersType::new(vec![Type::boolean("a")], Some(vec![Type::integer("b")])),
        );
        let value = Value::new_structure([("a", Value::Boolean(true))]);
        let bytes = encode(&sequence, &value);
        assert_eq!(bytes, vec![0x00, 0xFF]);
        assert_eq!(decode(&sequence, &bytes), value);
    }

    #[test]
    fn test_extension_additions() {
        let sequence = Type::sequence(
            "S",
            MembersType::new(
                vec![Type::boolean("a")],
                Some(vec![Type::integer("b"), Type::boolean("c")]),
            ),
        );
        let value = Value::new_structure([
            ("a", Value::Boolean(true)),
            ("c", Value::Boolean(false)),
        ]);
        let bytes = encode(&sequence, &value);
        assert_eq!(bytes, vec![0x80, 0xFF, 0x03, 0x06, 0x40, 0x01, 0x00]);
        assert_eq!(decode(&sequence, &bytes), value);
    }

    #[test]
    fn test_failing_addition_is_dropped() {
        let sequence = Type::sequence(
            "S",
            MembersType::new(
                vec![Type::boolean("a")],
                Some(vec![Type::integer("b"), Type::boolean("c")]),
            ),
        );
        let value = Value::new_structure([
            ("a", Value::Boolean(true)),
            ("b", Value::Boolean(true)),
            ("c", Value::Boolean(true)),
        ]);
        let bytes = encode(&sequence, &value);
        assert_eq!(bytes, vec![0x80, 0xFF, 0x03, 0x06, 0x40, 0x01, 0xFF]);
    }

    #[test]
    fn test_unknown_additions_are_skipped() {
        let newer = Type::sequence(
            "S",
            MembersType::new(
                vec![Type::boolean("a")],
                Some(vec![Type::integer("b"), Type::integer("c")]),
            ),
        );
        let older = Type::sequence(
            "S",
            MembersType::new(vec![Type::boolean("a")], Some(vec![Type::integer("b")])),
        );

        let bytes = encode(
            &newer,
            &Value::new_structure([
                ("a", Value::Boolean(false)),
                ("b", Value::Integer(1)),
                ("c", Value::Integer(300)),
            ]),
        );
        let mut decoder = Decoder::new(&bytes);
        let value = older.decode(&mut decoder).unwrap();
        assert_eq!(
            value,
            Value::new_structure([("a", Value::Boolean(false)), ("b", Value::Integer(1))])
        );
        assert_eq!(decoder.number_of_bits(), 0);
    }

    #[test]
    fn test_decode_error_location() {
        let inner = Type::sequence("inner", MembersType::new(vec![Type::boolean("x")], None));
        let outer = Type::sequence("S", MembersType::new(vec![inner], None));
        let mut decoder = Decoder::new(&[]);
        let err = outer.decode(&mut decoder).unwrap_err();
        assert_eq!(err.location(), vec!["inner", "x"]);
        assert_eq!(err.to_string(), "inner.x: out of data at bit offset 0 (0.0 bytes)");
    }
}
