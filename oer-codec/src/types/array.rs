//! SEQUENCE OF and SET OF

use super::{Type, mismatch};
use crate::bits::{Decoder, Encoder};
use oer_core::{Error, OerResult, Value};

/// Elements shared by SEQUENCE OF and SET OF
///
/// The element count is encoded as an integer (length determinant and two's
/// complement bytes), followed by every element.
#[derive(Debug, Clone)]
pub struct ArrayType {
    element_type: Box<Type>,
}

impl ArrayType {
    pub fn new(element_type: Type) -> Self {
        Self {
            element_type: Box::new(element_type),
        }
    }

    pub fn element_type(&self) -> &Type {
        &self.element_type
    }

    pub fn encode(&self, type_name: &str, value: &Value, encoder: &mut Encoder) -> OerResult<()> {
        let Value::Array(elements) = value else {
            return Err(mismatch(type_name, value));
        };

        encoder.append_integer(elements.len() as i128)?;

        for element in elements {
            self.element_type.encode(element, encoder)?;
        }

        Ok(())
    }

    pub fn decode(&self, decoder: &mut Decoder<'_>) -> OerResult<Value> {
        let length = decoder.read_integer()?;

        if length < 0 {
            return Err(Error::decode(format!(
                "Expected a non-negative number of elements, but got {}.",
                length
            )));
        }

        let mut elements = Vec::new();

        for _ in 0..length {
            elements.push(self.element_type.decode(decoder)?);
        }

        Ok(Value::Array(elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MembersType;
    use std::collections::BTreeMap;

    #[test]
    fn test_sequence_of_integers() {
        let sequence_of = Type::sequence_of("A", Type::integer(""));
        let value = Value::Array(vec![Value::Integer(1), Value::Integer(-1), Value::Integer(256)]);
        let mut encoder = Encoder::new();
        sequence_of.encode(&value, &mut encoder).unwrap();
        let bytes = encoder.into_bytes();
        assert_eq!(
            bytes,
            vec![0x01, 0x03, 0x01, 0x01, 0x01, 0xFF, 0x02, 0x01, 0x00]
        );

        let mut decoder = Decoder::new(&bytes);
        assert_eq!(sequence_of.decode(&mut decoder).unwrap(), value);
    }

    #[test]
    fn test_empty_set_of() {
        let set_of = Type::set_of("A", Type::boolean(""));
        let mut encoder = Encoder::new();
        set_of.encode(&Value::Array(vec![]), &mut encoder).unwrap();
        assert_eq!(encoder.into_bytes(), vec![0x01, 0x00]);
    }

    #[test]
    fn test_sequence_of_sequences() {
        let element = Type::sequence(
            "",
            MembersType::new(vec![Type::boolean("x").with_optional(true)], None),
        );
        let sequence_of = Type::sequence_of("A", element);
        let value = Value::Array(vec![
            Value::new_structure([("x", Value::Boolean(true))]),
            Value::Structure(BTreeMap::new()),
        ]);
        let mut encoder = Encoder::new();
        sequence_of.encode(&value, &mut encoder).unwrap();
        let bytes = encoder.into_bytes();
        assert_eq!(bytes, vec![0x01, 0x02, 0x80, 0xFF, 0x00]);

        let mut decoder = Decoder::new(&bytes);
        assert_eq!(sequence_of.decode(&mut decoder).unwrap(), value);
    }

    #[test]
    fn test_negative_count() {
        let data = [0x01, 0xFF];
        let mut decoder = Decoder::new(&data);
        let err = Type::sequence_of("A", Type::integer(""))
            .decode(&mut decoder)
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_truncated_elements() {
        let data = [0x01, 0x02, 0xFF];
        let mut decoder = Decoder::new(&data);
        let err = Type::sequence_of("A", Type::boolean(""))
            .decode(&mut decoder)
            .unwrap_err();
        assert_eq!(err, Error::out_of_data(24));
    }
}
