//! INTEGER, ENUMERATED and the types without an OER implementation

use super::{Range, format_or, mismatch};
use crate::bits::{Decoder, Encoder};
use crate::tag::universal;
use oer_core::{Error, OerResult, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Width of a fixed-size INTEGER encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FixedWidth {
    length: usize,
    signed: bool,
}

impl FixedWidth {
    /// Smallest of 1, 2, 4 or 8 bytes covering `minimum..maximum`
    fn for_range(minimum: i128, maximum: i128) -> Option<Self> {
        let signed = minimum < 0;

        [1, 2, 4, 8]
            .into_iter()
            .map(|length| Self { length, signed })
            .find(|width| {
                let (lower, upper) = width.bounds();
                minimum >= lower && maximum <= upper
            })
    }

    fn bounds(&self) -> (i128, i128) {
        let number_of_bits = 8 * self.length as u32;

        if self.signed {
            let half = 1i128 << (number_of_bits - 1);
            (-half, half - 1)
        } else {
            (0, (1i128 << number_of_bits) - 1)
        }
    }
}

/// INTEGER
///
/// A closed `restricted-to` range without extension marker selects a
/// fixed-width encoding of 1, 2, 4 or 8 bytes, signed if the lower bound is
/// negative. Any other integer is encoded as a length determinant followed
/// by its minimal two's complement bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Integer {
    has_extension_marker: bool,
    fixed: Option<FixedWidth>,
}

impl Integer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_restricted_to_range(&mut self, range: &Range) {
        self.has_extension_marker = range.has_extension_marker;
        self.fixed = None;

        if range.has_extension_marker {
            return;
        }

        if let (Some(minimum), Some(maximum)) = (range.minimum, range.maximum) {
            self.fixed = FixedWidth::for_range(minimum, maximum);
        }
    }

    /// Number of bytes of the fixed-width encoding, if selected
    pub fn fixed_length(&self) -> Option<usize> {
        self.fixed.map(|width| width.length)
    }

    pub fn encode(&self, value: i128, encoder: &mut Encoder) -> OerResult<()> {
        let Some(width) = self.fixed else {
            return encoder.append_integer(value);
        };

        let (lower, upper) = width.bounds();

        if value < lower || value > upper {
            return Err(Error::Encode(format!(
                "Expected an integer between {} and {}, but got {}.",
                lower, upper, value
            )));
        }

        let number_of_bits = 8 * width.length;
        let mask = (1u128 << number_of_bits) - 1;
        encoder.append_non_negative_binary_integer(value as u128 & mask, number_of_bits);

        Ok(())
    }

    pub fn decode(&self, decoder: &mut Decoder<'_>) -> OerResult<i128> {
        let Some(width) = self.fixed else {
            return decoder.read_integer();
        };

        let number_of_bits = 8 * width.length;
        let value = decoder.read_non_negative_binary_integer(number_of_bits)?;

        if width.signed {
            let shift = 128 - number_of_bits;
            Ok(((value << shift) as i128) >> shift)
        } else {
            Ok(value as i128)
        }
    }
}

/// ENUMERATED
///
/// Numbers 0 to 127 are encoded in a single byte. Other numbers use the
/// long form: a length determinant and two's complement bytes, with the
/// first bit of the length byte set to tell the forms apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumerated {
    value_to_name: BTreeMap<i128, String>,
    name_to_value: HashMap<String, i128>,
    numeric: bool,
}

impl Enumerated {
    /// Create an enumeration from `(name, number)` pairs
    ///
    /// With `numeric` set, values are exchanged as [`Value::Integer`]
    /// instead of [`Value::Enumerated`].
    pub fn new(values: Vec<(String, i128)>, numeric: bool) -> Self {
        let name_to_value = values.iter().cloned().collect();
        let value_to_name = values.into_iter().map(|(name, value)| (value, name)).collect();

        Self {
            value_to_name,
            name_to_value,
            numeric,
        }
    }

    /// Number of the given enumeration name
    pub fn value_of(&self, name: &str) -> Option<i128> {
        self.name_to_value.get(name).copied()
    }

    /// Name of the given enumeration number
    pub fn name_of(&self, value: i128) -> Option<&str> {
        self.value_to_name.get(&value).map(String::as_str)
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    fn format_names(&self) -> String {
        let names: Vec<String> = self.value_to_name.values().cloned().collect();
        format_or(&names)
    }

    fn format_values(&self) -> String {
        let values: Vec<String> = self.value_to_name.keys().map(i128::to_string).collect();
        format_or(&values)
    }

    pub fn encode(&self, value: &Value, encoder: &mut Encoder) -> OerResult<()> {
        let number = match value {
            Value::Enumerated(name) if !self.numeric => {
                self.value_of(name).ok_or_else(|| {
                    Error::Encode(format!(
                        "Expected enumeration value {}, but got '{}'.",
                        self.format_names(),
                        name
                    ))
                })?
            }
            Value::Integer(number) if self.numeric => {
                if !self.value_to_name.contains_key(number) {
                    return Err(Error::Encode(format!(
                        "Expected enumeration value {}, but got {}.",
                        self.format_values(),
                        number
                    )));
                }

                *number
            }
            _ => return Err(mismatch("ENUMERATED", value)),
        };

        if (0..=127).contains(&number) {
            encoder.append_u8(number as u8);
        } else {
            let offset = encoder.number_of_bits();
            encoder.append_integer(number)?;
            encoder.set_bit(offset);
        }

        Ok(())
    }

    pub fn decode(&self, decoder: &mut Decoder<'_>) -> OerResult<Value> {
        let number = if decoder.peek_bit()? {
            decoder.clear_bit();
            decoder.read_integer()?
        } else {
            decoder.read_u8()? as i128
        };

        match self.value_to_name.get(&number) {
            Some(_) if self.numeric => Ok(Value::Integer(number)),
            Some(name) => Ok(Value::Enumerated(name.clone())),
            None => Err(Error::decode(format!(
                "Expected enumeration value {}, but got {}.",
                self.format_values(),
                number
            ))),
        }
    }
}

/// Types present in the hierarchy but without an OER implementation
///
/// Encoding or decoding any of them fails with [`Error::NotImplemented`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubKind {
    Real,
    ObjectIdentifier,
    GeneralString,
    BmpString,
    GraphicString,
    UniversalString,
    TeletexString,
    UtcTime,
    GeneralizedTime,
    Any,
    AnyDefinedBy,
}

impl StubKind {
    /// Look up a stub by its ASN.1 type name
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let stub = match type_name {
            "REAL" => StubKind::Real,
            "OBJECT IDENTIFIER" => StubKind::ObjectIdentifier,
            "GeneralString" => StubKind::GeneralString,
            "BMPString" => StubKind::BmpString,
            "GraphicString" => StubKind::GraphicString,
            "UniversalString" => StubKind::UniversalString,
            "TeletexString" | "T61String" => StubKind::TeletexString,
            "UTCTime" => StubKind::UtcTime,
            "GeneralizedTime" => StubKind::GeneralizedTime,
            "ANY" => StubKind::Any,
            "ANY DEFINED BY" => StubKind::AnyDefinedBy,
            _ => return None,
        };

        Some(stub)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            StubKind::Real => "REAL",
            StubKind::ObjectIdentifier => "OBJECT IDENTIFIER",
            StubKind::GeneralString => "GeneralString",
            StubKind::BmpString => "BMPString",
            StubKind::GraphicString => "GraphicString",
            StubKind::UniversalString => "UniversalString",
            StubKind::TeletexString => "TeletexString",
            StubKind::UtcTime => "UTCTime",
            StubKind::GeneralizedTime => "GeneralizedTime",
            StubKind::Any => "ANY",
            StubKind::AnyDefinedBy => "ANY DEFINED BY",
        }
    }

    pub(crate) fn tag_number(&self) -> Option<u32> {
        match self {
            StubKind::Real => Some(universal::REAL),
            StubKind::ObjectIdentifier => Some(universal::OBJECT_IDENTIFIER),
            StubKind::GeneralString => Some(universal::GENERAL_STRING),
            StubKind::BmpString => Some(universal::BMP_STRING),
            StubKind::GraphicString => Some(universal::GRAPHIC_STRING),
            StubKind::UniversalString => Some(universal::UNIVERSAL_STRING),
            StubKind::TeletexString => Some(universal::T61_STRING),
            StubKind::UtcTime => Some(universal::UTC_TIME),
            StubKind::GeneralizedTime => Some(universal::GENERALIZED_TIME),
            StubKind::Any | StubKind::AnyDefinedBy => None,
        }
    }

    pub(crate) fn not_implemented(&self) -> Error {
        Error::NotImplemented {
            type_name: self.type_name().to_string(),
        }
    }
}

impl fmt::Display for StubKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StubKind::Real => "Real",
            StubKind::ObjectIdentifier => "ObjectIdentifier",
            StubKind::GeneralString => "GeneralString",
            StubKind::BmpString => "BMPString",
            StubKind::GraphicString => "GraphicString",
            StubKind::UniversalString => "UniversalString",
            StubKind::TeletexString => "TeletexString",
            StubKind::UtcTime => "UTCTime",
            StubKind::GeneralizedTime => "GeneralizedTime",
            StubKind::Any => "Any",
            StubKind::AnyDefinedBy => "AnyDefinedBy",
        };

        f.write_str(name)
    }
}
