//! BIT STRING, OCTET STRING and known-multiplier character strings
//!
//! A size constraint with equal bounds and no extension marker fixes the
//! length, which is then left out of the encoding. Every other string is
//! prefixed by a length determinant.

use super::Range;
use crate::bits::{Decoder, Encoder};
use crate::tag::universal;
use oer_core::{BitString, Error, OerResult};

fn fixed_size(size: Option<&Range>) -> Option<usize> {
    size.and_then(Range::fixed)
        .and_then(|size| usize::try_from(size).ok())
}

/// OCTET STRING
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OctetStringType {
    number_of_bytes: Option<usize>,
}

impl OctetStringType {
    pub fn new(size: Option<&Range>) -> Self {
        Self {
            number_of_bytes: fixed_size(size),
        }
    }

    /// Fixed length in bytes, if any
    pub fn fixed_length(&self) -> Option<usize> {
        self.number_of_bytes
    }

    pub fn encode(&self, data: &[u8], encoder: &mut Encoder) -> OerResult<()> {
        match self.number_of_bytes {
            None => encoder.append_length_determinant(data.len())?,
            Some(number_of_bytes) if number_of_bytes != data.len() => {
                return Err(Error::Encode(format!(
                    "Expected an OCTET STRING of {} bytes, but got {}.",
                    number_of_bytes,
                    data.len()
                )));
            }
            Some(_) => {}
        }

        encoder.append_bytes(data);

        Ok(())
    }

    pub fn decode(&self, decoder: &mut Decoder<'_>) -> OerResult<Vec<u8>> {
        let number_of_bytes = match self.number_of_bytes {
            Some(number_of_bytes) => number_of_bytes,
            None => decoder.read_length_determinant()?,
        };

        decoder.read_bytes(number_of_bytes)
    }
}

/// BIT STRING
///
/// Variable size bit strings start with a length determinant covering the
/// data plus one byte holding the number of unused bits in the last data
/// byte. Fixed size bit strings are just the data bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitStringType {
    number_of_bits: Option<usize>,
}

impl BitStringType {
    pub fn new(size: Option<&Range>) -> Self {
        Self {
            number_of_bits: fixed_size(size),
        }
    }

    /// Fixed length in bits, if any
    pub fn fixed_length(&self) -> Option<usize> {
        self.number_of_bits
    }

    pub fn encode(&self, data: &BitString, encoder: &mut Encoder) -> OerResult<()> {
        let bytes = data.to_canonical_bytes();

        match self.number_of_bits {
            None => {
                let number_of_unused_bits = (8 - data.num_bits() % 8) % 8;
                encoder.append_length_determinant(bytes.len() + 1)?;
                encoder.append_u8(number_of_unused_bits as u8);
            }
            Some(number_of_bits) if number_of_bits != data.num_bits() => {
                return Err(Error::Encode(format!(
                    "Expected a BIT STRING of {} bits, but got {}.",
                    number_of_bits,
                    data.num_bits()
                )));
            }
            Some(_) => {}
        }

        encoder.append_bytes(&bytes);

        Ok(())
    }

    pub fn decode(&self, decoder: &mut Decoder<'_>) -> OerResult<BitString> {
        let (number_of_bytes, number_of_bits) = match self.number_of_bits {
            Some(number_of_bits) => (number_of_bits.div_ceil(8), number_of_bits),
            None => {
                let length = decoder.read_length_determinant()?;

                if length == 0 {
                    return Err(Error::decode("BIT STRING length must be at least 1."));
                }

                let number_of_unused_bits = decoder.read_u8()? as usize;
                let number_of_bytes = length - 1;

                if number_of_unused_bits > 7 || 8 * number_of_bytes < number_of_unused_bits {
                    return Err(Error::decode(format!(
                        "Invalid number of unused bits {} in BIT STRING.",
                        number_of_unused_bits
                    )));
                }

                (number_of_bytes, 8 * number_of_bytes - number_of_unused_bits)
            }
        };

        let bytes = decoder.read_bytes(number_of_bytes)?;

        BitString::new(bytes, number_of_bits).map_err(|e| Error::decode(e.to_string()))
    }
}

/// Character string types with a fixed number of bytes per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    Utf8,
    Numeric,
    Printable,
    Ia5,
    Visible,
}

impl StringKind {
    /// Look up a string kind by its ASN.1 type name
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let kind = match type_name {
            "UTF8String" => StringKind::Utf8,
            "NumericString" => StringKind::Numeric,
            "PrintableString" => StringKind::Printable,
            "IA5String" => StringKind::Ia5,
            "VisibleString" => StringKind::Visible,
            _ => return None,
        };

        Some(kind)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            StringKind::Utf8 => "UTF8String",
            StringKind::Numeric => "NumericString",
            StringKind::Printable => "PrintableString",
            StringKind::Ia5 => "IA5String",
            StringKind::Visible => "VisibleString",
        }
    }

    pub(crate) fn tag_number(&self) -> u32 {
        match self {
            StringKind::Utf8 => universal::UTF8_STRING,
            StringKind::Numeric => universal::NUMERIC_STRING,
            StringKind::Printable => universal::PRINTABLE_STRING,
            StringKind::Ia5 => universal::IA5_STRING,
            StringKind::Visible => universal::VISIBLE_STRING,
        }
    }

    /// All kinds but UTF8String are restricted to ASCII
    pub fn is_ascii(&self) -> bool {
        !matches!(self, StringKind::Utf8)
    }
}

/// Known-multiplier character string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownMultiplierString {
    kind: StringKind,
    number_of_bytes: Option<usize>,
}

impl KnownMultiplierString {
    pub fn new(kind: StringKind, size: Option<&Range>) -> Self {
        Self {
            kind,
            number_of_bytes: fixed_size(size),
        }
    }

    pub fn kind(&self) -> StringKind {
        self.kind
    }

    pub fn encode(&self, data: &str, encoder: &mut Encoder) -> OerResult<()> {
        if self.kind.is_ascii() && !data.is_ascii() {
            return Err(Error::Encode(format!(
                "{} value '{}' is not ASCII.",
                self.kind.type_name(),
                data
            )));
        }

        let encoded = data.as_bytes();

        match self.number_of_bytes {
            None => encoder.append_length_determinant(encoded.len())?,
            Some(number_of_bytes) if number_of_bytes != encoded.len() => {
                return Err(Error::Encode(format!(
                    "Expected a {} of {} bytes, but got {}.",
                    self.kind.type_name(),
                    number_of_bytes,
                    encoded.len()
                )));
            }
            Some(_) => {}
        }

        encoder.append_bytes(encoded);

        Ok(())
    }

    pub fn decode(&self, decoder: &mut Decoder<'_>) -> OerResult<String> {
        let number_of_bytes = match self.number_of_bytes {
            Some(number_of_bytes) => number_of_bytes,
            None => decoder.read_length_determinant()?,
        };

        let encoded = decoder.read_bytes(number_of_bytes)?;

        if self.kind.is_ascii() && !encoded.is_ascii() {
            return Err(Error::decode(format!(
                "{} data is not ASCII.",
                self.kind.type_name()
            )));
        }

        String::from_utf8(encoded).map_err(|e| {
            Error::decode(format!("{} data is not UTF-8: {}", self.kind.type_name(), e))
        })
    }
}
