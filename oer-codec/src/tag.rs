//! ASN.1 tags (class and number)
//!
//! OER only writes tags in front of CHOICE alternatives, but the tag octets
//! are formatted exactly as in BER (ITU-T X.690, 8.1.2), without the
//! constructed bit.

use oer_core::{Error, OerResult};

/// Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **Application**: Application-specific types
/// - **Context-specific**: Context-dependent types (used in SEQUENCE/SET/CHOICE)
/// - **Private**: Private/implementation-specific types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl TagClass {
    /// Get tag class from bits 7-6 of the first tag byte
    pub fn from_bits(bits: u8) -> Self {
        match (bits >> 6) & 0x03 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    /// Convert tag class to bits (for encoding)
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }

    /// Class of a tag override in a schema descriptor
    ///
    /// `APPLICATION` and `PRIVATE` are honoured; anything else, including an
    /// absent class, is context-specific.
    pub fn from_descriptor(class: Option<&str>) -> Self {
        match class {
            Some("APPLICATION") => TagClass::Application,
            Some("PRIVATE") => TagClass::Private,
            _ => TagClass::ContextSpecific,
        }
    }
}

/// Universal tag numbers used by the OER types
pub mod universal {
    pub const BOOLEAN: u32 = 1;
    pub const INTEGER: u32 = 2;
    pub const BIT_STRING: u32 = 3;
    pub const OCTET_STRING: u32 = 4;
    pub const NULL: u32 = 5;
    pub const OBJECT_IDENTIFIER: u32 = 6;
    pub const REAL: u32 = 9;
    pub const ENUMERATED: u32 = 10;
    pub const UTF8_STRING: u32 = 12;
    pub const SEQUENCE: u32 = 16;
    pub const SET: u32 = 17;
    pub const NUMERIC_STRING: u32 = 18;
    pub const PRINTABLE_STRING: u32 = 19;
    pub const T61_STRING: u32 = 20;
    pub const IA5_STRING: u32 = 22;
    pub const UTC_TIME: u32 = 23;
    pub const GENERALIZED_TIME: u32 = 24;
    pub const GRAPHIC_STRING: u32 = 25;
    pub const VISIBLE_STRING: u32 = 26;
    pub const GENERAL_STRING: u32 = 27;
    pub const UNIVERSAL_STRING: u32 = 28;
    pub const BMP_STRING: u32 = 30;
}

/// ASN.1 tag
///
/// # Encoding Format
///
/// Short form (tag number 0-30):
/// ```text
/// Bits: 8 7 6 5 4 3 2 1
///       C C 0 T T T T T
/// ```
///
/// Extended form (tag number > 30):
/// ```text
/// First byte:  C C 0 1 1 1 1 1
/// Following bytes: 1 T T T T T T T ... 0 T T T T T T T
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    class: TagClass,
    number: u32,
}

impl Tag {
    /// Create a new tag
    pub fn new(class: TagClass, number: u32) -> Self {
        Self { class, number }
    }

    /// Create a Universal class tag
    pub fn universal(number: u32) -> Self {
        Self::new(TagClass::Universal, number)
    }

    /// Create a Context-specific class tag
    pub fn context_specific(number: u32) -> Self {
        Self::new(TagClass::ContextSpecific, number)
    }

    /// Create an Application class tag
    pub fn application(number: u32) -> Self {
        Self::new(TagClass::Application, number)
    }

    /// Create a Private class tag
    pub fn private(number: u32) -> Self {
        Self::new(TagClass::Private, number)
    }

    /// Get tag class
    pub fn class(&self) -> TagClass {
        self.class
    }

    /// Get tag number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Encode tag to bytes
    pub fn encode(&self) -> Vec<u8> {
        let class_bits = self.class.to_bits();

        if self.number <= 30 {
            return vec![class_bits | self.number as u8];
        }

        let mut result = vec![class_bits | 0x1F];
        let mut remaining = self.number;
        let mut bytes = Vec::new();

        while remaining > 0 {
            bytes.push((remaining & 0x7F) as u8);
            remaining >>= 7;
        }

        // Continuation bit on all but the last byte
        for (i, &byte) in bytes.iter().rev().enumerate() {
            if i < bytes.len() - 1 {
                result.push(byte | 0x80);
            } else {
                result.push(byte);
            }
        }

        result
    }

    /// Decode tag from bytes
    ///
    /// # Returns
    /// Returns `Ok((Tag, bytes_consumed))` if successful
    pub fn decode(data: &[u8]) -> OerResult<(Self, usize)> {
        let first_byte = *data
            .first()
            .ok_or_else(|| Error::decode("Empty buffer for tag decoding."))?;
        let class = TagClass::from_bits(first_byte);
        let tag_bits = first_byte & 0x1F;

        if tag_bits < 31 {
            return Ok((Self::new(class, tag_bits as u32), 1));
        }

        let mut number = 0u32;
        let mut pos = 1;

        loop {
            let byte = *data
                .get(pos)
                .ok_or_else(|| Error::decode("Incomplete extended tag encoding."))?;
            number = number
                .checked_mul(128)
                .map(|n| n | (byte & 0x7F) as u32)
                .ok_or_else(|| Error::decode("Tag number too large."))?;
            pos += 1;

            if byte & 0x80 == 0 {
                break;
            }
        }

        Ok((Self::new(class, number), pos))
    }
}

/// Format encoded tag bytes as lowercase hex, as used in error messages
pub fn format_tag(tag: &[u8]) -> String {
    hex::encode(tag)
}
