//! Bit string value

use crate::error::{Error, OerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arbitrary string of bits (zeros and ones). A bit string value can have any length including zero.
///
/// Bits are stored most-significant-bit first; bits past `num_bits` in the
/// last byte are ignored by the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitString {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
    num_bits: usize,
}

impl BitString {
    /// Construct a new bit string object.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The bit string as a byte array
    /// * `num_bits` - The number of bits
    ///
    /// # Errors
    ///
    /// Returns an error if `num_bits > bytes.len() * 8`
    pub fn new(bytes: Vec<u8>, num_bits: usize) -> OerResult<Self> {
        if num_bits > bytes.len() * 8 {
            return Err(Error::Encode(format!(
                "Bit string is too short to hold all bits. Need {} bytes for {} bits.",
                num_bits.div_ceil(8),
                num_bits
            )));
        }

        Ok(Self { bytes, num_bits })
    }

    /// Construct a bit string holding every bit of `bytes`
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let num_bits = bytes.len() * 8;
        Self { bytes, num_bits }
    }

    /// Get the bit string as byte array.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The number of bits in the byte array.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Get the bit at a specific position
    ///
    /// # Arguments
    /// * `index` - The bit index (0-based, MSB first)
    pub fn get_bit(&self, index: usize) -> Option<bool> {
        if index >= self.num_bits {
            return None;
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8);
        Some((self.bytes[byte_index] >> bit_index) & 1 == 1)
    }

    /// Bytes covering exactly `num_bits`, with the unused trailing bits cleared
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let number_of_bytes = self.num_bits.div_ceil(8);
        let mut bytes = self.bytes[..number_of_bytes].to_vec();
        let rest = self.num_bits % 8;

        if rest != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= 0xFF << (8 - rest);
            }
        }

        bytes
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.num_bits {
            let bit = self.get_bit(index).unwrap_or(false);
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_string_new() {
        let bytes = vec![0xFF, 0x00, 0xAA];
        let bit_string = BitString::new(bytes.clone(), 24).unwrap();
        assert_eq!(bit_string.as_bytes(), &bytes);
        assert_eq!(bit_string.num_bits(), 24);
    }

    #[test]
    fn test_bit_string_invalid() {
        let result = BitString::new(vec![0xFF], 16);
        assert!(result.is_err());
    }

    #[test]
    fn test_bit_string_canonical_bytes() {
        let bit_string = BitString::new(vec![0xFF, 0xFF], 4).unwrap();
        assert_eq!(bit_string.to_canonical_bytes(), vec![0xF0]);
        assert_eq!(bit_string.to_string(), "1111");
    }
}
