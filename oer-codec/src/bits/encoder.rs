//! Bit encoder for OER

use oer_core::{Error, OerResult};
use std::fmt;
use std::ops::AddAssign;

/// Bit encoder accumulating an OER encoding
///
/// The buffer always holds exactly `number_of_bits` rounded up to whole
/// bytes, and the bits past `number_of_bits` in the last byte are zero.
/// A fresh encoder is created for every top-level encode call and for every
/// open type (extension additions, CHOICE additions).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Encoder {
    buffer: Vec<u8>,
    number_of_bits: usize,
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            number_of_bits: 0,
        }
    }

    /// Create a new encoder with initial capacity in bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            number_of_bits: 0,
        }
    }

    /// Number of bits written so far
    pub fn number_of_bits(&self) -> usize {
        self.number_of_bits
    }

    /// Number of bytes the written bits occupy
    pub fn number_of_bytes(&self) -> usize {
        self.number_of_bits.div_ceil(8)
    }

    fn is_aligned(&self) -> bool {
        self.number_of_bits % 8 == 0
    }

    /// Set a previously written bit, counted from the start of the encoding
    ///
    /// Used to mark the extension bit of a SEQUENCE after the additions have
    /// been found to be present.
    pub fn set_bit(&mut self, offset: usize) {
        if offset < self.number_of_bits {
            self.buffer[offset / 8] |= 0x80 >> (offset % 8);
        }
    }

    /// Pad with zero bits up to the next byte boundary
    pub fn align(&mut self) {
        self.number_of_bits = 8 * self.buffer.len();
    }

    /// Append a single bit
    pub fn append_bit(&mut self, bit: bool) {
        if self.is_aligned() {
            self.buffer.push(0);
        }

        if bit {
            let last = self.buffer.len() - 1;
            self.buffer[last] |= 0x80 >> (self.number_of_bits % 8);
        }

        self.number_of_bits += 1;
    }

    /// Append the first `number_of_bits` bits of `data`, MSB first
    ///
    /// # Panics
    /// Panics if `data` holds fewer than `number_of_bits` bits.
    pub fn append_bits(&mut self, data: &[u8], number_of_bits: usize) {
        let whole_bytes = number_of_bits / 8;

        if self.is_aligned() {
            self.buffer.extend_from_slice(&data[..whole_bytes]);
            self.number_of_bits += 8 * whole_bytes;
        } else {
            for &byte in &data[..whole_bytes] {
                self.append_non_negative_binary_integer(byte as u128, 8);
            }
        }

        for index in 8 * whole_bytes..number_of_bits {
            let bit = (data[index / 8] >> (7 - index % 8)) & 1 == 1;
            self.append_bit(bit);
        }
    }

    /// Append the low `number_of_bits` bits of `value`, MSB first
    ///
    /// Widths above 128 bits are left-padded with zero bits.
    pub fn append_non_negative_binary_integer(&mut self, value: u128, number_of_bits: usize) {
        if self.is_aligned() && number_of_bits % 8 == 0 && number_of_bits <= 128 {
            let bytes = value.to_be_bytes();
            self.buffer.extend_from_slice(&bytes[16 - number_of_bits / 8..]);
            self.number_of_bits += number_of_bits;
            return;
        }

        for index in (0..number_of_bits).rev() {
            let bit = index < 128 && (value >> index) & 1 == 1;
            self.append_bit(bit);
        }
    }

    /// Append one byte
    pub fn append_u8(&mut self, value: u8) {
        self.append_non_negative_binary_integer(value as u128, 8);
    }

    /// Append whole bytes
    pub fn append_bytes(&mut self, data: &[u8]) {
        self.append_bits(data, 8 * data.len());
    }

    /// Append a length determinant
    ///
    /// # Encoding Format
    /// - Short form (value < 128): one byte holding the value
    /// - Long form: `0x80 | L`, then the value in `L` big-endian bytes
    pub fn append_length_determinant(&mut self, value: usize) -> OerResult<()> {
        if value < 128 {
            self.append_u8(value as u8);
            return Ok(());
        }

        let bytes = value.to_be_bytes();
        let leading_zeros = bytes.iter().take_while(|&&byte| byte == 0).count();
        let encoded = &bytes[leading_zeros..];

        if encoded.len() > 127 {
            return Err(Error::Encode(format!(
                "Length determinant {} is too big.",
                value
            )));
        }

        self.append_u8(0x80 | encoded.len() as u8);
        self.append_bytes(encoded);

        Ok(())
    }

    /// Append a length determinant followed by the minimal two's complement
    /// bytes of `value`
    pub fn append_integer(&mut self, value: i128) -> OerResult<()> {
        let number_of_bytes = integer_length(value);
        let mask = if number_of_bytes == 16 {
            u128::MAX
        } else {
            (1u128 << (8 * number_of_bytes)) - 1
        };

        self.append_length_determinant(number_of_bytes)?;
        self.append_non_negative_binary_integer(value as u128 & mask, 8 * number_of_bytes);

        Ok(())
    }

    /// Append `other` as an open type: its bytes prefixed by their length
    pub fn append_open_type(&mut self, mut other: Encoder) -> OerResult<()> {
        other.align();
        self.append_length_determinant(other.number_of_bytes())?;
        *self += &other;

        Ok(())
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the encoded bytes, padded with zero bits to a byte boundary
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Minimal number of two's complement bytes representing `value`
fn integer_length(value: i128) -> usize {
    let bytes = value.to_be_bytes();
    let mut start = 0;

    while start < 15 {
        let redundant = match bytes[start] {
            0x00 => bytes[start + 1] & 0x80 == 0,
            0xFF => bytes[start + 1] & 0x80 != 0,
            _ => false,
        };

        if !redundant {
            break;
        }

        start += 1;
    }

    16 - start
}

impl AddAssign<&Encoder> for Encoder {
    /// Splice every bit written to `other` onto this encoder
    fn add_assign(&mut self, other: &Encoder) {
        self.append_bits(&other.buffer, other.number_of_bits);
    }
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encoder({}, {} bits)", hex::encode(&self.buffer), self.number_of_bits)
    }
}
