//! Bit decoder for OER

use oer_core::{Error, OerResult};
use std::borrow::Cow;

/// Bit decoder reading an OER encoding
///
/// One decoder is threaded by reference through an entire decode call tree;
/// it is the only cursor. Every read that needs more bits than remain fails
/// with [`Error::OutOfData`] carrying the number of bits already consumed.
///
/// The input is borrowed until [`Decoder::clear_bit`] is called, which takes
/// a private copy before patching it.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buffer: Cow<'a, [u8]>,
    position: usize,
    total_number_of_bits: usize,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer: Cow::Borrowed(buffer),
            position: 0,
            total_number_of_bits: 8 * buffer.len(),
        }
    }

    /// Number of bits not yet read
    pub fn number_of_bits(&self) -> usize {
        self.total_number_of_bits - self.position
    }

    /// Number of bits read so far
    pub fn number_of_read_bits(&self) -> usize {
        self.position
    }

    fn ensure(&self, number_of_bits: usize) -> OerResult<()> {
        if number_of_bits > self.number_of_bits() {
            return Err(Error::out_of_data(self.position));
        }
        Ok(())
    }

    fn bit_at(&self, position: usize) -> bool {
        (self.buffer[position / 8] >> (7 - position % 8)) & 1 == 1
    }

    /// Drop bits up to the next byte boundary without interpreting them
    pub fn align(&mut self) {
        self.position = self.position.div_ceil(8) * 8;
    }

    /// Skip the given number of bits
    pub fn skip_bits(&mut self, number_of_bits: usize) -> OerResult<()> {
        self.ensure(number_of_bits)?;
        self.position += number_of_bits;
        Ok(())
    }

    /// Inspect the next bit without consuming it
    pub fn peek_bit(&self) -> OerResult<bool> {
        self.ensure(1)?;
        Ok(self.bit_at(self.position))
    }

    /// Clear the next bit without consuming it
    pub fn clear_bit(&mut self) {
        if self.position < self.total_number_of_bits {
            let position = self.position;
            self.buffer.to_mut()[position / 8] &= !(0x80 >> (position % 8));
        }
    }

    /// Read a single bit
    pub fn read_bit(&mut self) -> OerResult<bool> {
        self.ensure(1)?;
        let bit = self.bit_at(self.position);
        self.position += 1;
        Ok(bit)
    }

    /// Read the given number of bits, returned MSB first and zero padded to
    /// whole bytes
    pub fn read_bits(&mut self, number_of_bits: usize) -> OerResult<Vec<u8>> {
        self.ensure(number_of_bits)?;

        if self.position % 8 == 0 && number_of_bits % 8 == 0 {
            let start = self.position / 8;
            let data = self.buffer[start..start + number_of_bits / 8].to_vec();
            self.position += number_of_bits;
            return Ok(data);
        }

        let mut data = vec![0u8; number_of_bits.div_ceil(8)];

        for index in 0..number_of_bits {
            if self.bit_at(self.position + index) {
                data[index / 8] |= 0x80 >> (index % 8);
            }
        }

        self.position += number_of_bits;
        Ok(data)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> OerResult<u8> {
        Ok(self.read_non_negative_binary_integer(8)? as u8)
    }

    /// Read whole bytes
    pub fn read_bytes(&mut self, number_of_bytes: usize) -> OerResult<Vec<u8>> {
        let number_of_bits = number_of_bytes
            .checked_mul(8)
            .ok_or_else(|| Error::out_of_data(self.position))?;
        self.read_bits(number_of_bits)
    }

    /// Read an unsigned integer of the given number of bits
    pub fn read_non_negative_binary_integer(&mut self, number_of_bits: usize) -> OerResult<u128> {
        self.ensure(number_of_bits)?;

        if number_of_bits > 128 {
            return Err(Error::decode(format!(
                "Integer of {} bits is too large.",
                number_of_bits
            )));
        }

        let mut value = 0u128;

        for index in 0..number_of_bits {
            value = (value << 1) | self.bit_at(self.position + index) as u128;
        }

        self.position += number_of_bits;
        Ok(value)
    }

    /// Read a length determinant
    pub fn read_length_determinant(&mut self) -> OerResult<usize> {
        let value = self.read_u8()?;

        if value & 0x80 == 0 {
            return Ok(value as usize);
        }

        let length = (value & 0x7F) as usize;
        let value = self.read_non_negative_binary_integer(8 * length)?;

        usize::try_from(value).map_err(|_| {
            Error::decode(format!("Length determinant {} is too big.", value))
        })
    }

    /// Read a length determinant followed by that many two's complement bytes
    pub fn read_integer(&mut self) -> OerResult<i128> {
        let number_of_bytes = self.read_length_determinant()?;

        if number_of_bytes == 0 {
            return Err(Error::decode("Integer has zero length."));
        }

        let number_of_bits = 8 * number_of_bytes;
        let value = self.read_non_negative_binary_integer(number_of_bits)?;
        let shift = 128 - number_of_bits;

        Ok(((value << shift) as i128) >> shift)
    }

    /// Read an encoded tag: one byte, followed by continuation bytes if the
    /// low five bits of the first byte are all set
    pub fn read_tag(&mut self) -> OerResult<Vec<u8>> {
        let mut byte = self.read_u8()?;
        let mut tag = vec![byte];

        if byte & 0x1F == 0x1F {
            loop {
                byte = self.read_u8()?;
                tag.push(byte);

                if byte & 0x80 == 0 {
                    break;
                }
            }
        }

        Ok(tag)
    }
}
