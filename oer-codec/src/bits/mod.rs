//! Bit-level encoding/decoding module
//!
//! OER is octet oriented, but presence bitmaps and the extension bit of a
//! SEQUENCE are packed bit by bit before the encoder realigns to an octet
//! boundary. Both the [`Encoder`] and the [`Decoder`] therefore track a bit
//! position rather than a byte position.

pub mod encoder;
pub mod decoder;

pub use encoder::Encoder;
pub use decoder::Decoder;
