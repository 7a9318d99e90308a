//! Runtime values exchanged with compiled types

pub mod value;
pub mod bit_string;

pub use bit_string::BitString;
pub use value::Value;
