//! oer - ASN.1 Octet Encoding Rules codec
//!
//! Compiles ASN.1 schema descriptors into type trees that encode runtime
//! values to OER bytes and decode them back.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `oer-core`: Error type and runtime values
//! - `oer-codec`: Bit-level encoder/decoder, OER types, schema compiler
//!   and constraint checking
//!
//! # Usage
//!
//! ```
//! use oer::{compile_json, Value};
//!
//! let specification = compile_json(
//!     r#"{"Foo": {"types": {"Id": {"type": "INTEGER", "restricted-to": [[0, 255]]}}}}"#,
//! )
//! .unwrap();
//!
//! let bytes = specification.encode("Id", &Value::Integer(200)).unwrap();
//! assert_eq!(bytes, vec![0xC8]);
//! assert_eq!(specification.decode("Id", &bytes).unwrap(), Value::Integer(200));
//! ```

pub use oer_core::{BitString, Error, OerResult, Value};

pub use oer_codec::{
    CompileOptions, CompiledType, Specification, compile, compile_dict, compile_json,
};

/// Schema descriptors accepted by the compiler
pub mod schema {
    pub use oer_codec::schema::*;
}

/// Compiled type tree
pub mod types {
    pub use oer_codec::types::*;
    pub use oer_codec::{Tag, TagClass};
}

/// Constraint checking
pub mod constraints {
    pub use oer_codec::constraints::*;
}

/// Bit-level encoder and decoder
pub mod bits {
    pub use oer_codec::bits::*;
}
