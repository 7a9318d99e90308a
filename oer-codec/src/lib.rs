//! OER encoding/decoding for schema-described ASN.1 types
//!
//! This crate provides the bit-level encoder and decoder, the OER type
//! hierarchy and the compiler turning schema descriptors into compiled
//! types.
//!
//! - `bits`: bit-level `Encoder` and `Decoder`
//! - `tag`: ASN.1 tag classes and tag encoding
//! - `types`: primitive, string and structured types
//! - `schema`: schema descriptors consumed by the compiler
//! - `compiler`: descriptor to type tree compilation, with recursion
//!   detection
//! - `constraints`: size, range and alphabet checking
//! - `compiled`: `CompiledType` and `Specification`

pub mod bits;
pub mod compiled;
pub mod compiler;
pub mod constraints;
pub mod schema;
pub mod tag;
pub mod types;

pub use bits::{Decoder, Encoder};
pub use compiled::{CompileOptions, CompiledType, Specification, TypeArena};
pub use compiler::{compile, compile_dict, compile_json};
pub use constraints::{Alphabet, Constraints};
pub use schema::{
    EXTENSION_MARKER, EnumEntry, MemberEntry, ModuleDescriptor, RangeBound, RangeEntry,
    SchemaDescriptor, TagDescriptor, TypeDescriptor, ValueDescriptor,
};
pub use tag::{Tag, TagClass};
pub use types::{Range, Type, TypeKind};
