//! References to a type that is still being compiled

use super::Type;
use crate::bits::{Decoder, Encoder};
use crate::compiled::TypeArena;
use oer_core::{Error, OerResult, Value};
use std::sync::Weak;

/// Reference to a top-level type of the schema
///
/// Created by the compiler where a type refers back to one of the types
/// it is currently compiling. The target lives in the type arena shared by
/// every compiled type of the schema and is looked up by slot on each
/// call. The arena is held weakly, so self-referencing schemas do not keep
/// themselves alive.
#[derive(Debug, Clone)]
pub struct Recursive {
    type_name: String,
    module_name: String,
    arena: Weak<TypeArena>,
    slot: usize,
}

impl Recursive {
    pub(crate) fn new(
        type_name: impl Into<String>,
        module_name: impl Into<String>,
        arena: Weak<TypeArena>,
        slot: usize,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            module_name: module_name.into(),
            arena,
            slot,
        }
    }

    /// Name of the referenced type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Module of the referenced type
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    fn with_inner<T>(
        &self,
        unbound: impl FnOnce(String) -> Error,
        f: impl FnOnce(&Type) -> OerResult<T>,
    ) -> OerResult<T> {
        let arena = self.arena.upgrade();

        match arena.as_deref().and_then(|arena| arena.get(self.slot)) {
            Some(inner) => f(inner),
            None => Err(unbound(format!(
                "Recursive type '{}.{}' is not bound.",
                self.module_name, self.type_name
            ))),
        }
    }

    pub fn encode(&self, value: &Value, encoder: &mut Encoder) -> OerResult<()> {
        self.with_inner(Error::Encode, |inner| inner.encode(value, encoder))
    }

    pub fn decode(&self, decoder: &mut Decoder<'_>) -> OerResult<Value> {
        self.with_inner(|message| Error::decode(message), |inner| inner.decode(decoder))
    }
}
