//! Compiled types and specifications
//!
//! Every type of every module of a schema is compiled into one
//! [`TypeArena`]. A [`CompiledType`] is a handle to one slot of that arena
//! plus the constraints compiled for it. Handles are cheap to clone and
//! safe to use from many threads at once: each encode or decode call
//! creates its own [`Encoder`] or [`Decoder`].

use crate::bits::{Decoder, Encoder};
use crate::constraints::Constraints;
use crate::types::Type;
use oer_core::{Error, OerResult, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Options of the compiler
///
/// # Example
/// ```
/// use oer_codec::CompileOptions;
///
/// let options = CompileOptions::new().with_check_constraints(true);
/// assert!(options.check_constraints);
/// assert!(!options.numeric_enums);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompileOptions {
    /// Exchange ENUMERATED values as integers instead of names
    pub numeric_enums: bool,
    /// Check constraints before encoding
    pub check_constraints: bool,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numeric_enums(mut self, numeric_enums: bool) -> Self {
        self.numeric_enums = numeric_enums;
        self
    }

    pub fn with_check_constraints(mut self, check_constraints: bool) -> Self {
        self.check_constraints = check_constraints;
        self
    }
}

/// Storage of the top-level types of a schema, indexed by slot
#[derive(Debug, Default)]
pub struct TypeArena {
    types: Vec<Type>,
}

impl TypeArena {
    pub(crate) fn new(types: Vec<Type>) -> Self {
        Self { types }
    }

    pub fn get(&self, slot: usize) -> Option<&Type> {
        self.types.get(slot)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// A compiled top-level type
#[derive(Debug, Clone)]
pub struct CompiledType {
    arena: Arc<TypeArena>,
    slot: usize,
    constraints: Arc<Constraints>,
    options: CompileOptions,
}

impl CompiledType {
    pub(crate) fn new(
        arena: Arc<TypeArena>,
        slot: usize,
        constraints: Constraints,
        options: CompileOptions,
    ) -> Self {
        Self {
            arena,
            slot,
            constraints: Arc::new(constraints),
            options,
        }
    }

    /// Root node of the type
    pub fn type_(&self) -> &Type {
        &self.arena.types[self.slot]
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Encode `value` to bytes
    ///
    /// # Errors
    /// Returns `Error::Encode` if the value does not match the type, or
    /// `Error::Constraints` if constraint checking is enabled and fails.
    pub fn encode(&self, value: &Value) -> OerResult<Vec<u8>> {
        if self.options.check_constraints {
            self.check_constraints(value)?;
        }

        let mut encoder = Encoder::new();
        self.type_().encode(value, &mut encoder)?;

        Ok(encoder.into_bytes())
    }

    /// Decode a value from `data`
    ///
    /// Bytes left over after the value are ignored.
    pub fn decode(&self, data: &[u8]) -> OerResult<Value> {
        let mut decoder = Decoder::new(data);
        self.type_().decode(&mut decoder)
    }

    /// Check `value` against the compiled constraints
    pub fn check_constraints(&self, value: &Value) -> OerResult<()> {
        self.constraints.check(value)
    }
}

impl fmt::Display for CompiledType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_())
    }
}

/// All compiled types of a schema, by module and type name
#[derive(Debug, Clone, Default)]
pub struct Specification {
    modules: BTreeMap<String, BTreeMap<String, CompiledType>>,
}

impl Specification {
    pub(crate) fn new(modules: BTreeMap<String, BTreeMap<String, CompiledType>>) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &BTreeMap<String, BTreeMap<String, CompiledType>> {
        &self.modules
    }

    /// Find a type by name in any module
    ///
    /// Modules are searched in name order.
    pub fn type_(&self, name: &str) -> Option<&CompiledType> {
        self.modules.values().find_map(|types| types.get(name))
    }

    /// Find a type by module and name
    pub fn get(&self, module_name: &str, name: &str) -> Option<&CompiledType> {
        self.modules.get(module_name)?.get(name)
    }

    /// Encode `value` as the named type
    pub fn encode(&self, name: &str, value: &Value) -> OerResult<Vec<u8>> {
        self.type_(name)
            .ok_or_else(|| Error::Encode(format!("Type '{}' not found in types dictionary.", name)))?
            .encode(value)
    }

    /// Decode `data` as the named type
    pub fn decode(&self, name: &str, data: &[u8]) -> OerResult<Value> {
        self.type_(name)
            .ok_or_else(|| Error::decode(format!("Type '{}' not found in types dictionary.", name)))?
            .decode(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MembersType, Range};

    fn single(type_: Type, constraints: Constraints, options: CompileOptions) -> CompiledType {
        CompiledType::new(Arc::new(TypeArena::new(vec![type_])), 0, constraints, options)
    }

    #[test]
    fn test_encode_decode() {
        let compiled = single(Type::integer("A"), Constraints::Unconstrained, CompileOptions::new());
        assert_eq!(compiled.encode(&Value::Integer(200)).unwrap(), vec![0x02, 0x00, 0xC8]);
        assert_eq!(compiled.decode(&[0x02, 0x00, 0xC8]).unwrap(), Value::Integer(200));
        assert_eq!(compiled.to_string(), "Integer(A)");
    }

    #[test]
    fn test_check_constraints_option() {
        let constraints = Constraints::Integer(Range::new(Some(0), Some(9), false));
        let unchecked = single(Type::integer("A"), constraints.clone(), CompileOptions::new());
        assert!(unchecked.encode(&Value::Integer(10)).is_ok());
        assert!(unchecked.check_constraints(&Value::Integer(10)).is_err());

        let checked = single(
            Type::integer("A"),
            constraints,
            CompileOptions::new().with_check_constraints(true),
        );
        assert!(matches!(
            checked.encode(&Value::Integer(10)),
            Err(Error::Constraints(_))
        ));
    }

    #[test]
    fn test_specification_lookup() {
        let compiled = single(
            Type::sequence("S", MembersType::new(vec![], None)),
            Constraints::Unconstrained,
            CompileOptions::new(),
        );
        let mut types = BTreeMap::new();
        types.insert("S".to_string(), compiled);
        let mut modules = BTreeMap::new();
        modules.insert("M".to_string(), types);
        let specification = Specification::new(modules);

        assert!(specification.get("M", "S").is_some());
        assert!(specification.type_("S").is_some());
        assert_eq!(
            specification.encode("T", &Value::Null).unwrap_err(),
            Error::Encode("Type 'T' not found in types dictionary.".to_string())
        );
        assert!(specification.decode("T", &[]).unwrap_err().is_decode());
    }

    #[test]
    fn test_options_deserialize() {
        let options: CompileOptions =
            serde_json::from_str(r#"{"numeric-enums": true}"#).unwrap();
        assert_eq!(options, CompileOptions::new().with_numeric_enums(true));
    }
}
