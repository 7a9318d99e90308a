//! Schema compiler
//!
//! Turns a [`SchemaDescriptor`] into a [`Specification`]. All top-level
//! types are assigned a slot in one [`TypeArena`] before compilation
//! starts. References to user-defined types are compiled inline; a
//! reference to a type that is currently being compiled becomes a
//! [`Recursive`] node pointing at that type's slot instead.

use crate::compiled::{CompileOptions, CompiledType, Specification, TypeArena};
use crate::constraints::{Alphabet, Constraints};
use crate::schema::{
    EXTENSION_MARKER, EnumEntry, MemberEntry, RangeBound, RangeEntry, SchemaDescriptor,
    TypeDescriptor,
};
use crate::tag::TagClass;
use crate::types::{
    Choice, Enumerated, MembersType, Range, Recursive, StringKind, StubKind, Type, TypeKind,
};
use log::debug;
use oer_core::{Error, OerResult, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Weak};

/// Module name and type name
type TypeKey = (String, String);

/// Compile a schema
///
/// # Errors
/// Returns `Error::Compile` for malformed descriptors, unknown type or
/// value references, unsupported defaults and untagged CHOICE members.
pub fn compile(schema: &SchemaDescriptor, options: CompileOptions) -> OerResult<Specification> {
    let slots: BTreeMap<TypeKey, usize> = schema
        .iter()
        .flat_map(|(module_name, module)| {
            module
                .types
                .keys()
                .map(move |type_name| (module_name.clone(), type_name.clone()))
        })
        .enumerate()
        .map(|(slot, key)| (key, slot))
        .collect();

    let mut failure = None;
    let mut constraints = Vec::new();

    let arena = Arc::new_cyclic(|arena| {
        let mut compiler = Compiler::new(schema, options, arena.clone(), &slots);

        match compiler.process() {
            Ok((types, compiled_constraints)) => {
                constraints = compiled_constraints;
                TypeArena::new(types)
            }
            Err(e) => {
                failure = Some(e);
                TypeArena::default()
            }
        }
    });

    if let Some(e) = failure {
        return Err(e);
    }

    debug!("Bound {} types into the type arena", arena.len());

    let mut modules: BTreeMap<String, BTreeMap<String, CompiledType>> = BTreeMap::new();

    for (((module_name, type_name), slot), constraints) in slots.into_iter().zip(constraints) {
        modules.entry(module_name).or_default().insert(
            type_name,
            CompiledType::new(arena.clone(), slot, constraints, options),
        );
    }

    Ok(Specification::new(modules))
}

/// Compile a schema with default options
pub fn compile_dict(schema: &SchemaDescriptor) -> OerResult<Specification> {
    compile(schema, CompileOptions::default())
}

/// Compile a schema given as JSON text, with default options
pub fn compile_json(json: &str) -> OerResult<Specification> {
    let schema: SchemaDescriptor = serde_json::from_str(json)
        .map_err(|e| Error::Compile(format!("Invalid schema descriptor: {}", e)))?;

    compile_dict(&schema)
}

/// Compiled root members and extension additions of a member list
struct Members {
    root: Vec<Type>,
    additions: Option<Vec<Type>>,
    constraints: Vec<(String, Constraints)>,
}

struct Compiler<'a> {
    schema: &'a SchemaDescriptor,
    options: CompileOptions,
    arena: Weak<TypeArena>,
    slots: &'a BTreeMap<TypeKey, usize>,
    /// Types currently being compiled, outermost first
    backtrace: Vec<TypeKey>,
}

impl<'a> Compiler<'a> {
    fn new(
        schema: &'a SchemaDescriptor,
        options: CompileOptions,
        arena: Weak<TypeArena>,
        slots: &'a BTreeMap<TypeKey, usize>,
    ) -> Self {
        Self {
            schema,
            options,
            arena,
            slots,
            backtrace: Vec::new(),
        }
    }

    /// Compile every top-level type, in slot order
    fn process(&mut self) -> OerResult<(Vec<Type>, Vec<Constraints>)> {
        let schema = self.schema;
        let mut types = Vec::with_capacity(self.slots.len());
        let mut constraints = Vec::with_capacity(self.slots.len());

        for (module_name, module) in schema {
            for (type_name, descriptor) in &module.types {
                debug!("Compiling type '{}.{}'", module_name, type_name);

                self.backtrace.push((module_name.clone(), type_name.clone()));
                let compiled = self.compile_type(type_name, descriptor, module_name);
                self.backtrace.pop();

                let (type_, type_constraints) = compiled?;
                types.push(type_);
                constraints.push(type_constraints);
            }
        }

        Ok((types, constraints))
    }

    fn compile_type(
        &mut self,
        name: &str,
        descriptor: &'a TypeDescriptor,
        module_name: &'a str,
    ) -> OerResult<(Type, Constraints)> {
        let type_name = descriptor.type_name.as_str();

        let (mut compiled, mut constraints) = match type_name {
            "SEQUENCE" => {
                let members = self.compile_members(descriptor, module_name, false)?;
                (
                    Type::sequence(name, MembersType::new(members.root, members.additions)),
                    Constraints::Members(members.constraints),
                )
            }
            "SET" => {
                let members = self.compile_members(descriptor, module_name, true)?;
                (
                    Type::set(name, MembersType::new(members.root, members.additions)),
                    Constraints::Members(members.constraints),
                )
            }
            "SEQUENCE OF" | "SET OF" => {
                let element = descriptor.element.as_deref().ok_or_else(|| {
                    Error::Compile(format!("{} '{}' has no element type.", type_name, name))
                })?;
                let (element, element_constraints) = self.compile_type("", element, module_name)?;
                let compiled = if type_name == "SET OF" {
                    Type::set_of(name, element)
                } else {
                    Type::sequence_of(name, element)
                };

                (
                    compiled,
                    Constraints::Array {
                        size: None,
                        element: Box::new(element_constraints),
                    },
                )
            }
            "CHOICE" => {
                let members = self.compile_members(descriptor, module_name, false)?;
                (
                    Type::choice(name, Choice::new(members.root, members.additions)?),
                    Constraints::Choice(members.constraints),
                )
            }
            "INTEGER" => (Type::integer(name), Constraints::Unconstrained),
            "ENUMERATED" => (
                Type::enumerated(name, self.compile_enumerated(name, descriptor)?),
                Constraints::Unconstrained,
            ),
            "BOOLEAN" => (Type::boolean(name), Constraints::Unconstrained),
            "NULL" => (Type::null(name), Constraints::Unconstrained),
            "OCTET STRING" => {
                let size = self.size_range(descriptor, module_name)?;
                (
                    Type::octet_string(name, size.as_ref()),
                    Constraints::OctetString(Range::default()),
                )
            }
            "BIT STRING" => {
                let size = self.size_range(descriptor, module_name)?;
                (
                    Type::bit_string(name, size.as_ref()),
                    Constraints::BitString(Range::default()),
                )
            }
            _ => {
                if let Some(kind) = StringKind::from_type_name(type_name) {
                    let size = self.size_range(descriptor, module_name)?;
                    let alphabet = match kind {
                        StringKind::Numeric => Some(Alphabet::Numeric),
                        StringKind::Printable => Some(Alphabet::Printable),
                        _ => None,
                    };

                    (
                        Type::string(name, kind, size.as_ref()),
                        Constraints::String {
                            size: None,
                            alphabet,
                        },
                    )
                } else if let Some(stub) = StubKind::from_type_name(type_name) {
                    (Type::unimplemented(name, stub), Constraints::Unconstrained)
                } else {
                    self.compile_user_type(name, type_name, module_name)?
                }
            }
        };

        if let Some(tag) = &descriptor.tag {
            compiled = compiled.with_tag(tag.number, TagClass::from_descriptor(tag.class.as_deref()));
        }

        if let Some(entries) = &descriptor.restricted_to {
            if matches!(compiled.kind(), TypeKind::Integer(_)) {
                let range = self.range(entries, module_name)?;
                compiled = compiled.with_restricted_to_range(&range);

                if !range.has_extension_marker {
                    constraints = Constraints::Integer(range);
                }
            }
        }

        if let Some(range) = self.size_range(descriptor, module_name)? {
            if !range.has_extension_marker {
                constraints = constraints.with_size(range);
            }
        }

        Ok((compiled, constraints))
    }

    fn compile_user_type(
        &mut self,
        name: &str,
        type_name: &str,
        module_name: &'a str,
    ) -> OerResult<(Type, Constraints)> {
        let (module_name, descriptor) = self.lookup_type(type_name, module_name)?;
        let key = (module_name.to_string(), type_name.to_string());

        if self.backtrace.contains(&key) {
            let slot = self.slots.get(&key).copied().ok_or_else(|| {
                Error::Compile(format!("Type '{}.{}' has no slot.", module_name, type_name))
            })?;

            debug!(
                "Recursive reference to '{}.{}' from member '{}'",
                module_name, type_name, name
            );

            let recursive = Recursive::new(type_name, module_name, self.arena.clone(), slot);
            return Ok((Type::recursive(name, recursive), Constraints::Unconstrained));
        }

        self.backtrace.push(key);
        let compiled = self.compile_type(name, descriptor, module_name);
        self.backtrace.pop();

        compiled
    }

    fn compile_members(
        &mut self,
        descriptor: &'a TypeDescriptor,
        module_name: &'a str,
        sort_by_tag: bool,
    ) -> OerResult<Members> {
        let entries = descriptor.members.as_deref().ok_or_else(|| {
            Error::Compile(format!("{} has no members.", descriptor.type_name))
        })?;

        let mut members = Members {
            root: Vec::new(),
            additions: None,
            constraints: Vec::new(),
        };
        let mut in_extension = false;

        for entry in entries {
            let group = match entry {
                MemberEntry::Marker(marker) if marker == EXTENSION_MARKER => {
                    in_extension = !in_extension;

                    if in_extension {
                        members.additions.get_or_insert_with(Vec::new);
                    }

                    continue;
                }
                MemberEntry::Marker(marker) => {
                    return Err(Error::Compile(format!(
                        "Unexpected member list entry '{}'.",
                        marker
                    )));
                }
                MemberEntry::Group(group) => group.as_slice(),
                MemberEntry::Member(member) => std::slice::from_ref(&**member),
            };

            for member in group {
                let (compiled, constraints) = self.compile_member(member, module_name)?;
                members
                    .constraints
                    .push((compiled.name().to_string(), constraints));

                match &mut members.additions {
                    Some(additions) if in_extension => additions.push(compiled),
                    _ => members.root.push(compiled),
                }
            }
        }

        if sort_by_tag {
            members.root.sort_by_key(Type::tag_bytes);
        }

        Ok(members)
    }

    fn compile_member(
        &mut self,
        member: &'a TypeDescriptor,
        module_name: &'a str,
    ) -> OerResult<(Type, Constraints)> {
        let name = member.name.as_deref().ok_or_else(|| {
            Error::Compile(format!("Member of type {} has no name.", member.type_name))
        })?;

        let (compiled, constraints) = self.compile_type(name, member, module_name)?;
        let default = match &member.default {
            Some(default) => Some(self.convert_default(&compiled, default)?),
            None => None,
        };

        Ok((
            compiled.with_optional(member.optional).with_default(default),
            constraints,
        ))
    }

    /// Number the values of an ENUMERATED
    ///
    /// Unnumbered root values take the smallest non-negative numbers not
    /// used by numbered root values. Unnumbered additions take one more
    /// than the largest number so far.
    fn compile_enumerated(&self, name: &str, descriptor: &TypeDescriptor) -> OerResult<Enumerated> {
        let entries = descriptor.values.as_deref().ok_or_else(|| {
            Error::Compile(format!("ENUMERATED '{}' has no values.", name))
        })?;

        let root_entries = entries
            .iter()
            .take_while(|entry| !matches!(entry, EnumEntry::Name(marker) if marker == EXTENSION_MARKER));
        let mut used: HashSet<i128> = root_entries
            .filter_map(|entry| match entry {
                EnumEntry::Numbered(_, number) => Some(*number as i128),
                EnumEntry::Name(_) => None,
            })
            .collect();

        let mut values = Vec::new();
        let mut names = HashSet::new();
        let mut numbers = HashSet::new();
        let mut in_extension = false;
        let mut next_root = 0i128;
        let mut largest: Option<i128> = None;

        for entry in entries {
            let (value_name, number) = match entry {
                EnumEntry::Name(marker) if marker == EXTENSION_MARKER => {
                    in_extension = true;
                    continue;
                }
                EnumEntry::Numbered(value_name, number) => (value_name, *number as i128),
                EnumEntry::Name(value_name) if !in_extension => {
                    while used.contains(&next_root) {
                        next_root += 1;
                    }

                    used.insert(next_root);
                    (value_name, next_root)
                }
                EnumEntry::Name(value_name) => (value_name, largest.map_or(0, |n| n + 1)),
            };

            if !names.insert(value_name.clone()) || !numbers.insert(number) {
                return Err(Error::Compile(format!(
                    "Duplicate enumeration value '{}' ({}) in '{}'.",
                    value_name, number, name
                )));
            }

            largest = Some(largest.map_or(number, |n| n.max(number)));
            values.push((value_name.clone(), number));
        }

        Ok(Enumerated::new(values, self.options.numeric_enums))
    }

    fn convert_default(&self, compiled: &Type, default: &serde_json::Value) -> OerResult<Value> {
        let invalid = || {
            Error::Compile(format!(
                "Invalid default value {} of member '{}'.",
                default,
                compiled.name()
            ))
        };

        match compiled.kind() {
            TypeKind::Boolean => default.as_bool().map(Value::Boolean).ok_or_else(invalid),
            TypeKind::Integer(_) => json_integer(default).map(Value::Integer).ok_or_else(invalid),
            TypeKind::Null => Ok(Value::Null),
            TypeKind::Enumerated(enumerated) => {
                let name = default.as_str().ok_or_else(invalid)?;
                let number = enumerated.value_of(name).ok_or_else(invalid)?;

                if enumerated.is_numeric() {
                    Ok(Value::Integer(number))
                } else {
                    Ok(Value::new_enumerated(name))
                }
            }
            TypeKind::KnownMultiplierString(_) => {
                default.as_str().map(|text| Value::new_string(text)).ok_or_else(invalid)
            }
            TypeKind::OctetString(_) => {
                let text = default.as_str().ok_or_else(invalid)?;
                let bytes = hex::decode(text).map_err(|_| invalid())?;
                Ok(Value::OctetString(bytes))
            }
            _ => Err(Error::Compile(format!(
                "Default values of type {} are not supported (member '{}').",
                compiled.type_name(),
                compiled.name()
            ))),
        }
    }

    fn size_range(&self, descriptor: &TypeDescriptor, module_name: &str) -> OerResult<Option<Range>> {
        descriptor
            .size
            .as_deref()
            .map(|entries| self.range(entries, module_name))
            .transpose()
    }

    /// Union of the entries of a range list
    fn range(&self, entries: &[RangeEntry], module_name: &str) -> OerResult<Range> {
        let has_extension_marker = entries.iter().any(RangeEntry::is_extension_marker);
        let mut bounds: Option<(Option<i128>, Option<i128>)> = None;

        for entry in entries.iter().filter(|entry| !entry.is_extension_marker()) {
            let (minimum, maximum) = match entry {
                RangeEntry::Range(lower, upper) => (
                    self.resolve_bound(lower, module_name)?,
                    self.resolve_bound(upper, module_name)?,
                ),
                RangeEntry::Value(value) => {
                    let value = self.resolve_bound(value, module_name)?;
                    (value, value)
                }
            };

            bounds = Some(match bounds {
                None => (minimum, maximum),
                Some((lower, upper)) => (
                    lower.zip(minimum).map(|(a, b)| a.min(b)),
                    upper.zip(maximum).map(|(a, b)| a.max(b)),
                ),
            });
        }

        let (minimum, maximum) = bounds.unwrap_or_default();

        Ok(Range::new(minimum, maximum, has_extension_marker))
    }

    fn resolve_bound(&self, bound: &RangeBound, module_name: &str) -> OerResult<Option<i128>> {
        match bound {
            RangeBound::Unsigned(value) => Ok(Some(*value as i128)),
            RangeBound::Signed(value) => Ok(Some(*value as i128)),
            RangeBound::Name(name) if name == "MIN" || name == "MAX" => Ok(None),
            RangeBound::Name(name) => self.lookup_value(name, module_name).map(Some),
        }
    }

    fn lookup_type(
        &self,
        type_name: &str,
        module_name: &'a str,
    ) -> OerResult<(&'a str, &'a TypeDescriptor)> {
        let schema = self.schema;
        let not_found = || {
            Error::Compile(format!(
                "Type '{}' not found in module '{}'.",
                type_name, module_name
            ))
        };
        let module = schema.get(module_name).ok_or_else(not_found)?;

        if let Some(descriptor) = module.types.get(type_name) {
            return Ok((module_name, descriptor));
        }

        module
            .imports
            .iter()
            .filter(|(_, names)| names.iter().any(|name| name == type_name))
            .find_map(|(imported, _)| {
                let (imported, module) = schema.get_key_value(imported)?;
                let descriptor = module.types.get(type_name)?;
                Some((imported.as_str(), descriptor))
            })
            .ok_or_else(not_found)
    }

    fn lookup_value(&self, name: &str, module_name: &str) -> OerResult<i128> {
        let schema = self.schema;
        let not_found = || {
            Error::Compile(format!(
                "Value '{}' not found in module '{}'.",
                name, module_name
            ))
        };
        let module = schema.get(module_name).ok_or_else(not_found)?;

        let descriptor = module.values.get(name).or_else(|| {
            module
                .imports
                .iter()
                .filter(|(_, names)| names.iter().any(|imported| imported == name))
                .find_map(|(imported, _)| schema.get(imported)?.values.get(name))
        });

        let descriptor = descriptor.ok_or_else(not_found)?;

        json_integer(&descriptor.value).ok_or_else(|| {
            Error::Compile(format!(
                "Value '{}' is not an integer: {}.",
                name, descriptor.value
            ))
        })
    }
}

fn json_integer(value: &serde_json::Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;
    use serde_json::json;

    fn compile_value(schema: serde_json::Value) -> OerResult<Specification> {
        let schema: SchemaDescriptor = serde_json::from_value(schema).unwrap();
        compile_dict(&schema)
    }

    fn enum_values(values: serde_json::Value) -> Vec<(String, i128)> {
        let specification = compile_value(json!({
            "M": {"types": {"E": {"type": "ENUMERATED", "values": values}}}
        }))
        .unwrap();
        let compiled = specification.type_("E").unwrap();
        let TypeKind::Enumerated(enumerated) = compiled.type_().kind() else {
            panic!("expected ENUMERATED");
        };

        (-1..=10)
            .filter_map(|n| enumerated.name_of(n).map(|name| (name.to_string(), n)))
            .collect()
    }

    #[test]
    fn test_enumerated_auto_numbering() {
        assert_eq!(
            enum_values(json!(["a", ["b", 0], "c", "...", "d", ["e", 7], "f"])),
            vec![
                ("b".to_string(), 0),
                ("a".to_string(), 1),
                ("c".to_string(), 2),
                ("d".to_string(), 3),
                ("e".to_string(), 7),
                ("f".to_string(), 8),
            ]
        );
    }

    #[test]
    fn test_duplicate_enumeration() {
        let err = compile_value(json!({
            "M": {"types": {"E": {"type": "ENUMERATED", "values": [["a", 0], ["b", 0]]}}}
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Compile(_)));
    }

    #[test]
    fn test_restricted_integer() {
        let specification = compile_value(json!({
            "M": {
                "types": {
                    "Byte": {"type": "INTEGER", "restricted-to": [[0, "upper"]]},
                    "Big": {"type": "INTEGER", "restricted-to": [["MIN", "MAX"]]},
                    "Ext": {"type": "INTEGER", "restricted-to": [[0, 255], "..."]}
                },
                "values": {"upper": {"type": "INTEGER", "value": 255}}
            }
        }))
        .unwrap();

        assert_eq!(specification.encode("Byte", &Value::Integer(200)).unwrap(), vec![0xC8]);
        assert_eq!(
            specification.encode("Big", &Value::Integer(200)).unwrap(),
            vec![0x02, 0x00, 0xC8]
        );
        assert_eq!(
            specification.encode("Ext", &Value::Integer(200)).unwrap(),
            vec![0x02, 0x00, 0xC8]
        );
        assert_eq!(
            specification.type_("Byte").unwrap().constraints(),
            &Constraints::Integer(Range::new(Some(0), Some(255), false))
        );
        assert_eq!(
            specification.type_("Ext").unwrap().constraints(),
            &Constraints::Unconstrained
        );
    }

    #[test]
    fn test_tag_override() {
        let specification = compile_value(json!({
            "M": {"types": {
                "A": {"type": "INTEGER", "tag": {"number": 3}},
                "B": {"type": "A", "tag": {"class": "APPLICATION", "number": 40}}
            }}
        }))
        .unwrap();

        assert_eq!(
            specification.type_("A").unwrap().type_().tag(),
            Some(Tag::context_specific(3))
        );
        assert_eq!(
            specification.type_("B").unwrap().type_().tag_bytes(),
            Some(vec![0x5F, 0x28])
        );
    }

    #[test]
    fn test_set_members_sorted_by_tag() {
        let specification = compile_value(json!({
            "M": {"types": {"S": {"type": "SET", "members": [
                {"name": "b", "type": "INTEGER", "tag": {"number": 1}},
                {"name": "a", "type": "BOOLEAN", "tag": {"number": 0}}
            ]}}}
        }))
        .unwrap();

        let compiled = specification.type_("S").unwrap();
        assert_eq!(compiled.to_string(), "Set(S, [Boolean(a), Integer(b)])");
    }

    #[test]
    fn test_extension_groups() {
        let specification = compile_value(json!({
            "M": {"types": {"S": {"type": "SEQUENCE", "members": [
                {"name": "a", "type": "BOOLEAN"},
                "...",
                [{"name": "b", "type": "BOOLEAN"}, {"name": "c", "type": "NULL"}],
                {"name": "d", "type": "INTEGER"},
                "...",
                {"name": "e", "type": "INTEGER"}
            ]}}}
        }))
        .unwrap();

        let compiled = specification.type_("S").unwrap();
        let TypeKind::Sequence(members) = compiled.type_().kind() else {
            panic!("expected SEQUENCE");
        };
        let root: Vec<&str> = members.root_members().iter().map(Type::name).collect();
        let additions: Vec<&str> = members
            .additions()
            .unwrap()
            .iter()
            .map(Type::name)
            .collect();
        assert_eq!(root, vec!["a", "e"]);
        assert_eq!(additions, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_imports() {
        let specification = compile_value(json!({
            "A": {
                "types": {"Foo": {"type": "Bar", "restricted-to": [[0, "limit"]]}},
                "imports": {"B": ["Bar", "limit"]}
            },
            "B": {
                "types": {"Bar": {"type": "INTEGER"}},
                "values": {"limit": {"type": "INTEGER", "value": 65535}}
            }
        }))
        .unwrap();

        assert_eq!(
            specification.get("A", "Foo").unwrap().encode(&Value::Integer(1)).unwrap(),
            vec![0x00, 0x01]
        );
    }

    #[test]
    fn test_unknown_type() {
        let err = compile_value(json!({
            "M": {"types": {"A": {"type": "Missing"}}}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            Error::Compile("Type 'Missing' not found in module 'M'.".to_string())
        );
    }

    #[test]
    fn test_defaults() {
        let specification = compile_value(json!({
            "M": {"types": {"S": {"type": "SEQUENCE", "members": [
                {"name": "a", "type": "INTEGER", "default": 5},
                {"name": "b", "type": "OCTET STRING", "default": "0102"},
                {"name": "c", "type": "IA5String", "default": "x"}
            ]}}}
        }))
        .unwrap();

        let decoded = specification.decode("S", &[0x00]).unwrap();
        assert_eq!(
            decoded,
            Value::new_structure([
                ("a", Value::Integer(5)),
                ("b", Value::OctetString(vec![1, 2])),
                ("c", Value::new_string("x")),
            ])
        );
    }

    #[test]
    fn test_unsupported_default() {
        let err = compile_value(json!({
            "M": {"types": {"S": {"type": "SEQUENCE", "members": [
                {"name": "a", "type": "SEQUENCE OF", "element": {"type": "NULL"}, "default": []}
            ]}}}
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Compile(_)));
    }

    #[test]
    fn test_recursive_type() {
        let specification = compile_value(json!({
            "M": {"types": {"List": {"type": "SEQUENCE", "members": [
                {"name": "value", "type": "INTEGER"},
                {"name": "next", "type": "List", "optional": true}
            ]}}}
        }))
        .unwrap();

        let compiled = specification.type_("List").unwrap();
        assert_eq!(
            compiled.to_string(),
            "Sequence(List, [Integer(value), Recursive(next)])"
        );

        let value = Value::new_structure([
            ("value", Value::Integer(1)),
            (
                "next",
                Value::new_structure([("value", Value::Integer(2))]),
            ),
        ]);
        let bytes = compiled.encode(&value).unwrap();
        assert_eq!(bytes, vec![0x80, 0x01, 0x01, 0x00, 0x01, 0x02]);
        assert_eq!(compiled.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_choice_without_tags_rejected() {
        let err = compile_value(json!({
            "M": {"types": {"C": {"type": "CHOICE", "members": [
                {"name": "inner", "type": "CHOICE", "members": [
                    {"name": "a", "type": "NULL"}
                ]}
            ]}}}
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Compile(_)));
    }

    #[test]
    fn test_compile_json() {
        let specification = compile_json(
            r#"{"M": {"types": {"B": {"type": "BOOLEAN"}}}}"#,
        )
        .unwrap();
        assert_eq!(specification.encode("B", &Value::Boolean(true)).unwrap(), vec![0xFF]);
        assert!(matches!(compile_json("{"), Err(Error::Compile(_))));
    }
}
