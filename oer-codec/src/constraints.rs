//! Value constraint checking
//!
//! Constraints are compiled from the same descriptors as the types and
//! checked on request, separately from encoding. Extensible constraints
//! are not enforced; references to recursive types are not checked.

use crate::types::Range;
use once_cell::sync::Lazy;
use oer_core::{Error, OerResult, Value};
use regex::Regex;

/// First character outside the NumericString alphabet
static NUMERIC_INVALID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9 ]").expect("valid NumericString pattern"));

/// First character outside the PrintableString alphabet
static PRINTABLE_INVALID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9 '()+,\-./:=?]").expect("valid PrintableString pattern")
});

/// Permitted alphabet of a character string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alphabet {
    Numeric,
    Printable,
}

impl Alphabet {
    fn check(&self, string: &str) -> Result<(), char> {
        let pattern = match self {
            Alphabet::Numeric => &*NUMERIC_INVALID,
            Alphabet::Printable => &*PRINTABLE_INVALID,
        };

        match pattern.find(string) {
            Some(found) => Err(found.as_str().chars().next().unwrap_or_default()),
            None => Ok(()),
        }
    }
}

/// Compiled constraints of one type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Constraints {
    #[default]
    Unconstrained,
    /// INTEGER value range
    Integer(Range),
    /// OCTET STRING size, in bytes
    OctetString(Range),
    /// BIT STRING size, in bits
    BitString(Range),
    /// Character string size, in characters, and alphabet
    String {
        size: Option<Range>,
        alphabet: Option<Alphabet>,
    },
    /// SEQUENCE and SET members, by name
    Members(Vec<(String, Constraints)>),
    /// SEQUENCE OF and SET OF size, in elements, and element constraints
    Array {
        size: Option<Range>,
        element: Box<Constraints>,
    },
    /// CHOICE alternatives, by name
    Choice(Vec<(String, Constraints)>),
}

impl Constraints {
    /// Replace the size range of a sized constraint
    pub(crate) fn with_size(self, range: Range) -> Self {
        match self {
            Constraints::OctetString(_) => Constraints::OctetString(range),
            Constraints::BitString(_) => Constraints::BitString(range),
            Constraints::String { alphabet, .. } => Constraints::String {
                size: Some(range),
                alphabet,
            },
            Constraints::Array { element, .. } => Constraints::Array {
                size: Some(range),
                element,
            },
            other => other,
        }
    }

    /// Check `value` against the constraints
    ///
    /// # Errors
    /// Returns `Error::Constraints` naming the member path of the first
    /// violation.
    pub fn check(&self, value: &Value) -> OerResult<()> {
        self.check_at(value, &mut Vec::new())
    }

    fn check_at<'a>(&'a self, value: &Value, path: &mut Vec<&'a str>) -> OerResult<()> {
        match (self, value) {
            (Constraints::Integer(range), Value::Integer(number)) => {
                if !range.contains(*number) {
                    return Err(violation(
                        path,
                        format!("Expected an integer in {}, but got {}.", range, number),
                    ));
                }
            }
            (Constraints::OctetString(range), Value::OctetString(bytes)) => {
                check_size(range, bytes.len(), path)?;
            }
            (Constraints::BitString(range), Value::BitString(bits)) => {
                check_size(range, bits.num_bits(), path)?;
            }
            (Constraints::String { size, alphabet }, Value::String(string)) => {
                if let Some(range) = size {
                    check_size(range, string.chars().count(), path)?;
                }

                if let Some(alphabet) = alphabet {
                    alphabet.check(string).map_err(|character| {
                        violation(
                            path,
                            format!("Invalid character '{}' in '{}'.", character, string),
                        )
                    })?;
                }
            }
            (Constraints::Members(members), Value::Structure(data)) => {
                for (name, constraints) in members {
                    if let Some(value) = data.get(name) {
                        path.push(name);
                        constraints.check_at(value, path)?;
                        path.pop();
                    }
                }
            }
            (Constraints::Array { size, element }, Value::Array(elements)) => {
                if let Some(range) = size {
                    check_size(range, elements.len(), path)?;
                }

                for value in elements {
                    element.check_at(value, path)?;
                }
            }
            (Constraints::Choice(members), Value::Choice(name, value)) => {
                if let Some((name, constraints)) = members.iter().find(|(member, _)| member == name) {
                    path.push(name);
                    constraints.check_at(value, path)?;
                    path.pop();
                }
            }
            _ => {}
        }

        Ok(())
    }
}

fn check_size(range: &Range, size: usize, path: &[&str]) -> OerResult<()> {
    let in_range = i128::try_from(size).is_ok_and(|size| range.contains(size));

    if !in_range {
        return Err(violation(
            path,
            format!("Expected a size in {}, but got {}.", range, size),
        ));
    }

    Ok(())
}

fn violation(path: &[&str], message: String) -> Error {
    if path.is_empty() {
        Error::Constraints(message)
    } else {
        Error::Constraints(format!("{}: {}", path.join("."), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oer_core::BitString;

    fn range(minimum: i128, maximum: i128) -> Range {
        Range::new(Some(minimum), Some(maximum), false)
    }

    #[test]
    fn test_integer_range() {
        let constraints = Constraints::Integer(range(0, 10));
        assert!(constraints.check(&Value::Integer(10)).is_ok());
        let err = constraints.check(&Value::Integer(11)).unwrap_err();
        assert_eq!(
            err,
            Error::Constraints("Expected an integer in 0..10, but got 11.".to_string())
        );
    }

    #[test]
    fn test_sizes() {
        let octets = Constraints::OctetString(range(1, 2));
        assert!(octets.check(&Value::OctetString(vec![1])).is_ok());
        assert!(octets.check(&Value::OctetString(vec![])).is_err());

        let bits = Constraints::BitString(range(4, 4));
        let value = Value::BitString(BitString::new(vec![0xF0], 4).unwrap());
        assert!(bits.check(&value).is_ok());
    }

    #[test]
    fn test_alphabets() {
        let numeric = Constraints::String {
            size: None,
            alphabet: Some(Alphabet::Numeric),
        };
        assert!(numeric.check(&Value::new_string("12 34")).is_ok());
        assert_eq!(
            numeric.check(&Value::new_string("12a")).unwrap_err().to_string(),
            "Invalid character 'a' in '12a'."
        );

        let printable = Constraints::String {
            size: Some(range(0, 20)),
            alphabet: Some(Alphabet::Printable),
        };
        assert!(printable.check(&Value::new_string("Hello (world)?")).is_ok());
        assert!(printable.check(&Value::new_string("a@b")).is_err());
    }

    #[test]
    fn test_nested_path() {
        let constraints = Constraints::Members(vec![(
            "list".to_string(),
            Constraints::Array {
                size: Some(range(0, 3)),
                element: Box::new(Constraints::Choice(vec![(
                    "small".to_string(),
                    Constraints::Integer(range(0, 5)),
                )])),
            },
        )]);

        let ok = Value::new_structure([(
            "list",
            Value::Array(vec![Value::new_choice("small", Value::Integer(3))]),
        )]);
        assert!(constraints.check(&ok).is_ok());

        let bad = Value::new_structure([(
            "list",
            Value::Array(vec![Value::new_choice("small", Value::Integer(6))]),
        )]);
        assert_eq!(
            constraints.check(&bad).unwrap_err().to_string(),
            "list.small: Expected an integer in 0..5, but got 6."
        );
    }

    #[test]
    fn test_with_size() {
        let constraints = Constraints::String {
            size: None,
            alphabet: Some(Alphabet::Numeric),
        }
        .with_size(range(1, 1));
        assert!(constraints.check(&Value::new_string("12")).is_err());
        assert_eq!(Constraints::Unconstrained.with_size(range(1, 1)), Constraints::Unconstrained);
    }
}
