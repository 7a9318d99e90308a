use thiserror::Error;

/// Main error type for OER operations
///
/// Decode-kind errors (`Decode` and `OutOfData`) carry a location path. Each
/// structured type that catches a failing member appends the member name on
/// the way out, so the path is stored innermost-first and rendered
/// outermost-first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The value does not satisfy the compiled schema
    #[error("{0}")]
    Encode(String),

    /// The wire data does not parse against the compiled schema
    #[error("{}{message}", format_location(.location))]
    Decode {
        message: String,
        location: Vec<String>,
    },

    /// Fewer bits remain in the buffer than a read requires
    #[error(
        "{}out of data at bit offset {offset} ({}.{} bytes)",
        format_location(.location),
        .offset / 8,
        .offset % 8
    )]
    OutOfData {
        /// Number of bits consumed before the failing read
        offset: usize,
        location: Vec<String>,
    },

    /// The type exists in the hierarchy but has no OER implementation
    #[error("{type_name} is not implemented")]
    NotImplemented { type_name: String },

    /// The schema descriptor could not be compiled
    #[error("Compile error: {0}")]
    Compile(String),

    /// The value violates a compiled size, range or alphabet constraint
    #[error("{0}")]
    Constraints(String),
}

impl Error {
    /// Create a decode error with an empty location path
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
            location: Vec::new(),
        }
    }

    /// Create an out-of-data error at the given bit offset
    pub fn out_of_data(offset: usize) -> Self {
        Error::OutOfData {
            offset,
            location: Vec::new(),
        }
    }

    /// Append a member name to the location path of a decode-kind error
    ///
    /// Other error kinds are returned unchanged.
    pub fn with_location(mut self, name: &str) -> Self {
        match &mut self {
            Error::Decode { location, .. } | Error::OutOfData { location, .. } => {
                location.push(name.to_string());
            }
            _ => {}
        }
        self
    }

    /// Location path, outermost member first
    pub fn location(&self) -> Vec<&str> {
        match self {
            Error::Decode { location, .. } | Error::OutOfData { location, .. } => {
                location.iter().rev().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Check if this error was raised while decoding
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. } | Error::OutOfData { .. })
    }
}

fn format_location(location: &[String]) -> String {
    if location.is_empty() {
        return String::new();
    }

    let path: Vec<&str> = location.iter().rev().map(String::as_str).collect();
    format!("{}: ", path.join("."))
}

/// Result type alias for OER operations
pub type OerResult<T> = Result<T, Error>;
