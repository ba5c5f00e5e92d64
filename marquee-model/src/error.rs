use std::fmt::{self, Display};

/// Errors produced while loading records from their JSON form.
#[derive(Debug)]
pub enum ModelError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A node had the wrong JSON shape for the value it should carry.
    Shape {
        expected: &'static str,
        found: &'static str,
    },
    /// A string enum value outside the known name table.
    UnknownVariant { kind: &'static str, name: String },
    /// A crew role points past the end of the shared identity list.
    DanglingRole {
        list: &'static str,
        index: i64,
        names: usize,
    },
    /// Wraps a nested failure with the property it was read from.
    Field { key: String, source: Box<ModelError> },
}

impl ModelError {
    pub fn shape(expected: &'static str, found: &serde_json::Value) -> Self {
        ModelError::Shape {
            expected,
            found: kind_of(found),
        }
    }

    pub fn at(self, key: impl Into<String>) -> Self {
        ModelError::Field {
            key: key.into(),
            source: Box::new(self),
        }
    }

    /// Dotted path of property names leading to the innermost failure.
    pub fn path(&self) -> String {
        let mut segments = Vec::new();
        let mut current = self;
        while let ModelError::Field { key, source } = current {
            segments.push(key.as_str());
            current = source;
        }
        segments.join(".")
    }
}

fn kind_of(node: &serde_json::Value) -> &'static str {
    match node {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Io(err) => write!(f, "io error: {err}"),
            ModelError::Json(err) => write!(f, "json error: {err}"),
            ModelError::Shape { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ModelError::UnknownVariant { kind, name } => {
                write!(f, "unknown {kind} '{name}'")
            }
            ModelError::DanglingRole { list, index, names } => write!(
                f,
                "{list} entry references person #{index}, but only {names} are known"
            ),
            ModelError::Field { key, source } => write!(f, "{key}: {source}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Io(err) => Some(err),
            ModelError::Json(err) => Some(err),
            ModelError::Field { source, .. } => Some(source.as_ref()),
            ModelError::Shape { .. }
            | ModelError::UnknownVariant { .. }
            | ModelError::DanglingRole { .. } => None,
        }
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Json(err)
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
