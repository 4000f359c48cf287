//! Fixed mapping from a schema's (type, format) pair to a primary type

use crate::model::PrimaryType;

/// A (type, format) pair with no entry in the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownPrimitive {
    /// The type itself is unknown
    Type(String),
    /// Known type, unknown format; `fallback` is the type's default kind
    Format {
        schema_type: String,
        format: String,
        fallback: PrimaryType,
    },
}

impl std::fmt::Display for UnknownPrimitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownPrimitive::Type(schema_type) => write!(f, "unsupported type '{schema_type}'"),
            UnknownPrimitive::Format {
                schema_type,
                format,
                ..
            } => write!(f, "unsupported format '{format}' for type '{schema_type}'"),
        }
    }
}

/// Default kind of a base type, used when no format is given
fn default_kind(schema_type: &str) -> Option<PrimaryType> {
    match schema_type {
        "boolean" => Some(PrimaryType::Boolean),
        "integer" => Some(PrimaryType::Int),
        "number" => Some(PrimaryType::Double),
        "string" => Some(PrimaryType::String),
        "file" => Some(PrimaryType::Stream),
        "object" => Some(PrimaryType::Object),
        _ => None,
    }
}

/// Looks up the primary kind of a scalar node.
///
/// A node with neither type nor format is an opaque `Object`.
pub fn primary_type(
    schema_type: Option<&str>,
    format: Option<&str>,
) -> Result<PrimaryType, UnknownPrimitive> {
    let Some(schema_type) = schema_type else {
        return match format {
            None => Ok(PrimaryType::Object),
            Some(format) => Err(UnknownPrimitive::Type(format!("<none> with format '{format}'"))),
        };
    };
    let fallback = default_kind(schema_type)
        .ok_or_else(|| UnknownPrimitive::Type(schema_type.to_string()))?;

    let Some(format) = format else {
        return Ok(fallback);
    };

    let kind = match (schema_type, format) {
        ("integer", "int32") => PrimaryType::Int,
        ("integer", "int64") => PrimaryType::Long,
        ("integer", "unixtime") => PrimaryType::UnixTime,
        ("number", "double") => PrimaryType::Double,
        ("number", "float") => PrimaryType::Float,
        ("number", "decimal") => PrimaryType::Decimal,
        ("string", "password") => PrimaryType::String,
        ("string", "char") => PrimaryType::Char,
        ("string", "byte") => PrimaryType::ByteArray,
        ("string", "base64url") => PrimaryType::Base64Url,
        ("string", "binary") => PrimaryType::Stream,
        ("string", "date") => PrimaryType::Date,
        ("string", "date-time") => PrimaryType::DateTime,
        ("string", "date-time-rfc1123") => PrimaryType::DateTimeRfc1123,
        ("string", "duration") => PrimaryType::TimeSpan,
        ("string", "uuid") => PrimaryType::Uuid,
        _ => {
            return Err(UnknownPrimitive::Format {
                schema_type: schema_type.to_string(),
                format: format.to_string(),
                fallback,
            });
        }
    };
    Ok(kind)
}
