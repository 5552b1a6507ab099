use uuid::Uuid;

use crate::constant::CqlType;
use crate::error::{Error, Result};
use crate::int64::Int64;

/// A decoded CQL value, or a value supplied by the application for
/// encoding.
///
/// This is the closed set of kinds the codec understands. Collection
/// variants hold already-decoded elements; `Set` keeps wire order with
/// duplicates removed, `Map` keeps wire order with a repeated key
/// replacing the earlier pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i32),
    Bigint(Int64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Text(String),
    Blob(Vec<u8>),
    /// Milliseconds since the Unix epoch, signed.
    Timestamp(i64),
    Uuid(Uuid),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the value kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::Bigint(_) => "bigint",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Boolean(_) => "boolean",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
            Self::Uuid(_) => "uuid",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<Int64> for Value {
    fn from(value: Int64) -> Self {
        Self::Bigint(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Bigint(Int64::new(value))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// Type descriptor guiding encode and decode.
///
/// Collection types carry sub-hints: one for list/set elements, two for
/// map keys and values.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeHint {
    pub id: CqlType,
    pub subtypes: Vec<TypeHint>,
}

impl TypeHint {
    pub fn new(id: CqlType) -> Self {
        Self { id, subtypes: Vec::new() }
    }

    pub fn with_subtypes(id: CqlType, subtypes: Vec<TypeHint>) -> Self {
        Self { id, subtypes }
    }

    /// Parse a CQL type name, including parametrized collection forms
    /// such as `list<int>`, `set<text>` and `map<text, int>`.
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        let Some(open) = name.find('<') else {
            return Ok(Self::new(CqlType::from_name(name)?));
        };
        let base = CqlType::from_name(name[..open].trim_end())?;
        let rest = &name[open + 1..];
        let inner = rest
            .strip_suffix('>')
            .ok_or_else(|| Error::Format(format!("unterminated type parameters in {name:?}")))?;

        if !base.is_collection() {
            return Err(Error::Format(format!("type {} takes no parameters", base.name())));
        }
        let mut subtypes = Vec::new();
        for part in split_top_level(inner) {
            subtypes.push(Self::parse(part)?);
        }
        let expected = if base == CqlType::Map { 2 } else { 1 };
        if subtypes.len() != expected {
            return Err(Error::Format(format!(
                "type {} takes {expected} parameter(s), got {}",
                base.name(),
                subtypes.len()
            )));
        }
        Ok(Self::with_subtypes(base, subtypes))
    }

    /// Sub-hint for list/set elements or map keys.
    pub(crate) fn subtype(&self, index: usize) -> Option<&TypeHint> {
        self.subtypes.get(index)
    }
}

impl From<CqlType> for TypeHint {
    fn from(id: CqlType) -> Self {
        Self::new(id)
    }
}

/// Split on commas that are not nested inside `<...>`.
fn split_top_level(s: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0usize;
    let mut start = 0;
    let mut parts = Vec::new();
    for (i, ch) in s.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts.into_iter()
}
