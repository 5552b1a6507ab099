use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A value could not be encoded: no inference rule matched, or the
    /// value cannot satisfy the hinted wire type.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Bytes do not match the layout the hint declares.
    #[error("decode error: {0}")]
    Decode(String),

    /// Malformed input to a conversion (byte length, decimal literal,
    /// type name).
    #[error("format error: {0}")]
    Format(String),

    /// Row lookup by unknown name or out-of-range position.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Append on a cursor that already received its end marker.
    #[error("cursor already ended")]
    ClosedCursor,
}

pub type Result<T> = std::result::Result<T, Error>;
