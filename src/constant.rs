use crate::error::{Error, Result};

/// CQL protocol type option codes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CqlType {
    Custom = 0x0000,
    Ascii = 0x0001,
    Bigint = 0x0002,
    Blob = 0x0003,
    Boolean = 0x0004,
    Counter = 0x0005,
    Decimal = 0x0006,
    Double = 0x0007,
    Float = 0x0008,
    Int = 0x0009,
    Text = 0x000a,
    Timestamp = 0x000b,
    Uuid = 0x000c,
    Varchar = 0x000d,
    Varint = 0x000e,
    Timeuuid = 0x000f,
    Inet = 0x0010,
    List = 0x0020,
    Map = 0x0021,
    Set = 0x0022,
}

impl CqlType {
    /// Look up a type by its protocol option code.
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0x0000 => Self::Custom,
            0x0001 => Self::Ascii,
            0x0002 => Self::Bigint,
            0x0003 => Self::Blob,
            0x0004 => Self::Boolean,
            0x0005 => Self::Counter,
            0x0006 => Self::Decimal,
            0x0007 => Self::Double,
            0x0008 => Self::Float,
            0x0009 => Self::Int,
            0x000a => Self::Text,
            0x000b => Self::Timestamp,
            0x000c => Self::Uuid,
            0x000d => Self::Varchar,
            0x000e => Self::Varint,
            0x000f => Self::Timeuuid,
            0x0010 => Self::Inet,
            0x0020 => Self::List,
            0x0021 => Self::Map,
            0x0022 => Self::Set,
            _ => return None,
        })
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// CQL name of the type, as it appears in schema and hint strings.
    pub fn name(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Ascii => "ascii",
            Self::Bigint => "bigint",
            Self::Blob => "blob",
            Self::Boolean => "boolean",
            Self::Counter => "counter",
            Self::Decimal => "decimal",
            Self::Double => "double",
            Self::Float => "float",
            Self::Int => "int",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Uuid => "uuid",
            Self::Varchar => "varchar",
            Self::Varint => "varint",
            Self::Timeuuid => "timeuuid",
            Self::Inet => "inet",
            Self::List => "list",
            Self::Map => "map",
            Self::Set => "set",
        }
    }

    /// Look up a type by its CQL name (without generic parameters).
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "custom" => Self::Custom,
            "ascii" => Self::Ascii,
            "bigint" => Self::Bigint,
            "blob" => Self::Blob,
            "boolean" => Self::Boolean,
            "counter" => Self::Counter,
            "decimal" => Self::Decimal,
            "double" => Self::Double,
            "float" => Self::Float,
            "int" => Self::Int,
            "text" => Self::Text,
            "timestamp" => Self::Timestamp,
            "uuid" => Self::Uuid,
            "varchar" => Self::Varchar,
            "varint" => Self::Varint,
            "timeuuid" => Self::Timeuuid,
            "inet" => Self::Inet,
            "list" => Self::List,
            "map" => Self::Map,
            "set" => Self::Set,
            other => return Err(Error::Format(format!("unknown CQL type name {other:?}"))),
        })
    }

    /// True for list, set and map, which carry sub-type hints.
    pub fn is_collection(self) -> bool {
        matches!(self, Self::List | Self::Map | Self::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_name_round_trip() {
        for code in (0x0000..=0x0010).chain(0x0020..=0x0022) {
            let ty = CqlType::from_code(code).unwrap();
            assert_eq!(ty.code(), code);
            assert_eq!(CqlType::from_name(ty.name()).unwrap(), ty);
        }
    }

    #[test]
    fn unknown_code_and_name() {
        assert!(CqlType::from_code(0x0011).is_none());
        assert!(CqlType::from_code(0x0100).is_none());
        assert!(CqlType::from_name("tuple").is_err());
    }
}
