//! Value codec for the CQL binary wire format.
//!
//! `encode` turns an application [`Value`] into its protocol byte form,
//! dispatching on an explicit [`TypeHint`] or on the inferred type when no
//! hint is given. `decode` is the reverse and always requires a hint; there
//! is no blind decoding. Both are pure functions.

use uuid::Uuid;

use crate::constant::CqlType;
use crate::error::{Error, Result};
use crate::int64::Int64;
use crate::protocol::primitive::*;
use crate::value::{TypeHint, Value};

/// Encode a value into wire bytes.
///
/// `None` is the null marker: a `Value::Null` input encodes to `Ok(None)`
/// regardless of the hint, and is never confused with an empty byte
/// sequence. Without a hint the type is inferred via [`guess_type`].
pub fn encode(value: &Value, hint: Option<&TypeHint>) -> Result<Option<Vec<u8>>> {
    if value.is_null() {
        return Ok(None);
    }
    let guessed;
    let hint = match hint {
        Some(hint) => hint,
        None => {
            guessed = TypeHint::new(guess_type(value)?);
            &guessed
        }
    };
    let mut out = Vec::new();
    encode_into(value, hint, &mut out)?;
    Ok(Some(out))
}

/// Infer the wire type from the runtime shape of a value.
///
/// The precedence order is part of the contract: blob wins over text so
/// raw bytes stay raw, a UUID-shaped string wins over text, and integral
/// numbers classify as int rather than bigint unless wrapped in [`Int64`]
/// or explicitly hinted.
pub fn guess_type(value: &Value) -> Result<CqlType> {
    match value {
        Value::Blob(_) => Ok(CqlType::Blob),
        Value::Timestamp(_) => Ok(CqlType::Timestamp),
        Value::Bigint(_) => Ok(CqlType::Bigint),
        Value::Uuid(_) => Ok(CqlType::Uuid),
        Value::Text(s) if is_uuid_string(s) => Ok(CqlType::Uuid),
        Value::Boolean(_) => Ok(CqlType::Boolean),
        Value::Int(_) => Ok(CqlType::Int),
        Value::Double(d) if is_integral_i32(*d) => Ok(CqlType::Int),
        Value::Double(_) => Ok(CqlType::Double),
        Value::Float(_) => Ok(CqlType::Float),
        Value::List(_) => Ok(CqlType::List),
        Value::Text(_) => Ok(CqlType::Text),
        other => Err(Error::UnsupportedType(format!(
            "no inference rule matches a {} value, supply an explicit hint",
            other.kind()
        ))),
    }
}

/// Decode wire bytes under an explicit hint.
pub fn decode(bytes: &[u8], hint: &TypeHint) -> Result<Value> {
    match hint.id {
        CqlType::Int => {
            expect_len(bytes, 4, hint.id)?;
            let (v, _) = read_int_4(bytes)?;
            Ok(Value::Int(v as i32))
        }
        CqlType::Bigint | CqlType::Counter => {
            expect_len(bytes, 8, hint.id)?;
            let (v, _) = read_int_8(bytes)?;
            Ok(Value::Bigint(Int64::new(v as i64)))
        }
        CqlType::Boolean => {
            expect_len(bytes, 1, hint.id)?;
            let (v, _) = read_int_1(bytes)?;
            Ok(Value::Boolean(v != 0))
        }
        CqlType::Double => {
            expect_len(bytes, 8, hint.id)?;
            let (v, _) = read_int_8(bytes)?;
            Ok(Value::Double(f64::from_bits(v)))
        }
        CqlType::Float => {
            expect_len(bytes, 4, hint.id)?;
            let (v, _) = read_int_4(bytes)?;
            Ok(Value::Float(f32::from_bits(v)))
        }
        CqlType::Timestamp => {
            expect_len(bytes, 8, hint.id)?;
            let (v, _) = read_int_8(bytes)?;
            Ok(Value::Timestamp(v as i64))
        }
        CqlType::Uuid | CqlType::Timeuuid => {
            expect_len(bytes, 16, hint.id)?;
            let uuid = Uuid::from_slice(bytes)
                .map_err(|e| Error::Decode(format!("invalid uuid bytes: {e}")))?;
            Ok(Value::Uuid(uuid))
        }
        CqlType::Text | CqlType::Varchar | CqlType::Ascii => {
            let s = simdutf8::basic::from_utf8(bytes).map_err(|_| {
                Error::Decode(format!("invalid utf-8 in {} value", hint.id.name()))
            })?;
            Ok(Value::Text(s.to_owned()))
        }
        CqlType::Blob => Ok(Value::Blob(bytes.to_vec())),
        CqlType::List => Ok(Value::List(decode_elements(bytes, hint)?)),
        CqlType::Set => {
            let items = decode_elements(bytes, hint)?;
            let mut set = Vec::with_capacity(items.len());
            for item in items {
                if !set.contains(&item) {
                    set.push(item);
                }
            }
            Ok(Value::Set(set))
        }
        CqlType::Map => decode_map(bytes, hint),
        CqlType::Decimal | CqlType::Varint | CqlType::Inet | CqlType::Custom => Err(
            Error::Decode(format!("decoding not supported for type {}", hint.id.name())),
        ),
    }
}

fn encode_into(value: &Value, hint: &TypeHint, out: &mut Vec<u8>) -> Result<()> {
    match hint.id {
        CqlType::Int => match value {
            Value::Int(v) => write_int_4(out, *v as u32),
            Value::Double(d) if is_integral_i32(*d) => write_int_4(out, *d as i32 as u32),
            _ => return Err(mismatch(hint.id, value)),
        },
        CqlType::Bigint | CqlType::Counter => {
            write_int_8(out, as_i64(value).ok_or_else(|| mismatch(hint.id, value))? as u64);
        }
        CqlType::Boolean => match value {
            Value::Boolean(b) => write_int_1(out, *b as u8),
            _ => return Err(mismatch(hint.id, value)),
        },
        CqlType::Double => match value {
            Value::Double(d) => write_int_8(out, d.to_bits()),
            Value::Float(f) => write_int_8(out, (*f as f64).to_bits()),
            Value::Int(v) => write_int_8(out, (*v as f64).to_bits()),
            _ => return Err(mismatch(hint.id, value)),
        },
        CqlType::Float => match value {
            Value::Float(f) => write_int_4(out, f.to_bits()),
            Value::Double(d) => write_int_4(out, (*d as f32).to_bits()),
            Value::Int(v) => write_int_4(out, (*v as f32).to_bits()),
            _ => return Err(mismatch(hint.id, value)),
        },
        CqlType::Text | CqlType::Varchar | CqlType::Ascii => match value {
            Value::Text(s) => write_bytes_fix(out, s.as_bytes()),
            _ => return Err(mismatch(hint.id, value)),
        },
        CqlType::Blob => match value {
            Value::Blob(b) => write_bytes_fix(out, b),
            // strings are accepted as their utf-8 bytes
            Value::Text(s) => write_bytes_fix(out, s.as_bytes()),
            _ => return Err(mismatch(hint.id, value)),
        },
        CqlType::Uuid | CqlType::Timeuuid => match value {
            Value::Uuid(u) => write_bytes_fix(out, u.as_bytes()),
            Value::Text(s) => match Uuid::try_parse(s) {
                Ok(u) => write_bytes_fix(out, u.as_bytes()),
                Err(_) => return Err(mismatch(hint.id, value)),
            },
            _ => return Err(mismatch(hint.id, value)),
        },
        CqlType::Timestamp => {
            let millis = match value {
                Value::Timestamp(ms) => *ms,
                other => as_i64(other).ok_or_else(|| mismatch(hint.id, value))?,
            };
            write_int_8(out, millis as u64);
        }
        CqlType::List | CqlType::Set => match value {
            Value::List(items) | Value::Set(items) => {
                write_count(out, items.len())?;
                for item in items {
                    write_element(out, item, hint.subtype(0))?;
                }
            }
            _ => return Err(mismatch(hint.id, value)),
        },
        CqlType::Map => match value {
            Value::Map(pairs) => {
                write_count(out, pairs.len())?;
                for (key, value) in pairs {
                    write_element(out, key, hint.subtype(0))?;
                    write_element(out, value, hint.subtype(1))?;
                }
            }
            _ => return Err(mismatch(hint.id, value)),
        },
        CqlType::Decimal | CqlType::Varint | CqlType::Inet | CqlType::Custom => {
            return Err(Error::UnsupportedType(format!(
                "encoding not supported for type {}",
                hint.id.name()
            )));
        }
    }
    Ok(())
}

fn mismatch(hint: CqlType, value: &Value) -> Error {
    Error::UnsupportedType(format!(
        "cannot encode a {} value as {}",
        value.kind(),
        hint.name()
    ))
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Bigint(l) => Some(l.value()),
        Value::Int(v) => Some(*v as i64),
        Value::Double(d) if d.fract() == 0.0 && *d >= i64::MIN as f64 && *d <= i64::MAX as f64 => {
            Some(*d as i64)
        }
        _ => None,
    }
}

fn is_integral_i32(d: f64) -> bool {
    d.fract() == 0.0 && d >= i32::MIN as f64 && d <= i32::MAX as f64
}

fn is_uuid_string(s: &str) -> bool {
    // canonical hyphenated form only; 32-char hex stays text
    s.len() == 36 && Uuid::try_parse(s).is_ok()
}

fn write_count(out: &mut Vec<u8>, len: usize) -> Result<()> {
    let count = u16::try_from(len).map_err(|_| {
        Error::UnsupportedType(format!("collection of {len} elements exceeds the 2-byte count"))
    })?;
    write_int_2(out, count);
    Ok(())
}

/// Length-prefixed, recursively encoded collection element. Falls back to
/// per-element inference when the hint carries no sub-type.
fn write_element(out: &mut Vec<u8>, value: &Value, hint: Option<&TypeHint>) -> Result<()> {
    let bytes = encode(value, hint)?.ok_or_else(|| {
        Error::UnsupportedType("null elements are not representable inside a collection".into())
    })?;
    write_int_4(out, bytes.len() as u32);
    write_bytes_fix(out, &bytes);
    Ok(())
}

fn expect_len(bytes: &[u8], expected: usize, ty: CqlType) -> Result<()> {
    if bytes.len() != expected {
        return Err(Error::Decode(format!(
            "{} expects {expected} bytes, got {}",
            ty.name(),
            bytes.len()
        )));
    }
    Ok(())
}

/// Read one 4-byte length prefix and that many bytes.
fn read_chunk(data: &[u8]) -> Result<(&[u8], &[u8])> {
    let (len, rest) = read_int_4(data)?;
    read_bytes_fix(rest, len as usize)
}

fn ensure_consumed(rest: &[u8], ty: CqlType) -> Result<()> {
    if !rest.is_empty() {
        return Err(Error::Decode(format!(
            "{} bytes left over after decoding {}",
            rest.len(),
            ty.name()
        )));
    }
    Ok(())
}

fn decode_elements(bytes: &[u8], hint: &TypeHint) -> Result<Vec<Value>> {
    let elem = hint.subtype(0).ok_or_else(|| {
        Error::Decode(format!("{} hint is missing its element type", hint.id.name()))
    })?;
    let (count, mut rest) = read_int_2(bytes)?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (chunk, r) = read_chunk(rest)?;
        items.push(decode(chunk, elem)?);
        rest = r;
    }
    ensure_consumed(rest, hint.id)?;
    Ok(items)
}

fn decode_map(bytes: &[u8], hint: &TypeHint) -> Result<Value> {
    let key_hint = hint
        .subtype(0)
        .ok_or_else(|| Error::Decode("map hint is missing its key type".into()))?;
    let value_hint = hint
        .subtype(1)
        .ok_or_else(|| Error::Decode("map hint is missing its value type".into()))?;
    let (count, mut rest) = read_int_2(bytes)?;
    let mut pairs: Vec<(Value, Value)> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (key_bytes, r) = read_chunk(rest)?;
        let (value_bytes, r) = read_chunk(r)?;
        let key = decode(key_bytes, key_hint)?;
        let value = decode(value_bytes, value_hint)?;
        // repeated keys replace the earlier pair, keeping the map key-unique
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => pairs.push((key, value)),
        }
        rest = r;
    }
    ensure_consumed(rest, hint.id)?;
    Ok(Value::Map(pairs))
}
