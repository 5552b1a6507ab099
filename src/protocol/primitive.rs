//! Big-endian wire primitives. Readers take a slice and return the value
//! plus the remaining bytes; writers append to a `Vec<u8>`.

use zerocopy::FromBytes;
use zerocopy::byteorder::big_endian::{U16 as U16BE, U32 as U32BE, U64 as U64BE};

use crate::error::{Error, Result};

fn eof(need: usize, have: usize) -> Error {
    Error::Decode(format!("unexpected end of buffer: need {need} bytes, have {have}"))
}

/// Read 1-byte integer
pub fn read_int_1(data: &[u8]) -> Result<(u8, &[u8])> {
    match data.split_first() {
        Some((first, rest)) => Ok((*first, rest)),
        None => Err(eof(1, 0)),
    }
}

/// Read 2-byte big-endian integer
pub fn read_int_2(data: &[u8]) -> Result<(u16, &[u8])> {
    if data.len() < 2 {
        return Err(eof(2, data.len()));
    }
    let value = U16BE::ref_from_bytes(&data[..2])
        .map_err(|_| Error::Decode("misaligned 2-byte read".into()))?
        .get();
    Ok((value, &data[2..]))
}

/// Read 4-byte big-endian integer
pub fn read_int_4(data: &[u8]) -> Result<(u32, &[u8])> {
    if data.len() < 4 {
        return Err(eof(4, data.len()));
    }
    let value = U32BE::ref_from_bytes(&data[..4])
        .map_err(|_| Error::Decode("misaligned 4-byte read".into()))?
        .get();
    Ok((value, &data[4..]))
}

/// Read 8-byte big-endian integer
pub fn read_int_8(data: &[u8]) -> Result<(u64, &[u8])> {
    if data.len() < 8 {
        return Err(eof(8, data.len()));
    }
    let value = U64BE::ref_from_bytes(&data[..8])
        .map_err(|_| Error::Decode("misaligned 8-byte read".into()))?
        .get();
    Ok((value, &data[8..]))
}

/// Read a fixed number of bytes
pub fn read_bytes_fix(data: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
    if data.len() < len {
        return Err(eof(len, data.len()));
    }
    Ok((&data[..len], &data[len..]))
}

/// Write 1-byte integer
pub fn write_int_1(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

/// Write 2-byte big-endian integer
pub fn write_int_2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Write 4-byte big-endian integer
pub fn write_int_4(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Write 8-byte big-endian integer
pub fn write_int_8(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Write raw bytes
pub fn write_bytes_fix(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(data);
}
