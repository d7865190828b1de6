use byteorder::{ByteOrder, LittleEndian};

use crate::error::ParseError;

/// Borrow `len` bytes at `offset`, or fail if the packet ends first.
fn take<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8], ParseError> {
    let bytes = data
        .get(*offset..*offset + len)
        .ok_or(ParseError::Truncated(*offset))?;
    *offset += len;
    Ok(bytes)
}

/// Get the value of a null-terminated string
/// with index 0 at `offset` in an array of bytes.
///
/// Mutates `offset` to the index after the null-termination byte.
/// A string missing its terminator is [ParseError::Truncated].
pub fn get_string(data: &[u8], offset: &mut usize) -> Result<String, ParseError> {
    let rest = data.get(*offset..).ok_or(ParseError::Truncated(*offset))?;
    let len = rest
        .iter()
        .position(|c| *c == 0)
        .ok_or(ParseError::Truncated(data.len()))?;
    let value = std::str::from_utf8(&rest[..len])?.to_string();
    *offset += len + 1;

    Ok(value)
}

/// Get the [u8] at index `offset` from `data`.
///
/// Mutates `offset` to the index after the byte.
pub fn get_u8(data: &[u8], offset: &mut usize) -> Result<u8, ParseError> {
    Ok(take(data, offset, 1)?[0])
}

/// Get 2 little-endian bytes (as an [i16]) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_i16(data: &[u8], offset: &mut usize) -> Result<i16, ParseError> {
    Ok(LittleEndian::read_i16(take(data, offset, 2)?))
}

/// Get 4 little-endian bytes (as an [i32]) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_i32(data: &[u8], offset: &mut usize) -> Result<i32, ParseError> {
    Ok(LittleEndian::read_i32(take(data, offset, 4)?))
}

/// Get 4 little-endian bytes (as an [f32]) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_f32(data: &[u8], offset: &mut usize) -> Result<f32, ParseError> {
    Ok(LittleEndian::read_f32(take(data, offset, 4)?))
}
