use super::{
    Uuid,
    error::{ProtoError, Result},
    varint::{read_varint, write_varint},
};

#[inline]
pub(crate) fn take<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    if input.len() < len {
        return Err(ProtoError::UnexpectedEof);
    }

    let (head, tail) = input.split_at(len);
    *input = tail;
    Ok(head)
}

#[inline]
pub(crate) fn read_u8(input: &mut &[u8]) -> Result<u8> {
    Ok(take(input, 1)?[0])
}

/// Reads `N` bytes verbatim, without interpreting them.
#[inline]
pub(crate) fn read_array<const N: usize>(input: &mut &[u8]) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(take(input, N)?);
    Ok(bytes)
}

/// Consumes everything left in `input` as a 16 byte identifier.
pub(crate) fn read_uuid_exact(input: &mut &[u8]) -> Result<Uuid> {
    if input.len() != 16 {
        return Err(ProtoError::InvalidUuidLength(input.len()));
    }
    Ok(Uuid::from_bytes(read_array::<16>(input)?))
}

#[inline]
pub(crate) fn write_uuid(out: &mut Vec<u8>, value: &Uuid) {
    out.extend_from_slice(value.as_bytes());
}

/// Length-prefixed UTF-8 string. The declared length is checked against the
/// bytes left before anything is sliced.
pub(crate) fn read_string<'a>(input: &mut &'a [u8]) -> Result<&'a str> {
    let byte_len = read_varint(input)? as usize;
    if byte_len > input.len() {
        return Err(ProtoError::StringTooLong {
            declared: byte_len,
            remaining: input.len(),
        });
    }

    let bytes = take(input, byte_len)?;
    std::str::from_utf8(bytes).map_err(|_| ProtoError::InvalidUtf8)
}

pub(crate) fn read_string_bounded<'a>(input: &mut &'a [u8], max_chars: usize) -> Result<&'a str> {
    let s = read_string(input)?;
    check_chars(s, max_chars)?;
    Ok(s)
}

fn check_chars(value: &str, max_chars: usize) -> Result<()> {
    let char_count = value.encode_utf16().count();
    if char_count > max_chars {
        return Err(ProtoError::StringTooManyChars {
            max: max_chars,
            actual: char_count,
        });
    }
    Ok(())
}

pub(crate) fn write_string(out: &mut Vec<u8>, value: &str) -> Result<()> {
    let len = u32::try_from(value.len()).map_err(|_| ProtoError::PacketTooLarge {
        len: value.len(),
    })?;
    write_varint(out, len);
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

pub(crate) fn write_string_bounded(out: &mut Vec<u8>, value: &str, max_chars: usize) -> Result<()> {
    check_chars(value, max_chars)?;
    write_string(out, value)
}
