use super::error::{ProtoError, Result};

/// Longest encoding of a 32-bit value.
pub const MAX_VARINT_LEN: usize = 5;

/// Decodes a varint from the front of `input`.
///
/// Returns `Ok(None)` when the buffer ends before the terminating byte, so
/// stream readers can wait for more data instead of failing.
#[inline]
pub fn decode_varint(input: &[u8]) -> Result<Option<(u32, usize)>> {
    let mut value: u32 = 0;
    for i in 0..MAX_VARINT_LEN {
        let Some(&byte) = input.get(i) else {
            return Ok(None);
        };

        // The fifth group only has room for the top four bits.
        if i == MAX_VARINT_LEN - 1 && (byte & 0xf0) != 0 {
            return Err(ProtoError::VarIntOverflow);
        }

        value |= ((byte & 0x7f) as u32) << (i * 7);
        if (byte & 0x80) == 0 {
            return Ok(Some((value, i + 1)));
        }
    }

    Err(ProtoError::VarIntOverflow)
}

#[inline]
pub(crate) fn read_varint(input: &mut &[u8]) -> Result<u32> {
    let Some((value, len)) = decode_varint(input)? else {
        return Err(ProtoError::UnexpectedEof);
    };
    *input = &input[len..];
    Ok(value)
}

#[inline]
pub fn write_varint(out: &mut Vec<u8>, value: u32) {
    let mut val = value;
    loop {
        if (val & 0xffff_ff80) == 0 {
            out.push(val as u8);
            return;
        }
        out.push((val as u8 & 0x7f) | 0x80);
        val >>= 7;
    }
}

#[must_use]
pub fn encode_varint(value: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(varint_len(value));
    write_varint(&mut out, value);
    out
}

#[inline]
#[must_use]
pub fn varint_len(value: u32) -> usize {
    let mut val = value;
    let mut count = 1;
    while (val & 0xffff_ff80) != 0 {
        count += 1;
        val >>= 7;
    }
    count
}
