use std::fmt::Display;

use bytes::{Buf, Bytes, BytesMut};

use super::{
    error::{ProtoError, Result, debug_log_error},
    io::read_u8,
    varint::{decode_varint, write_varint},
};

/// Maximum packet length in bytes (protocol limit).
pub const MAX_PACKET_SIZE: usize = 2_097_152;

/// UUID stored as 16 raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uuid([u8; 16]);

impl Uuid {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    #[must_use]
    pub const fn as_u128(&self) -> u128 {
        u128::from_be_bytes(self.0)
    }
}

impl Display for Uuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v = self.as_u128();
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF,
        )
    }
}

/// Clientbound or serverbound packet body encoding.
pub trait PacketEncode {
    const ID: u8;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()>;
}

/// Clientbound or serverbound packet body decoding.
pub trait PacketDecode<'a>: Sized {
    const ID: u8;
    /// Human readable name used in parse errors.
    const NAME: &'static str;

    fn decode_body(input: &mut &'a [u8]) -> Result<Self>;
}

/// One length-delimited packet as it arrived on the wire, minus the length prefix.
///
/// The raw payload (id + body) is kept intact so it can be echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketFrame {
    id: u8,
    payload: Bytes,
}

impl PacketFrame {
    /// The first payload byte is the packet id.
    pub fn from_payload(payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        let id = read_u8(&mut &payload[..])?;
        Ok(Self { id, payload })
    }

    #[must_use]
    pub const fn id(&self) -> u8 {
        self.id
    }

    /// Packet id followed by the body.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Bytes after the packet id.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.payload[1..]
    }

    pub fn decode<'a, P: PacketDecode<'a>>(&'a self) -> Result<P> {
        if self.id != P::ID {
            return Err(ProtoError::UnexpectedPacketId {
                expected: P::ID,
                actual: self.id,
            });
        }
        let mut input = self.body();
        let packet = P::decode_body(&mut input)?;
        if !input.is_empty() {
            return Err(ProtoError::TrailingBytes(input.len()));
        }
        Ok(packet)
    }

    /// Like [`PacketFrame::decode`], but any failure is reported as a parse
    /// failure of `P` with the field-level cause attached.
    pub fn parse<'a, P: PacketDecode<'a>>(&'a self) -> Result<P> {
        self.decode::<P>().map_err(ProtoError::parse(P::NAME))
    }

    /// Re-frames the payload unchanged: `VarInt(len) || payload`.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        encode_frame(out, &self.payload)
    }
}

/// Reads the length prefix at the front of `data`.
///
/// Returns `(payload_len, prefix_len)` once the prefix is complete.
fn frame_header(data: &[u8]) -> Result<Option<(usize, usize)>> {
    let Some((packet_len, len_len)) = decode_varint(data)? else {
        return Ok(None);
    };

    let packet_len = packet_len as usize;
    if packet_len > MAX_PACKET_SIZE {
        return Err(ProtoError::PacketTooLarge { len: packet_len });
    }

    Ok(Some((packet_len, len_len)))
}

/// Decodes one complete frame from the front of `input`.
///
/// Returns the frame and the number of bytes consumed (prefix included), or
/// `None` if `input` does not yet hold a whole frame.
pub fn decode_frame(input: &[u8]) -> Result<Option<(PacketFrame, usize)>> {
    let Some((packet_len, len_len)) = frame_header(input)? else {
        return Ok(None);
    };
    let total_len = len_len + packet_len;
    if input.len() < total_len {
        return Ok(None);
    }

    let payload = Bytes::copy_from_slice(&input[len_len..total_len]);
    Ok(Some((PacketFrame::from_payload(payload)?, total_len)))
}

/// Packet decoder for length-prefixed frames arriving in arbitrary chunks.
#[derive(Debug, Default)]
pub struct PacketDecoder {
    buf: BytesMut,
}

impl PacketDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    pub fn queue_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Spare capacity that socket reads append into.
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    pub fn reserve(&mut self, additional: usize) {
        self.buf.reserve(additional);
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    pub fn try_next_packet(&mut self) -> Result<Option<PacketFrame>> {
        let (packet_len, len_len) = match frame_header(&self.buf) {
            Ok(Some(header)) => header,
            Ok(None) => return Ok(None),
            Err(err) => {
                debug_log_error("packet length decode failed", &err);
                return Err(err);
            }
        };

        if self.buf.len() < len_len + packet_len {
            return Ok(None);
        }

        self.buf.advance(len_len);
        let payload = self.buf.split_to(packet_len).freeze();
        match PacketFrame::from_payload(payload) {
            Ok(frame) => Ok(Some(frame)),
            Err(err) => {
                debug_log_error("packet id decode failed", &err);
                Err(err)
            }
        }
    }
}

/// Packet encoder for length-prefixed frames.
#[derive(Debug, Default)]
pub struct PacketEncoder {
    buf: Vec<u8>,
    scratch: Vec<u8>,
}

impl PacketEncoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            scratch: Vec::new(),
        }
    }

    pub fn write_packet<P: PacketEncode>(&mut self, pkt: &P) -> Result<()> {
        self.scratch.clear();
        pkt.encode_body(&mut self.scratch)?;
        encode_raw_packet(&mut self.buf, P::ID, &self.scratch)
    }

    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

pub fn encode_packet<P: PacketEncode>(out: &mut Vec<u8>, pkt: &P) -> Result<()> {
    let mut body = Vec::new();
    pkt.encode_body(&mut body)?;
    encode_raw_packet(out, P::ID, &body)
}

pub fn encode_raw_packet(out: &mut Vec<u8>, id: u8, body: &[u8]) -> Result<()> {
    let packet_len = 1 + body.len();
    if packet_len > MAX_PACKET_SIZE {
        return Err(ProtoError::PacketTooLarge { len: packet_len });
    }

    write_varint(out, packet_len as u32);
    out.push(id);
    out.extend_from_slice(body);
    Ok(())
}

/// Writes `VarInt(payload.len()) || payload`.
pub fn encode_frame(out: &mut Vec<u8>, payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_PACKET_SIZE {
        return Err(ProtoError::PacketTooLarge { len: payload.len() });
    }

    write_varint(out, payload.len() as u32);
    out.extend_from_slice(payload);
    Ok(())
}
