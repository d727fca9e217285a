use super::{
    error::{ProtoError, Result},
    io::{
        read_array, read_string, read_string_bounded, read_uuid_exact, write_string,
        write_string_bounded, write_uuid,
    },
    state::HandshakeNextState,
    types::{PacketDecode, PacketEncode, Uuid},
    varint::{read_varint, write_varint},
};

const MAX_JSON_CHARS: usize = 32_767;

/// Handshake (C2S) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeC2s<'a> {
    pub protocol_version: u32,
    pub server_address: &'a str,
    /// Port as sent by the client, big-endian and uninterpreted.
    pub server_port: [u8; 2],
    pub next_state: HandshakeNextState,
}

/// Status request (C2S) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRequestC2s;

/// Status ping (C2S) packet. The payload is opaque and echoed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPingC2s<'a> {
    pub payload: &'a [u8],
}

/// Status response (S2C) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusResponseS2c<'a> {
    pub json: &'a str,
}

/// Status pong (S2C) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPongS2c<'a> {
    pub payload: &'a [u8],
}

/// Login start (C2S) packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginStartC2s<'a> {
    pub username: &'a str,
    pub uuid: Uuid,
}

impl HandshakeC2s<'_> {
    pub const ID: u8 = 0x00;

    #[must_use]
    pub const fn port(&self) -> u16 {
        u16::from_be_bytes(self.server_port)
    }
}

impl<'a> PacketDecode<'a> for HandshakeC2s<'a> {
    const ID: u8 = HandshakeC2s::ID;
    const NAME: &'static str = "handshake";

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        let protocol_version = read_varint(input)?;
        let server_address = read_string(input)?;
        let server_port = read_array::<2>(input)?;
        let next_state_raw = read_varint(input)?;
        let next_state = HandshakeNextState::from_raw(next_state_raw)
            .ok_or(ProtoError::InvalidNextState(next_state_raw))?;

        Ok(Self {
            protocol_version,
            server_address,
            server_port,
            next_state,
        })
    }
}

impl PacketEncode for HandshakeC2s<'_> {
    const ID: u8 = HandshakeC2s::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_varint(out, self.protocol_version);
        write_string(out, self.server_address)?;
        out.extend_from_slice(&self.server_port);
        write_varint(out, self.next_state.as_raw());
        Ok(())
    }
}

impl StatusRequestC2s {
    pub const ID: u8 = 0x00;
}

impl<'a> PacketDecode<'a> for StatusRequestC2s {
    const ID: u8 = StatusRequestC2s::ID;
    const NAME: &'static str = "status request";

    fn decode_body(_input: &mut &'a [u8]) -> Result<Self> {
        Ok(Self)
    }
}

impl PacketEncode for StatusRequestC2s {
    const ID: u8 = StatusRequestC2s::ID;

    fn encode_body(&self, _out: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }
}

impl StatusPingC2s<'_> {
    pub const ID: u8 = 0x01;
}

impl<'a> PacketDecode<'a> for StatusPingC2s<'a> {
    const ID: u8 = StatusPingC2s::ID;
    const NAME: &'static str = "ping";

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        let payload = std::mem::take(input);
        Ok(Self { payload })
    }
}

impl PacketEncode for StatusPingC2s<'_> {
    const ID: u8 = StatusPingC2s::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(self.payload);
        Ok(())
    }
}

impl StatusResponseS2c<'_> {
    pub const ID: u8 = 0x00;
}

impl<'a> PacketDecode<'a> for StatusResponseS2c<'a> {
    const ID: u8 = StatusResponseS2c::ID;
    const NAME: &'static str = "status response";

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        Ok(Self {
            json: read_string_bounded(input, MAX_JSON_CHARS)?,
        })
    }
}

impl PacketEncode for StatusResponseS2c<'_> {
    const ID: u8 = StatusResponseS2c::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_string_bounded(out, self.json, MAX_JSON_CHARS)
    }
}

impl StatusPongS2c<'_> {
    pub const ID: u8 = 0x01;
}

impl<'a> PacketDecode<'a> for StatusPongS2c<'a> {
    const ID: u8 = StatusPongS2c::ID;
    const NAME: &'static str = "pong";

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        let payload = std::mem::take(input);
        Ok(Self { payload })
    }
}

impl PacketEncode for StatusPongS2c<'_> {
    const ID: u8 = StatusPongS2c::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(self.payload);
        Ok(())
    }
}

impl LoginStartC2s<'_> {
    pub const ID: u8 = 0x00;
}

impl<'a> PacketDecode<'a> for LoginStartC2s<'a> {
    const ID: u8 = LoginStartC2s::ID;
    const NAME: &'static str = "login start";

    fn decode_body(input: &mut &'a [u8]) -> Result<Self> {
        let username = read_string(input)?;
        let uuid = read_uuid_exact(input)?;
        Ok(Self { username, uuid })
    }
}

impl PacketEncode for LoginStartC2s<'_> {
    const ID: u8 = LoginStartC2s::ID;

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        write_string(out, self.username)?;
        write_uuid(out, &self.uuid);
        Ok(())
    }
}
