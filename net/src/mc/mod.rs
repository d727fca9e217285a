//! Minimal Minecraft protocol framing for handshake, status, and login start.

mod error;
mod io;
mod packets;
mod state;
mod types;
mod varint;


pub use error::{ProtoError, Result};
pub use packets::{
    HandshakeC2s, LoginStartC2s, StatusPingC2s, StatusPongS2c, StatusRequestC2s,
    StatusResponseS2c,
};
pub use state::{ConnectionState, HandshakeNextState};
pub use types::{
    MAX_PACKET_SIZE, PacketDecode, PacketDecoder, PacketEncode, PacketEncoder, PacketFrame, Uuid,
    decode_frame, encode_frame, encode_packet, encode_raw_packet,
};
pub use varint::{MAX_VARINT_LEN, decode_varint, encode_varint, varint_len, write_varint};
