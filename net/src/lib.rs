//! Minimal Minecraft protocol types for handshake, status, and login start.
pub mod mc;

pub use mc::{
    ConnectionState, HandshakeC2s, HandshakeNextState, LoginStartC2s, MAX_PACKET_SIZE,
    PacketDecode, PacketDecoder, PacketEncode, PacketEncoder, PacketFrame, ProtoError,
    StatusPingC2s, StatusPongS2c, StatusRequestC2s, StatusResponseS2c, Uuid, decode_frame,
    decode_varint, encode_frame, encode_packet, encode_raw_packet, encode_varint, write_varint,
};
