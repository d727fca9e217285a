use std::sync::Arc;

use net::{HandshakeC2s, HandshakeNextState, LoginStartC2s, PacketDecode, PacketEncode, Uuid};

/// Owned counterpart of a borrowed wire packet, for data that outlives the frame.
pub trait OwnedPacket<'a, P: PacketDecode<'a> + PacketEncode> {
    fn from_packet(packet: P) -> Self;
    fn as_packet(&'a self) -> P;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Owned `HandshakeC2s`
pub struct OwnedHandshake {
    pub protocol_version: u32,
    pub server_address: Arc<str>,
    pub server_port: u16,
    pub next_state: HandshakeNextState,
}

impl OwnedHandshake {
    /// Address without Forge style `\0` markers or control characters.
    pub fn get_stripped_hostname(&self) -> Arc<str> {
        const FALLBACK: &str = "unknown-host";
        let ptr = self
            .server_address
            .split('\0')
            .next()
            .unwrap_or_default();
        let sanitized: String = ptr
            .chars()
            .filter(|c| c.is_ascii() && !c.is_ascii_control())
            .collect();
        if sanitized.is_empty() {
            Arc::from(FALLBACK)
        } else {
            Arc::from(sanitized)
        }
    }
}

impl<'a> OwnedPacket<'a, HandshakeC2s<'a>> for OwnedHandshake {
    fn from_packet(hs: HandshakeC2s<'a>) -> Self {
        Self {
            protocol_version: hs.protocol_version,
            server_address: Arc::from(hs.server_address),
            server_port: hs.port(),
            next_state: hs.next_state,
        }
    }

    fn as_packet(&'a self) -> HandshakeC2s<'a> {
        HandshakeC2s {
            protocol_version: self.protocol_version,
            server_address: &self.server_address,
            server_port: self.server_port.to_be_bytes(),
            next_state: self.next_state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Owned `LoginStartC2s`
pub struct OwnedLoginStart {
    pub username: String,
    pub uuid: Uuid,
}

impl<'a> OwnedPacket<'a, LoginStartC2s<'a>> for OwnedLoginStart {
    fn from_packet(packet: LoginStartC2s<'a>) -> Self {
        Self {
            username: packet.username.to_string(),
            uuid: packet.uuid,
        }
    }

    fn as_packet(&'a self) -> LoginStartC2s<'a> {
        LoginStartC2s {
            username: &self.username,
            uuid: self.uuid,
        }
    }
}

#[cfg(test)]
mod tests {
    use net::PacketEncoder;

    use super::*;

    fn handshake_with_addr(addr: &str) -> OwnedHandshake {
        OwnedHandshake {
            protocol_version: 770,
            server_address: Arc::from(addr),
            server_port: 25565,
            next_state: HandshakeNextState::Login,
        }
    }

    #[test]
    fn stripped_hostname_stops_at_first_nul() {
        let hs = handshake_with_addr("example.com\0FML2\0");
        assert_eq!(hs.get_stripped_hostname().as_ref(), "example.com");

        let hs = handshake_with_addr("example.com\0FORGE\0");
        assert_eq!(hs.get_stripped_hostname().as_ref(), "example.com");
    }

    #[test]
    fn stripped_hostname_falls_back_on_empty() {
        let hs = handshake_with_addr("\0FML2\0");
        assert_eq!(hs.get_stripped_hostname().as_ref(), "unknown-host");
    }

    #[test]
    fn owned_handshake_reencodes_identically() {
        let hs = handshake_with_addr("mc.example.org");
        let mut a = PacketEncoder::new();
        a.write_packet(&hs.as_packet()).unwrap();

        let borrowed = hs.as_packet();
        let copy = OwnedHandshake::from_packet(borrowed);
        assert_eq!(copy, hs);

        let mut b = PacketEncoder::new();
        b.write_packet(&copy.as_packet()).unwrap();
        assert_eq!(a.take(), b.take());
    }

    #[test]
    fn owned_login_start_keeps_identity() {
        let uuid = Uuid::from_u128(42);
        let login = OwnedLoginStart::from_packet(LoginStartC2s {
            username: "Steve",
            uuid,
        });
        assert_eq!(login.username, "Steve");
        assert_eq!(login.as_packet().uuid, uuid);
    }
}
