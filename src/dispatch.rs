use std::{net::SocketAddr, sync::Arc};

use net::{ConnectionState, LoginStartC2s, PacketFrame, StatusPingC2s, StatusRequestC2s};

use crate::{
    config::ServerConfig,
    error::ConnectionError,
    handler::{handshake, login, status},
    logging::MinervaLogger,
    metrics::ServerMetrics,
    packet::OwnedHandshake,
    state::{PlayerSlot, ServerState},
};

/// Per-connection protocol state, owned by the connection task.
#[derive(Debug)]
pub struct Session {
    pub addr: SocketAddr,
    state: ConnectionState,
    pub(crate) handshake: Option<OwnedHandshake>,
    pub(crate) player: Option<PlayerSlot>,
}

/// Process-wide context handed to every handler.
pub struct Shared<'a> {
    pub config: &'a ServerConfig,
    pub state: &'a Arc<ServerState>,
    pub metrics: &'a ServerMetrics,
}

/// What a handler wants written back to the client.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Silent,
    Send(Vec<u8>),
}

pub type Handler = fn(&mut Session, &Shared<'_>, &PacketFrame) -> Result<Reply, ConnectionError>;

pub enum Dispatch {
    Handle(Handler),
    Ignore,
}

impl Dispatch {
    /// Every id is a handshake attempt until the handshake succeeds; afterwards
    /// only the ids known to the current state are handled.
    pub fn route(state: ConnectionState, id: u8) -> Self {
        match (state, id) {
            (ConnectionState::Handshake, _) => Self::Handle(handshake::handle),
            (ConnectionState::Status, StatusRequestC2s::ID) => Self::Handle(status::handle_request),
            (ConnectionState::Status, StatusPingC2s::ID) => Self::Handle(status::handle_ping),
            (ConnectionState::Login, LoginStartC2s::ID) => Self::Handle(login::handle_start),
            _ => Self::Ignore,
        }
    }
}

impl Session {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            state: ConnectionState::Handshake,
            handshake: None,
            player: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Protocol version from the handshake, zero before it.
    pub fn protocol_version(&self) -> u32 {
        self.handshake
            .as_ref()
            .map_or(0, |hs| hs.protocol_version)
    }

    pub fn handshake(&self) -> Option<&OwnedHandshake> {
        self.handshake.as_ref()
    }

    pub(crate) fn transition(&mut self, next: ConnectionState) {
        let old = self.state;
        self.state = next;
        MinervaLogger::state_change(&self.addr, old, next);
    }

    pub fn dispatch(
        &mut self,
        shared: &Shared<'_>,
        frame: &PacketFrame,
    ) -> Result<Reply, ConnectionError> {
        match Dispatch::route(self.state, frame.id()) {
            Dispatch::Handle(handler) => handler(self, shared, frame),
            Dispatch::Ignore => {
                MinervaLogger::packet_ignored(&self.addr, self.state, frame.id());
                Ok(Reply::Silent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use net::{
        HandshakeC2s, HandshakeNextState, PacketEncoder, ProtoError, Uuid, decode_frame,
        encode_raw_packet,
    };

    use super::*;
    use crate::telemetry::get_meter;

    struct Fixture {
        config: ServerConfig,
        state: Arc<ServerState>,
        metrics: ServerMetrics,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                config: ServerConfig::default(),
                state: Arc::new(ServerState::new()),
                metrics: ServerMetrics::new(&get_meter()),
            }
        }

        fn shared(&self) -> Shared<'_> {
            Shared {
                config: &self.config,
                state: &self.state,
                metrics: &self.metrics,
            }
        }
    }

    fn session() -> Session {
        Session::new("127.0.0.1:40000".parse().unwrap())
    }

    fn frame_of(wire: &[u8]) -> PacketFrame {
        decode_frame(wire).unwrap().unwrap().0
    }

    fn handshake(next_state: HandshakeNextState) -> PacketFrame {
        let mut enc = PacketEncoder::new();
        enc.write_packet(&HandshakeC2s {
            protocol_version: 770,
            server_address: "localhost",
            server_port: [0x63, 0xDD],
            next_state,
        })
        .unwrap();
        frame_of(&enc.take())
    }

    fn raw(id: u8, body: &[u8]) -> PacketFrame {
        let mut wire = Vec::new();
        encode_raw_packet(&mut wire, id, body).unwrap();
        frame_of(&wire)
    }

    #[test]
    fn handshake_selects_next_state() {
        let fixture = Fixture::new();
        for (next, expected) in [
            (HandshakeNextState::Status, ConnectionState::Status),
            (HandshakeNextState::Login, ConnectionState::Login),
            (HandshakeNextState::Transfer, ConnectionState::Transfer),
        ] {
            let mut session = session();
            let reply = session.dispatch(&fixture.shared(), &handshake(next)).unwrap();
            assert_eq!(reply, Reply::Silent);
            assert_eq!(session.state(), expected);
            assert_eq!(session.protocol_version(), 770);
            assert_eq!(
                session.handshake().map(|hs| hs.server_port),
                Some(25565)
            );
        }
    }

    #[test]
    fn login_start_during_handshake_is_parse_error() {
        let fixture = Fixture::new();
        let mut enc = PacketEncoder::new();
        enc.write_packet(&LoginStartC2s {
            username: "Notch",
            uuid: Uuid::from_u128(1),
        })
        .unwrap();

        let mut session = session();
        let err = session
            .dispatch(&fixture.shared(), &frame_of(&enc.take()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConnectionError::Protocol(ProtoError::PacketParse {
                packet: "handshake",
                ..
            })
        ));
        assert_eq!(session.state(), ConnectionState::Handshake);
    }

    #[test]
    fn unknown_ids_are_ignored_after_handshake() {
        let fixture = Fixture::new();
        for next in [
            HandshakeNextState::Status,
            HandshakeNextState::Login,
            HandshakeNextState::Transfer,
        ] {
            let mut session = session();
            session.dispatch(&fixture.shared(), &handshake(next)).unwrap();
            let state = session.state();

            for id in [0x02, 0x10, 0x7f] {
                let reply = session.dispatch(&fixture.shared(), &raw(id, &[1, 2, 3])).unwrap();
                assert_eq!(reply, Reply::Silent);
                assert_eq!(session.state(), state);
            }
        }
    }

    #[test]
    fn high_ids_are_single_bytes() {
        let fixture = Fixture::new();
        let mut session = session();
        session
            .dispatch(&fixture.shared(), &handshake(HandshakeNextState::Status))
            .unwrap();

        // 0x80 is a continuation byte as a varint; here it is just an unknown id
        for payload in [&[0x80, 0x00][..], &[0x80][..], &[0xff, 0x00, 0x01][..]] {
            let mut wire = vec![payload.len() as u8];
            wire.extend_from_slice(payload);
            let frame = frame_of(&wire);
            assert_eq!(frame.id(), payload[0]);

            let reply = session.dispatch(&fixture.shared(), &frame).unwrap();
            assert_eq!(reply, Reply::Silent);
            assert_eq!(session.state(), ConnectionState::Status);
        }
    }

    #[test]
    fn transfer_handles_nothing() {
        for id in [0x00, 0x01] {
            assert!(matches!(
                Dispatch::route(ConnectionState::Transfer, id),
                Dispatch::Ignore
            ));
        }
        assert!(matches!(
            Dispatch::route(ConnectionState::Login, 0x01),
            Dispatch::Ignore
        ));
    }

    #[test]
    fn state_never_moves_back() {
        let fixture = Fixture::new();
        let mut session = session();
        session
            .dispatch(&fixture.shared(), &handshake(HandshakeNextState::Status))
            .unwrap();

        // A second handshake is a status request with a body and fails
        let err = session
            .dispatch(&fixture.shared(), &handshake(HandshakeNextState::Login))
            .unwrap_err();
        assert!(matches!(err, ConnectionError::Protocol(_)));
        assert_eq!(session.state(), ConnectionState::Status);
    }
}
