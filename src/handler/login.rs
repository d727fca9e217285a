use net::{LoginStartC2s, PacketFrame};

use crate::{
    dispatch::{Reply, Session, Shared},
    error::ConnectionError,
    logging::MinervaLogger,
    packet::{OwnedLoginStart, OwnedPacket},
    state::ServerEvent,
};

/// Records who is connecting. The client gets no reply.
pub fn handle_start(
    session: &mut Session,
    shared: &Shared<'_>,
    frame: &PacketFrame,
) -> Result<Reply, ConnectionError> {
    let login = OwnedLoginStart::from_packet(frame.parse::<LoginStartC2s>()?);

    // A repeated login start must not count the player twice
    if session.player.is_none() {
        session.player = Some(shared.state.join());
    }

    MinervaLogger::player_identified(&session.addr, &login.username, &login.uuid);
    shared.metrics.record_player();
    shared.state.publish(ServerEvent::PlayerIdentified {
        name: login.username,
        uuid: login.uuid,
        addr: session.addr,
    });
    Ok(Reply::Silent)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use net::{
        HandshakeC2s, HandshakeNextState, PacketEncoder, ProtoError, Uuid, decode_frame,
        encode_raw_packet,
    };

    use super::*;
    use crate::{
        config::ServerConfig, metrics::ServerMetrics, state::ServerState, telemetry::get_meter,
    };

    fn frame_of(wire: &[u8]) -> PacketFrame {
        decode_frame(wire).unwrap().unwrap().0
    }

    fn login_session(shared: &Shared<'_>) -> Session {
        let mut enc = PacketEncoder::new();
        enc.write_packet(&HandshakeC2s {
            protocol_version: 770,
            server_address: "localhost",
            server_port: [0x63, 0xDD],
            next_state: HandshakeNextState::Login,
        })
        .unwrap();
        let mut session = Session::new("127.0.0.1:50001".parse().unwrap());
        session.dispatch(shared, &frame_of(&enc.take())).unwrap();
        session
    }

    fn login_frame(username: &str, uuid: Uuid) -> PacketFrame {
        let mut enc = PacketEncoder::new();
        enc.write_packet(&LoginStartC2s { username, uuid }).unwrap();
        frame_of(&enc.take())
    }

    #[tokio::test]
    async fn login_start_counts_player_and_publishes() {
        let config = ServerConfig::default();
        let state = Arc::new(ServerState::new());
        let metrics = ServerMetrics::new(&get_meter());
        let shared = Shared {
            config: &config,
            state: &state,
            metrics: &metrics,
        };
        let mut events = state.subscribe();

        let mut session = login_session(&shared);
        let uuid = Uuid::from_u128(0x1234);
        let reply = session.dispatch(&shared, &login_frame("Notch", uuid)).unwrap();
        assert_eq!(reply, Reply::Silent);
        assert_eq!(state.online_players(), 1);

        // Repeats do not take a second slot
        session.dispatch(&shared, &login_frame("Notch", uuid)).unwrap();
        assert_eq!(state.online_players(), 1);

        let ServerEvent::PlayerIdentified { name, uuid: got, addr } = events.recv().await.unwrap();
        assert_eq!(name, "Notch");
        assert_eq!(got, uuid);
        assert_eq!(addr, session.addr);

        drop(session);
        assert_eq!(state.online_players(), 0);
    }

    #[test]
    fn short_uuid_is_parse_error() {
        let config = ServerConfig::default();
        let state = Arc::new(ServerState::new());
        let metrics = ServerMetrics::new(&get_meter());
        let shared = Shared {
            config: &config,
            state: &state,
            metrics: &metrics,
        };
        let mut session = login_session(&shared);

        let mut body = vec![5];
        body.extend_from_slice(b"Notch");
        body.extend_from_slice(&[0xAB; 15]);
        let mut wire = Vec::new();
        encode_raw_packet(&mut wire, LoginStartC2s::ID, &body).unwrap();

        let err = session.dispatch(&shared, &frame_of(&wire)).unwrap_err();
        let ConnectionError::Protocol(err) = err else {
            panic!("expected protocol error, got {err:?}");
        };
        assert_eq!(err.root_cause(), &ProtoError::InvalidUuidLength(15));
        assert_eq!(state.online_players(), 0);
    }
}
