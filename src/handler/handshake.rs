use net::{ConnectionState, HandshakeC2s, PacketFrame};

use crate::{
    dispatch::{Reply, Session, Shared},
    error::ConnectionError,
    packet::{OwnedHandshake, OwnedPacket},
};

/// Decodes the opening packet and moves the session to the requested state.
pub fn handle(
    session: &mut Session,
    shared: &Shared<'_>,
    frame: &PacketFrame,
) -> Result<Reply, ConnectionError> {
    let handshake = OwnedHandshake::from_packet(frame.parse::<HandshakeC2s>()?);
    let next = ConnectionState::from(handshake.next_state);

    shared.metrics.record_handshake(next.as_str());
    session.handshake = Some(handshake);
    session.transition(next);
    Ok(Reply::Silent)
}
