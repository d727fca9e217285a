use std::{io, io::ErrorKind, net::SocketAddr};

use net::{PacketDecoder, PacketFrame};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ConnectionError;

const MAX_CHUNK_SIZE: usize = 1024;

/// A client byte stream plus the frame buffer that accumulates reads from it.
pub struct Connection<S> {
    pub address: SocketAddr,
    stream: S,
    dec: PacketDecoder,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, address: SocketAddr) -> Self {
        Self {
            address,
            stream,
            dec: PacketDecoder::new(),
        }
    }

    /// Next complete frame. Bytes past it stay buffered for the following call.
    pub async fn recv_frame(&mut self) -> Result<PacketFrame, ConnectionError> {
        loop {
            if let Some(frame) = self.dec.try_next_packet()? {
                return Ok(frame);
            }

            self.dec.reserve(MAX_CHUNK_SIZE);
            let read = self
                .stream
                .read_buf(self.dec.buffer_mut())
                .await
                .map_err(ConnectionError::FrameRead)?;

            if read == 0 {
                return Err(ConnectionError::FrameRead(io::Error::from(
                    ErrorKind::UnexpectedEof,
                )));
            }
        }
    }

    pub async fn send_raw(&mut self, pkt: &[u8]) -> Result<(), ConnectionError> {
        self.stream
            .write_all(pkt)
            .await
            .map_err(ConnectionError::Write)?;
        self.stream.flush().await.map_err(ConnectionError::Write)
    }
}

#[cfg(test)]
mod tests {
    use net::{ProtoError, encode_raw_packet};
    use tokio::io::duplex;

    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:25565".parse().unwrap()
    }

    #[tokio::test]
    async fn frames_split_across_writes() {
        let (client, server) = duplex(64);
        let mut conn = Connection::new(server, addr());

        let mut wire = Vec::new();
        encode_raw_packet(&mut wire, 0x01, &[9, 8, 7, 6]).unwrap();

        let writer = tokio::spawn(async move {
            let mut client = client;
            for byte in wire {
                client.write_all(&[byte]).await.unwrap();
                client.flush().await.unwrap();
            }
            client
        });

        let frame = conn.recv_frame().await.unwrap();
        assert_eq!(frame.id(), 0x01);
        assert_eq!(frame.body(), [9, 8, 7, 6]);
        drop(writer.await.unwrap());
    }

    #[tokio::test]
    async fn coalesced_frames_are_returned_in_order() {
        let (mut client, server) = duplex(64);
        let mut conn = Connection::new(server, addr());

        let mut wire = Vec::new();
        encode_raw_packet(&mut wire, 0x00, &[]).unwrap();
        encode_raw_packet(&mut wire, 0x01, &[1, 2]).unwrap();
        client.write_all(&wire).await.unwrap();

        assert_eq!(conn.recv_frame().await.unwrap().id(), 0x00);
        assert_eq!(conn.recv_frame().await.unwrap().body(), [1, 2]);
    }

    #[tokio::test]
    async fn closed_stream_is_eof() {
        let (mut client, server) = duplex(64);
        let mut conn = Connection::new(server, addr());
        client.write_all(&[0x05, 0x00]).await.unwrap();
        drop(client);

        let err = conn.recv_frame().await.unwrap_err();
        assert!(
            matches!(err, ConnectionError::FrameRead(ref e) if e.kind() == ErrorKind::UnexpectedEof)
        );
    }

    #[tokio::test]
    async fn malformed_length_is_a_protocol_error() {
        let (mut client, server) = duplex(64);
        let mut conn = Connection::new(server, addr());
        client
            .write_all(&[0xff, 0xff, 0xff, 0xff, 0xff, 0x01])
            .await
            .unwrap();

        let err = conn.recv_frame().await.unwrap_err();
        assert!(matches!(
            err,
            ConnectionError::Protocol(ProtoError::VarIntOverflow)
        ));
    }

    #[tokio::test]
    async fn send_raw_writes_everything() {
        let (mut client, server) = duplex(64);
        let mut conn = Connection::new(server, addr());
        conn.send_raw(&[0x02, 0x00, 0x2a]).await.unwrap();

        let mut buf = [0u8; 3];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [0x02, 0x00, 0x2a]);
    }
}
