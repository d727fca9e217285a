use std::io;

use net::ProtoError;

/// Anything that ends a client connection. Never crosses connection boundaries.
#[derive(thiserror::Error, Debug)]
pub enum ConnectionError {
    #[error("Frame read failed - {0}")]
    FrameRead(#[source] io::Error),
    #[error("Write failed - {0}")]
    Write(#[source] io::Error),
    #[error("Idle timeout")]
    Timeout(#[from] tokio::time::error::Elapsed),
    #[error("Protocol violation - {0}")]
    Protocol(#[from] ProtoError),
    #[error("Status encoding failed - {0}")]
    Json(#[from] serde_json::Error),
}

impl ConnectionError {
    /// Peer went away or stopped talking; not worth more than a debug line.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::FrameRead(err) | Self::Write(err) => matches!(
                err.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ),
            Self::Timeout(_) => true,
            Self::Protocol(_) | Self::Json(_) => false,
        }
    }
}
