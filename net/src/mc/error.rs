/// Protocol decode/encode error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtoError {
    #[error("varint does not fit in 32 bits")]
    VarIntOverflow,
    #[error("unexpected end of packet")]
    UnexpectedEof,
    #[error("string declares {declared} bytes but only {remaining} remain")]
    StringTooLong { declared: usize, remaining: usize },
    #[error("string exceeds {max} characters ({actual})")]
    StringTooManyChars { max: usize, actual: usize },
    #[error("string is not valid utf-8")]
    InvalidUtf8,
    #[error("packet of {len} bytes exceeds protocol limit")]
    PacketTooLarge { len: usize },
    #[error("{0} trailing bytes after packet body")]
    TrailingBytes(usize),
    #[error("expected packet id {expected:#04x}, got {actual:#04x}")]
    UnexpectedPacketId { expected: u8, actual: u8 },
    #[error("handshake requested unknown next state {0}")]
    InvalidNextState(u32),
    #[error("uuid must be 16 bytes, got {0}")]
    InvalidUuidLength(usize),
    #[error("malformed {packet} packet: {source}")]
    PacketParse {
        packet: &'static str,
        #[source]
        source: Box<ProtoError>,
    },
}

impl ProtoError {
    /// Wraps a field-level failure as a parse failure of `packet`.
    pub(crate) fn parse(packet: &'static str) -> impl FnOnce(ProtoError) -> ProtoError {
        move |source| ProtoError::PacketParse {
            packet,
            source: Box::new(source),
        }
    }

    /// Innermost cause of a parse failure.
    #[must_use]
    pub fn root_cause(&self) -> &ProtoError {
        match self {
            ProtoError::PacketParse { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtoError>;

pub(crate) fn debug_log_error(context: &str, error: &ProtoError) {
    #[cfg(debug_assertions)]
    {
        log::debug!("{}: {}", context, error);
    }
    let _ = context;
    let _ = error;
}
