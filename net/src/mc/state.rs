use std::fmt;

/// Protocol state of a single connection. Selects how packet ids are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Handshake,
    Status,
    Login,
    Transfer,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::Status => "status",
            Self::Login => "login",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Next state value in the handshake packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeNextState {
    Status = 1,
    Login = 2,
    Transfer = 3,
}

impl HandshakeNextState {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Status),
            2 => Some(Self::Login),
            3 => Some(Self::Transfer),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

impl From<HandshakeNextState> for ConnectionState {
    fn from(next: HandshakeNextState) -> Self {
        match next {
            HandshakeNextState::Status => ConnectionState::Status,
            HandshakeNextState::Login => ConnectionState::Login,
            HandshakeNextState::Transfer => ConnectionState::Transfer,
        }
    }
}
