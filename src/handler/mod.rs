//! Per-state packet handlers. Each one matches [`crate::dispatch::Handler`].
pub mod handshake;
pub mod login;
pub mod status;
