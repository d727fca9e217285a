use std::{fmt::Display, io, net::SocketAddr, path::Path};

use log::{debug, error, info, warn};
use net::{ConnectionState, Uuid};

pub struct MinervaLogger;

impl MinervaLogger {
    pub fn preparing_socket(address: &str) {
        info!("Preparing socket {}", address);
    }

    pub fn listening(address: &SocketAddr) {
        info!("Started a tcp server on {}", address);
    }

    pub fn accept_failed(err: &io::Error) {
        error!("Failed to accept connection: {err}");
    }

    pub fn tcp_nodelay_failed(err: &io::Error) {
        error!("Failed to set TCP_NODELAY: {err}");
    }

    pub fn new_connection(address: &SocketAddr) {
        info!("New connection {}", address);
    }

    pub fn state_change(addr: &SocketAddr, old: ConnectionState, new: ConnectionState) {
        debug!("State change {addr}: {old} -> {new}");
    }

    pub fn handshake_completed(addr: &SocketAddr, elapsed_ms: u64, protocol: u32, host: &str) {
        debug!(
            "Handshake from {addr} completed in {}ms (protocol {}, host '{}')",
            elapsed_ms, protocol, host
        );
    }

    pub fn packet_ignored(addr: &SocketAddr, state: ConnectionState, id: u8) {
        debug!("Ignoring packet {id:#04x} from {addr} in state {state}");
    }

    pub fn status_served(addr: &SocketAddr, bytes: usize) {
        info!("Status response to {addr} ({bytes} bytes)");
    }

    pub fn favicon_unavailable(path: &Path, err: &dyn Display) {
        warn!("Favicon {} unavailable: {err}", path.display());
    }

    pub fn player_identified(addr: &SocketAddr, name: &str, uuid: &Uuid) {
        info!("Player {name} ({uuid}) identified from {addr}");
    }

    pub fn connection_closed(addr: &SocketAddr, err: &dyn Display) {
        debug!("Connection {addr} closed: {err}");
    }

    pub fn connection_error(client: &SocketAddr, err: &dyn Display) {
        if dotenvy::var("DO_NOT_LOG_CONNECTION_ERROR").is_ok() {
            return;
        }
        warn!("connection error@{client}: {}", err);
    }

    pub fn unknown_config(key: &str, value: &dyn Display) {
        warn!("Unknown configuration '{}' with value {}", key, value);
    }

    pub fn shutting_down() {
        info!("Received signal, stopping...");
    }
}
