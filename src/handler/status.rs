use std::{fs, io, path::Path};

use base64::{Engine, engine::general_purpose::STANDARD};
use net::{PacketFrame, ProtoError, StatusRequestC2s, StatusResponseS2c, encode_packet};
use serde::Serialize;

use crate::{
    config::ServerConfig,
    dispatch::{Reply, Session, Shared},
    error::ConnectionError,
    logging::MinervaLogger,
};

const FAVICON_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub version: Version,
    pub players: Players,
    pub description: Description,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    pub enforces_secure_chat: bool,
}

#[derive(Debug, Serialize)]
pub struct Version {
    pub name: String,
    pub protocol: u32,
}

#[derive(Debug, Serialize)]
pub struct Players {
    pub max: u32,
    pub online: u64,
}

#[derive(Debug, Serialize)]
pub struct Description {
    pub text: String,
}

impl StatusResponse {
    pub fn new(config: &ServerConfig, online: u64, protocol: u32) -> Self {
        Self {
            version: Version {
                name: config.version.clone(),
                protocol,
            },
            players: Players {
                max: config.max_players,
                online,
            },
            description: Description {
                text: config.motd.clone(),
            },
            favicon: None,
            enforces_secure_chat: config.enforces_secure_chat,
        }
    }
}

/// Reads `path` as a PNG data URI.
pub fn load_favicon(path: &Path) -> io::Result<String> {
    let data = fs::read(path)?;
    Ok(format!("{FAVICON_PREFIX}{}", STANDARD.encode(data)))
}

fn encode_response(response: &StatusResponse) -> Result<Vec<u8>, ConnectionError> {
    let json = serde_json::to_string(response)?;
    let mut out = Vec::with_capacity(json.len() + 8);
    encode_packet(&mut out, &StatusResponseS2c { json: &json })?;
    Ok(out)
}

pub fn handle_request(
    session: &mut Session,
    shared: &Shared<'_>,
    frame: &PacketFrame,
) -> Result<Reply, ConnectionError> {
    frame.parse::<StatusRequestC2s>()?;

    let mut response = StatusResponse::new(
        shared.config,
        shared.state.online_players(),
        session.protocol_version(),
    );
    if let Some(path) = &shared.config.favicon_path {
        match load_favicon(path) {
            Ok(favicon) => response.favicon = Some(favicon),
            Err(err) => MinervaLogger::favicon_unavailable(path, &err),
        }
    }

    let out = match encode_response(&response) {
        Err(ConnectionError::Protocol(err @ ProtoError::StringTooManyChars { .. }))
            if response.favicon.is_some() =>
        {
            if let Some(path) = &shared.config.favicon_path {
                MinervaLogger::favicon_unavailable(path, &err);
            }
            response.favicon = None;
            encode_response(&response)?
        }
        other => other?,
    };

    shared.metrics.record_status();
    MinervaLogger::status_served(&session.addr, out.len());
    Ok(Reply::Send(out))
}

/// Echoes the ping frame back unchanged.
pub fn handle_ping(
    _session: &mut Session,
    _shared: &Shared<'_>,
    frame: &PacketFrame,
) -> Result<Reply, ConnectionError> {
    let mut out = Vec::with_capacity(frame.payload().len() + 1);
    frame.encode(&mut out)?;
    Ok(Reply::Send(out))
}
