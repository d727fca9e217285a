//! Queries a server the way the multiplayer screen does and prints what it answers.
use std::{
    env,
    net::SocketAddr,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, bail};
use minerva::connection::Connection;
use net::{
    HandshakeC2s, HandshakeNextState, PacketEncoder, StatusPingC2s, StatusPongS2c,
    StatusRequestC2s, StatusResponseS2c,
};
use tokio::{net::TcpStream, time::timeout};

const DEFAULT_TARGET: &str = "127.0.0.1:25565";
const PROTOCOL_VERSION: u32 = 770;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let target = env::args().nth(1).unwrap_or_else(|| DEFAULT_TARGET.to_string());
    let address: SocketAddr = target
        .parse()
        .with_context(|| format!("invalid address '{target}'"))?;

    let stream = timeout(Duration::from_secs(5), TcpStream::connect(address))
        .await
        .context("connect timed out")??;
    let mut conn = Connection::new(stream, address);

    let host = address.ip().to_string();
    let mut enc = PacketEncoder::new();
    enc.write_packet(&HandshakeC2s {
        protocol_version: PROTOCOL_VERSION,
        server_address: &host,
        server_port: address.port().to_be_bytes(),
        next_state: HandshakeNextState::Status,
    })?;
    enc.write_packet(&StatusRequestC2s)?;
    conn.send_raw(&enc.take()).await?;

    let frame = conn.recv_frame().await?;
    let response: StatusResponseS2c = frame.parse()?;
    let json: serde_json::Value = serde_json::from_str(response.json)?;
    println!("{}", serde_json::to_string_pretty(&json)?);

    let stamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64;
    let payload = stamp.to_be_bytes();
    enc.write_packet(&StatusPingC2s { payload: &payload })?;
    let sent = Instant::now();
    conn.send_raw(&enc.take()).await?;

    let frame = conn.recv_frame().await?;
    let pong: StatusPongS2c = frame.parse()?;
    if pong.payload != payload {
        bail!("pong payload does not match ping");
    }
    println!("latency: {}ms", sent.elapsed().as_millis());
    Ok(())
}
