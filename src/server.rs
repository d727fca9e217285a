use std::{net::SocketAddr, sync::Arc, time::Instant};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
    sync::broadcast,
    time::timeout,
};

use crate::{
    config::ServerConfig,
    connection::Connection,
    dispatch::{Reply, Session, Shared},
    error::ConnectionError,
    logging::MinervaLogger,
    metrics::ServerMetrics,
    state::ServerState,
    telemetry::get_meter,
};

pub struct Minerva {
    config: ServerConfig,
    state: Arc<ServerState>,
    metrics: ServerMetrics,
    stop: &'static broadcast::Sender<()>,
}

impl Minerva {
    pub fn new(config: ServerConfig, stop: &'static broadcast::Sender<()>) -> Minerva {
        Minerva {
            config,
            state: Arc::new(ServerState::new()),
            metrics: ServerMetrics::new(&get_meter()),
            stop,
        }
    }

    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    fn shared(&self) -> Shared<'_> {
        Shared {
            config: &self.config,
            state: &self.state,
            metrics: &self.metrics,
        }
    }

    /// Binds the configured address and serves until a stop signal.
    pub async fn start(&'static self) -> anyhow::Result<()> {
        let listener_cfg = self.config.bind.to_owned();
        MinervaLogger::preparing_socket(&listener_cfg);
        let address = self.config.bind_addr()?;
        let listener = TcpListener::bind(address).await?;
        self.serve(listener).await
    }

    pub async fn serve(&'static self, listener: TcpListener) -> anyhow::Result<()> {
        MinervaLogger::listening(&listener.local_addr()?);
        let mut stop = self.stop.subscribe();

        loop {
            let (client, addr) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        MinervaLogger::accept_failed(&err);
                        continue;
                    }
                },
                _ = stop.recv() => break,
            };

            if dotenvy::var("NO_NODELAY").is_err() {
                if let Err(e) = client.set_nodelay(true) {
                    MinervaLogger::tcp_nodelay_failed(&e);
                }
            }

            let server = self;
            tokio::spawn(async move {
                server
                    .handle_connection(Connection::new(client, addr))
                    .await;
            });
        }
        Ok(())
    }

    /// Runs one client until it disconnects or misbehaves. Errors end here.
    pub async fn handle_connection<S>(&self, connection: Connection<S>)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let addr = connection.address;
        MinervaLogger::new_connection(&addr);
        self.metrics.record_open();

        let mut session = Session::new(addr);
        if let Err(err) = self.drive(connection, &mut session).await {
            let state = session.state();
            if session.handshake().is_none() {
                self.metrics.record_failure(state.as_str());
            }
            Self::log_close(&addr, &err);
        }
        // Dropping the session releases its player slot
    }

    async fn drive<S>(
        &self,
        mut connection: Connection<S>,
        session: &mut Session,
    ) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let shared = self.shared();
        let idle = self.config.idle_timeout();
        let started = Instant::now();

        loop {
            let frame = match idle {
                Some(limit) => timeout(limit, connection.recv_frame()).await??,
                None => connection.recv_frame().await?,
            };

            let was_handshaking = session.handshake().is_none();
            let reply = session.dispatch(&shared, &frame)?;

            if was_handshaking {
                if let Some(hs) = session.handshake() {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    self.metrics
                        .record_duration(elapsed_ms, session.state().as_str());
                    MinervaLogger::handshake_completed(
                        &session.addr,
                        elapsed_ms,
                        hs.protocol_version,
                        &hs.get_stripped_hostname(),
                    );
                }
            }

            if let Reply::Send(bytes) = reply {
                connection.send_raw(&bytes).await?;
            }
        }
    }

    fn log_close(addr: &SocketAddr, err: &ConnectionError) {
        if err.is_disconnect() {
            MinervaLogger::connection_closed(addr, err);
        } else {
            MinervaLogger::connection_error(addr, err);
        }
    }
}
