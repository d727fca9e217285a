pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod logging;
pub mod metrics;
pub mod packet;
pub mod server;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use config::ServerConfig;
pub use server::Minerva;
pub use state::{ServerEvent, ServerState};
