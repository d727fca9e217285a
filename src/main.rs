use std::{env, error::Error};

use minerva::{
    Minerva, ServerConfig, logging::MinervaLogger, telemetry::oltp::init_meter, utils::leak,
};
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();
    #[cfg(debug_assertions)]
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .init();
    #[cfg(not(debug_assertions))]
    env_logger::init();

    let provider = if dotenvy::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        match init_meter() {
            Ok(provider) => Some(provider),
            Err(err) => {
                log::error!("Metrics disabled: {err}");
                None
            }
        }
    } else {
        None
    };

    let config_file = env::current_dir()?.join("settings.toml");
    let mut config = ServerConfig::load_or_default(&config_file)?;
    config.report_unknown_fields();
    config.apply_env();

    let stop = leak(broadcast::channel(1).0);
    let minerva = leak(Minerva::new(config, stop));
    let mut server = tokio::spawn(async move {
        if let Err(e) = minerva.start().await {
            log::error!("{e}");
        }
    });
    {
        use futures::future::{FutureExt, select_all};
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        let sigint_fut = sigint.recv().boxed();
        let sigterm_fut = sigterm.recv().boxed();

        let signalled = tokio::select! {
            _ = select_all([sigint_fut, sigterm_fut]) => true,
            _ = &mut server => false,
        };
        if signalled {
            MinervaLogger::shutting_down();
            // Nobody subscribed means the listener is already gone
            let _ = stop.send(());
            let _ = server.await;
        }
    }

    if let Some(provider) = provider {
        provider.shutdown()?;
    }
    Ok(())
}
