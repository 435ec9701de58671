use anyhow::{anyhow, Result};
use dnsbot::{discord, CommandHandler, Config, DynResolver, Shared, StatsReporter, UpstreamResolver};
use is_terminal::IsTerminal;
use serenity::http::Http;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("dnsbot".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;

    let http = Http::new(&config.discord_token);
    let identity = discord::identity(&http).await?;
    tracing::info!("running as {} ({})", identity.name, identity.id);

    tracing::info!(
        "resolving with {} over {:?}",
        config.upstream.addr,
        config.upstream.transport
    );
    let resolver: DynResolver = Arc::new(UpstreamResolver::new(config.upstream.clone()));
    let handler = CommandHandler::new(identity.clone(), config.command_prefix.clone(), resolver)
        .with_url(config.upstream.url.clone());
    tracing::info!("syntax: {}", handler.syntax());

    let mut client = discord::client(&config.discord_token, handler).await?;

    let stats_stop = config.stats.as_ref().map(|stats| {
        let (stop_tx, stop_rx) = oneshot::channel();
        let reporter = StatsReporter::new(stats, identity.id, client.http.clone());
        tokio::spawn(reporter.run(stop_rx));
        stop_tx
    });

    let shard_manager = client.shard_manager.clone();
    let result = tokio::select! {
        () = shutdown_signal() => {
            tracing::info!("quitting from signal");
            Ok(())
        },
        res = client.start() => res,
    };

    if let Some(stop) = stats_stop {
        // The reporter may already be gone; nothing to stop then.
        let _ = stop.send(());
    }
    shard_manager.shutdown_all().await;
    result?;
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dnsbot=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<Shared> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("could not listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("could not listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
