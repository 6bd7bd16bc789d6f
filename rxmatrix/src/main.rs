use std::sync::Arc;

use clap::{Parser, Subcommand};
use futures::future::join_all;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rxmatrix::api::{create_router, AppState};
use rxmatrix::client::{
    ApiConfig, InteractionClient, MatrixApiClient, NormalizationClient, SuggestionSource,
};
use rxmatrix::config::Config;
use rxmatrix::session::Session;

#[derive(Parser)]
#[command(name = "rxmatrix")]
#[command(about = "Pairwise drug, supplement and food interaction matrix")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the lookup gateway serving /api/normalize and /api/interactions
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// RxNav REST base URL
        #[arg(long)]
        rxnav_base_url: Option<String>,
    },
    /// Resolve each term, then print the interaction matrix for the selection
    Check {
        #[arg(required = true)]
        terms: Vec<String>,
        /// Base URL of a running gateway
        #[arg(long)]
        api_base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rxmatrix=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();

    match args.command {
        Command::Serve {
            host,
            port,
            rxnav_base_url,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(url) = rxnav_base_url {
                config.gateway.rxnav_base_url = url;
            }
            serve(config).await
        }
        Command::Check {
            terms,
            api_base_url,
        } => {
            if let Some(url) = api_base_url {
                config.client.api_base_url = url;
            }
            check(config, terms).await
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(
        "Using RxNav at {} (cache size {})",
        config.gateway.rxnav_base_url,
        config.gateway.cache_size
    );

    let state = AppState::new(config)?;
    let app = create_router(state);

    tracing::info!("rxmatrix gateway starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn check(config: Config, terms: Vec<String>) -> anyhow::Result<()> {
    let api = MatrixApiClient::new(ApiConfig::from(&config.client))?;
    let normalizer = Arc::new(
        NormalizationClient::new(api.clone()).with_max_results(config.client.max_suggestions),
    );
    let lookup = Arc::new(InteractionClient::new(api));

    let resolved = join_all(terms.iter().map(|term| {
        let normalizer = Arc::clone(&normalizer);
        async move { normalizer.normalize(term).await }
    }))
    .await;

    let mut session = Session::new(normalizer, lookup, &config.client);
    for (term, suggestions) in terms.iter().zip(resolved) {
        match suggestions.into_iter().next() {
            Some(item) => {
                tracing::info!("'{}' resolved to {} ({})", term, item.display, item.id);
                session.item_chosen(item);
            }
            None => tracing::warn!("No match for '{}', skipping", term),
        }
    }

    if session.selection().len() < 2 {
        anyhow::bail!("Need at least two resolved items to build a matrix");
    }

    session.settle().await;

    println!("{}", session.matrix().render_text());
    for pair in session.pairs() {
        if let Some(detail) = session.cell_clicked(&pair.key) {
            println!();
            println!("{}", detail.render_text());
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping gateway...");
}
