pub mod api;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod observability;
pub mod pipeline;

use {
    infra::{oracle, router, tribunal},
    std::{collections::HashMap, sync::Arc, time::Duration},
};

/// Builds the process's shared components from parsed CLI arguments and
/// starts serving the HTTP API until the process receives a shutdown
/// signal.
pub async fn run(args: cli::Args) -> anyhow::Result<()> {
    tracing::info!("running calibrator with validated arguments:\n{args}");

    let http_client = reqwest::Client::builder()
        .timeout(args.http_timeout)
        .user_agent(concat!("calibrator/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let oracle = Arc::new(oracle::UsdOracle::new(
        http_client.clone(),
        oracle::Config {
            base_url: "https://api.coingecko.com/api/v3/".parse()?,
            api_key: args.coingecko_api_key.clone(),
            token_info_ttl: Duration::from_secs(args.token_info_ttl_seconds),
            usd_price_ttl: Duration::from_secs(args.usd_price_ttl_seconds),
        },
    ));

    let router_client = Arc::new(router::RouteQuoter::new(
        http_client,
        router::Config {
            base_url: "https://api.uniswap.org/v2/".parse()?,
            api_key: args.uniswap_api_key.clone(),
        },
    ));

    let rpc_urls = HashMap::from([
        (1u64, args.ethereum_rpc_url.clone()),
        (10u64, args.optimism_rpc_url.clone()),
        (8453u64, args.base_rpc_url.clone()),
        (130u64, args.unichain_rpc_url.clone()),
    ]);
    let tribunal = Arc::new(tribunal::TribunalClient::new(tribunal::providers_from_urls(
        &rpc_urls,
    )));

    let pipeline = Arc::new(pipeline::QuotePipeline::new(oracle, router_client, tribunal));
    let state = api::State::new(pipeline);
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(args.bind_address).await?;
    tracing::info!(addr = %args.bind_address, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

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
        () = ctrl_c => {},
        () = terminate => {},
    }
}
