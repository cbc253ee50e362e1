//! Process configuration, parsed from CLI flags or environment variables.
//! Never derive `Debug`/`Display` on this directly: the redacting `Display`
//! impl below is the only thing allowed to print it, following the
//! secret-hygiene convention used for the equivalent argument structs
//! elsewhere in this codebase.

use std::{net::SocketAddr, time::Duration};

#[derive(clap::Parser)]
pub struct Args {
    /// Address to bind the HTTP API to.
    #[clap(long, env, default_value = "0.0.0.0:8080")]
    pub bind_address: SocketAddr,

    /// `tracing_subscriber::EnvFilter` directive string.
    #[clap(long, env, default_value = "warn,calibrator=debug")]
    pub log_filter: String,

    #[clap(long, env)]
    pub ethereum_rpc_url: url::Url,
    #[clap(long, env)]
    pub optimism_rpc_url: url::Url,
    #[clap(long, env)]
    pub base_rpc_url: url::Url,
    #[clap(long, env)]
    pub unichain_rpc_url: url::Url,

    #[clap(long, env)]
    pub coingecko_api_key: Option<String>,
    #[clap(long, env)]
    pub uniswap_api_key: Option<String>,

    #[clap(long, env, default_value = "10", value_parser = duration_from_seconds)]
    pub http_timeout: Duration,

    #[clap(long, env, default_value = "30")]
    pub usd_price_ttl_seconds: u64,
    #[clap(long, env, default_value = "86400")]
    pub token_info_ttl_seconds: u64,
}

fn duration_from_seconds(s: &str) -> Result<Duration, std::num::ParseIntError> {
    s.parse().map(Duration::from_secs)
}

impl std::fmt::Display for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "bind_address: {}", self.bind_address)?;
        writeln!(f, "log_filter: {}", self.log_filter)?;
        writeln!(f, "ethereum_rpc_url: {}", self.ethereum_rpc_url)?;
        writeln!(f, "optimism_rpc_url: {}", self.optimism_rpc_url)?;
        writeln!(f, "base_rpc_url: {}", self.base_rpc_url)?;
        writeln!(f, "unichain_rpc_url: {}", self.unichain_rpc_url)?;
        writeln!(
            f,
            "coingecko_api_key: {}",
            self.coingecko_api_key.as_ref().map(|_| "SECRET").unwrap_or("None")
        )?;
        writeln!(
            f,
            "uniswap_api_key: {}",
            self.uniswap_api_key.as_ref().map(|_| "SECRET").unwrap_or("None")
        )?;
        writeln!(f, "http_timeout: {:?}", self.http_timeout)?;
        writeln!(f, "usd_price_ttl_seconds: {}", self.usd_price_ttl_seconds)?;
        writeln!(f, "token_info_ttl_seconds: {}", self.token_info_ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_redacts_configured_api_keys() {
        let args = Args {
            bind_address: "0.0.0.0:8080".parse().unwrap(),
            log_filter: "warn".to_owned(),
            ethereum_rpc_url: "http://localhost:8545".parse().unwrap(),
            optimism_rpc_url: "http://localhost:8546".parse().unwrap(),
            base_rpc_url: "http://localhost:8547".parse().unwrap(),
            unichain_rpc_url: "http://localhost:8548".parse().unwrap(),
            coingecko_api_key: Some("super-secret".to_owned()),
            uniswap_api_key: None,
            http_timeout: Duration::from_secs(10),
            usd_price_ttl_seconds: 30,
            token_info_ttl_seconds: 86_400,
        };

        let rendered = args.to_string();
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("coingecko_api_key: SECRET"));
        assert!(rendered.contains("uniswap_api_key: None"));
    }
}
