//! A CoinGecko-shaped USD price oracle: one shared `reqwest::Client`, three
//! TTL caches (platform list, token metadata, spot price), following the
//! "cache reads, reqwest writes" resource policy used throughout this crate.

use {
    crate::domain::{
        eth::{ChainId, Token, UsdPrice},
        token::{TokenInfo, TokenKey},
    },
    moka::future::Cache,
    std::{collections::HashSet, sync::Arc, time::Duration},
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("chain {0} is not supported by the price oracle")]
    UnsupportedChain(ChainId),
    #[error("oracle request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("oracle response was missing expected data")]
    MalformedResponse,
}

fn platform_for_chain(chain_id: ChainId) -> Option<&'static str> {
    match chain_id {
        1 => Some("ethereum"),
        10 => Some("optimistic-ethereum"),
        8453 => Some("base"),
        130 => Some("unichain"),
        _ => None,
    }
}

const PLATFORMS_CACHE_KEY: u8 = 0;

pub struct Config {
    pub base_url: url::Url,
    pub api_key: Option<String>,
    pub token_info_ttl: Duration,
    pub usd_price_ttl: Duration,
}

pub struct UsdOracle {
    client: reqwest::Client,
    config: Config,
    platforms_cache: Cache<u8, Arc<HashSet<String>>>,
    token_info_cache: Cache<TokenKey, TokenInfo>,
    usd_price_cache: Cache<TokenKey, UsdPrice>,
}

impl UsdOracle {
    pub fn new(client: reqwest::Client, config: Config) -> Self {
        Self {
            platforms_cache: Cache::builder().build(),
            token_info_cache: Cache::builder().time_to_live(config.token_info_ttl).build(),
            usd_price_cache: Cache::builder().time_to_live(config.usd_price_ttl).build(),
            client,
            config,
        }
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let url = self
            .config
            .base_url
            .join(path)
            .expect("path is a valid relative URL");
        let request = self.client.get(url);
        match &self.config.api_key {
            Some(key) => request.header("x-cg-pro-api-key", key),
            None => request,
        }
    }

    pub async fn platforms(&self) -> Result<Arc<HashSet<String>>, Error> {
        self.platforms_cache
            .try_get_with(PLATFORMS_CACHE_KEY, async {
                #[derive(serde::Deserialize)]
                struct Platform {
                    id: String,
                }
                let platforms: Vec<Platform> = self
                    .request("asset_platforms")
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                Ok::<_, Error>(Arc::new(platforms.into_iter().map(|p| p.id).collect()))
            })
            .await
            .map_err(|err: Arc<Error>| flatten_cached_error(&err))
    }

    pub async fn chain_to_platform(&self, chain_id: ChainId) -> Result<&'static str, Error> {
        platform_for_chain(chain_id).ok_or(Error::UnsupportedChain(chain_id))
    }

    pub async fn token_info(&self, token: Token) -> Result<TokenInfo, Error> {
        if token.is_native() {
            return Ok(TokenInfo::native());
        }

        let key = TokenKey::from(token);
        self.token_info_cache
            .try_get_with(key.clone(), async {
                let platform = self.chain_to_platform(token.chain_id).await?;

                #[derive(serde::Deserialize)]
                struct ContractInfo {
                    symbol: String,
                    detail_platforms: std::collections::HashMap<String, DetailPlatform>,
                }
                #[derive(serde::Deserialize)]
                struct DetailPlatform {
                    decimal_place: Option<u8>,
                }

                let path = format!("coins/{platform}/contract/{:#x}", key.address);
                let info: ContractInfo = self
                    .request(&path)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                let decimals = info
                    .detail_platforms
                    .get(platform)
                    .and_then(|p| p.decimal_place)
                    .ok_or(Error::MalformedResponse)?;
                Ok::<_, Error>(TokenInfo {
                    decimals,
                    symbol: info.symbol.to_uppercase(),
                })
            })
            .await
            .map_err(|err: Arc<Error>| flatten_cached_error(&err))
    }

    pub async fn usd_price(&self, token: Token) -> Result<UsdPrice, Error> {
        let key = TokenKey::from(token);
        self.usd_price_cache
            .try_get_with(key.clone(), async {
                let platform = self.chain_to_platform(token.chain_id).await?;

                #[derive(serde::Deserialize)]
                struct PriceEntry {
                    usd: f64,
                }

                let path = format!(
                    "simple/token_price/{platform}?contract_addresses={:#x}&vs_currencies=usd",
                    key.address
                );
                let prices: std::collections::HashMap<String, PriceEntry> = self
                    .request(&path)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                let usd = prices
                    .values()
                    .next()
                    .map(|entry| entry.usd)
                    .ok_or(Error::MalformedResponse)?;
                let wei_scaled = (usd * 1e18).floor();
                Ok::<_, Error>(UsdPrice(alloy::primitives::U256::from(wei_scaled as u128)))
            })
            .await
            .map_err(|err: Arc<Error>| flatten_cached_error(&err))
    }
}

fn flatten_cached_error(err: &Error) -> Error {
    match err {
        Error::UnsupportedChain(chain_id) => Error::UnsupportedChain(*chain_id),
        Error::Transport(_) => Error::MalformedResponse,
        Error::MalformedResponse => Error::MalformedResponse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_to_platform_knows_the_four_reference_chains() {
        assert_eq!(platform_for_chain(1), Some("ethereum"));
        assert_eq!(platform_for_chain(10), Some("optimistic-ethereum"));
        assert_eq!(platform_for_chain(8453), Some("base"));
        assert_eq!(platform_for_chain(130), Some("unichain"));
        assert_eq!(platform_for_chain(42161), None);
    }
}
