//! An indicative routing quoter, modelled on Uniswap's quoting API: one
//! HTTP leg per same-chain swap, composed by the pipeline into the
//! cross-chain native-token-intermediate routes described in the
//! calibration algorithm.

use {
    crate::domain::eth::{ChainId, Token, TokenAmount},
    alloy::primitives::U256,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("router request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("router response was missing expected data")]
    MalformedResponse,
    #[error("dispensation {dispensation} exceeds intermediate amount {intermediate}")]
    DispensationExceedsIntermediate { dispensation: U256, intermediate: U256 },
}

pub struct Config {
    pub base_url: url::Url,
    pub api_key: Option<String>,
}

/// A single-leg swap quote on one chain.
pub struct RouteQuoter {
    client: reqwest::Client,
    config: Config,
}

impl RouteQuoter {
    pub fn new(client: reqwest::Client, config: Config) -> Self {
        Self { client, config }
    }

    /// Quotes one same-chain leg: `amount_in` of `token_in` for `token_out`.
    /// Both tokens must live on the same chain; the zero address denotes
    /// the chain's native asset, handled the same as any other address by
    /// the upstream router.
    pub async fn quote_leg(
        &self,
        token_in: Token,
        token_out: Token,
        amount_in: TokenAmount,
    ) -> Result<TokenAmount, Error> {
        debug_assert_eq!(token_in.chain_id, token_out.chain_id);

        #[derive(serde::Serialize)]
        struct QuoteRequest {
            #[serde(rename = "chainId")]
            chain_id: ChainId,
            #[serde(rename = "tokenIn")]
            token_in: String,
            #[serde(rename = "tokenOut")]
            token_out: String,
            #[serde(rename = "amount")]
            amount: String,
            #[serde(rename = "type")]
            kind: &'static str,
        }
        #[derive(serde::Deserialize)]
        struct QuoteResponse {
            #[serde(rename = "quote")]
            amount_out: String,
        }

        let mut url = self
            .config
            .base_url
            .join("quote")
            .expect("quote is a valid relative URL");
        if let Some(key) = &self.config.api_key {
            url.query_pairs_mut().append_pair("apiKey", key);
        }

        let body = QuoteRequest {
            chain_id: token_in.chain_id,
            token_in: format!("{:#x}", token_in.address.0),
            token_out: format!("{:#x}", token_out.address.0),
            amount: amount_in.0.to_string(),
            kind: "exactIn",
        };

        let response: QuoteResponse = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let amount_out = response
            .amount_out
            .parse::<U256>()
            .map_err(|_| Error::MalformedResponse)?;
        Ok(TokenAmount(amount_out))
    }

    /// Subtracts `dispensation` from `intermediate`, classifying the
    /// "dispensation eats the whole intermediate amount" edge case
    /// distinctly from an ordinary transport failure.
    pub fn net_of_dispensation(
        intermediate: TokenAmount,
        dispensation: TokenAmount,
    ) -> Result<TokenAmount, Error> {
        intermediate
            .checked_sub(dispensation)
            .ok_or(Error::DispensationExceedsIntermediate {
                dispensation: dispensation.0,
                intermediate: intermediate.0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_of_dispensation_subtracts_when_possible() {
        let net = RouteQuoter::net_of_dispensation(
            TokenAmount(U256::from(100u64)),
            TokenAmount(U256::from(40u64)),
        )
        .unwrap();
        assert_eq!(net.0, U256::from(60u64));
    }

    #[test]
    fn net_of_dispensation_fails_when_dispensation_exceeds_intermediate() {
        let err = RouteQuoter::net_of_dispensation(
            TokenAmount(U256::from(10u64)),
            TokenAmount(U256::from(40u64)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::DispensationExceedsIntermediate { .. }
        ));
    }
}
