//! RPC clients for the per-destination-chain tribunal contract: one
//! `alloy` provider per chain, built once at startup and reused across
//! requests, following the "one RPC client per chain" resource policy.

use {
    crate::domain::{eth::ChainId, mandate::Mandate as DomainMandate},
    alloy::{
        primitives::{Address, U256},
        providers::{DynProvider, Provider, ProviderBuilder},
    },
    std::collections::HashMap,
};

alloy::sol! {
    #[sol(rpc)]
    interface ITribunal {
        struct Mandate {
            uint256 chainId;
            address tribunal;
            address recipient;
            uint256 expires;
            address token;
            uint256 minimumAmount;
            uint256 baselinePriorityFee;
            uint256 scalingFactor;
            bytes32 salt;
        }

        function quote(
            bytes32 id,
            Mandate calldata mandate,
            address claimant
        ) external view returns (uint256 dispensation);

        function deriveMandateHash(Mandate calldata mandate) external view returns (bytes32);
    }
}

impl From<&DomainMandate> for ITribunal::Mandate {
    fn from(mandate: &DomainMandate) -> Self {
        Self {
            chainId: mandate.chain_id,
            tribunal: mandate.tribunal,
            recipient: mandate.recipient,
            expires: mandate.expires,
            token: mandate.token,
            minimumAmount: mandate.minimum_amount,
            baselinePriorityFee: mandate.baseline_priority_fee,
            scalingFactor: mandate.scaling_factor,
            salt: mandate.salt,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("chain {0} has no configured tribunal")]
    UnsupportedTribunalChain(ChainId),
    #[error("tribunal rpc call failed: {0}")]
    Rpc(#[from] alloy::contract::Error),
}

pub struct TribunalClient {
    providers: HashMap<ChainId, DynProvider>,
}

impl TribunalClient {
    pub fn new(providers: HashMap<ChainId, DynProvider>) -> Self {
        Self { providers }
    }

    fn provider(&self, chain_id: ChainId) -> Result<&DynProvider, Error> {
        self.providers
            .get(&chain_id)
            .ok_or(Error::UnsupportedTribunalChain(chain_id))
    }

    /// Simulates the tribunal's `quote` view function, returning the
    /// dispensation (in wei of the destination chain's native token) the
    /// tribunal would charge to settle this mandate.
    pub async fn simulate_dispensation(
        &self,
        dest_chain_id: ChainId,
        tribunal: Address,
        compact_id: alloy::primitives::B256,
        mandate: &DomainMandate,
        claimant: Address,
    ) -> Result<U256, Error> {
        let provider = self.provider(dest_chain_id)?;
        let instance = ITribunal::new(tribunal, provider.clone());
        let dispensation = instance
            .quote(compact_id, mandate.into(), claimant)
            .call()
            .await?;
        Ok(dispensation)
    }

    /// Cross-checks the locally computed witness hash against the
    /// tribunal's own `deriveMandateHash`. Used by tests and debug
    /// tooling, not by the hot request path.
    pub async fn derive_mandate_hash(
        &self,
        dest_chain_id: ChainId,
        tribunal: Address,
        mandate: &DomainMandate,
    ) -> Result<alloy::primitives::B256, Error> {
        let provider = self.provider(dest_chain_id)?;
        let instance = ITribunal::new(tribunal, provider.clone());
        let hash = instance.deriveMandateHash(mandate.into()).call().await?;
        Ok(hash)
    }
}

/// Builds one HTTP-backed provider per chain from the configured RPC URLs.
pub fn providers_from_urls(urls: &HashMap<ChainId, url::Url>) -> HashMap<ChainId, DynProvider> {
    urls.iter()
        .map(|(&chain_id, url)| {
            let provider = ProviderBuilder::new().connect_http(url.clone());
            (chain_id, DynProvider::new(provider))
        })
        .collect()
}
