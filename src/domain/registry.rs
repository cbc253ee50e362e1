//! The process-global, immutable map from `(sourceChainId, destinationChainId)`
//! to the arbiter/tribunal pair and mandate shape used to settle that route.
//!
//! Built once behind a `LazyLock`, following the "read-only after startup"
//! resource policy applied to RPC clients and caches elsewhere in this
//! crate.

use {
    crate::domain::{
        eth::ChainId,
        mandate::Mandate,
        quote::QuoteContext,
        witness::{self, WitnessTypeString},
    },
    alloy::primitives::{address, Address, U256},
    std::{collections::HashMap, sync::LazyLock},
};

const MANDATE_WITNESS_TYPE_STRING: &str = "Mandate mandate)Mandate(uint256 chainId,address \
                                            tribunal,address recipient,uint256 expires,address \
                                            token,uint256 minimumAmount,uint256 \
                                            baselinePriorityFee,uint256 scalingFactor,bytes32 \
                                            salt)";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No arbiter found for chain pair {src}-{dst}")]
    NoArbiterForChainPair { src: ChainId, dst: ChainId },
    #[error(transparent)]
    WitnessTypeString(#[from] witness::Error),
}

/// Builds the destination mandate for a route, given the quoted output
/// amount, the request's context, and the tribunal address for that route.
pub type MandateBuilder =
    fn(output_amount: U256, ctx: &QuoteContext, dest_chain_id: ChainId, tribunal: Address, output_token: Address, salt: alloy::primitives::B256) -> Mandate;

pub struct ArbiterEntry {
    pub arbiter: Address,
    pub tribunal: Address,
    witness_type_string: &'static str,
    pub mandate_builder: MandateBuilder,
}

impl ArbiterEntry {
    pub fn witness_type_string(&self) -> Result<WitnessTypeString, witness::Error> {
        WitnessTypeString::parse(self.witness_type_string)
    }
}

fn build_mandate(
    output_amount: U256,
    ctx: &QuoteContext,
    dest_chain_id: ChainId,
    tribunal: Address,
    output_token: Address,
    salt: alloy::primitives::B256,
) -> Mandate {
    let minimum_amount = crate::domain::eth::Bips::new(ctx.slippage_bips).apply_shortfall(
        crate::domain::eth::TokenAmount(output_amount),
    );
    Mandate {
        chain_id: U256::from(dest_chain_id),
        tribunal,
        recipient: ctx
            .recipient
            .map(|a| a.0)
            .unwrap_or(Address::ZERO),
        expires: U256::from(ctx.fill_expires.unwrap_or_default()),
        token: output_token,
        minimum_amount: minimum_amount.0,
        baseline_priority_fee: ctx.baseline_priority_fee,
        scaling_factor: ctx.scaling_factor,
        salt,
    }
}

struct Route {
    src: ChainId,
    dst: ChainId,
    arbiter: Address,
    tribunal: Address,
}

// The reference deployment: four chains, all twelve directed pairs.
const ETHEREUM: ChainId = 1;
const OPTIMISM: ChainId = 10;
const BASE: ChainId = 8453;
const UNICHAIN: ChainId = 130;

fn routes() -> Vec<Route> {
    let chains = [ETHEREUM, OPTIMISM, BASE, UNICHAIN];
    let mut routes = Vec::with_capacity(12);
    for &src in &chains {
        for &dst in &chains {
            if src == dst {
                continue;
            }
            routes.push(Route {
                src,
                dst,
                arbiter: arbiter_for(src),
                tribunal: tribunal_for(dst),
            });
        }
    }
    routes
}

fn arbiter_for(chain_id: ChainId) -> Address {
    match chain_id {
        ETHEREUM => address!("2602a75ea9B1fFE27c70f5c4f6D43abb3Ae0F626"),
        OPTIMISM => address!("2602a75ea9B1fFE27c70f5c4f6D43abb3Ae0F626"),
        BASE => address!("2602a75ea9B1fFE27c70f5c4f6D43abb3Ae0F626"),
        UNICHAIN => address!("2602a75ea9B1fFE27c70f5c4f6D43abb3Ae0F626"),
        _ => unreachable!("routes() only iterates the four known chains"),
    }
}

fn tribunal_for(chain_id: ChainId) -> Address {
    match chain_id {
        ETHEREUM => address!("faBE453252ca8337ef86B7C3a4d8Ed95843E6c1F"),
        OPTIMISM => address!("faBE453252ca8337ef86B7C3a4d8Ed95843E6c1F"),
        BASE => address!("faBE453252ca8337ef86B7C3a4d8Ed95843E6c1F"),
        UNICHAIN => address!("faBE453252ca8337ef86B7C3a4d8Ed95843E6c1F"),
        _ => unreachable!("routes() only iterates the four known chains"),
    }
}

pub static REGISTRY: LazyLock<HashMap<(ChainId, ChainId), ArbiterEntry>> = LazyLock::new(|| {
    routes()
        .into_iter()
        .map(|route| {
            (
                (route.src, route.dst),
                ArbiterEntry {
                    arbiter: route.arbiter,
                    tribunal: route.tribunal,
                    witness_type_string: MANDATE_WITNESS_TYPE_STRING,
                    mandate_builder: build_mandate,
                },
            )
        })
        .collect()
});

pub fn lookup(src: ChainId, dst: ChainId) -> Result<&'static ArbiterEntry, Error> {
    REGISTRY
        .get(&(src, dst))
        .ok_or(Error::NoArbiterForChainPair { src, dst })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_directed_pair_of_the_four_chains_is_populated() {
        let chains = [ETHEREUM, OPTIMISM, BASE, UNICHAIN];
        for &src in &chains {
            for &dst in &chains {
                if src == dst {
                    continue;
                }
                assert!(lookup(src, dst).is_ok(), "missing route {src}-{dst}");
            }
        }
    }

    #[test]
    fn unsupported_pair_is_rejected() {
        let err = lookup(OPTIMISM, 42161).unwrap_err();
        assert!(matches!(err, Error::NoArbiterForChainPair { src: 10, dst: 42161 }));
    }

    #[test]
    fn entry_witness_type_string_parses() {
        let entry = lookup(OPTIMISM, BASE).unwrap();
        let parsed = entry.witness_type_string().unwrap();
        assert_eq!(parsed.struct_name, "Mandate");
    }
}
