//! Request/response domain types for a single quote, independent of their
//! JSON wire representation (see `crate::api::quote::dto` for that).

use {
    crate::domain::{
        compact_id::LockParameters,
        eth::{Address, SignedAmount},
    },
    alloy::primitives::U256,
};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TokenRef {
    pub chain_id: u64,
    pub address: Address,
}

#[derive(Debug, Clone)]
pub struct QuoteContext {
    pub slippage_bips: u16,
    pub recipient: Option<Address>,
    pub baseline_priority_fee: U256,
    pub scaling_factor: U256,
    pub fill_expires: Option<u64>,
    pub claim_expires: Option<u64>,
}

impl Default for QuoteContext {
    fn default() -> Self {
        Self {
            slippage_bips: 100,
            recipient: None,
            baseline_priority_fee: U256::ZERO,
            scaling_factor: U256::from(1_000_000_000_100_000_000u128),
            fill_expires: None,
            claim_expires: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub sponsor: Address,
    pub input_token: TokenRef,
    pub input_amount: U256,
    pub output_token: TokenRef,
    pub lock_parameters: LockParameters,
    pub context: QuoteContext,
}

/// The amounts produced by the routing/pricing phases of the pipeline,
/// before the mandate is assembled. `None` fields indicate the
/// corresponding signal was unavailable, not that it was zero.
#[derive(Debug, Clone, Default)]
pub struct QuoteAmounts {
    pub spot_output_amount: Option<U256>,
    pub direct_output_amount: Option<U256>,
    pub net_output_amount: Option<U256>,
    pub dispensation: Option<U256>,
    pub dispensation_usd: Option<f64>,
}

impl QuoteAmounts {
    pub fn delta(&self) -> Option<SignedAmount> {
        let net = self.net_output_amount.or(self.direct_output_amount)?;
        let spot = self.spot_output_amount?;
        Some(SignedAmount::of(net, spot))
    }
}
