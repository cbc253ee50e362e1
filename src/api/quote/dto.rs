//! Wire representation of `POST /quote`. Every numeric field is a decimal
//! string on the wire; this module is the only place that knows that.

use {
    crate::domain::{
        compact_id::LockParameters,
        eth::Address,
        mandate::{Compact, Mandate},
        quote::{QuoteAmounts, QuoteContext, QuoteRequest, TokenRef},
    },
    alloy::primitives::U256,
    serde::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
};

#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    #[error("Reset period must be between 0 and 7")]
    ResetPeriodOutOfRange,
    #[error("Allocator id does not fit in 92 bits")]
    AllocatorIdOverflow,
}

impl From<crate::domain::compact_id::Error> for RequestError {
    fn from(err: crate::domain::compact_id::Error) -> Self {
        use crate::domain::compact_id::Error as E;
        match err {
            E::ResetPeriodOutOfRange => Self::ResetPeriodOutOfRange,
            E::AllocatorIdOverflow => Self::AllocatorIdOverflow,
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockParametersDto {
    #[serde_as(as = "DisplayFromStr")]
    pub allocator_id: U256,
    pub reset_period: u8,
    pub is_multichain: bool,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDto {
    pub slippage_bips: Option<u16>,
    pub recipient: Option<alloy::primitives::Address>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub baseline_priority_fee: Option<U256>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub scaling_factor: Option<U256>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub fill_expires: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub claim_expires: Option<u64>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestDto {
    pub sponsor: alloy::primitives::Address,
    pub input_token_chain_id: u64,
    pub input_token_address: alloy::primitives::Address,
    #[serde_as(as = "DisplayFromStr")]
    pub input_token_amount: U256,
    pub output_token_chain_id: u64,
    pub output_token_address: alloy::primitives::Address,
    pub lock_parameters: LockParametersDto,
    #[serde(default)]
    pub context: Option<ContextDto>,
}

impl TryFrom<QuoteRequestDto> for QuoteRequest {
    type Error = RequestError;

    fn try_from(dto: QuoteRequestDto) -> Result<Self, Self::Error> {
        let lock_parameters = LockParameters {
            allocator_id: dto.lock_parameters.allocator_id,
            reset_period: dto.lock_parameters.reset_period,
            is_multichain: dto.lock_parameters.is_multichain,
        };
        lock_parameters.validate()?;

        let mut context = QuoteContext::default();
        if let Some(ctx) = dto.context {
            if let Some(bips) = ctx.slippage_bips {
                context.slippage_bips = bips;
            }
            context.recipient = ctx.recipient.map(Address);
            if let Some(fee) = ctx.baseline_priority_fee {
                context.baseline_priority_fee = fee;
            }
            if let Some(factor) = ctx.scaling_factor {
                context.scaling_factor = factor;
            }
            context.fill_expires = ctx.fill_expires;
            context.claim_expires = ctx.claim_expires;
        }

        Ok(QuoteRequest {
            sponsor: Address(dto.sponsor),
            input_token: TokenRef {
                chain_id: dto.input_token_chain_id,
                address: Address(dto.input_token_address),
            },
            input_amount: dto.input_token_amount,
            output_token: TokenRef {
                chain_id: dto.output_token_chain_id,
                address: Address(dto.output_token_address),
            },
            lock_parameters,
            context,
        })
    }
}

#[serde_as]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MandateDto {
    #[serde_as(as = "DisplayFromStr")]
    pub chain_id: U256,
    pub tribunal: alloy::primitives::Address,
    pub recipient: alloy::primitives::Address,
    #[serde_as(as = "DisplayFromStr")]
    pub expires: U256,
    pub token: alloy::primitives::Address,
    #[serde_as(as = "DisplayFromStr")]
    pub minimum_amount: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub baseline_priority_fee: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub scaling_factor: U256,
    pub salt: alloy::primitives::B256,
}

impl From<&Mandate> for MandateDto {
    fn from(mandate: &Mandate) -> Self {
        Self {
            chain_id: mandate.chain_id,
            tribunal: mandate.tribunal,
            recipient: mandate.recipient,
            expires: mandate.expires,
            token: mandate.token,
            minimum_amount: mandate.minimum_amount,
            baseline_priority_fee: mandate.baseline_priority_fee,
            scaling_factor: mandate.scaling_factor,
            salt: mandate.salt,
        }
    }
}

#[serde_as]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactDto {
    pub arbiter: alloy::primitives::Address,
    pub tribunal: alloy::primitives::Address,
    pub sponsor: alloy::primitives::Address,
    pub nonce: Option<U256>,
    #[serde_as(as = "DisplayFromStr")]
    pub expires: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub id: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub maximum_amount: U256,
    pub mandate: MandateDto,
}

impl From<&Compact> for CompactDto {
    fn from(compact: &Compact) -> Self {
        Self {
            arbiter: compact.arbiter,
            tribunal: compact.tribunal,
            sponsor: compact.sponsor,
            nonce: None,
            expires: compact.expires,
            id: compact.id,
            amount: compact.amount,
            maximum_amount: compact.maximum_amount,
            mandate: MandateDto::from(&compact.mandate),
        }
    }
}

#[serde_as]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResponseDto {
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub dispensation: Option<U256>,
    pub dispensation_usd: Option<String>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub spot_output_amount: Option<U256>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub quote_output_amount_direct: Option<U256>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub quote_output_amount_net: Option<U256>,
    pub delta_amount: Option<String>,
    pub witness_hash: String,
}

impl ContextResponseDto {
    pub fn new(amounts: &QuoteAmounts, witness_hash: [u8; 32]) -> Self {
        Self {
            dispensation: amounts.dispensation,
            dispensation_usd: amounts.dispensation_usd.map(|usd| format!("${usd:.4}")),
            spot_output_amount: amounts.spot_output_amount,
            quote_output_amount_direct: amounts.direct_output_amount,
            quote_output_amount_net: amounts.net_output_amount,
            delta_amount: amounts.delta().map(|delta| delta.to_string()),
            witness_hash: format!("0x{}", const_hex::encode(witness_hash)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteResponseDto {
    pub data: CompactDto,
    pub context: ContextResponseDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_integers_serialize_as_decimal_strings() {
        let dto = MandateDto {
            chain_id: U256::from(8453u64),
            tribunal: alloy::primitives::Address::ZERO,
            recipient: alloy::primitives::Address::ZERO,
            expires: U256::from(1_703_026_800u64),
            token: alloy::primitives::Address::ZERO,
            minimum_amount: U256::from(990_000_000_000_000_000u128),
            baseline_priority_fee: U256::ZERO,
            scaling_factor: U256::from(1_000_000_000_100_000_000u128),
            salt: alloy::primitives::B256::ZERO,
        };

        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["chainId"], serde_json::json!("8453"));
        assert_eq!(
            value["minimumAmount"],
            serde_json::json!("990000000000000000")
        );
    }

    #[test]
    fn nonce_serializes_as_null() {
        let compact = Compact {
            arbiter: alloy::primitives::Address::ZERO,
            tribunal: alloy::primitives::Address::ZERO,
            sponsor: alloy::primitives::Address::ZERO,
            expires: U256::from(1u64),
            id: U256::ZERO,
            amount: U256::ZERO,
            maximum_amount: U256::ZERO,
            mandate: Mandate {
                chain_id: U256::from(1u64),
                tribunal: alloy::primitives::Address::ZERO,
                recipient: alloy::primitives::Address::ZERO,
                expires: U256::ZERO,
                token: alloy::primitives::Address::ZERO,
                minimum_amount: U256::ZERO,
                baseline_priority_fee: U256::ZERO,
                scaling_factor: U256::ZERO,
                salt: alloy::primitives::B256::ZERO,
            },
        };

        let value = serde_json::to_value(CompactDto::from(&compact)).unwrap();
        assert!(value["nonce"].is_null());
    }

    #[test]
    fn context_response_formats_dispensation_usd_with_four_decimals() {
        let amounts = QuoteAmounts {
            dispensation_usd: Some(1.5),
            ..Default::default()
        };
        let dto = ContextResponseDto::new(&amounts, [0u8; 32]);
        assert_eq!(dto.dispensation_usd.as_deref(), Some("$1.5000"));
        assert_eq!(dto.witness_hash, format!("0x{}", "00".repeat(32)));
    }
}
