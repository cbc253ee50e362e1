//! Orchestrates the oracle, router, tribunal and registry components into a
//! single quote: spot reference price, routed amounts, dispensation, and
//! the signable arbiter configuration.

use {
    crate::{
        domain::{
            compact_id::CompactId,
            eth::{Address, ChainId, Token, TokenAmount},
            mandate::Compact,
            quote::{QuoteAmounts, QuoteRequest},
            registry::{self, ArbiterEntry},
        },
        infra::{oracle::UsdOracle, router::RouteQuoter, tribunal::TribunalClient},
    },
    alloy::primitives::U256,
    std::sync::Arc,
    tracing::warn,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] registry::Error),
    #[error(transparent)]
    CompactId(#[from] crate::domain::compact_id::Error),
    #[error(transparent)]
    Witness(#[from] crate::domain::witness::Error),
    #[error("fillExpires must be before claimExpires")]
    ExpiresOrderViolation,
}

pub struct QuotePipeline {
    oracle: Arc<UsdOracle>,
    router: Arc<RouteQuoter>,
    tribunal: Arc<TribunalClient>,
}

pub struct QuoteResult {
    pub amounts: QuoteAmounts,
    pub compact: Compact,
    pub witness_hash: [u8; 32],
}

impl QuotePipeline {
    pub fn new(oracle: Arc<UsdOracle>, router: Arc<RouteQuoter>, tribunal: Arc<TribunalClient>) -> Self {
        Self {
            oracle,
            router,
            tribunal,
        }
    }

    pub async fn quote(&self, request: QuoteRequest) -> Result<QuoteResult, Error> {
        if let (Some(fill), Some(claim)) = (
            request.context.fill_expires,
            request.context.claim_expires,
        ) {
            if fill >= claim {
                return Err(Error::ExpiresOrderViolation);
            }
        }

        let entry = registry::lookup(request.input_token.chain_id, request.output_token.chain_id)?;

        let input_token = Token {
            chain_id: request.input_token.chain_id,
            address: request.input_token.address,
        };
        let output_token = Token {
            chain_id: request.output_token.chain_id,
            address: request.output_token.address,
        };

        let spot = self
            .spot_amount(input_token, request.input_amount, output_token)
            .await;

        let legs = self
            .route(input_token, output_token, TokenAmount(request.input_amount))
            .await;

        let mut amounts = QuoteAmounts {
            spot_output_amount: spot,
            ..Default::default()
        };

        let salt = random_salt();
        let fill_expires = request
            .context
            .fill_expires
            .unwrap_or_else(default_fill_expires);
        let mut context = request.context.clone();
        context.fill_expires = Some(fill_expires);

        if let Some(legs) = legs {
            amounts.direct_output_amount = Some(legs.direct.0);

            let provisional_mandate = (entry.mandate_builder)(
                legs.direct.0,
                &context,
                request.output_token.chain_id,
                entry.tribunal,
                request.output_token.address.0,
                salt,
            );
            let compact_id = CompactId::pack(&request.lock_parameters, request.input_token.address.0)?;

            let dispensation_1 = self
                .simulate_dispensation(
                    request.output_token.chain_id,
                    entry,
                    compact_id,
                    &provisional_mandate,
                    request.sponsor,
                )
                .await;

            if let Some(dispensation_1) = dispensation_1 {
                let net = RouteQuoter::net_of_dispensation(
                    legs.intermediate,
                    TokenAmount(dispensation_1),
                )
                .ok();

                let net_for_leg = match legs.kind {
                    RouteKind::NativeOut | RouteKind::BothNative => net,
                    _ => {
                        if dispensation_1 >= legs.intermediate.0 {
                            Some(TokenAmount::ZERO)
                        } else {
                            self.requote_net(output_token, &legs, dispensation_1).await
                        }
                    }
                };

                let net_amount = net_for_leg.map(|a| a.0);
                amounts.net_output_amount = net_amount;

                let final_mandate = (entry.mandate_builder)(
                    net_amount.unwrap_or(legs.direct.0),
                    &context,
                    request.output_token.chain_id,
                    entry.tribunal,
                    request.output_token.address.0,
                    salt,
                );

                let dispensation_2 = self
                    .simulate_dispensation(
                        request.output_token.chain_id,
                        entry,
                        compact_id,
                        &final_mandate,
                        request.sponsor,
                    )
                    .await
                    .unwrap_or(dispensation_1);

                amounts.dispensation = Some(dispensation_2);
                amounts.dispensation_usd = self.dispensation_usd(dispensation_2).await;

                return self.finalize(&request, entry, compact_id, final_mandate, amounts);
            }

            return self.finalize(&request, entry, compact_id, provisional_mandate, amounts);
        }

        // No routed quote available at all: still produce a mandate (with a
        // minimumAmount of zero) so the response always carries a witness
        // hash, per the "only a few conditions are fatal" partial-success
        // policy.
        let compact_id = CompactId::pack(&request.lock_parameters, request.input_token.address.0)?;
        let mandate = (entry.mandate_builder)(
            U256::ZERO,
            &context,
            request.output_token.chain_id,
            entry.tribunal,
            request.output_token.address.0,
            salt,
        );
        self.finalize(&request, entry, compact_id, mandate, amounts)
    }

    /// Computes the witness hash against the registry entry's own type
    /// string and assembles the signable compact. The hash is recomputed
    /// here, against the registry's type string, rather than the pipeline
    /// trusting any earlier intermediate value, so the two can never drift.
    fn finalize(
        &self,
        request: &QuoteRequest,
        entry: &ArbiterEntry,
        compact_id: CompactId,
        mandate: crate::domain::mandate::Mandate,
        amounts: QuoteAmounts,
    ) -> Result<QuoteResult, Error> {
        let witness_type_string = entry.witness_type_string()?;
        let witness_hash = witness_type_string.struct_hash(&mandate.as_field_map())?;

        let maximum_amount = amounts
            .net_output_amount
            .or(amounts.direct_output_amount)
            .unwrap_or(U256::ZERO);
        let compact = Compact {
            arbiter: entry.arbiter,
            tribunal: entry.tribunal,
            sponsor: request.sponsor.0,
            expires: U256::from(
                request
                    .context
                    .claim_expires
                    .unwrap_or_else(default_claim_expires),
            ),
            id: compact_id.0,
            amount: request.input_amount,
            maximum_amount,
            mandate,
        };

        Ok(QuoteResult {
            amounts,
            compact,
            witness_hash,
        })
    }

    async fn spot_amount(
        &self,
        input_token: Token,
        input_amount: U256,
        output_token: Token,
    ) -> Option<U256> {
        let input_info = self.oracle.token_info(input_token).await.ok()?;
        let output_info = self.oracle.token_info(output_token).await.ok()?;
        let (price_in, price_out) = tokio::join!(
            self.oracle.usd_price(input_token),
            self.oracle.usd_price(output_token),
        );
        let price_in = price_in.ok()?.0;
        let price_out = price_out.ok()?.0;
        if price_out.is_zero() {
            return None;
        }

        let scale_in = U256::from(10u64).pow(U256::from(input_info.decimals));
        let scale_out = U256::from(10u64).pow(U256::from(output_info.decimals));

        Some(input_amount * price_in * scale_out / (scale_in * price_out))
    }

    async fn route(
        &self,
        input_token: Token,
        output_token: Token,
        amount_in: TokenAmount,
    ) -> Option<RouteLegs> {
        let native_in = input_token.is_native();
        let native_out = output_token.is_native();

        let native_src = Token {
            chain_id: input_token.chain_id,
            address: Address::ZERO,
        };
        let native_dst = Token {
            chain_id: output_token.chain_id,
            address: Address::ZERO,
        };

        let (kind, intermediate) = match (native_in, native_out) {
            (false, false) => {
                let intermediate = self
                    .router
                    .quote_leg(input_token, native_src, amount_in)
                    .await
                    .inspect_err(|err| warn!(?err, "input-side routing leg failed"))
                    .ok()?;
                (RouteKind::BothErc20, intermediate)
            }
            (true, false) => (RouteKind::NativeIn, amount_in),
            (false, true) => {
                let intermediate = self
                    .router
                    .quote_leg(input_token, native_src, amount_in)
                    .await
                    .inspect_err(|err| warn!(?err, "input-side routing leg failed"))
                    .ok()?;
                (RouteKind::NativeOut, intermediate)
            }
            (true, true) => (RouteKind::BothNative, amount_in),
        };

        let direct = match kind {
            RouteKind::NativeOut => intermediate,
            RouteKind::BothNative => intermediate,
            _ => self
                .router
                .quote_leg(native_dst, output_token, intermediate)
                .await
                .inspect_err(|err| warn!(?err, "output-side routing leg failed"))
                .ok()?,
        };

        Some(RouteLegs {
            kind,
            intermediate,
            direct,
        })
    }

    async fn requote_net(
        &self,
        output_token: Token,
        legs: &RouteLegs,
        dispensation: U256,
    ) -> Option<TokenAmount> {
        let native_dst = Token {
            chain_id: output_token.chain_id,
            address: Address::ZERO,
        };
        let net_intermediate = legs.intermediate.checked_sub(TokenAmount(dispensation))?;
        self.router
            .quote_leg(native_dst, output_token, net_intermediate)
            .await
            .ok()
    }

    async fn simulate_dispensation(
        &self,
        dest_chain_id: ChainId,
        entry: &ArbiterEntry,
        compact_id: CompactId,
        mandate: &crate::domain::mandate::Mandate,
        claimant: Address,
    ) -> Option<U256> {
        self.tribunal
            .simulate_dispensation(
                dest_chain_id,
                entry.tribunal,
                alloy::primitives::B256::from(compact_id.0.to_be_bytes::<32>()),
                mandate,
                claimant.0,
            )
            .await
            .inspect_err(|err| warn!(?err, "tribunal dispensation simulation failed"))
            .ok()
    }

    async fn dispensation_usd(&self, dispensation: U256) -> Option<f64> {
        let eth = Token {
            chain_id: 1,
            address: Address::ZERO,
        };
        let eth_usd = self.oracle.usd_price(eth).await.ok()?.0;
        let numerator = dispensation.checked_mul(eth_usd)?;
        let scaled = numerator / U256::from(10u64).pow(U256::from(18u64));
        Some(u256_to_f64(scaled) / 1e18)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum RouteKind {
    BothErc20,
    NativeIn,
    NativeOut,
    BothNative,
}

struct RouteLegs {
    kind: RouteKind,
    intermediate: TokenAmount,
    direct: TokenAmount,
}

fn random_salt() -> alloy::primitives::B256 {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    alloy::primitives::B256::from(bytes)
}

fn default_fill_expires() -> u64 {
    now_unix() + 3600
}

fn default_claim_expires() -> u64 {
    now_unix() + 7200
}

fn now_unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn u256_to_f64(value: U256) -> f64 {
    let bytes = value.to_be_bytes::<32>();
    let mut result = 0f64;
    for byte in bytes {
        result = result * 256.0 + f64::from(byte);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u256_to_f64_round_trips_small_values() {
        assert_eq!(u256_to_f64(U256::from(0u64)), 0.0);
        assert_eq!(u256_to_f64(U256::from(1_000_000u64)), 1_000_000.0);
    }

    #[test]
    fn default_claim_expires_is_after_default_fill_expires() {
        assert!(default_claim_expires() > default_fill_expires());
    }

    #[test]
    fn random_salt_is_not_fixed() {
        assert_ne!(random_salt(), random_salt());
    }
}
