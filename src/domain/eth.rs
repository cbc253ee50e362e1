//! Primitive on-chain types shared across the quote pipeline.
//!
//! Mirrors the newtype-over-`alloy::primitives` style used for the
//! settlement-side domain types: thin wrappers with `From`/`Into` and just
//! enough arithmetic to keep call sites readable.

use {
    alloy::primitives::{Address as AlloyAddress, U256},
    derive_more::{Display, From, Into},
};

/// A chain identifier, e.g. `1` for Ethereum mainnet, `8453` for Base.
pub type ChainId = u64;

/// An EVM address.
#[derive(Debug, Display, Clone, Copy, Eq, PartialEq, Hash, From, Into)]
pub struct Address(pub AlloyAddress);

impl Address {
    pub const ZERO: Address = Address(AlloyAddress::ZERO);

    pub fn is_native(&self) -> bool {
        self.0 == AlloyAddress::ZERO
    }
}

/// A token identified by the chain it lives on and its contract address.
/// The zero address denotes the chain's native token.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Token {
    pub chain_id: ChainId,
    pub address: Address,
}

impl Token {
    pub fn is_native(&self) -> bool {
        self.address.is_native()
    }
}

/// An amount of a token, expressed in its own base units (no implied
/// decimals).
#[derive(Debug, Default, Display, Clone, Copy, Ord, Eq, PartialOrd, PartialEq, From, Into)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(U256::ZERO);

    /// Saturating subtraction; returns `ZERO` rather than panicking or
    /// wrapping when `rhs` exceeds `self`.
    pub fn saturating_sub(self, rhs: TokenAmount) -> TokenAmount {
        TokenAmount(self.0.saturating_sub(rhs.0))
    }

    pub fn checked_sub(self, rhs: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_sub(rhs.0).map(TokenAmount)
    }

    pub fn checked_add(self, rhs: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(rhs.0).map(TokenAmount)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

/// A USD-denominated price, fixed point with 18 decimals (i.e. "wei-scaled"
/// the way an 18-decimal ERC20 amount would be).
#[derive(Debug, Default, Display, Clone, Copy, Ord, Eq, PartialOrd, PartialEq, From, Into)]
pub struct UsdPrice(pub U256);

impl UsdPrice {
    pub const ONE: UsdPrice = UsdPrice(U256::from_limbs([0x0de0b6b3a7640000, 0, 0, 0]));
}

/// A signed 256-bit magnitude, used for the one quantity in the response
/// that can go negative: the delta between the routed and spot amounts.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SignedAmount {
    pub negative: bool,
    pub magnitude: U256,
}

impl SignedAmount {
    pub fn of(minuend: U256, subtrahend: U256) -> Self {
        if minuend >= subtrahend {
            Self {
                negative: false,
                magnitude: minuend - subtrahend,
            }
        } else {
            Self {
                negative: true,
                magnitude: subtrahend - minuend,
            }
        }
    }

    pub fn is_positive(&self) -> bool {
        !self.negative && self.magnitude > U256::ZERO
    }
}

impl std::fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negative && self.magnitude > U256::ZERO {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

/// A basis-points fraction in `0..=10_000`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Bips(u16);

impl Bips {
    pub const DENOMINATOR: u64 = 10_000;

    pub fn new(value: u16) -> Self {
        Self(value.min(10_000))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Applies `amount * (10_000 - self) / 10_000`, i.e. the amount that
    /// remains after subtracting this many basis points of slippage.
    pub fn apply_shortfall(self, amount: TokenAmount) -> TokenAmount {
        let remaining = Self::DENOMINATOR - u64::from(self.0);
        TokenAmount(amount.0 * U256::from(remaining) / U256::from(Self::DENOMINATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_one_percent_slippage_matches_the_reference_scenario() {
        let direct = TokenAmount(U256::from(1_000_000_000_000_000_000u128));
        let minimum = Bips::new(100).apply_shortfall(direct);
        assert_eq!(minimum.0, U256::from(990_000_000_000_000_000u128));
    }

    #[test]
    fn zero_bips_is_a_no_op() {
        let direct = TokenAmount(U256::from(12_345u64));
        assert_eq!(Bips::new(0).apply_shortfall(direct), direct);
    }

    #[test]
    fn shortfall_is_monotonically_non_increasing_in_bips() {
        let direct = TokenAmount(U256::from(1_000_000u64));
        let mut previous = direct.0;
        for bips in 0..=10_000u16 {
            let current = Bips::new(bips).apply_shortfall(direct).0;
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn signed_amount_tracks_sign_of_net_minus_spot() {
        let positive = SignedAmount::of(U256::from(110u64), U256::from(100u64));
        assert!(positive.is_positive());
        assert_eq!(positive.to_string(), "10");

        let negative = SignedAmount::of(U256::from(90u64), U256::from(100u64));
        assert!(!negative.is_positive());
        assert_eq!(negative.to_string(), "-10");
    }
}
