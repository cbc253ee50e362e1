//! Token metadata as looked up from the price oracle, never trusted from the
//! caller.

use crate::domain::eth::Token;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TokenInfo {
    pub decimals: u8,
    pub symbol: String,
}

impl TokenInfo {
    /// The metadata used for the zero address, which denotes a chain's
    /// native asset.
    pub fn native() -> Self {
        Self {
            decimals: 18,
            symbol: "ETH".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TokenKey {
    pub chain_id: u64,
    pub address: alloy::primitives::Address,
}

impl From<Token> for TokenKey {
    fn from(token: Token) -> Self {
        Self {
            chain_id: token.chain_id,
            address: token.address.0,
        }
    }
}
