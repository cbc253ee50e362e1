//! The destination-side mandate and the compact that embeds it.

use {
    alloy::primitives::{Address, B256, U256},
    alloy_dyn_abi::DynSolValue,
    std::collections::HashMap,
};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Mandate {
    pub chain_id: U256,
    pub tribunal: Address,
    pub recipient: Address,
    pub expires: U256,
    pub token: Address,
    pub minimum_amount: U256,
    pub baseline_priority_fee: U256,
    pub scaling_factor: U256,
    pub salt: B256,
}

impl Mandate {
    /// Exposes every field by name so the witness codec can resolve them
    /// generically against whatever type string the registry entry
    /// declares, instead of this type special-casing a fixed struct shape.
    pub fn as_field_map(&self) -> HashMap<String, DynSolValue> {
        HashMap::from([
            ("chainId".to_owned(), DynSolValue::Uint(self.chain_id, 256)),
            ("tribunal".to_owned(), DynSolValue::Address(self.tribunal)),
            ("recipient".to_owned(), DynSolValue::Address(self.recipient)),
            ("expires".to_owned(), DynSolValue::Uint(self.expires, 256)),
            ("token".to_owned(), DynSolValue::Address(self.token)),
            (
                "minimumAmount".to_owned(),
                DynSolValue::Uint(self.minimum_amount, 256),
            ),
            (
                "baselinePriorityFee".to_owned(),
                DynSolValue::Uint(self.baseline_priority_fee, 256),
            ),
            (
                "scalingFactor".to_owned(),
                DynSolValue::Uint(self.scaling_factor, 256),
            ),
            ("salt".to_owned(), DynSolValue::FixedBytes(self.salt, 32)),
        ])
    }
}

/// The full claim payload a sponsor signs. `nonce` is always absent on the
/// wire (serialized as JSON `null`): the arbiter assigns it at claim time.
#[derive(Debug, Clone)]
pub struct Compact {
    pub arbiter: Address,
    pub tribunal: Address,
    pub sponsor: Address,
    pub expires: U256,
    pub id: U256,
    pub amount: U256,
    pub maximum_amount: U256,
    pub mandate: Mandate,
}
