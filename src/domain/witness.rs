//! Parses the arbiter registry's witness-type-string grammar and computes
//! EIP-712 type hashes and struct hashes against it.
//!
//! Grammar (see the registry's type strings):
//! ```text
//! TypeString  = Declaration ")" Definition
//! Declaration = StructName " " VariableName
//! Definition  = StructName "(" ParamList ")"
//! ParamList   = Param ("," Param)*
//! Param       = SolidityType " " FieldName
//! ```
//!
//! The codec never hard-codes the `Mandate` shape: every field name and type
//! is read from the registry's own type string, then matched against a
//! caller-supplied field map at struct-hash time.

use {
    alloy_dyn_abi::{DynSolType, DynSolValue},
    std::collections::HashMap,
    tiny_keccak::{Hasher, Keccak},
};

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("witness type string must split into exactly two non-empty parts on ')'")]
    MalformedTypeString,
    #[error("declaration struct name does not match definition struct name")]
    StructNameMismatch,
    #[error("declaration is missing a variable name")]
    MissingVariableName,
    #[error("param `{0}` is not of the form `<type> <name>`")]
    MalformedParam(String),
    #[error("unknown solidity type `{0}`")]
    UnknownSolidityType(String),
    #[error("mandate is missing field `{0}` required by the witness type string")]
    MissingWitnessField(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Param {
    pub sol_type: String,
    pub name: String,
}

/// A parsed witness-type-string.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WitnessTypeString {
    pub struct_name: String,
    pub variable_name: String,
    pub params: Vec<Param>,
}

impl WitnessTypeString {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let parts: Vec<&str> = raw.split(')').filter(|part| !part.is_empty()).collect();
        let [declaration, definition] = parts[..] else {
            return Err(Error::MalformedTypeString);
        };

        let mut decl_tokens = declaration.trim().splitn(2, ' ');
        let decl_struct_name = decl_tokens.next().unwrap_or_default();
        let variable_name = decl_tokens
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(Error::MissingVariableName)?;

        let open_paren = definition
            .find('(')
            .ok_or(Error::MalformedTypeString)?;
        let def_struct_name = definition[..open_paren].trim();
        let param_list = &definition[open_paren + 1..];

        if decl_struct_name != def_struct_name {
            return Err(Error::StructNameMismatch);
        }

        let params = param_list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|param| {
                let param = param.trim();
                let (sol_type, name) = param
                    .rsplit_once(' ')
                    .ok_or_else(|| Error::MalformedParam(param.to_owned()))?;
                Ok(Param {
                    sol_type: sol_type.trim().to_owned(),
                    name: name.trim().to_owned(),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            struct_name: decl_struct_name.to_owned(),
            variable_name: variable_name.to_owned(),
            params,
        })
    }

    /// `StructName(type0 field0,type1 field1,...)`, the canonical string
    /// whose keccak256 is the EIP-712 type hash.
    pub fn canonical(&self) -> String {
        let joined = self
            .params
            .iter()
            .map(|p| format!("{} {}", p.sol_type, p.name))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({joined})", self.struct_name)
    }

    pub fn type_hash(&self) -> [u8; 32] {
        keccak256(self.canonical().as_bytes())
    }

    /// Computes `keccak256(typeHash ‖ abi_encode(types, values))` against a
    /// caller-supplied field map, resolving each field's Solidity type from
    /// this witness string rather than any fixed schema.
    pub fn struct_hash(&self, fields: &HashMap<String, DynSolValue>) -> Result<[u8; 32], Error> {
        let type_hash = self.type_hash();

        let mut encoded = Vec::with_capacity(32 * (self.params.len() + 1));
        encoded.extend_from_slice(&type_hash);

        for param in &self.params {
            let value = fields
                .get(&param.name)
                .ok_or_else(|| Error::MissingWitnessField(param.name.clone()))?;
            let sol_type = DynSolType::parse(&param.sol_type)
                .map_err(|_| Error::UnknownSolidityType(param.sol_type.clone()))?;
            if !sol_type.matches(value) {
                return Err(Error::UnknownSolidityType(param.sol_type.clone()));
            }
            encoded.extend_from_slice(&value.abi_encode());
        }

        Ok(keccak256(&encoded))
    }
}

fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(bytes);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANDATE_TYPE_STRING: &str = "Mandate mandate)Mandate(uint256 chainId,address \
                                        tribunal,address recipient,uint256 expires,address \
                                        token,uint256 minimumAmount,uint256 \
                                        baselinePriorityFee,uint256 scalingFactor,bytes32 salt)";

    #[test]
    fn parses_the_reference_mandate_type_string() {
        let parsed = WitnessTypeString::parse(MANDATE_TYPE_STRING).unwrap();
        assert_eq!(parsed.struct_name, "Mandate");
        assert_eq!(parsed.variable_name, "mandate");
        assert_eq!(parsed.params.len(), 9);
        assert_eq!(parsed.params[0].sol_type, "uint256");
        assert_eq!(parsed.params[0].name, "chainId");
        assert_eq!(parsed.params.last().unwrap().name, "salt");
    }

    #[test]
    fn canonical_round_trips_into_definition_shape() {
        let parsed = WitnessTypeString::parse(MANDATE_TYPE_STRING).unwrap();
        assert_eq!(
            parsed.canonical(),
            "Mandate(uint256 chainId,address tribunal,address recipient,uint256 expires,address \
             token,uint256 minimumAmount,uint256 baselinePriorityFee,uint256 scalingFactor,\
             bytes32 salt)"
        );
    }

    #[test]
    fn rejects_mismatched_struct_names() {
        let bad = "Mandate mandate)Other(uint256 chainId)";
        assert_eq!(
            WitnessTypeString::parse(bad),
            Err(Error::StructNameMismatch)
        );
    }

    #[test]
    fn rejects_missing_variable_name() {
        let bad = "Mandate)Mandate(uint256 chainId)";
        assert_eq!(
            WitnessTypeString::parse(bad),
            Err(Error::MissingVariableName)
        );
    }

    #[test]
    fn struct_hash_changes_when_salt_changes() {
        let parsed = WitnessTypeString::parse(MANDATE_TYPE_STRING).unwrap();
        let mut fields = HashMap::new();
        fields.insert(
            "chainId".to_owned(),
            DynSolValue::Uint(alloy::primitives::U256::from(10u64), 256),
        );
        fields.insert(
            "tribunal".to_owned(),
            DynSolValue::Address(alloy::primitives::Address::ZERO),
        );
        fields.insert(
            "recipient".to_owned(),
            DynSolValue::Address(alloy::primitives::Address::ZERO),
        );
        fields.insert(
            "expires".to_owned(),
            DynSolValue::Uint(alloy::primitives::U256::from(1u64), 256),
        );
        fields.insert(
            "token".to_owned(),
            DynSolValue::Address(alloy::primitives::Address::ZERO),
        );
        fields.insert(
            "minimumAmount".to_owned(),
            DynSolValue::Uint(alloy::primitives::U256::from(1u64), 256),
        );
        fields.insert(
            "baselinePriorityFee".to_owned(),
            DynSolValue::Uint(alloy::primitives::U256::ZERO, 256),
        );
        fields.insert(
            "scalingFactor".to_owned(),
            DynSolValue::Uint(alloy::primitives::U256::from(1u64), 256),
        );
        fields.insert("salt".to_owned(), DynSolValue::FixedBytes(Default::default(), 32));

        let hash_a = parsed.struct_hash(&fields).unwrap();

        fields.insert(
            "salt".to_owned(),
            DynSolValue::FixedBytes(alloy::primitives::B256::repeat_byte(1), 32),
        );
        let hash_b = parsed.struct_hash(&fields).unwrap();

        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn struct_hash_fails_when_field_missing() {
        let parsed = WitnessTypeString::parse(MANDATE_TYPE_STRING).unwrap();
        let fields = HashMap::new();
        assert_eq!(
            parsed.struct_hash(&fields),
            Err(Error::MissingWitnessField("chainId".to_owned()))
        );
    }
}
