//! Packs the four logical lock parameters into the 256-bit compact id.
//!
//! Layout, high bit first:
//! ```text
//! bit   255      : !isMultichain
//! bits  254..252 : resetPeriod (3 bits)
//! bits  251..160 : allocatorId (92 bits)
//! bits  159..0   : inputToken  (160 bits, the low 160 bits of the address)
//! ```

use alloy::primitives::{Address, U256};

const RESET_PERIOD_BITS: u32 = 3;
const ALLOCATOR_ID_BITS: u32 = 92;
const ADDRESS_BITS: u32 = 160;

const RESET_PERIOD_SHIFT: u32 = ADDRESS_BITS + ALLOCATOR_ID_BITS; // 252
const MULTICHAIN_SHIFT: u32 = RESET_PERIOD_SHIFT + RESET_PERIOD_BITS; // 255
const ALLOCATOR_ID_SHIFT: u32 = ADDRESS_BITS; // 160

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Reset period must be between 0 and 7")]
    ResetPeriodOutOfRange,
    #[error("Allocator id does not fit in 92 bits")]
    AllocatorIdOverflow,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LockParameters {
    pub allocator_id: U256,
    pub reset_period: u8,
    pub is_multichain: bool,
}

impl LockParameters {
    pub fn validate(&self) -> Result<(), Error> {
        if self.reset_period > 7 {
            return Err(Error::ResetPeriodOutOfRange);
        }
        if self.allocator_id >> ALLOCATOR_ID_BITS != U256::ZERO {
            return Err(Error::AllocatorIdOverflow);
        }
        Ok(())
    }
}

/// A packed 256-bit compact id.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CompactId(pub U256);

impl CompactId {
    pub fn pack(lock: &LockParameters, input_token: Address) -> Result<Self, Error> {
        lock.validate()?;

        let multichain_bit = if lock.is_multichain {
            U256::ZERO
        } else {
            U256::ONE << MULTICHAIN_SHIFT
        };
        let reset_period = U256::from(lock.reset_period) << RESET_PERIOD_SHIFT;
        let allocator_id = lock.allocator_id << ALLOCATOR_ID_SHIFT;
        let token_bits = U256::from_be_slice(input_token.as_slice());

        Ok(Self(multichain_bit | reset_period | allocator_id | token_bits))
    }

    pub fn unpack(self) -> (LockParameters, Address) {
        let is_multichain = (self.0 >> MULTICHAIN_SHIFT) & U256::ONE == U256::ZERO;
        let reset_period = ((self.0 >> RESET_PERIOD_SHIFT) & U256::from(0b111u8)).to::<u8>();
        let allocator_mask = (U256::ONE << ALLOCATOR_ID_BITS) - U256::ONE;
        let allocator_id = (self.0 >> ALLOCATOR_ID_SHIFT) & allocator_mask;
        let address_mask = (U256::ONE << ADDRESS_BITS) - U256::ONE;
        let token_bits = self.0 & address_mask;
        let address = Address::from_slice(&token_bits.to_be_bytes::<32>()[12..]);

        (
            LockParameters {
                allocator_id,
                reset_period,
                is_multichain,
            },
            address,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(is_multichain: bool, reset_period: u8, allocator_id: u64) -> (LockParameters, Address) {
        (
            LockParameters {
                allocator_id: U256::from(allocator_id),
                reset_period,
                is_multichain,
            },
            Address::from([0xAB; 20]),
        )
    }

    #[test]
    fn round_trips_all_field_combinations() {
        for is_multichain in [true, false] {
            for reset_period in 0..=7u8 {
                let (lock, token) = sample(is_multichain, reset_period, 123_456_789);
                let id = CompactId::pack(&lock, token).unwrap();
                let (unpacked_lock, unpacked_token) = id.unpack();
                assert_eq!(unpacked_lock, lock);
                assert_eq!(unpacked_token, token);
            }
        }
    }

    #[test]
    fn high_bit_is_inverted_multichain_flag() {
        let (lock, token) = sample(true, 0, 0);
        let id = CompactId::pack(&lock, token).unwrap();
        assert_eq!(id.0 >> 255, U256::ZERO);

        let (lock, token) = sample(false, 0, 0);
        let id = CompactId::pack(&lock, token).unwrap();
        assert_eq!(id.0 >> 255, U256::ONE);
    }

    #[test]
    fn rejects_out_of_range_reset_period() {
        let (lock, _) = sample(true, 8, 0);
        assert!(matches!(lock.validate(), Err(Error::ResetPeriodOutOfRange)));
    }

    #[test]
    fn rejects_allocator_id_overflow() {
        let lock = LockParameters {
            allocator_id: U256::ONE << 92,
            reset_period: 0,
            is_multichain: true,
        };
        assert!(matches!(lock.validate(), Err(Error::AllocatorIdOverflow)));
    }
}
