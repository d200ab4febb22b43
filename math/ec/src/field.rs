// Copyright (c) 2024 Botho Foundation

//! GF(p): a quotient ring narrowed to odd moduli, with the parity helper
//! point compression wants.

use crate::{Error, ZmRing};
use alloc::vec::Vec;
use core::ops::Deref;
use stb_bignum::Word;
use subtle::Choice;

/// A prime field descriptor. Construction enforces an odd modulus above
/// one; primality itself is the business of the group-safety checks,
/// which probe it with Rabin–Miller where it matters.
#[derive(Clone, Debug)]
pub struct PrimeField {
    ring: ZmRing,
}

impl PrimeField {
    /// Build GF(p) from the little-endian encoding of `p`.
    pub fn new(p_bytes: &[u8]) -> Result<Self, Error> {
        if p_bytes.is_empty() || p_bytes[0] & 1 == 0 {
            return Err(Error::BadParams);
        }
        let ring = ZmRing::new(p_bytes)?;
        Ok(Self { ring })
    }

    /// Parity of the plain value of `a` — the "sign" bit used when a
    /// coordinate must be pinned down to one of ±y.
    pub fn is_odd(&self, a: &[Word]) -> Choice {
        let plain = self.ring.to_plain(a);
        Choice::from((plain[0] & 1) as u8)
    }

    /// The plain value `p - 3`, for fast-path detection on curves.
    pub fn p_minus_3(&self) -> Vec<Word> {
        let mut t = self.ring.modulus().to_vec();
        let borrow = stb_bignum::zz::sub_word(&mut t, 3);
        debug_assert_eq!(borrow, 0);
        t
    }
}

impl Deref for PrimeField {
    type Target = ZmRing;

    fn deref(&self) -> &ZmRing {
        &self.ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_even_moduli() {
        assert!(PrimeField::new(&[4]).is_err());
        assert!(PrimeField::new(&[7]).is_ok());
    }

    #[test]
    fn parity_reads_plain_value() {
        let f = PrimeField::new(&[23]).unwrap();
        let three = f.from_bytes(&[3]).unwrap();
        let four = f.from_bytes(&[4]).unwrap();
        assert!(bool::from(f.is_odd(&three)));
        assert!(!bool::from(f.is_odd(&four)));
    }
}
