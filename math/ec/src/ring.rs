// Copyright (c) 2024 Botho Foundation

//! The quotient ring descriptor.
//!
//! Residues are `n`-word vectors in an internal form the caller never
//! inspects: Montgomery form for the Montgomery-backed strategies, plain
//! form for Barrett. Multiplication and squaring always take the
//! constant-time reduction; the ring is shared by public and secret
//! data alike and the cost difference does not justify two code paths
//! at every call site.

use crate::Error;
use alloc::vec;
use alloc::vec::Vec;
use rand_core::CryptoRngCore;
use stb_bignum::{word, ww, zz, Word};
use subtle::Choice;

/// Reduction strategy, fixed at construction.
#[derive(Clone, Debug)]
enum Reduction {
    /// Barrett with precomputed reciprocal; plain-form residues.
    Barrett { mu: Vec<Word> },
    /// Dussé–Kaliski Montgomery; residues carry the 2^(64n) factor.
    Montgomery { m_star: Word, r2: Vec<Word> },
    /// Montgomery fused with the Crandall fold for odd `2^(64n) - c`.
    CrandallMontgomery { c: Word, m_star: Word, r2: Vec<Word> },
}

/// A ring Z/(m) with its modulus, byte width and reduction strategy.
#[derive(Clone, Debug)]
pub struct ZmRing {
    m: Vec<Word>,
    no: usize,
    unity: Vec<Word>,
    reduction: Reduction,
}

impl ZmRing {
    /// Build a ring over the modulus given as a little-endian byte
    /// string of exactly the ring's external width. The modulus must be
    /// greater than one and use its top byte (so the byte width is the
    /// canonical one).
    pub fn new(mod_bytes: &[u8]) -> Result<Self, Error> {
        let no = mod_bytes.len();
        if no == 0 || mod_bytes[no - 1] == 0 {
            return Err(Error::BadParams);
        }
        let n = no.div_ceil(stb_bignum::WORD_BYTES);
        let mut m = vec![0 as Word; n];
        ww::from_le_bytes(&mut m, mod_bytes);
        if ww::bit_size(&m) < 2 {
            return Err(Error::BadParams);
        }

        // m = 2^(64n) - c exactly when every word above the lowest is
        // all-ones
        let is_crandall = n >= 2 && m[1..].iter().all(|&w| w == Word::MAX) && m[0] != 0;
        let reduction = if m[0] & 1 == 1 {
            if is_crandall {
                Reduction::CrandallMontgomery {
                    c: m[0].wrapping_neg(),
                    m_star: word::neg_inv(m[0]),
                    r2: zz::mont_r2(&m),
                }
            } else {
                Reduction::Montgomery {
                    m_star: word::neg_inv(m[0]),
                    r2: zz::mont_r2(&m),
                }
            }
        } else {
            Reduction::Barrett {
                mu: zz::barrett_mu(&m),
            }
        };

        let mut ring = Self {
            m,
            no,
            unity: Vec::new(),
            reduction,
        };
        let mut one = vec![0 as Word; n];
        one[0] = 1;
        ring.unity = ring.to_internal(&one);
        Ok(ring)
    }

    /// Word length of residues.
    #[inline]
    pub fn n(&self) -> usize {
        self.m.len()
    }

    /// Byte length of the external encoding.
    #[inline]
    pub fn no(&self) -> usize {
        self.no
    }

    /// The modulus in plain little-endian words.
    #[inline]
    pub fn modulus(&self) -> &[Word] {
        &self.m
    }

    /// The residue representing one.
    #[inline]
    pub fn unity(&self) -> &[Word] {
        &self.unity
    }

    /// Zero residue.
    pub fn zero(&self) -> Vec<Word> {
        vec![0; self.n()]
    }

    fn reduce_ct(&self, wide: &mut [Word]) {
        match &self.reduction {
            Reduction::Barrett { mu } => zz::red_barrett_ct(wide, &self.m, mu),
            Reduction::Montgomery { m_star, .. } => zz::red_mont_ct(wide, &self.m, *m_star),
            Reduction::CrandallMontgomery { c, m_star, .. } => {
                zz::red_crand_mont_ct(wide, &self.m, *c, *m_star)
            }
        }
    }

    /// Map a plain (already reduced) value into internal form.
    pub fn to_internal(&self, plain: &[Word]) -> Vec<Word> {
        let n = self.n();
        debug_assert!(bool::from(ww::lt_ct(plain, &self.m)));
        match &self.reduction {
            Reduction::Barrett { .. } => plain.to_vec(),
            Reduction::Montgomery { r2, .. } | Reduction::CrandallMontgomery { r2, .. } => {
                let mut wide = vec![0 as Word; 2 * n];
                zz::mul(&mut wide, plain, r2);
                self.reduce_ct(&mut wide);
                wide.truncate(n);
                wide
            }
        }
    }

    /// Map an internal residue back to its plain value.
    pub fn to_plain(&self, a: &[Word]) -> Vec<Word> {
        let n = self.n();
        match &self.reduction {
            Reduction::Barrett { .. } => a.to_vec(),
            Reduction::Montgomery { .. } | Reduction::CrandallMontgomery { .. } => {
                let mut wide = vec![0 as Word; 2 * n];
                wide[..n].copy_from_slice(a);
                self.reduce_ct(&mut wide);
                wide.truncate(n);
                wide
            }
        }
    }

    /// Decode a little-endian byte string of width [`Self::no`]; rejects
    /// values outside `[0, m)`.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Vec<Word>, Error> {
        if bytes.len() != self.no {
            return Err(Error::BadElement);
        }
        let mut plain = vec![0 as Word; self.n()];
        ww::from_le_bytes(&mut plain, bytes);
        if !bool::from(ww::lt_ct(&plain, &self.m)) {
            return Err(Error::BadElement);
        }
        Ok(self.to_internal(&plain))
    }

    /// Encode a residue as little-endian bytes of width [`Self::no`].
    pub fn to_bytes(&self, a: &[Word]) -> Vec<u8> {
        let plain = self.to_plain(a);
        let mut out = vec![0u8; self.no];
        ww::to_le_bytes(&mut out, &plain);
        out
    }

    /// `c = a + b`.
    pub fn add(&self, c: &mut [Word], a: &[Word], b: &[Word]) {
        zz::mod_add(c, a, b, &self.m);
    }

    /// `c = a - b`.
    pub fn sub(&self, c: &mut [Word], a: &[Word], b: &[Word]) {
        zz::mod_sub(c, a, b, &self.m);
    }

    /// `c = -a`.
    pub fn neg(&self, c: &mut [Word], a: &[Word]) {
        zz::mod_neg(c, a, &self.m);
    }

    /// `c = 2a`.
    pub fn double(&self, c: &mut [Word], a: &[Word]) {
        zz::mod_double(c, a, &self.m);
    }

    /// `c = a / 2` (odd moduli only).
    pub fn half(&self, c: &mut [Word], a: &[Word]) {
        debug_assert!(self.m[0] & 1 == 1);
        zz::mod_half(c, a, &self.m);
    }

    /// `c = a · b`, constant time.
    pub fn mul(&self, c: &mut [Word], a: &[Word], b: &[Word]) {
        let n = self.n();
        let mut wide = vec![0 as Word; 2 * n];
        zz::mul(&mut wide, a, b);
        self.reduce_ct(&mut wide);
        c.copy_from_slice(&wide[..n]);
    }

    /// `c = a²`, constant time.
    pub fn sqr(&self, c: &mut [Word], a: &[Word]) {
        let n = self.n();
        let mut wide = vec![0 as Word; 2 * n];
        zz::sqr(&mut wide, a);
        self.reduce_ct(&mut wide);
        c.copy_from_slice(&wide[..n]);
    }

    /// `c = a^(-1)`; false when `a` is not invertible (`c` zeroed).
    /// Variable time in the value of `a`.
    pub fn inv(&self, c: &mut [Word], a: &[Word]) -> bool {
        let n = self.n();
        let mut raw = vec![0 as Word; n];
        if !zz::inv_mod(&mut raw, a, &self.m) {
            ww::set_zero(c);
            return false;
        }
        // the inverse of the internal image needs the scale restored:
        // for Montgomery forms (aR)^-1 · R² · R^(-1) · ... lands on a^(-1)R
        match &self.reduction {
            Reduction::Barrett { .. } => c.copy_from_slice(&raw),
            Reduction::Montgomery { r2, .. } | Reduction::CrandallMontgomery { r2, .. } => {
                let mut t = vec![0 as Word; n];
                let r2 = r2.clone();
                self.mul(&mut t, &raw, &r2);
                self.mul(c, &t, &r2);
            }
        }
        true
    }

    /// `y = a^e` for a public exponent in plain words.
    pub fn pow(&self, y: &mut [Word], a: &[Word], e: &[Word]) {
        let n = self.n();
        let mut acc = self.unity.clone();
        let mut t = vec![0 as Word; n];
        for i in (0..ww::bit_size(e)).rev() {
            self.sqr(&mut t, &acc);
            acc.copy_from_slice(&t);
            if ww::test_bit(e, i) {
                self.mul(&mut t, &acc, a);
                acc.copy_from_slice(&t);
            }
        }
        y.copy_from_slice(&acc);
    }

    /// Constant-time zero test.
    pub fn is_zero(&self, a: &[Word]) -> Choice {
        ww::is_zero_ct(a)
    }

    /// Constant-time equality of residues.
    pub fn equal(&self, a: &[Word], b: &[Word]) -> Choice {
        ww::eq_ct(a, b)
    }

    /// Uniform residue in internal form; the Montgomery scale preserves
    /// uniformity so the raw sample is used directly.
    pub fn rand(&self, rng: &mut dyn CryptoRngCore) -> Result<Vec<Word>, Error> {
        let mut r = vec![0 as Word; self.n()];
        if zz::rand_mod(&mut r, &self.m, rng) {
            Ok(r)
        } else {
            Err(Error::Rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn ring_bytes(rng: &mut ChaCha20Rng, no: usize, parity: bool) -> Vec<u8> {
        let mut b = vec![0u8; no];
        rng.fill(&mut b[..]);
        b[0] |= parity as u8;
        if !parity {
            b[0] &= !1;
        }
        if b[no - 1] == 0 {
            b[no - 1] = 1;
        }
        b
    }

    #[test]
    fn roundtrip_and_axioms_all_strategies() {
        let mut rng = ChaCha20Rng::seed_from_u64(51);
        let mut moduli: Vec<Vec<u8>> = Vec::new();
        moduli.push(ring_bytes(&mut rng, 17, true)); // odd -> Montgomery
        moduli.push(ring_bytes(&mut rng, 24, false)); // even -> Barrett
        // Crandall: 2^192 - 189
        let mut crand = vec![0xFFu8; 24];
        crand[0] = 0xFF - 188;
        moduli.push(crand);
        for mod_bytes in moduli {
            let ring = ZmRing::new(&mod_bytes).unwrap();
            let n = ring.n();
            for _ in 0..20 {
                let a = ring.rand(&mut rng).unwrap();
                let b = ring.rand(&mut rng).unwrap();
                // from(to(x)) == x
                let bytes = ring.to_bytes(&a);
                assert_eq!(ring.from_bytes(&bytes).unwrap(), a);
                // x + (-x) == 0
                let mut negated = vec![0 as Word; n];
                ring.neg(&mut negated, &a);
                let mut sum = vec![0 as Word; n];
                ring.add(&mut sum, &a, &negated);
                assert!(bool::from(ring.is_zero(&sum)));
                // unity · x == x
                let mut prod = vec![0 as Word; n];
                ring.mul(&mut prod, &a, ring.unity());
                assert_eq!(prod, a);
                // x · x^-1 == unity
                let mut inv = vec![0 as Word; n];
                if ring.inv(&mut inv, &a) {
                    ring.mul(&mut prod, &a, &inv);
                    assert_eq!(&prod, ring.unity());
                }
                // (a + b)·(a + b) == a² + 2ab + b²
                let mut ab = vec![0 as Word; n];
                ring.add(&mut ab, &a, &b);
                let mut lhs = vec![0 as Word; n];
                ring.sqr(&mut lhs, &ab);
                let mut a2 = vec![0 as Word; n];
                ring.sqr(&mut a2, &a);
                let mut b2 = vec![0 as Word; n];
                ring.sqr(&mut b2, &b);
                let mut t = vec![0 as Word; n];
                ring.mul(&mut t, &a, &b);
                let mut t2 = vec![0 as Word; n];
                ring.double(&mut t2, &t);
                let mut rhs = vec![0 as Word; n];
                ring.add(&mut rhs, &a2, &b2);
                let mut rhs2 = vec![0 as Word; n];
                ring.add(&mut rhs2, &rhs, &t2);
                assert_eq!(lhs, rhs2);
            }
        }
    }

    #[test]
    fn pow_matches_repeated_mul() {
        let mut rng = ChaCha20Rng::seed_from_u64(52);
        let ring = ZmRing::new(&ring_bytes(&mut rng, 9, true)).unwrap();
        let a = ring.rand(&mut rng).unwrap();
        let mut want = ring.unity().to_vec();
        for e in 0..20u64 {
            let mut got = ring.zero();
            ring.pow(&mut got, &a, &[e]);
            assert_eq!(got, want, "a^{e}");
            let mut next = ring.zero();
            ring.mul(&mut next, &want, &a);
            want = next;
        }
    }

    #[test]
    fn rejects_degenerate_moduli() {
        assert!(ZmRing::new(&[]).is_err());
        assert!(ZmRing::new(&[1, 0]).is_err()); // top byte zero
        assert!(ZmRing::new(&[1]).is_err()); // modulus one
        assert!(ZmRing::new(&[2]).is_ok());
    }
}
