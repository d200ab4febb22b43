// Copyright (c) 2024 Botho Foundation

//! Greatest common divisors, modular inversion and the Jacobi symbol.
//!
//! The extended algorithm is the binary one (HAC 14.61) with
//! signed-magnitude accumulators; division never appears. Timing depends
//! on operand values throughout this module — secret-value inversions in
//! the field layer go through Fermat exponentiation instead.

use crate::word::{Word, WORD_BITS};
use crate::ww;
use crate::zz;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// Signed magnitude helper local to the extended gcd.
#[derive(Clone)]
struct SInt {
    mag: Vec<Word>,
    neg: bool,
}

impl SInt {
    fn from_word(w: Word, len: usize) -> Self {
        let mut mag = vec![0; len];
        mag[0] = w;
        Self { mag, neg: false }
    }

    fn is_even(&self) -> bool {
        self.mag[0] & 1 == 0
    }

    fn halve(&mut self) {
        ww::shr(&mut self.mag, 1);
        if ww::is_zero(&self.mag) {
            self.neg = false;
        }
    }

    fn add(&mut self, other: &[Word], other_neg: bool) {
        if self.neg == other_neg {
            let carry = zz::add_assign(&mut self.mag, other);
            debug_assert_eq!(carry, 0, "accumulator sized for the worst case");
        } else if ww::cmp(&self.mag, other) == Ordering::Less {
            let mut t = other.to_vec();
            let borrow = zz::sub_assign(&mut t, &self.mag);
            debug_assert_eq!(borrow, 0);
            self.mag = t;
            self.neg = other_neg;
        } else {
            let borrow = zz::sub_assign(&mut self.mag, other);
            debug_assert_eq!(borrow, 0);
            if ww::is_zero(&self.mag) {
                self.neg = false;
            }
        }
    }

    fn sub(&mut self, other: &[Word], other_neg: bool) {
        self.add(other, !other_neg);
    }

    fn sub_signed(&mut self, other: &SInt) {
        self.add(&other.mag, !other.neg);
    }

    /// Non-negative residue mod `m` (assumes |self| < 2^k · m for small k).
    fn into_mod(mut self, m: &[Word]) -> Vec<Word> {
        let n = m.len();
        // fold the magnitude below m first
        let mut r = vec![0 as Word; n];
        let trimmed = ww::word_size(&self.mag).max(1);
        if trimmed <= n {
            self.mag.resize(n, 0);
            if ww::cmp(&self.mag, m) == Ordering::Less {
                r.copy_from_slice(&self.mag);
            } else {
                zz::rem(&mut r, &self.mag, m);
            }
        } else {
            zz::rem(&mut r, &self.mag[..trimmed], m);
        }
        if self.neg && !ww::is_zero(&r) {
            let mut t = m.to_vec();
            let _ = zz::sub_assign(&mut t, &r);
            r.copy_from_slice(&t);
        }
        r
    }
}

/// Binary gcd. Inputs need not be trimmed; the result is sized like the
/// larger input. gcd(0, b) = b.
pub fn gcd(a: &[Word], b: &[Word]) -> Vec<Word> {
    let len = a.len().max(b.len());
    let mut u = vec![0 as Word; len];
    u[..a.len()].copy_from_slice(a);
    let mut v = vec![0 as Word; len];
    v[..b.len()].copy_from_slice(b);
    if ww::is_zero(&u) {
        return v;
    }
    if ww::is_zero(&v) {
        return u;
    }
    let k = ww::trailing_zeros(&u).min(ww::trailing_zeros(&v));
    let su = ww::trailing_zeros(&u);
    ww::shr(&mut u, su);
    let sv = ww::trailing_zeros(&v);
    ww::shr(&mut v, sv);
    loop {
        match ww::cmp(&u, &v) {
            Ordering::Equal => break,
            Ordering::Greater => {
                let _ = zz::sub_assign(&mut u, &v);
                let s = ww::trailing_zeros(&u);
                ww::shr(&mut u, s);
            }
            Ordering::Less => {
                let _ = zz::sub_assign(&mut v, &u);
                let s = ww::trailing_zeros(&v);
                ww::shr(&mut v, s);
            }
        }
    }
    ww::shl(&mut v, k);
    v
}

/// Extended binary gcd for `a, b` not both even.
///
/// Returns `(d, (x, x_neg), (y, y_neg))` with `x·a + y·b = d` where the
/// booleans carry the signs of the Bezout coefficients.
#[allow(clippy::type_complexity)]
pub fn ex_gcd(a: &[Word], b: &[Word]) -> (Vec<Word>, (Vec<Word>, bool), (Vec<Word>, bool)) {
    debug_assert!(a[0] & 1 == 1 || b[0] & 1 == 1);
    let len = a.len() + b.len() + 1;
    let mut x = vec![0 as Word; len];
    x[..a.len()].copy_from_slice(a);
    let mut y = vec![0 as Word; len];
    y[..b.len()].copy_from_slice(b);

    let mut u = x.clone();
    let mut v = y.clone();
    let mut ca = SInt::from_word(1, len);
    let mut cb = SInt::from_word(0, len);
    let mut cc = SInt::from_word(0, len);
    let mut cd = SInt::from_word(1, len);

    while !ww::is_zero(&u) {
        while u[0] & 1 == 0 {
            ww::shr(&mut u, 1);
            if ca.is_even() && cb.is_even() {
                ca.halve();
                cb.halve();
            } else {
                ca.add(&y, false);
                ca.halve();
                cb.sub(&x, false);
                cb.halve();
            }
        }
        while v[0] & 1 == 0 {
            ww::shr(&mut v, 1);
            if cc.is_even() && cd.is_even() {
                cc.halve();
                cd.halve();
            } else {
                cc.add(&y, false);
                cc.halve();
                cd.sub(&x, false);
                cd.halve();
            }
        }
        if ww::cmp(&u, &v) != Ordering::Less {
            let _ = zz::sub_assign(&mut u, &v);
            ca.sub_signed(&cc);
            cb.sub_signed(&cd);
        } else {
            let _ = zz::sub_assign(&mut v, &u);
            cc.sub_signed(&ca);
            cd.sub_signed(&cb);
        }
    }
    let d = v;
    (d, (cc.mag, cc.neg), (cd.mag, cd.neg))
}

/// `b = a^(-1) mod m`; false (and `b` zeroed) when `a` is not invertible.
/// `a` must be reduced mod `m`; `m > 1`.
pub fn inv_mod(b: &mut [Word], a: &[Word], m: &[Word]) -> bool {
    debug_assert_eq!(b.len(), m.len());
    debug_assert_eq!(a.len(), m.len());
    if ww::is_zero(a) || (a[0] & 1 == 0 && m[0] & 1 == 0) {
        ww::set_zero(b);
        return false;
    }
    let (d, (x, x_neg), _) = ex_gcd(a, m);
    if ww::bit_size(&d) != 1 {
        ww::set_zero(b);
        return false;
    }
    let r = SInt { mag: x, neg: x_neg }.into_mod(m);
    b.copy_from_slice(&r);
    true
}

/// Jacobi symbol (a/b) for odd `b`; one of -1, 0, 1.
pub fn jacobi(a: &[Word], b: &[Word]) -> i32 {
    debug_assert!(b[0] & 1 == 1);
    let tb = ww::word_size(b).max(1);
    let mut r0 = vec![0 as Word; tb];
    zz::rem(&mut r0, a, &b[..tb]);
    let mut u = vec![0 as Word; b.len()];
    u[..tb].copy_from_slice(&r0);
    let mut v = b.to_vec();
    let mut t = 1i32;
    while !ww::is_zero(&u) {
        let s = ww::trailing_zeros(&u);
        ww::shr(&mut u, s);
        // (2/v) = -1 iff v ≡ ±3 (mod 8)
        if s & 1 == 1 {
            let v8 = v[0] & 7;
            if v8 == 3 || v8 == 5 {
                t = -t;
            }
        }
        // quadratic reciprocity
        if u[0] & 3 == 3 && v[0] & 3 == 3 {
            t = -t;
        }
        core::mem::swap(&mut u, &mut v);
        let trimmed = ww::word_size(&v).max(1);
        let mut r = vec![0 as Word; trimmed];
        zz::rem(&mut r, &u, &v[..trimmed]);
        u.fill(0);
        u[..trimmed].copy_from_slice(&r);
    }
    if ww::bit_size(&v) == 1 {
        t
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn gcd_small() {
        assert_eq!(gcd(&[12], &[18]), vec![6]);
        assert_eq!(gcd(&[0], &[5]), vec![5]);
        assert_eq!(gcd(&[7], &[13]), vec![1]);
        assert_eq!(gcd(&[1 << 20], &[1 << 12]), vec![1 << 12]);
    }

    #[test]
    fn ex_gcd_bezout_holds() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..100 {
            let n = rng.gen_range(1..4usize);
            let mut a: Vec<Word> = (0..n).map(|_| rng.gen()).collect();
            let mut b: Vec<Word> = (0..n).map(|_| rng.gen()).collect();
            if a[0] & 1 == 0 && b[0] & 1 == 0 {
                a[0] |= 1;
            }
            if ww::is_zero(&a) || ww::is_zero(&b) {
                continue;
            }
            let (d, (x, xn), (y, yn)) = ex_gcd(&a, &b);
            // x·a + y·b == d, evaluated with signed magnitudes
            let mut xa = vec![0 as Word; x.len() + a.len()];
            zz::mul(&mut xa, &x, &a);
            let mut yb = vec![0 as Word; y.len() + b.len()];
            zz::mul(&mut yb, &y, &b);
            let len = xa.len().max(yb.len());
            xa.resize(len, 0);
            yb.resize(len, 0);
            let mut acc = SInt { mag: xa, neg: xn };
            acc.add(&yb, yn);
            assert!(!acc.neg);
            let mut want = vec![0 as Word; len];
            want[..d.len()].copy_from_slice(&d);
            assert_eq!(acc.mag, want);
        }
    }

    #[test]
    fn inversion_round_trips() {
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        // odd modulus
        for _ in 0..50 {
            let n = rng.gen_range(1..4usize);
            let mut m: Vec<Word> = (0..n).map(|_| rng.gen()).collect();
            m[0] |= 1;
            m[n - 1] |= 1 << 61;
            let mut a = vec![0 as Word; n];
            let raw: Vec<Word> = (0..n).map(|_| rng.gen()).collect();
            zz::rem(&mut a, &raw, &m);
            let mut inv = vec![0 as Word; n];
            if inv_mod(&mut inv, &a, &m) {
                let mut prod = vec![0 as Word; 2 * n];
                zz::mul(&mut prod, &a, &inv);
                let mut r = vec![0 as Word; n];
                zz::rem(&mut r, &prod, &m);
                assert_eq!(ww::bit_size(&r), 1, "a·a^-1 ≡ 1");
            } else {
                let g = gcd(&a, &m);
                assert_ne!(ww::bit_size(&g), 1);
            }
        }
        // even modulus, odd element
        let m = [32 as Word];
        let mut inv = [0 as Word];
        assert!(inv_mod(&mut inv, &[7], &m));
        assert_eq!((7 * inv[0]) % 32, 1);
    }

    #[test]
    fn jacobi_matches_small_table() {
        // (a/21) for a = 0..20, 21 = 3·7
        let want = [0, 1, -1, 0, 1, 1, 0, 0, -1, 0, -1, -1, 0, -1, 0, 0, 1, 1, 0, -1, 1];
        for (a, &w) in want.iter().enumerate() {
            assert_eq!(jacobi(&[a as Word], &[21]), w, "({a}/21)");
        }
        // (a/p) for prime p agrees with Euler's criterion, p = 1009
        let p = 1009u64;
        for a in 1..40u64 {
            let mut e = 1u64;
            let mut base = a % p;
            let mut exp = (p - 1) / 2;
            while exp > 0 {
                if exp & 1 == 1 {
                    e = e * base % p;
                }
                base = base * base % p;
                exp >>= 1;
            }
            let want = if e == 1 { 1 } else { -1 };
            assert_eq!(jacobi(&[a], &[p]), want, "({a}/{p})");
        }
    }
}
