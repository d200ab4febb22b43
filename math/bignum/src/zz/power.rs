// Copyright (c) 2024 Botho Foundation

//! Modular multiplication and exponentiation over an arbitrary modulus,
//! and the integer square root. These run in variable time; the field
//! layer owns the constant-time exponentiation paths.

use crate::word::Word;
use crate::ww;
use crate::zz;
use alloc::vec;
use alloc::vec::Vec;

/// `c = a·b mod m`; all operands `m.len()` words, inputs reduced.
pub fn mod_mul(c: &mut [Word], a: &[Word], b: &[Word], m: &[Word]) {
    let n = m.len();
    debug_assert!(c.len() == n && a.len() == n && b.len() == n);
    let mut prod = vec![0 as Word; 2 * n];
    zz::mul(&mut prod, a, b);
    zz::red(&mut prod, m);
    c.copy_from_slice(&prod[..n]);
}

/// `c = a² mod m`.
pub fn mod_sqr(c: &mut [Word], a: &[Word], m: &[Word]) {
    let n = m.len();
    debug_assert!(c.len() == n && a.len() == n);
    let mut prod = vec![0 as Word; 2 * n];
    zz::sqr(&mut prod, a);
    zz::red(&mut prod, m);
    c.copy_from_slice(&prod[..n]);
}

/// `y = a^e mod m`, left-to-right square-and-multiply. `m > 1`, `a`
/// reduced. `0^0 = 1`.
pub fn pow_mod(y: &mut [Word], a: &[Word], e: &[Word], m: &[Word]) {
    let n = m.len();
    debug_assert!(y.len() == n && a.len() == n);
    ww::set_zero(y);
    y[0] = 1;
    let bits = ww::bit_size(e);
    if bits == 0 {
        return;
    }
    let mut acc = vec![0 as Word; n];
    acc.copy_from_slice(y);
    for i in (0..bits).rev() {
        let t = acc.clone();
        mod_sqr(&mut acc, &t, m);
        if ww::test_bit(e, i) {
            let t = acc.clone();
            mod_mul(&mut acc, &t, a, m);
        }
    }
    y.copy_from_slice(&acc);
}

/// Floor of the square root, sized `ceil(a.len()/2)` words.
///
/// Newton's recurrence `x' = (x + a/x) / 2` from an overestimate
/// converges monotonically; iteration stops at the first
/// non-decreasing step.
pub fn sqrt_floor(a: &[Word]) -> Vec<Word> {
    let bits = ww::bit_size(a);
    let out_len = a.len().div_ceil(2);
    if bits <= 1 {
        let mut r = vec![0 as Word; out_len.max(1)];
        r[0] = a.first().copied().unwrap_or(0) & 1;
        return r;
    }
    // x0 = 2^ceil(bits/2) >= sqrt(a)
    let half_bits = bits.div_ceil(2);
    let xlen = half_bits / crate::word::WORD_BITS + 1;
    let mut x = vec![0 as Word; xlen];
    ww::set_bit(&mut x, half_bits, true);
    loop {
        // q = a / x
        let tx = ww::word_size(&x).max(1);
        let (q, _) = zz::div_mod(a, &x[..tx]);
        // next = (x + q) / 2
        let len = x.len().max(q.len()) + 1;
        let mut next = vec![0 as Word; len];
        next[..x.len()].copy_from_slice(&x);
        let mut qq = vec![0 as Word; len];
        qq[..q.len()].copy_from_slice(&q);
        let carry = zz::add_assign(&mut next, &qq);
        debug_assert_eq!(carry, 0);
        ww::shr(&mut next, 1);
        // monotone descent ends when next >= x
        let mut xx = vec![0 as Word; len];
        xx[..x.len()].copy_from_slice(&x);
        if ww::cmp(&next, &xx) != core::cmp::Ordering::Less {
            break;
        }
        x = next;
    }
    let mut r = vec![0 as Word; out_len];
    let tx = ww::word_size(&x);
    r[..tx].copy_from_slice(&x[..tx]);
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn pow_mod_small_fermat() {
        // a^(p-1) ≡ 1 mod p for prime p = 10007
        let p = [10007 as Word];
        for a in [2 as Word, 3, 9999] {
            let mut y = [0 as Word];
            pow_mod(&mut y, &[a], &[10006], &p);
            assert_eq!(y, [1]);
        }
        // 0^0 = 1 by convention
        let mut y = [0 as Word];
        pow_mod(&mut y, &[0], &[0], &p);
        assert_eq!(y, [1]);
    }

    #[test]
    fn sqrt_floor_brackets_the_root() {
        let mut rng = ChaCha20Rng::seed_from_u64(13);
        for _ in 0..60 {
            let n = rng.gen_range(1..5usize);
            let a: alloc::vec::Vec<Word> = (0..n).map(|_| rng.gen()).collect();
            let r = sqrt_floor(&a);
            // r^2 <= a < (r+1)^2
            let mut r2 = vec![0 as Word; 2 * r.len()];
            zz::sqr(&mut r2, &r);
            let mut a_pad = vec![0 as Word; 2 * r.len()];
            a_pad[..n].copy_from_slice(&a);
            assert_ne!(ww::cmp(&r2, &a_pad), core::cmp::Ordering::Greater);
            let mut r1 = r.clone();
            r1.push(0);
            let _ = zz::add_word(&mut r1, 1);
            let mut r12 = vec![0 as Word; 2 * r1.len()];
            zz::sqr(&mut r12, &r1);
            let mut a_pad2 = vec![0 as Word; 2 * r1.len()];
            a_pad2[..n].copy_from_slice(&a);
            assert_eq!(ww::cmp(&r12, &a_pad2), core::cmp::Ordering::Greater);
        }
        assert_eq!(sqrt_floor(&[0]), vec![0]);
        assert_eq!(sqrt_floor(&[1]), vec![1]);
        assert_eq!(sqrt_floor(&[99]), vec![9]);
        assert_eq!(sqrt_floor(&[100]), vec![10]);
    }
}
