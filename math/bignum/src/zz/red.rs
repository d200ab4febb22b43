// Copyright (c) 2024 Botho Foundation

//! Modular reductions of a double-length input.
//!
//! Every routine here consumes a `2n`-word buffer and leaves the `n`-word
//! residue in its low half. Four families, as the ring layer selects
//! them:
//!
//! - general: plain long division, any modulus;
//! - Barrett: one precomputed reciprocal `mu`, two short multiplies;
//! - Montgomery (Dussé–Kaliski): odd moduli, operands in Montgomery form;
//! - Crandall: moduli of the shape `2^(64·n) - c` with a single-word `c`,
//!   plus the fused Crandall–Montgomery walk for such moduli when they
//!   are odd.
//!
//! The `_ct` variants run a value-independent instruction stream; the
//! plain variants may exit early and are for public data only.

use super::add::{add_assign, sub_assign};
use super::div::rem;
use super::mul::{addmul_at, mul, mul_word};
use crate::word::{self, DWord, Word, WORD_BITS};
use crate::ww;
use alloc::vec;
use alloc::vec::Vec;
use subtle::Choice;

/// Subtract `m` from `a[..m.len()]` if `pick` is set; branch-free.
fn sub_mod_if(a: &mut [Word], m: &[Word], pick: Choice) {
    let mask = (pick.unwrap_u8() as Word).wrapping_neg();
    let mut borrow: Word = 0;
    for i in 0..m.len() {
        let t = (a[i] as DWord)
            .wrapping_sub((m[i] & mask) as DWord)
            .wrapping_sub(borrow as DWord);
        a[i] = t as Word;
        borrow = ((t >> WORD_BITS) as Word) & 1;
    }
}

/// General reduction: `a[..n] = a[..2n] mod m`. Early-exit variant.
pub fn red(a: &mut [Word], m: &[Word]) {
    let n = m.len();
    debug_assert_eq!(a.len(), 2 * n);
    let mut r = vec![0 as Word; n];
    let trimmed = ww::word_size(m);
    rem(&mut r[..trimmed], &a.to_vec(), &m[..trimmed]);
    a[..n].copy_from_slice(&r);
    a[n..].fill(0);
}

/// General reduction, constant time: bit-serial shift-and-subtract.
/// O(n²·64) — the slow safety net for secret data under an arbitrary
/// modulus; the ring layer prefers Montgomery whenever it can.
pub fn red_ct(a: &mut [Word], m: &[Word]) {
    let n = m.len();
    debug_assert_eq!(a.len(), 2 * n);
    let mut r = vec![0 as Word; n];
    for i in (0..2 * n * WORD_BITS).rev() {
        // r = 2r + bit, with a virtual carry word
        let carry = r[n - 1] >> (WORD_BITS - 1);
        for j in (1..n).rev() {
            r[j] = (r[j] << 1) | (r[j - 1] >> (WORD_BITS - 1));
        }
        r[0] = (r[0] << 1) | ((a[i / WORD_BITS] >> (i % WORD_BITS)) & 1);
        let ge = ww::ge_ct(&r, m);
        sub_mod_if(&mut r, m, ge | word::mask_to_choice(word::nonzero_mask(carry)));
    }
    a[..n].copy_from_slice(&r);
    a[n..].fill(0);
}

/// Barrett reciprocal `mu = floor(2^(128·n) / m)`, `n + 2` words.
pub fn barrett_mu(m: &[Word]) -> Vec<Word> {
    let n = m.len();
    debug_assert!(m[n - 1] != 0);
    // numerator 2^(128n): one bit above 2n words
    let mut num = vec![0 as Word; 2 * n + 1];
    num[2 * n] = 1;
    let mut q = vec![0 as Word; 2 * n + 1 - n + 1];
    let mut r = vec![0 as Word; n];
    super::div::div(&mut q, &mut r, &num, m);
    q.resize(n + 2, 0);
    q
}

fn red_barrett_inner(a: &mut [Word], m: &[Word], mu: &[Word], ct: bool) {
    let n = m.len();
    debug_assert_eq!(a.len(), 2 * n);
    debug_assert_eq!(mu.len(), n + 2);
    // q1 = floor(a / 2^(64(n-1))), n+1 words
    let q1 = &a[n - 1..];
    // q2 = q1 * mu, then q3 = floor(q2 / 2^(64(n+1)))
    let mut q2 = vec![0 as Word; (n + 1) + (n + 2)];
    mul(&mut q2, q1, mu);
    let q3 = &q2[n + 1..2 * n + 2]; // n+1 words are enough for q3
    // r2 = (q3 * m) mod 2^(64(n+1))
    let mut r2 = vec![0 as Word; n + 1];
    for i in 0..q3.len().min(n + 1) {
        let limit = n + 1 - i;
        let take = m.len().min(limit);
        let _ = addmul_at(&mut r2[i..], 0, &m[..take], q3[i]);
    }
    // r = (a mod 2^(64(n+1))) - r2, non-negative after at most one wrap
    let mut r = vec![0 as Word; n + 1];
    r.copy_from_slice(&a[..n + 1]);
    let _ = sub_assign(&mut r, &r2);
    // at most two subtractions of m remain
    let mut mx = vec![0 as Word; n + 1];
    mx[..n].copy_from_slice(m);
    if ct {
        for _ in 0..2 {
            let ge = ww::ge_ct(&r, &mx);
            let mask = (ge.unwrap_u8() as Word).wrapping_neg();
            let mut borrow: Word = 0;
            for i in 0..n + 1 {
                let t = (r[i] as DWord)
                    .wrapping_sub((mx[i] & mask) as DWord)
                    .wrapping_sub(borrow as DWord);
                r[i] = t as Word;
                borrow = ((t >> WORD_BITS) as Word) & 1;
            }
        }
    } else {
        while ww::cmp(&r, &mx) != core::cmp::Ordering::Less {
            let _ = sub_assign(&mut r, &mx);
        }
    }
    a[..n].copy_from_slice(&r[..n]);
    a[n..].fill(0);
}

/// Barrett reduction with precomputed `mu`; early-exit variant.
pub fn red_barrett(a: &mut [Word], m: &[Word], mu: &[Word]) {
    red_barrett_inner(a, m, mu, false);
}

/// Barrett reduction, constant time.
pub fn red_barrett_ct(a: &mut [Word], m: &[Word], mu: &[Word]) {
    red_barrett_inner(a, m, mu, true);
}

/// `2^(128·n) mod m` — the Montgomery `R²` constant.
pub fn mont_r2(m: &[Word]) -> Vec<Word> {
    let n = m.len();
    let mut num = vec![0 as Word; 2 * n + 1];
    num[2 * n] = 1;
    let mut r2 = vec![0 as Word; n];
    rem(&mut r2, &num, m);
    r2
}

fn red_mont_inner(a: &mut [Word], m: &[Word], m_star: Word, ct: bool) {
    let n = m.len();
    debug_assert_eq!(a.len(), 2 * n);
    debug_assert!(m[0] & 1 == 1);
    debug_assert!(m[0].wrapping_mul(m_star) == Word::MAX);
    // running carry word above the 2n buffer
    let mut hi: Word = 0;
    for i in 0..n {
        let t = a[i].wrapping_mul(m_star);
        let carry = addmul_at(&mut a[i..], 0, m, t);
        hi = hi.wrapping_add(carry); // carry lands above word 2n-1 only near the end
        debug_assert!(a[i] == 0);
    }
    // a / 2^(64n): shift the high half down, absorbing hi
    for i in 0..n {
        a[i] = a[n + i];
    }
    a[n] = hi;
    a[n + 1..].fill(0);
    // result < 2m: one conditional subtraction (hi is 0 or 1)
    if ct {
        let ge = ww::ge_ct(&a[..n], m);
        let pick = ge | word::mask_to_choice(word::nonzero_mask(a[n]));
        sub_mod_if(a, m, pick);
        a[n] = 0;
    } else {
        if a[n] != 0 || ww::cmp(&a[..n], m) != core::cmp::Ordering::Less {
            let _ = sub_assign(&mut a[..n], m);
        }
        a[n] = 0;
    }
}

/// Montgomery reduction: for `a < m · 2^(64n)` leaves `a · 2^(-64n) mod m`
/// in the low half. Early-exit variant.
pub fn red_mont(a: &mut [Word], m: &[Word], m_star: Word) {
    red_mont_inner(a, m, m_star, false);
}

/// Montgomery reduction, constant time.
pub fn red_mont_ct(a: &mut [Word], m: &[Word], m_star: Word) {
    red_mont_inner(a, m, m_star, true);
}

fn red_crand_inner(a: &mut [Word], m: &[Word], c: Word, ct: bool) {
    let n = m.len();
    debug_assert!(n >= 2, "single-word Crandall moduli go through the general path");
    debug_assert_eq!(a.len(), 2 * n);
    // m = 2^(64n) - c, so 2^(64n) ≡ c: fold the high half once
    let (lo, hi) = a.split_at_mut(n);
    let mut t = vec![0 as Word; n];
    let top = mul_word(&mut t, hi, c);
    let carry1 = add_assign(lo, &t);
    // fold the overflow (top·2^(64n) + carry1·2^(64n) ≡ (top+carry1)·c)
    let fold = (top as DWord + carry1 as DWord) * c as DWord;
    let mut carry2: Word = 0;
    {
        let t0 = lo[0] as DWord + (fold as Word) as DWord;
        lo[0] = t0 as Word;
        let mut carry = (t0 >> WORD_BITS) as Word as DWord + (fold >> WORD_BITS);
        let mut i = 1;
        while i < n {
            let ti = lo[i] as DWord + carry;
            lo[i] = ti as Word;
            carry = ti >> WORD_BITS;
            if !ct && carry == 0 {
                break;
            }
            i += 1;
        }
        if i == n {
            carry2 = carry as Word;
        }
    }
    // a wrap here leaves a small value; one more +c cannot wrap again
    let mask = word::nonzero_mask(carry2);
    let _ = super::add::add_word(lo, c & mask);
    // final conditional subtraction of m == conditional add of c
    if ct {
        let ge = ww::ge_ct(lo, m);
        sub_mod_if(lo, m, ge);
    } else if ww::cmp(lo, m) != core::cmp::Ordering::Less {
        let _ = sub_assign(lo, m);
    }
    hi.fill(0);
}

/// Crandall reduction for `m = 2^(64n) - c`; early-exit variant.
pub fn red_crand(a: &mut [Word], m: &[Word], c: Word) {
    red_crand_inner(a, m, c, false);
}

/// Crandall reduction, constant time.
pub fn red_crand_ct(a: &mut [Word], m: &[Word], c: Word) {
    red_crand_inner(a, m, c, true);
}

fn red_crand_mont_inner(a: &mut [Word], m: &[Word], c: Word, m_star: Word, ct: bool) {
    let n = m.len();
    debug_assert_eq!(a.len(), 2 * n);
    debug_assert!(m[0] & 1 == 1);
    // Montgomery walk with the multiply-by-m replaced by its Crandall
    // split: t·m·2^(64i) = t·2^(64(n+i)) - t·c·2^(64i).
    let mut buf = vec![0 as Word; 2 * n + 1];
    buf[..2 * n].copy_from_slice(a);
    for i in 0..n {
        let t = buf[i].wrapping_mul(m_star);
        // += t at word n+i
        let carry = super::add::add_word(&mut buf[n + i..], t);
        debug_assert_eq!(carry, 0);
        // -= t·c at word i
        let borrow = super::mul::submul_at(&mut buf, i, &[t], c);
        debug_assert_eq!(borrow, 0);
        debug_assert_eq!(buf[i], 0);
    }
    a[..n + 1].copy_from_slice(&buf[n..]);
    a[n + 1..].fill(0);
    if ct {
        let ge = ww::ge_ct(&a[..n], m);
        let pick = ge | word::mask_to_choice(word::nonzero_mask(a[n]));
        sub_mod_if(a, m, pick);
    } else if a[n] != 0 || ww::cmp(&a[..n], m) != core::cmp::Ordering::Less {
        let _ = sub_assign(&mut a[..n], m);
    }
    a[n] = 0;
}

/// Fused Crandall–Montgomery reduction for odd `m = 2^(64n) - c`;
/// early-exit variant.
pub fn red_crand_mont(a: &mut [Word], m: &[Word], c: Word, m_star: Word) {
    red_crand_mont_inner(a, m, c, m_star, false);
}

/// Fused Crandall–Montgomery reduction, constant time.
pub fn red_crand_mont_ct(a: &mut [Word], m: &[Word], c: Word, m_star: Word) {
    red_crand_mont_inner(a, m, c, m_star, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zz;
    use alloc::vec::Vec;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn rand_words(rng: &mut ChaCha20Rng, n: usize) -> Vec<Word> {
        (0..n).map(|_| rng.gen()).collect()
    }

    fn reference(a: &[Word], m: &[Word]) -> Vec<Word> {
        let mut r = vec![0 as Word; m.len()];
        zz::rem(&mut r, a, m);
        r
    }

    #[test]
    fn all_families_agree_with_division() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..50 {
            let n = rng.gen_range(1..6usize);
            let mut m = rand_words(&mut rng, n);
            m[0] |= 1; // odd, for the Montgomery families
            m[n - 1] |= 1 << 63; // trimmed and large
            let a = rand_words(&mut rng, 2 * n);
            let want = reference(&a, &m);

            let mut t = a.clone();
            red(&mut t, &m);
            assert_eq!(&t[..n], &want[..], "general");

            let mut t = a.clone();
            red_ct(&mut t, &m);
            assert_eq!(&t[..n], &want[..], "general ct");

            let mu = barrett_mu(&m);
            let mut t = a.clone();
            red_barrett(&mut t, &m, &mu);
            assert_eq!(&t[..n], &want[..], "barrett");
            let mut t = a.clone();
            red_barrett_ct(&mut t, &m, &mu);
            assert_eq!(&t[..n], &want[..], "barrett ct");
        }
    }

    #[test]
    fn montgomery_reduces_by_r() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        for _ in 0..50 {
            let n = rng.gen_range(1..6usize);
            let mut m = rand_words(&mut rng, n);
            m[0] |= 1;
            m[n - 1] |= 1 << 62;
            let m_star = word::neg_inv(m[0]);
            // a < m · 2^(64n): build as x·y with x,y < m
            let mut x = rand_words(&mut rng, n);
            let mut y = rand_words(&mut rng, n);
            let x_snapshot = x.clone();
            zz::rem(&mut x, &x_snapshot, &m);
            let y_snapshot = y.clone();
            zz::rem(&mut y, &y_snapshot, &m);
            let mut a = vec![0 as Word; 2 * n];
            zz::mul(&mut a, &x, &y);

            // want = a · R^{-1} mod m, checked by re-multiplying by R
            let mut got_fast = a.clone();
            red_mont(&mut got_fast, &m, m_star);
            let mut got_ct = a.clone();
            red_mont_ct(&mut got_ct, &m, m_star);
            assert_eq!(got_fast, got_ct);

            // got · 2^(64n) mod m must equal a mod m
            let mut shifted = vec![0 as Word; 2 * n];
            shifted[n..].copy_from_slice(&got_fast[..n]);
            assert_eq!(reference(&shifted, &m), reference(&a, &m));
        }
    }

    #[test]
    fn crandall_matches_division() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        for _ in 0..50 {
            let n = rng.gen_range(2..6usize);
            let c: Word = rng.gen_range(1..Word::MAX);
            // m = 2^(64n) - c
            let mut m = vec![Word::MAX; n];
            m[0] = 0u64.wrapping_sub(c);
            let a = rand_words(&mut rng, 2 * n);
            let want = reference(&a, &m);

            let mut t = a.clone();
            red_crand(&mut t, &m, c);
            assert_eq!(&t[..n], &want[..], "crandall fast (c = {c:#x})");
            let mut t = a.clone();
            red_crand_ct(&mut t, &m, c);
            assert_eq!(&t[..n], &want[..], "crandall ct");

            if m[0] & 1 == 1 {
                let m_star = word::neg_inv(m[0]);
                let mut x = rand_words(&mut rng, n);
                let mut y = rand_words(&mut rng, n);
                let x_snapshot = x.clone();
                zz::rem(&mut x, &x_snapshot, &m);
                let y_snapshot = y.clone();
                zz::rem(&mut y, &y_snapshot, &m);
                let mut prod = vec![0 as Word; 2 * n];
                zz::mul(&mut prod, &x, &y);
                let mut got = prod.clone();
                red_crand_mont(&mut got, &m, c, m_star);
                let mut got_ct = prod.clone();
                red_crand_mont_ct(&mut got_ct, &m, c, m_star);
                assert_eq!(got, got_ct);
                let mut shifted = vec![0 as Word; 2 * n];
                shifted[n..].copy_from_slice(&got[..n]);
                assert_eq!(reference(&shifted, &m), reference(&prod, &m));
            }
        }
    }
}
