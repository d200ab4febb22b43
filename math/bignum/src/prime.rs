// Copyright (c) 2024 Botho Foundation

//! Primality: factor-base sieving, Rabin–Miller under Montgomery
//! arithmetic, Sophie–Germain checking, incremental next-prime search and
//! Demytko's prime extension.
//!
//! The factor base (the first 1024 odd primes) and the packed word-sized
//! products used for fast trial division are both computed at compile
//! time.

use crate::word::{self, DWord, Word, WORD_BITS};
use crate::ww;
use crate::zz;
use alloc::vec;
use alloc::vec::Vec;
use rand_core::CryptoRngCore;

/// Size of the factor base.
pub const FACTOR_BASE_LEN: usize = 1024;

const fn is_small_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u32;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

const fn build_factor_base() -> [u16; FACTOR_BASE_LEN] {
    let mut out = [0u16; FACTOR_BASE_LEN];
    let mut count = 0;
    let mut n = 3u32;
    while count < FACTOR_BASE_LEN {
        if is_small_prime(n) {
            out[count] = n as u16;
            count += 1;
        }
        n += 2;
    }
    out
}

/// The first 1024 odd primes: 3, 5, 7, …
pub const FACTOR_BASE: [u16; FACTOR_BASE_LEN] = build_factor_base();

const fn count_products() -> usize {
    let base = build_factor_base();
    let mut groups = 0;
    let mut i = 0;
    while i < FACTOR_BASE_LEN {
        let mut acc = 1u64;
        while i < FACTOR_BASE_LEN {
            let p = base[i] as u64;
            if acc > u64::MAX / p {
                break;
            }
            acc *= p;
            i += 1;
        }
        groups += 1;
    }
    groups
}

/// Number of packed products covering the factor base.
pub const PRODUCT_COUNT: usize = count_products();

const fn build_products() -> [(u64, u16); PRODUCT_COUNT] {
    let base = build_factor_base();
    let mut out = [(0u64, 0u16); PRODUCT_COUNT];
    let mut g = 0;
    let mut i = 0;
    while i < FACTOR_BASE_LEN {
        let start = i;
        let mut acc = 1u64;
        while i < FACTOR_BASE_LEN {
            let p = base[i] as u64;
            if acc > u64::MAX / p {
                break;
            }
            acc *= p;
            i += 1;
        }
        out[g] = (acc, start as u16);
        g += 1;
    }
    out
}

/// Products of consecutive factor-base primes, each the largest run that
/// still fits a word, tagged with the index of its first prime.
pub const FACTOR_BASE_PRODUCTS: [(u64, u16); PRODUCT_COUNT] = build_products();

/// `a mod d` for a single-word divisor.
fn rem_word(a: &[Word], d: Word) -> Word {
    let mut r: Word = 0;
    for &limb in a.iter().rev() {
        let t = ((r as DWord) << WORD_BITS) | limb as DWord;
        r = (t % d as DWord) as Word;
    }
    r
}

/// Deterministic primality for a single word, using fixed witness sets.
pub fn is_prime_word(a: Word) -> bool {
    if a < 2 {
        return false;
    }
    for p in [2 as Word, 3, 5, 7, 11, 13] {
        if a == p {
            return true;
        }
        if a % p == 0 {
            return false;
        }
    }
    let witnesses: &[Word] = if a < 1_373_653 {
        &[2, 3]
    } else if a < 4_759_123_141 {
        &[2, 7, 61]
    } else {
        // Sinclair's base set covers every 64-bit integer
        &[2, 325, 9375, 28178, 450775, 9780504, 1795265022]
    };
    let d = a - 1;
    let s = d.trailing_zeros();
    let d = d >> s;
    'witness: for &w in witnesses {
        let w = w % a;
        if w == 0 {
            continue;
        }
        let mut x = pow_mod_word(w, d, a);
        if x == 1 || x == a - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod_word(x, x, a);
            if x == a - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[inline]
fn mul_mod_word(a: Word, b: Word, m: Word) -> Word {
    ((a as DWord * b as DWord) % m as DWord) as Word
}

fn pow_mod_word(mut a: Word, mut e: Word, m: Word) -> Word {
    let mut acc: Word = 1;
    a %= m;
    while e > 0 {
        if e & 1 == 1 {
            acc = mul_mod_word(acc, a, m);
        }
        a = mul_mod_word(a, a, m);
        e >>= 1;
    }
    acc
}

/// Montgomery context over an odd multi-word modulus, local to the
/// Rabin–Miller walk.
struct Mont {
    m: Vec<Word>,
    m_star: Word,
    r: Vec<Word>,  // 2^(64n) mod m — the image of 1
    r2: Vec<Word>, // 2^(128n) mod m
}

impl Mont {
    fn new(m: &[Word]) -> Self {
        let n = m.len();
        let r2 = zz::mont_r2(m);
        let mut one = vec![0 as Word; n];
        one[0] = 1;
        let mut ctx = Self {
            m: m.to_vec(),
            m_star: word::neg_inv(m[0]),
            r: vec![0; n],
            r2,
        };
        ctx.r = ctx.mul(&one, &ctx.r2.clone());
        ctx
    }

    fn mul(&self, a: &[Word], b: &[Word]) -> Vec<Word> {
        let n = self.m.len();
        let mut prod = vec![0 as Word; 2 * n];
        zz::mul(&mut prod, a, b);
        zz::red_mont(&mut prod, &self.m, self.m_star);
        prod.truncate(n);
        prod
    }

    fn pow(&self, a: &[Word], e: &[Word]) -> Vec<Word> {
        let mut acc = self.r.clone();
        for i in (0..ww::bit_size(e)).rev() {
            acc = self.mul(&acc, &acc.clone());
            if ww::test_bit(e, i) {
                acc = self.mul(&acc, a);
            }
        }
        acc
    }
}

/// Rabin–Miller with `iter` random bases drawn directly in Montgomery
/// form, excluding the images of ±1 (the Dussé–Kaliski walk never leaves
/// Montgomery representation). `a` must be odd; the caller removes small
/// factors first.
pub fn rabin_miller(a: &[Word], iter: usize, rng: &mut dyn CryptoRngCore) -> bool {
    let n = ww::word_size(a);
    if n == 0 {
        return false;
    }
    let a = &a[..n];
    if n == 1 && a[0] < 1 << 32 {
        return is_prime_word(a[0]);
    }
    if a[0] & 1 == 0 {
        return false;
    }
    let ctx = Mont::new(a);
    // a - 1 = 2^s · d
    let mut d = a.to_vec();
    let _ = zz::sub_word(&mut d, 1);
    let s = ww::trailing_zeros(&d);
    ww::shr(&mut d, s);
    // image of -1 is m - r
    let mut minus_one = a.to_vec();
    let _ = zz::sub_assign(&mut minus_one, &ctx.r);

    let mut base = vec![0 as Word; n];
    'iteration: for _ in 0..iter {
        // sample until the Montgomery image is outside {0, 1, -1}
        loop {
            if !zz::rand_mod(&mut base, a, rng) {
                return false;
            }
            if !ww::is_zero(&base) && base != ctx.r && base != minus_one {
                break;
            }
        }
        let mut y = ctx.pow(&base, &d);
        if y == ctx.r || y == minus_one {
            continue;
        }
        for _ in 1..s {
            y = ctx.mul(&y, &y.clone());
            if y == minus_one {
                continue 'iteration;
            }
            if y == ctx.r {
                return false; // nontrivial square root of 1
            }
        }
        return false;
    }
    true
}

/// Probable-primality with sieving in front of Rabin–Miller.
pub fn is_probable_prime(a: &[Word], iter: usize, rng: &mut dyn CryptoRngCore) -> bool {
    let n = ww::word_size(a);
    if n == 0 {
        return false;
    }
    if n == 1 {
        return is_prime_word(a[0]);
    }
    if a[0] & 1 == 0 {
        return false;
    }
    if trial_division(a, FACTOR_BASE_LEN).is_some() {
        return false;
    }
    rabin_miller(a, iter, rng)
}

/// Walk the factor base looking for a divisor of `a`; `None` means the
/// sieve passed. Considers the first `base_count` primes.
pub fn trial_division(a: &[Word], base_count: usize) -> Option<Word> {
    let base_count = base_count.min(FACTOR_BASE_LEN);
    let single = ww::word_size(a) <= 1;
    for (g, &(product, start)) in FACTOR_BASE_PRODUCTS.iter().enumerate() {
        let start = start as usize;
        if start >= base_count {
            break;
        }
        let end = if g + 1 < PRODUCT_COUNT {
            (FACTOR_BASE_PRODUCTS[g + 1].1 as usize).min(base_count)
        } else {
            base_count
        };
        let r = rem_word(a, product);
        for &p in &FACTOR_BASE[start..end] {
            let p = p as Word;
            if r % p == 0 {
                if single && a[0] == p {
                    continue;
                }
                return Some(p);
            }
        }
    }
    None
}

/// Is prime `q` a Sophie Germain prime, i.e. is `2q + 1` prime as well?
pub fn is_sophie_germain(q: &[Word], iter: usize, rng: &mut dyn CryptoRngCore) -> bool {
    let mut p = vec![0 as Word; q.len() + 1];
    p[..q.len()].copy_from_slice(q);
    ww::shl(&mut p, 1);
    let carry = zz::add_word(&mut p, 1);
    debug_assert_eq!(carry, 0);
    is_probable_prime(&p, iter, rng)
}

/// Incremental sieve state for stepping a candidate by a fixed even
/// increment.
struct Sieve {
    residues: Vec<u16>, // candidate mod FACTOR_BASE[i]
    steps: Vec<u16>,    // increment mod FACTOR_BASE[i]
}

impl Sieve {
    fn new(candidate: &[Word], step: &[Word], base_count: usize) -> Self {
        let base_count = base_count.min(FACTOR_BASE_LEN);
        let mut residues = Vec::with_capacity(base_count);
        let mut steps = Vec::with_capacity(base_count);
        for &p in &FACTOR_BASE[..base_count] {
            residues.push(rem_word(candidate, p as Word) as u16);
            steps.push(rem_word(step, p as Word) as u16);
        }
        Self { residues, steps }
    }

    fn passes(&self) -> bool {
        self.residues.iter().all(|&r| r != 0)
    }

    fn advance(&mut self) {
        for (i, r) in self.residues.iter_mut().enumerate() {
            let p = FACTOR_BASE[i];
            let t = *r + self.steps[i];
            *r = if t >= p { t - p } else { t };
        }
    }
}

/// Least probable prime `>= a`, stepping by 2 with an incremental sieve
/// over the first `base_count` factor-base primes. At most `trials`
/// candidates are examined; exhaustion returns false with `p` zeroed.
pub fn next_prime(
    p: &mut [Word],
    a: &[Word],
    trials: usize,
    base_count: usize,
    iter: usize,
    rng: &mut dyn CryptoRngCore,
) -> bool {
    debug_assert_eq!(p.len(), a.len());
    p.copy_from_slice(a);
    p[0] |= 1;
    let two = {
        let mut t = vec![0 as Word; p.len()];
        t[0] = 2;
        t
    };
    let mut sieve = Sieve::new(p, &two, base_count);
    for _ in 0..trials {
        let single = ww::word_size(p) <= 1;
        let sieve_ok = sieve.passes()
            || (single && FACTOR_BASE[..base_count.min(FACTOR_BASE_LEN)]
                .iter()
                .any(|&q| q as Word == p[0]));
        if sieve_ok && is_probable_prime(p, iter, rng) {
            return true;
        }
        if zz::add_word(p, 2) != 0 {
            break; // wrapped the representable range
        }
        sieve.advance();
    }
    ww::set_zero(p);
    false
}

/// Demytko's construction: an `l`-bit probable prime `p = 2qr + 1` built
/// over the given prime `q`, so that `q | p - 1`.
///
/// A fresh `t` is drawn uniformly from `[2^(l-2), 2^(l-1))`, rounded up
/// to a multiple of `q`, and the candidate then steps by `2q` under an
/// incremental sieve. Each sieve survivor is accepted when
/// `2^(2qr) ≡ 1 (mod p)` and `2^(2r) ≢ 1 (mod p)`.
pub fn extend_prime(
    p: &mut [Word],
    l: usize,
    q: &[Word],
    trials: usize,
    base_count: usize,
    rng: &mut dyn CryptoRngCore,
) -> bool {
    let n = p.len();
    let qbits = ww::bit_size(q);
    debug_assert!(l >= qbits + 2 && l <= n * WORD_BITS);
    let tq = ww::word_size(q);
    let q = &q[..tq];

    // t uniform in [2^(l-2), 2^(l-1))
    let mut bound = vec![0 as Word; n];
    ww::set_bit(&mut bound, l - 2, true);
    let mut t = vec![0 as Word; n];
    if !zz::rand_mod(&mut t, &bound, rng) {
        ww::set_zero(p);
        return false;
    }
    let _ = zz::add_assign(&mut t, &bound);
    // r = ceil(t / q)
    let (mut r, rem) = zz::div_mod(&t, q);
    if !ww::is_zero(&rem) {
        let _ = zz::add_word(&mut r, 1);
    }
    r.resize(n, 0);

    // p = 2qr + 1, step = 2q
    let mut step = vec![0 as Word; n];
    step[..tq].copy_from_slice(q);
    ww::shl(&mut step, 1);
    let mut candidate = vec![0 as Word; n + tq];
    zz::mul(&mut candidate[..n + tq], &r[..n], q);
    let mut cand = candidate[..n].to_vec();
    debug_assert!(ww::is_zero(&candidate[n..]));
    ww::shl(&mut cand, 1);
    let _ = zz::add_word(&mut cand, 1);

    let mut sieve = Sieve::new(&cand, &step, base_count);
    let mut two_r = vec![0 as Word; n];
    for _ in 0..trials {
        if ww::bit_size(&cand) > l {
            break; // left the target window
        }
        if sieve.passes() && ww::bit_size(&cand) == l {
            // 2^(p-1) ≡ 1 and 2^(2r) ≢ 1 (Pocklington over the factor q)
            let mut e = cand.clone();
            let _ = zz::sub_word(&mut e, 1);
            let mut y = vec![0 as Word; n];
            let two_base = {
                let mut t = vec![0 as Word; n];
                t[0] = 2;
                t
            };
            zz::pow_mod(&mut y, &two_base, &e, &cand);
            if ww::bit_size(&y) == 1 {
                two_r.copy_from_slice(&r);
                ww::shl(&mut two_r, 1);
                zz::pow_mod(&mut y, &two_base, &two_r, &cand);
                if ww::bit_size(&y) != 1 {
                    p.copy_from_slice(&cand);
                    return true;
                }
            }
        }
        let carry = zz::add_assign(&mut cand, &step);
        if carry != 0 {
            break;
        }
        let _ = zz::add_word(&mut r, 2);
        sieve.advance();
    }
    ww::set_zero(p);
    false
}
