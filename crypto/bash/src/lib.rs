// Copyright (c) 2024 Botho Foundation

#![no_std]
#![deny(unsafe_code)]

//! The bash sponge family (STB 34.101.77): a 1536-bit permutation and
//! the hashes built over it at security levels 128, 192 and 256
//! (bash256, bash384, bash512).

extern crate alloc;

use zeroize::Zeroize;

/// State width in 64-bit words.
pub const STATE_WORDS: usize = 24;

/// Rotation 4-tuples per column; the schedule multiplies through by 7
/// modulo 64 from the seed (8, 53, 14, 1).
const ROT: [(u32, u32, u32, u32); 8] = [
    (8, 53, 14, 1),
    (56, 51, 34, 7),
    (8, 37, 46, 49),
    (56, 3, 2, 23),
    (8, 21, 14, 33),
    (56, 19, 34, 39),
    (8, 5, 46, 17),
    (56, 35, 2, 55),
];

/// Inter-round word permutation: `new[i] = old[PERM[i]]`.
const PERM: [usize; STATE_WORDS] = [
    15, 10, 9, 12, 11, 14, 13, 8, 17, 16, 19, 18, 21, 20, 23, 22, 6, 3, 0, 5, 2, 7, 4, 1,
];

/// First round constant; the rest follow from one LFSR step per round.
const C1: u64 = 0x3BF5_080A_C8BA_94B1;
const LFSR_FEEDBACK: u64 = 0xDC2B_E199_7FE0_D8AE;

#[inline(always)]
fn bash_s(
    w0: u64,
    w1: u64,
    w2: u64,
    m1: u32,
    n1: u32,
    m2: u32,
    n2: u32,
) -> (u64, u64, u64) {
    let t0 = w0.rotate_left(m1);
    let w0 = w0 ^ w1 ^ w2;
    let t1 = w1 ^ w0.rotate_left(n1);
    let w1 = t0 ^ t1;
    let w2 = w2 ^ w2.rotate_left(m2) ^ t1.rotate_left(n2);
    let nl0 = !w2 | w1;
    let nl1 = w0 | w2;
    let nl2 = w0 & w1;
    (w0 ^ nl0, w1 ^ nl1, w2 ^ nl2)
}

/// The bash-f permutation: 24 rounds of S-layer, word shuffle and round
/// constant.
pub fn bash_f(s: &mut [u64; STATE_WORDS]) {
    let mut c = C1;
    for _ in 0..24 {
        for (j, &(m1, n1, m2, n2)) in ROT.iter().enumerate() {
            let (a, b, d) = bash_s(s[j], s[j + 8], s[j + 16], m1, n1, m2, n2);
            s[j] = a;
            s[j + 8] = b;
            s[j + 16] = d;
        }
        let old = *s;
        for (i, w) in s.iter_mut().enumerate() {
            *w = old[PERM[i]];
        }
        s[STATE_WORDS - 1] ^= c;
        c = (c >> 1) ^ (LFSR_FEEDBACK & 0u64.wrapping_sub(c & 1));
    }
}

/// Streaming bash hash at a fixed security level.
#[derive(Clone)]
pub struct BashHash {
    state: [u64; STATE_WORDS],
    rate: usize,
    digest_len: usize,
    pos: usize,
}

impl Drop for BashHash {
    fn drop(&mut self) {
        self.state.zeroize();
    }
}

impl BashHash {
    /// Security level `l` must be one of 128, 192, 256.
    pub fn new(level: usize) -> Self {
        assert!(
            level == 128 || level == 192 || level == 256,
            "unsupported bash level"
        );
        let mut state = [0u64; STATE_WORDS];
        state[STATE_WORDS - 1] = (level / 4) as u64;
        Self {
            state,
            rate: 192 - level / 2,
            digest_len: level / 4,
            pos: 0,
        }
    }

    /// bash256.
    pub fn bash256() -> Self {
        Self::new(128)
    }

    /// bash384.
    pub fn bash384() -> Self {
        Self::new(192)
    }

    /// bash512.
    pub fn bash512() -> Self {
        Self::new(256)
    }

    /// Digest length in bytes (2l bits).
    #[inline]
    pub fn digest_len(&self) -> usize {
        self.digest_len
    }

    #[inline]
    fn absorb_byte(&mut self, b: u8) {
        self.state[self.pos / 8] ^= (b as u64) << (8 * (self.pos % 8));
        self.pos += 1;
        if self.pos == self.rate {
            bash_f(&mut self.state);
            self.pos = 0;
        }
    }

    /// Absorb more data.
    pub fn update(&mut self, data: &[u8]) {
        for &b in data {
            self.absorb_byte(b);
        }
    }

    /// Finish, writing the digest into `out` (must be `digest_len`
    /// bytes).
    pub fn finish_into(mut self, out: &mut [u8]) {
        assert_eq!(out.len(), self.digest_len);
        // domain-separating 0x40 pad, zeros to the end of the rate block
        self.state[self.pos / 8] ^= 0x40u64 << (8 * (self.pos % 8));
        bash_f(&mut self.state);
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = (self.state[i / 8] >> (8 * (i % 8))) as u8;
        }
    }

    /// Finish into a fresh vector.
    pub fn finish(self) -> alloc::vec::Vec<u8> {
        let mut out = alloc::vec![0u8; self.digest_len];
        self.finish_into(&mut out);
        out
    }
}

/// One-shot bash256.
pub fn bash256_hash(data: &[u8]) -> [u8; 32] {
    let mut h = BashHash::bash256();
    h.update(data);
    let mut out = [0u8; 32];
    h.finish_into(&mut out);
    out
}

/// One-shot bash384.
pub fn bash384_hash(data: &[u8]) -> [u8; 48] {
    let mut h = BashHash::bash384();
    h.update(data);
    let mut out = [0u8; 48];
    h.finish_into(&mut out);
    out
}

/// One-shot bash512.
pub fn bash512_hash(data: &[u8]) -> [u8; 64] {
    let mut h = BashHash::bash512();
    h.update(data);
    let mut out = [0u8; 64];
    h.finish_into(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn empty_input_vector() {
        // STB 34.101.77 annex A.3.1
        assert_eq!(
            bash256_hash(&[]),
            hex!("114C3DFAE373D9BCBC3602D6386F2D6A2059BA1BF9048DBAA5146A6CB775709D")
        );
    }

    #[test]
    fn digest_lengths() {
        assert_eq!(bash256_hash(b"x").len(), 32);
        assert_eq!(bash384_hash(b"x").len(), 48);
        assert_eq!(bash512_hash(b"x").len(), 64);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let data: alloc::vec::Vec<u8> = (0u32..300).map(|i| (i * 7 % 256) as u8).collect();
        for split in [0usize, 1, 63, 64, 65, 127, 128, 129, 299] {
            let mut h = BashHash::bash256();
            h.update(&data[..split]);
            h.update(&data[split..]);
            let mut out = [0u8; 32];
            h.finish_into(&mut out);
            assert_eq!(out, bash256_hash(&data), "split {split}");
        }
    }

    #[test]
    fn levels_are_domain_separated() {
        let a = bash384_hash(b"bash");
        let b = bash512_hash(b"bash");
        assert_ne!(&a[..32], &b[..32]);
        assert_ne!(&bash256_hash(b"bash")[..], &b[..32]);
    }
}
