// Copyright (c) 2024 Botho Foundation

//! belt-hash: the 256-bit hash of STB 34.101.31.
//!
//! The compression function eats a 256-bit block X1‖X2 into the state
//! h1‖h2 through three block-cipher calls keyed off the data and a
//! derived θ:
//!
//! ```text
//! θ   = F_{X1‖X2}(h1 ⊕ h2) ⊕ h1 ⊕ h2
//! h1' = F_{θ‖h2}(X1) ⊕ X1
//! h2' = F_{¬θ‖h1}(X2) ⊕ X2
//! ```
//!
//! A running σ-accumulator XORs up the θ values; finalization compresses
//! one more block made of the 128-bit little-endian bit count and that
//! accumulator.

use crate::{BeltKey, BLOCK_SIZE};
use zeroize::Zeroize;

/// Digest length in bytes.
pub const HASH_SIZE: usize = 32;

const IV: [u8; 32] = [
    0xB1, 0x94, 0xBA, 0xC8, 0x0A, 0x08, 0xF5, 0x3B, 0x36, 0x6D, 0x00, 0x8E, 0x58, 0x4A, 0x5D,
    0xE4, 0x85, 0x04, 0xFA, 0x9D, 0x1B, 0xB6, 0xC7, 0xAC, 0x25, 0x2E, 0x72, 0xC2, 0x02, 0xFD,
    0xCE, 0x0D,
];

#[inline]
fn xor16(a: &mut [u8; 16], b: &[u8; 16]) {
    for i in 0..16 {
        a[i] ^= b[i];
    }
}

/// One compression step; returns θ for the σ-accumulator.
fn compress(h1: &mut [u8; 16], h2: &mut [u8; 16], x: &[u8; 32]) -> [u8; 16] {
    let x1: [u8; 16] = x[..16].try_into().expect("block half");
    let x2: [u8; 16] = x[16..].try_into().expect("block half");

    // θ = F_{X}(h1 ⊕ h2) ⊕ h1 ⊕ h2
    let mut theta = *h1;
    xor16(&mut theta, h2);
    let mut key = [0u8; 32];
    key.copy_from_slice(x);
    BeltKey::new(&key).encrypt_block(&mut theta);
    xor16(&mut theta, h1);
    xor16(&mut theta, h2);

    // h1' = F_{θ‖h2}(X1) ⊕ X1
    key[..16].copy_from_slice(&theta);
    key[16..].copy_from_slice(h2);
    let mut y1 = x1;
    BeltKey::new(&key).encrypt_block(&mut y1);
    xor16(&mut y1, &x1);

    // h2' = F_{¬θ‖h1}(X2) ⊕ X2
    for (k, t) in key[..16].iter_mut().zip(theta.iter()) {
        *k = !*t;
    }
    key[16..].copy_from_slice(h1);
    let mut y2 = x2;
    BeltKey::new(&key).encrypt_block(&mut y2);
    xor16(&mut y2, &x2);

    *h1 = y1;
    *h2 = y2;
    key.zeroize();
    theta
}

/// Streaming belt-hash.
#[derive(Clone)]
pub struct BeltHash {
    h1: [u8; 16],
    h2: [u8; 16],
    sigma: [u8; 16],
    buf: [u8; 32],
    filled: usize,
    bits: u64,
}

impl Default for BeltHash {
    fn default() -> Self {
        Self::new()
    }
}

impl BeltHash {
    pub fn new() -> Self {
        Self {
            h1: IV[..16].try_into().expect("IV half"),
            h2: IV[16..].try_into().expect("IV half"),
            sigma: [0; 16],
            buf: [0; 32],
            filled: 0,
            bits: 0,
        }
    }

    /// Absorb more data.
    pub fn update(&mut self, mut data: &[u8]) {
        self.bits += 8 * data.len() as u64;
        if self.filled > 0 {
            let take = data.len().min(2 * BLOCK_SIZE - self.filled);
            self.buf[self.filled..self.filled + take].copy_from_slice(&data[..take]);
            self.filled += take;
            data = &data[take..];
            if self.filled == 2 * BLOCK_SIZE {
                let block = self.buf;
                let theta = compress(&mut self.h1, &mut self.h2, &block);
                xor16(&mut self.sigma, &theta);
                self.filled = 0;
            }
        }
        while data.len() >= 2 * BLOCK_SIZE {
            let block: [u8; 32] = data[..2 * BLOCK_SIZE].try_into().expect("full block");
            let theta = compress(&mut self.h1, &mut self.h2, &block);
            xor16(&mut self.sigma, &theta);
            data = &data[2 * BLOCK_SIZE..];
        }
        if !data.is_empty() {
            self.buf[..data.len()].copy_from_slice(data);
            self.filled = data.len();
        }
    }

    /// Finish and produce the digest.
    pub fn finish(mut self) -> [u8; HASH_SIZE] {
        if self.filled > 0 {
            self.buf[self.filled..].fill(0);
            let block = self.buf;
            let theta = compress(&mut self.h1, &mut self.h2, &block);
            xor16(&mut self.sigma, &theta);
        }
        // final block: ⟨bit length⟩_128 ‖ σ
        let mut last = [0u8; 32];
        last[..8].copy_from_slice(&self.bits.to_le_bytes());
        last[16..].copy_from_slice(&self.sigma);
        let _ = compress(&mut self.h1, &mut self.h2, &last);
        let mut out = [0u8; HASH_SIZE];
        out[..16].copy_from_slice(&self.h1);
        out[16..].copy_from_slice(&self.h2);
        out
    }
}

/// One-shot convenience.
pub fn belt_hash(data: &[u8]) -> [u8; HASH_SIZE] {
    let mut h = BeltHash::new();
    h.update(data);
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn standard_vectors() {
        // STB 34.101.31 appendix A: the 13-byte prefix of the test data
        assert_eq!(
            belt_hash(&hex!("B194BAC80A08F53B366D008E58")),
            hex!("ABEF9725D4C5A83597A367D14494CC2542F20F659DDFECC961A3EC550CBA8C75")
        );
    }

    #[test]
    fn streaming_matches_one_shot() {
        let data: alloc::vec::Vec<u8> = (0u32..257).map(|i| (i * 31 % 251) as u8).collect();
        for split in [0usize, 1, 13, 31, 32, 33, 64, 100, 256] {
            let mut h = BeltHash::new();
            h.update(&data[..split]);
            h.update(&data[split..]);
            assert_eq!(h.finish(), belt_hash(&data), "split at {split}");
        }
    }

    #[test]
    fn length_matters() {
        // a zero byte appended changes the digest even though the padded
        // block bytes coincide
        assert_ne!(belt_hash(&[]), belt_hash(&[0]));
        assert_ne!(belt_hash(&[0; 31]), belt_hash(&[0; 32]));
    }
}
