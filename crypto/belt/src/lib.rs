// Copyright (c) 2024 Botho Foundation

#![no_std]
#![deny(unsafe_code)]

//! The belt block cipher (STB 34.101.31): 128-bit blocks, 256-bit keys,
//! eight rounds of the G-transform network, and the belt-hash built on
//! its compression function.
//!
//! Words are little-endian `u32`s, as everywhere in the STB family.

extern crate alloc;

mod hash;

pub use hash::{belt_hash, BeltHash, HASH_SIZE};

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Block length in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Key length in bytes.
pub const KEY_SIZE: usize = 32;

/// The H substitution, applied bytewise inside every G-transform.
const H: [u8; 256] = [
    0xB1, 0x94, 0xBA, 0xC8, 0x0A, 0x08, 0xF5, 0x3B, 0x36, 0x6D, 0x00, 0x8E, 0x58, 0x4A, 0x5D,
    0xE4, 0x85, 0x04, 0xFA, 0x9D, 0x1B, 0xB6, 0xC7, 0xAC, 0x25, 0x2E, 0x72, 0xC2, 0x02, 0xFD,
    0xCE, 0x0D, 0x5B, 0xE3, 0xD6, 0x12, 0x17, 0xB9, 0x61, 0x81, 0xFE, 0x67, 0x86, 0xAD, 0x71,
    0x6B, 0x89, 0x0B, 0x5C, 0xB0, 0xC0, 0xFF, 0x33, 0xC3, 0x56, 0xB8, 0x35, 0xC4, 0x05, 0xAE,
    0xD8, 0xE0, 0x7F, 0x99, 0xE1, 0x2B, 0xDC, 0x1A, 0xE2, 0x82, 0x57, 0xEC, 0x70, 0x3F, 0xCC,
    0xF0, 0x95, 0xEE, 0x8D, 0xF1, 0xC1, 0xAB, 0x76, 0x38, 0x9F, 0xE6, 0x78, 0xCA, 0xF7, 0xC6,
    0xF8, 0x60, 0xD5, 0xBB, 0x9C, 0x4F, 0xF3, 0x3C, 0x65, 0x7B, 0x63, 0x7C, 0x30, 0x6A, 0xDD,
    0x4E, 0xA7, 0x79, 0x9E, 0xB2, 0x3D, 0x31, 0x3E, 0x98, 0xB5, 0x6E, 0x27, 0xD3, 0xBC, 0xCF,
    0x59, 0x1E, 0x18, 0x1F, 0x4C, 0x5A, 0xB7, 0x93, 0xE9, 0xDE, 0xE7, 0x2C, 0x8F, 0x0C, 0x0F,
    0xA6, 0x2D, 0xDB, 0x49, 0xF4, 0x6F, 0x73, 0x96, 0x47, 0x06, 0x07, 0x53, 0x16, 0xED, 0x24,
    0x7A, 0x37, 0x39, 0xCB, 0xA3, 0x83, 0x03, 0xA9, 0x8B, 0xF6, 0x92, 0xBD, 0x9B, 0x1C, 0xE5,
    0xD1, 0x41, 0x01, 0x54, 0x45, 0xFB, 0xC9, 0x5E, 0x4D, 0x0E, 0xF2, 0x68, 0x20, 0x80, 0xAA,
    0x22, 0x7D, 0x64, 0x2F, 0x26, 0x87, 0xF9, 0x34, 0x90, 0x40, 0x55, 0x11, 0xBE, 0x32, 0x97,
    0x13, 0x43, 0xFC, 0x9A, 0x48, 0xA0, 0x2A, 0x88, 0x5F, 0x19, 0x4B, 0x09, 0xA1, 0x7E, 0xCD,
    0xA4, 0xD0, 0x15, 0x44, 0xAF, 0x8C, 0xA5, 0x84, 0x50, 0xBF, 0x66, 0xD2, 0xE8, 0x8A, 0xA2,
    0xD7, 0x46, 0x52, 0x42, 0xA8, 0xDF, 0xB3, 0x69, 0x74, 0xC5, 0x51, 0xEB, 0x23, 0x29, 0x21,
    0xD4, 0xEF, 0xD9, 0xB4, 0x3A, 0x62, 0x28, 0x75, 0x91, 0x14, 0x10, 0xEA, 0x77, 0x6C, 0xDA,
    0x1D,
];

/// `G_r(u) = RotL_r(H(u))`, the byte substitution followed by rotation.
#[inline(always)]
fn g(u: u32, r: u32) -> u32 {
    let [b0, b1, b2, b3] = u.to_le_bytes();
    let h = u32::from_le_bytes([
        H[b0 as usize],
        H[b1 as usize],
        H[b2 as usize],
        H[b3 as usize],
    ]);
    h.rotate_left(r)
}

/// An expanded belt key: the eight theta words the 56-entry round-key
/// sequence cycles through.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BeltKey {
    theta: [u32; 8],
}

impl core::fmt::Debug for BeltKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("BeltKey([REDACTED])")
    }
}

impl BeltKey {
    /// Expand a 256-bit key.
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        let mut theta = [0u32; 8];
        for (i, t) in theta.iter_mut().enumerate() {
            *t = u32::from_le_bytes(key[4 * i..4 * i + 4].try_into().expect("4-byte chunk"));
        }
        Self { theta }
    }

    /// Round key `K_j` for `j` in 1..=56.
    #[inline(always)]
    fn k(&self, j: usize) -> u32 {
        self.theta[(j - 1) % 8]
    }

    /// Encrypt one block in place.
    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let mut a = u32::from_le_bytes(block[0..4].try_into().expect("block chunk"));
        let mut b = u32::from_le_bytes(block[4..8].try_into().expect("block chunk"));
        let mut c = u32::from_le_bytes(block[8..12].try_into().expect("block chunk"));
        let mut d = u32::from_le_bytes(block[12..16].try_into().expect("block chunk"));

        for i in 1..=8usize {
            b ^= g(a.wrapping_add(self.k(7 * i - 6)), 5);
            c ^= g(d.wrapping_add(self.k(7 * i - 5)), 21);
            a = a.wrapping_sub(g(b.wrapping_add(self.k(7 * i - 4)), 13));
            let e = g(
                b.wrapping_add(c).wrapping_add(self.k(7 * i - 3)),
                21,
            ) ^ i as u32;
            b = b.wrapping_add(e);
            c = c.wrapping_sub(e);
            d = d.wrapping_add(g(c.wrapping_add(self.k(7 * i - 2)), 13));
            b ^= g(a.wrapping_add(self.k(7 * i - 1)), 21);
            c ^= g(d.wrapping_add(self.k(7 * i)), 5);
            // a <-> b, c <-> d, b <-> c
            let (na, nb, nc, nd) = (b, d, a, c);
            a = na;
            b = nb;
            c = nc;
            d = nd;
        }

        block[0..4].copy_from_slice(&b.to_le_bytes());
        block[4..8].copy_from_slice(&d.to_le_bytes());
        block[8..12].copy_from_slice(&a.to_le_bytes());
        block[12..16].copy_from_slice(&c.to_le_bytes());
    }

    /// Decrypt one block in place: the step-exact inverse of
    /// [`Self::encrypt_block`].
    pub fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        // the ciphertext layout is (b, d, a, c) of the final state
        let b_f = u32::from_le_bytes(block[0..4].try_into().expect("block chunk"));
        let d_f = u32::from_le_bytes(block[4..8].try_into().expect("block chunk"));
        let a_f = u32::from_le_bytes(block[8..12].try_into().expect("block chunk"));
        let c_f = u32::from_le_bytes(block[12..16].try_into().expect("block chunk"));
        let (mut a, mut b, mut c, mut d) = (a_f, b_f, c_f, d_f);

        for i in (1..=8usize).rev() {
            // undo the in-round renaming (a,b,c,d) <- (b,d,a,c)
            let (pa, pb, pc, pd) = (c, a, d, b);
            a = pa;
            b = pb;
            c = pc;
            d = pd;
            c ^= g(d.wrapping_add(self.k(7 * i)), 5);
            b ^= g(a.wrapping_add(self.k(7 * i - 1)), 21);
            d = d.wrapping_sub(g(c.wrapping_add(self.k(7 * i - 2)), 13));
            // b + c is invariant across the e-steps
            let e = g(
                b.wrapping_add(c).wrapping_add(self.k(7 * i - 3)),
                21,
            ) ^ i as u32;
            b = b.wrapping_sub(e);
            c = c.wrapping_add(e);
            a = a.wrapping_add(g(b.wrapping_add(self.k(7 * i - 4)), 13));
            c ^= g(d.wrapping_add(self.k(7 * i - 5)), 21);
            b ^= g(a.wrapping_add(self.k(7 * i - 6)), 5);
        }

        block[0..4].copy_from_slice(&a.to_le_bytes());
        block[4..8].copy_from_slice(&b.to_le_bytes());
        block[8..12].copy_from_slice(&c.to_le_bytes());
        block[12..16].copy_from_slice(&d.to_le_bytes());
    }
}

/// One-shot block encryption with a raw key.
pub fn belt_block_encrypt(block: &mut [u8; BLOCK_SIZE], key: &[u8; KEY_SIZE]) {
    BeltKey::new(key).encrypt_block(block);
}
