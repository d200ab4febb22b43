// Copyright (c) 2024 Botho Foundation

//! Rejection sampling of residues.

use crate::word::{Word, WORD_BITS};
use crate::ww;
use alloc::vec;
use rand_core::CryptoRngCore;

/// `dst = uniform sample in [0, m)`; `dst.len() == m.len()`, `m > 0`.
///
/// Draws exactly `bit_size(m)` bits per attempt, so each attempt succeeds
/// with probability above one half; the retry budget is proportional to
/// the modulus bit length and exhausting it reports failure rather than
/// biasing the output.
pub fn rand_mod(dst: &mut [Word], m: &[Word], rng: &mut dyn CryptoRngCore) -> bool {
    debug_assert_eq!(dst.len(), m.len());
    let bits = ww::bit_size(m);
    debug_assert!(bits > 0);
    let bytes = bits.div_ceil(8);
    let top_mask: Word = if bits % WORD_BITS == 0 {
        Word::MAX
    } else {
        (1 << (bits % WORD_BITS)) - 1
    };
    let top_word = (bits - 1) / WORD_BITS;
    let mut buf = vec![0u8; bytes];
    for _ in 0..2 * bits.max(WORD_BITS) {
        rng.fill_bytes(&mut buf);
        ww::from_le_bytes(dst, &buf);
        dst[top_word] &= top_mask;
        if bool::from(ww::lt_ct(dst, m)) {
            return true;
        }
    }
    ww::set_zero(dst);
    false
}

/// `dst = uniform sample in [1, m)`; `m > 1`.
pub fn rand_nz_mod(dst: &mut [Word], m: &[Word], rng: &mut dyn CryptoRngCore) -> bool {
    debug_assert!(ww::bit_size(m) > 1);
    for _ in 0..WORD_BITS {
        if !rand_mod(dst, m, rng) {
            break;
        }
        if !ww::is_zero(dst) {
            return true;
        }
    }
    ww::set_zero(dst);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn samples_stay_in_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let m = [0x1_0000 as Word, 3];
        let mut x = [0 as Word; 2];
        for _ in 0..100 {
            assert!(rand_mod(&mut x, &m, &mut rng));
            assert!(bool::from(ww::lt_ct(&x, &m)));
        }
        for _ in 0..100 {
            assert!(rand_nz_mod(&mut x, &m, &mut rng));
            assert!(!ww::is_zero(&x));
        }
    }

    #[test]
    fn tiny_modulus_hits_every_residue() {
        let mut rng = ChaCha20Rng::seed_from_u64(22);
        let m = [5 as Word];
        let mut seen = [false; 5];
        let mut x = [0 as Word];
        for _ in 0..200 {
            assert!(rand_mod(&mut x, &m, &mut rng));
            seen[x[0] as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
