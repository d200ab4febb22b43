// Copyright (c) 2024 Botho Foundation

//! Scalar multiplication.
//!
//! The secret-scalar path is a regular width-5 signed-window ladder
//! (Joye–Tunstall recoding: every digit odd, fixed digit count, no
//! zero windows), with masked table lookups and an optional additive
//! blinding of the scalar by a random multiple of the group order. The
//! public-scalar path used by signature verification is a plain
//! interleaved double-and-add.

use crate::{EcGroup, Point};
use alloc::vec;
use alloc::vec::Vec;
use rand_core::CryptoRngCore;
use stb_bignum::{word, ww, zz, Word};
use subtle::Choice;

/// Window width of the regular ladder.
const W: usize = 5;
/// Odd multiples held in the table: 1P, 3P, …, 31P.
const TABLE_LEN: usize = 1 << (W - 1);

impl EcGroup {
    /// `d·P` for an affine point (internal-form coordinates), treating
    /// `d` as secret. Returns the affine result, or `None` when the
    /// product is the neutral element (`d ≡ 0` mod the point order).
    ///
    /// With an RNG the scalar is blinded by a random word multiple of
    /// the group order and the final inversion input is masked; `P` must
    /// then lie in the order-`q` subgroup (always true for cofactor-1
    /// curves).
    pub fn mul(
        &self,
        x: &[Word],
        y: &[Word],
        d: &[Word],
        mut rng: Option<&mut dyn CryptoRngCore>,
    ) -> Option<(Vec<Word>, Vec<Word>)> {
        let n = self.f.n();
        let tq = ww::word_size(self.order());
        // scalar buffer with room for blinding and the odd fix-up
        let len = self.order().len() + 1;
        debug_assert!(d.len() <= len);
        let mut s = vec![0 as Word; len];
        s[..d.len()].copy_from_slice(d);
        if let Some(rng) = rng.as_deref_mut() {
            let t = rng.next_u64();
            let carry = zz::addmul_at(&mut s, 0, &self.order()[..tq], t);
            debug_assert_eq!(carry, 0);
        }
        // force the scalar odd; remember whether P must come back off
        let parity_fix = 1 - (s[0] & 1);
        let fix = Choice::from(parity_fix as u8);
        let carry = zz::add_word(&mut s, parity_fix);
        debug_assert_eq!(carry, 0);

        // regular recoding: tau digits, all odd
        let extractions = (len * 64).div_ceil(W);
        let mut digits = vec![0i32; extractions + 1];
        for digit in digits.iter_mut().take(extractions) {
            let window = s[0] & ((1 << (W + 1)) - 1);
            *digit = window as i32 - (1 << W);
            let borrow = zz::sub_word(&mut s, window);
            debug_assert_eq!(borrow, 0);
            let _ = zz::add_word(&mut s, 1 << W);
            ww::shr(&mut s, W);
        }
        digits[extractions] = s[0] as i32;
        debug_assert!(s[0] & 1 == 1 && s[0] < (1 << W));
        debug_assert!(ww::is_zero(&s[1..]));

        // odd-multiple table in Jacobian form
        let mut table: Vec<Point> = Vec::with_capacity(TABLE_LEN);
        table.push(self.lift(x, y));
        let p2 = self.dbl(&table[0]);
        for j in 1..TABLE_LEN {
            let next = self.add(&table[j - 1], &p2);
            table.push(next);
        }

        let mut acc = select_from_table(self, &table, digits[extractions]);
        for &digit in digits[..extractions].iter().rev() {
            for _ in 0..W {
                acc = self.dbl(&acc);
            }
            let addend = select_from_table(self, &table, digit);
            acc = self.add(&acc, &addend);
        }
        // undo the odd fix-up
        let corrected = self.sub_affine(&acc, x, y);
        let acc = Point::select(&corrected, &acc, fix);

        // mask the projective representative before the variable-time
        // inversion
        let acc = if let Some(rng) = rng.as_deref_mut() {
            let r = self.f.rand(rng).ok()?;
            if bool::from(self.f.is_zero(&r)) {
                acc
            } else {
                let mut r2 = vec![0 as Word; n];
                self.f.sqr(&mut r2, &r);
                let mut out = acc.clone();
                let mut t = vec![0 as Word; n];
                self.f.mul(&mut t, &acc.x, &r2);
                out.x.copy_from_slice(&t);
                let mut r3 = vec![0 as Word; n];
                self.f.mul(&mut r3, &r2, &r);
                self.f.mul(&mut t, &acc.y, &r3);
                out.y.copy_from_slice(&t);
                self.f.mul(&mut t, &acc.z, &r);
                out.z.copy_from_slice(&t);
                out
            }
        } else {
            acc
        };
        self.to_affine(&acc)
    }

    /// `d·G` for the group generator.
    pub fn mul_base(
        &self,
        d: &[Word],
        rng: Option<&mut dyn CryptoRngCore>,
    ) -> Option<(Vec<Word>, Vec<Word>)> {
        let (bx, by) = self.base_affine();
        let (bx, by) = (bx.to_vec(), by.to_vec());
        self.mul(&bx, &by, d, rng)
    }

    /// `d1·P1 + d2·P2` for public scalars (signature verification).
    /// Variable time.
    pub fn mul_add_vartime(
        &self,
        d1: &[Word],
        p1: (&[Word], &[Word]),
        d2: &[Word],
        p2: (&[Word], &[Word]),
    ) -> Option<(Vec<Word>, Vec<Word>)> {
        let bits = ww::bit_size(d1).max(ww::bit_size(d2));
        let mut acc = Point::identity(self.f.n());
        for i in (0..bits).rev() {
            acc = self.dbl(&acc);
            if ww::test_bit(d1, i) {
                acc = self.add_affine(&acc, p1.0, p1.1);
            }
            if ww::test_bit(d2, i) {
                acc = self.add_affine(&acc, p2.0, p2.1);
            }
        }
        self.to_affine(&acc)
    }
}

/// Constant-time lookup of `digit`·P from the odd-multiple table:
/// every entry is touched, the match is mask-selected, and the sign is
/// folded in by a masked negation.
fn select_from_table(group: &EcGroup, table: &[Point], digit: i32) -> Point {
    let n = group.field().n();
    // |digit| and sign, branch-free on the secret digit
    let sign_mask = digit >> 31; // all-ones when negative
    let magnitude = ((digit ^ sign_mask) - sign_mask) as u32;
    let idx = (magnitude >> 1) as Word; // (|d| - 1) / 2 for odd |d|
    let mut out = Point::identity(n);
    for (j, entry) in table.iter().enumerate() {
        let take = word::mask_to_choice(word::eq_mask(j as Word, idx));
        out = Point::select(entry, &out, take);
    }
    let neg = group.neg_point(&out);
    let is_neg = Choice::from((sign_mask & 1) as u8);
    Point::select(&neg, &out, is_neg)
}
