// Copyright (c) 2024 Botho Foundation

//! The curve descriptor: coefficients, base point, subgroup order, and
//! the validity ladder — curve well-formedness at construction, the
//! Hasse bound on demand, and the expensive safety checks (order
//! primality, anomalous-curve and MOV rejection) behind an explicit
//! call.

use crate::{Error, Point, PrimeField};
use alloc::vec;
use alloc::vec::Vec;
use rand_core::CryptoRngCore;
use stb_bignum::{prime, ww, zz, Word};

/// An elliptic-curve group over GF(p) in short Weierstrass form.
#[derive(Clone, Debug)]
pub struct EcGroup {
    pub(crate) f: PrimeField,
    pub(crate) a: Vec<Word>,
    pub(crate) b: Vec<Word>,
    pub(crate) a_minus3: bool,
    base_x: Vec<Word>,
    base_y: Vec<Word>,
    /// Subgroup order, one word wider than the field per the Hasse bound.
    order: Vec<Word>,
    cofactor: u32,
}

impl EcGroup {
    /// Assemble and validate a curve descriptor. All encodings are
    /// little-endian byte strings of the field width (`order` may carry
    /// one extra word's worth of bytes).
    ///
    /// Construction enforces the curve-level invariants: coefficients
    /// and base coordinates are canonical field elements, the curve is
    /// non-singular (4A³ + 27B² ≠ 0) and the base point is on it.
    pub fn new(
        f: PrimeField,
        a_bytes: &[u8],
        b_bytes: &[u8],
        base_x_bytes: &[u8],
        base_y_bytes: &[u8],
        order_bytes: &[u8],
        cofactor: u32,
    ) -> Result<Self, Error> {
        let a = f.from_bytes(a_bytes).map_err(|_| Error::BadParams)?;
        let b = f.from_bytes(b_bytes).map_err(|_| Error::BadParams)?;
        let base_x = f.from_bytes(base_x_bytes).map_err(|_| Error::BadParams)?;
        let base_y = f.from_bytes(base_y_bytes).map_err(|_| Error::BadParams)?;
        if order_bytes.is_empty() || cofactor == 0 {
            return Err(Error::BadParams);
        }
        let mut order = vec![0 as Word; f.n() + 1];
        if order_bytes.len() > order.len() * stb_bignum::WORD_BYTES {
            return Err(Error::BadParams);
        }
        ww::from_le_bytes(&mut order, order_bytes);
        if ww::bit_size(&order) < 2 {
            return Err(Error::BadParams);
        }

        // non-singularity: 4A³ + 27B² != 0
        let n = f.n();
        let mut a2 = vec![0 as Word; n];
        f.sqr(&mut a2, &a);
        let mut a3 = vec![0 as Word; n];
        f.mul(&mut a3, &a2, &a);
        let mut t = vec![0 as Word; n];
        for _ in 0..2 {
            let prev = a3.clone();
            f.double(&mut a3, &prev);
        }
        let mut b2 = vec![0 as Word; n];
        f.sqr(&mut b2, &b);
        let mut b27 = b2.clone();
        for _ in 0..4 {
            let prev = b27.clone();
            f.double(&mut b27, &prev);
        }
        // 27 = 16 + 8 + 2 + 1
        let mut b8 = b2.clone();
        for _ in 0..3 {
            let prev = b8.clone();
            f.double(&mut b8, &prev);
        }
        let mut b2x = vec![0 as Word; n];
        f.double(&mut b2x, &b2);
        f.add(&mut t, &b27, &b8);
        let mut acc = vec![0 as Word; n];
        f.add(&mut acc, &t, &b2x);
        let prev = acc.clone();
        f.add(&mut acc, &prev, &b2);
        let mut disc = vec![0 as Word; n];
        f.add(&mut disc, &a3, &acc);
        if bool::from(f.is_zero(&disc)) {
            return Err(Error::BadParams);
        }

        let a_minus3 = {
            let plain = f.to_plain(&a);
            plain == f.p_minus_3()
        };

        let group = Self {
            f,
            a,
            b,
            a_minus3,
            base_x,
            base_y,
            order,
            cofactor,
        };
        if !group.on_curve(&group.base_x, &group.base_y) {
            return Err(Error::BadPoint);
        }
        Ok(group)
    }

    /// The field this curve lives over.
    #[inline]
    pub fn field(&self) -> &PrimeField {
        &self.f
    }

    /// The base point, lifted to Jacobian form.
    pub fn base(&self) -> Point {
        self.lift(&self.base_x, &self.base_y)
    }

    /// Affine base coordinates (internal form).
    pub fn base_affine(&self) -> (&[Word], &[Word]) {
        (&self.base_x, &self.base_y)
    }

    /// Subgroup order in plain words (field width plus one word).
    #[inline]
    pub fn order(&self) -> &[Word] {
        &self.order
    }

    #[inline]
    pub fn cofactor(&self) -> u32 {
        self.cofactor
    }

    /// The Hasse sanity check: |order·cofactor - (p + 1)| ≤ 2√p, tested
    /// by squaring both sides, plus base-point membership (already
    /// guaranteed by construction, rechecked here because this is the
    /// entry point parameter auditing goes through).
    pub fn seems_valid_group(&self) -> bool {
        if !self.on_curve(&self.base_x, &self.base_y) {
            return false;
        }
        let n = self.f.n();
        // oc = order · cofactor (n + 2 words)
        let mut oc = vec![0 as Word; self.order.len() + 1];
        let carry = zz::mul_word(&mut oc[..self.order.len()], &self.order, self.cofactor as Word);
        oc[self.order.len()] = carry;
        // p1 = p + 1
        let mut p1 = vec![0 as Word; oc.len()];
        p1[..n].copy_from_slice(self.f.modulus());
        let _ = zz::add_word(&mut p1, 1);
        // d = |oc - p1|
        let mut d = vec![0 as Word; oc.len()];
        if ww::cmp(&oc, &p1) == core::cmp::Ordering::Less {
            let _ = zz::sub(&mut d, &p1, &oc);
        } else {
            let _ = zz::sub(&mut d, &oc, &p1);
        }
        // d² ≤ 4p
        let mut d2 = vec![0 as Word; 2 * d.len()];
        zz::sqr(&mut d2, &d);
        let mut p4 = vec![0 as Word; 2 * d.len()];
        p4[..n].copy_from_slice(self.f.modulus());
        ww::shl(&mut p4, 2);
        ww::cmp(&d2, &p4) != core::cmp::Ordering::Greater
    }

    /// The expensive safety checks: the order is prime, the curve is not
    /// anomalous (order ≠ p), and the embedding degree exceeds
    /// `mov_threshold` (order divides no `p^k - 1` for small `k`).
    pub fn is_safe_group(
        &self,
        mov_threshold: usize,
        rm_iter: usize,
        rng: &mut dyn CryptoRngCore,
    ) -> bool {
        let tq = ww::word_size(&self.order);
        if tq == 0 {
            return false;
        }
        let q = &self.order[..tq];
        if !prime::is_probable_prime(q, rm_iter, rng) {
            return false;
        }
        // anomalous curves leak the discrete log through the p-adic lift
        let n = self.f.n();
        let mut p_pad = vec![0 as Word; self.order.len()];
        p_pad[..n].copy_from_slice(self.f.modulus());
        if p_pad == self.order {
            return false;
        }
        // MOV: p^k mod q must stay away from 1
        let mut p_mod_q = vec![0 as Word; tq];
        zz::rem(&mut p_mod_q, self.f.modulus(), q);
        let mut acc = vec![0 as Word; tq];
        acc.copy_from_slice(&p_mod_q);
        for _ in 0..mov_threshold {
            if ww::bit_size(&acc) == 1 {
                return false;
            }
            let prev = acc.clone();
            zz::mod_mul(&mut acc, &prev, &p_mod_q, q);
        }
        true
    }
}
