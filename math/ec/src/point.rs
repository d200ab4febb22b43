// Copyright (c) 2024 Botho Foundation

//! Jacobian-coordinate group law.
//!
//! A point (X, Y, Z) stands for the affine point (X/Z², Y/Z³); any point
//! with Z = 0 is the neutral element, canonically (1, 0, 0). The
//! formulas are the explicit-formulas database entries the descriptor
//! names: dbl-1998-hnm / dbl-1998-hnm2 for doubling, mdbl-2007-bl for
//! affine doubling, add-2007-bl for the full addition, madd-2004-hmv for
//! the mixed addition and tpl-2007-bl / tpl-2007-bl-2 for tripling.

use crate::EcGroup;
use alloc::vec;
use alloc::vec::Vec;
use stb_bignum::{ww, Word};
use subtle::Choice;

/// A curve point in Jacobian coordinates, tied to a particular group by
/// the caller (the coordinates are residues of that group's field).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Point {
    pub(crate) x: Vec<Word>,
    pub(crate) y: Vec<Word>,
    pub(crate) z: Vec<Word>,
}

impl Point {
    /// The neutral element.
    pub fn identity(n: usize) -> Self {
        let mut x = vec![0; n];
        x[0] = 1;
        Self {
            x,
            y: vec![0; n],
            z: vec![0; n],
        }
    }

    /// Is this the neutral element (any Z = 0 representative)?
    pub fn is_identity(&self) -> Choice {
        ww::is_zero_ct(&self.z)
    }

    /// Constant-time coordinate select: `a` when `c` is set, else `b`.
    pub(crate) fn select(a: &Point, b: &Point, c: Choice) -> Point {
        let mut out = b.clone();
        ww::select_ct(&mut out.x, &a.x, &b.x, c);
        ww::select_ct(&mut out.y, &a.y, &b.y, c);
        ww::select_ct(&mut out.z, &a.z, &b.z, c);
        out
    }
}

impl EcGroup {
    /// Lift affine internal-form coordinates into a Jacobian point.
    pub fn lift(&self, x: &[Word], y: &[Word]) -> Point {
        Point {
            x: x.to_vec(),
            y: y.to_vec(),
            z: self.f.unity().to_vec(),
        }
    }

    /// Is the affine point (x, y) on the curve: y² = x³ + Ax + B?
    pub fn on_curve(&self, x: &[Word], y: &[Word]) -> bool {
        let f = &*self.f;
        let n = f.n();
        let mut lhs = vec![0 as Word; n];
        f.sqr(&mut lhs, y);
        let mut x2 = vec![0 as Word; n];
        f.sqr(&mut x2, x);
        let mut x3 = vec![0 as Word; n];
        f.mul(&mut x3, &x2, x);
        let mut ax = vec![0 as Word; n];
        f.mul(&mut ax, &self.a, x);
        let mut rhs = vec![0 as Word; n];
        f.add(&mut rhs, &x3, &ax);
        let t = rhs.clone();
        f.add(&mut rhs, &t, &self.b);
        bool::from(f.equal(&lhs, &rhs))
    }

    /// `-P`.
    pub fn neg_point(&self, p: &Point) -> Point {
        let mut out = p.clone();
        self.f.neg(&mut out.y, &p.y);
        out
    }

    /// `2P`, the dbl-1998-hnm family with the A = -3 branch bound at
    /// construction.
    pub fn dbl(&self, p: &Point) -> Point {
        let f = &*self.f;
        let n = f.n();
        if bool::from(p.is_identity()) {
            return Point::identity(n);
        }
        let mut yy = vec![0 as Word; n];
        f.sqr(&mut yy, &p.y);
        let mut yyyy = vec![0 as Word; n];
        f.sqr(&mut yyyy, &yy);
        let mut zz = vec![0 as Word; n];
        f.sqr(&mut zz, &p.z);

        // S = 4·X·YY
        let mut s = vec![0 as Word; n];
        f.mul(&mut s, &p.x, &yy);
        let t = s.clone();
        f.double(&mut s, &t);
        let t = s.clone();
        f.double(&mut s, &t);

        // M = 3X² + a·Z⁴, or 3(X - Z²)(X + Z²) when a = -3
        let mut m = vec![0 as Word; n];
        if self.a_minus3 {
            let mut u = vec![0 as Word; n];
            f.sub(&mut u, &p.x, &zz);
            let mut v = vec![0 as Word; n];
            f.add(&mut v, &p.x, &zz);
            let mut uv = vec![0 as Word; n];
            f.mul(&mut uv, &u, &v);
            let mut uv2 = vec![0 as Word; n];
            f.double(&mut uv2, &uv);
            f.add(&mut m, &uv2, &uv);
        } else {
            let mut xx = vec![0 as Word; n];
            f.sqr(&mut xx, &p.x);
            let mut xx2 = vec![0 as Word; n];
            f.double(&mut xx2, &xx);
            let mut xx3 = vec![0 as Word; n];
            f.add(&mut xx3, &xx2, &xx);
            let mut z4 = vec![0 as Word; n];
            f.sqr(&mut z4, &zz);
            let mut az4 = vec![0 as Word; n];
            f.mul(&mut az4, &self.a, &z4);
            f.add(&mut m, &xx3, &az4);
        }

        // X3 = M² - 2S
        let mut x3 = vec![0 as Word; n];
        f.sqr(&mut x3, &m);
        let mut s2 = vec![0 as Word; n];
        f.double(&mut s2, &s);
        let t = x3.clone();
        f.sub(&mut x3, &t, &s2);

        // Y3 = M·(S - X3) - 8·YYYY
        let mut sm = vec![0 as Word; n];
        f.sub(&mut sm, &s, &x3);
        let mut y3 = vec![0 as Word; n];
        f.mul(&mut y3, &m, &sm);
        let mut e8 = vec![0 as Word; n];
        f.double(&mut e8, &yyyy);
        let t = e8.clone();
        f.double(&mut e8, &t);
        let t = e8.clone();
        f.double(&mut e8, &t);
        let t = y3.clone();
        f.sub(&mut y3, &t, &e8);

        // Z3 = 2·Y·Z
        let mut z3 = vec![0 as Word; n];
        f.mul(&mut z3, &p.y, &p.z);
        let t = z3.clone();
        f.double(&mut z3, &t);

        Point {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Double an affine point (mdbl-2007-bl); `(x, y)` in internal form.
    pub fn dbl_affine(&self, x: &[Word], y: &[Word]) -> Point {
        self.dbl(&self.lift(x, y))
    }

    /// `P + Q`, full Jacobian addition (add-2007-bl) with the degenerate
    /// paths of the descriptor: identity inputs short-circuit, equal
    /// inputs fall back to doubling.
    pub fn add(&self, p: &Point, q: &Point) -> Point {
        let f = &*self.f;
        let n = f.n();
        if bool::from(p.is_identity()) {
            return q.clone();
        }
        if bool::from(q.is_identity()) {
            return p.clone();
        }
        let mut z1z1 = vec![0 as Word; n];
        f.sqr(&mut z1z1, &p.z);
        let mut z2z2 = vec![0 as Word; n];
        f.sqr(&mut z2z2, &q.z);
        let mut u1 = vec![0 as Word; n];
        f.mul(&mut u1, &p.x, &z2z2);
        let mut u2 = vec![0 as Word; n];
        f.mul(&mut u2, &q.x, &z1z1);
        let mut t = vec![0 as Word; n];
        f.mul(&mut t, &q.z, &z2z2);
        let mut s1 = vec![0 as Word; n];
        f.mul(&mut s1, &p.y, &t);
        f.mul(&mut t, &p.z, &z1z1);
        let mut s2 = vec![0 as Word; n];
        f.mul(&mut s2, &q.y, &t);

        let mut h = vec![0 as Word; n];
        f.sub(&mut h, &u2, &u1);
        let mut rr = vec![0 as Word; n];
        f.sub(&mut rr, &s2, &s1);
        if bool::from(f.is_zero(&h)) {
            return if bool::from(f.is_zero(&rr)) {
                self.dbl(p)
            } else {
                Point::identity(n)
            };
        }
        let t0 = rr.clone();
        f.double(&mut rr, &t0); // r = 2(S2 - S1)

        let mut i = vec![0 as Word; n];
        f.double(&mut i, &h);
        let t0 = i.clone();
        f.sqr(&mut i, &t0); // I = (2H)²
        let mut j = vec![0 as Word; n];
        f.mul(&mut j, &h, &i);
        let mut v = vec![0 as Word; n];
        f.mul(&mut v, &u1, &i);

        // X3 = r² - J - 2V
        let mut x3 = vec![0 as Word; n];
        f.sqr(&mut x3, &rr);
        let t0 = x3.clone();
        f.sub(&mut x3, &t0, &j);
        let mut v2 = vec![0 as Word; n];
        f.double(&mut v2, &v);
        let t0 = x3.clone();
        f.sub(&mut x3, &t0, &v2);

        // Y3 = r·(V - X3) - 2·S1·J
        let mut vx = vec![0 as Word; n];
        f.sub(&mut vx, &v, &x3);
        let mut y3 = vec![0 as Word; n];
        f.mul(&mut y3, &rr, &vx);
        f.mul(&mut t, &s1, &j);
        let mut sj2 = vec![0 as Word; n];
        f.double(&mut sj2, &t);
        let t0 = y3.clone();
        f.sub(&mut y3, &t0, &sj2);

        // Z3 = ((Z1 + Z2)² - Z1Z1 - Z2Z2)·H
        let mut zs = vec![0 as Word; n];
        f.add(&mut zs, &p.z, &q.z);
        let t0 = zs.clone();
        f.sqr(&mut zs, &t0);
        let t0 = zs.clone();
        f.sub(&mut zs, &t0, &z1z1);
        let t0 = zs.clone();
        f.sub(&mut zs, &t0, &z2z2);
        let mut z3 = vec![0 as Word; n];
        f.mul(&mut z3, &zs, &h);

        Point {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// `P + (x2, y2)` with the second summand affine (madd-2004-hmv).
    pub fn add_affine(&self, p: &Point, x2: &[Word], y2: &[Word]) -> Point {
        let f = &*self.f;
        let n = f.n();
        if bool::from(p.is_identity()) {
            return self.lift(x2, y2);
        }
        // T1 = Z1², T2 = T1·Z1
        let mut t1 = vec![0 as Word; n];
        f.sqr(&mut t1, &p.z);
        let mut t2 = vec![0 as Word; n];
        f.mul(&mut t2, &t1, &p.z);
        // T1 = T1·X2 - X1 (= H), T2 = T2·Y2 - Y1 (= r)
        let t0 = t1.clone();
        f.mul(&mut t1, &t0, x2);
        let t0 = t2.clone();
        f.mul(&mut t2, &t0, y2);
        let t0 = t1.clone();
        f.sub(&mut t1, &t0, &p.x);
        let t0 = t2.clone();
        f.sub(&mut t2, &t0, &p.y);

        if bool::from(f.is_zero(&t1)) {
            return if bool::from(f.is_zero(&t2)) {
                self.dbl_affine(x2, y2)
            } else {
                Point::identity(n)
            };
        }

        // Z3 = Z1·H
        let mut z3 = vec![0 as Word; n];
        f.mul(&mut z3, &p.z, &t1);
        // T3 = H², T4 = T3·H, T3 = T3·X1
        let mut t3 = vec![0 as Word; n];
        f.sqr(&mut t3, &t1);
        let mut t4 = vec![0 as Word; n];
        f.mul(&mut t4, &t3, &t1);
        let t0 = t3.clone();
        f.mul(&mut t3, &t0, &p.x);
        // X3 = r² - T4 - 2·T3
        let mut x3 = vec![0 as Word; n];
        f.sqr(&mut x3, &t2);
        let t0 = x3.clone();
        f.sub(&mut x3, &t0, &t4);
        let mut t32 = vec![0 as Word; n];
        f.double(&mut t32, &t3);
        let t0 = x3.clone();
        f.sub(&mut x3, &t0, &t32);
        // Y3 = r·(T3 - X3) - T4·Y1
        let mut d = vec![0 as Word; n];
        f.sub(&mut d, &t3, &x3);
        let mut y3 = vec![0 as Word; n];
        f.mul(&mut y3, &t2, &d);
        let mut ty = vec![0 as Word; n];
        f.mul(&mut ty, &t4, &p.y);
        let t0 = y3.clone();
        f.sub(&mut y3, &t0, &ty);

        Point {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// `P - Q`.
    pub fn sub_point(&self, p: &Point, q: &Point) -> Point {
        self.add(p, &self.neg_point(q))
    }

    /// `P - (x2, y2)`.
    pub fn sub_affine(&self, p: &Point, x2: &[Word], y2: &[Word]) -> Point {
        let f = &*self.f;
        let mut ny = vec![0 as Word; f.n()];
        f.neg(&mut ny, y2);
        self.add_affine(p, x2, &ny)
    }

    /// `3P` (tpl-2007-bl, with the shared A = -3 shortcut in M).
    pub fn tpl(&self, p: &Point) -> Point {
        let f = &*self.f;
        let n = f.n();
        if bool::from(p.is_identity()) {
            return Point::identity(n);
        }
        let mut yy = vec![0 as Word; n];
        f.sqr(&mut yy, &p.y);
        let mut zz = vec![0 as Word; n];
        f.sqr(&mut zz, &p.z);
        let mut yyyy = vec![0 as Word; n];
        f.sqr(&mut yyyy, &yy);

        // M as in doubling
        let mut m = vec![0 as Word; n];
        if self.a_minus3 {
            let mut u = vec![0 as Word; n];
            f.sub(&mut u, &p.x, &zz);
            let mut v = vec![0 as Word; n];
            f.add(&mut v, &p.x, &zz);
            let mut uv = vec![0 as Word; n];
            f.mul(&mut uv, &u, &v);
            let mut uv2 = vec![0 as Word; n];
            f.double(&mut uv2, &uv);
            f.add(&mut m, &uv2, &uv);
        } else {
            let mut xx = vec![0 as Word; n];
            f.sqr(&mut xx, &p.x);
            let mut xx2 = vec![0 as Word; n];
            f.double(&mut xx2, &xx);
            let mut xx3 = vec![0 as Word; n];
            f.add(&mut xx3, &xx2, &xx);
            let mut z4 = vec![0 as Word; n];
            f.sqr(&mut z4, &zz);
            let mut az4 = vec![0 as Word; n];
            f.mul(&mut az4, &self.a, &z4);
            f.add(&mut m, &xx3, &az4);
        }
        let mut mm = vec![0 as Word; n];
        f.sqr(&mut mm, &m);

        // E = 6·((X + YY)² - XX - YYYY) - MM
        let mut xx = vec![0 as Word; n];
        f.sqr(&mut xx, &p.x);
        let mut w = vec![0 as Word; n];
        f.add(&mut w, &p.x, &yy);
        let t0 = w.clone();
        f.sqr(&mut w, &t0);
        let t0 = w.clone();
        f.sub(&mut w, &t0, &xx);
        let t0 = w.clone();
        f.sub(&mut w, &t0, &yyyy);
        // 6w = 4w + 2w
        let mut w2 = vec![0 as Word; n];
        f.double(&mut w2, &w);
        let mut w4 = vec![0 as Word; n];
        f.double(&mut w4, &w2);
        let mut e = vec![0 as Word; n];
        f.add(&mut e, &w4, &w2);
        let t0 = e.clone();
        f.sub(&mut e, &t0, &mm);
        let mut ee = vec![0 as Word; n];
        f.sqr(&mut ee, &e);

        // T = 16·YYYY
        let mut t16 = vec![0 as Word; n];
        f.double(&mut t16, &yyyy);
        for _ in 0..3 {
            let t0 = t16.clone();
            f.double(&mut t16, &t0);
        }

        // U = (M + E)² - MM - EE - T  (= 2ME - T)
        let mut u = vec![0 as Word; n];
        f.add(&mut u, &m, &e);
        let t0 = u.clone();
        f.sqr(&mut u, &t0);
        let t0 = u.clone();
        f.sub(&mut u, &t0, &mm);
        let t0 = u.clone();
        f.sub(&mut u, &t0, &ee);
        let t0 = u.clone();
        f.sub(&mut u, &t0, &t16);

        // X3 = 4·(X·EE - 4·YY·U)
        let mut xee = vec![0 as Word; n];
        f.mul(&mut xee, &p.x, &ee);
        let mut yu = vec![0 as Word; n];
        f.mul(&mut yu, &yy, &u);
        let mut yu4 = vec![0 as Word; n];
        f.double(&mut yu4, &yu);
        let t0 = yu4.clone();
        f.double(&mut yu4, &t0);
        let mut x3 = vec![0 as Word; n];
        f.sub(&mut x3, &xee, &yu4);
        let t0 = x3.clone();
        f.double(&mut x3, &t0);
        let t0 = x3.clone();
        f.double(&mut x3, &t0);

        // Y3 = 8·Y·(U·(T - U) - E·EE)
        let mut tu = vec![0 as Word; n];
        f.sub(&mut tu, &t16, &u);
        let mut utu = vec![0 as Word; n];
        f.mul(&mut utu, &u, &tu);
        let mut eee = vec![0 as Word; n];
        f.mul(&mut eee, &e, &ee);
        let mut inner = vec![0 as Word; n];
        f.sub(&mut inner, &utu, &eee);
        let mut y3 = vec![0 as Word; n];
        f.mul(&mut y3, &p.y, &inner);
        for _ in 0..3 {
            let t0 = y3.clone();
            f.double(&mut y3, &t0);
        }

        // Z3 = (Z + E)² - ZZ - EE
        let mut z3 = vec![0 as Word; n];
        f.add(&mut z3, &p.z, &e);
        let t0 = z3.clone();
        f.sqr(&mut z3, &t0);
        let t0 = z3.clone();
        f.sub(&mut z3, &t0, &zz);
        let t0 = z3.clone();
        f.sub(&mut z3, &t0, &ee);

        Point {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Affine coordinates of `p` (internal form), or `None` for the
    /// neutral element. Variable time through the inversion.
    pub fn to_affine(&self, p: &Point) -> Option<(Vec<Word>, Vec<Word>)> {
        let f = &*self.f;
        let n = f.n();
        if bool::from(p.is_identity()) {
            return None;
        }
        let mut zi = vec![0 as Word; n];
        if !f.inv(&mut zi, &p.z) {
            return None;
        }
        let mut zi2 = vec![0 as Word; n];
        f.sqr(&mut zi2, &zi);
        let mut x = vec![0 as Word; n];
        f.mul(&mut x, &p.x, &zi2);
        let mut zi3 = vec![0 as Word; n];
        f.mul(&mut zi3, &zi2, &zi);
        let mut y = vec![0 as Word; n];
        f.mul(&mut y, &p.y, &zi3);
        Some((x, y))
    }

    /// Do two Jacobian points represent the same affine point?
    pub fn point_eq(&self, p: &Point, q: &Point) -> bool {
        let pi = bool::from(p.is_identity());
        let qi = bool::from(q.is_identity());
        if pi || qi {
            return pi == qi;
        }
        let f = &*self.f;
        let n = f.n();
        // X1·Z2² == X2·Z1² and Y1·Z2³ == Y2·Z1³
        let mut z1z1 = vec![0 as Word; n];
        f.sqr(&mut z1z1, &p.z);
        let mut z2z2 = vec![0 as Word; n];
        f.sqr(&mut z2z2, &q.z);
        let mut l = vec![0 as Word; n];
        f.mul(&mut l, &p.x, &z2z2);
        let mut r = vec![0 as Word; n];
        f.mul(&mut r, &q.x, &z1z1);
        if !bool::from(f.equal(&l, &r)) {
            return false;
        }
        let mut z13 = vec![0 as Word; n];
        f.mul(&mut z13, &z1z1, &p.z);
        let mut z23 = vec![0 as Word; n];
        f.mul(&mut z23, &z2z2, &q.z);
        f.mul(&mut l, &p.y, &z23);
        f.mul(&mut r, &q.y, &z13);
        bool::from(f.equal(&l, &r))
    }
}
