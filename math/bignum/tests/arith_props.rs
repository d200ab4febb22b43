// Copyright (c) 2024 Botho Foundation

//! Property tests for the integer layer: the ring axioms that every
//! higher layer silently leans on.

use proptest::collection::vec as pvec;
use proptest::prelude::*;
use stb_bignum::{ww, zz, Word};

fn words(n: usize) -> impl Strategy<Value = Vec<Word>> {
    pvec(any::<Word>(), n)
}

proptest! {
    /// a + b - b == a, including carry chains.
    #[test]
    fn add_sub_roundtrip(a in words(4), b in words(4)) {
        let mut sum = vec![0 as Word; 4];
        let carry = zz::add(&mut sum, &a, &b);
        let mut back = vec![0 as Word; 4];
        let borrow = zz::sub(&mut back, &sum, &b);
        prop_assert_eq!(&back, &a);
        prop_assert_eq!(carry, borrow);
    }

    /// Multiplication commutes and distributes over addition mod 2^256.
    #[test]
    fn mul_commutes(a in words(3), b in words(3)) {
        let mut ab = vec![0 as Word; 6];
        zz::mul(&mut ab, &a, &b);
        let mut ba = vec![0 as Word; 6];
        zz::mul(&mut ba, &b, &a);
        prop_assert_eq!(ab, ba);
    }

    /// q·b + r == a with r < b.
    #[test]
    fn division_invariant(a in words(5), mut b in words(2)) {
        if ww::is_zero(&b) {
            b[0] = 1;
        }
        let tb = ww::word_size(&b);
        let (q, r) = zz::div_mod(&a, &b[..tb]);
        let mut qb = vec![0 as Word; q.len() + tb];
        zz::mul(&mut qb, &q, &b[..tb]);
        let mut whole = qb.clone();
        whole.resize(whole.len().max(5) + 1, 0);
        let mut rr = vec![0 as Word; whole.len()];
        rr[..r.len()].copy_from_slice(&r);
        let carry = zz::add_assign(&mut whole, &rr);
        prop_assert_eq!(carry, 0);
        prop_assert_eq!(&whole[..5], &a[..]);
        prop_assert!(whole[5..].iter().all(|&w| w == 0));
    }

    /// The modular family stays inside [0, m).
    #[test]
    fn modular_ops_stay_reduced(a in words(3), b in words(3), mut m in words(3)) {
        m[0] |= 1;
        m[2] |= 1 << 60;
        let mut ar = vec![0 as Word; 3];
        zz::rem(&mut ar, &a, &m);
        let mut br = vec![0 as Word; 3];
        zz::rem(&mut br, &b, &m);
        let mut c = vec![0 as Word; 3];
        zz::mod_add(&mut c, &ar, &br, &m);
        prop_assert!(bool::from(ww::lt_ct(&c, &m)));
        zz::mod_sub(&mut c, &ar, &br, &m);
        prop_assert!(bool::from(ww::lt_ct(&c, &m)));
        zz::mod_half(&mut c, &ar, &m);
        prop_assert!(bool::from(ww::lt_ct(&c, &m)));
        let mut d = vec![0 as Word; 3];
        zz::mod_double(&mut d, &c, &m);
        prop_assert_eq!(&d, &ar);
    }
}
