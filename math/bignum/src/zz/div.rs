// Copyright (c) 2024 Botho Foundation

//! Long division (Knuth, The Art of Computer Programming vol. 2,
//! Algorithm D) and its quotient/remainder wrappers.

use super::mul::submul_at;
use crate::word::{self, DWord, Word, WORD_BITS};
use crate::ww;
use alloc::vec;

/// `q = a / b`, `r = a mod b`.
///
/// Requires `b` trimmed (`b[b.len()-1] != 0`). `q.len()` must be
/// `a.len() - b.len() + 1` and `r.len()` must be `b.len()`; when
/// `a.len() < b.len()` pass `q` of length zero. The quotient timing
/// depends on operand values; never call this with secrets.
pub fn div(q: &mut [Word], r: &mut [Word], a: &[Word], b: &[Word]) {
    let n = a.len();
    let m = b.len();
    debug_assert!(m > 0 && b[m - 1] != 0);
    debug_assert_eq!(r.len(), m);
    if n < m {
        debug_assert!(q.is_empty());
        ww::set_zero(r);
        r[..n].copy_from_slice(a);
        return;
    }
    debug_assert_eq!(q.len(), n - m + 1);

    if m == 1 {
        let d = b[0];
        let mut rem: Word = 0;
        for i in (0..n).rev() {
            let t = ((rem as DWord) << WORD_BITS) | a[i] as DWord;
            q[i] = (t / d as DWord) as Word;
            rem = (t % d as DWord) as Word;
        }
        r[0] = rem;
        return;
    }

    // D1: normalize so the top divisor word has its high bit set
    let shift = WORD_BITS - word::bit_len(b[m - 1]);
    let mut bn = vec![0 as Word; m];
    bn.copy_from_slice(b);
    ww::shl(&mut bn, shift);
    let mut an = vec![0 as Word; n + 1];
    an[..n].copy_from_slice(a);
    if shift > 0 {
        an[n] = a[n - 1] >> (WORD_BITS - shift);
        for i in (1..n).rev() {
            an[i] = (a[i] << shift) | (a[i - 1] >> (WORD_BITS - shift));
        }
        an[0] = a[0] << shift;
    }

    let top = bn[m - 1] as DWord;
    let next = bn[m - 2] as DWord;
    for j in (0..=n - m).rev() {
        // D3: estimate
        let num = ((an[j + m] as DWord) << WORD_BITS) | an[j + m - 1] as DWord;
        let mut qhat = if (an[j + m] as DWord) == top {
            ((1 as DWord) << WORD_BITS) - 1
        } else {
            num / top
        };
        let mut rhat = num - qhat * top;
        while rhat >> WORD_BITS == 0 && qhat * next > ((rhat << WORD_BITS) | an[j + m - 2] as DWord)
        {
            qhat -= 1;
            rhat += top;
        }
        // D4: multiply-subtract
        let borrow = submul_at(&mut an[j..j + m + 1], 0, &bn, qhat as Word);
        // D5/D6: the estimate can be one too large; add back
        if borrow != 0 {
            qhat -= 1;
            let mut carry: Word = 0;
            for i in 0..m {
                let t = an[j + i] as DWord + bn[i] as DWord + carry as DWord;
                an[j + i] = t as Word;
                carry = (t >> WORD_BITS) as Word;
            }
            an[j + m] = an[j + m].wrapping_add(carry);
        }
        q[j] = qhat as Word;
    }

    // D8: denormalize the remainder
    r.copy_from_slice(&an[..m]);
    ww::shr(r, shift);
}

/// `r = a mod b`; `b` trimmed, `r.len() == b.len()`.
pub fn rem(r: &mut [Word], a: &[Word], b: &[Word]) {
    let qlen = a.len().saturating_sub(b.len()) + usize::from(a.len() >= b.len());
    let mut q = vec![0 as Word; qlen];
    div(&mut q, r, a, b);
}

/// Quotient and remainder as freshly allocated vectors.
pub fn div_mod(a: &[Word], b: &[Word]) -> (alloc::vec::Vec<Word>, alloc::vec::Vec<Word>) {
    let qlen = a.len().saturating_sub(b.len()) + usize::from(a.len() >= b.len());
    let mut q = vec![0 as Word; qlen];
    let mut r = vec![0 as Word; b.len()];
    div(&mut q, &mut r, a, b);
    (q, r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zz;
    use alloc::vec::Vec;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn check(a: &[Word], b: &[Word]) {
        let (q, r) = div_mod(a, b);
        // q*b + r == a and r < b
        let mut qb = vec![0 as Word; q.len() + b.len()];
        zz::mul(&mut qb, &q, &b);
        let mut back = qb;
        let carry = zz::add_assign(&mut back[..r.len()], &r);
        if carry != 0 {
            let c = zz::add_word(&mut back[r.len()..], 1);
            assert_eq!(c, 0);
        }
        assert_eq!(&back[..a.len()], a);
        assert!(back[a.len()..].iter().all(|&w| w == 0));
        assert_eq!(ww::cmp(&r, b), core::cmp::Ordering::Less);
    }

    #[test]
    fn division_invariant_random() {
        let mut rng = ChaCha20Rng::seed_from_u64(2024);
        for _ in 0..200 {
            let n = rng.gen_range(1..8usize);
            let m = rng.gen_range(1..=n);
            let a: Vec<Word> = (0..n).map(|_| rng.gen()).collect();
            let mut b: Vec<Word> = (0..m).map(|_| rng.gen()).collect();
            if b[m - 1] == 0 {
                b[m - 1] = 1;
            }
            check(&a, &b);
        }
    }

    #[test]
    fn division_estimate_edge() {
        // divisor with a maximal top word forces the qhat clamp
        let a = [0 as Word, 0, Word::MAX, Word::MAX];
        let b = [Word::MAX, Word::MAX];
        check(&a, &b);
        // dividend shorter than divisor
        let (q, r) = div_mod(&[5], &[1, 1]);
        assert!(q.is_empty());
        assert_eq!(r, alloc::vec![5, 0]);
    }
}
