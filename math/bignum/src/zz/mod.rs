// Copyright (c) 2024 Botho Foundation

//! Unsigned multi-precision integers.
//!
//! All routines take little-endian word slices. Where an output length is
//! not forced by the operation it equals the input length; `mul` is the
//! exception (product length is the sum of the factor lengths). Addition,
//! subtraction and multiplication are branch-free as written; the
//! reductions come in early-exit and `_ct` pairs so call sites handling
//! secrets can bind to the constant-time one.
//!
//! Failure convention: operations with an arithmetic reason to fail
//! (division by zero, non-invertible element, sampler exhaustion) zero
//! the result and report failure; callers translate that into
//! `BadParams` at the API boundary.

mod add;
mod div;
mod gcd;
mod mul;
mod power;
mod rand;
mod red;

pub use add::{
    add, add_assign, add_word, mod_add, mod_double, mod_half, mod_neg, mod_sub, neg, sub,
    sub_assign, sub_word,
};
pub use div::{div, div_mod, rem};
pub use gcd::{ex_gcd, gcd, inv_mod, jacobi};
pub use mul::{addmul_at, mul, mul_word, sqr, submul_at};
pub use power::{mod_mul, mod_sqr, pow_mod, sqrt_floor};
pub use rand::{rand_mod, rand_nz_mod};
pub use red::{
    barrett_mu, mont_r2, red, red_barrett, red_barrett_ct, red_crand, red_crand_ct,
    red_crand_mont, red_crand_mont_ct, red_ct, red_mont, red_mont_ct,
};
