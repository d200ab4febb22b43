// Copyright (c) 2024 Botho Foundation

#![no_std]
#![deny(unsafe_code)]

//! Quotient rings, prime fields and short-Weierstrass curve groups.
//!
//! A [`ZmRing`] owns a modulus and an internally chosen reduction
//! strategy (Montgomery for odd moduli, the fused Crandall–Montgomery
//! walk for odd `2^(64n) - c` moduli, Barrett otherwise); residues are
//! opaque word vectors in the ring's internal form and only the ring
//! converts them to and from bytes. [`PrimeField`] narrows a ring to odd
//! prime moduli and adds the sign/half conveniences the curve formulas
//! want. [`EcGroup`] carries the curve descriptor and implements the
//! Jacobian group law plus constant-time scalar multiplication.

extern crate alloc;

mod curve;
mod field;
mod mul;
mod point;
mod ring;

pub use curve::EcGroup;
pub use field::PrimeField;
pub use point::Point;
pub use ring::ZmRing;

/// Errors from ring and curve construction or use.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// Modulus or curve parameter outside its domain.
    BadParams,
    /// Encoded element is not a canonical residue.
    BadElement,
    /// Point coordinates are not on the curve.
    BadPoint,
    /// Randomness source failed or was exhausted.
    Rng,
}
