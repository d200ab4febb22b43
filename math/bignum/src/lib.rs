// Copyright (c) 2024 Botho Foundation

#![no_std]
#![deny(unsafe_code)]

//! Multi-precision arithmetic over machine words.
//!
//! Numbers are slices of [`Word`]s in little-endian word order: index 0 is
//! the least significant word. A slice's `len()` is its semantic length;
//! leading zero words are allowed and callers trim by re-slicing. The same
//! physical representation backs two semantic layers:
//!
//! - [`zz`] — unsigned integers in base 2^64, with the modular machinery
//!   (Barrett, Montgomery and Crandall reductions, inversion, Jacobi
//!   symbol, exponentiation) that prime-field and curve code builds on;
//! - [`pp`] — polynomials over GF(2), bit `i` of word `j` holding the
//!   coefficient of `x^(64·j + i)`.
//!
//! Routines with a `_ct` suffix run in time independent of the operand
//! *values* (never of the lengths, which are public). Secret material must
//! only ever reach `_ct` entry points.

extern crate alloc;

pub mod pp;
pub mod prime;
pub mod word;
pub mod ww;
pub mod zz;

pub use word::{Word, WORD_BITS, WORD_BYTES};
