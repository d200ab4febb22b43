// Copyright (c) 2024 Botho Foundation

#![no_std]
#![deny(unsafe_code)]

//! bign (STB 34.101.45): deterministic and randomized signatures over
//! prime-order Weierstrass curves, at four security levels addressed by
//! their standard object identifiers.
//!
//! Integers cross the API as little-endian byte strings throughout, the
//! convention of the whole STB family: private keys, public-key
//! coordinates and both signature halves.

extern crate alloc;

mod hash;
mod keys;
mod params;
mod selftest;
mod sign;

pub use hash::LevelHash;
pub use keys::{keypair, PrivateKey, PublicKey};
pub use params::{params_by_oid, params_for_level, Level, Params, CURVE_256V1};
pub use selftest::selftest;
pub use sign::{sign, sign_deterministic, verify};

pub use stb_common::{Error, Result};
