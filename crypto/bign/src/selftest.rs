// Copyright (c) 2024 Botho Foundation

//! Known-answer self-test, run by the file-signing layer before any
//! sign or verify. One fixed signature is generated deterministically
//! and checked against the standard parameter set, one standard
//! signature is verified, and one hash of a known input is compared.

use crate::{sign_deterministic, verify, Error, PrivateKey, PublicKey, Result, CURVE_256V1};
use stb_bash::bash256_hash;
use stb_belt::belt_hash;

const TEST_PRIVATE: [u8; 32] = [
    0x1F, 0x66, 0xB5, 0xB8, 0x4B, 0x73, 0x39, 0x67, 0x45, 0x33, 0xF0, 0x32, 0x9C, 0x74, 0xF2,
    0x18, 0x34, 0x28, 0x1F, 0xED, 0x07, 0x32, 0x42, 0x9E, 0x0C, 0x79, 0x23, 0x5F, 0xC2, 0x73,
    0xE2, 0x69,
];

const TEST_PUBLIC: [u8; 64] = [
    0xBD, 0x1A, 0x56, 0x50, 0x17, 0x9D, 0x79, 0xE0, 0x3F, 0xCE, 0xE4, 0x9D, 0x4C, 0x2B, 0xD5,
    0xDD, 0xF5, 0x4C, 0xE4, 0x6D, 0x0C, 0xF1, 0x1E, 0x4F, 0xF8, 0x7B, 0xF7, 0xA8, 0x90, 0x85,
    0x7F, 0xD0, 0x7A, 0xC6, 0xA6, 0x03, 0x61, 0xE8, 0xC8, 0x17, 0x34, 0x91, 0x68, 0x6D, 0x46,
    0x1B, 0x28, 0x26, 0x19, 0x0C, 0x2E, 0xDA, 0x59, 0x09, 0x05, 0x4A, 0x9A, 0xB8, 0x4D, 0x2A,
    0xB9, 0xD9, 0x9A, 0x90,
];

const TEST_MESSAGE: [u8; 13] = [
    0xB1, 0x94, 0xBA, 0xC8, 0x0A, 0x08, 0xF5, 0x3B, 0x36, 0x6D, 0x00, 0x8E, 0x58,
];

const TEST_SIG: [u8; 48] = [
    0x19, 0xD3, 0x2B, 0x7E, 0x01, 0xE2, 0x5B, 0xAE, 0x4A, 0x70, 0xEB, 0x6B, 0xCA, 0x42, 0x60,
    0x2C, 0xCA, 0x6A, 0x13, 0x94, 0x44, 0x51, 0xBC, 0xC5, 0xD4, 0xC5, 0x4C, 0xFD, 0x87, 0x37,
    0x61, 0x9C, 0x32, 0x8B, 0x8A, 0x58, 0xFB, 0x9C, 0x68, 0xFD, 0x17, 0xD5, 0x69, 0xF7, 0xD0,
    0x64, 0x95, 0xFB,
];

const BASH256_EMPTY: [u8; 32] = [
    0x11, 0x4C, 0x3D, 0xFA, 0xE3, 0x73, 0xD9, 0xBC, 0xBC, 0x36, 0x02, 0xD6, 0x38, 0x6F, 0x2D,
    0x6A, 0x20, 0x59, 0xBA, 0x1B, 0xF9, 0x04, 0x8D, 0xBA, 0xA5, 0x14, 0x6A, 0x6C, 0xB7, 0x75,
    0x70, 0x9D,
];

/// Run the fixed known-answer tests; any mismatch maps to
/// [`Error::Selftest`].
pub fn selftest() -> Result<()> {
    // hash cores
    if bash256_hash(&[]) != BASH256_EMPTY {
        return Err(Error::Selftest);
    }
    let hash = belt_hash(&TEST_MESSAGE);

    // key derivation and the standard signature
    let private = PrivateKey::from_bytes(&TEST_PRIVATE).map_err(|_| Error::Selftest)?;
    let public = private.public(&CURVE_256V1).map_err(|_| Error::Selftest)?;
    if public.as_bytes() != TEST_PUBLIC {
        return Err(Error::Selftest);
    }
    verify(&CURVE_256V1, &public, &hash, &TEST_SIG).map_err(|_| Error::Selftest)?;

    // a fresh deterministic signature must round-trip
    let sig = sign_deterministic(&CURVE_256V1, &private, &hash, &[]).map_err(|_| Error::Selftest)?;
    verify(&CURVE_256V1, &public, &hash, &sig).map_err(|_| Error::Selftest)?;

    // and a corrupted one must not
    let mut bad = TEST_SIG;
    bad[0] ^= 1;
    match verify(&CURVE_256V1, &public, &hash, &bad) {
        Err(Error::BadSig) => {}
        _ => return Err(Error::Selftest),
    }
    let _ = PublicKey::from_bytes(&CURVE_256V1, &TEST_PUBLIC).map_err(|_| Error::Selftest)?;
    Ok(())
}
