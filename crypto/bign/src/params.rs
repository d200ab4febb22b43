// Copyright (c) 2024 Botho Foundation

//! Named parameter sets.
//!
//! Only bign-curve256v1 ships with its constants embedded; the other
//! levels are registered — lengths, hash binding, identifiers — so that
//! every length-dispatch table in the stack covers them, and resolve to
//! `BadParams` if their curve is actually requested.

use crate::{Error, Result};
use stb_ec::{EcGroup, PrimeField};

/// Security level of a parameter set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Level {
    /// 96-bit level over a 192-bit curve.
    L96,
    /// 128-bit level over a 256-bit curve.
    L128,
    /// 192-bit level over a 384-bit curve.
    L192,
    /// 256-bit level over a 512-bit curve.
    L256,
}

impl Level {
    /// Field element and private-key width in bytes.
    pub const fn field_len(self) -> usize {
        match self {
            Level::L96 => 24,
            Level::L128 => 32,
            Level::L192 => 48,
            Level::L256 => 64,
        }
    }

    /// Private-key width: the width of a reduced scalar.
    pub const fn privkey_len(self) -> usize {
        self.field_len()
    }

    /// Public-key width: two coordinates.
    pub const fn pubkey_len(self) -> usize {
        2 * self.field_len()
    }

    /// First signature half `S0`.
    pub const fn s0_len(self) -> usize {
        match self {
            Level::L96 => 10,
            Level::L128 => 16,
            Level::L192 => 24,
            Level::L256 => 32,
        }
    }

    /// Total signature width.
    pub const fn sig_len(self) -> usize {
        self.s0_len() + self.field_len()
    }

    /// Width of the bound hash.
    pub const fn hash_len(self) -> usize {
        self.field_len()
    }

    /// OID of the hash algorithm the level binds.
    pub const fn hash_oid(self) -> &'static str {
        match self {
            Level::L96 | Level::L128 => "1.2.112.0.2.0.34.101.31.81",
            Level::L192 => "1.2.112.0.2.0.34.101.77.12",
            Level::L256 => "1.2.112.0.2.0.34.101.77.13",
        }
    }

    /// Level from a private-key length.
    pub fn from_privkey_len(len: usize) -> Result<Self> {
        match len {
            24 => Ok(Level::L96),
            32 => Ok(Level::L128),
            48 => Ok(Level::L192),
            64 => Ok(Level::L256),
            _ => Err(Error::BadPrivkey),
        }
    }

    /// Level from a public-key length.
    pub fn from_pubkey_len(len: usize) -> Result<Self> {
        match len {
            48 => Ok(Level::L96),
            64 => Ok(Level::L128),
            96 => Ok(Level::L192),
            128 => Ok(Level::L256),
            _ => Err(Error::BadPubkey),
        }
    }

    /// Level from a signature length.
    pub fn from_sig_len(len: usize) -> Result<Self> {
        match len {
            34 => Ok(Level::L96),
            48 => Ok(Level::L128),
            72 => Ok(Level::L192),
            96 => Ok(Level::L256),
            _ => Err(Error::BadSig),
        }
    }
}

/// A named curve: identifiers plus the little-endian parameter strings.
#[derive(Debug)]
pub struct Params {
    pub oid: &'static str,
    pub level: Level,
    pub p: &'static [u8],
    pub a: &'static [u8],
    pub b: &'static [u8],
    pub base_x: &'static [u8],
    pub base_y: &'static [u8],
    pub order: &'static [u8],
    pub cofactor: u32,
}

impl Params {
    /// Materialize the curve group.
    pub fn group(&self) -> Result<EcGroup> {
        let field = PrimeField::new(self.p).map_err(|_| Error::BadParams)?;
        EcGroup::new(
            field,
            self.a,
            self.b,
            self.base_x,
            self.base_y,
            self.order,
            self.cofactor,
        )
        .map_err(|_| Error::BadParams)
    }
}

/// bign-curve256v1: `p = 2^256 - 189` (a Crandall prime), `A = -3`.
pub static CURVE_256V1: Params = Params {
    oid: "1.2.112.0.2.0.34.101.45.3.1",
    level: Level::L128,
    p: &[
        0x43, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFF,
    ],
    a: &[
        0x40, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFF,
    ],
    b: &[
        0xF1, 0x03, 0x9C, 0xD6, 0x6B, 0x7D, 0x2E, 0xB2, 0x53, 0x92, 0x8B, 0x97, 0x69, 0x50, 0xF5,
        0x4C, 0xBE, 0xFB, 0xD8, 0xE4, 0xAB, 0x3A, 0xC1, 0xD2, 0xED, 0xA8, 0xF3, 0x15, 0x15, 0x6C,
        0xCE, 0x77,
    ],
    base_x: &[0; 32],
    base_y: &[
        0x93, 0x6A, 0x51, 0x04, 0x18, 0xCF, 0x29, 0x1E, 0x52, 0xF6, 0x08, 0xC4, 0x66, 0x39, 0x91,
        0x78, 0x5D, 0x83, 0xD6, 0x51, 0xA3, 0xC9, 0xE4, 0x5C, 0x9F, 0xD6, 0x16, 0xFB, 0x3C, 0xFC,
        0xF7, 0x6B,
    ],
    order: &[
        0x07, 0x66, 0x3D, 0x26, 0x99, 0xBF, 0x5A, 0x7E, 0xFC, 0x4D, 0xFB, 0x0D, 0xD6, 0x8E, 0x5C,
        0xD9, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFF,
    ],
    cofactor: 1,
};

/// Registered identifiers of the remaining levels. Their curve
/// constants are not embedded in this build.
const REGISTERED: [(&str, Level); 3] = [
    ("1.2.112.0.2.0.34.101.45.3.0", Level::L96),
    ("1.2.112.0.2.0.34.101.45.3.2", Level::L192),
    ("1.2.112.0.2.0.34.101.45.3.3", Level::L256),
];

/// Parameter set by curve OID.
pub fn params_by_oid(oid: &str) -> Result<&'static Params> {
    if oid == CURVE_256V1.oid {
        return Ok(&CURVE_256V1);
    }
    if REGISTERED.iter().any(|(o, _)| *o == oid) {
        return Err(Error::BadParams); // known name, constants not built in
    }
    Err(Error::BadParams)
}

/// Parameter set by security level.
pub fn params_for_level(level: Level) -> Result<&'static Params> {
    match level {
        Level::L128 => Ok(&CURVE_256V1),
        _ => Err(Error::BadParams),
    }
}
