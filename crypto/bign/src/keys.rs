// Copyright (c) 2024 Botho Foundation

//! Key material. Private keys are reduced scalars in little-endian
//! form, zeroized on drop and redacted from debug output; public keys
//! carry both affine coordinates and are validated against the curve on
//! entry.

use crate::{Error, Level, Params, Result};
use alloc::vec;
use alloc::vec::Vec;
use rand_core::CryptoRngCore;
use stb_bignum::{ww, zz, Word, WORD_BYTES};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A bign private key: a scalar in `[1, q)`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    #[zeroize(skip)]
    level: Level,
    d: Vec<u8>,
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PrivateKey({:?}, [REDACTED])", self.level)
    }
}

impl PrivateKey {
    /// Import a little-endian scalar; the length selects the level.
    /// Zero scalars are rejected; range against `q` is enforced when
    /// the parameter set is available.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let level = Level::from_privkey_len(bytes.len())?;
        if bytes.iter().all(|&b| b == 0) {
            return Err(Error::BadPrivkey);
        }
        if let Ok(params) = crate::params_for_level(level) {
            let n = bytes.len().div_ceil(WORD_BYTES);
            let mut d = vec![0 as Word; n + 1];
            ww::from_le_bytes(&mut d[..n], bytes);
            let mut q = vec![0 as Word; n + 1];
            ww::from_le_bytes(&mut q, params.order);
            if !bool::from(ww::lt_ct(&d, &q)) {
                return Err(Error::BadPrivkey);
            }
        }
        Ok(Self {
            level,
            d: bytes.to_vec(),
        })
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The scalar bytes (little-endian).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.d
    }

    /// Derive the public key.
    pub fn public(&self, params: &Params) -> Result<PublicKey> {
        debug_assert_eq!(params.level, self.level);
        let group = params.group()?;
        let n = group.field().n();
        let mut d = vec![0 as Word; n];
        ww::from_le_bytes(&mut d, &self.d);
        let (x, y) = group.mul_base(&d, None).ok_or(Error::BadPrivkey)?;
        let mut bytes = vec![0u8; self.level.pubkey_len()];
        let half = self.level.field_len();
        bytes[..half].copy_from_slice(&group.field().to_bytes(&x));
        bytes[half..].copy_from_slice(&group.field().to_bytes(&y));
        d.zeroize();
        Ok(PublicKey {
            level: self.level,
            q: bytes,
        })
    }
}

/// A bign public key: affine coordinates `x ‖ y`, little-endian each.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey {
    level: Level,
    q: Vec<u8>,
}

impl PublicKey {
    /// Import and validate: both coordinates must be canonical field
    /// elements and the point must satisfy the curve equation.
    pub fn from_bytes(params: &Params, bytes: &[u8]) -> Result<Self> {
        let level = Level::from_pubkey_len(bytes.len())?;
        if level != params.level {
            return Err(Error::BadPubkey);
        }
        let group = params.group()?;
        let half = level.field_len();
        let x = group
            .field()
            .from_bytes(&bytes[..half])
            .map_err(|_| Error::BadPubkey)?;
        let y = group
            .field()
            .from_bytes(&bytes[half..])
            .map_err(|_| Error::BadPubkey)?;
        if !group.on_curve(&x, &y) {
            return Err(Error::BadPubkey);
        }
        Ok(Self {
            level,
            q: bytes.to_vec(),
        })
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.q
    }
}

/// Generate a fresh keypair on the level's standard curve.
pub fn keypair(
    params: &'static Params,
    rng: &mut dyn CryptoRngCore,
) -> Result<(PrivateKey, PublicKey)> {
    let group = params.group()?;
    let tq = ww::word_size(group.order());
    let mut d = vec![0 as Word; tq];
    if !zz::rand_nz_mod(&mut d, &group.order()[..tq], rng) {
        return Err(Error::RngExhausted);
    }
    let mut bytes = vec![0u8; params.level.privkey_len()];
    ww::to_le_bytes(&mut bytes, &d);
    d.zeroize();
    let private = PrivateKey {
        level: params.level,
        d: bytes,
    };
    let public = private.public(params)?;
    Ok((private, public))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CURVE_256V1;
    use hex_literal::hex;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn standard_public_key_derivation() {
        // STB 34.101.45 test key
        let private = PrivateKey::from_bytes(&hex!(
            "1F66B5B84B7339674533F0329C74F21834281FED0732429E0C79235FC273E269"
        ))
        .unwrap();
        let public = private.public(&CURVE_256V1).unwrap();
        assert_eq!(
            public.as_bytes(),
            hex!(
                "BD1A5650179D79E03FCEE49D4C2BD5DDF54CE46D0CF11E4FF87BF7A890857FD0"
                "7AC6A60361E8C8173491686D461B2826190C2EDA5909054A9AB84D2AB9D99A90"
            )
        );
    }

    #[test]
    fn key_validation_rejects_garbage() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
        // a point off the curve
        let mut bad = [0x11u8; 64];
        bad[0] = 0x12;
        assert!(PublicKey::from_bytes(&CURVE_256V1, &bad).is_err());
        // coordinate not below p
        let mut oversize = [0xFFu8; 64];
        oversize[32] = 0;
        assert!(PublicKey::from_bytes(&CURVE_256V1, &oversize).is_err());
    }

    #[test]
    fn generated_keys_round_trip() {
        let mut rng = ChaCha20Rng::seed_from_u64(81);
        let (private, public) = keypair(&CURVE_256V1, &mut rng).unwrap();
        let re = PrivateKey::from_bytes(private.as_bytes()).unwrap();
        assert_eq!(re.public(&CURVE_256V1).unwrap(), public);
        assert!(PublicKey::from_bytes(&CURVE_256V1, public.as_bytes()).is_ok());
    }
}
