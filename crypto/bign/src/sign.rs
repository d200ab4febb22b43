// Copyright (c) 2024 Botho Foundation

//! Signature generation and verification.
//!
//! For a level-`l` set with order `q`, hash `H` and one-time key `k`:
//!
//! ```text
//! R  = k·G
//! S0 = ⟨h(OID(h) ‖ ⟨R.x⟩ ‖ H)⟩ truncated to the S0 width
//! S1 = (k - H - (S0 + 2^(8·|S0|))·d) mod q
//! ```
//!
//! Verification recomputes `R = ((S1 + H) mod q)·G + (S0 + 2^(8·|S0|))·Q`
//! and compares the rebuilt S0 binding. All integers are little-endian
//! byte strings.

use crate::{Error, LevelHash, Params, PrivateKey, PublicKey, Result};
use alloc::vec;
use alloc::vec::Vec;
use rand_core::CryptoRngCore;
use stb_bignum::{ww, zz, Word, WORD_BYTES};
use stb_der::Encoder;
use stb_ec::EcGroup;
use zeroize::Zeroize;

/// DER of the level's hash-algorithm OID, the prefix of the S0 binding.
fn hash_oid_der(params: &Params) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.oid(0x06, params.level.hash_oid())
        .expect("registered OIDs are well-formed");
    enc.into_vec()
}

/// Scratch: scalar arithmetic mod q over (n+1)-word buffers.
struct OrderCtx {
    q: Vec<Word>,
}

impl OrderCtx {
    fn new(group: &EcGroup) -> Self {
        let tq = ww::word_size(group.order());
        Self {
            q: group.order()[..tq].to_vec(),
        }
    }

    fn n(&self) -> usize {
        self.q.len()
    }

    /// Little-endian bytes reduced mod q.
    fn from_bytes_reduced(&self, bytes: &[u8]) -> Vec<Word> {
        let wide = bytes.len().div_ceil(WORD_BYTES).max(self.n());
        let mut t = vec![0 as Word; wide];
        ww::from_le_bytes(&mut t[..bytes.len().div_ceil(WORD_BYTES)], bytes);
        let mut r = vec![0 as Word; self.n()];
        zz::rem(&mut r, &t, &self.q);
        r
    }
}

/// Compute the S0 binding for a given `R.x`.
fn s0_binding(params: &Params, oid_der: &[u8], rx: &[u8], hash: &[u8]) -> Vec<u8> {
    let mut h = LevelHash::new(params.level);
    h.update(oid_der);
    h.update(rx);
    h.update(hash);
    let mut t = h.finish();
    t.truncate(params.level.s0_len());
    t
}

fn sign_with_nonce(
    params: &Params,
    private: &PrivateKey,
    hash: &[u8],
    k: &[Word],
    group: &EcGroup,
    rng: Option<&mut dyn CryptoRngCore>,
) -> Result<Vec<u8>> {
    let ctx = OrderCtx::new(group);
    let oid_der = hash_oid_der(params);

    let (rx, _ry) = group.mul_base(k, rng).ok_or(Error::BadParams)?;
    let rx_bytes = group.field().to_bytes(&rx);
    let s0 = s0_binding(params, &oid_der, &rx_bytes, hash);

    // S1 = (k - H - (S0 + 2^(8·|S0|))·d) mod q
    let n = ctx.n();
    let h_red = ctx.from_bytes_reduced(hash);
    // s0_ext = S0 + 2^(8·|S0|)
    let mut s0_ext = vec![0 as Word; n];
    ww::from_le_bytes(&mut s0_ext[..(s0.len() + 1).div_ceil(WORD_BYTES)], &s0);
    ww::set_bit(&mut s0_ext, 8 * s0.len(), true);
    let mut d = vec![0 as Word; n];
    ww::from_le_bytes(&mut d, private.as_bytes());

    let mut prod = vec![0 as Word; 2 * n];
    zz::mul(&mut prod, &s0_ext, &d);
    let mut s0d = vec![0 as Word; n];
    zz::rem(&mut s0d, &prod, &ctx.q);

    let mut k_red = vec![0 as Word; n];
    zz::rem(&mut k_red, k, &ctx.q);
    let mut s1 = vec![0 as Word; n];
    zz::mod_sub(&mut s1, &k_red, &h_red, &ctx.q);
    let t = s1.clone();
    zz::mod_sub(&mut s1, &t, &s0d, &ctx.q);

    let mut sig = vec![0u8; params.level.sig_len()];
    sig[..s0.len()].copy_from_slice(&s0);
    ww::to_le_bytes(&mut sig[s0.len()..], &s1);
    d.zeroize();
    k_red.zeroize();
    Ok(sig)
}

/// Sign a message hash with a fresh random one-time key.
pub fn sign(
    params: &Params,
    private: &PrivateKey,
    hash: &[u8],
    rng: &mut dyn CryptoRngCore,
) -> Result<Vec<u8>> {
    if hash.len() != params.level.hash_len() {
        return Err(Error::BadInput);
    }
    let group = params.group()?;
    let tq = ww::word_size(group.order());
    let mut k = vec![0 as Word; tq];
    if !zz::rand_nz_mod(&mut k, &group.order()[..tq], rng) {
        return Err(Error::RngExhausted);
    }
    let sig = sign_with_nonce(params, private, hash, &k, &group, Some(rng));
    k.zeroize();
    sig
}

/// Sign with the deterministic one-time key of the standard's no-RNG
/// path: `θ` is hashed out of the algorithm identifier, the private key
/// and the optional seed `t`, and candidates are drawn from a
/// θ-keyed pseudorandom walk over the message hash until one lands in
/// `[1, q)`.
pub fn sign_deterministic(
    params: &Params,
    private: &PrivateKey,
    hash: &[u8],
    seed: &[u8],
) -> Result<Vec<u8>> {
    if hash.len() != params.level.hash_len() {
        return Err(Error::BadInput);
    }
    let group = params.group()?;
    let ctx = OrderCtx::new(&group);
    let oid_der = hash_oid_der(params);

    let mut theta_src = LevelHash::new(params.level);
    theta_src.update(&oid_der);
    theta_src.update(private.as_bytes());
    theta_src.update(seed);
    let theta = theta_src.finish();

    let n = ctx.n();
    let mut k = vec![0 as Word; n];
    for counter in 0u32..64 {
        let mut prg = LevelHash::new(params.level);
        prg.update(&theta);
        prg.update(hash);
        prg.update(&counter.to_le_bytes());
        let candidate = prg.finish();
        ww::from_le_bytes(&mut k, &candidate[..params.level.privkey_len()]);
        if !ww::is_zero(&k) && bool::from(ww::lt_ct(&k, &ctx.q)) {
            let sig = sign_with_nonce(params, private, hash, &k, &group, None);
            k.zeroize();
            return sig;
        }
    }
    Err(Error::RngExhausted)
}

/// Verify a signature over a message hash.
pub fn verify(params: &Params, public: &PublicKey, hash: &[u8], sig: &[u8]) -> Result<()> {
    if hash.len() != params.level.hash_len() {
        return Err(Error::BadInput);
    }
    if sig.len() != params.level.sig_len() {
        return Err(Error::BadSig);
    }
    let group = params.group()?;
    let ctx = OrderCtx::new(&group);
    let n = ctx.n();
    let s0 = &sig[..params.level.s0_len()];
    let s1_bytes = &sig[params.level.s0_len()..];

    // S1 must be a reduced scalar
    let mut s1 = vec![0 as Word; n];
    ww::from_le_bytes(&mut s1, s1_bytes);
    if !bool::from(ww::lt_ct(&s1, &ctx.q)) {
        return Err(Error::BadSig);
    }

    // left scalar: (S1 + H) mod q
    let h_red = ctx.from_bytes_reduced(hash);
    let mut left = vec![0 as Word; n];
    zz::mod_add(&mut left, &s1, &h_red, &ctx.q);

    // right scalar: S0 + 2^(8·|S0|)
    let mut right = vec![0 as Word; n.max((s0.len() + 1).div_ceil(WORD_BYTES) + 1)];
    ww::from_le_bytes(&mut right[..(s0.len() + 1).div_ceil(WORD_BYTES)], s0);
    ww::set_bit(&mut right, 8 * s0.len(), true);

    // unpack Q
    let half = params.level.field_len();
    let qx = group
        .field()
        .from_bytes(&public.as_bytes()[..half])
        .map_err(|_| Error::BadPubkey)?;
    let qy = group
        .field()
        .from_bytes(&public.as_bytes()[half..])
        .map_err(|_| Error::BadPubkey)?;
    let (bx, by) = group.base_affine();
    let (bx, by) = (bx.to_vec(), by.to_vec());

    let (rx, _ry) = group
        .mul_add_vartime(&left, (&bx, &by), &right, (&qx, &qy))
        .ok_or(Error::BadSig)?;

    let oid_der = hash_oid_der(params);
    let rx_bytes = group.field().to_bytes(&rx);
    let t = s0_binding(params, &oid_der, &rx_bytes, hash);
    if t == s0 {
        Ok(())
    } else {
        Err(Error::BadSig)
    }
}
