// Copyright (c) 2024 Botho Foundation

//! Sign, verify, extract, print: the orchestration over envelopes,
//! chains and the hash binding. Every entry point runs the known-answer
//! self-test first and maps any failure to a single error kind.

use crate::{hash_file, Envelope, Error, Result};
use rand_core::CryptoRngCore;
use stb_bign::{selftest, PrivateKey, PublicKey};
use stb_cvc::{cvc_match, cvcs_find, cvcs_get_last, cvcs_val, Cvc, Date};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What [`sig_extract`] pulls out of a signed file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// The payload without the embedded trailer.
    Body,
    /// The raw trailer bytes as stored.
    Sig,
    /// The n-th certificate of the embedded chain (zero-based).
    Cert(usize),
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    File::open(path)
        .map_err(|_| Error::FileOpen)?
        .read_to_end(&mut buf)
        .map_err(|_| Error::FileRead)?;
    Ok(buf)
}

/// Collect certificate files into one flat blob, in order.
fn collect_certs(cert_files: &[PathBuf]) -> Result<Vec<u8>> {
    let mut certs = Vec::new();
    for path in cert_files {
        let one = read_file(path)?;
        // each file must hold exactly one certificate
        if stb_cvc::cvc_len(&one)? != one.len() {
            return Err(Error::BadCert);
        }
        certs.extend_from_slice(&one);
    }
    Ok(certs)
}

/// Sign `file`, writing the envelope trailer to `sig_file`. When the
/// two paths are equal the trailer is appended to the payload in place;
/// otherwise the sidecar holds the whole trailer. `date` binds the
/// chain-validation date into the hash (`Date::ZERO` leaves it
/// unbound); the RNG, when given, seeds the deterministic nonce
/// derivation with fresh entropy.
pub fn sig_sign(
    file: &Path,
    sig_file: &Path,
    private: &PrivateKey,
    cert_files: &[PathBuf],
    date: Date,
    mut rng: Option<&mut dyn CryptoRngCore>,
) -> Result<()> {
    selftest()?;
    let certs = collect_certs(cert_files)?;
    if !certs.is_empty() {
        cvcs_val(&certs, Some(&date))?;
        let (off, len) = cvcs_get_last(&certs)?;
        cvc_match(&certs[off..off + len], private)?;
    }

    let level = private.level();
    let params = stb_bign::params_for_level(level)?;
    let hash = hash_file(file, 0, &certs, Some(&date), level)?;

    // nonce seed: fresh bytes when an RNG is present, empty otherwise
    let seed = match rng.as_deref_mut() {
        Some(rng) => {
            let mut seed = vec![0u8; level.privkey_len()];
            rng.fill_bytes(&mut seed);
            seed
        }
        None => Vec::new(),
    };
    let sig = stb_bign::sign_deterministic(params, private, &hash, &seed)?;

    let envelope = Envelope {
        certs,
        date: if date.is_zero() { None } else { Some(date) },
        sig,
    };
    let trailer = envelope.trailer()?;
    debug!(len = trailer.len(), embedded = (file == sig_file), "writing trailer");

    if file == sig_file {
        let mut out = OpenOptions::new()
            .append(true)
            .open(sig_file)
            .map_err(|_| Error::FileOpen)?;
        out.write_all(&trailer).map_err(|_| Error::FileWrite)?;
    } else {
        let mut out = File::create(sig_file).map_err(|_| Error::FileCreate)?;
        out.write_all(&trailer).map_err(|_| Error::FileWrite)?;
    }
    Ok(())
}

/// Read the envelope governing `file`: from `file`'s own tail when the
/// signature is embedded, from the sidecar otherwise (then the sidecar
/// must hold nothing but the trailer). Returns the envelope and the
/// number of payload bytes to drop from the hash.
fn load_envelope(file: &Path, sig_file: &Path) -> Result<(Envelope, u64)> {
    let (envelope, env_len, sig_total) = Envelope::read_tail(sig_file)?;
    if file == sig_file {
        Ok((envelope, env_len as u64))
    } else {
        if env_len as u64 != sig_total {
            return Err(Error::BadFormat);
        }
        Ok((envelope, 0))
    }
}

fn verify_with_pubkey(
    file: &Path,
    envelope: &Envelope,
    drop: u64,
    public: &PublicKey,
) -> Result<()> {
    let level = public.level();
    let params = stb_bign::params_for_level(level)?;
    let hash = hash_file(file, drop, &envelope.certs, envelope.date.as_ref(), level)?;
    stb_bign::verify(params, public, &hash, &envelope.sig)
}

/// Verify against an explicit public key. An embedded chain, when
/// present, must validate and end at this key.
pub fn sig_verify(file: &Path, sig_file: &Path, public: &PublicKey) -> Result<()> {
    selftest()?;
    let (envelope, drop) = load_envelope(file, sig_file)?;
    if !envelope.certs.is_empty() {
        cvcs_val(&envelope.certs, envelope.date.as_ref())?;
        let (off, len) = cvcs_get_last(&envelope.certs)?;
        let leaf = Cvc::unwrap(&envelope.certs[off..off + len], Some(public.as_bytes()))?;
        debug!(holder = %leaf.chr, "chain ends at the expected key");
    }
    verify_with_pubkey(file, &envelope, drop, public)
}

/// Verify against a pinned trust anchor: the anchor certificate must
/// occur byte-exactly in the embedded chain, the chain from it must
/// validate, and the signature must be by the last holder.
pub fn sig_verify_anchor(file: &Path, sig_file: &Path, anchor: &[u8]) -> Result<()> {
    selftest()?;
    let (envelope, drop) = load_envelope(file, sig_file)?;
    let offset = cvcs_find(&envelope.certs, anchor)?;
    cvcs_val(&envelope.certs[offset..], envelope.date.as_ref())?;
    let (off, len) = cvcs_get_last(&envelope.certs)?;
    let leaf = Cvc::unwrap(&envelope.certs[off..off + len], None)?;
    let params = stb_bign::params_by_oid(&leaf.curve_oid)?;
    let public = PublicKey::from_bytes(params, &leaf.pubkey)?;
    verify_with_pubkey(file, &envelope, drop, &public)
}

/// Copy the requested piece of a signed file into `out_file`.
pub fn sig_extract(out_file: &Path, file: &Path, sig_file: &Path, scope: Scope) -> Result<()> {
    let (envelope, env_len, total) = Envelope::read_tail(sig_file)?;
    let embedded = file == sig_file;
    let mut out = File::create(out_file).map_err(|_| Error::FileCreate)?;
    match scope {
        Scope::Body => {
            if !embedded {
                // a sidecar leaves the payload file untouched
                let body = read_file(file)?;
                out.write_all(&body).map_err(|_| Error::FileWrite)?;
                return Ok(());
            }
            let mut src = File::open(file).map_err(|_| Error::FileOpen)?;
            let mut remaining = total - env_len as u64;
            let mut buf = [0u8; 4096];
            while remaining > 0 {
                let want = remaining.min(4096) as usize;
                src.read_exact(&mut buf[..want]).map_err(|_| Error::FileRead)?;
                out.write_all(&buf[..want]).map_err(|_| Error::FileWrite)?;
                remaining -= want as u64;
            }
        }
        Scope::Sig => {
            let mut src = File::open(sig_file).map_err(|_| Error::FileOpen)?;
            src.seek(SeekFrom::End(-(env_len as i64)))
                .map_err(|_| Error::FileRead)?;
            let mut trailer = vec![0u8; env_len];
            src.read_exact(&mut trailer).map_err(|_| Error::FileRead)?;
            out.write_all(&trailer).map_err(|_| Error::FileWrite)?;
        }
        Scope::Cert(index) => {
            let mut offset = 0;
            let mut walked = 0usize;
            loop {
                if offset >= envelope.certs.len() {
                    return Err(Error::BadCert);
                }
                let len = stb_cvc::cvc_len(&envelope.certs[offset..])?;
                if walked == index {
                    out.write_all(&envelope.certs[offset..offset + len])
                        .map_err(|_| Error::FileWrite)?;
                    break;
                }
                offset += len;
                walked += 1;
            }
        }
    }
    Ok(())
}

/// Human-readable dump: certificate count, bound date, signature hex.
pub fn sig_print(out: &mut dyn Write, sig_file: &Path) -> Result<()> {
    let (envelope, _, _) = Envelope::read_tail(sig_file)?;
    let mut count = 0usize;
    let mut offset = 0usize;
    while offset < envelope.certs.len() {
        offset += stb_cvc::cvc_len(&envelope.certs[offset..])?;
        count += 1;
    }
    writeln!(out, "certs: {count}").map_err(|_| Error::FileWrite)?;
    if let Some(date) = &envelope.date {
        let d = date.as_bytes();
        writeln!(
            out,
            "date: {}{}{}{}{}{}",
            d[0], d[1], d[2], d[3], d[4], d[5]
        )
        .map_err(|_| Error::FileWrite)?;
    }
    let hex: String = envelope.sig.iter().map(|b| format!("{b:02X}")).collect();
    writeln!(out, "sig: {hex}").map_err(|_| Error::FileWrite)?;
    Ok(())
}
