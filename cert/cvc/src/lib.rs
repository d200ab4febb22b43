// Copyright (c) 2024 Botho Foundation

#![no_std]
#![deny(unsafe_code)]

//! Card Verifiable Certificates: the compact, TR-03110-flavored
//! certificate format the signature tooling pins its trust to.
//!
//! A certificate is one application-tagged TLV:
//!
//! ```text
//! 7F21  CV certificate
//! ├─ 7F4E  body
//! │   ├─ 5F29  profile identifier (0)
//! │   ├─ 42    CAR — issuing authority reference
//! │   ├─ 7F49  public key: 06 curve OID, 86 raw point (x ‖ y, LE)
//! │   ├─ 5F20  CHR — holder reference
//! │   ├─ 7F4C  holder authorization (eid), optional
//! │   ├─ 7F4C  holder authorization (esign), optional
//! │   ├─ 5F25  valid from  (six decimal digit bytes, yymmdd)
//! │   └─ 5F24  valid until
//! └─ 5F37  signature by the issuer over the whole body TLV
//! ```
//!
//! Chains are flat byte runs of such TLVs, walked linearly; no graph of
//! parsed certificates is ever built.

extern crate alloc;

mod chain;
mod date;

pub use chain::{cvc_match, cvc_val, cvcs_find, cvcs_get_last, cvcs_val};
pub use date::Date;

use alloc::string::String;
use alloc::vec::Vec;
use stb_bign::{Level, LevelHash, PrivateKey};
use stb_common::{Error, Result};
use stb_der::{Decoder, Encoder};

/// Tag numbers of the profile.
pub(crate) mod tag {
    pub const CERT: u32 = 0x7F21;
    pub const BODY: u32 = 0x7F4E;
    pub const PROFILE: u32 = 0x5F29;
    pub const CAR: u32 = 0x42;
    pub const PUBKEY: u32 = 0x7F49;
    pub const PUBKEY_POINT: u32 = 0x86;
    pub const CHR: u32 = 0x5F20;
    pub const HAT: u32 = 0x7F4C;
    pub const HAT_FLAGS: u32 = 0x53;
    pub const FROM: u32 = 0x5F25;
    pub const UNTIL: u32 = 0x5F24;
    pub const SIG: u32 = 0x5F37;
}

/// Holder-authorization OIDs (eid and esign templates).
pub const OID_HAT_EID: &str = "1.2.112.0.2.0.34.101.79.6.1";
pub const OID_HAT_ESIGN: &str = "1.2.112.0.2.0.34.101.79.6.2";

/// A parsed certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cvc {
    /// Issuing authority reference.
    pub car: String,
    /// Holder reference.
    pub chr: String,
    /// Curve OID of the held public key.
    pub curve_oid: String,
    /// Raw public key, `x ‖ y` little-endian; 48, 64, 96 or 128 bytes.
    pub pubkey: Vec<u8>,
    /// Validity window start.
    pub from: Date,
    /// Validity window end.
    pub until: Date,
    /// eid authorization flags, when present.
    pub hat_eid: Option<[u8; 5]>,
    /// esign authorization flags, when present.
    pub hat_esign: Option<[u8; 2]>,
}

/// Byte length of the outermost certificate TLV at the head of `buf`.
pub fn cvc_len(buf: &[u8]) -> Result<usize> {
    let mut dec = Decoder::new(buf);
    if dec.peek_tag().map_err(|_| Error::BadFormat)? != tag::CERT {
        return Err(Error::BadFormat);
    }
    Decoder::tlv_len(buf).map_err(|_| Error::BadFormat)
}

impl Cvc {
    /// Security level implied by the public key width.
    pub fn level(&self) -> Result<Level> {
        Level::from_pubkey_len(self.pubkey.len())
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        if Level::from_pubkey_len(self.pubkey.len()).is_err() {
            return Err(Error::BadPubkey);
        }
        if !self.from.le(&self.until) {
            return Err(Error::BadDate);
        }
        let mut enc = Encoder::new();
        let body = enc.seq_start(tag::BODY);
        enc.size(tag::PROFILE, 0);
        enc.printable_string(tag::CAR, &self.car)
            .map_err(|_| Error::BadInput)?;
        let key = enc.seq_start(tag::PUBKEY);
        enc.oid(0x06, &self.curve_oid).map_err(|_| Error::BadInput)?;
        enc.octet_string(tag::PUBKEY_POINT, &self.pubkey);
        enc.seq_stop(key);
        enc.printable_string(tag::CHR, &self.chr)
            .map_err(|_| Error::BadInput)?;
        if let Some(flags) = &self.hat_eid {
            let hat = enc.seq_start(tag::HAT);
            enc.oid(0x06, OID_HAT_EID).map_err(|_| Error::BadInput)?;
            enc.octet_string(tag::HAT_FLAGS, flags);
            enc.seq_stop(hat);
        }
        if let Some(flags) = &self.hat_esign {
            let hat = enc.seq_start(tag::HAT);
            enc.oid(0x06, OID_HAT_ESIGN).map_err(|_| Error::BadInput)?;
            enc.octet_string(tag::HAT_FLAGS, flags);
            enc.seq_stop(hat);
        }
        enc.octet_string(tag::FROM, self.from.as_bytes());
        enc.octet_string(tag::UNTIL, self.until.as_bytes());
        enc.seq_stop(body);
        Ok(enc.into_vec())
    }

    /// Encode and sign with the issuer's private key; the signature
    /// covers the body TLV and its width follows the issuer's level.
    pub fn wrap(&self, issuer_key: &PrivateKey) -> Result<Vec<u8>> {
        let body = self.encode_body()?;
        let params = stb_bign::params_for_level(issuer_key.level())?;
        let hash = LevelHash::hash(params.level, &body);
        let sig = stb_bign::sign_deterministic(params, issuer_key, &hash, &[])?;
        let mut enc = Encoder::new();
        let outer = enc.seq_start(tag::CERT);
        enc.raw(&body);
        enc.octet_string(tag::SIG, &sig);
        enc.seq_stop(outer);
        Ok(enc.into_vec())
    }

    /// Parse a certificate, returning the structure plus the spans the
    /// validators need: the body TLV and the signature value.
    pub(crate) fn parse_spans(der: &[u8]) -> Result<(Cvc, Vec<u8>, Vec<u8>)> {
        let mut top = Decoder::new(der);
        let mut cert = top.seq(tag::CERT).map_err(|_| Error::BadFormat)?;
        top.finish().map_err(|_| Error::BadFormat)?;

        let body_tlv_len = Decoder::tlv_len(cert.remaining()).map_err(|_| Error::BadFormat)?;
        let body_tlv = cert.remaining()[..body_tlv_len].to_vec();

        let mut body = cert.seq(tag::BODY).map_err(|_| Error::BadFormat)?;
        let profile = body.size(tag::PROFILE).map_err(|_| Error::BadFormat)?;
        if profile != 0 {
            return Err(Error::BadCert);
        }
        let car = body
            .printable_string(tag::CAR)
            .map_err(|_| Error::BadFormat)?;
        let mut key = body.seq(tag::PUBKEY).map_err(|_| Error::BadFormat)?;
        let curve_oid = key.oid(0x06).map_err(|_| Error::BadFormat)?;
        let pubkey = key
            .octet_string(tag::PUBKEY_POINT)
            .map_err(|_| Error::BadFormat)?;
        key.finish().map_err(|_| Error::BadFormat)?;
        if Level::from_pubkey_len(pubkey.len()).is_err() {
            return Err(Error::BadPubkey);
        }
        let chr = body
            .printable_string(tag::CHR)
            .map_err(|_| Error::BadFormat)?;

        let mut hat_eid = None;
        let mut hat_esign = None;
        while let Some(hat_bytes) = body.optional(tag::HAT).map_err(|_| Error::BadFormat)? {
            let mut hat = Decoder::new(hat_bytes);
            let oid = hat.oid(0x06).map_err(|_| Error::BadFormat)?;
            let flags = hat
                .octet_string(tag::HAT_FLAGS)
                .map_err(|_| Error::BadFormat)?;
            hat.finish().map_err(|_| Error::BadFormat)?;
            match oid.as_str() {
                OID_HAT_EID => {
                    hat_eid = Some(flags.try_into().map_err(|_| Error::BadCert)?);
                }
                OID_HAT_ESIGN => {
                    hat_esign = Some(flags.try_into().map_err(|_| Error::BadCert)?);
                }
                _ => return Err(Error::BadCert),
            }
        }

        let from = Date::from_wire(
            body.octet_string(tag::FROM).map_err(|_| Error::BadFormat)?,
        )?;
        let until = Date::from_wire(
            body.octet_string(tag::UNTIL)
                .map_err(|_| Error::BadFormat)?,
        )?;
        if !from.le(&until) {
            return Err(Error::BadCert);
        }
        body.finish().map_err(|_| Error::BadFormat)?;

        let sig = cert.octet_string(tag::SIG).map_err(|_| Error::BadFormat)?;
        cert.finish().map_err(|_| Error::BadFormat)?;

        Ok((
            Cvc {
                car: car.into(),
                chr: chr.into(),
                curve_oid,
                pubkey: pubkey.to_vec(),
                from,
                until,
                hat_eid,
                hat_esign,
            },
            body_tlv,
            sig.to_vec(),
        ))
    }

    /// Parse a certificate; optionally cross-check the held public key.
    pub fn unwrap(der: &[u8], expected_pubkey: Option<&[u8]>) -> Result<Cvc> {
        let (cvc, _, _) = Self::parse_spans(der)?;
        if let Some(expected) = expected_pubkey {
            if expected != cvc.pubkey.as_slice() {
                return Err(Error::BadPubkey);
            }
        }
        Ok(cvc)
    }
}
