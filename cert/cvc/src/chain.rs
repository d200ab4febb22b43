// Copyright (c) 2024 Botho Foundation

//! Chain validation over flat certificate runs.
//!
//! A chain is a byte string of concatenated certificates, first the
//! root (self-signed), each later one signed by its predecessor.
//! Validation walks the run linearly: signature, validity window
//! against the supplied date, issuer–subject linkage.

use crate::{cvc_len, Cvc, Date};
use alloc::vec::Vec;
use stb_bign::{LevelHash, PrivateKey, PublicKey};
use stb_common::{Error, Result};
use tracing::debug;

/// Validate one link: `cert` must be signed by the holder of `issuer`,
/// lie inside its validity window at `date` (when the date binds), and
/// name `issuer`'s holder as its authority. Returns the parsed subject.
pub fn cvc_val(cert: &[u8], issuer: &Cvc, date: Option<&Date>) -> Result<Cvc> {
    let (subject, body, sig) = Cvc::parse_spans(cert)?;

    // linkage
    if subject.car != issuer.chr {
        debug!(car = %subject.car, issuer = %issuer.chr, "issuer reference mismatch");
        return Err(Error::BadCert);
    }

    // window, unless the caller passed no date or the zero marker
    if let Some(date) = date {
        if !date.is_zero() && !(subject.from.le(date) && date.le(&subject.until)) {
            return Err(Error::BadCert);
        }
    }

    // signature by the issuer's key
    let params = stb_bign::params_by_oid(&issuer.curve_oid)?;
    let public = PublicKey::from_bytes(params, &issuer.pubkey)?;
    let hash = LevelHash::hash(params.level, &body);
    stb_bign::verify(params, &public, &hash, &sig).map_err(|_| Error::BadCert)?;
    Ok(subject)
}

/// Does the leaf certificate hold the public key of `private`?
pub fn cvc_match(cert: &[u8], private: &PrivateKey) -> Result<()> {
    let cvc = Cvc::unwrap(cert, None)?;
    let params = stb_bign::params_by_oid(&cvc.curve_oid)?;
    if params.level != private.level() {
        return Err(Error::BadPrivkey);
    }
    let public = private.public(params)?;
    if public.as_bytes() == cvc.pubkey.as_slice() {
        Ok(())
    } else {
        Err(Error::BadPrivkey)
    }
}

/// Split a flat run into certificate spans.
fn walk(certs: &[u8]) -> Result<Vec<(usize, usize)>> {
    let mut spans = Vec::new();
    let mut offset = 0;
    while offset < certs.len() {
        let len = cvc_len(&certs[offset..])?;
        spans.push((offset, len));
        offset += len;
    }
    Ok(spans)
}

/// Validate a whole chain against a date: the first certificate is the
/// self-signed root, every later one is checked against its
/// predecessor.
pub fn cvcs_val(certs: &[u8], date: Option<&Date>) -> Result<()> {
    let spans = walk(certs)?;
    let mut issuer: Option<Cvc> = None;
    for (i, &(offset, len)) in spans.iter().enumerate() {
        let cert = &certs[offset..offset + len];
        let subject = match &issuer {
            None => {
                // the root vouches for itself
                let (root, _, _) = Cvc::parse_spans(cert)?;
                cvc_val(cert, &root, date)?
            }
            Some(prev) => cvc_val(cert, prev, date)?,
        };
        debug!(index = i, holder = %subject.chr, "chain link valid");
        issuer = Some(subject);
    }
    Ok(())
}

/// Byte offset of the first certificate in `certs` equal to `anchor`;
/// `NoTrust` when the anchor never occurs.
pub fn cvcs_find(certs: &[u8], anchor: &[u8]) -> Result<usize> {
    for &(offset, len) in walk(certs)?.iter() {
        if &certs[offset..offset + len] == anchor {
            return Ok(offset);
        }
    }
    Err(Error::NoTrust)
}

/// Offset and length of the last certificate in the run.
pub fn cvcs_get_last(certs: &[u8]) -> Result<(usize, usize)> {
    walk(certs)?.last().copied().ok_or(Error::BadCert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{make_cert, test_key};

    fn two_cert_chain(leaf_until: Date) -> (Vec<u8>, PrivateKey) {
        let (root_priv, root_pub) = test_key(11);
        let (leaf_priv, leaf_pub) = test_key(12);
        let root = make_cert(
            "ROOT",
            "ROOT",
            root_pub.as_bytes(),
            Date::from_ymd(40, 12, 31).unwrap(),
            &root_priv,
        );
        let leaf = make_cert("ROOT", "USER0001", leaf_pub.as_bytes(), leaf_until, &root_priv);
        let mut chain = root;
        chain.extend_from_slice(&leaf);
        (chain, leaf_priv)
    }

    #[test]
    fn valid_chain_passes() {
        let (chain, leaf_priv) = two_cert_chain(Date::from_ymd(30, 1, 1).unwrap());
        let today = Date::from_ymd(25, 6, 15).unwrap();
        cvcs_val(&chain, Some(&today)).unwrap();
        cvcs_val(&chain, Some(&Date::ZERO)).unwrap();
        cvcs_val(&chain, None).unwrap();

        // the leaf is the last cert and matches its private key
        let (offset, len) = cvcs_get_last(&chain).unwrap();
        cvc_match(&chain[offset..offset + len], &leaf_priv).unwrap();
        // and the root can be pinned as an anchor
        let root_len = cvc_len(&chain).unwrap();
        assert_eq!(cvcs_find(&chain, &chain[..root_len]).unwrap(), 0);
        assert_eq!(
            cvcs_find(&chain, &chain[offset..offset + len]).unwrap(),
            offset
        );
        assert!(matches!(
            cvcs_find(&chain, b"not a certificate"),
            Err(Error::NoTrust)
        ));
    }

    #[test]
    fn expired_link_is_rejected() {
        // until 220101, validated at 230101
        let (chain, _) = two_cert_chain(Date::from_ymd(22, 1, 1).unwrap());
        let date = Date::from_ymd(23, 1, 1).unwrap();
        assert!(matches!(
            cvcs_val(&chain, Some(&date)),
            Err(Error::BadCert)
        ));
        // but a date inside the window passes
        let ok = Date::from_ymd(21, 7, 1).unwrap();
        cvcs_val(&chain, Some(&ok)).unwrap();
    }

    #[test]
    fn broken_linkage_and_signature_fail() {
        let (root_priv, root_pub) = test_key(13);
        let (_, leaf_pub) = test_key(14);
        let root = make_cert(
            "ROOT",
            "ROOT",
            root_pub.as_bytes(),
            Date::from_ymd(40, 1, 1).unwrap(),
            &root_priv,
        );
        // leaf claims a different authority
        let stray = make_cert(
            "OTHER",
            "USER0001",
            leaf_pub.as_bytes(),
            Date::from_ymd(30, 1, 1).unwrap(),
            &root_priv,
        );
        let mut chain = root.clone();
        chain.extend_from_slice(&stray);
        assert!(cvcs_val(&chain, None).is_err());

        // bit flip inside the root's signature
        let mut tampered = root;
        let last = tampered.len() - 1;
        tampered[last] ^= 0x01;
        assert!(cvcs_val(&tampered, None).is_err());

        // key that does not match the leaf
        let (wrong_priv, _) = test_key(15);
        let good = make_cert(
            "ROOT",
            "USER0001",
            leaf_pub.as_bytes(),
            Date::from_ymd(30, 1, 1).unwrap(),
            &root_priv,
        );
        assert!(cvc_match(&good, &wrong_priv).is_err());
    }
}
