// Copyright (c) 2024 Botho Foundation

//! End-to-end file signing: embedded and sidecar trailers, chain-backed
//! and bare-key verification, extraction and printing.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fs;
use std::path::PathBuf;
use stb_bign::{keypair, PrivateKey, PublicKey, CURVE_256V1};
use stb_cvc::{Cvc, Date};
use stb_sig::{sig_extract, sig_print, sig_sign, sig_verify, sig_verify_anchor, Envelope, Scope};

struct Fixture {
    dir: tempfile::TempDir,
    signer_priv: PrivateKey,
    signer_pub: PublicKey,
    root_cert: Vec<u8>,
    leaf_cert: Vec<u8>,
}

fn cert(car: &str, chr: &str, pubkey: &[u8], signer: &PrivateKey) -> Vec<u8> {
    Cvc {
        car: car.into(),
        chr: chr.into(),
        curve_oid: CURVE_256V1.oid.into(),
        pubkey: pubkey.to_vec(),
        from: Date::from_ymd(20, 1, 1).unwrap(),
        until: Date::from_ymd(35, 12, 31).unwrap(),
        hat_eid: None,
        hat_esign: Some([0x03, 0x01]),
    }
    .wrap(signer)
    .unwrap()
}

fn fixture() -> Fixture {
    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    let (root_priv, root_pub) = keypair(&CURVE_256V1, &mut rng).unwrap();
    let (signer_priv, signer_pub) = keypair(&CURVE_256V1, &mut rng).unwrap();
    let root_cert = cert("BYROOT01", "BYROOT01", root_pub.as_bytes(), &root_priv);
    let leaf_cert = cert("BYROOT01", "SIGNER01", signer_pub.as_bytes(), &root_priv);
    Fixture {
        dir: tempfile::tempdir().unwrap(),
        signer_priv,
        signer_pub,
        root_cert,
        leaf_cert,
    }
}

impl Fixture {
    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cert_files(&self) -> Vec<PathBuf> {
        let root = self.path("root.cvc");
        let leaf = self.path("leaf.cvc");
        fs::write(&root, &self.root_cert).unwrap();
        fs::write(&leaf, &self.leaf_cert).unwrap();
        vec![root, leaf]
    }
}

#[test]
fn embedded_roundtrip_with_chain() {
    let fx = fixture();
    let payload = b"eleven-byte".to_vec(); // exactly 11 bytes
    let target = fx.path("document.bin");
    fs::write(&target, &payload).unwrap();

    let date = Date::from_ymd(25, 3, 1).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    sig_sign(
        &target,
        &target,
        &fx.signer_priv,
        &fx.cert_files(),
        date,
        Some(&mut rng),
    )
    .unwrap();

    // the envelope reads back and matches its own re-encoding
    let (envelope, env_len, total) = Envelope::read_tail(&target).unwrap();
    assert_eq!(total as usize, payload.len() + env_len);
    assert_eq!(envelope.date, Some(date));
    assert_eq!(envelope.sig.len(), 48);
    let reread = Envelope::decode(&envelope.encode().unwrap()).unwrap();
    assert_eq!(reread, envelope);

    // verify by key and by anchor
    sig_verify(&target, &target, &fx.signer_pub).unwrap();
    sig_verify_anchor(&target, &target, &fx.root_cert).unwrap();
    assert!(sig_verify_anchor(&target, &target, b"unknown anchor").is_err());

    // body extraction recovers the payload byte for byte
    let body_out = fx.path("body.bin");
    sig_extract(&body_out, &target, &target, Scope::Body).unwrap();
    assert_eq!(fs::read(&body_out).unwrap(), payload);

    // sig extraction recovers the reversed trailer exactly
    let sig_out = fx.path("sig.bin");
    sig_extract(&sig_out, &target, &target, Scope::Sig).unwrap();
    let stored = fs::read(&target).unwrap();
    assert_eq!(fs::read(&sig_out).unwrap(), stored[payload.len()..]);
    assert_eq!(fs::read(&sig_out).unwrap(), envelope.trailer().unwrap());

    // certificates come out in chain order
    let cert_out = fx.path("cert0.cvc");
    sig_extract(&cert_out, &target, &target, Scope::Cert(0)).unwrap();
    assert_eq!(fs::read(&cert_out).unwrap(), fx.root_cert);
    sig_extract(&cert_out, &target, &target, Scope::Cert(1)).unwrap();
    assert_eq!(fs::read(&cert_out).unwrap(), fx.leaf_cert);
    assert!(sig_extract(&cert_out, &target, &target, Scope::Cert(2)).is_err());
}

#[test]
fn sidecar_roundtrip() {
    let fx = fixture();
    let payload = vec![0x77u8; 5000];
    let target = fx.path("payload.bin");
    let sidecar = fx.path("payload.sig");
    fs::write(&target, &payload).unwrap();

    sig_sign(
        &target,
        &sidecar,
        &fx.signer_priv,
        &fx.cert_files(),
        Date::ZERO,
        None,
    )
    .unwrap();

    // the payload file is untouched; the sidecar is exactly the trailer
    assert_eq!(fs::read(&target).unwrap(), payload);
    let (envelope, env_len, total) = Envelope::read_tail(&sidecar).unwrap();
    assert_eq!(env_len as u64, total);
    assert_eq!(envelope.date, None);

    sig_verify(&target, &sidecar, &fx.signer_pub).unwrap();
    sig_verify_anchor(&target, &sidecar, &fx.root_cert).unwrap();

    // deterministic signing without an RNG is repeatable
    let sidecar2 = fx.path("payload2.sig");
    sig_sign(
        &target,
        &sidecar2,
        &fx.signer_priv,
        &fx.cert_files(),
        Date::ZERO,
        None,
    )
    .unwrap();
    assert_eq!(fs::read(&sidecar).unwrap(), fs::read(&sidecar2).unwrap());
}

#[test]
fn bare_key_signature_without_chain() {
    let fx = fixture();
    let target = fx.path("plain.bin");
    fs::write(&target, b"no certificates here").unwrap();
    sig_sign(&target, &target, &fx.signer_priv, &[], Date::ZERO, None).unwrap();
    sig_verify(&target, &target, &fx.signer_pub).unwrap();

    let (envelope, _, _) = Envelope::read_tail(&target).unwrap();
    assert!(envelope.certs.is_empty());
}

#[test]
fn tampering_is_detected() {
    let fx = fixture();
    let target = fx.path("doc.bin");
    fs::write(&target, b"the signed statement").unwrap();
    sig_sign(&target, &target, &fx.signer_priv, &[], Date::ZERO, None).unwrap();

    // flip one payload byte, keep the trailer intact
    let mut bytes = fs::read(&target).unwrap();
    bytes[3] ^= 0x20;
    fs::write(&target, &bytes).unwrap();
    assert!(sig_verify(&target, &target, &fx.signer_pub).is_err());

    // restore the payload, flip one signature byte
    bytes[3] ^= 0x20;
    let last = bytes.len() - 40;
    bytes[last] ^= 0x01;
    fs::write(&target, &bytes).unwrap();
    assert!(sig_verify(&target, &target, &fx.signer_pub).is_err());
}

#[test]
fn wrong_key_and_wrong_leaf_fail() {
    let fx = fixture();
    let mut rng = ChaCha20Rng::seed_from_u64(99);
    let (other_priv, other_pub) = keypair(&CURVE_256V1, &mut rng).unwrap();

    let target = fx.path("doc.bin");
    fs::write(&target, b"content").unwrap();
    sig_sign(&target, &target, &fx.signer_priv, &[], Date::ZERO, None).unwrap();
    assert!(sig_verify(&target, &target, &other_pub).is_err());

    // signing with a chain whose leaf holds someone else's key
    let target2 = fx.path("doc2.bin");
    fs::write(&target2, b"content").unwrap();
    assert!(sig_sign(
        &target2,
        &target2,
        &other_priv,
        &fx.cert_files(),
        Date::from_ymd(25, 1, 1).unwrap(),
        None,
    )
    .is_err());
}

#[test]
fn print_reports_the_envelope() {
    let fx = fixture();
    let target = fx.path("doc.bin");
    fs::write(&target, b"something to sign").unwrap();
    sig_sign(
        &target,
        &target,
        &fx.signer_priv,
        &fx.cert_files(),
        Date::from_ymd(25, 2, 3).unwrap(),
        None,
    )
    .unwrap();

    let mut out = Vec::new();
    sig_print(&mut out, &target).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("certs: 2"), "{text}");
    assert!(text.contains("date: 250203"), "{text}");
    assert!(text.contains("sig: "), "{text}");
}
