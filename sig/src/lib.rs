// Copyright (c) 2024 Botho Foundation

#![deny(unsafe_code)]

//! File signatures.
//!
//! A signed file carries (or is accompanied by) a byte-reversed DER
//! trailer:
//!
//! ```text
//! Signature ::= SEQUENCE {
//!     certs   OCTET STRING,           -- concatenated CVCs, may be empty
//!     date    OCTET STRING (SIZE 6) OPTIONAL,
//!     sig     OCTET STRING (SIZE 34 | 48 | 72 | 96)
//! }
//! ```
//!
//! The reversal puts the SEQUENCE tag at the very end of the file, so a
//! verifier finds the envelope by reading a fixed-size suffix and
//! peeking at the reversed tag-length prefix — no index, no scan.
//!
//! The hash that gets signed binds the payload (minus the embedded
//! trailer), the certificate blob and the signing date, all through the
//! hash the key level selects.

mod envelope;
mod hash;
mod ops;

pub use envelope::{Envelope, TAIL_PEEK};
pub use hash::hash_file;
pub use ops::{sig_extract, sig_print, sig_sign, sig_verify, sig_verify_anchor, Scope};

pub use stb_common::{Error, Result};
