// Copyright (c) 2024 Botho Foundation

//! The error taxonomy of the stack.
//!
//! Every fallible operation in the workspace resolves to one of these
//! kinds. Two axes matter to callers: where the failure originated
//! (input bytes, arithmetic, the operating system) and whether retrying
//! with different inputs can help. The variants keep the origin visible;
//! the severity is conveyed by which variant it is (`Selftest` and
//! `OutOfMemory` are fatal, everything else is recoverable).

use displaydoc::Display;

/// An error produced by the cryptographic core or the file tooling.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Error {
    /// Malformed input bytes or an out-of-range argument
    BadInput,

    /// Invalid or unsupported cryptosystem parameters
    BadParams,

    /// Date outside the Gregorian calendar or a validity window
    BadDate,

    /// Input violates the expected encoding format
    BadFormat,

    /// Signature verification failed
    BadSig,

    /// Certificate is malformed or failed validation
    BadCert,

    /// Public key is malformed or not on the curve
    BadPubkey,

    /// Private key is malformed or inconsistent with the public key
    BadPrivkey,

    /// No trust anchor matched the certificate chain
    NoTrust,

    /// Could not open a file
    FileOpen,

    /// Could not read from a file
    FileRead,

    /// Could not write to a file
    FileWrite,

    /// Could not create a file
    FileCreate,

    /// Allocation failed or a buffer was too small
    OutOfMemory,

    /// Bad command parameters
    CmdParams,

    /// Operating system error
    Sys,

    /// Known-answer self-test failed
    Selftest,

    /// Randomness source exhausted or unavailable
    RngExhausted,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
