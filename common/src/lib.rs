// Copyright (c) 2024 Botho Foundation

//! Items shared by every crate of the STB 34.101 stack.
//!
//! Today that is only the error taxonomy. The arithmetic and codec crates
//! keep their own narrow error types where that reads better, and convert
//! into [`Error`] at the boundary where certificates, signatures and files
//! meet.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

mod error;

pub use error::Error;

/// Convenience alias used across the stack.
pub type Result<T> = core::result::Result<T, Error>;
