// Copyright (c) 2024 Botho Foundation

//! The level-selected hash: belt-hash (truncated for the 96-bit level)
//! below 384 bits of output, bash at the two larger levels. One
//! dispatch, used identically for message hashing, the S0 binding and
//! the file-hashing front end.

use crate::Level;
use alloc::vec::Vec;
use stb_bash::BashHash;
use stb_belt::BeltHash;

/// A streaming hash bound to a bign level.
#[derive(Clone)]
pub enum LevelHash {
    /// belt-hash, output truncated to `out` bytes.
    Belt { inner: BeltHash, out: usize },
    /// bash384 or bash512.
    Bash(BashHash),
}

impl LevelHash {
    /// The hash the level binds (§ the consistent dispatch: certs and
    /// date suffixes go through this same selection).
    pub fn new(level: Level) -> Self {
        match level {
            Level::L96 => LevelHash::Belt {
                inner: BeltHash::new(),
                out: 24,
            },
            Level::L128 => LevelHash::Belt {
                inner: BeltHash::new(),
                out: 32,
            },
            Level::L192 => LevelHash::Bash(BashHash::bash384()),
            Level::L256 => LevelHash::Bash(BashHash::bash512()),
        }
    }

    /// Output width in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            LevelHash::Belt { out, .. } => *out,
            LevelHash::Bash(h) => h.digest_len(),
        }
    }

    /// Absorb data.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            LevelHash::Belt { inner, .. } => inner.update(data),
            LevelHash::Bash(h) => h.update(data),
        }
    }

    /// Produce the digest.
    pub fn finish(self) -> Vec<u8> {
        match self {
            LevelHash::Belt { inner, out } => {
                let full = inner.finish();
                full[..out].to_vec()
            }
            LevelHash::Bash(h) => h.finish(),
        }
    }

    /// One-shot convenience.
    pub fn hash(level: Level, data: &[u8]) -> Vec<u8> {
        let mut h = Self::new(level);
        h.update(data);
        h.finish()
    }
}
