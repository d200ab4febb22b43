// Copyright (c) 2024 Botho Foundation

//! The hash binding: payload bytes (with the embedded trailer dropped),
//! then the certificate blob, then the six date bytes, through the hash
//! selected by the key level. Files stream in 4 KiB chunks; nothing is
//! ever buffered whole.

use crate::{Error, Result};
use stb_bign::{Level, LevelHash};
use stb_cvc::Date;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHUNK: usize = 4096;

/// Hash `file` minus its last `drop` bytes, with the certs-and-date
/// suffix bound in.
pub fn hash_file(
    path: &Path,
    drop: u64,
    certs: &[u8],
    date: Option<&Date>,
    level: Level,
) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|_| Error::FileOpen)?;
    let total = file.metadata().map_err(|_| Error::FileRead)?.len();
    if drop > total {
        return Err(Error::BadInput);
    }
    let mut remaining = total - drop;

    let mut hasher = LevelHash::new(level);
    let mut buf = [0u8; CHUNK];
    while remaining > 0 {
        let want = remaining.min(CHUNK as u64) as usize;
        file.read_exact(&mut buf[..want])
            .map_err(|_| Error::FileRead)?;
        hasher.update(&buf[..want]);
        remaining -= want as u64;
    }
    hasher.update(certs);
    hasher.update(date.map(Date::as_bytes).unwrap_or(&[0; 6]));
    Ok(hasher.finish())
}
