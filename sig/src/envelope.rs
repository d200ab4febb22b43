// Copyright (c) 2024 Botho Foundation

//! The signature envelope and its reverse-DER file tail.

use crate::{Error, Result};
use stb_bign::Level;
use stb_cvc::Date;
use stb_der::{Decoder, Encoder};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// How many trailing bytes suffice to size any envelope: the reversed
/// tag-length prefix of the outer SEQUENCE never exceeds this.
pub const TAIL_PEEK: usize = 16;

/// A decoded signature envelope.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Envelope {
    /// Flat run of certificates, possibly empty.
    pub certs: Vec<u8>,
    /// Signing date, when bound.
    pub date: Option<Date>,
    /// The bign signature, 34, 48, 72 or 96 bytes.
    pub sig: Vec<u8>,
}

impl Envelope {
    /// Forward DER of the SEQUENCE.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Level::from_sig_len(self.sig.len())?;
        let mut enc = Encoder::new();
        let seq = enc.seq_start(0x30);
        enc.octet_string(0x04, &self.certs);
        if let Some(date) = &self.date {
            enc.octet_string(0x04, date.as_bytes());
        }
        enc.octet_string(0x04, &self.sig);
        enc.seq_stop(seq);
        Ok(enc.into_vec())
    }

    /// The byte-reversed trailer as it sits in a file.
    pub fn trailer(&self) -> Result<Vec<u8>> {
        let mut der = self.encode()?;
        der.reverse();
        Ok(der)
    }

    /// Decode a forward-DER envelope. The member count disambiguates
    /// the optional date: three octet strings carry one, two do not.
    pub fn decode(der: &[u8]) -> Result<Self> {
        let mut top = Decoder::new(der);
        let mut seq = top.seq(0x30).map_err(|_| Error::BadFormat)?;
        top.finish().map_err(|_| Error::BadFormat)?;

        let certs = seq.octet_string(0x04).map_err(|_| Error::BadFormat)?;
        let second = seq.octet_string(0x04).map_err(|_| Error::BadFormat)?;
        let (date_bytes, sig) = if seq.is_empty() {
            (None, second)
        } else {
            let third = seq.octet_string(0x04).map_err(|_| Error::BadFormat)?;
            seq.finish().map_err(|_| Error::BadFormat)?;
            (Some(second), third)
        };

        Level::from_sig_len(sig.len())?;
        let date = match date_bytes {
            None => None,
            Some(bytes) => {
                let date = Date::from_wire(bytes)?;
                if date.is_zero() {
                    None
                } else {
                    Some(date)
                }
            }
        };
        // the certificate blob must parse as a clean run
        if !certs.is_empty() {
            let mut offset = 0;
            while offset < certs.len() {
                offset += stb_cvc::cvc_len(&certs[offset..])?;
            }
        }
        Ok(Self {
            certs: certs.to_vec(),
            date,
            sig: sig.to_vec(),
        })
    }

    /// Read an envelope from the tail of a file. Returns the envelope,
    /// its trailer length and the total file length.
    pub fn read_tail(path: &Path) -> Result<(Self, usize, u64)> {
        let mut file = File::open(path).map_err(|_| Error::FileOpen)?;
        let file_len = file
            .seek(SeekFrom::End(0))
            .map_err(|_| Error::FileRead)?;
        let peek_len = (file_len as usize).min(TAIL_PEEK);
        file.seek(SeekFrom::End(-(peek_len as i64)))
            .map_err(|_| Error::FileRead)?;
        let mut peek = vec![0u8; peek_len];
        file.read_exact(&mut peek).map_err(|_| Error::FileRead)?;
        peek.reverse();

        let (_, header, body) = Decoder::measure(&peek).map_err(|_| Error::BadFormat)?;
        let env_len = header + body;
        if env_len as u64 > file_len {
            return Err(Error::BadFormat);
        }
        file.seek(SeekFrom::End(-(env_len as i64)))
            .map_err(|_| Error::FileRead)?;
        let mut tail = vec![0u8; env_len];
        file.read_exact(&mut tail).map_err(|_| Error::FileRead)?;
        tail.reverse();
        let envelope = Self::decode(&tail)?;
        Ok((envelope, env_len, file_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(date: Option<Date>, sig_len: usize) -> Envelope {
        Envelope {
            certs: Vec::new(),
            date,
            sig: vec![0xA5; sig_len],
        }
    }

    #[test]
    fn decode_inverts_encode() {
        for sig_len in [34usize, 48, 72, 96] {
            for date in [None, Some(Date::from_ymd(24, 5, 1).unwrap())] {
                let env = sample(date, sig_len);
                let der = env.encode().unwrap();
                assert_eq!(Envelope::decode(&der).unwrap(), env);
            }
        }
    }

    #[test]
    fn sig_length_gate() {
        assert!(sample(None, 47).encode().is_err());
        // hand-build an envelope with a bad signature width
        let mut enc = Encoder::new();
        let seq = enc.seq_start(0x30);
        enc.octet_string(0x04, &[]);
        enc.octet_string(0x04, &[0u8; 50]);
        enc.seq_stop(seq);
        assert!(Envelope::decode(&enc.into_vec()).is_err());
    }

    #[test]
    fn zero_date_means_unbound() {
        let mut enc = Encoder::new();
        let seq = enc.seq_start(0x30);
        enc.octet_string(0x04, &[]);
        enc.octet_string(0x04, &[0u8; 6]);
        enc.octet_string(0x04, &[1u8; 48]);
        enc.seq_stop(seq);
        let env = Envelope::decode(&enc.into_vec()).unwrap();
        assert_eq!(env.date, None);
    }

    #[test]
    fn junk_certs_blob_is_rejected() {
        let mut enc = Encoder::new();
        let seq = enc.seq_start(0x30);
        enc.octet_string(0x04, b"definitely not certificates");
        enc.octet_string(0x04, &[1u8; 48]);
        enc.seq_stop(seq);
        assert!(Envelope::decode(&enc.into_vec()).is_err());
    }

    #[test]
    fn trailer_is_reversed_der() {
        let env = sample(None, 48);
        let der = env.encode().unwrap();
        let mut trailer = env.trailer().unwrap();
        trailer.reverse();
        assert_eq!(trailer, der);
        // the last trailer byte is the SEQUENCE tag
        assert_eq!(*env.trailer().unwrap().last().unwrap(), 0x30);
    }
}
