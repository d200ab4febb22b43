// Copyright (c) 2024 Botho Foundation

//! Streaming decoder. Every reader either consumes a full canonical TLV
//! or fails without touching the cursor's outputs.

use crate::enc::{is_printable, oid_to_string};
use crate::{tag_octets, Error};
use alloc::string::String;
use alloc::vec::Vec;

/// Cursor over a DER byte string.
#[derive(Clone, Copy, Debug)]
pub struct Decoder<'a> {
    rest: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { rest: input }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        self.rest
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    /// Fail unless the input was consumed exactly.
    pub fn finish(&self) -> Result<(), Error> {
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(Error::Format)
        }
    }

    /// Parse the identifier and length octets at `buf` without
    /// consuming and without requiring the body to be present:
    /// `(tag, header_len, body_len)`. This is the primitive that sizes
    /// a TLV from a partial prefix (the reverse-DER file tail).
    pub fn measure(buf: &[u8]) -> Result<(u32, usize, usize), Error> {
        if buf.is_empty() {
            return Err(Error::Format);
        }
        let mut pos = 1;
        let mut tag = buf[0] as u32;
        if buf[0] & 0x1F == 0x1F {
            // long-form tag, canonical and bounded to what u32 packs
            let mut continuations = 0;
            loop {
                let b = *buf.get(pos).ok_or(Error::Format)?;
                if continuations == 0 && b == 0x80 {
                    return Err(Error::Format);
                }
                tag = tag.checked_mul(256).ok_or(Error::Format)? | b as u32;
                pos += 1;
                continuations += 1;
                if b & 0x80 == 0 {
                    break;
                }
                if continuations == 3 {
                    return Err(Error::Format);
                }
            }
            // numbers the short form could hold must use it
            let mut number: u32 = 0;
            for &b in &buf[1..pos] {
                number = (number << 7) | (b & 0x7F) as u32;
            }
            if number < 31 {
                return Err(Error::Format);
            }
        }
        let first = *buf.get(pos).ok_or(Error::Format)?;
        pos += 1;
        let body_len = if first < 0x80 {
            first as usize
        } else {
            let count = (first & 0x7F) as usize;
            if count == 0 || count > core::mem::size_of::<usize>() {
                return Err(Error::Format); // indefinite or oversized
            }
            let mut len: usize = 0;
            for i in 0..count {
                let b = *buf.get(pos + i).ok_or(Error::Format)?;
                if i == 0 && b == 0 {
                    return Err(Error::Format); // leading zero
                }
                len = len.checked_mul(256).ok_or(Error::Format)? + b as usize;
            }
            if len < 0x80 {
                return Err(Error::Format); // long form where short fits
            }
            pos += count;
            len
        };
        Ok((tag, pos, body_len))
    }

    /// Like [`Self::measure`], but the whole body must be present.
    pub fn peek_header(buf: &[u8]) -> Result<(u32, usize, usize), Error> {
        let (tag, header, body) = Self::measure(buf)?;
        if buf.len() - header < body {
            return Err(Error::Format);
        }
        Ok((tag, header, body))
    }

    /// Tag of the next TLV, if any input remains.
    pub fn peek_tag(&self) -> Result<u32, Error> {
        Self::peek_header(self.rest).map(|(tag, _, _)| tag)
    }

    /// Total length (header plus body) of the TLV at the head of `buf`.
    pub fn tlv_len(buf: &[u8]) -> Result<usize, Error> {
        let (_, header, body) = Self::peek_header(buf)?;
        Ok(header + body)
    }

    /// Consume the next TLV whatever its tag.
    pub fn any(&mut self) -> Result<(u32, &'a [u8]), Error> {
        let (tag, header, body) = Self::peek_header(self.rest)?;
        let value = &self.rest[header..header + body];
        self.rest = &self.rest[header + body..];
        Ok((tag, value))
    }

    /// Consume a TLV with exactly the given tag, returning its value.
    pub fn tlv(&mut self, tag: u32) -> Result<&'a [u8], Error> {
        let (got, header, body) = Self::peek_header(self.rest)?;
        if got != tag {
            return Err(Error::Tag);
        }
        let value = &self.rest[header..header + body];
        self.rest = &self.rest[header + body..];
        Ok(value)
    }

    /// Consume a constructed TLV and descend into its body.
    pub fn seq(&mut self, tag: u32) -> Result<Decoder<'a>, Error> {
        let (octets, len) = tag_octets(tag);
        if octets[..len.min(1)].first().map(|b| b & 0x20) != Some(0x20) {
            return Err(Error::Tag); // constructed bit must be set
        }
        Ok(Decoder::new(self.tlv(tag)?))
    }

    /// Like [`Self::tlv`] but `None` when the next tag differs (or the
    /// input is exhausted).
    pub fn optional(&mut self, tag: u32) -> Result<Option<&'a [u8]>, Error> {
        if self.rest.is_empty() {
            return Ok(None);
        }
        if Self::peek_header(self.rest)?.0 != tag {
            return Ok(None);
        }
        self.tlv(tag).map(Some)
    }

    /// Small unsigned INTEGER.
    pub fn size(&mut self, tag: u32) -> Result<u64, Error> {
        let body = self.tlv(tag)?;
        let magnitude = check_integer(body)?;
        if magnitude.len() > 8 {
            return Err(Error::Value);
        }
        let mut v: u64 = 0;
        for &b in magnitude {
            v = (v << 8) | b as u64;
        }
        Ok(v)
    }

    /// Unsigned INTEGER magnitude, big-endian, without the sign pad.
    pub fn uint(&mut self, tag: u32) -> Result<&'a [u8], Error> {
        let body = self.tlv(tag)?;
        check_integer(body)
    }

    /// OCTET STRING under the given tag.
    pub fn octet_string(&mut self, tag: u32) -> Result<&'a [u8], Error> {
        self.tlv(tag)
    }

    /// BIT STRING: returns the content bytes and the unused-bit count.
    pub fn bit_string(&mut self, tag: u32) -> Result<(&'a [u8], u8), Error> {
        let body = self.tlv(tag)?;
        let (&unused, data) = body.split_first().ok_or(Error::Format)?;
        if unused > 7 || (unused > 0 && data.is_empty()) {
            return Err(Error::Format);
        }
        if unused > 0 {
            let last = *data.last().ok_or(Error::Format)?;
            if last & ((1 << unused) - 1) != 0 {
                return Err(Error::Format); // padding bits must be zero
            }
        }
        Ok((data, unused))
    }

    /// OBJECT IDENTIFIER as dotted-decimal text.
    pub fn oid(&mut self, tag: u32) -> Result<String, Error> {
        let body = self.tlv(tag)?;
        oid_to_string(body)
    }

    /// PrintableString with the restricted character class.
    pub fn printable_string(&mut self, tag: u32) -> Result<&'a str, Error> {
        let body = self.tlv(tag)?;
        if !body.iter().all(|&b| is_printable(b)) {
            return Err(Error::Format);
        }
        core::str::from_utf8(body).map_err(|_| Error::Format)
    }
}

/// Canonical INTEGER body: non-empty, minimal, non-negative. Returns
/// the magnitude.
fn check_integer(body: &[u8]) -> Result<&[u8], Error> {
    match body {
        [] => Err(Error::Format),
        [0] => Ok(&body[1..]),
        [0, second, ..] if *second & 0x80 == 0 => Err(Error::Format), // over-padded
        [0, ..] => Ok(&body[1..]),
        [first, ..] if *first & 0x80 != 0 => Err(Error::Value), // negative
        _ => Ok(body),
    }
}

/// Split a buffer that holds a back-to-back run of TLVs into their
/// spans; fails if anything trails.
pub fn split_tlvs(buf: &[u8]) -> Result<Vec<&[u8]>, Error> {
    let mut out = Vec::new();
    let mut rest = buf;
    while !rest.is_empty() {
        let len = Decoder::tlv_len(rest)?;
        out.push(&rest[..len]);
        rest = &rest[len..];
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Encoder;
    use hex_literal::hex;

    #[test]
    fn tlv_roundtrip_all_types() {
        let mut enc = Encoder::new();
        enc.size(0x02, 0);
        enc.size(0x02, 127);
        enc.size(0x02, 128);
        enc.size(0x02, 0x8000_0000_0000_0000);
        enc.uint(0x02, &hex!("00FFEE"));
        enc.octet_string(0x04, b"payload");
        enc.bit_string(0x03, &[0b1010_0000], 5);
        enc.oid(0x06, "1.2.112.0.2.0.34.101.45.3.1").unwrap();
        enc.printable_string(0x13, "CA ROOT/1=?").unwrap();
        let bytes = enc.into_vec();

        let mut dec = Decoder::new(&bytes);
        assert_eq!(dec.size(0x02).unwrap(), 0);
        assert_eq!(dec.size(0x02).unwrap(), 127);
        assert_eq!(dec.size(0x02).unwrap(), 128);
        assert_eq!(dec.size(0x02).unwrap(), 0x8000_0000_0000_0000);
        assert_eq!(dec.uint(0x02).unwrap(), hex!("FFEE"));
        assert_eq!(dec.octet_string(0x04).unwrap(), b"payload");
        assert_eq!(dec.bit_string(0x03).unwrap(), (&[0b1010_0000u8][..], 5));
        assert_eq!(dec.oid(0x06).unwrap(), "1.2.112.0.2.0.34.101.45.3.1");
        assert_eq!(dec.printable_string(0x13).unwrap(), "CA ROOT/1=?");
        dec.finish().unwrap();
    }

    #[test]
    fn known_encodings() {
        // the belt-hash OID
        let mut enc = Encoder::new();
        enc.oid(0x06, "1.2.112.0.2.0.34.101.31.81").unwrap();
        assert_eq!(enc.into_vec(), hex!("06092A7000020022651F51"));
        // INTEGER 128 needs a sign pad
        let mut enc = Encoder::new();
        enc.size(0x02, 128);
        assert_eq!(enc.into_vec(), hex!("02020080"));
    }

    #[test]
    fn seq_anchor_patches_lengths() {
        // short body: single-byte length, no shift
        let mut enc = Encoder::new();
        let a = enc.seq_start(0x30);
        enc.octet_string(0x04, &[7; 10]);
        assert_eq!(enc.seq_stop(a), 0);
        let bytes = enc.into_vec();
        assert_eq!(bytes[1] as usize, bytes.len() - 2);

        // long body: the stop inserts a length octet and reports it
        let mut enc = Encoder::new();
        let outer = enc.seq_start(0x30);
        let inner = enc.seq_start(0x30);
        enc.octet_string(0x04, &[0xAB; 200]);
        assert_eq!(enc.seq_stop(inner), 1);
        assert_eq!(enc.seq_stop(outer), 1);
        let bytes = enc.into_vec();
        let mut dec = Decoder::new(&bytes);
        let mut outer = dec.seq(0x30).unwrap();
        let mut inner = outer.seq(0x30).unwrap();
        assert_eq!(inner.octet_string(0x04).unwrap(), &[0xAB; 200][..]);
        inner.finish().unwrap();
        outer.finish().unwrap();
        dec.finish().unwrap();
    }

    #[test]
    fn rejects_non_minimal_length() {
        // SEQUENCE with a long-form length where short suffices
        let bad = hex!("308105300001 01FF");
        assert_eq!(Decoder::peek_header(&bad), Err(Error::Format));
    }

    #[test]
    fn rejects_non_canonical_integers() {
        // over-padded zero
        let mut dec = Decoder::new(&hex!("02020000"));
        assert!(dec.size(0x02).is_err());
        // negative
        let mut dec = Decoder::new(&hex!("020180"));
        assert!(dec.size(0x02).is_err());
        // empty body
        let mut dec = Decoder::new(&hex!("0200"));
        assert!(dec.size(0x02).is_err());
    }

    #[test]
    fn rejects_bad_bit_and_printable() {
        // unused-bit count out of range
        let mut dec = Decoder::new(&hex!("030208AA"));
        assert!(dec.bit_string(0x03).is_err());
        // non-zero padding bits
        let mut dec = Decoder::new(&hex!("030203AB"));
        assert!(dec.bit_string(0x03).is_err());
        // forbidden character (underscore)
        let mut dec = Decoder::new(&hex!("13015F"));
        assert!(dec.printable_string(0x13).is_err());
    }

    #[test]
    fn rejects_indefinite_and_padded_tags() {
        assert!(Decoder::peek_header(&hex!("3080 0000")).is_err());
        // long-form tag with 0x80 padding
        assert!(Decoder::peek_header(&hex!("7F80 21 00")).is_err());
        // short number in long-form tag
        assert!(Decoder::peek_header(&hex!("5F05 00")).is_err());
    }

    #[test]
    fn split_runs_of_tlvs() {
        let mut enc = Encoder::new();
        enc.octet_string(0x04, b"a");
        enc.octet_string(0x04, b"bc");
        let bytes = enc.into_vec();
        let parts = split_tlvs(&bytes).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], hex!("040161"));
        assert!(split_tlvs(&bytes[..bytes.len() - 1]).is_err());
    }
}
