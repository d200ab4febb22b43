// Copyright (c) 2024 Botho Foundation

//! Certificate dates: six decimal digit bytes, `yymmdd`, interpreted in
//! the 2000s and validated against the Gregorian calendar. The all-zero
//! string is the explicit "no date binding" marker used by chain
//! validation.

use stb_common::{Error, Result};

/// A certificate date (or the all-zero non-date).
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct Date([u8; 6]);

impl Date {
    /// The all-zero "no binding" marker.
    pub const ZERO: Date = Date([0; 6]);

    /// From six digit bytes as they appear on the wire.
    pub fn from_wire(bytes: &[u8]) -> Result<Self> {
        let digits: [u8; 6] = bytes.try_into().map_err(|_| Error::BadDate)?;
        let date = Date(digits);
        if date.is_zero() || date.is_valid() {
            Ok(date)
        } else {
            Err(Error::BadDate)
        }
    }

    /// From a split year (two digits, 2000-based), month and day.
    pub fn from_ymd(yy: u8, mm: u8, dd: u8) -> Result<Self> {
        let date = Date([yy / 10, yy % 10, mm / 10, mm % 10, dd / 10, dd % 10]);
        if yy > 99 || !date.is_valid() {
            return Err(Error::BadDate);
        }
        Ok(date)
    }

    /// The six digit bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }

    fn split(&self) -> (u16, u8, u8) {
        (
            2000 + (self.0[0] * 10 + self.0[1]) as u16,
            self.0[2] * 10 + self.0[3],
            self.0[4] * 10 + self.0[5],
        )
    }

    /// Gregorian validity: digits in range, month 1–12, day within the
    /// month, February 29 only in leap years.
    pub fn is_valid(&self) -> bool {
        if self.0.iter().any(|&d| d > 9) {
            return false;
        }
        let (year, month, day) = self.split();
        if !(1..=12).contains(&month) || day == 0 {
            return false;
        }
        let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
        let max = match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if leap => 29,
            2 => 28,
            _ => unreachable!(),
        };
        day <= max
    }

    /// Chronological `self <= other`; digit strings compare directly.
    #[inline]
    pub fn le(&self, other: &Date) -> bool {
        self.0 <= other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_rules() {
        assert!(Date::from_ymd(24, 2, 29).is_ok()); // 2024 is leap
        assert!(Date::from_ymd(23, 2, 29).is_err());
        assert!(Date::from_ymd(0, 2, 29).is_ok()); // 2000 divides 400
        assert!(Date::from_ymd(0, 2, 28).is_ok());
        assert!(Date::from_ymd(24, 4, 31).is_err());
        assert!(Date::from_ymd(24, 0, 1).is_err());
        assert!(Date::from_ymd(24, 13, 1).is_err());
        assert!(Date::from_ymd(24, 12, 31).is_ok());
    }

    #[test]
    fn wire_forms() {
        assert!(Date::from_wire(&[2, 2, 0, 1, 0, 1]).is_ok());
        assert_eq!(Date::from_wire(&[0; 6]).unwrap(), Date::ZERO);
        assert!(Date::from_wire(&[2, 2, 1, 3, 0, 1]).is_err()); // month 13
        assert!(Date::from_wire(&[2, 2, 0, 1, 0]).is_err()); // short
        assert!(Date::from_wire(&[10, 0, 0, 1, 0, 1]).is_err()); // digit > 9
    }

    #[test]
    fn ordering_matches_chronology() {
        let a = Date::from_ymd(22, 1, 1).unwrap();
        let b = Date::from_ymd(23, 1, 1).unwrap();
        let c = Date::from_ymd(23, 1, 2).unwrap();
        assert!(a.le(&b) && b.le(&c) && a.le(&a));
        assert!(!c.le(&b));
    }
}
