//! Transfer volumes
//!
//! CRITICAL: volumes are i64 thousandths of a microlitre. Decimal input is
//! rounded to 3 fractional digits once, at parse time, so equality between
//! volumes is exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SCALE: i64 = 1000;

/// Largest magnitude accepted from text, in microlitres
pub const MAX_VOLUME_UL: f64 = 1e9;

/// Errors produced when reading a volume cell
#[derive(Debug, Error, PartialEq)]
pub enum VolumeError {
    #[error("Unexpected value: \"{0}\"")]
    NotANumber(String),
}

/// Liquid volume rounded to 3 fractional digits
///
/// # Example
/// ```
/// use transfer_sequencer_core_rs::Volume;
///
/// let v: Volume = "12.34567".parse().unwrap();
/// assert_eq!(v.thousandths(), 12_346);
/// assert_eq!(v.to_string(), "12.346");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(i64);

impl Volume {
    /// Zero volume
    pub const ZERO: Volume = Volume(0);

    /// Create from an exact count of thousandths
    pub fn from_thousandths(thousandths: i64) -> Self {
        Self(thousandths)
    }

    /// Round a floating point value to 3 fractional digits
    ///
    /// Returns `None` for NaN, infinities and magnitudes above
    /// [`MAX_VOLUME_UL`].
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value.abs() > MAX_VOLUME_UL {
            return None;
        }
        Some(Self((value * SCALE as f64).round() as i64))
    }

    /// Raw thousandths
    pub fn thousandths(&self) -> i64 {
        self.0
    }

    /// Value as a float, for hosts that want plain numbers
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Exact difference, `None` on overflow
    pub fn checked_sub(self, rhs: Volume) -> Option<Volume> {
        self.0.checked_sub(rhs.0).map(Volume)
    }
}

impl FromStr for Volume {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .and_then(Volume::from_f64)
            .ok_or_else(|| VolumeError::NotANumber(s.to_string()))
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / SCALE as u64;
        let frac = abs % SCALE as u64;
        if frac == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            let digits = format!("{:03}", frac);
            write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_three_places() {
        assert_eq!("1.0004".parse::<Volume>().unwrap().thousandths(), 1000);
        assert_eq!("1.0006".parse::<Volume>().unwrap().thousandths(), 1001);
        assert_eq!(" 25 ".parse::<Volume>().unwrap().thousandths(), 25_000);
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!("abc".parse::<Volume>().is_err());
        assert!("".parse::<Volume>().is_err());
        assert!("inf".parse::<Volume>().is_err());
        assert!("NaN".parse::<Volume>().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_magnitudes() {
        assert!("1e300".parse::<Volume>().is_err());
        assert!("-1e300".parse::<Volume>().is_err());
        assert!(Volume::from_f64(MAX_VOLUME_UL * 2.0).is_none());
        assert_eq!(
            Volume::from_f64(MAX_VOLUME_UL).map(|v| v.thousandths()),
            Some(1_000_000_000_000)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Volume::from_thousandths(10_000).to_string(), "10");
        assert_eq!(Volume::from_thousandths(10_500).to_string(), "10.5");
        assert_eq!(Volume::from_thousandths(-2_050).to_string(), "-2.05");
        assert_eq!(Volume::from_thousandths(7).to_string(), "0.007");
    }

    #[test]
    fn test_subtraction_is_exact() {
        let final_volume: Volume = "20.1".parse().unwrap();
        let sample: Volume = "3.3".parse().unwrap();
        assert_eq!(final_volume.checked_sub(sample).unwrap().thousandths(), 16_800);
        assert_eq!(Volume::from_thousandths(i64::MIN).checked_sub(sample), None);
    }
}
