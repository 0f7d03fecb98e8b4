//! Canonical keys for per-date results
//!
//! Model results, observation deltas and residuals are all indexed by a
//! fractional year. Keying maps by a formatted string makes joins fragile
//! (`"2001.5"` and `"2001.50"` describe the same instant), so every producer and
//! consumer goes through [`DateKey`] instead.
//!
//! A key is the fractional year quantised to 1e-9 years (about 30 ms), which is
//! well below the resolution of any dataset handled here.
//!
//! ```rust
//! use icemass_core::datekey::DateKey;
//!
//! let a: DateKey = "2001.5".parse().unwrap();
//! let b: DateKey = "2001.50".parse().unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.to_string(), "2001.5");
//! assert_eq!(DateKey::try_from(2001.0).unwrap().to_string(), "2001.0");
//! ```

use crate::errors::{IceMassError, IceMassResult};
use crate::FloatValue;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const TICKS_PER_YEAR: i64 = 1_000_000_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(i64);

impl DateKey {
    pub fn new(year: FloatValue) -> IceMassResult<Self> {
        let ticks = (year * TICKS_PER_YEAR as FloatValue).round();
        if !ticks.is_finite() || ticks.abs() >= i64::MAX as FloatValue {
            return Err(IceMassError::InvalidDateKey(year.to_string()));
        }
        Ok(Self(ticks as i64))
    }

    /// The fractional year this key represents
    pub fn year(&self) -> FloatValue {
        self.0 as FloatValue / TICKS_PER_YEAR as FloatValue
    }
}

impl TryFrom<FloatValue> for DateKey {
    type Error = IceMassError;

    fn try_from(value: FloatValue) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let ticks = self.0.unsigned_abs();
        let whole = ticks / TICKS_PER_YEAR as u64;
        let fraction = format!("{:09}", ticks % TICKS_PER_YEAR as u64);
        let fraction = fraction.trim_end_matches('0');
        let fraction = if fraction.is_empty() { "0" } else { fraction };
        write!(f, "{sign}{whole}.{fraction}")
    }
}

impl FromStr for DateKey {
    type Err = IceMassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let year = s
            .trim()
            .parse::<FloatValue>()
            .map_err(|_| IceMassError::InvalidDateKey(s.to_string()))?;
        Self::new(year)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn equivalent_spellings_share_a_key() {
        let keys: Vec<DateKey> = ["2001.5", "2001.50", " 2001.500000 ", "2.0015e3"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert!(keys.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn float_and_string_producers_agree() {
        let from_float = DateKey::try_from(2003.0833333333333).unwrap();
        let from_string: DateKey = "2003.0833333333333".parse().unwrap();
        assert_eq!(from_float, from_string);
        assert_eq!(from_float.to_string(), "2003.083333333");
    }

    #[test]
    fn display_keeps_one_decimal() {
        assert_eq!(DateKey::try_from(2001.0).unwrap().to_string(), "2001.0");
        assert_eq!(DateKey::try_from(-0.25).unwrap().to_string(), "-0.25");
    }

    #[test]
    fn ordering_follows_time() {
        let mut map = BTreeMap::new();
        for year in [2002.0, 2000.5, 2001.25] {
            map.insert(DateKey::try_from(year).unwrap(), year);
        }
        let years: Vec<_> = map.values().copied().collect();
        assert_eq!(years, vec![2000.5, 2001.25, 2002.0]);
    }

    #[test]
    fn rejects_non_finite() {
        assert!(DateKey::try_from(f64::NAN).is_err());
        assert!("abc".parse::<DateKey>().is_err());
    }

    #[test]
    fn serde_as_string() {
        let key = DateKey::try_from(2010.75).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2010.75\"");
        let back: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
