// Magnitude-with-unit values such as "50K" or "4.2M" (rate limits, file sizes)

use regex::Regex;
use std::fmt;
use std::str::FromStr;

lazy_static::lazy_static! {
    static ref RATE_RE: Regex =
        Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*([KMGTPEZY]?)(?:i?B)?\s*$").unwrap();
}

/// Binary unit prefix understood by yt-dlp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RateUnit {
    Bytes,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Zetta,
    Yotta,
}

impl RateUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Bytes => "",
            Self::Kilo => "K",
            Self::Mega => "M",
            Self::Giga => "G",
            Self::Tera => "T",
            Self::Peta => "P",
            Self::Exa => "E",
            Self::Zetta => "Z",
            Self::Yotta => "Y",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "" => Self::Bytes,
            "K" => Self::Kilo,
            "M" => Self::Mega,
            "G" => Self::Giga,
            "T" => Self::Tera,
            "P" => Self::Peta,
            "E" => Self::Exa,
            "Z" => Self::Zetta,
            "Y" => Self::Yotta,
            _ => return None,
        })
    }

    /// Power of 1024 this prefix stands for
    fn exponent(&self) -> i32 {
        *self as i32
    }
}

/// A size or speed such as `4.2M`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    pub magnitude: f64,
    pub unit: RateUnit,
}

impl Rate {
    pub fn new(magnitude: f64, unit: RateUnit) -> Self {
        Self { magnitude, unit }
    }

    pub fn bytes(&self) -> f64 {
        self.magnitude * 1024f64.powi(self.unit.exponent())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRateError(pub String);

impl fmt::Display for ParseRateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid rate: {}", self.0)
    }
}

impl std::error::Error for ParseRateError {}

impl FromStr for Rate {
    type Err = ParseRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = RATE_RE
            .captures(s)
            .ok_or_else(|| ParseRateError(s.to_string()))?;
        let magnitude: f64 = caps[1]
            .parse()
            .map_err(|_| ParseRateError(s.to_string()))?;
        let unit = RateUnit::from_suffix(&caps[2]).ok_or_else(|| ParseRateError(s.to_string()))?;
        Ok(Self { magnitude, unit })
    }
}

/// Canonical form: shortest magnitude followed by the upper-case prefix.
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}
