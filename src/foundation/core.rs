use std::time::Duration;

use crate::foundation::error::{PinwarpError, PinwarpResult};

pub use kurbo::{Point, Vec2};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Rational frame rate.
///
/// Tracking exports carry `Units Per Second` as a decimal string (`"24"`,
/// `"29.97"`); [`Fps::from_decimal_str`] converts it losslessly to a rational.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> PinwarpResult<Self> {
        if den == 0 {
            return Err(PinwarpError::meta("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(PinwarpError::meta("Fps num must be > 0"));
        }
        let g = gcd(num, den);
        Ok(Self {
            num: num / g,
            den: den / g,
        })
    }

    /// Parse a decimal frame-rate string such as `"24"` or `"29.97"`.
    pub fn from_decimal_str(s: &str) -> PinwarpResult<Self> {
        let s = s.trim();
        let (int_part, frac_part) = match s.split_once('.') {
            Some((a, b)) => (a, b),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(PinwarpError::meta(format!("invalid frame rate '{s}'")));
        }

        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);
        let num = digits
            .parse::<u32>()
            .map_err(|_| PinwarpError::meta(format!("invalid frame rate '{s}'")))?;
        let den = 10u32
            .checked_pow(frac_part.len() as u32)
            .ok_or_else(|| PinwarpError::meta(format!("frame rate '{s}' has too many digits")))?;
        Self::new(num, den)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Render-loop tick period (`1000 / fps` milliseconds).
    pub fn tick_period(self) -> Duration {
        Duration::from_secs_f64(self.frame_duration_secs())
    }

    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
