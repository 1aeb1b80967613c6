//! Currency conversion with step rounding.

use crate::decimal::{pow10, Decimal};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Direction used when snapping an amount to a multiple of the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Round up to the next multiple (default)
    #[default]
    Ceil,
    /// Round down to the previous multiple
    Floor,
    /// Round to the closest multiple, ties to even
    Nearest,
}

impl std::str::FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ceil" => Ok(RoundingMode::Ceil),
            "floor" => Ok(RoundingMode::Floor),
            "nearest" => Ok(RoundingMode::Nearest),
            _ => Err(format!(
                "Unknown rounding mode: {}. Valid options: ceil, floor, nearest",
                s
            )),
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::Ceil => write!(f, "ceil"),
            RoundingMode::Floor => write!(f, "floor"),
            RoundingMode::Nearest => write!(f, "nearest"),
        }
    }
}

/// Snap `amount` to an integer multiple of `step` in direction `mode`.
///
/// A non-positive step rounds to the nearest whole unit instead. Returns
/// `None` if the result does not fit in an `i64`.
pub fn round_to_step(amount: Decimal, step: i64, mode: RoundingMode) -> Option<i64> {
    let (step, mode) = if step <= 0 {
        (1, RoundingMode::Nearest)
    } else {
        (step, mode)
    };

    let amount = amount.normalize();
    let unit = pow10(amount.scale())?;
    // amount = whole + frac / unit, with 0 <= frac < unit
    let whole = amount.mantissa().div_euclid(unit);
    let frac = amount.mantissa().rem_euclid(unit);

    let step = i128::from(step);
    let floor = whole.div_euclid(step);
    let rem = whole.rem_euclid(step);

    let quotient = match mode {
        RoundingMode::Floor => floor,
        RoundingMode::Ceil => {
            if rem == 0 && frac == 0 {
                floor
            } else {
                floor + 1
            }
        }
        RoundingMode::Nearest => match compare_to_half(rem, frac, unit, step) {
            Ordering::Less => floor,
            Ordering::Greater => floor + 1,
            Ordering::Equal => floor + (floor & 1),
        },
    };
    i64::try_from(quotient.checked_mul(step)?).ok()
}

/// Compare `rem + frac / unit` against `step / 2` without overflowing.
fn compare_to_half(rem: i128, frac: i128, unit: i128, step: i128) -> Ordering {
    // 2 * (rem + f) vs step  <=>  2f vs step - 2 * rem, where 0 <= 2f < 2
    match step - 2 * rem {
        t if t <= 0 => {
            if t == 0 && frac == 0 {
                Ordering::Equal
            } else {
                Ordering::Greater
            }
        }
        1 => frac.cmp(&(unit - frac)),
        _ => Ordering::Less,
    }
}

/// Converts source-currency amounts with a fixed rate and step policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceConverter {
    pub rate: Decimal,
    pub step: i64,
    pub rounding: RoundingMode,
}

impl PriceConverter {
    pub fn new(rate: Decimal, step: i64, rounding: RoundingMode) -> Self {
        Self {
            rate,
            step,
            rounding,
        }
    }

    /// Converted, step-rounded amount. `None` when the product overflows.
    pub fn convert(&self, amount: Decimal) -> Option<i64> {
        let converted = amount.checked_mul(&self.rate)?;
        round_to_step(converted, self.step, self.rounding)
    }

    /// Convert many amounts into a sorted, de-duplicated list.
    pub fn price_points<I>(&self, amounts: I) -> Vec<i64>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let mut points: Vec<i64> = amounts
            .into_iter()
            .filter_map(|a| self.convert(a))
            .collect();
        points.sort_unstable();
        points.dedup();
        points
    }
}
