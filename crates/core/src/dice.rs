//! Dice notation: `NdM`, `NdM+K`, `NdM-K`

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MAX_DICE: u32 = 100;
pub const MAX_SIDES: u32 = 1000;
/// Largest flat modifier, in either direction
pub const MAX_MODIFIER: i64 = MAX_DICE as i64 * MAX_SIDES as i64;

/// A parsed dice expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i64,
}

/// Outcome of rolling a [`DiceExpr`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub expr: DiceExpr,
    pub rolls: Vec<u32>,
    /// Sum of the dice, without the modifier
    pub dice_total: i64,
    /// Sum of the dice plus the modifier
    pub total: i64,
}

impl DiceExpr {
    pub fn new(count: u32, sides: u32, modifier: i64) -> Result<Self> {
        if count < 1 || sides < 1 {
            return Err(Error::InvalidArgument(
                "dice count and sides must be at least 1".into(),
            ));
        }
        if count > MAX_DICE || sides > MAX_SIDES {
            return Err(Error::InvalidArgument(format!(
                "at most {} dice of at most {} sides",
                MAX_DICE, MAX_SIDES
            )));
        }
        if modifier.unsigned_abs() > MAX_MODIFIER as u64 {
            return Err(Error::InvalidArgument(format!(
                "modifier must be within ±{}",
                MAX_MODIFIER
            )));
        }
        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    /// Parse notation such as `2d6+3`. Whitespace is ignored and `D` is accepted.
    pub fn parse(notation: &str) -> Result<Self> {
        let clean: String = notation
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let invalid = || Error::InvalidArgument(format!("invalid dice notation '{}'", notation));

        let (count, rest) = clean.split_once('d').ok_or_else(invalid)?;
        let (sides, modifier) = match rest.find(|c: char| c == '+' || c == '-') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        let count = parse_digits(count).ok_or_else(invalid)?;
        let sides = parse_digits(sides).ok_or_else(invalid)?;
        let modifier = match modifier {
            "" => 0,
            m => {
                let (sign, digits) = m.split_at(1);
                let value = parse_digits::<i64>(digits).ok_or_else(invalid)?;
                if sign == "-" {
                    -value
                } else {
                    value
                }
            }
        };

        Self::new(count, sides, modifier)
    }

    pub fn min(&self) -> i64 {
        self.count as i64 + self.modifier
    }

    pub fn max(&self) -> i64 {
        self.count as i64 * self.sides as i64 + self.modifier
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();
        let dice_total: i64 = rolls.iter().map(|r| *r as i64).sum();

        DiceRoll {
            expr: *self,
            rolls,
            dice_total,
            total: dice_total + self.modifier,
        }
    }
}

/// Digits only; rejects signs and empty input
fn parse_digits<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, "{}", self.modifier)?;
        }
        Ok(())
    }
}

impl FromStr for DiceExpr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_forms() {
        assert_eq!(DiceExpr::parse("1d20").unwrap(), DiceExpr::new(1, 20, 0).unwrap());
        assert_eq!(DiceExpr::parse("2d6+3").unwrap(), DiceExpr::new(2, 6, 3).unwrap());
        assert_eq!(DiceExpr::parse(" 3D6 - 1 ").unwrap(), DiceExpr::new(3, 6, -1).unwrap());
    }

    #[test]
    fn test_parse_rejects() {
        for bad in [
            "", "d6", "2d", "2x6", "2d6+", "2d6+-1", "-1d6", "0d6", "1d0", "101d6", "1d1001",
            "2d6+3+1", "1d6+100001", "1d6-100001", "1d6+9223372036854775807",
            "1d6+99999999999999999999",
        ] {
            assert!(DiceExpr::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_modifier_limits() {
        let high = DiceExpr::parse("100d1000+100000").unwrap();
        assert_eq!(high.max(), 200_000);
        let low = DiceExpr::parse("1d6-100000").unwrap();
        assert_eq!(low.min(), -99_999);

        let mut rng = StdRng::seed_from_u64(1);
        assert!(high.roll(&mut rng).total >= 100_100);
        assert!(matches!(
            DiceExpr::new(1, 6, i64::MIN),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        for notation in ["1d20", "2d6+3", "3d6-2"] {
            let expr: DiceExpr = notation.parse().unwrap();
            assert_eq!(expr.to_string(), notation);
        }
    }

    #[test]
    fn test_range() {
        let expr = DiceExpr::parse("2d6+3").unwrap();
        assert_eq!(expr.min(), 5);
        assert_eq!(expr.max(), 15);
    }

    #[test]
    fn test_roll_within_range() {
        let mut rng = StdRng::seed_from_u64(8);
        let expr = DiceExpr::parse("4d6-2").unwrap();

        for _ in 0..500 {
            let roll = expr.roll(&mut rng);
            assert_eq!(roll.rolls.len(), 4);
            assert!(roll.rolls.iter().all(|r| (1..=6).contains(r)));
            assert_eq!(roll.total, roll.dice_total - 2);
            assert!((expr.min()..=expr.max()).contains(&roll.total));
        }
    }
}
