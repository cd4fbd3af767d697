//! Decimal text for [`Fixed`] values.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{fixed::Fixed, words};

/// Decimal digits injected or emitted per fractional step.
const GROUP_DIGITS: usize = 5;
const GROUP_SCALE: u32 = 100_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFixedError {
    #[error("empty string")]
    Empty,
    #[error("no digits")]
    NoDigits,
    #[error("invalid character {found:?} at byte {index}")]
    InvalidDigit { index: usize, found: char },
    #[error("more than one decimal point")]
    MultipleDots,
    #[error("integer part does not fit in 32 bits")]
    IntegerOverflow,
}

/// Parses `[+|-]digits[.digits]`, surrounded by optional whitespace.
///
/// The fraction is truncated to the precision of `Fixed<N>`.
impl<const N: usize> FromStr for Fixed<N> {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseFixedError::Empty);
        }

        let (negative, body) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let offset = s.len() - body.len();
        let mut dots = 0;
        for (index, found) in body.char_indices() {
            match found {
                '.' => dots += 1,
                '0'..='9' => {}
                _ => {
                    return Err(ParseFixedError::InvalidDigit {
                        index: offset + index,
                        found,
                    })
                }
            }
        }
        if dots > 1 {
            return Err(ParseFixedError::MultipleDots);
        }

        let (integer, fraction) = body.split_once('.').unwrap_or((body, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(ParseFixedError::NoDigits);
        }

        let integer = integer.bytes().try_fold(0u32, |acc, digit| {
            acc.checked_mul(10)?.checked_add(u32::from(digit - b'0'))
        });
        let integer = integer.ok_or(ParseFixedError::IntegerOverflow)?;

        // Inject the fraction from its last digit group to its first: each
        // group is placed in the integer word and the whole array divided down
        // by the group's power of ten.
        let mut magnitude = [0u32; N];
        for group in fraction.as_bytes().rchunks(GROUP_DIGITS) {
            let value = group
                .iter()
                .fold(0u32, |acc, digit| acc * 10 + u32::from(digit - b'0'));
            set_integer_word(&mut magnitude, value);
            words::div(&mut magnitude, 10u32.pow(group.len() as u32), 0);
        }
        set_integer_word(&mut magnitude, integer);

        Ok(Self::from_words(negative, magnitude))
    }
}

fn set_integer_word(magnitude: &mut [u32], value: u32) {
    if let Some(first) = magnitude.first_mut() {
        *first = value;
    }
}

/// Prints the integer part and then every fractional word in groups of five
/// decimal digits. Each group consumes about 16.6 bits, so `2 * (N - 1)`
/// groups are printed. Positive values get a `+` only with the `{:+}` flag.
impl<const N: usize> fmt::Display for Fixed<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if self.is_negative() {
            f.write_str("-")?;
        } else if f.sign_plus() {
            f.write_str("+")?;
        }

        let mut z = *self.words();
        write!(f, "{}", z.first().copied().unwrap_or(0))?;
        if N < 2 {
            return Ok(());
        }

        f.write_str(".")?;
        for _ in 0..2 * (N - 1) {
            z[0] = 0;
            words::mul(&mut z, GROUP_SCALE, 0);
            write!(f, "{:05}", z[0])?;
        }
        Ok(())
    }
}
