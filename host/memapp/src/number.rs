//! Numeric command line arguments

use crate::{Error, Result};

/// How numeric arguments are interpreted
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Parsing {
    /// `strtol` semantics truncated to 32 bits; garbage reads as 0
    Lenient,
    /// The whole argument must be a number that fits in 32 bits
    Strict,
}

impl Parsing {
    /// Parses `text` in the given `radix` (10 or 16)
    pub fn parse(self, text: &str, radix: u32) -> Result<u32> {
        match self {
            Parsing::Lenient => Ok(parse_lenient(text, radix)),
            Parsing::Strict => parse_strict(text, radix),
        }
    }
}

/// Parses the leading number in `text` the way `strtol` does and truncates it to 32 bits
///
/// Leading whitespace, a sign and (in base 16) a `0x` prefix are accepted. Parsing stops at the
/// first character that is not a digit in `radix`. Out of range values saturate at the `i64`
/// bounds before being truncated.
pub fn parse_lenient(text: &str, radix: u32) -> u32 {
    let mut s = text.trim_start_matches(|c: char| c.is_ascii_whitespace());

    let negative = s.starts_with('-');
    if negative || s.starts_with('+') {
        s = &s[1..];
    }

    if radix == 16 && (s.starts_with("0x") || s.starts_with("0X")) {
        s = &s[2..];
    }

    let mut magnitude = 0u64;
    let mut overflow = false;
    for digit in s.chars().map_while(|c| c.to_digit(radix)) {
        match magnitude
            .checked_mul(u64::from(radix))
            .and_then(|m| m.checked_add(u64::from(digit)))
        {
            Some(m) => magnitude = m,
            None => {
                overflow = true;
                break;
            }
        }
    }

    let value = if negative {
        if overflow || magnitude > 1 << 63 {
            i64::MIN
        } else {
            (magnitude as i64).wrapping_neg()
        }
    } else if overflow || magnitude > i64::MAX as u64 {
        i64::MAX
    } else {
        magnitude as i64
    };

    value as u32
}

/// Parses `text` as an unsigned 32-bit number, rejecting anything `parse_lenient` would coerce
pub fn parse_strict(text: &str, radix: u32) -> Result<u32> {
    let digits = if radix == 16 {
        text.strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text)
    } else {
        text
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(Error::Parse {
            text: text.to_owned(),
            radix,
        });
    }

    u32::from_str_radix(digits, radix).map_err(|_| Error::Parse {
        text: text.to_owned(),
        radix,
    })
}
