//! Text codecs for the built-in scalar catalog.
//!
//! A [`Scalar`] knows how to turn text into itself and back. The typed
//! adapters in [`value`](crate::value) and [`repeatable`](crate::repeatable)
//! are generic over this trait, which is also what the struct deriver's
//! registry is populated from.

use std::time::Duration;

use crate::error::ValueError;

/// A plain value that can be configured from a single token of text.
pub trait Scalar: Sized + 'static {
    /// Short description shown next to the flag in usage output.
    const TYPE_HINT: &'static str;

    /// Whether a bare `-flag` (no `=value`) means `true`.
    const IS_BOOL: bool = false;

    fn from_text(input: &str) -> Result<Self, ValueError>;

    fn to_text(&self) -> String;
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                const TYPE_HINT: &'static str = "integer";

                fn from_text(input: &str) -> Result<Self, ValueError> {
                    let (negative, digits, radix) = split_radix(input);
                    if digits.starts_with(['-', '+']) {
                        return Err(ValueError::malformed(format!(
                            "expected integer: invalid sign in {input:?}"
                        )));
                    }
                    let digits = digits.replace('_', "");
                    let literal = if negative { format!("-{digits}") } else { digits };
                    <$ty>::from_str_radix(&literal, radix)
                        .map_err(|e| ValueError::malformed(format!("expected integer: {e}")))
                }

                fn to_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Split an integer literal into sign, digits and radix. Accepts the `0x`,
/// `0o` and `0b` prefixes (either case) after an optional sign. A second
/// sign is left in the digits so that parsing rejects it.
fn split_radix(input: &str) -> (bool, &str, u32) {
    let (negative, rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    let lower = rest.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (negative, &rest[2..], 16),
        Some("0o") => (negative, &rest[2..], 8),
        Some("0b") => (negative, &rest[2..], 2),
        _ => (negative, rest, 10),
    }
}

macro_rules! impl_float {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                const TYPE_HINT: &'static str = "float";

                fn from_text(input: &str) -> Result<Self, ValueError> {
                    input
                        .parse::<$ty>()
                        .map_err(|e| ValueError::malformed(format!("expected float: {e}")))
                }

                fn to_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_float!(f32, f64);

impl Scalar for bool {
    const TYPE_HINT: &'static str = "boolean";
    const IS_BOOL: bool = true;

    fn from_text(input: &str) -> Result<Self, ValueError> {
        match input {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(ValueError::malformed("expected boolean")),
        }
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

impl Scalar for String {
    const TYPE_HINT: &'static str = "string";

    fn from_text(input: &str) -> Result<Self, ValueError> {
        Ok(input.to_string())
    }

    fn to_text(&self) -> String {
        self.clone()
    }
}

impl Scalar for Duration {
    const TYPE_HINT: &'static str = "duration";

    fn from_text(input: &str) -> Result<Self, ValueError> {
        parse_duration(input)
    }

    fn to_text(&self) -> String {
        format_duration(*self)
    }
}

#[cfg(feature = "url")]
impl Scalar for url::Url {
    const TYPE_HINT: &'static str = "URL";

    fn from_text(input: &str) -> Result<Self, ValueError> {
        url::Url::parse(input).map_err(|e| ValueError::malformed(format!("expected URL: {e}")))
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

#[cfg(feature = "regex")]
impl Scalar for regex::Regex {
    const TYPE_HINT: &'static str = "Regexp";

    fn from_text(input: &str) -> Result<Self, ValueError> {
        regex::Regex::new(input).map_err(|e| ValueError::malformed(e.to_string()))
    }

    fn to_text(&self) -> String {
        self.as_str().to_string()
    }
}

const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("μs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60e9),
    ("h", 3600e9),
];

/// Parse a duration such as `300ms`, `1.5h` or `2h45m`. A bare `0` is accepted.
pub(crate) fn parse_duration(input: &str) -> Result<Duration, ValueError> {
    let invalid = || ValueError::malformed(format!("invalid duration {input:?}"));

    let rest = input.strip_prefix('+').unwrap_or(input);
    if rest.starts_with('-') {
        return Err(ValueError::malformed("duration cannot be negative"));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut nanos = 0f64;
    let mut rest = rest;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid());
        }
        let number: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        let (_, scale) = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .ok_or_else(|| ValueError::malformed(format!("unknown unit {unit:?} in duration {input:?}")))?;
        nanos += number * scale;
        rest = &rest[unit_len..];
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(ValueError::malformed(format!("duration {input:?} is out of range")));
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

/// Render a duration in the same unit syntax [`parse_duration`] accepts:
/// `1h2m3.5s`, `250ms`, `0s`.
pub(crate) fn format_duration(d: Duration) -> String {
    let total = d.as_nanos();
    if total == 0 {
        return "0s".into();
    }
    if total < 1_000 {
        return format!("{total}ns");
    }
    if total < 1_000_000 {
        return format!("{}µs", fraction(total, 1_000));
    }
    if total < 1_000_000_000 {
        return format!("{}ms", fraction(total, 1_000_000));
    }

    let hours = total / 3_600_000_000_000;
    let minutes = (total / 60_000_000_000) % 60;
    let seconds = total % 60_000_000_000;
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{}s", fraction(seconds, 1_000_000_000)));
    out
}

/// `value / unit` as a decimal string without trailing zeros.
fn fraction(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let width = unit.to_string().len() - 1;
    let digits = format!("{rem:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
