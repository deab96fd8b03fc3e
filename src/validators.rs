//! Ready-made validators.
//!
//! A validator receives the fully parsed value, never the raw text. Attach
//! them with `validate` on [`ScalarValue`](crate::ScalarValue),
//! [`OptionalValue`](crate::OptionalValue), [`Repeatable`](crate::Repeatable)
//! or [`Validated`](crate::Validated):
//!
//! ```ignore
//! let level = ScalarValue::new(&mut level).validate(validators::range(0, 54));
//! ```
//!
//! `Duration` has no `Display`, so durations use [`duration_range`],
//! [`duration_min`] and [`duration_max`] instead of the generic bounds.

use std::fmt::Display;
use std::time::Duration;

use crate::error::ValueError;
use crate::scalar::format_duration;

/// A predicate over a parsed value. Returning an error rejects the value.
pub type Validator<T> = Box<dyn Fn(&T) -> Result<(), ValueError>>;

/// Reject values strictly smaller than `min` or strictly larger than `max`.
pub fn range<T>(min: T, max: T) -> Validator<T>
where
    T: PartialOrd + Display + 'static,
{
    Box::new(move |v: &T| {
        if *v < min {
            return Err(ValueError::rejected(format!("value should be {min} or more")));
        }
        if *v > max {
            return Err(ValueError::rejected(format!("value should be {max} or less")));
        }
        Ok(())
    })
}

pub fn min<T>(min: T) -> Validator<T>
where
    T: PartialOrd + Display + 'static,
{
    Box::new(move |v: &T| {
        if *v < min {
            return Err(ValueError::rejected(format!("value should be {min} or more")));
        }
        Ok(())
    })
}

pub fn max<T>(max: T) -> Validator<T>
where
    T: PartialOrd + Display + 'static,
{
    Box::new(move |v: &T| {
        if *v > max {
            return Err(ValueError::rejected(format!("value should be {max} or less")));
        }
        Ok(())
    })
}

/// Reject strings that are empty after trimming whitespace.
pub fn not_empty() -> Validator<String> {
    Box::new(|s: &String| {
        if s.trim().is_empty() {
            return Err(ValueError::rejected("string should not be empty"));
        }
        Ok(())
    })
}

pub fn length_range(min: usize, max: usize) -> Validator<String> {
    Box::new(move |s: &String| {
        let len = s.chars().count();
        if len < min {
            return Err(ValueError::rejected(format!(
                "string should be at least {min} characters long"
            )));
        }
        if len > max {
            return Err(ValueError::rejected(format!(
                "string should be at most {max} characters long"
            )));
        }
        Ok(())
    })
}

pub fn length_min(min: usize) -> Validator<String> {
    length_range(min, usize::MAX)
}

pub fn length_max(max: usize) -> Validator<String> {
    length_range(0, max)
}

/// Reject strings containing any of `chars`.
pub fn exclude_chars(chars: &str) -> Validator<String> {
    let chars = chars.to_string();
    Box::new(move |s: &String| {
        if s.contains(|c: char| chars.contains(c)) {
            return Err(ValueError::rejected(format!(
                "string should not contain any of {chars:?}"
            )));
        }
        Ok(())
    })
}

pub fn exclude_prefix(prefix: &str) -> Validator<String> {
    let prefix = prefix.to_string();
    Box::new(move |s: &String| {
        if s.starts_with(&prefix) {
            return Err(ValueError::rejected(format!(
                "string should not start with {prefix:?}"
            )));
        }
        Ok(())
    })
}

pub fn exclude_suffix(suffix: &str) -> Validator<String> {
    let suffix = suffix.to_string();
    Box::new(move |s: &String| {
        if s.ends_with(&suffix) {
            return Err(ValueError::rejected(format!(
                "string should not end with {suffix:?}"
            )));
        }
        Ok(())
    })
}

/// Reject durations strictly shorter than `min` or strictly longer than `max`.
pub fn duration_range(min: Duration, max: Duration) -> Validator<Duration> {
    Box::new(move |d: &Duration| {
        if *d < min {
            return Err(ValueError::rejected(format!(
                "duration should be {} or more",
                format_duration(min)
            )));
        }
        if *d > max {
            return Err(ValueError::rejected(format!(
                "duration should be {} or less",
                format_duration(max)
            )));
        }
        Ok(())
    })
}

pub fn duration_min(min: Duration) -> Validator<Duration> {
    duration_range(min, Duration::MAX)
}

pub fn duration_max(max: Duration) -> Validator<Duration> {
    duration_range(Duration::ZERO, max)
}

/// Reject durations that are not a whole multiple of `step`.
pub fn rounded(step: Duration) -> Validator<Duration> {
    Box::new(move |d: &Duration| {
        if step.is_zero() || d.as_nanos() % step.as_nanos() == 0 {
            return Ok(());
        }
        Err(ValueError::rejected(format!(
            "duration should be a multiple of {}",
            format_duration(step)
        )))
    })
}

/// Require the URL scheme to be `scheme`. An empty `scheme` accepts anything.
#[cfg(feature = "url")]
pub fn scheme(scheme: &str) -> Validator<url::Url> {
    let scheme = scheme.to_string();
    Box::new(move |u: &url::Url| {
        if scheme.is_empty() || u.scheme() == scheme {
            return Ok(());
        }
        Err(ValueError::rejected(format!("url should use {scheme:?} scheme")))
    })
}

/// Reject URLs using `scheme`. An empty `scheme` accepts anything.
#[cfg(feature = "url")]
pub fn exclude_scheme(scheme: &str) -> Validator<url::Url> {
    let scheme = scheme.to_string();
    Box::new(move |u: &url::Url| {
        if scheme.is_empty() || u.scheme() != scheme {
            return Ok(());
        }
        Err(ValueError::rejected(format!("url should not use {scheme:?} scheme")))
    })
}
