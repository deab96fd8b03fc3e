//! The [`Value`] capability and the typed adapters that bind it to caller
//! storage.
//!
//! Every adapter borrows the caller's variable (`&'a mut T`) for as long as
//! the owning [`Config`](crate::Config) lives. Nothing is copied out: once the
//! config is dropped, the caller's variables hold the resolved values.

use crate::error::ValueError;
use crate::scalar::Scalar;
use crate::validators::Validator;

/// Something that can be rendered to text and parsed from text.
///
/// `render` must be free of side effects; it is used both for the default
/// shown in usage output and for display of the current value.
pub trait Value {
    fn render(&self) -> String;

    fn parse(&mut self, input: &str) -> Result<(), ValueError>;

    /// Bool-like values accept a bare `-flag` on the command line.
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// Repeatable values may be given several times and may consume every
    /// remaining positional argument.
    fn is_repeatable(&self) -> bool {
        false
    }

    /// Default type hint for usage output. Empty means none.
    fn type_hint(&self) -> String {
        String::new()
    }
}

impl<V: Value + ?Sized> Value for &mut V {
    fn render(&self) -> String {
        (**self).render()
    }

    fn parse(&mut self, input: &str) -> Result<(), ValueError> {
        (**self).parse(input)
    }

    fn is_bool_flag(&self) -> bool {
        (**self).is_bool_flag()
    }

    fn is_repeatable(&self) -> bool {
        (**self).is_repeatable()
    }

    fn type_hint(&self) -> String {
        (**self).type_hint()
    }
}

impl<V: Value + ?Sized> Value for Box<V> {
    fn render(&self) -> String {
        (**self).render()
    }

    fn parse(&mut self, input: &str) -> Result<(), ValueError> {
        (**self).parse(input)
    }

    fn is_bool_flag(&self) -> bool {
        (**self).is_bool_flag()
    }

    fn is_repeatable(&self) -> bool {
        (**self).is_repeatable()
    }

    fn type_hint(&self) -> String {
        (**self).type_hint()
    }
}

/// Run `validators` in order, stopping at the first rejection.
pub(crate) fn run_validators<T>(validators: &[Validator<T>], value: &T) -> Result<(), ValueError> {
    validators.iter().try_for_each(|validate| validate(value))
}

/// Adapter for a plain scalar variable.
///
/// The new value is parsed and validated before it is written, so a rejected
/// value leaves the variable untouched.
pub struct ScalarValue<'a, T: Scalar> {
    target: &'a mut T,
    validators: Vec<Validator<T>>,
}

impl<'a, T: Scalar> ScalarValue<'a, T> {
    pub fn new(target: &'a mut T) -> Self {
        Self {
            target,
            validators: Vec::new(),
        }
    }

    /// Append a validator to the pipeline.
    pub fn validate(mut self, validator: Validator<T>) -> Self {
        self.validators.push(validator);
        self
    }
}

impl<T: Scalar> Value for ScalarValue<'_, T> {
    fn render(&self) -> String {
        self.target.to_text()
    }

    fn parse(&mut self, input: &str) -> Result<(), ValueError> {
        let parsed = T::from_text(input)?;
        run_validators(&self.validators, &parsed)?;
        *self.target = parsed;
        Ok(())
    }

    fn is_bool_flag(&self) -> bool {
        T::IS_BOOL
    }

    fn type_hint(&self) -> String {
        T::TYPE_HINT.to_string()
    }
}

/// Adapter for an `Option<T>` variable: unset renders as empty text and the
/// first successful parse populates it.
pub struct OptionalValue<'a, T: Scalar> {
    target: &'a mut Option<T>,
    validators: Vec<Validator<T>>,
}

impl<'a, T: Scalar> OptionalValue<'a, T> {
    pub fn new(target: &'a mut Option<T>) -> Self {
        Self {
            target,
            validators: Vec::new(),
        }
    }

    pub fn validate(mut self, validator: Validator<T>) -> Self {
        self.validators.push(validator);
        self
    }
}

impl<T: Scalar> Value for OptionalValue<'_, T> {
    fn render(&self) -> String {
        self.target.as_ref().map(Scalar::to_text).unwrap_or_default()
    }

    fn parse(&mut self, input: &str) -> Result<(), ValueError> {
        let parsed = T::from_text(input)?;
        run_validators(&self.validators, &parsed)?;
        *self.target = Some(parsed);
        Ok(())
    }

    fn is_bool_flag(&self) -> bool {
        T::IS_BOOL
    }

    fn type_hint(&self) -> String {
        T::TYPE_HINT.to_string()
    }
}

/// Attach validators to a caller-defined [`Value`].
///
/// The validators receive the value itself after it parsed the input. The
/// value is mutated in place, so a rejected input stays written.
pub struct Validated<'a, V: Value> {
    inner: &'a mut V,
    validators: Vec<Validator<V>>,
}

impl<'a, V: Value> Validated<'a, V> {
    pub fn new(inner: &'a mut V) -> Self {
        Self {
            inner,
            validators: Vec::new(),
        }
    }

    pub fn validate(mut self, validator: Validator<V>) -> Self {
        self.validators.push(validator);
        self
    }
}

impl<V: Value> Value for Validated<'_, V> {
    fn render(&self) -> String {
        self.inner.render()
    }

    fn parse(&mut self, input: &str) -> Result<(), ValueError> {
        self.inner.parse(input)?;
        run_validators(&self.validators, &*self.inner)
    }

    fn is_bool_flag(&self) -> bool {
        self.inner.is_bool_flag()
    }

    fn is_repeatable(&self) -> bool {
        self.inner.is_repeatable()
    }

    fn type_hint(&self) -> String {
        self.inner.type_hint()
    }
}
