//! Repeatable values: one flag or variable that accumulates into a `Vec`.
//!
//! Every token of the input is parsed by a freshly generated adapter and the
//! resulting element is appended to the caller's collection. Input is split
//! on commas, and a backslash escapes the character that follows it, so
//! `-tag=a -tag=b` and `-tag=a,b` both append `a` then `b`, while
//! `-tag=a\,b` appends the single element `a,b`.

use crate::error::ValueError;
use crate::scalar::Scalar;
use crate::validators::Validator;
use crate::value::{Value, run_validators};

/// Split a repeatable input on unescaped commas.
///
/// A backslash makes the next character literal and is itself dropped. The
/// result always has at least one token: the empty string yields `[""]`.
pub fn split_repeatable(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut escaping = false;

    for c in input.chars() {
        if escaping {
            escaping = false;
            current.push(c);
            continue;
        }
        match c {
            '\\' => escaping = true,
            ',' => out.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    out.push(current);
    out
}

/// A throwaway adapter produced by a generator for a single token.
///
/// After a successful [`Value::parse`] the adapter is turned into the
/// collection element with [`into_item`](Generated::into_item).
pub trait Generated: Value {
    type Item;

    fn into_item(self) -> Result<Self::Item, ValueError>;

    fn render_item(item: &Self::Item) -> String;
}

/// Generated adapter for scalar elements.
pub struct Slot<T: Scalar> {
    value: Option<T>,
}

impl<T: Scalar> Default for Slot<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: Scalar> Value for Slot<T> {
    fn render(&self) -> String {
        self.value.as_ref().map(Scalar::to_text).unwrap_or_default()
    }

    fn parse(&mut self, input: &str) -> Result<(), ValueError> {
        self.value = Some(T::from_text(input)?);
        Ok(())
    }

    fn type_hint(&self) -> String {
        T::TYPE_HINT.to_string()
    }
}

impl<T: Scalar> Generated for Slot<T> {
    type Item = T;

    fn into_item(self) -> Result<T, ValueError> {
        self.value
            .ok_or_else(|| ValueError::malformed("generated value holds nothing after parsing"))
    }

    fn render_item(item: &T) -> String {
        item.to_text()
    }
}

/// Generated adapter for caller-defined [`Value`] types.
pub struct Custom<T: Value + Default> {
    value: T,
}

impl<T: Value + Default> Value for Custom<T> {
    fn render(&self) -> String {
        self.value.render()
    }

    fn parse(&mut self, input: &str) -> Result<(), ValueError> {
        self.value.parse(input)
    }

    fn type_hint(&self) -> String {
        self.value.type_hint()
    }
}

impl<T: Value + Default> Generated for Custom<T> {
    type Item = T;

    fn into_item(self) -> Result<T, ValueError> {
        Ok(self.value)
    }

    fn render_item(item: &T) -> String {
        item.render()
    }
}

/// Generator of empty scalar slots.
pub fn generator<T: Scalar>() -> impl Fn() -> Slot<T> {
    Slot::default
}

/// Generator of default-constructed custom values.
pub fn make_generator<T: Value + Default>() -> impl Fn() -> Custom<T> {
    || Custom {
        value: T::default(),
    }
}

/// Adapter appending to a caller-owned `Vec`.
///
/// All tokens of one input are parsed and validated before any is appended,
/// so a failing token leaves the collection as it was.
pub struct Repeatable<'a, G: Generated> {
    target: &'a mut Vec<G::Item>,
    generator: Box<dyn Fn() -> G + 'a>,
    validators: Vec<Validator<G::Item>>,
}

impl<'a, G: Generated> Repeatable<'a, G> {
    pub fn new(target: &'a mut Vec<G::Item>, generator: impl Fn() -> G + 'a) -> Self {
        Self {
            target,
            generator: Box::new(generator),
            validators: Vec::new(),
        }
    }

    /// Append a validator that runs on every element.
    pub fn validate(mut self, validator: Validator<G::Item>) -> Self {
        self.validators.push(validator);
        self
    }
}

impl<'a, T: Scalar> Repeatable<'a, Slot<T>> {
    /// Repeatable over a `Vec` of scalars.
    pub fn scalars(target: &'a mut Vec<T>) -> Self {
        Self::new(target, generator::<T>())
    }
}

impl<G: Generated> Value for Repeatable<'_, G> {
    fn render(&self) -> String {
        let items: Vec<String> = self.target.iter().map(G::render_item).collect();
        format!("[{}]", items.join(","))
    }

    fn parse(&mut self, input: &str) -> Result<(), ValueError> {
        let mut staged = Vec::new();
        for token in split_repeatable(input) {
            let mut generated = (self.generator)();
            generated.parse(&token)?;
            let item = generated.into_item()?;
            run_validators(&self.validators, &item)?;
            staged.push(item);
        }
        self.target.extend(staged);
        Ok(())
    }

    fn is_repeatable(&self) -> bool {
        true
    }

    fn type_hint(&self) -> String {
        let element = (self.generator)().type_hint();
        if element.is_empty() {
            "repeatable".into()
        } else {
            format!("repeatable {element}")
        }
    }
}
