//! Type dispatch for derived fields.
//!
//! Every field handed to a [`FieldSet`](crate::FieldSet) is stored as
//! `&mut dyn Any`. The registry maps the field's concrete type to a
//! constructor that downcasts it and wraps it in the matching adapter.
//! All scalars of the built-in catalog are registered, together with their
//! `Option<T>` and `Vec<T>` forms. Other types are added with
//! [`Registry::register`] and friends.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Duration;

use crate::repeatable::{Repeatable, make_generator};
use crate::scalar::Scalar;
use crate::value::{OptionalValue, ScalarValue, Value};

/// Wraps a type-erased field into an adapter, or returns `None` when the
/// field is not of the type the constructor was registered for.
pub type Constructor = for<'a> fn(&'a mut dyn Any) -> Option<Box<dyn Value + 'a>>;

#[derive(Clone)]
pub struct Registry {
    constructors: HashMap<TypeId, Constructor>,
}

fn scalar<'a, T: Scalar>(target: &'a mut dyn Any) -> Option<Box<dyn Value + 'a>> {
    let target = target.downcast_mut::<T>()?;
    Some(Box::new(ScalarValue::new(target)))
}

fn optional<'a, T: Scalar>(target: &'a mut dyn Any) -> Option<Box<dyn Value + 'a>> {
    let target = target.downcast_mut::<Option<T>>()?;
    Some(Box::new(OptionalValue::new(target)))
}

fn scalars<'a, T: Scalar>(target: &'a mut dyn Any) -> Option<Box<dyn Value + 'a>> {
    let target = target.downcast_mut::<Vec<T>>()?;
    Some(Box::new(Repeatable::scalars(target)))
}

fn custom<'a, T: Value + 'static>(target: &'a mut dyn Any) -> Option<Box<dyn Value + 'a>> {
    let target = target.downcast_mut::<T>()?;
    Some(Box::new(target))
}

fn customs<'a, T: Value + Default + 'static>(
    target: &'a mut dyn Any,
) -> Option<Box<dyn Value + 'a>> {
    let target = target.downcast_mut::<Vec<T>>()?;
    Some(Box::new(Repeatable::new(target, make_generator::<T>())))
}

macro_rules! register_scalars {
    ($registry:expr, $($ty:ty),* $(,)?) => {
        $( $registry.register_scalar::<$ty>(); )*
    };
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        register_scalars!(
            registry, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
            bool, String, Duration,
        );
        #[cfg(feature = "url")]
        registry.register_scalar::<url::Url>();
        #[cfg(feature = "regex")]
        registry.register_scalar::<regex::Regex>();
        registry
    }
}

impl Registry {
    /// Registry with the built-in scalar catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that knows no types at all.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register `T`, `Option<T>` and `Vec<T>` for a [`Scalar`] type.
    pub fn register_scalar<T: Scalar>(&mut self) -> &mut Self {
        self.insert::<T>(scalar::<T>);
        self.insert::<Option<T>>(optional::<T>);
        self.insert::<Vec<T>>(scalars::<T>);
        self
    }

    /// Register a caller-defined [`Value`] type. Fields of type `T` are
    /// parsed in place.
    pub fn register<T: Value + 'static>(&mut self) -> &mut Self {
        self.insert::<T>(custom::<T>)
    }

    /// Register `Vec<T>` for a caller-defined [`Value`] type, generating
    /// each element with `T::default()`.
    pub fn register_repeatable<T: Value + Default + 'static>(&mut self) -> &mut Self {
        self.insert::<Vec<T>>(customs::<T>)
    }

    /// Register an arbitrary constructor for `T`.
    pub fn insert<T: Any>(&mut self, constructor: Constructor) -> &mut Self {
        self.constructors.insert(TypeId::of::<T>(), constructor);
        self
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.constructors.contains_key(&TypeId::of::<T>())
    }

    /// Wrap `target` in the adapter registered for its concrete type.
    pub(crate) fn construct<'a>(&self, target: &'a mut dyn Any) -> Option<Box<dyn Value + 'a>> {
        let constructor = self.constructors.get(&(*target).type_id())?;
        constructor(target)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.constructors.len())
            .finish()
    }
}
