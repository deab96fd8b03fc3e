//! Typed configuration for command-line tools, resolved from flags,
//! environment variables and compiled-in defaults.
//!
//! Flagrig binds each configurable value to a variable you already own.
//! Declare the variables with their defaults, describe where each one can
//! come from, and parse:
//!
//! ```ignore
//! let mut port: u16 = 8080;
//! let mut host = String::from("localhost");
//!
//! flagrig::parse(vec![
//!     flagrig::var(&mut port, "port", "PORT", "listen port"),
//!     flagrig::var(&mut host, "host", "HOST", "bind address").required(),
//! ])?;
//! ```
//!
//! After the call `port` and `host` hold the resolved values. Nothing is
//! copied out of a config map; the adapters write straight into your
//! variables.
//!
//! # Precedence
//!
//! ```text
//! Compiled defaults     the value the variable held before parsing
//!        ↑ overridden by
//! Environment vars      PORT=9000
//!        ↑ overridden by
//! Command line          -port 9000, -port=9000, or a positional argument
//! ```
//!
//! A flag set on the command line is never touched by the environment.
//! Positional arguments are assigned after the environment: they overwrite
//! an environment value, and a repeatable positional flag appends to the
//! elements the environment supplied. An environment variable set to the
//! empty string counts as unset. Flags marked [`required`](Flag::required)
//! that no source assigned are all reported together, so a user sees every
//! missing setting in one run.
//!
//! # Command-line syntax
//!
//! Flags take one or two dashes: `-name value`, `-name=value`,
//! `--name=value`. Boolean flags may be given bare (`-verbose`). Parsing
//! stops at the first argument that is not a flag, or after `--`. The
//! remaining arguments are assigned to [`positional`](Flag::positional) flags
//! in order, or left for [`Config::args`] when there are none.
//!
//! # Value types
//!
//! [`var`] accepts every [`Scalar`]: all integer widths, `f32`, `f64`,
//! `bool`, `String`, [`std::time::Duration`] (`1h30m`, `250ms`), plus
//! `url::Url` and `regex::Regex` behind the `url` and `regex` features.
//! [`optional`] binds an `Option<T>` that stays `None` unless a source sets
//! it. Anything else implements [`Value`] and goes through [`Flag::new`].
//!
//! # Repeatable values
//!
//! [`repeatable`] binds a `Vec`. Each occurrence of the flag appends, and
//! each occurrence is also split on commas, so `-tag=a -tag=b` and
//! `-tag=a,b` are the same. Escape a literal comma with a backslash:
//! `-tag=a\,b` appends the single element `a,b`. The same splitting applies
//! to environment variables.
//!
//! # Validation
//!
//! Adapters take validators that see the parsed value, never the raw text.
//! The [`validators`] module has ready-made ones:
//!
//! ```ignore
//! let level = ScalarValue::new(&mut level).validate(validators::range(0, 9));
//! Flag::new(level, "level", "LEVEL", "compression level");
//! ```
//!
//! Scalar, optional and repeatable adapters only write a value once every
//! validator accepted it. [`Validated`] wraps a caller-defined [`Value`] and
//! validates after it parsed in place.
//!
//! # Deriving flags from a struct
//!
//! Implement [`Fields`] to describe a struct once and derive its flags with
//! [`struct_to_flags`] or [`parse_struct`]. Names are derived from the field
//! identifiers (`pool_size` becomes `-pool-size` and `POOL_SIZE`), nested
//! structs prefix their children, and tags override names and mark fields
//! required, positional, inline or ignored. Field types are resolved through
//! a [`Registry`], which custom types can be added to. See the [`derive`]
//! module for the tag vocabulary.
//!
//! # Failure policy
//!
//! On failure [`Config::parse`] writes the error and the usage text to its
//! output (stderr unless configured), then applies its [`ErrorHandling`]:
//! return the error, exit the process (status 2, or 0 for `-h`), or panic.
//! The [`parse`] and [`parse_struct`] shortcuts read the process arguments
//! and exit.
//!
//! # Usage data
//!
//! [`Config::describe`] returns a serializable [`FlagInfo`] per flag for
//! callers that render their own help. [`Config::usage`] renders the plain
//! text layout used for error output.
//!
//! # Logging
//!
//! Resolution emits [`tracing`] events with an `event` field
//! (`rig.cli.assigned`, `rig.env.assigned`, `rig.parse.failed`, ...). Only
//! names are logged, never values.

pub mod derive;
pub mod error;
pub mod validators;

mod config;
mod env;
mod flag;
mod flagset;
mod naming;
mod registry;
mod repeatable;
mod resolve;
mod scalar;
mod usage;
mod value;

#[cfg(test)]
mod fixtures;

pub use config::{Config, ErrorHandling, parse, parse_struct};
pub use derive::{FieldSet, FieldSpec, Fields, struct_to_flags, struct_to_flags_with};
pub use env::EnvSnapshot;
pub use error::{RigError, ValueError};
pub use flag::{Flag, optional, prefix, repeatable, var};
pub use registry::{Constructor, Registry};
pub use repeatable::{
    Custom, Generated, Repeatable, Slot, generator, make_generator, split_repeatable,
};
pub use scalar::Scalar;
pub use usage::{FlagInfo, render_usage};
pub use validators::Validator;
pub use value::{OptionalValue, ScalarValue, Validated, Value};
