//! Deriving flags from a plain struct.
//!
//! A struct opts in by implementing [`Fields`] and registering each of its
//! fields with the [`FieldSet`] it is handed:
//!
//! ```ignore
//! impl Fields for Server {
//!     fn fields<'a>(&'a mut self, set: &mut FieldSet<'a>) {
//!         set.field("host", &mut self.host).usage("address to bind");
//!         set.field("port", &mut self.port).flag("p,require");
//!         set.field("token", &mut self.token).flag("-").env("API_TOKEN");
//!         set.nested("database", &mut self.database).flag("db");
//!         set.field("files", &mut self.files).positional();
//!     }
//! }
//! ```
//!
//! # Tags
//!
//! `flag("name,opt,...")` overrides the CLI name. An empty name keeps the
//! derived one, `-` removes the CLI name. Options are `require`,
//! `positional` and `inline`.
//!
//! `env("NAME,opt")` overrides the env name with the same empty / `-` rules.
//! The only option is `inline`.
//!
//! Without overrides a field `pool_size` (or `PoolSize`) derives the flag
//! `-pool-size` and the variable `POOL_SIZE`.
//!
//! # Nesting
//!
//! Children of a nested struct are prefixed with the parent's names:
//! `-database-url`, `DATABASE_URL`. An `inline` parent adds no prefix, and
//! neither does a parent whose CLI (or env) name was removed with `-`: its
//! children keep their own names. `require` on the parent marks every child
//! required.
//!
//! # Ordering
//!
//! Derived flags come out sorted: required flags first, then optional ones,
//! each group by CLI name, with env-only flags (no CLI name) first. Positional
//! flags follow in declaration order.

use std::any::Any;

use tracing::debug;

use crate::error::RigError;
use crate::flag::Flag;
use crate::naming::{to_kebab_case, to_upper_snake_case};
use crate::registry::Registry;
use crate::resolve::check_positionals;
use crate::value::Value;

/// A struct whose fields can be turned into flags.
pub trait Fields {
    /// Register every configurable field on `set`.
    fn fields<'a>(&'a mut self, set: &mut FieldSet<'a>);
}

/// Collects the fields registered by a [`Fields`] implementation.
#[derive(Default)]
pub struct FieldSet<'a> {
    specs: Vec<FieldSpec<'a>>,
}

enum Target<'a> {
    Field {
        target: &'a mut dyn Any,
        type_name: &'static str,
    },
    Value(Box<dyn Value + 'a>),
    Nested(Vec<FieldSpec<'a>>),
}

/// Registration of a single field. The setters mirror the tag vocabulary.
pub struct FieldSpec<'a> {
    ident: &'static str,
    flag: Option<String>,
    env: Option<String>,
    usage: String,
    type_hint: Option<String>,
    required: bool,
    positional: bool,
    inline: bool,
    ignored: bool,
    target: Target<'a>,
}

impl<'a> FieldSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field whose type is resolved through the [`Registry`].
    pub fn field<T: Any>(&mut self, ident: &'static str, target: &'a mut T) -> &mut FieldSpec<'a> {
        self.push(FieldSpec::new(
            ident,
            Target::Field {
                target,
                type_name: std::any::type_name::<T>(),
            },
        ))
    }

    /// Register a field through an explicit adapter, bypassing the registry.
    pub fn value(&mut self, ident: &'static str, adapter: impl Value + 'a) -> &mut FieldSpec<'a> {
        self.push(FieldSpec::new(ident, Target::Value(Box::new(adapter))))
    }

    /// Register a nested struct. Its fields are collected immediately.
    pub fn nested<F: Fields>(&mut self, ident: &'static str, target: &'a mut F) -> &mut FieldSpec<'a> {
        let mut children = FieldSet::new();
        target.fields(&mut children);
        self.push(FieldSpec::new(ident, Target::Nested(children.specs)))
    }

    fn push(&mut self, spec: FieldSpec<'a>) -> &mut FieldSpec<'a> {
        let at = self.specs.len();
        self.specs.push(spec);
        &mut self.specs[at]
    }
}

impl<'a> FieldSpec<'a> {
    fn new(ident: &'static str, target: Target<'a>) -> Self {
        Self {
            ident,
            flag: None,
            env: None,
            usage: String::new(),
            type_hint: None,
            required: false,
            positional: false,
            inline: false,
            ignored: false,
            target,
        }
    }

    /// Flag tag: `"name,require,positional,inline"` or `"-"`.
    pub fn flag(&mut self, tag: &str) -> &mut Self {
        self.flag = Some(tag.to_string());
        self
    }

    /// Env tag: `"NAME"`, `"NAME,inline"` or `"-"`.
    pub fn env(&mut self, tag: &str) -> &mut Self {
        self.env = Some(tag.to_string());
        self
    }

    pub fn usage(&mut self, usage: &str) -> &mut Self {
        self.usage = usage.to_string();
        self
    }

    pub fn type_hint(&mut self, hint: &str) -> &mut Self {
        self.type_hint = Some(hint.to_string());
        self
    }

    pub fn required(&mut self) -> &mut Self {
        self.required = true;
        self
    }

    pub fn positional(&mut self) -> &mut Self {
        self.positional = true;
        self
    }

    /// Inline both names: no prefix for a nested struct, no names for a leaf.
    pub fn inline(&mut self) -> &mut Self {
        self.inline = true;
        self
    }

    /// Leave the field out entirely.
    pub fn ignore(&mut self) -> &mut Self {
        self.ignored = true;
        self
    }
}

/// How one name kind (CLI or env) of a field resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Naming {
    Named(String),
    Inline,
    Removed,
}

impl Naming {
    /// The name a leaf field ends up with.
    fn leaf(self) -> Option<String> {
        match self {
            Naming::Named(name) => Some(name),
            Naming::Inline | Naming::Removed => None,
        }
    }

    /// Rewrite a child's name under this parent naming. Only a named parent
    /// contributes a prefix.
    fn apply(&self, child: Option<String>, sep: char) -> Option<String> {
        match self {
            Naming::Named(parent) => child.map(|c| format!("{parent}{sep}{c}")),
            Naming::Inline | Naming::Removed => child,
        }
    }
}

struct FlagTag {
    naming: Naming,
    required: bool,
    positional: bool,
}

fn parse_flag_tag(ident: &str, tag: Option<&str>, path: &str) -> Result<FlagTag, RigError> {
    let mut parts = tag.unwrap_or("").split(',');
    let name = parts.next().unwrap_or("");
    let mut parsed = FlagTag {
        naming: Naming::Named(String::new()),
        required: false,
        positional: false,
    };

    for option in parts {
        match option {
            "inline" => parsed.naming = Naming::Inline,
            "require" => parsed.required = true,
            "positional" => parsed.positional = true,
            other => {
                return Err(RigError::UnknownFlagOption {
                    path: path.to_string(),
                    option: other.to_string(),
                });
            }
        }
    }

    if parsed.naming != Naming::Inline {
        parsed.naming = match name {
            "-" => Naming::Removed,
            "" => Naming::Named(to_kebab_case(ident)),
            name => Naming::Named(name.to_string()),
        };
    }
    Ok(parsed)
}

fn parse_env_tag(ident: &str, tag: Option<&str>, path: &str) -> Result<Naming, RigError> {
    let parts: Vec<&str> = tag.unwrap_or("").split(',').collect();
    match parts.as_slice() {
        [_, _, _, ..] => Err(RigError::TooManyEnvOptions {
            path: path.to_string(),
        }),
        [_, "inline"] => Ok(Naming::Inline),
        [_, other] => Err(RigError::UnknownEnvOption {
            path: path.to_string(),
            option: other.to_string(),
        }),
        ["-"] => Ok(Naming::Removed),
        [""] | [] => Ok(Naming::Named(to_upper_snake_case(ident))),
        [name] => Ok(Naming::Named(name.to_string())),
    }
}

fn derive_specs<'a>(
    specs: Vec<FieldSpec<'a>>,
    parent: &str,
    registry: &Registry,
) -> Result<Vec<Flag<'a>>, RigError> {
    let mut flags = Vec::new();

    for spec in specs {
        if spec.ignored {
            continue;
        }
        let path = if parent.is_empty() {
            spec.ident.to_string()
        } else {
            format!("{parent}.{}", spec.ident)
        };

        let flag_tag = parse_flag_tag(spec.ident, spec.flag.as_deref(), &path)?;
        let mut env_naming = parse_env_tag(spec.ident, spec.env.as_deref(), &path)?;
        let mut flag_naming = flag_tag.naming;
        if spec.inline {
            flag_naming = Naming::Inline;
            env_naming = Naming::Inline;
        }
        let required = spec.required || flag_tag.required;
        let positional = spec.positional || flag_tag.positional;

        let (value, type_name) = match spec.target {
            Target::Nested(children) => {
                if positional {
                    return Err(RigError::UnsupportedNestedOption {
                        path,
                        option: "positional".into(),
                    });
                }
                for mut child in derive_specs(children, &path, registry)? {
                    child.name = flag_naming.apply(child.name.take(), '-');
                    child.env = env_naming.apply(child.env.take(), '_');
                    child.required |= required;
                    flags.push(child);
                }
                continue;
            }
            Target::Value(value) => (Some(value), "<adapter>"),
            Target::Field { target, type_name } => (registry.construct(target), type_name),
        };

        let name = flag_naming.leaf();
        let env = env_naming.leaf();
        if name.is_none() && env.is_none() && !positional {
            debug!(event = "rig.derive.skipped", path = %path);
            continue;
        }
        let Some(value) = value else {
            return Err(RigError::UnsupportedType { path, type_name });
        };

        let flag = Flag {
            type_hint: spec.type_hint.unwrap_or_else(|| value.type_hint()),
            value,
            name,
            env,
            usage: spec.usage,
            required,
            positional,
            set: false,
            default: None,
        };
        debug!(
            event = "rig.derive.field",
            path = %path,
            name = flag.name().unwrap_or(""),
            env = flag.env().unwrap_or(""),
        );
        flags.push(flag);
    }

    Ok(flags)
}

/// Order derived flags: required, then optional, each by CLI name (a missing
/// name sorts first); positional flags last in declaration order.
fn sort_flags(flags: &mut [Flag<'_>]) {
    fn key<'f>(flag: &'f Flag<'_>) -> (bool, &'f str) {
        (!flag.required, flag.name().unwrap_or(""))
    }
    flags.sort_by(|a, b| match (a.positional, b.positional) {
        (false, false) => key(a).cmp(&key(b)),
        (x, y) => x.cmp(&y),
    });
}

/// Derive the flags of `target` using the built-in type registry.
pub fn struct_to_flags<F: Fields>(target: &mut F) -> Result<Vec<Flag<'_>>, RigError> {
    struct_to_flags_with(target, &Registry::new())
}

/// Derive the flags of `target`, resolving field types through `registry`.
///
/// Any tag error or unsupported field type fails the whole derivation.
pub fn struct_to_flags_with<'a, F: Fields>(
    target: &'a mut F,
    registry: &Registry,
) -> Result<Vec<Flag<'a>>, RigError> {
    let mut set = FieldSet::new();
    target.fields(&mut set);

    let mut flags = derive_specs(set.specs, "", registry)?;
    sort_flags(&mut flags);
    check_positionals(&flags)?;
    Ok(flags)
}
