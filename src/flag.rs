//! The descriptor of one configurable value.

use crate::error::{RigError, ValueError};
use crate::repeatable::{Generated, Repeatable};
use crate::scalar::Scalar;
use crate::value::{OptionalValue, ScalarValue, Value};

/// One configurable value: where it can come from and where it goes.
///
/// A flag owns its adapter, which in turn borrows the caller's variable. A
/// flag with neither a CLI name nor an env name can only be reached as a
/// positional argument; otherwise nothing will ever assign it.
pub struct Flag<'a> {
    pub(crate) value: Box<dyn Value + 'a>,
    pub(crate) name: Option<String>,
    pub(crate) env: Option<String>,
    pub(crate) usage: String,
    pub(crate) type_hint: String,
    pub(crate) required: bool,
    pub(crate) positional: bool,
    pub(crate) set: bool,
    pub(crate) default: Option<String>,
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

impl<'a> Flag<'a> {
    /// Wrap any [`Value`]. Empty `name` or `env` means "no such source".
    pub fn new(value: impl Value + 'a, name: &str, env: &str, usage: &str) -> Self {
        let type_hint = value.type_hint();
        Self {
            value: Box::new(value),
            name: non_empty(name),
            env: non_empty(env),
            usage: usage.to_string(),
            type_hint,
            required: false,
            positional: false,
            set: false,
            default: None,
        }
    }

    /// Fail resolution when no source assigns this flag.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Assign this flag from the positional arguments left after the flags.
    /// Its CLI name is then only used for display.
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    pub fn with_type_hint(mut self, hint: &str) -> Self {
        self.type_hint = hint.to_string();
        self
    }

    /// Prepend `name_prefix` to the CLI name and `env_prefix` to the env name.
    /// Absent names stay absent.
    pub fn prefixed(mut self, name_prefix: &str, env_prefix: &str) -> Self {
        if let Some(name) = &mut self.name {
            name.insert_str(0, name_prefix);
        }
        if let Some(env) = &mut self.env {
            env.insert_str(0, env_prefix);
        }
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn type_hint(&self) -> &str {
        &self.type_hint
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    /// Whether any source assigned this flag successfully.
    pub fn is_set(&self) -> bool {
        self.set
    }

    pub fn is_bool_flag(&self) -> bool {
        self.value.is_bool_flag()
    }

    pub fn is_repeatable(&self) -> bool {
        self.value.is_repeatable()
    }

    /// The current value as text.
    pub fn render(&self) -> String {
        self.value.render()
    }

    /// The value as it was before resolution started, once captured.
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Record the pre-resolution rendering. Only the first call has an effect.
    pub(crate) fn capture_default(&mut self) {
        if self.default.is_none() {
            self.default = Some(self.value.render());
        }
    }

    /// Parse `input` into the bound variable and mark the flag set on success.
    pub(crate) fn assign(&mut self, input: &str) -> Result<(), ValueError> {
        self.value.parse(input)?;
        self.set = true;
        Ok(())
    }

    /// Human label: CLI name, then env name.
    pub(crate) fn label(&self) -> &str {
        self.name().or(self.env()).unwrap_or("?")
    }

    pub(crate) fn missing_error(&self) -> RigError {
        if self.positional {
            return RigError::MissingPositional {
                name: self.label().to_string(),
                env: self.env.clone(),
            };
        }
        RigError::MissingFlag {
            name: self.name.clone(),
            env: self.env.clone(),
        }
    }
}

impl std::fmt::Debug for Flag<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("env", &self.env)
            .field("type_hint", &self.type_hint)
            .field("required", &self.required)
            .field("positional", &self.positional)
            .field("set", &self.set)
            .finish_non_exhaustive()
    }
}

/// Flag bound to a scalar variable.
pub fn var<'a, T: Scalar>(target: &'a mut T, name: &str, env: &str, usage: &str) -> Flag<'a> {
    Flag::new(ScalarValue::new(target), name, env, usage)
}

/// Flag bound to an `Option` variable, left `None` unless a source sets it.
pub fn optional<'a, T: Scalar>(
    target: &'a mut Option<T>,
    name: &str,
    env: &str,
    usage: &str,
) -> Flag<'a> {
    Flag::new(OptionalValue::new(target), name, env, usage)
}

/// Flag accumulating into a `Vec`, one generated element per token.
pub fn repeatable<'a, G: Generated + 'a>(
    target: &'a mut Vec<G::Item>,
    generator: impl Fn() -> G + 'a,
    name: &str,
    env: &str,
    usage: &str,
) -> Flag<'a>
where
    G::Item: 'a,
{
    Flag::new(Repeatable::new(target, generator), name, env, usage)
}

/// Apply [`Flag::prefixed`] to every flag.
pub fn prefix<'a>(name_prefix: &str, env_prefix: &str, flags: Vec<Flag<'a>>) -> Vec<Flag<'a>> {
    flags
        .into_iter()
        .map(|f| f.prefixed(name_prefix, env_prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repeatable::generator;

    #[test]
    fn empty_names_are_absent() {
        let mut port = 0u16;
        let flag = var(&mut port, "", "PORT", "listen port");
        assert_eq!(flag.name(), None);
        assert_eq!(flag.env(), Some("PORT"));
        assert_eq!(flag.type_hint(), "integer");
    }

    #[test]
    fn assign_marks_set_only_on_success() {
        let mut port = 0u16;
        let mut flag = var(&mut port, "port", "", "");
        assert!(flag.assign("x").is_err());
        assert!(!flag.is_set());
        flag.assign("80").unwrap();
        assert!(flag.is_set());
        assert_eq!(flag.render(), "80");
    }

    #[test]
    fn default_is_captured_once() {
        let mut host = String::from("localhost");
        let mut flag = var(&mut host, "host", "HOST", "");
        flag.capture_default();
        flag.assign("example.com").unwrap();
        flag.capture_default();
        assert_eq!(flag.default_value(), Some("localhost"));
        assert_eq!(flag.render(), "example.com");
    }

    #[test]
    fn modifiers() {
        let mut v = false;
        let flag = var(&mut v, "verbose", "VERBOSE", "")
            .required()
            .with_type_hint("switch");
        assert!(flag.is_required());
        assert!(!flag.is_positional());
        assert!(flag.is_bool_flag());
        assert_eq!(flag.type_hint(), "switch");
    }

    #[test]
    fn prefix_keeps_absent_names_absent() {
        let mut a = 0i32;
        let mut b = 0i32;
        let flags = prefix(
            "db-",
            "DB_",
            vec![var(&mut a, "port", "PORT", ""), var(&mut b, "", "POOL", "")],
        );
        assert_eq!(flags[0].name(), Some("db-port"));
        assert_eq!(flags[0].env(), Some("DB_PORT"));
        assert_eq!(flags[1].name(), None);
        assert_eq!(flags[1].env(), Some("DB_POOL"));
    }

    #[test]
    fn repeatable_flag_reports_capabilities() {
        let mut tags: Vec<String> = Vec::new();
        let flag = repeatable(&mut tags, generator::<String>(), "tag", "TAGS", "");
        assert!(flag.is_repeatable());
        assert_eq!(flag.type_hint(), "repeatable string");
    }

    #[test]
    fn missing_error_uses_names() {
        let mut a = 0i32;
        let flag = var(&mut a, "a", "A", "").required();
        assert_eq!(
            flag.missing_error().to_string(),
            "missing command line flag -a or environment variable A"
        );
    }
}
