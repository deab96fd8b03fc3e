use thiserror::Error;

/// Failure reported by a [`Value`](crate::Value) adapter or a validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The text could not be parsed into the adapter's type.
    #[error("{0}")]
    Malformed(String),

    /// The text parsed, but a validator rejected the value.
    #[error("{0}")]
    Rejected(String),
}

impl ValueError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ValueError::Malformed(reason.into())
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        ValueError::Rejected(reason.into())
    }
}

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum RigError {
    #[error("invalid value {value:?} for flag -{flag}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::invalid_flag)))]
    InvalidFlagValue {
        flag: String,
        value: String,
        source: ValueError,
    },

    #[error("invalid value {value:?} for env variable {env:?}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::invalid_env)))]
    InvalidEnvValue {
        env: String,
        value: String,
        source: ValueError,
    },

    #[error("invalid value {value:?} for positional argument <{name}>: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::invalid_positional)))]
    InvalidPositionalValue {
        name: String,
        value: String,
        source: ValueError,
    },

    #[error("{}", missing_message(.name, .env))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::missing)))]
    MissingFlag {
        name: Option<String>,
        env: Option<String>,
    },

    #[error("missing positional argument <{name}>{}", env_suffix(.env))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::missing)))]
    MissingPositional { name: String, env: Option<String> },

    #[error("{}", join_lines(.0))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::missing_required)))]
    MissingRequired(#[cfg_attr(feature = "rich-errors", related)] Vec<RigError>),

    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),

    #[error("flag needs an argument: -{0}")]
    MissingArgument(String),

    #[error("bad flag syntax: {0}")]
    BadFlagSyntax(String),

    #[error("flag redefined: {0}")]
    DuplicateFlag(String),

    #[error("help requested")]
    HelpRequested,

    #[error("unexpected positional argument {0:?}")]
    UnexpectedPositional(String),

    #[error("{path}: unknown flag option {option:?}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::derive)))]
    UnknownFlagOption { path: String, option: String },

    #[error("{path}: unknown env option {option:?}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::derive)))]
    UnknownEnvOption { path: String, option: String },

    #[error("{path}: too many env options")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::derive)))]
    TooManyEnvOptions { path: String },

    #[error("{path}: option {option:?} is not supported on a nested struct")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::derive)))]
    UnsupportedNestedOption { path: String, option: String },

    #[error("{path}: unsupported type {type_name}")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(flagrig::unsupported_type),
            help("implement flagrig::Value for the type, or register it on a Registry")
        )
    )]
    UnsupportedType {
        path: String,
        type_name: &'static str,
    },

    #[error("{path}: a repeatable positional argument must be the last positional argument")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(flagrig::positional_order)))]
    RepeatablePositionalNotLast { path: String },
}

fn missing_message(name: &Option<String>, env: &Option<String>) -> String {
    match (name, env) {
        (Some(name), Some(env)) => {
            format!("missing command line flag -{name} or environment variable {env}")
        }
        (Some(name), None) => format!("missing command line flag -{name}"),
        (None, Some(env)) => format!("missing environment variable {env}"),
        (None, None) => {
            "configuration variable doesn't have a flag or environment variable specified".into()
        }
    }
}

fn env_suffix(env: &Option<String>) -> String {
    env.as_ref()
        .map(|env| format!(" or environment variable {env}"))
        .unwrap_or_default()
}

fn join_lines(errors: &[RigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl RigError {
    /// Process exit status used by [`ErrorHandling::Exit`](crate::ErrorHandling::Exit).
    pub fn exit_code(&self) -> i32 {
        match self {
            RigError::HelpRequested => 0,
            _ => 2,
        }
    }
}
