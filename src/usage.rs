//! Usage data and its plain-text rendering.
//!
//! [`FlagInfo`] is the serializable description of one flag. Callers that
//! want their own help layout can take the list from
//! [`Config::describe`](crate::Config::describe) and ignore [`render_usage`].

use std::fmt::Write;

use serde::Serialize;

use crate::flag::Flag;

/// Everything usage output needs to know about one flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagInfo {
    pub name: Option<String>,
    pub env: Option<String>,
    pub usage: String,
    pub type_hint: String,
    pub required: bool,
    pub positional: bool,
    pub repeatable: bool,
    /// Rendering of the value before resolution, if captured.
    pub default: Option<String>,
}

impl From<&Flag<'_>> for FlagInfo {
    fn from(flag: &Flag<'_>) -> Self {
        Self {
            name: flag.name.clone(),
            env: flag.env.clone(),
            usage: flag.usage.clone(),
            type_hint: flag.type_hint.clone(),
            required: flag.required,
            positional: flag.positional,
            repeatable: flag.is_repeatable(),
            default: flag.default.clone(),
        }
    }
}

impl FlagInfo {
    /// Source syntax, e.g. `-port value, PORT=value` or `<files>...`.
    fn synopsis(&self) -> Option<String> {
        if self.positional {
            let name = self.name.as_deref().or(self.env.as_deref()).unwrap_or("arg");
            let dots = if self.repeatable { "..." } else { "" };
            return Some(match &self.env {
                Some(env) => format!("<{name}>{dots}, {env}=value"),
                None => format!("<{name}>{dots}"),
            });
        }
        match (&self.name, &self.env) {
            (Some(name), Some(env)) => Some(format!("-{name} value, {env}=value")),
            (Some(name), None) => Some(format!("-{name} value")),
            (None, Some(env)) => Some(format!("{env}=value")),
            (None, None) => None,
        }
    }

    fn annotations(&self) -> Vec<&str> {
        let mut notes = Vec::new();
        if !self.type_hint.is_empty() {
            notes.push(self.type_hint.as_str());
        }
        if self.required {
            notes.push("required");
        }
        notes
    }

    /// The default worth showing: non-empty and not on a required flag.
    fn shown_default(&self) -> Option<&str> {
        self.default
            .as_deref()
            .filter(|d| !d.is_empty() && *d != "[]" && !self.required)
    }
}

/// Render the usage text for `program`.
///
/// ```text
/// Usage of server:
///   -port value, PORT=value (integer, required)
///         listen port
///   -host value, HOST=value (string)
///         bind address (default "localhost")
/// ```
pub fn render_usage(program: &str, flags: &[FlagInfo], extra: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Usage of {program}:");

    for info in flags {
        let Some(synopsis) = info.synopsis() else {
            continue;
        };
        let _ = write!(out, "  {synopsis}");
        let notes = info.annotations();
        if !notes.is_empty() {
            let _ = write!(out, " ({})", notes.join(", "));
        }
        out.push('\n');

        match (info.usage.is_empty(), info.shown_default()) {
            (false, Some(default)) => {
                let _ = writeln!(out, "        {} (default {default:?})", info.usage);
            }
            (false, None) => {
                let _ = writeln!(out, "        {}", info.usage);
            }
            (true, Some(default)) => {
                let _ = writeln!(out, "        (default {default:?})");
            }
            (true, None) => {}
        }
    }

    if let Some(extra) = extra {
        out.push('\n');
        out.push_str(extra);
        if !extra.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
