//! Command-line tokenizer.
//!
//! Accepted syntax, with one or two leading dashes:
//!
//! ```text
//! -name value    -name=value    --name=value
//! -flag          (bool flags only; means true)
//! --             (ends flag parsing)
//! ```
//!
//! Parsing stops at the first token that is not a flag. That token and every
//! token after it are handed back as the leftover arguments.

use std::collections::HashMap;

use tracing::debug;

use crate::error::RigError;
use crate::flag::Flag;

/// Index every non-positional flag by CLI name.
fn index(flags: &[Flag<'_>]) -> Result<HashMap<String, usize>, RigError> {
    let mut names = HashMap::new();
    for (i, flag) in flags.iter().enumerate() {
        if flag.positional {
            continue;
        }
        let Some(name) = flag.name() else {
            continue;
        };
        if names.insert(name.to_string(), i).is_some() {
            return Err(RigError::DuplicateFlag(name.to_string()));
        }
    }
    Ok(names)
}

/// Assign every flag found on the command line and return the leftover
/// arguments. Fails on the first bad token.
pub(crate) fn parse_args(flags: &mut [Flag<'_>], args: &[String]) -> Result<Vec<String>, RigError> {
    let names = index(flags)?;
    let mut rest = args;

    while let Some((token, tail)) = rest.split_first() {
        if token.len() < 2 || !token.starts_with('-') {
            break;
        }
        rest = tail;
        if token == "--" {
            break;
        }

        let body = token.strip_prefix("--").unwrap_or(&token[1..]);
        if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
            return Err(RigError::BadFlagSyntax(token.clone()));
        }

        let skip = body.chars().next().map_or(0, char::len_utf8);
        let (name, inline_value) = match body[skip..].find('=') {
            Some(i) => (&body[..skip + i], Some(&body[skip + i + 1..])),
            None => (body, None),
        };

        let Some(&i) = names.get(name) else {
            if name == "h" || name == "help" {
                return Err(RigError::HelpRequested);
            }
            return Err(RigError::UnknownFlag(name.to_string()));
        };
        let flag = &mut flags[i];

        let value = match inline_value {
            Some(v) => v,
            None if flag.is_bool_flag() => "true",
            None => {
                let Some((next, tail)) = rest.split_first() else {
                    return Err(RigError::MissingArgument(name.to_string()));
                };
                rest = tail;
                next.as_str()
            }
        };

        flag.assign(value)
            .map_err(|source| RigError::InvalidFlagValue {
                flag: name.to_string(),
                value: value.to_string(),
                source,
            })?;
        debug!(event = "rig.cli.assigned", flag = name);
    }

    Ok(rest.to_vec())
}
