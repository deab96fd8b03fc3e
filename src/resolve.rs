//! Core resolution pipeline: assign every flag from the configured sources.
//!
//! Operates on pre-loaded data (argument list and [`EnvSnapshot`]) with no
//! I/O, making the full pipeline testable with synthetic inputs. Steps:
//!
//! 1. Reject positional layouts that cannot be satisfied
//! 2. Command-line flags (fail fast)
//! 3. Environment variables, for flags still unset
//! 4. Leftover arguments onto positional flags, in order
//! 5. Required check, reporting every missing flag at once
//!
//! The positional pass runs last, so a positional argument overwrites a
//! value taken from the environment, and a repeatable positional appends
//! its arguments after the environment's elements.

use tracing::{debug, warn};

use crate::env::EnvSnapshot;
use crate::error::RigError;
use crate::flag::Flag;
use crate::flagset;

/// A repeatable positional flag swallows every remaining argument, so it must
/// be the last positional flag.
pub(crate) fn check_positionals(flags: &[Flag<'_>]) -> Result<(), RigError> {
    let mut positionals = flags.iter().filter(|f| f.positional).peekable();
    while let Some(flag) = positionals.next() {
        if flag.is_repeatable() && positionals.peek().is_some() {
            return Err(RigError::RepeatablePositionalNotLast {
                path: flag.label().to_string(),
            });
        }
    }
    Ok(())
}

/// Without positional flags the leftovers are left to the caller.
fn assign_positionals(flags: &mut [Flag<'_>], leftover: &[String]) -> Result<(), RigError> {
    if !flags.iter().any(|f| f.positional) {
        return Ok(());
    }
    let mut tokens = leftover.iter();

    for flag in flags.iter_mut().filter(|f| f.positional) {
        let take = if flag.is_repeatable() { usize::MAX } else { 1 };
        for token in tokens.by_ref().take(take) {
            flag.assign(token)
                .map_err(|source| RigError::InvalidPositionalValue {
                    name: flag.label().to_string(),
                    value: token.clone(),
                    source,
                })?;
            debug!(event = "rig.positional.assigned", name = flag.label());
        }
    }

    match tokens.next() {
        Some(extra) => Err(RigError::UnexpectedPositional(extra.clone())),
        None => Ok(()),
    }
}

fn apply_env(flags: &mut [Flag<'_>], env: &EnvSnapshot) -> Result<(), RigError> {
    for flag in flags.iter_mut() {
        if flag.set {
            continue;
        }
        let Some(var) = flag.env.clone() else {
            continue;
        };
        let Some(value) = env.effective(&var) else {
            continue;
        };
        flag.assign(value).map_err(|source| RigError::InvalidEnvValue {
            env: var.clone(),
            value: value.to_string(),
            source,
        })?;
        debug!(event = "rig.env.assigned", env = %var);
    }
    Ok(())
}

fn check_required(flags: &[Flag<'_>]) -> Result<(), RigError> {
    let missing: Vec<RigError> = flags
        .iter()
        .filter(|f| f.required && !f.set)
        .map(Flag::missing_error)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RigError::MissingRequired(missing))
    }
}

/// Resolve `flags` from `args` and `env`. Returns the arguments left over
/// after the command-line flags.
pub(crate) fn resolve(
    flags: &mut [Flag<'_>],
    args: &[String],
    env: &EnvSnapshot,
) -> Result<Vec<String>, RigError> {
    for flag in flags.iter() {
        if flag.name.is_none() && flag.env.is_none() && !flag.positional {
            warn!(
                event = "rig.resolve.unreachable",
                usage = %flag.usage,
                "flag has neither a command line name nor an environment variable"
            );
        }
    }

    check_positionals(flags)?;
    let leftover = flagset::parse_args(flags, args)?;
    apply_env(flags, env)?;
    assign_positionals(flags, &leftover)?;
    check_required(flags)?;

    Ok(leftover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{args, vars};
    use crate::flag::{repeatable, var};
    use crate::repeatable::generator;

    #[test]
    fn env_applies_when_cli_is_silent() {
        let mut port = 80u16;
        let mut flags = vec![var(&mut port, "port", "PORT", "")];
        resolve(&mut flags, &[], &vars(&[("PORT", "8080")])).unwrap();
        drop(flags);
        assert_eq!(port, 8080);
    }

    #[test]
    fn cli_beats_env() {
        let mut x = 0i32;
        let mut flags = vec![var(&mut x, "x", "X", "")];
        resolve(&mut flags, &args(&["-x=1"]), &vars(&[("X", "2")])).unwrap();
        drop(flags);
        assert_eq!(x, 1);
    }

    #[test]
    fn empty_env_is_ignored() {
        let mut host = String::from("localhost");
        let mut flags = vec![var(&mut host, "", "HOST", "").required()];
        let err = resolve(&mut flags, &[], &vars(&[("HOST", "")])).unwrap_err();
        assert!(matches!(err, RigError::MissingRequired(ref m) if m.len() == 1));
        drop(flags);
        assert_eq!(host, "localhost");
    }

    #[test]
    fn env_only_flag() {
        let mut token = String::new();
        let mut flags = vec![var(&mut token, "", "TOKEN", "")];
        resolve(&mut flags, &[], &vars(&[("TOKEN", "s3cr3t")])).unwrap();
        assert!(flags[0].is_set());
        drop(flags);
        assert_eq!(token, "s3cr3t");
    }

    #[test]
    fn env_error_names_variable() {
        let mut port = 0u16;
        let mut flags = vec![var(&mut port, "port", "PORT", "")];
        let err = resolve(&mut flags, &[], &vars(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, RigError::InvalidEnvValue { ref env, .. } if env == "PORT"));
        assert!(err.to_string().contains("\"PORT\""));
    }

    #[test]
    fn env_repeatable_uses_comma_splitting() {
        let mut tags: Vec<String> = Vec::new();
        let mut flags = vec![repeatable(&mut tags, generator::<String>(), "tag", "TAGS", "")];
        resolve(&mut flags, &[], &vars(&[("TAGS", r"a,b\,c")])).unwrap();
        drop(flags);
        assert_eq!(tags, vec!["a", "b,c"]);
    }

    #[test]
    fn all_missing_required_are_reported() {
        let mut a = 0i32;
        let mut b = String::new();
        let mut c = false;
        let mut flags = vec![
            var(&mut a, "a", "A", "").required(),
            var(&mut b, "b", "", "").required(),
            var(&mut c, "c", "", ""),
        ];
        let err = resolve(&mut flags, &[], &EnvSnapshot::default()).unwrap_err();
        let RigError::MissingRequired(missing) = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(missing.len(), 2);
        let msg = err.to_string();
        assert!(msg.contains("-a or environment variable A"));
        assert!(msg.contains("-b"));
    }

    #[test]
    fn unreachable_required_flag_is_missing() {
        let mut x = 0i32;
        let mut flags = vec![var(&mut x, "", "", "").required()];
        let err = resolve(&mut flags, &[], &EnvSnapshot::default()).unwrap_err();
        assert!(err.to_string().contains("doesn't have a flag"));
    }

    #[test]
    fn positionals_in_order() {
        let mut src = String::new();
        let mut dst = String::new();
        let mut force = false;
        let mut flags = vec![
            var(&mut force, "f", "", ""),
            var(&mut src, "src", "", "").positional(),
            var(&mut dst, "dst", "", "").positional(),
        ];
        let rest = resolve(&mut flags, &args(&["-f", "a.txt", "b.txt"]), &EnvSnapshot::default())
            .unwrap();
        assert_eq!(rest, args(&["a.txt", "b.txt"]));
        drop(flags);
        assert!(force);
        assert_eq!(src, "a.txt");
        assert_eq!(dst, "b.txt");
    }

    #[test]
    fn repeatable_positional_takes_the_rest() {
        let mut cmd = String::new();
        let mut files: Vec<String> = Vec::new();
        let mut flags = vec![
            var(&mut cmd, "cmd", "", "").positional(),
            repeatable(&mut files, generator::<String>(), "files", "", "").positional(),
        ];
        resolve(&mut flags, &args(&["cat", "a", "b,c"]), &EnvSnapshot::default()).unwrap();
        drop(flags);
        assert_eq!(cmd, "cat");
        assert_eq!(files, vec!["a", "b", "c"]);
    }

    #[test]
    fn surplus_positional_is_an_error() {
        let mut one = String::new();
        let mut flags = vec![var(&mut one, "one", "", "").positional()];
        let err = resolve(&mut flags, &args(&["x", "y"]), &EnvSnapshot::default()).unwrap_err();
        assert!(matches!(err, RigError::UnexpectedPositional(ref t) if t == "y"));
    }

    #[test]
    fn missing_positional_is_a_required_error() {
        let mut one = String::new();
        let mut flags = vec![var(&mut one, "one", "", "").positional().required()];
        let err = resolve(&mut flags, &[], &EnvSnapshot::default()).unwrap_err();
        assert_eq!(err.to_string(), "missing positional argument <one>");
    }

    #[test]
    fn leftovers_without_positionals_are_kept() {
        let mut v = false;
        let mut flags = vec![var(&mut v, "v", "", "")];
        let rest = resolve(&mut flags, &args(&["-v", "x", "y"]), &EnvSnapshot::default()).unwrap();
        assert_eq!(rest, args(&["x", "y"]));
    }

    #[test]
    fn positional_overwrites_env() {
        let mut input = String::new();
        let mut flags = vec![var(&mut input, "input", "INPUT", "").positional()];
        resolve(&mut flags, &args(&["cli.txt"]), &vars(&[("INPUT", "env.txt")])).unwrap();
        drop(flags);
        assert_eq!(input, "cli.txt");
    }

    #[test]
    fn repeatable_positional_appends_after_env() {
        let mut files: Vec<String> = Vec::new();
        let mut flags =
            vec![repeatable(&mut files, generator::<String>(), "files", "FILES", "").positional()];
        resolve(&mut flags, &args(&["c"]), &vars(&[("FILES", "a,b")])).unwrap();
        drop(flags);
        assert_eq!(files, vec!["a", "b", "c"]);
    }

    #[test]
    fn malformed_env_fails_even_with_positional_argument() {
        let mut n = 0u16;
        let mut flags = vec![var(&mut n, "n", "N", "").positional()];
        let err = resolve(&mut flags, &args(&["5"]), &vars(&[("N", "bogus")])).unwrap_err();
        assert!(matches!(err, RigError::InvalidEnvValue { ref env, .. } if env == "N"));
        drop(flags);
        assert_eq!(n, 0);
    }

    #[test]
    fn positional_falls_back_to_env() {
        let mut input = String::new();
        let mut flags = vec![var(&mut input, "input", "INPUT", "").positional()];
        resolve(&mut flags, &[], &vars(&[("INPUT", "env.txt")])).unwrap();
        drop(flags);
        assert_eq!(input, "env.txt");
    }

    #[test]
    fn misplaced_repeatable_positional_rejected_at_parse() {
        let mut files: Vec<String> = Vec::new();
        let mut out = String::new();
        let mut flags = vec![
            repeatable(&mut files, generator::<String>(), "files", "", "").positional(),
            var(&mut out, "out", "", "").positional(),
        ];
        let err = resolve(&mut flags, &args(&["a", "b"]), &EnvSnapshot::default()).unwrap_err();
        assert!(matches!(err, RigError::RepeatablePositionalNotLast { ref path } if path == "files"));
        assert!(!flags[0].is_set());
    }

    #[test]
    fn cli_error_stops_before_env() {
        let mut a = 0i32;
        let mut b = 0i32;
        let mut flags = vec![var(&mut a, "a", "", ""), var(&mut b, "b", "B", "")];
        assert!(resolve(&mut flags, &args(&["-a=x"]), &vars(&[("B", "3")])).is_err());
        drop(flags);
        assert_eq!(b, 0);
    }
}
