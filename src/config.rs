use std::io::Write;

use tracing::{debug, info};

use crate::derive::{Fields, struct_to_flags};
use crate::env::EnvSnapshot;
use crate::error::RigError;
use crate::flag::Flag;
use crate::resolve;
use crate::usage::{FlagInfo, render_usage};

/// What [`Config::parse`] does after it reported a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorHandling {
    /// Return the error to the caller.
    #[default]
    Continue,
    /// Exit the process: status 0 for a help request, 2 otherwise.
    Exit,
    /// Panic with the error message.
    Panic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefaultsState {
    Uninitialized,
    Captured,
}

/// Where the environment comes from at parse time.
enum EnvSource {
    Process,
    Snapshot(EnvSnapshot),
    Disabled,
}

/// Resolves a set of [`Flag`]s from the command line and the environment.
///
/// Consuming setters configure the engine:
///
/// ```ignore
/// let mut config = Config::new("server")
///     .flag(flagrig::var(&mut port, "port", "PORT", "listen port").required())
///     .flag(flagrig::var(&mut host, "host", "HOST", "bind address"))
///     .error_handling(ErrorHandling::Exit);
/// config.parse(std::env::args().skip(1))?;
/// ```
///
/// The flags borrow the caller's variables until the config is dropped.
pub struct Config<'a> {
    program: String,
    flags: Vec<Flag<'a>>,
    env: EnvSource,
    error_handling: ErrorHandling,
    output: Box<dyn Write + 'a>,
    usage_extra: Option<String>,
    defaults: DefaultsState,
    args: Vec<String>,
}

impl<'a> Config<'a> {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            flags: Vec::new(),
            env: EnvSource::Process,
            error_handling: ErrorHandling::default(),
            output: Box::new(std::io::stderr()),
            usage_extra: None,
            defaults: DefaultsState::Uninitialized,
            args: Vec::new(),
        }
    }

    /// Append one flag.
    pub fn flag(mut self, flag: Flag<'a>) -> Self {
        self.flags.push(flag);
        self
    }

    /// Append several flags, keeping their order.
    pub fn flags(mut self, flags: impl IntoIterator<Item = Flag<'a>>) -> Self {
        self.flags.extend(flags);
        self
    }

    /// Read the environment from these pairs instead of the process.
    pub fn env_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env = EnvSource::Snapshot(EnvSnapshot::new(vars));
        self
    }

    pub fn env(mut self, snapshot: EnvSnapshot) -> Self {
        self.env = EnvSource::Snapshot(snapshot);
        self
    }

    /// Disable environment lookup entirely.
    pub fn no_env(mut self) -> Self {
        self.env = EnvSource::Disabled;
        self
    }

    pub fn error_handling(mut self, handling: ErrorHandling) -> Self {
        self.error_handling = handling;
        self
    }

    /// Where errors and usage are written. Defaults to stderr.
    pub fn output(mut self, output: impl Write + 'a) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Text appended after the flag list in usage output.
    pub fn usage_extra(mut self, text: &str) -> Self {
        self.usage_extra = Some(text.to_string());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn descriptors(&self) -> &[Flag<'a>] {
        &self.flags
    }

    /// Snapshot every flag's current rendering as its default. Only the
    /// first call has an effect.
    pub fn ensure_defaults_captured(&mut self) {
        if self.defaults == DefaultsState::Captured {
            return;
        }
        for flag in &mut self.flags {
            flag.capture_default();
        }
        self.defaults = DefaultsState::Captured;
    }

    /// Resolve every flag from `args` (without the program name) and the
    /// environment.
    ///
    /// On failure the error and the usage text are written to the output,
    /// then the [`ErrorHandling`] policy applies.
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), RigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_defaults_captured();
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let process_env;
        let env = match &self.env {
            EnvSource::Snapshot(snapshot) => snapshot,
            EnvSource::Process => {
                process_env = EnvSnapshot::from_process();
                &process_env
            }
            EnvSource::Disabled => {
                process_env = EnvSnapshot::default();
                &process_env
            }
        };

        debug!(
            event = "rig.parse.started",
            program = %self.program,
            flags = self.flags.len(),
            args = args.len(),
        );
        match resolve::resolve(&mut self.flags, &args, env) {
            Ok(leftover) => {
                self.args = leftover;
                info!(event = "rig.parse.completed", program = %self.program);
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: RigError) -> Result<(), RigError> {
        debug!(event = "rig.parse.failed", program = %self.program, error = %err);
        if !matches!(err, RigError::HelpRequested) {
            let _ = writeln!(self.output, "{err}");
        }
        self.write_usage();

        match self.error_handling {
            ErrorHandling::Continue => Err(err),
            ErrorHandling::Exit => std::process::exit(err.exit_code()),
            ErrorHandling::Panic => panic!("{err}"),
        }
    }

    /// Usage data for every flag, defaults included.
    pub fn describe(&mut self) -> Vec<FlagInfo> {
        self.ensure_defaults_captured();
        self.flags.iter().map(FlagInfo::from).collect()
    }

    /// The rendered usage text.
    pub fn usage(&mut self) -> String {
        let flags = self.describe();
        render_usage(&self.program, &flags, self.usage_extra.as_deref())
    }

    /// Write the usage text to the configured output.
    pub fn write_usage(&mut self) {
        let text = self.usage();
        let _ = self.output.write_all(text.as_bytes());
        let _ = self.output.flush();
    }

    /// Arguments left after the command-line flags, positional ones included.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn arg(&self, i: usize) -> Option<&str> {
        self.args.get(i).map(String::as_str)
    }
}

impl std::fmt::Debug for Config<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("program", &self.program)
            .field("flags", &self.flags)
            .field("error_handling", &self.error_handling)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Program name and arguments of the running process.
fn process_args() -> (String, Vec<String>) {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_default();
    (program, args.collect())
}

/// Resolve `flags` from the process arguments and environment, exiting the
/// process on failure.
pub fn parse(flags: Vec<Flag<'_>>) -> Result<(), RigError> {
    let (program, args) = process_args();
    Config::new(&program)
        .flags(flags)
        .error_handling(ErrorHandling::Exit)
        .parse(args)
}

/// Derive flags from `target`, append `extra`, and resolve them like
/// [`parse`]. Derivation errors are returned without exiting.
pub fn parse_struct<'a, F: Fields>(target: &'a mut F, extra: Vec<Flag<'a>>) -> Result<(), RigError> {
    let flags = struct_to_flags(target)?;
    let (program, args) = process_args();
    Config::new(&program)
        .flags(flags)
        .flags(extra)
        .error_handling(ErrorHandling::Exit)
        .parse(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{Server, SharedBuf};
    use crate::flag::var;

    #[test]
    fn end_to_end_default_survives() {
        let mut a = 0i64;
        let mut b = String::from("foo");
        {
            let mut config = Config::new("test")
                .flag(var(&mut a, "a", "A", "").required())
                .flag(var(&mut b, "b", "B", ""))
                .no_env()
                .output(std::io::sink());
            config.parse(["-a=5"]).unwrap();
        }
        assert_eq!(a, 5);
        assert_eq!(b, "foo");
    }

    #[test]
    fn end_to_end_missing_required() {
        let mut a = 0i64;
        let mut b = String::from("foo");
        let buf = SharedBuf::default();
        let mut config = Config::new("test")
            .flag(var(&mut a, "a", "A", "").required())
            .flag(var(&mut b, "b", "B", ""))
            .no_env()
            .output(buf.clone());
        let err = config.parse(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, RigError::MissingRequired(_)));
        assert!(err.to_string().contains("-a"));

        let written = buf.contents();
        assert!(written.starts_with("missing command line flag -a or environment variable A\n"));
        assert!(written.contains("Usage of test:"));
    }

    #[test]
    fn env_vars_snapshot_is_used() {
        let mut b = String::from("foo");
        {
            let mut config = Config::new("test")
                .flag(var(&mut b, "b", "B", ""))
                .env_vars([("B", "bar")]);
            config.parse(Vec::<String>::new()).unwrap();
        }
        assert_eq!(b, "bar");
    }

    #[test]
    fn defaults_captured_before_mutation() {
        let mut host = String::from("localhost");
        let mut config = Config::new("test")
            .flag(var(&mut host, "host", "", "bind address"))
            .no_env();
        config.parse(["-host", "example.com"]).unwrap();
        let info = config.describe();
        assert_eq!(info[0].default.as_deref(), Some("localhost"));
        assert!(config.usage().contains("(default \"localhost\")"));
        assert_eq!(config.descriptors()[0].render(), "example.com");
    }

    #[test]
    fn leftover_args_are_exposed() {
        let mut verbose = false;
        let mut config = Config::new("test")
            .flag(var(&mut verbose, "v", "", ""))
            .no_env();
        config.parse(["-v", "one", "-two"]).unwrap();
        assert_eq!(config.args(), ["one", "-two"]);
        assert_eq!(config.arg(1), Some("-two"));
        assert_eq!(config.arg(2), None);
    }

    #[test]
    fn help_writes_usage_only() {
        let buf = SharedBuf::default();
        let mut config = Config::new("tool")
            .no_env()
            .usage_extra("Reads from stdin.")
            .output(buf.clone());
        let err = config.parse(["-help"]).unwrap_err();
        assert_eq!(err.exit_code(), 0);
        assert_eq!(buf.contents(), "Usage of tool:\n\nReads from stdin.\n");
    }

    #[test]
    #[should_panic(expected = "flag provided but not defined: -x")]
    fn panic_policy() {
        let mut config = Config::new("tool")
            .no_env()
            .output(std::io::sink())
            .error_handling(ErrorHandling::Panic);
        let _ = config.parse(["-x"]);
    }

    #[test]
    fn derived_struct_end_to_end() {
        let mut server = Server::default();
        {
            let flags = struct_to_flags(&mut server).unwrap();
            let mut config = Config::new("server")
                .flags(flags)
                .env_vars([("PORT", "8080"), ("DATABASE_URL", "pg://db"), ("API_TOKEN", "t")])
                .output(std::io::sink());
            config
                .parse(["-db-pool-size=20", "-debug", "in.txt", "a", "b"])
                .unwrap();
            assert_eq!(config.args(), ["in.txt", "a", "b"]);
        }
        assert_eq!(server.port, 8080);
        assert!(server.debug);
        assert_eq!(server.database.url.as_deref(), Some("pg://db"));
        assert_eq!(server.database.pool_size, 20);
        assert_eq!(server.token, "t");
        assert_eq!(server.host, "localhost");
        assert_eq!(server.input, "in.txt");
        assert_eq!(server.rest, vec!["a", "b"]);
    }

    #[test]
    fn derived_struct_reports_every_missing_field() {
        let mut server = Server::default();
        let buf = SharedBuf::default();
        let flags = struct_to_flags(&mut server).unwrap();
        let mut config = Config::new("server")
            .flags(flags)
            .no_env()
            .output(buf.clone());
        let err = config.parse(Vec::<String>::new()).unwrap_err();
        let RigError::MissingRequired(missing) = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(missing.len(), 2);
        let written = buf.contents();
        assert!(written.contains("-db-url or environment variable DATABASE_URL"));
        assert!(written.contains("-port or environment variable PORT"));
    }
}
