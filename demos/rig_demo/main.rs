//! A small server launcher configured from flags and environment variables.
//!
//! ```text
//! RIG_DEMO_LOG=debug cargo run --example rig_demo -- -port 9000 -upstream https://a.example,https://b.example notes.txt
//! ```

use std::process::ExitCode;
use std::time::Duration;

use flagrig::{
    ErrorHandling, FieldSet, Fields, Flag, ScalarValue, Value, ValueError, validators,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Level {
    #[default]
    Info,
    Debug,
}

impl Value for Level {
    fn render(&self) -> String {
        match self {
            Level::Info => "info".into(),
            Level::Debug => "debug".into(),
        }
    }

    fn parse(&mut self, input: &str) -> Result<(), ValueError> {
        *self = match input {
            "info" => Level::Info,
            "debug" => Level::Debug,
            other => return Err(ValueError::malformed(format!("unknown level {other:?}"))),
        };
        Ok(())
    }

    fn type_hint(&self) -> String {
        "info|debug".into()
    }
}

#[derive(Debug)]
struct Limits {
    timeout: Duration,
    retries: u32,
}

impl Fields for Limits {
    fn fields<'a>(&'a mut self, set: &mut FieldSet<'a>) {
        set.field("timeout", &mut self.timeout)
            .usage("upstream request timeout");
        set.value(
            "retries",
            ScalarValue::new(&mut self.retries).validate(validators::max(10)),
        )
        .usage("attempts per request");
    }
}

#[derive(Debug)]
struct Settings {
    port: u16,
    upstream: Vec<Url>,
    level: Level,
    limits: Limits,
    files: Vec<String>,
}

impl Fields for Settings {
    fn fields<'a>(&'a mut self, set: &mut FieldSet<'a>) {
        set.field("port", &mut self.port)
            .flag(",require")
            .usage("port to listen on");
        set.field("upstream", &mut self.upstream)
            .usage("upstream servers, comma separated");
        set.value("level", &mut self.level).usage("log level of the proxy");
        set.nested("limits", &mut self.limits);
        set.field("files", &mut self.files)
            .positional()
            .env("-")
            .usage("files to serve");
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(EnvFilter::from_env("RIG_DEMO_LOG"))
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let mut settings = Settings {
        port: 0,
        upstream: Vec::new(),
        level: Level::default(),
        limits: Limits {
            timeout: Duration::from_secs(30),
            retries: 3,
        },
        files: Vec::new(),
    };
    let mut name = String::from("rig-demo");

    let flags = match flagrig::struct_to_flags(&mut settings) {
        Ok(flags) => flags,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let display_name = ScalarValue::new(&mut name).validate(validators::exclude_chars(" \t"));

    let program = std::env::args().next().unwrap_or_else(|| "rig_demo".into());
    let mut config = flagrig::Config::new(&program)
        .flags(flags)
        .flag(Flag::new(display_name, "name", "RIG_DEMO_NAME", "instance name"))
        .usage_extra("Files are served from the working directory.")
        .error_handling(ErrorHandling::Exit);
    if config.parse(std::env::args().skip(1)).is_err() {
        return ExitCode::from(2);
    }
    drop(config);

    println!("{name} listening on :{}", settings.port);
    for upstream in &settings.upstream {
        println!("  upstream {upstream}");
    }
    println!(
        "  level {}, timeout {:?}, {} retries",
        settings.level.render(),
        settings.limits.timeout,
        settings.limits.retries
    );
    for file in &settings.files {
        println!("  serving {file}");
    }
    ExitCode::SUCCESS
}
