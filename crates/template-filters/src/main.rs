mod cli;
mod config;
mod helpers;

use std::env;
use std::fs;
use std::io::{self, Read as _};

use color_eyre::eyre::{self, WrapErr as _};
use mimalloc::MiMalloc;
use template_filters::registry::FilterRegistry;
use template_filters::value::Value;
use tracing::{Level, event};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use crate::cli::parse_cli;
use crate::config::{Command, Config, Input};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<(), eyre::Report> {
    // set up .env, if it fails, user didn't provide any
    let _r = dotenvy::dotenv();

    color_eyre::config::HookBuilder::default()
        .capture_span_trace_by_default(false)
        .install()?;

    let rust_log_value = env::var(EnvFilter::DEFAULT_ENV)
        .unwrap_or_else(|_| format!("INFO,{}=TRACE", env!("CARGO_PKG_NAME").replace('-', "_")));

    // stdout carries the filtered document, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::builder().parse(rust_log_value)?)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_error::ErrorLayer::default())
        .init();

    let config = parse_cli().map_err(|error| {
        // this prints the error in color and exits
        // can't do anything else until
        // https://github.com/clap-rs/clap/issues/2914
        // is merged in
        if let Some(clap_error) = error.downcast_ref::<clap::error::Error>() {
            clap_error.exit();
        }

        error
    })?;

    config.log();

    run(&config)
}

fn run(config: &Config) -> Result<(), eyre::Report> {
    let registry = FilterRegistry::with_builtin_filters(config.date_options);

    match config.command {
        Command::List => {
            for name in registry.names() {
                println!("{}", name);
            }
        },
        Command::Apply {
            ref filter,
            ref arguments,
        } => {
            let document = read_input(&config.input)?;

            let value = Value::from(
                serde_json::from_str::<serde_json::Value>(&document)
                    .wrap_err_with(|| format!("{} is not valid JSON", config.input))?,
            );

            let filtered = registry
                .apply(filter, &value, arguments)
                .map_err(|error| {
                    wrap_and_report!(Level::ERROR, error, format!("Filter `{}` failed", filter))
                })?;

            let output = serde_json::to_string_pretty(&filtered.to_json()?)?;

            println!("{}", output);

            event!(Level::DEBUG, filter = %filter, "Done");
        },
    }

    Ok(())
}

fn read_input(input: &Input) -> Result<String, eyre::Report> {
    match *input {
        Input::Stdin => {
            let mut document = String::new();

            io::stdin()
                .read_to_string(&mut document)
                .wrap_err("Couldn't read stdin")?;

            Ok(document)
        },
        Input::File(ref path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("Couldn't read {}", path.display())),
    }
}
