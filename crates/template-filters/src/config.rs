use std::path::PathBuf;

use template_filters::date::DateFormatOptions;
use template_filters::value::Value;
use tracing::{Level, event};

#[derive(Debug, PartialEq)]
pub struct Config {
    pub command: Command,
    pub date_options: DateFormatOptions,
    pub input: Input,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    List,
    Apply { filter: String, arguments: Vec<Value> },
}

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Input::Stdin => write!(f, "stdin"),
            Input::File(ref path) => write!(f, "{}", path.display()),
        }
    }
}

impl Config {
    pub fn log(&self) {
        match self.command {
            Command::List => event!(Level::INFO, "Command: list"),
            Command::Apply {
                ref filter,
                ref arguments,
            } => {
                event!(Level::INFO, "Filter: {}", filter);
                event!(Level::INFO, "Arguments: {}", arguments.len());
            },
        }

        event!(Level::INFO, "Input: {}", self.input);
        event!(Level::INFO, "Utc: {}", self.date_options.utc);
        event!(Level::INFO, "Naive: {}", self.date_options.naive);
    }
}
