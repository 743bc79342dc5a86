use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use color_eyre::eyre;
use template_filters::date::{DateFormatOptions, NaivePolicy};
use template_filters::value::Value;

use crate::config::{Command, Config, Input};

fn naive_parser(value: &str) -> Result<NaivePolicy, clap::Error> {
    match value {
        "reject" => Ok(NaivePolicy::Reject),
        "utc" => Ok(NaivePolicy::AssumeUtc),
        "local" => Ok(NaivePolicy::Local),
        _ => Err(clap::Error::new(ErrorKind::InvalidValue)),
    }
}

/// Arguments are JSON, anything that isn't valid JSON is taken as a plain string.
fn parse_argument(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw).map_or_else(|_| Value::from(raw), Value::from)
}

#[derive(Debug, Parser)]
#[command(disable_help_flag = true)]
pub struct Cli {
    #[clap(
        short = 'i',
        long = "input",
        help = "JSON document to filter, defaults to stdin"
    )]
    input: Option<PathBuf>,

    #[clap(
        short = 'u',
        long = "utc",
        action = ArgAction::SetTrue,
        help = "Shift datetimes to UTC and render them with a Z suffix"
    )]
    utc: bool,

    #[clap(
        short = 'n',
        long = "naive",
        default_value = "reject",
        help = "How to render datetimes without an offset (reject, utc, local)",
        value_parser = naive_parser
    )]
    naive: NaivePolicy,

    #[clap(
        short = 'l',
        long = "list",
        action = ArgAction::SetTrue,
        help = "List the registered filters and exit",
        conflicts_with = "filter"
    )]
    list: bool,

    #[clap(
        value_name = "FILTER",
        help = "Filter to apply",
        required_unless_present = "list"
    )]
    filter: Option<String>,

    #[clap(
        value_name = "ARGS",
        help = "Filter arguments, as JSON",
        allow_hyphen_values = true
    )]
    arguments: Vec<String>,

    #[clap(
        short = 'h',
        long = "help",
        help = "Print this help message and exit",
        action = ArgAction::Help,
    )]
    help: (),
}

impl From<Cli> for Config {
    fn from(matches: Cli) -> Self {
        let command = if matches.list {
            Command::List
        } else {
            Command::Apply {
                filter: matches.filter.expect("Guaranteed by clap"),
                arguments: matches
                    .arguments
                    .iter()
                    .map(String::as_str)
                    .map(parse_argument)
                    .collect(),
            }
        };

        let input = matches.input.map_or(Input::Stdin, Input::File);

        Config {
            command,
            date_options: DateFormatOptions {
                utc: matches.utc,
                naive: matches.naive,
            },
            input,
        }
    }
}

pub fn parse_cli() -> Result<Config, eyre::Error> {
    parse_cli_from(env::args_os())
}

fn parse_cli_from<I, T>(from: I) -> Result<Config, eyre::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Ok(Cli::try_parse_from(from)?.into())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use color_eyre::eyre;
    use pretty_assertions::assert_eq;
    use template_filters::date::{DateFormatOptions, NaivePolicy};
    use template_filters::value::Value;

    use super::parse_cli_from;
    use crate::config::{Command, Config, Input};

    fn parse_factory(input: &'static str) -> Result<Config, eyre::Report> {
        // fake input
        let command_line = input.split_whitespace().collect::<Vec<&str>>();

        parse_cli_from(command_line)
    }

    fn apply(filter: &str, arguments: Vec<Value>) -> Command {
        Command::Apply {
            filter: filter.into(),
            arguments,
        }
    }

    #[test]
    fn needs_a_filter() {
        let result = parse_factory("template-filters");

        #[expect(unused_must_use, reason = "Testing")]
        result.unwrap_err();
    }

    #[test]
    fn parses_filter_without_arguments() {
        let result = parse_factory("template-filters xml_date");

        let expected_config = Config {
            command: apply("xml_date", Vec::new()),
            date_options: DateFormatOptions::default(),
            input: Input::Stdin,
        };

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), expected_config);
    }

    #[test]
    fn parses_arguments_as_json() {
        let result = parse_factory("template-filters sortby author.name true");

        let expected_config = Config {
            command: apply("sortby", vec![Value::from("author.name"), Value::Bool(true)]),
            date_options: DateFormatOptions::default(),
            input: Input::Stdin,
        };

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), expected_config);
    }

    #[test]
    fn quoted_json_stays_a_string() {
        let result = parse_factory(r#"template-filters sortby "true""#);

        let expected_config = Config {
            command: apply("sortby", vec![Value::from("true")]),
            date_options: DateFormatOptions::default(),
            input: Input::Stdin,
        };

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), expected_config);
    }

    #[test]
    fn parses_input() {
        let result = parse_factory("template-filters --input posts.json sortby title");

        let expected_config = Config {
            command: apply("sortby", vec![Value::from("title")]),
            date_options: DateFormatOptions::default(),
            input: Input::File(PathBuf::from("posts.json")),
        };

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), expected_config);
    }

    #[test]
    fn parses_date_options() {
        let result = parse_factory("template-filters --utc --naive local xml_date");

        let expected_config = Config {
            command: apply("xml_date", Vec::new()),
            date_options: DateFormatOptions {
                utc: true,
                naive: NaivePolicy::Local,
            },
            input: Input::Stdin,
        };

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), expected_config);
    }

    #[test]
    fn rejects_unknown_naive_policy() {
        let result = parse_factory("template-filters --naive never xml_date");

        #[expect(unused_must_use, reason = "Testing")]
        result.unwrap_err();
    }

    #[test]
    fn parses_list() {
        let result = parse_factory("template-filters --list");

        let expected_config = Config {
            command: Command::List,
            date_options: DateFormatOptions::default(),
            input: Input::Stdin,
        };

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), expected_config);
    }

    #[test]
    fn list_and_filter_conflict() {
        let result = parse_factory("template-filters --list sortby");

        #[expect(unused_must_use, reason = "Testing")]
        result.unwrap_err();
    }
}
