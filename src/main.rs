use std::path::Path;

use clap::{Arg, ArgAction, Command};
use owo_colors::OwoColorize;
use tracing::{debug, Level};

use taxonkeys::language::History;
use taxonkeys::parsing;

const DEFAULT_WORK: &str = "B1";

fn main() {
    const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

    let matches = Command::new("taxonkeys")
        .version(VERSION)
        .propagate_version(true)
        .about("Parse indented taxonomic identification keys.")
        .disable_help_subcommand(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log what the parser is doing to standard error."),
        )
        .subcommand(
            Command::new("check")
                .about("Validate the given key files")
                .arg(
                    Arg::new("filenames")
                        .required(true)
                        .num_args(1..)
                        .help("The files containing the keys you want to check."),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a key file and print its resources as YAML")
                .arg(
                    Arg::new("previous")
                        .long("previous")
                        .value_name("FILE")
                        .help("The previous revision of the file. Taxa on lines that are still there keep their identifiers."),
                )
                .arg(
                    Arg::new("ids")
                        .long("ids")
                        .value_name("FILE")
                        .requires("previous")
                        .help("The identifiers given out for the previous revision, one line per resource, numbers separated by commas or spaces. Without this the previous revision is numbered afresh."),
                )
                .arg(
                    Arg::new("work")
                        .long("work")
                        .value_name("ID")
                        .default_value(DEFAULT_WORK)
                        .help("The catalog identifier of the work the keys were published in."),
                )
                .arg(
                    Arg::new("filename")
                        .required(true)
                        .help("The file containing the keys you want to parse."),
                ),
        )
        .get_matches();

    let level = if matches.get_flag("debug") {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match matches.subcommand() {
        Some(("check", submatches)) => {
            let mut failed = false;
            for filename in submatches
                .get_many::<String>("filenames")
                .into_iter()
                .flatten()
            {
                if !check(Path::new(filename)) {
                    failed = true;
                }
            }
            if failed {
                std::process::exit(1);
            }
        }
        Some(("parse", submatches)) => {
            let work = submatches
                .get_one::<String>("work")
                .map(String::as_str)
                .unwrap_or(DEFAULT_WORK);

            let history = match submatches.get_one::<String>("previous") {
                Some(previous) => {
                    let ids = submatches
                        .get_one::<String>("ids")
                        .map(Path::new);
                    Some(history(Path::new(previous), ids, work))
                }
                None => None,
            };

            if let Some(filename) = submatches.get_one::<String>("filename") {
                parse(Path::new(filename), work, history.as_ref());
            }
        }
        Some(_) => {
            println!("No valid subcommand was used")
        }
        None => {
            println!("usage: taxonkeys [COMMAND] ...");
            println!("Try '--help' for more information.");
        }
    }
}

fn read(filename: &Path) -> String {
    match parsing::load(filename) {
        Ok(content) => content,
        Err(error) => {
            eprintln!("{}: {}", "error".bright_red(), error);
            std::process::exit(1);
        }
    }
}

fn check(filename: &Path) -> bool {
    let content = match parsing::load(filename) {
        Ok(content) => content,
        Err(error) => {
            eprintln!("{}: {}", "error".bright_red(), error);
            return false;
        }
    };

    match parsing::parse_file(&content, DEFAULT_WORK, None) {
        Ok(resources) => {
            debug!(
                "{}: {} resource{}",
                filename.display(),
                resources.len(),
                if resources.len() == 1 { "" } else { "s" }
            );
            true
        }
        Err(failure) => {
            eprintln!("{}\n", failure.full_details(filename));
            false
        }
    }
}

/// Load the previous revision, either with the identifiers recorded for it
/// or by numbering it from scratch.
fn history(previous: &Path, ids: Option<&Path>, work: &str) -> History {
    let text = read(previous);

    match ids {
        Some(filename) => {
            let content = read(filename);
            match read_ids(&content) {
                Ok(ids) => History::new(text, ids),
                Err(error) => {
                    eprintln!(
                        "{}: {}: {}",
                        "error".bright_red(),
                        filename.display(),
                        error
                    );
                    std::process::exit(1);
                }
            }
        }
        None => match parsing::parse_file(&text, work, None) {
            Ok(resources) => History::from_resources(text, &resources),
            Err(failure) => {
                eprintln!("{}", failure.full_details(previous));
                std::process::exit(1);
            }
        },
    }
}

fn read_ids(content: &str) -> Result<Vec<Vec<u32>>, std::num::ParseIntError> {
    content
        .lines()
        .map(|line| {
            line.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|number| !number.is_empty())
                .map(str::parse)
                .collect()
        })
        .collect()
}

fn parse(filename: &Path, work: &str, history: Option<&History>) {
    let content = read(filename);

    let resources = match parsing::parse_file(&content, work, history) {
        Ok(resources) => resources,
        Err(failure) => {
            eprintln!("{}", failure.full_details(filename));
            std::process::exit(1);
        }
    };

    match serde_yaml::to_string(&resources) {
        Ok(yaml) => print!("{}", yaml),
        Err(error) => {
            eprintln!("{}: {}", "error".bright_red(), error);
            std::process::exit(1);
        }
    }
}
