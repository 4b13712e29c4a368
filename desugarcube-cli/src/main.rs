//! Command-line interface for desugarcube
//! Converts a Twine/SugarCube HTML export into a JSON description of the story graph.
//!
//! Usage:
//!   desugarcube `<path>`                       - Write `<stem>.json` next to the export
//!   desugarcube `<path>` --output `<file>`     - Write the JSON to another file
//!   desugarcube `<path>` --stdout              - Print the JSON instead of writing it
//!
//! Configuration is layered: built-in defaults, then `desugarcube.toml` in the working
//! directory, then `--config <file>`, then flags.

mod output;

use clap::{Arg, ArgAction, ArgMatches, Command};
use desugarcube_config::{DesugarcubeConfig, Loader, LOCAL_CONFIG_FILE};
use desugarcube_parser::{parse_story_with, to_json, ConvertError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

fn command() -> Command {
    Command::new("desugarcube")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert a Twine/SugarCube HTML export into story JSON")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the story export (.html)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output file (default: the export path with a .json extension)")
                .conflicts_with("stdout"),
        )
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .help("Print the JSON to stdout instead of writing a file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Indent the JSON output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log progress to stderr (repeat for more detail)")
                .action(ArgAction::Count),
        )
}

fn main() {
    let matches = command().get_matches();
    init_logging(matches.get_count("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the verbosity flag.
fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "desugarcube=warn",
        1 => "desugarcube=info",
        _ => "desugarcube=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<DesugarcubeConfig, CliError> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if matches.get_flag("pretty") {
        loader = loader.set_override("output.pretty", true)?;
    }
    Ok(loader.build()?)
}

fn run(matches: &ArgMatches) -> Result<(), CliError> {
    let config = load_config(matches)?;
    debug!(?config, "configuration loaded");

    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    let source = output::ensure_file(path)?;

    let html = output::read_source(&source)?;
    let story = parse_story_with(&html, &config.parse)?;
    let json = to_json(&story, config.output.pretty)?;

    if matches.get_flag("stdout") {
        println!("{}", json);
        return Ok(());
    }

    let target = match matches.get_one::<String>("output") {
        Some(output) => PathBuf::from(output),
        None => output::json_path_for(&source, &config.output.extension),
    };
    output::write_replacing(&target, &json)?;
    report(&source, &target, story.passages.len());
    Ok(())
}

fn report(source: &Path, target: &Path, passages: usize) {
    info!(
        source = %source.display(),
        target = %target.display(),
        passages,
        "story converted"
    );
}
