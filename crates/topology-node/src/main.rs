use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::exit;
use std::str::FromStr;
use std::time;

use thiserror::Error;

use topology::config::{self, Config};
use topology::store::{self, Database};
use topology::Registry;
use topology_node::{runtime, Runtime, VERSION};

const HELP_MSG: &str = r#"
Usage

   topology-node --instance <id> [<option>...]

   Reads topology announcements from stdin, one JSON document per line, and
   answers each with a JSON status line on stdout. Expired announcements are
   swept periodically.

Options

    --instance        <id>      Identifier of the local instance
    --config          <path>    Config file to use (default: built-in defaults)
    --db              <path>    Announcement database (default: in-memory)
    --sweep-interval  <secs>    Time between two expiry checks
                                  (default: the connector ping interval)
    --log-level       <level>   Set log level (default: info)
    --version                   Print program version
    --help                      Print help
"#;

/// Default log level, until options are parsed.
const LOG_LEVEL_DEFAULT: log::Level = log::Level::Info;

struct Options {
    instance: String,
    config: Option<PathBuf>,
    db: Option<PathBuf>,
    sweep_interval: Option<u64>,
    log_level: Option<log::Level>,
}

fn parse_options() -> Result<Options, lexopt::Error> {
    use lexopt::prelude::*;

    let mut parser = lexopt::Parser::from_env();
    let mut instance = None;
    let mut config = None;
    let mut db = None;
    let mut sweep_interval = None;
    let mut log_level = None;

    while let Some(arg) = parser.next()? {
        match arg {
            Long("instance") => {
                instance = Some(parser.value()?.string()?);
            }
            Long("config") => {
                config = Some(parser.value()?.parse_with(PathBuf::from_str)?);
            }
            Long("db") => {
                db = Some(parser.value()?.parse_with(PathBuf::from_str)?);
            }
            Long("sweep-interval") => {
                sweep_interval = Some(parser.value()?.parse()?);
            }
            Long("log-level") => {
                log_level = Some(parser.value()?.parse_with(log::Level::from_str)?);
            }
            Long("help") | Short('h') => {
                println!("{HELP_MSG}");
                exit(0);
            }
            Long("version") => {
                println!("topology-node {VERSION}");
                exit(0);
            }
            _ => {
                return Err(arg.unexpected());
            }
        }
    }

    Ok(Options {
        instance: instance.ok_or("missing required option '--instance'")?,
        config,
        db,
        sweep_interval,
        log_level,
    })
}

#[derive(Error, Debug)]
enum ExecutionError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    ConfigurationLoading(#[from] config::LoadError),
    #[error("failed to open database: {0}")]
    Database(#[from] store::Error),
    #[error(transparent)]
    Runtime(#[from] runtime::Error),
}

fn execute(options: Options) -> Result<(), ExecutionError> {
    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let sweep_interval = time::Duration::from_secs(
        options
            .sweep_interval
            .unwrap_or(config.connector_ping_interval)
            .max(1),
    );

    log::info!(target: "node", "Starting node {VERSION} for instance {}..", options.instance);
    log::info!(
        target: "node",
        "Ping timeout {}s, interval {}s, backoff factor {}",
        config.connector_ping_timeout,
        config.connector_ping_interval,
        config.backoff_stable_factor
    );

    let db = match &options.db {
        Some(path) => {
            log::info!(target: "node", "Opening announcement database at {}..", path.display());
            Database::open(path)?
        }
        None => Database::memory()?,
    };
    let registry = Registry::new(options.instance, config, db);
    let runtime = Runtime::init(registry, sweep_interval)?;

    runtime.serve(io::stdin().lock(), io::stdout().lock())?;
    runtime.shutdown()?;

    log::info!(target: "node", "Input closed, exiting..");

    Ok(())
}

fn initialize_logging(level: Option<log::Level>) -> Result<(), log::SetLoggerError> {
    let level = level
        .or_else(topology::logger::env_level)
        .unwrap_or(LOG_LEVEL_DEFAULT);

    // Responses are written to stdout, so logs go to stderr.
    if io::stderr().is_terminal() {
        log::set_boxed_logger(Box::new(topology::logger::Logger::new(level)))?;
    } else {
        log::set_boxed_logger(Box::new(topology::logger::StderrLogger::new(level)))?;
    }
    log::set_max_level(level.to_level_filter());

    Ok(())
}

fn main() {
    let options = parse_options().unwrap_or_else(|err| {
        // The lexopt errors read nicely with a comma.
        eprintln!("Failed to parse options, {err:#}");
        exit(2);
    });

    initialize_logging(options.log_level).unwrap_or_else(|err| {
        eprintln!("Failed to initialize logging: {err:#}");
        exit(3);
    });

    if let Err(err) = execute(options) {
        log::error!(target: "node", "{err:#}");
        exit(1);
    }
}
