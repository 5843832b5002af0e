use std::env;
use std::net::SocketAddr;
use std::process;

use chrono::{Datelike, Utc};
use getopts::Options;

/// Environment variable consulted when `--address` is not given.
pub const ADDRESS_VAR: &str = "COURSE_CALENDAR_ADDR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub address: SocketAddr,
    /// Year given to schedules that carry a `dateRange` but no `year`.
    pub term_year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help(String),
    Run(Args),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        concat!(
            "Socket address (IP and port) to listen on [Default: $COURSE_CALENDAR_ADDR or ",
            "127.0.0.1:8080]"
        ),
        "SOCKET_ADDRESS",
    );
    opts.optopt(
        "y",
        "year",
        "Year for term ranges given without one [Default: current year]",
        "YEAR",
    );
    opts
}

pub fn try_parse(args: Vec<String>, env_address: Option<String>) -> Result<Command, String> {
    let opts = opts();
    let matches = opts.parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Command::Help(
            opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))),
        ));
    }

    let default_address = match env_address {
        Some(value) => value.parse::<SocketAddr>().map_err(|err| {
            format!("Provided value for environment variable '{ADDRESS_VAR}' is invalid: {err}")
        })?,
        None => SocketAddr::from(([127, 0, 0, 1], 8080)),
    };

    let address = matches
        .opt_get_default("address", default_address)
        .map_err(|err| format!("Provided value for option 'address' is invalid: {err}"))?;

    let term_year = matches
        .opt_get_default("year", Utc::now().year())
        .map_err(|err| format!("Provided value for option 'year' is invalid: {err}"))?;

    Ok(Command::Run(Args { address, term_year }))
}

pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args, env::var(ADDRESS_VAR).ok()) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(message) => {
            eprintln!("{message}");
            process::exit(1);
        }
    }
}
