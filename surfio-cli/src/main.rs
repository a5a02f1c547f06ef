use std::io::Write;

use failure::Error;
use log::LevelFilter;
use structopt::StructOpt;

#[macro_use]
mod ui;

mod args;
mod commands;

use crate::args::{Args, Command};


fn main() {
    let args = Args::from_args();
    init_logger(args.verbosity);

    let result = match &args.command {
        Command::Info(args) => commands::info::run(args),
        Command::Convert(args) => commands::convert::run(args),
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}

/// Prints the error with its chain of causes. The backtrace is only shown
/// with `RUST_BACKTRACE=1`.
fn report(e: &Error) {
    error!("{}", e);
    for cause in e.iter_causes() {
        error!("caused by: {}", cause);
    }

    if std::env::var_os("RUST_BACKTRACE").map_or(false, |v| v == "1") {
        error!();
        eprintln!("{}", e.backtrace());
    }
}

/// Library log messages go to stderr. `-v` enables debug, `-vv` trace
/// output; without it, `RUST_LOG` decides (default: warnings).
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => std::env::var("RUST_LOG")
            .ok()
            .and_then(|v| v.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args(),
            )
        })
        .init();
}
