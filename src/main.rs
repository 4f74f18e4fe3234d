mod args;
mod feedback;

use clap::Parser;
use env_logger::Env;
use log::{debug, LevelFilter};
use std::error::Error;

use crate::args::{Args, Command};
use crate::feedback::FeedbackResult;

fn run(args: Args) -> FeedbackResult<()> {
    match args.command {
        Command::Summary {
            sources,
            out,
            reference,
        } => feedback::run_summary(&sources, out, reference).map(|_| ()),
        Command::Export {
            sources,
            out,
            numbered_headers,
        } => feedback::run_export(&sources, out, numbered_headers).map(|_| ()),
        Command::Submit { sources, input } => {
            feedback::run_submit(&sources, &input).map(|_| ())
        }
        Command::Check { sources } => feedback::run_check(&sources).map(|_| ()),
    }
}

fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();
    debug!("args: {:?}", args);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}
