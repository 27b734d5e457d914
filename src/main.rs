use std::io;
use std::process;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;

use tforth::{
    repl::{self, ReplError},
    Config, Forth, StackConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "A threaded-code forth REPL", long_about = None)]
struct Args {
    /// Data stack capacity, in slots. Counted from slot 0; the first 11
    /// slots are reserved, so the smallest usable value is 12.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(12..))]
    data_stack: u32,

    /// Return stack capacity, in slots. Counted from slot 0; the first 11
    /// slots are reserved, so the smallest usable value is 12.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(12..))]
    return_stack: u32,

    /// Start without the `push4` and `push8` words.
    #[arg(long)]
    no_prelude: bool,

    /// Comma-separated `tracing` targets and levels, written to stderr.
    #[arg(
        long = "trace",
        default_value_t = tracing_subscriber::filter::Targets::new().with_default(LevelFilter::WARN),
    )]
    trace_filter: tracing_subscriber::filter::Targets,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(args.trace_filter.clone()),
        )
        .init();

    let config = Config {
        data_stack: StackConfig::with_capacity(args.data_stack as usize),
        return_stack: StackConfig::with_capacity(args.return_stack as usize),
        prelude: !args.no_prelude,
    };

    let mut forth = match Forth::new(config) {
        Ok(forth) => forth,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match repl::run(&mut forth, stdin.lock(), &mut stdout) {
        Ok(()) => {}
        Err(ReplError::Forth(e)) => {
            eprintln!("{}", e);
            process::exit(1);
        }
        Err(msg) => {
            eprintln!("Error: {}", msg);
            process::exit(1);
        }
    }
}
