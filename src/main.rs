use clap::Parser;
use stockcache::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
