use std::io::Write;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use goldrun::check::{audit, print_audit};
use goldrun::cli::{Cli, Commands, RunArgs, SuiteArgs};
use goldrun::fixture::FixtureLocator;
use goldrun::runner::Runner;
use goldrun::subject::ProcessRunner;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .format(|buf, record| writeln!(buf, "[{:<5}] {}", record.level(), record.args()))
        .init();

    match cli.command_or_default() {
        Commands::Run(args) => run(&args),
        Commands::Check(args) => check(&args),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let locator = FixtureLocator::new(&args.suite.base_dir, args.suite.bounds());
    let subject = ProcessRunner::locate(&args.program)?;
    let config = args.config();

    let mut stdout = std::io::stdout().lock();
    let tally = Runner::new(&locator, &subject, &config).run(&mut stdout)?;
    if args.summary {
        writeln!(stdout, "{}", tally.summary())?;
    }
    Ok(())
}

fn check(args: &SuiteArgs) -> Result<()> {
    let locator = FixtureLocator::new(&args.base_dir, args.bounds());
    let audit = audit(&locator)?;
    print_audit(&audit, &mut std::io::stdout().lock())
}
