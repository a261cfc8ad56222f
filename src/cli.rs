use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::compare::CompareOptions;
use crate::fixture::{Bounds, DEFAULT_BASE_DIR, DEFAULT_CASES, DEFAULT_GROUPS};
use crate::runner::RunConfig;

pub const DEFAULT_PROGRAM: &str = "./cmake-build-debug/simple_lang";

#[derive(Parser, Debug)]
#[command(author, version, about = "golden-file regression driver", long_about = None)]
pub struct Cli {
    /// Log staging, invocations and comparisons to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every test point against the subject program (default)
    Run(RunArgs),
    /// List missing fixtures and files outside the configured bounds
    Check(SuiteArgs),
}

impl Cli {
    pub fn command_or_default(self) -> Commands {
        self.command
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SuiteArgs {
    /// Fixture root holding one directory per group
    #[arg(long, default_value = DEFAULT_BASE_DIR)]
    pub base_dir: PathBuf,
    /// Highest group number; groups run from 1
    #[arg(long, default_value_t = DEFAULT_GROUPS)]
    pub groups: u32,
    /// Highest case number in every group; cases run from 1
    #[arg(long, default_value_t = DEFAULT_CASES)]
    pub cases: u32,
}

impl Default for SuiteArgs {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            groups: DEFAULT_GROUPS,
            cases: DEFAULT_CASES,
        }
    }
}

impl SuiteArgs {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            groups: self.groups,
            cases: self.cases,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,
    /// Program under test; reads testfile.txt and writes output.txt in its working directory
    #[arg(short, long, default_value = DEFAULT_PROGRAM)]
    pub program: PathBuf,
    /// Working area shared by all test points
    #[arg(short, long, default_value = ".")]
    pub workdir: PathBuf,
    /// Run every test point in its own temporary directory
    #[arg(long, default_value_t = false)]
    pub isolate: bool,
    /// Report a test point that cannot be run or compared and carry on
    #[arg(short, long, default_value_t = false)]
    pub keep_going: bool,
    /// Also compare line by line when the line counts differ
    #[arg(long, default_value_t = false)]
    pub detail_on_length_mismatch: bool,
    /// Mention it when the subject program fails, crashes or cannot be started
    #[arg(long, default_value_t = false)]
    pub check_status: bool,
    /// Print the number of passed test points at the end
    #[arg(short, long, default_value_t = false)]
    pub summary: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            suite: SuiteArgs::default(),
            program: PathBuf::from(DEFAULT_PROGRAM),
            workdir: PathBuf::from("."),
            isolate: false,
            keep_going: false,
            detail_on_length_mismatch: false,
            check_status: false,
            summary: false,
        }
    }
}

impl RunArgs {
    pub fn config(&self) -> RunConfig {
        RunConfig {
            workdir: self.workdir.clone(),
            isolate: self.isolate,
            keep_going: self.keep_going,
            check_status: self.check_status,
            compare: CompareOptions {
                detail_on_length_mismatch: self.detail_on_length_mismatch,
            },
        }
    }
}
