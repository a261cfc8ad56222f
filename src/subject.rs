//! Invocation of the program under test.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};
use log::{debug, warn};

/// What became of one invocation of the subject program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Exited(i32),
    Signaled(i32),
    NotStarted,
}

impl RunOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return RunOutcome::Success;
        }
        if let Some(code) = status.code() {
            return RunOutcome::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return RunOutcome::Signaled(signal);
            }
        }
        RunOutcome::Exited(-1)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Success => f.write_str("subject program exited successfully"),
            RunOutcome::Exited(code) => write!(f, "subject program exited with status {code}"),
            RunOutcome::Signaled(signal) => {
                write!(f, "subject program killed by signal {}", signal_name(*signal))
            }
            RunOutcome::NotStarted => f.write_str("subject program could not be started"),
        }
    }
}

fn signal_name(signal: i32) -> String {
    match nix::sys::signal::Signal::try_from(signal) {
        Ok(sig) => sig.as_str().to_owned(),
        Err(_) => signal.to_string(),
    }
}

/// Runs the subject program once inside `workdir`, blocking until it is done.
///
/// The program takes no arguments; it reads the staged input and writes its output relative to
/// `workdir`.
pub trait SubjectRunner {
    fn run(&self, workdir: &Path) -> Result<RunOutcome>;
}

/// Spawns a real executable with inherited stdio.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolves `program` with `which` (searching `PATH` for bare names, the current directory
    /// for relative paths) and makes it absolute so it can run from any working directory.
    ///
    /// An unresolvable program is kept as given; failing to start it is reported per case.
    pub fn locate(program: &Path) -> Result<Self> {
        let resolved = match which::which(program) {
            Ok(path) => path,
            Err(err) => {
                debug!("could not resolve {}: {err}", program.display());
                program.to_path_buf()
            }
        };
        let absolute = if resolved.is_absolute() || resolved.components().count() == 1 {
            resolved
        } else {
            std::env::current_dir()
                .context("reading current directory")?
                .join(resolved)
        };
        debug!("subject program: {}", absolute.display());
        Ok(Self::new(absolute))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl SubjectRunner for ProcessRunner {
    fn run(&self, workdir: &Path) -> Result<RunOutcome> {
        let mut command = Command::new(&self.program);
        command.current_dir(workdir);
        let status = match command.status() {
            Ok(status) => status,
            Err(err) => {
                warn!("failed to start {}: {err}", self.program.display());
                return Ok(RunOutcome::NotStarted);
            }
        };
        let outcome = RunOutcome::from_status(status);
        debug!(
            "{:?} in {:?} -> status {:?}",
            self.program,
            workdir,
            status.code()
        );
        Ok(outcome)
    }
}
