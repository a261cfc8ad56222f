//! Drives every case of a suite: stage the input, run the subject program, compare, report.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use tempfile::TempDir;

use crate::compare::{compare_files, CompareOptions, Verdict};
use crate::fixture::{Fixture, FixtureLocator, TestCoordinate, ACTUAL_OUTPUT, STAGED_INPUT};
use crate::subject::{RunOutcome, SubjectRunner};

const HEADER_RULE: &str = "------------------------------";
const FOOTER_RULE: &str = "==============================";

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Shared working area, used unless `isolate` is set.
    pub workdir: PathBuf,
    /// Give every case its own temporary working directory.
    pub isolate: bool,
    /// Report a failing case and continue instead of aborting the run.
    pub keep_going: bool,
    /// Print a line when the subject program did not exit successfully.
    pub check_status: bool,
    pub compare: CompareOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            isolate: false,
            keep_going: false,
            check_status: false,
            compare: CompareOptions::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Tally {
    fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail => self.failed += 1,
        }
    }

    pub fn summary(&self) -> String {
        let mut line = format!("{}/{} cases passed", self.passed, self.total);
        if self.errored > 0 {
            line.push_str(&format!(", {} errored", self.errored));
        }
        line
    }
}

/// A case whose input is staged and whose subject program run has finished.
struct Executed {
    fixture: Fixture,
    workdir: PathBuf,
    outcome: RunOutcome,
    // Removed on drop, after the comparison.
    _scratch: Option<TempDir>,
}

pub struct Runner<'a, R> {
    locator: &'a FixtureLocator,
    subject: &'a R,
    config: &'a RunConfig,
}

impl<'a, R: SubjectRunner> Runner<'a, R> {
    pub fn new(locator: &'a FixtureLocator, subject: &'a R, config: &'a RunConfig) -> Self {
        Self {
            locator,
            subject,
            config,
        }
    }

    /// Runs every coordinate in order. Mismatches never stop the run; errors do, unless
    /// `keep_going` is set.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<Tally> {
        let mut tally = Tally::default();
        for coordinate in self.locator.enumerate() {
            self.run_case(coordinate, out, &mut tally)?;
        }
        Ok(tally)
    }

    fn run_case<W: Write>(
        &self,
        coordinate: TestCoordinate,
        out: &mut W,
        tally: &mut Tally,
    ) -> Result<()> {
        // The subject program shares our stdout.
        out.flush().context("flushing report")?;
        let executed = match self.execute(coordinate) {
            Err(err) if !self.config.keep_going => {
                return Err(err.context(format!("test point {coordinate}")))
            }
            executed => executed,
        };

        writeln!(out, "{HEADER_RULE}")?;
        writeln!(out, "TestPoint::{}-{}:", coordinate.group, coordinate.case)?;
        match executed.and_then(|executed| self.check(&executed, out)) {
            Ok(verdict) => tally.record(verdict),
            Err(err) if self.config.keep_going => {
                debug!("test point {coordinate} errored: {err:?}");
                tally.total += 1;
                tally.errored += 1;
                writeln!(out, "error: {err:#}")?;
            }
            Err(err) => return Err(err.context(format!("test point {coordinate}"))),
        }
        writeln!(out, "{FOOTER_RULE}\n\n")?;
        Ok(())
    }

    fn execute(&self, coordinate: TestCoordinate) -> Result<Executed> {
        let fixture = self.locator.resolve(coordinate);
        let scratch = if self.config.isolate {
            Some(TempDir::new().context("creating isolated working directory")?)
        } else {
            None
        };
        let workdir = scratch
            .as_ref()
            .map_or_else(|| self.config.workdir.clone(), |dir| dir.path().to_path_buf());

        stage(&fixture.input, &workdir)?;
        let outcome = self.subject.run(&workdir)?;

        Ok(Executed {
            fixture,
            workdir,
            outcome,
            _scratch: scratch,
        })
    }

    fn check<W: Write>(&self, executed: &Executed, out: &mut W) -> Result<Verdict> {
        if self.config.check_status && !executed.outcome.is_success() {
            writeln!(out, "{}", executed.outcome)?;
        }
        compare_files(
            &executed.fixture.expected,
            &executed.workdir.join(ACTUAL_OUTPUT),
            self.config.compare,
            out,
        )
    }
}

/// Copies a fixture input over the staged input of `workdir`.
pub fn stage(input: &Path, workdir: &Path) -> Result<()> {
    let staged = workdir.join(STAGED_INPUT);
    fs::copy(input, &staged)
        .with_context(|| format!("staging {} as {}", input.display(), staged.display()))?;
    debug!("staged {} -> {}", input.display(), staged.display());
    Ok(())
}
