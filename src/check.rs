//! Consistency check of a fixture tree against the configured bounds.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::fixture::{FixtureLocator, TestCoordinate};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Audit {
    pub coordinates: usize,
    pub missing: Vec<(TestCoordinate, PathBuf)>,
    /// Files under the fixture root that no coordinate in range refers to.
    pub unreferenced: Vec<PathBuf>,
}

impl Audit {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unreferenced.is_empty()
    }
}

pub fn audit(locator: &FixtureLocator) -> Result<Audit> {
    let mut audit = Audit::default();
    let mut referenced = HashSet::new();

    for coordinate in locator.enumerate() {
        audit.coordinates += 1;
        let fixture = locator.resolve(coordinate);
        for path in [fixture.input, fixture.expected] {
            if !path.is_file() {
                audit.missing.push((coordinate, path.clone()));
            }
            referenced.insert(path);
        }
    }

    for entry in WalkDir::new(locator.base_dir()).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("walking {}", locator.base_dir().display()))?;
        if entry.file_type().is_file() && !referenced.contains(entry.path()) {
            audit.unreferenced.push(entry.into_path());
        }
    }

    Ok(audit)
}

pub fn print_audit<W: Write>(audit: &Audit, out: &mut W) -> Result<()> {
    for (coordinate, path) in &audit.missing {
        writeln!(out, "missing {coordinate}: {}", path.display())?;
    }
    for path in &audit.unreferenced {
        writeln!(out, "unreferenced: {}", path.display())?;
    }
    writeln!(
        out,
        "{} coordinates, {} missing files, {} unreferenced files",
        audit.coordinates,
        audit.missing.len(),
        audit.unreferenced.len()
    )?;
    Ok(())
}
