use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the staged input the subject program reads from its working directory.
pub const STAGED_INPUT: &str = "testfile.txt";
/// Name of the output the subject program writes into its working directory.
pub const ACTUAL_OUTPUT: &str = "output.txt";

pub const DEFAULT_BASE_DIR: &str = "testdata/lexical";
pub const DEFAULT_GROUPS: u32 = 6;
pub const DEFAULT_CASES: u32 = 10;

/// One test case: a fixture group directory and a case number inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestCoordinate {
    pub group: u32,
    pub case: u32,
}

impl TestCoordinate {
    pub fn new(group: u32, case: u32) -> Self {
        Self { group, case }
    }
}

impl fmt::Display for TestCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.group, self.case)
    }
}

/// Inclusive upper bounds of the nested group/case ranges. Both ranges start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub groups: u32,
    pub cases: u32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS,
            cases: DEFAULT_CASES,
        }
    }
}

impl Bounds {
    pub fn len(&self) -> usize {
        self.groups as usize * self.cases as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Input and expected-output paths of a single case. Nothing here is checked for existence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub input: PathBuf,
    pub expected: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FixtureLocator {
    base_dir: PathBuf,
    bounds: Bounds,
}

impl FixtureLocator {
    pub fn new(base_dir: impl Into<PathBuf>, bounds: Bounds) -> Self {
        Self {
            base_dir: base_dir.into(),
            bounds,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Every coordinate in range, group-major, both indices ascending.
    ///
    /// Each call starts a fresh sequence, so two enumerations always agree.
    pub fn enumerate(&self) -> Coordinates {
        Coordinates::new(self.bounds)
    }

    pub fn resolve(&self, coordinate: TestCoordinate) -> Fixture {
        resolve(&self.base_dir, coordinate)
    }
}

pub fn resolve(base_dir: &Path, coordinate: TestCoordinate) -> Fixture {
    let group_dir = base_dir.join(coordinate.group.to_string());
    Fixture {
        input: group_dir.join(format!("testfile{}.txt", coordinate.case)),
        expected: group_dir.join(format!("output{}.txt", coordinate.case)),
    }
}

/// Lazy iterator over the nested coordinate ranges.
#[derive(Debug, Clone)]
pub struct Coordinates {
    bounds: Bounds,
    next: Option<TestCoordinate>,
}

impl Coordinates {
    fn new(bounds: Bounds) -> Self {
        let next = (!bounds.is_empty()).then(|| TestCoordinate::new(1, 1));
        Self { bounds, next }
    }
}

impl Iterator for Coordinates {
    type Item = TestCoordinate;

    fn next(&mut self) -> Option<TestCoordinate> {
        let current = self.next?;
        self.next = if current.case < self.bounds.cases {
            Some(TestCoordinate::new(current.group, current.case + 1))
        } else if current.group < self.bounds.groups {
            Some(TestCoordinate::new(current.group + 1, 1))
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            None => 0,
            Some(c) => {
                let done = (c.group as usize - 1) * self.bounds.cases as usize + c.case as usize - 1;
                self.bounds.len() - done
            }
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Coordinates {}
