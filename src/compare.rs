//! Line-wise comparison of an expected output file against the actual one.
//!
//! Lines keep their terminators, so `"x\n"` and `"x\r\n"` differ, as does a last line with and
//! without a trailing newline. Content is compared as raw bytes and only decoded (lossily) for
//! display.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    /// Keep reporting per-line differences after a line-count mismatch instead of stopping.
    pub detail_on_length_mismatch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Expected,
    Actual,
}

/// One line of the comparison report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    LineCountMismatch {
        expected: usize,
        actual: usize,
    },
    LineMismatch {
        line: usize,
        expected: String,
        actual: String,
    },
    /// Only produced in detailed mode: a line past the end of the shorter file.
    SurplusLine {
        line: usize,
        side: Side,
        content: String,
    },
    NoDifferences,
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::LineCountMismatch { .. } => f.write_str("line_size_neq!!!"),
            Observation::LineMismatch {
                line,
                expected,
                actual,
            } => write!(
                f,
                "for line_id = {line}, neq!\nline_a: {expected}\nline_b:{actual}"
            ),
            Observation::SurplusLine {
                line,
                side: Side::Expected,
                content,
            } => write!(f, "for line_id = {line}, missing!\nline_a: {content}"),
            Observation::SurplusLine {
                line,
                side: Side::Actual,
                content,
            } => write!(f, "for line_id = {line}, unexpected!\nline_b:{content}"),
            Observation::NoDifferences => f.write_str("no_diff, pass!!!!!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

/// Splits `content` into lines, each keeping its `\n` terminator. A final unterminated line is
/// kept as is; empty content has no lines.
pub fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    content.split_inclusive(|&b| b == b'\n').collect()
}

/// Compares two line sequences, handing every observation to `emit` as soon as it is known.
pub fn compare_lines<F>(
    expected: &[&[u8]],
    actual: &[&[u8]],
    options: CompareOptions,
    mut emit: F,
) -> Result<Verdict>
where
    F: FnMut(Observation) -> Result<()>,
{
    if expected.len() != actual.len() {
        emit(Observation::LineCountMismatch {
            expected: expected.len(),
            actual: actual.len(),
        })?;
        if options.detail_on_length_mismatch {
            emit_line_mismatches(expected, actual, &mut emit)?;
            emit_surplus(expected, actual, &mut emit)?;
        }
        return Ok(Verdict::Fail);
    }

    if emit_line_mismatches(expected, actual, &mut emit)? > 0 {
        return Ok(Verdict::Fail);
    }

    emit(Observation::NoDifferences)?;
    Ok(Verdict::Pass)
}

fn emit_line_mismatches<F>(expected: &[&[u8]], actual: &[&[u8]], emit: &mut F) -> Result<usize>
where
    F: FnMut(Observation) -> Result<()>,
{
    let mut mismatches = 0;
    for (index, (a, b)) in expected.iter().zip(actual).enumerate() {
        if a != b {
            mismatches += 1;
            emit(Observation::LineMismatch {
                line: index + 1,
                expected: String::from_utf8_lossy(a).into_owned(),
                actual: String::from_utf8_lossy(b).into_owned(),
            })?;
        }
    }
    Ok(mismatches)
}

fn emit_surplus<F>(expected: &[&[u8]], actual: &[&[u8]], emit: &mut F) -> Result<()>
where
    F: FnMut(Observation) -> Result<()>,
{
    let common = expected.len().min(actual.len());
    let (side, longer) = if expected.len() > actual.len() {
        (Side::Expected, expected)
    } else {
        (Side::Actual, actual)
    };
    for (index, line) in longer.iter().enumerate().skip(common) {
        emit(Observation::SurplusLine {
            line: index + 1,
            side,
            content: String::from_utf8_lossy(line).into_owned(),
        })?;
    }
    Ok(())
}

/// Reads both files in full and streams the observations to `out`, one per `writeln!`.
///
/// A missing or unreadable file is an error; differences are not.
pub fn compare_files<W: Write + ?Sized>(
    expected: &Path,
    actual: &Path,
    options: CompareOptions,
    out: &mut W,
) -> Result<Verdict> {
    let expected_content = fs::read(expected)
        .with_context(|| format!("reading expected output {}", expected.display()))?;
    let actual_content = fs::read(actual)
        .with_context(|| format!("reading actual output {}", actual.display()))?;

    let expected_lines = split_lines(&expected_content);
    let actual_lines = split_lines(&actual_content);
    debug!(
        "comparing {} ({} lines, {}B) with {} ({} lines, {}B)",
        expected.display(),
        expected_lines.len(),
        expected_content.len(),
        actual.display(),
        actual_lines.len(),
        actual_content.len()
    );

    compare_lines(&expected_lines, &actual_lines, options, |observation| {
        writeln!(out, "{observation}").context("writing comparison report")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::Rng;
    use tempfile::TempDir;

    fn observe(
        expected: &[&str],
        actual: &[&str],
        options: CompareOptions,
    ) -> (Verdict, Vec<Observation>) {
        let expected: Vec<&[u8]> = expected.iter().map(|s| s.as_bytes()).collect();
        let actual: Vec<&[u8]> = actual.iter().map(|s| s.as_bytes()).collect();
        let mut seen = Vec::new();
        let verdict = compare_lines(&expected, &actual, options, |o| {
            seen.push(o);
            Ok(())
        })
        .unwrap();
        (verdict, seen)
    }

    fn report(a: &[u8], b: &[u8], options: CompareOptions) -> (Verdict, String) {
        let dir = TempDir::new().unwrap();
        let a_path = dir.path().join("a.txt");
        let b_path = dir.path().join("b.txt");
        fs::write(&a_path, a).unwrap();
        fs::write(&b_path, b).unwrap();
        let mut out = Vec::new();
        let verdict = compare_files(&a_path, &b_path, options, &mut out).unwrap();
        (verdict, String::from_utf8(out).unwrap())
    }

    #[test]
    fn equal_files_pass() {
        let (verdict, out) = report(b"x\ny\n", b"x\ny\n", CompareOptions::default());
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(out, "no_diff, pass!!!!!\n");
    }

    #[test]
    fn different_line_counts_short_circuit() {
        let (verdict, out) = report(b"x\ny\nz\n", b"x\ny\n", CompareOptions::default());
        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(out, "line_size_neq!!!\n");
    }

    #[test]
    fn line_count_mismatch_hides_content_differences() {
        let (_, seen) = observe(&["a\n", "b\n"], &["A\n"], CompareOptions::default());
        assert_eq!(
            seen,
            vec![Observation::LineCountMismatch {
                expected: 2,
                actual: 1
            }]
        );
    }

    #[test]
    fn differing_line_is_reported_verbatim() {
        let (verdict, out) = report(b"x\nY\n", b"x\ny\n", CompareOptions::default());
        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(out, "for line_id = 2, neq!\nline_a: Y\n\nline_b:y\n\n");
    }

    #[test]
    fn every_mismatch_is_reported_and_pass_is_not() {
        let (verdict, seen) = observe(
            &["1\n", "2\n", "3\n", "4\n"],
            &["1\n", "two\n", "3\n", "four\n"],
            CompareOptions::default(),
        );
        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(
            seen,
            vec![
                Observation::LineMismatch {
                    line: 2,
                    expected: "2\n".to_owned(),
                    actual: "two\n".to_owned(),
                },
                Observation::LineMismatch {
                    line: 4,
                    expected: "4\n".to_owned(),
                    actual: "four\n".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn terminators_are_significant() {
        let (_, seen) = observe(&["x\r\n"], &["x\n"], CompareOptions::default());
        assert_eq!(seen.len(), 1);

        let (verdict, out) = report(b"x\ny", b"x\ny\n", CompareOptions::default());
        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(out, "for line_id = 2, neq!\nline_a: y\nline_b:y\n\n");
    }

    #[test]
    fn empty_files_pass() {
        let (verdict, out) = report(b"", b"", CompareOptions::default());
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(out, "no_diff, pass!!!!!\n");
    }

    #[test]
    fn split_lines_keeps_terminators() {
        assert_eq!(
            split_lines(b"a\n\nb"),
            vec![&b"a\n"[..], &b"\n"[..], &b"b"[..]]
        );
        assert!(split_lines(b"").is_empty());
    }

    #[test]
    fn detailed_length_mismatch_lists_prefix_and_surplus() {
        let options = CompareOptions {
            detail_on_length_mismatch: true,
        };
        let (verdict, seen) = observe(&["x\n", "y\n"], &["x\n", "Y\n", "z\n"], options);
        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(
            seen,
            vec![
                Observation::LineCountMismatch {
                    expected: 2,
                    actual: 3
                },
                Observation::LineMismatch {
                    line: 2,
                    expected: "y\n".to_owned(),
                    actual: "Y\n".to_owned(),
                },
                Observation::SurplusLine {
                    line: 3,
                    side: Side::Actual,
                    content: "z\n".to_owned(),
                },
            ]
        );

        let (_, out) = report(b"x\ny\n", b"x\n", options);
        assert_eq!(out, "line_size_neq!!!\nfor line_id = 2, missing!\nline_a: y\n\n");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present.txt");
        fs::write(&present, b"x\n").unwrap();
        let missing = dir.path().join("missing.txt");

        let mut out = Vec::new();
        let err = compare_files(&missing, &present, CompareOptions::default(), &mut out)
            .unwrap_err();
        assert!(format!("{err:#}").contains("reading expected output"));
        let err = compare_files(&present, &missing, CompareOptions::default(), &mut out)
            .unwrap_err();
        assert!(format!("{err:#}").contains("reading actual output"));
        assert!(out.is_empty());
    }

    #[test]
    fn comparison_leaves_files_untouched() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"1\n2\n").unwrap();
        fs::write(&b, b"1\n3\n").unwrap();
        compare_files(&a, &b, CompareOptions::default(), &mut std::io::sink()).unwrap();
        assert_eq!(fs::read(&a).unwrap(), b"1\n2\n");
        assert_eq!(fs::read(&b).unwrap(), b"1\n3\n");
    }

    #[test]
    fn random_identical_content_always_passes() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let lines: Vec<String> = (0..rng.gen_range(0..40))
                .map(|_| {
                    let len = rng.gen_range(0..20);
                    let mut line: String = (0..len)
                        .map(|_| rng.gen_range(b' '..=b'~') as char)
                        .collect();
                    line.push('\n');
                    line
                })
                .collect();
            let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
            let (verdict, seen) = observe(&refs, &refs, CompareOptions::default());
            assert_eq!(verdict, Verdict::Pass);
            assert_eq!(seen, vec![Observation::NoDifferences]);
        }
    }

    #[test]
    fn random_single_edit_is_pinpointed() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let count = rng.gen_range(1..30);
            let expected: Vec<String> = (0..count).map(|i| format!("line {i}\n")).collect();
            let mut actual = expected.clone();
            let target = rng.gen_range(0..count);
            actual[target] = format!("changed {target}\n");

            let e: Vec<&str> = expected.iter().map(String::as_str).collect();
            let a: Vec<&str> = actual.iter().map(String::as_str).collect();
            let (verdict, seen) = observe(&e, &a, CompareOptions::default());
            assert_eq!(verdict, Verdict::Fail);
            assert_eq!(
                seen,
                vec![Observation::LineMismatch {
                    line: target + 1,
                    expected: expected[target].clone(),
                    actual: actual[target].clone(),
                }]
            );
        }
    }
}
