//! The batch runner behind `run_test` (§6, §7.2): a small TOML-fixture
//! runner that doubles as both the public convenience operation and the
//! backing format for this crate's own integration suites, in the spirit of
//! the teacher's own fixture-driven `tests/` layout.

use crate::config::Config;
use crate::{calculate_with_config, CalcResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read test file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse test file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no suite named '{0}' in this test file")]
    UnknownKey(String),
}

/// One named scenario in a fixture suite: an input expression and either an
/// expected final rendering or an expected error kind name, never both.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub name: Option<String>,
    pub input: String,
    #[serde(default)]
    pub expect: Option<String>,
    #[serde(default)]
    pub expect_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Suite {
    cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct TestFile {
    #[serde(flatten)]
    suites: std::collections::HashMap<String, Suite>,
}

/// The outcome of running a single [`TestCase`].
#[derive(Debug, Clone)]
pub struct TestCaseResult {
    pub case: TestCase,
    pub passed: bool,
    pub actual_result: Option<String>,
    pub actual_error: Option<String>,
}

/// The outcome of an entire [`run_test`] invocation.
#[derive(Debug, Clone)]
pub struct RunTestReport {
    pub key: String,
    pub results: Vec<TestCaseResult>,
    pub halted_early: bool,
}

impl RunTestReport {
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Run the named suite `key` out of the TOML fixture `file` (§6's
/// `run_test(file, key, time_limit?, pause_on_error?, random_sample?)`).
///
/// `pause_on_error` has no interactive meaning in a library function; here
/// it means "stop running further cases the moment one fails," matching the
/// CLI's `--pause` flag one layer up. `random_sample` restricts the run to
/// a deterministically-chosen subset of `n` cases (a fixed-seed linear
/// congruential shuffle, not true randomness — repeatable runs matter more
/// than an unbiased sample for a test harness).
pub fn run_test(
    file: &Path,
    key: &str,
    time_limit: Option<Duration>,
    pause_on_error: bool,
    random_sample: Option<usize>,
) -> Result<RunTestReport, BatchError> {
    run_test_with_config(file, key, time_limit, pause_on_error, random_sample, &Config::default())
}

pub fn run_test_with_config(
    file: &Path,
    key: &str,
    time_limit: Option<Duration>,
    pause_on_error: bool,
    random_sample: Option<usize>,
    config: &Config,
) -> Result<RunTestReport, BatchError> {
    let content = std::fs::read_to_string(file).map_err(|source| BatchError::Io {
        path: file.display().to_string(),
        source,
    })?;
    let parsed: TestFile = toml::from_str(&content)?;
    let suite = parsed
        .suites
        .get(key)
        .ok_or_else(|| BatchError::UnknownKey(key.to_string()))?;

    let mut cases = suite.cases.clone();
    if let Some(n) = random_sample {
        cases = sample(cases, n);
    }

    let mut results = Vec::with_capacity(cases.len());
    let mut halted_early = false;
    for case in cases {
        let outcome = calculate_with_config(&case.input, time_limit, config);
        let result = judge(case, outcome);
        let failed = !result.passed;
        results.push(result);
        if failed && pause_on_error {
            halted_early = true;
            break;
        }
    }

    Ok(RunTestReport {
        key: key.to_string(),
        results,
        halted_early,
    })
}

fn judge(case: TestCase, outcome: Result<CalcResult, oloc_util::CalcError>) -> TestCaseResult {
    match (&case.expect, &case.expect_error, outcome) {
        (Some(expected), None, Ok(result)) => {
            let actual = result.final_result().to_string();
            let passed = actual == *expected;
            TestCaseResult {
                case,
                passed,
                actual_result: Some(actual),
                actual_error: None,
            }
        }
        (None, Some(expected_kind), Err(err)) => {
            let actual = err.kind_name().to_string();
            let passed = actual == *expected_kind;
            TestCaseResult {
                case,
                passed,
                actual_result: None,
                actual_error: Some(actual),
            }
        }
        (_, _, Ok(result)) => {
            let actual = result.final_result().to_string();
            TestCaseResult {
                case,
                passed: false,
                actual_result: Some(actual),
                actual_error: None,
            }
        }
        (_, _, Err(err)) => {
            let actual = err.kind_name().to_string();
            TestCaseResult {
                case,
                passed: false,
                actual_result: None,
                actual_error: Some(actual),
            }
        }
    }
}

/// Deterministically pick `n` cases out of `cases` via a fixed-seed linear
/// congruential shuffle — repeatable across runs, unlike a system-entropy
/// sample.
fn sample(mut cases: Vec<TestCase>, n: usize) -> Vec<TestCase> {
    let len = cases.len();
    if n >= len {
        return cases;
    }
    let mut state: u64 = 0x2545_f491_4f6c_dd1d ^ (len as u64);
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    for i in (1..len).rev() {
        let j = next() % (i + 1);
        cases.swap(i, j);
    }
    cases.truncate(n);
    cases
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn runs_a_passing_suite() {
        let file = write_fixture(
            r#"
            [basic]
            cases = [
                { input = "1+2", expect = "3" },
                { input = "5/0", expect_error = "DIVIDE_BY_ZERO" },
            ]
            "#,
        );
        let report = run_test(file.path(), "basic", None, false, None).unwrap();
        assert!(report.all_passed());
        assert_eq!(report.passed_count(), 2);
    }

    #[test]
    fn reports_a_mismatch() {
        let file = write_fixture(
            r#"
            [basic]
            cases = [ { input = "1+2", expect = "4" } ]
            "#,
        );
        let report = run_test(file.path(), "basic", None, false, None).unwrap();
        assert!(!report.all_passed());
        assert_eq!(report.results[0].actual_result.as_deref(), Some("3"));
    }

    #[test]
    fn pause_on_error_halts_after_first_failure() {
        let file = write_fixture(
            r#"
            [basic]
            cases = [
                { input = "1+2", expect = "4" },
                { input = "2+2", expect = "4" },
            ]
            "#,
        );
        let report = run_test(file.path(), "basic", None, true, None).unwrap();
        assert!(report.halted_early);
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn unknown_key_errors() {
        let file = write_fixture("[basic]\ncases = []\n");
        let err = run_test(file.path(), "missing", None, false, None).unwrap_err();
        assert!(matches!(err, BatchError::UnknownKey(_)));
    }

    #[test]
    fn random_sample_restricts_count() {
        let file = write_fixture(
            r#"
            [basic]
            cases = [
                { input = "1", expect = "1" },
                { input = "2", expect = "2" },
                { input = "3", expect = "3" },
                { input = "4", expect = "4" },
            ]
            "#,
        );
        let report = run_test(file.path(), "basic", None, false, Some(2)).unwrap();
        assert_eq!(report.results.len(), 2);
    }
}
