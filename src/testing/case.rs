use std::fmt;

use thiserror::Error;

use crate::error::HarnessError;

use super::context::CaseContext;

/// Why a test body did not complete normally.
///
/// `Assertion` becomes a failure, `Skip` a skip, everything else an error.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("{0}")]
    Assertion(String),

    #[error("skipped: {0}")]
    Skip(String),

    #[error(transparent)]
    Harness(#[from] HarnessError),

    #[error("{0}")]
    Other(String),
}

impl CaseError {
    pub fn assertion(message: impl Into<String>) -> Self {
        CaseError::Assertion(message.into())
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        CaseError::Skip(reason.into())
    }
}

pub type CaseResult = Result<(), CaseError>;

type TestBody = Box<dyn Fn(&mut CaseContext) -> CaseResult>;

/// A single named test.
pub struct TestCase {
    name: String,
    suite: String,
    doc: Option<String>,
    skip: Option<String>,
    expect_failure: bool,
    body: TestBody,
}

impl TestCase {
    pub fn new(name: impl Into<String>, body: impl Fn(&mut CaseContext) -> CaseResult + 'static) -> Self {
        Self {
            name: name.into(),
            suite: String::new(),
            doc: None,
            skip: None,
            expect_failure: false,
            body: Box::new(body),
        }
    }

    /// Human description; only the first non-blank line is shown.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Never runs the body; reports a skip with `reason`.
    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }

    /// A failure or error is the expected result of this test.
    pub fn expect_failure(mut self) -> Self {
        self.expect_failure = true;
        self
    }

    pub(crate) fn in_suite(mut self, suite: &str) -> Self {
        self.suite = suite.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn suite(&self) -> &str {
        &self.suite
    }

    pub fn skip_reason(&self) -> Option<&str> {
        self.skip.as_deref()
    }

    pub fn expects_failure(&self) -> bool {
        self.expect_failure
    }

    /// First doc line, or `name (suite)` when the test has no doc.
    pub fn description(&self) -> String {
        let first_line = self
            .doc
            .as_deref()
            .and_then(|doc| doc.lines().map(str::trim).find(|line| !line.is_empty()));
        match first_line {
            Some(line) => line.to_string(),
            None if self.suite.is_empty() => self.name.clone(),
            None => format!("{} ({})", self.name, self.suite),
        }
    }

    pub(crate) fn call(&self, context: &mut CaseContext) -> CaseResult {
        (self.body)(context)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("suite", &self.suite)
            .field("skip", &self.skip)
            .field("expect_failure", &self.expect_failure)
            .finish_non_exhaustive()
    }
}
