use tracing::debug;

use super::case::TestCase;

/// A named group of tests kept in the order they were added.
#[derive(Debug, Default)]
pub struct TestSuite {
    name: String,
    cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    pub fn case(mut self, case: TestCase) -> Self {
        self.cases.push(case.in_suite(&self.name));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Flattens suites into the run list. Declaration order is kept; tests are
/// never sorted.
#[derive(Debug, Clone, Default)]
pub struct TestLoader {
    filter: Option<String>,
}

impl TestLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep tests whose `suite::name` contains `pattern`.
    pub fn filter(mut self, pattern: Option<String>) -> Self {
        self.filter = pattern.filter(|pattern| !pattern.is_empty());
        self
    }

    pub fn load(&self, suites: Vec<TestSuite>) -> Vec<TestCase> {
        let cases: Vec<TestCase> = suites
            .into_iter()
            .flat_map(|suite| suite.cases)
            .filter(|case| self.matches(case))
            .collect();
        debug!(count = cases.len(), filter = ?self.filter, "loaded tests");
        cases
    }

    fn matches(&self, case: &TestCase) -> bool {
        match &self.filter {
            Some(pattern) => format!("{}::{}", case.suite(), case.name()).contains(pattern.as_str()),
            None => true,
        }
    }
}
