use super::trace::CommandTrace;

/// Sequence label and description of the test being run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOrder {
    /// `###<n>`, where `n` is the 1-based position in the run.
    pub sequence: String,
    pub description: String,
}

impl TestOrder {
    pub fn new(position: usize, description: impl Into<String>) -> Self {
        Self {
            sequence: format!("###{position}"),
            description: description.into(),
        }
    }
}

/// Per-test state handed to every outcome hook.
#[derive(Debug, Clone, Copy)]
pub struct CaseReport<'a> {
    pub order: &'a TestOrder,
    pub trace: &'a CommandTrace,
}

/// Receives the lifecycle of each test from the runner.
///
/// `start_test` is delivered to every test, followed by exactly one outcome
/// hook. `finish_run` comes once, after the last test.
pub trait TestOutcomeObserver {
    fn start_test(&mut self, order: &TestOrder);

    fn add_success(&mut self, report: CaseReport<'_>);

    fn add_failure(&mut self, report: CaseReport<'_>, error: &str);

    fn add_error(&mut self, report: CaseReport<'_>, error: &str);

    fn add_skip(&mut self, report: CaseReport<'_>, reason: &str);

    fn add_expected_failure(&mut self, report: CaseReport<'_>, error: &str);

    fn add_unexpected_success(&mut self, report: CaseReport<'_>);

    fn finish_run(&mut self, _summary: &super::runner::RunSummary) {}
}
