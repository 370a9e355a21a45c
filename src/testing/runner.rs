use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::record::OutcomeTag;

use super::case::{CaseError, TestCase};
use super::context::{CaseContext, CaseSettings};
use super::observer::{CaseReport, TestOrder, TestOutcomeObserver};
use super::trace::CommandTrace;

/// Final state of one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
    Error(String),
    Skip(String),
    ExpectedFailure(String),
    UnexpectedSuccess,
}

impl Outcome {
    pub fn tag(&self) -> OutcomeTag {
        match self {
            Outcome::Success => OutcomeTag::Ok,
            Outcome::Failure(_) => OutcomeTag::Fail,
            Outcome::Error(_) => OutcomeTag::Error,
            Outcome::Skip(_) => OutcomeTag::Skip,
            Outcome::ExpectedFailure(_) => OutcomeTag::ExpectedFailure,
            Outcome::UnexpectedSuccess => OutcomeTag::UnexpectedSuccess,
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Outcome::Failure(note)
            | Outcome::Error(note)
            | Outcome::Skip(note)
            | Outcome::ExpectedFailure(note) => Some(note),
            Outcome::Success | Outcome::UnexpectedSuccess => None,
        }
    }

    fn is_problem(&self) -> bool {
        matches!(self, Outcome::Failure(_) | Outcome::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemEntry {
    pub description: String,
    pub note: String,
}

/// Pass/fail accounting for a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub tests_run: usize,
    pub successes: usize,
    pub failures: Vec<ProblemEntry>,
    pub errors: Vec<ProblemEntry>,
    pub skipped: usize,
    pub expected_failures: usize,
    pub unexpected_successes: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    /// No failures, no errors and no unexpected successes.
    pub fn was_successful(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty() && self.unexpected_successes == 0
    }

    fn record(&mut self, order: &TestOrder, outcome: &Outcome) {
        let entry = |note: &str| ProblemEntry {
            description: order.description.clone(),
            note: note.to_string(),
        };
        match outcome {
            Outcome::Success => self.successes += 1,
            Outcome::Failure(note) => self.failures.push(entry(note)),
            Outcome::Error(note) => self.errors.push(entry(note)),
            Outcome::Skip(_) => self.skipped += 1,
            Outcome::ExpectedFailure(_) => self.expected_failures += 1,
            Outcome::UnexpectedSuccess => self.unexpected_successes += 1,
        }
    }
}

/// Runs tests one after another, in the order given, and reports each
/// lifecycle step to an observer.
#[derive(Debug, Clone, Default)]
pub struct TestRunner {
    settings: CaseSettings,
    failfast: bool,
}

impl TestRunner {
    pub fn new(settings: CaseSettings) -> Self {
        Self {
            settings,
            failfast: false,
        }
    }

    /// Stop after the first failure or error.
    pub fn failfast(mut self, failfast: bool) -> Self {
        self.failfast = failfast;
        self
    }

    pub fn run(&self, cases: &[TestCase], observer: &mut dyn TestOutcomeObserver) -> RunSummary {
        install_panic_hook();
        let started = Instant::now();
        let mut summary = RunSummary::default();

        for case in cases {
            summary.tests_run += 1;
            let order = TestOrder::new(summary.tests_run, case.description());
            debug!(sequence = %order.sequence, name = case.name(), "starting test");
            observer.start_test(&order);

            let (outcome, trace) = self.execute(case);
            let report = CaseReport {
                order: &order,
                trace: &trace,
            };
            match &outcome {
                Outcome::Success => observer.add_success(report),
                Outcome::Failure(note) => observer.add_failure(report, note),
                Outcome::Error(note) => observer.add_error(report, note),
                Outcome::Skip(reason) => observer.add_skip(report, reason),
                Outcome::ExpectedFailure(note) => observer.add_expected_failure(report, note),
                Outcome::UnexpectedSuccess => observer.add_unexpected_success(report),
            }
            debug!(sequence = %order.sequence, outcome = %outcome.tag(), "finished test");
            summary.record(&order, &outcome);

            if self.failfast && outcome.is_problem() {
                info!(sequence = %order.sequence, "stopping after first problem");
                break;
            }
        }

        summary.elapsed = started.elapsed();
        observer.finish_run(&summary);
        summary
    }

    fn execute(&self, case: &TestCase) -> (Outcome, CommandTrace) {
        if let Some(reason) = case.skip_reason() {
            return (Outcome::Skip(reason.to_string()), CommandTrace::new());
        }

        let mut context = match CaseContext::new(self.settings.clone()) {
            Ok(context) => context,
            Err(err) => return (Outcome::Error(err.to_string()), CommandTrace::new()),
        };

        CAPTURING.with(|capturing| capturing.set(true));
        let result = panic::catch_unwind(AssertUnwindSafe(|| case.call(&mut context)));
        CAPTURING.with(|capturing| capturing.set(false));

        let outcome = match result {
            Ok(Ok(())) => Outcome::Success,
            Ok(Err(CaseError::Assertion(message))) => Outcome::Failure(message),
            Ok(Err(CaseError::Skip(reason))) => Outcome::Skip(reason),
            Ok(Err(err)) => Outcome::Error(err.to_string()),
            Err(payload) => Outcome::Failure(panic_note(&*payload)),
        };

        let outcome = match outcome {
            Outcome::Success if case.expects_failure() => Outcome::UnexpectedSuccess,
            Outcome::Failure(note) | Outcome::Error(note) if case.expects_failure() => {
                Outcome::ExpectedFailure(note)
            }
            other => other,
        };

        (outcome, context.into_trace())
    }
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static PANIC_LOCATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Keeps panics raised inside test bodies off the terminal; the runner
/// reports them itself. Panics on other threads reach the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let location = info.location().map(ToString::to_string);
                PANIC_LOCATION.with(|slot| *slot.borrow_mut() = location);
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_note(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "test panicked".to_string());

    match PANIC_LOCATION.with(|slot| slot.borrow_mut().take()) {
        Some(location) => format!("panicked at {location}:\n{message}"),
        None => message,
    }
}
