//! # Test Harness
//!
//! Runs named tests one after another and records what each of them did.
//!
//! A test body receives a [`CaseContext`] and issues shell commands and API
//! calls through it; each of those lands in the test's [`CommandTrace`]. The
//! [`TestRunner`] reports every lifecycle step to a [`TestOutcomeObserver`],
//! and [`ResultRecorder`] is the observer that writes the narrative log, the
//! record file and the terminal progress.

pub mod case;
pub mod context;
pub mod loader;
pub mod narrative;
pub mod observer;
pub mod recorder;
pub mod runner;
pub mod trace;

pub use case::{CaseError, CaseResult, TestCase};
pub use context::{CaseContext, CaseSettings};
pub use loader::{TestLoader, TestSuite};
pub use narrative::NarrativeLog;
pub use observer::{CaseReport, TestOrder, TestOutcomeObserver};
pub use recorder::ResultRecorder;
pub use runner::{Outcome, ProblemEntry, RunSummary, TestRunner};
pub use trace::CommandTrace;
