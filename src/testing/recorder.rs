use std::fmt;
use std::io::Write;

use owo_colors::{OwoColorize, Style};
use tracing::warn;

use crate::config::HarnessConfig;
use crate::datetime;
use crate::error::Result;
use crate::record::{OutcomeRecord, OutcomeTag, RecordWriter};

use super::narrative::NarrativeLog;
use super::observer::{CaseReport, TestOrder, TestOutcomeObserver};
use super::runner::{ProblemEntry, RunSummary};

const SEPARATOR_HEAVY: &str = "======================================================================";
const SEPARATOR_LIGHT: &str = "----------------------------------------------------------------------";
const SEPARATOR_BLANK: &str = "                                                                      ";

#[derive(Debug, Clone, Default)]
struct Styles {
    problem: Style,
    pass: Style,
    skip: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.problem = Style::new().red();
        self.pass = Style::new().green();
        self.skip = Style::new().yellow();
    }
}

/// Records every test of a run: terminal progress, the narrative log and one
/// structured row per outcome.
///
/// Both files are emptied when the recorder is built. After that, a failed
/// write is reported and counted but never interrupts the run.
pub struct ResultRecorder<W: Write> {
    stream: W,
    verbose: bool,
    styles: Styles,
    narrative: NarrativeLog,
    records: RecordWriter,
    write_failures: usize,
}

impl<W: Write> ResultRecorder<W> {
    pub fn new(config: &HarnessConfig, stream: W) -> Result<Self> {
        config.ensure_dirs()?;

        let narrative = NarrativeLog::new(config.log_path(), &config.system_log);
        narrative.truncate()?;
        let records = RecordWriter::open(config.record_path())?;
        records.truncate()?;

        let mut styles = Styles::default();
        if config.color.should_colorize() {
            styles.colorize();
        }

        Ok(Self {
            stream,
            verbose: config.verbose,
            styles,
            narrative,
            records,
            write_failures: 0,
        })
    }

    /// Narrative or record writes that failed during the run so far.
    pub fn write_failures(&self) -> usize {
        self.write_failures
    }

    pub fn into_stream(self) -> W {
        self.stream
    }

    fn out(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = self.stream.write_fmt(args).and_then(|()| self.stream.flush()) {
            warn!(%err, "failed to write test progress");
        }
    }

    fn note_failure(&mut self, what: &str, err: &crate::error::HarnessError) {
        self.write_failures += 1;
        warn!(%err, "failed to write {what}");
    }

    /// Common tail of every outcome hook.
    fn conclude(&mut self, report: CaseReport<'_>, tag: OutcomeTag, note: Option<&str>) {
        // A skipped test never ran, so it gets no end banner.
        if tag != OutcomeTag::Skip {
            let stamp = datetime::now_stamp();
            if let Err(err) = self.narrative.end(&report.order.description, &stamp) {
                self.note_failure("narrative log", &err);
            }
        }

        let problem = matches!(tag, OutcomeTag::Fail | OutcomeTag::Error);
        let style = match tag {
            OutcomeTag::Ok => self.styles.pass,
            OutcomeTag::Fail | OutcomeTag::Error => self.styles.problem,
            _ => self.styles.skip,
        };

        if !self.verbose {
            let short = match tag {
                OutcomeTag::Ok => ".",
                OutcomeTag::Fail => "F",
                OutcomeTag::Error => "E",
                OutcomeTag::Skip => "s",
                OutcomeTag::ExpectedFailure => "x",
                OutcomeTag::UnexpectedSuccess => "u",
            };
            self.out(format_args!("{}", short.style(style)));
            return;
        }

        let label = match (tag, note) {
            (OutcomeTag::Ok, _) => "ok".to_string(),
            (OutcomeTag::Fail, _) => "FAIL".to_string(),
            (OutcomeTag::Error, _) => "ERROR".to_string(),
            (OutcomeTag::Skip, reason) => format!("skipped '{}'", reason.unwrap_or_default()),
            (OutcomeTag::ExpectedFailure, _) => "expected failure".to_string(),
            (OutcomeTag::UnexpectedSuccess, _) => "unexpected success".to_string(),
        };
        self.out(format_args!("{}\n", label.style(style)));

        if !report.trace.is_empty() {
            let trace = report.trace.to_string();
            if problem {
                self.out(format_args!("{}", trace.style(self.styles.problem)));
            } else {
                self.out(format_args!("{trace}"));
            }
            self.write_record(report.order, report.trace.command_column(), tag, note);
        }
        self.out(format_args!("\n"));
    }

    fn write_record(&mut self, order: &TestOrder, command: String, tag: OutcomeTag, note: Option<&str>) {
        let row = OutcomeRecord {
            sequence: order.sequence.clone(),
            description: order.description.clone(),
            command,
            outcome: tag,
            note: note.map(|note| note.trim().to_string()),
        };
        if let Err(err) = self.records.write_row(&row) {
            self.note_failure("structured record", &err);
        }
    }

    fn print_problems(&mut self, flavour: &str, problems: &[ProblemEntry]) {
        for problem in problems {
            let heading = format!("{}: {flavour}", problem.description);
            self.out(format_args!("{SEPARATOR_HEAVY}\n"));
            self.out(format_args!("{}\n", heading.style(self.styles.problem)));
            self.out(format_args!("{}\n", problem.note.trim()));
            self.out(format_args!("{SEPARATOR_BLANK}\n"));
        }
    }
}

impl<W: Write> TestOutcomeObserver for ResultRecorder<W> {
    fn start_test(&mut self, order: &TestOrder) {
        if self.verbose {
            self.out(format_args!("{}  {} ... ", order.sequence, order.description));
        }
        let stamp = datetime::now_stamp();
        if let Err(err) = self.narrative.start(&order.description, &stamp) {
            self.note_failure("narrative log", &err);
        }
    }

    fn add_success(&mut self, report: CaseReport<'_>) {
        self.conclude(report, OutcomeTag::Ok, None);
    }

    fn add_failure(&mut self, report: CaseReport<'_>, error: &str) {
        self.conclude(report, OutcomeTag::Fail, Some(error));
    }

    fn add_error(&mut self, report: CaseReport<'_>, error: &str) {
        self.conclude(report, OutcomeTag::Error, Some(error));
    }

    fn add_skip(&mut self, report: CaseReport<'_>, reason: &str) {
        self.conclude(report, OutcomeTag::Skip, Some(reason));
    }

    fn add_expected_failure(&mut self, report: CaseReport<'_>, error: &str) {
        self.conclude(report, OutcomeTag::ExpectedFailure, Some(error));
    }

    fn add_unexpected_success(&mut self, report: CaseReport<'_>) {
        self.conclude(report, OutcomeTag::UnexpectedSuccess, None);
    }

    fn finish_run(&mut self, summary: &RunSummary) {
        if !self.verbose {
            self.out(format_args!("\n"));
        }
        self.print_problems("ERROR", &summary.errors);
        self.print_problems("FAIL", &summary.failures);

        let plural = if summary.tests_run == 1 { "" } else { "s" };
        self.out(format_args!("{SEPARATOR_LIGHT}\n"));
        self.out(format_args!(
            "Ran {} test{plural} in {:.3}s\n\n",
            summary.tests_run,
            summary.elapsed.as_secs_f64()
        ));

        let mut infos = Vec::new();
        if !summary.failures.is_empty() {
            infos.push(format!("failures={}", summary.failures.len()));
        }
        if !summary.errors.is_empty() {
            infos.push(format!("errors={}", summary.errors.len()));
        }
        if summary.skipped > 0 {
            infos.push(format!("skipped={}", summary.skipped));
        }
        if summary.expected_failures > 0 {
            infos.push(format!("expected failures={}", summary.expected_failures));
        }
        if summary.unexpected_successes > 0 {
            infos.push(format!("unexpected successes={}", summary.unexpected_successes));
        }

        let verdict = if summary.was_successful() {
            "OK".style(self.styles.pass).to_string()
        } else {
            "FAILED".style(self.styles.problem).to_string()
        };
        if infos.is_empty() {
            self.out(format_args!("{verdict}\n"));
        } else {
            self.out(format_args!("{verdict} ({})\n", infos.join(", ")));
        }
    }
}
