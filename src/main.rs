//! restcase - sequential API and shell test harness.
//!
//! Runs the built-in suites, writing a narrative log and a CSV record of
//! every test under the work directory.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use restcase::auth::BearerToken;
use restcase::config::{self, Color, HarnessConfig};
use restcase::suites;
use restcase::testing::{CaseSettings, ResultRecorder, RunSummary, TestLoader, TestRunner};

#[derive(Parser)]
#[command(name = "restcase")]
#[command(author, version, about = "Run API and shell test suites and record every outcome")]
struct Cli {
    /// Directory holding logs/, result_csv/ and configuration.txt
    #[arg(long, env = "RESTCASE_WORKDIR")]
    work_dir: Option<PathBuf>,

    /// Stem of the log and record file names [default: program name]
    #[arg(long)]
    run_name: Option<String>,

    /// host[:port] of the management API
    #[arg(long, env = "RESTCASE_HOST")]
    host: Option<String>,

    /// Bearer token sent with every API call
    #[arg(long, env = "RESTCASE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Timeout for GET requests, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// System log tailed at the end of each test
    #[arg(long, default_value = config::DEFAULT_SYSTEM_LOG)]
    system_log: PathBuf,

    /// Only run tests whose `suite::name` contains PATTERN
    #[arg(short = 'k', value_name = "PATTERN")]
    filter: Option<String>,

    /// Stop after the first failure or error
    #[arg(long)]
    failfast: bool,

    /// One character per test instead of one line
    #[arg(short, long)]
    quiet: bool,

    /// Colorize terminal output
    #[arg(long, value_enum, default_value_t)]
    color: Color,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn into_config(self) -> io::Result<HarnessConfig> {
        let work_dir = match self.work_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let run_name = self.run_name.unwrap_or_else(|| {
            std::env::args_os()
                .next()
                .map(|program| config::run_name_from(PathBuf::from(program).as_path()))
                .unwrap_or_else(|| config::DEFAULT_RUN_NAME.to_string())
        });

        let mut config = HarnessConfig::new(work_dir, run_name);
        config.system_log = self.system_log;
        config.verbose = !self.quiet;
        config.color = self.color;
        config.api_host = self.host;
        config.token = self.token.and_then(BearerToken::new);
        config.http_timeout = self.timeout.map(Duration::from_secs);
        config.failfast = self.failfast;
        config.filter = self.filter;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to resolve the work directory: {e}");
            return ExitCode::FAILURE;
        }
    };
    debug!(?config, "starting run");

    let mut recorder = match ResultRecorder::new(&config, io::stderr()) {
        Ok(recorder) => recorder,
        Err(e) => {
            error!("Failed to prepare output files: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cases = TestLoader::new().filter(config.filter.clone()).load(suites::all());
    let summary = TestRunner::new(CaseSettings::from(&config))
        .failfast(config.failfast)
        .run(&cases, &mut recorder);

    exit_code(&summary)
}

fn exit_code(summary: &RunSummary) -> ExitCode {
    if summary.was_successful() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use restcase::testing::ProblemEntry;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["restcase", "--work-dir", "/work", "--run-name", "smoke"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn help_flags_display_help() {
        for flag in ["-h", "--help"] {
            let err = Cli::try_parse_from(["restcase", flag]).err().unwrap();
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
            assert_eq!(err.exit_code(), 0);
        }
    }

    #[test]
    fn defaults_run_verbose_with_auto_color() {
        let config = parse(&[]).into_config().unwrap();

        assert_eq!(config.work_dir, PathBuf::from("/work"));
        assert_eq!(config.run_name, "smoke");
        assert_eq!(config.system_log, PathBuf::from(config::DEFAULT_SYSTEM_LOG));
        assert!(config.verbose);
        assert_eq!(config.color, Color::Auto);
        assert!(!config.failfast);
        assert_eq!(config.filter, None);
        assert_eq!(config.http_timeout, None);
    }

    #[test]
    fn run_options_reach_the_config() {
        let config = parse(&["-q", "-k", "template::", "--failfast", "--color", "never", "--timeout", "5"])
            .into_config()
            .unwrap();

        assert!(!config.verbose);
        assert_eq!(config.filter.as_deref(), Some("template::"));
        assert!(config.failfast);
        assert_eq!(config.color, Color::Never);
        assert_eq!(config.http_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn blank_token_sends_none() {
        let config = parse(&["--token", "  ", "--host", "10.0.0.1:8443"]).into_config().unwrap();

        assert!(config.token.is_none());
        assert_eq!(config.api_host.as_deref(), Some("10.0.0.1:8443"));
    }

    #[test]
    fn exit_code_follows_the_run_result() {
        assert_eq!(exit_code(&RunSummary::default()), ExitCode::SUCCESS);

        let skipped_only = RunSummary {
            tests_run: 1,
            skipped: 1,
            ..RunSummary::default()
        };
        assert_eq!(exit_code(&skipped_only), ExitCode::SUCCESS);

        let failed = RunSummary {
            tests_run: 1,
            failures: vec![ProblemEntry {
                description: "create pool".into(),
                note: "1 != 2".into(),
            }],
            ..RunSummary::default()
        };
        assert_eq!(exit_code(&failed), ExitCode::FAILURE);

        let surprising = RunSummary {
            tests_run: 1,
            unexpected_successes: 1,
            ..RunSummary::default()
        };
        assert_eq!(exit_code(&surprising), ExitCode::FAILURE);
    }
}
