//! Run suites and write the report

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::Args;
use thyme_common::config::DEFAULT_CONFIG_FILE;
use thyme_common::{
    FilePreferences, Location, MemoryPreferences, Page, PreferenceStore, ThymeConfig,
};
use thyme_runner::plugins::{big_title, filter};
use thyme_runner::report::write_page;
use thyme_runner::{Builtins, RunReport, RunSummary, Shell, SuiteSpec, TestRunner};
use tracing::{debug, info};

use crate::output::{self, OutputFormat, ResultRow};

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Suite file, or directory searched for *.yaml / *.yml suites
    #[arg(short, long, default_value = "suites")]
    pub suite: PathBuf,

    /// Only run tests matching this path filter (e.g. "teapot>pours")
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Page title
    #[arg(long)]
    pub title: Option<String>,

    /// Output directory for index.html and thyme-results.json
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Preference store file
    #[arg(long, env = "THYME_PREFS")]
    pub prefs: Option<PathBuf>,

    /// Quiet period before a run is reported complete
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

impl RunArgs {
    /// The configuration file with command-line overrides applied.
    pub fn resolve_config(&self) -> anyhow::Result<ThymeConfig> {
        let mut config = ThymeConfig::load(&self.config)
            .with_context(|| format!("loading {}", self.config.display()))?;

        if let Some(title) = &self.title {
            config.page.title = title.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(prefs) = &self.prefs {
            config.prefs_path = Some(prefs.clone());
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config.debounce_ms = debounce_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    Failed,
}

impl RunStatus {
    pub fn of(summary: &RunSummary) -> Self {
        if summary.has_failures() {
            RunStatus::Failed
        } else {
            RunStatus::Passed
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Passed => 0,
            RunStatus::Failed => 1,
        }
    }
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunResult {
    pub status: RunStatus,
    pub report: RunReport,
    pub page_path: PathBuf,
    pub results_path: PathBuf,
}

pub async fn execute(args: RunArgs, format: OutputFormat) -> anyhow::Result<RunStatus> {
    let config = args.resolve_config()?;
    let result = run(&config, &args.suite, args.filter.as_deref()).await?;

    output::print_list(&ResultRow::leaves(&result.report.tests), format);
    if format == OutputFormat::Table {
        output::print_summary(&result.report.summary);
        output::print_info(&format!("Report written to {}", result.page_path.display()));
    }
    Ok(result.status)
}

/// Run the suites at `suite` and write the page and results under the
/// configured output directory.
pub async fn run(
    config: &ThymeConfig,
    suite: &Path,
    filter_expression: Option<&str>,
) -> anyhow::Result<RunResult> {
    let suites = SuiteSpec::load_all(suite)
        .with_context(|| format!("loading suites from {}", suite.display()))?;

    let mut location = Location::parse(&config.page.url)?;
    if let Some(expression) = filter_expression {
        location = location.with_param(filter::PARAM, expression);
    }
    debug!("Page location: {}", location);

    let preferences: Rc<dyn PreferenceStore> = match &config.prefs_path {
        Some(path) => Rc::new(FilePreferences::open(path)?),
        None => Rc::new(MemoryPreferences::new()),
    };

    let runner = Rc::new(SuiteSpec::runner(&suites));
    let builtins = Builtins {
        location: location.clone(),
        preferences,
        runner: runner.clone(),
    };
    let registry = builtins.registry(&config.disabled_contributions)?;

    let page = Page::new(config.page.title.clone(), location);
    let outcome = Shell::new(registry, runner.clone(), page)
        .configure(config)
        .run()
        .await;

    let title = match config.page.title.as_str() {
        "" => big_title::DEFAULT_TITLE.to_string(),
        title => title.to_string(),
    };
    let report = RunReport::new(title, outcome.summary, &runner.tests());

    let page_path = outcome
        .page
        .read(|page| write_page(page, &config.output_dir))?;
    let results_path = report.write(&config.output_dir)?;

    info!("Run complete: {}", outcome.summary);
    Ok(RunResult {
        status: RunStatus::of(&outcome.summary),
        report,
        page_path,
        results_path,
    })
}
