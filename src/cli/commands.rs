use std::path::{Path, PathBuf};

use tracing::info;

use crate::browser::session::BrowserSession;
use crate::cli::config::AppConfig;
use crate::error::{HarnessError, Result};
use crate::report::console::{format_console_report, format_json_report};
use crate::report::report_model::SuiteReport;
use crate::screenshots::command::{CommandStatus, ScreenshotsCommand, ScreenshotsSettings};
use crate::screenshots::fixtures::FixtureApi;
use crate::screenshots::plan::{PlanScreenshotter, ScreenshotPlan};
use crate::spec::runner::WizardRunner;
use crate::spec::spec_model::WizardSpec;
use crate::wizard::context::RunContext;
use crate::wizard::sink::{ConsoleOutput, DirectoryScreenshots};

// ============================================================================
// run subcommand
// ============================================================================

pub struct RunOptions<'a> {
    pub spec_path: &'a str,
    pub format: &'a str,
    pub output: Option<&'a str>,
    pub screenshot_dir: &'a str,
    pub base_url: Option<&'a str>,
    pub verbosity: u8,
}

/// Run wizard specs and return whether all passed.
pub fn cmd_run(options: &RunOptions<'_>, config: &AppConfig) -> Result<bool> {
    let specs = load_specs(options.spec_path)?;

    if specs.is_empty() {
        eprintln!("No wizard specs found at: {}", options.spec_path);
        return Ok(true);
    }

    info!(count = specs.len(), "running wizard specs");

    let mut session = BrowserSession::launch(&config.browser.server_script)?;
    let mut output = ConsoleOutput;
    let mut screenshots = DirectoryScreenshots::new(options.screenshot_dir);
    let start = std::time::Instant::now();

    let mut results = Vec::new();
    {
        let mut ctx = RunContext::new(&mut session, &mut output, &mut screenshots)
            .with_verbosity(options.verbosity);
        for spec in &specs {
            info!(spec = %spec.name, "running");
            results.push(WizardRunner::run(spec, &mut ctx, options.base_url));
        }
    }

    let duration = start.elapsed().as_millis();
    session.quit()?;

    let report = SuiteReport::from_results("Wizard specs", results).with_duration(duration);
    let all_passed = report.all_passed();

    let output_content = match options.format {
        "json" => format_json_report(&report)?,
        _ => format_console_report(&report),
    };

    match options.output {
        Some(path) => std::fs::write(path, &output_content)?,
        None => print!("{}", output_content),
    }

    Ok(all_passed)
}

/// Load wizard specs from a single YAML file or a directory of YAML files.
pub fn load_specs(path: &str) -> Result<Vec<WizardSpec>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_dir() {
        let mut specs = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let p = entry.path();
            if p.extension().is_some_and(|e| e == "yaml" || e == "yml") {
                let content = std::fs::read_to_string(&p)?;
                let spec: WizardSpec = serde_yaml::from_str(&content)?;
                specs.push(spec);
            }
        }
        // Sort by name for deterministic order
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specs)
    } else {
        let content = std::fs::read_to_string(path)?;
        let spec: WizardSpec = serde_yaml::from_str(&content)?;
        Ok(vec![spec])
    }
}

// ============================================================================
// screenshots subcommand
// ============================================================================

pub struct ScreenshotOptions<'a> {
    pub plan: Option<&'a str>,
    pub hostname: Option<&'a str>,
    pub fixtures_api: Option<&'a str>,
    pub output_dir: Option<&'a str>,
}

/// Generate product screenshots; returns the process exit code.
pub fn cmd_screenshots(options: &ScreenshotOptions<'_>, config: &AppConfig) -> Result<i32> {
    let settings = &config.screenshots;
    let plan_path = required(options.plan.or(settings.plan.as_deref()), "screenshot plan")?;
    let hostname = required(
        options.hostname.or(settings.frontend_hostname.as_deref()),
        "frontend hostname",
    )?;
    let fixtures_api = required(
        options.fixtures_api.or(settings.fixtures_api.as_deref()),
        "fixtures API URL",
    )?;
    let screenshots_path = PathBuf::from(options.output_dir.unwrap_or(settings.path.as_str()));

    let plan = ScreenshotPlan::load(Path::new(plan_path))?;
    let mut flows = PlanScreenshotter::new(plan);
    let mut fixtures = FixtureApi::new(fixtures_api);
    let mut users = FixtureApi::new(fixtures_api);
    let mut session = BrowserSession::launch(&config.browser.server_script)?;
    let mut output = ConsoleOutput;

    let status = {
        let mut command = ScreenshotsCommand::new(
            &mut fixtures,
            &mut users,
            ScreenshotsSettings {
                screenshots_path,
                frontend_hostname: hostname.to_string(),
                diary_password: settings.diary_password.clone(),
            },
        );
        command.execute(&mut session, &mut flows, &mut output)
    };

    session.quit()?;
    if status == CommandStatus::Success {
        info!("screenshots generated");
    }
    Ok(status.exit_code())
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str> {
    value.ok_or_else(|| HarnessError::Config(format!("no {} given on the command line or in the config file", what)))
}
