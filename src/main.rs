use clap::Parser;
use nts_harness::cli::commands::{cmd_run, cmd_screenshots, RunOptions, ScreenshotOptions};
use nts_harness::cli::config::{load_config, resolve_verbosity, Cli, Commands};
use nts_harness::logging::init_logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Run {
            spec,
            format,
            output,
            screenshot_dir,
            base_url,
        } => {
            let options = RunOptions {
                spec_path: &spec,
                format: format.as_deref().unwrap_or(config.run.format.as_str()),
                output: output.as_deref().or(config.run.output.as_deref()),
                screenshot_dir: screenshot_dir
                    .as_deref()
                    .unwrap_or(config.run.screenshot_dir.as_str()),
                base_url: base_url.as_deref().or(config.browser.base_url.as_deref()),
                verbosity: resolve_verbosity(cli.verbose, &config.run),
            };
            let all_passed = cmd_run(&options, &config)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Screenshots {
            plan,
            hostname,
            fixtures_api,
            output_dir,
        } => {
            let options = ScreenshotOptions {
                plan: plan.as_deref(),
                hostname: hostname.as_deref(),
                fixtures_api: fixtures_api.as_deref(),
                output_dir: output_dir.as_deref(),
            };
            let code = cmd_screenshots(&options, &config)?;
            if code != 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
