use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod clockify;
mod config;
mod dates;
mod error;
mod filter;
mod harvest;
mod models;
mod output;
mod pipeline;
mod transform;

use cli::Cli;
use clockify::ClockifyClient;
use config::Config;
use dates::DateRange;
use harvest::HarvestClient;
use output::RunMode;
use pipeline::{Pipeline, RunOptions};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(error::exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(cli.env_file.as_deref())?;
    let range = DateRange::from_options(cli.date, cli.start, cli.end)?;

    let filter_items = if cli.filter.is_empty() {
        &config.filter
    } else {
        &cli.filter
    };
    let criteria = filter::criteria_from_args(filter_items);
    if let Some(criteria) = &criteria {
        tracing::info!("Filtering entries by {criteria}");
    }

    let harvest =
        HarvestClient::new(&config.harvest).context("Could not build the Harvest client")?;
    let me = harvest.authenticate().context("Harvest login failed")?;
    tracing::info!(
        "Logged in to Harvest ({}) as {}",
        config.harvest.company_name,
        me.user.email.as_deref().unwrap_or(&config.harvest.email)
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = if cli.list {
        pipeline::list_entries(&harvest, &range, criteria.as_ref(), &mut out)?
    } else {
        let clockify = ClockifyClient::new(&config.clockify)
            .context("Could not build the Clockify client")?;
        let options = RunOptions {
            start_time: config.clockify.start_time,
            project_name: config.clockify.project_name.clone(),
            filter: criteria,
            dry_run: cli.dry_run,
        };
        if options.dry_run {
            tracing::info!("Dry run: nothing will be submitted to Clockify");
        }
        Pipeline::new(&harvest, &clockify, &options).run(&range, &mut out)?
    };

    let mode = if cli.list {
        RunMode::List
    } else if cli.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Live
    };
    write!(out, "{}", output::format_summary(&summary, mode))?;
    out.flush()?;

    if summary.has_failures() {
        return Ok(ExitCode::from(error::PARTIAL_FAILURE_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}
