use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser};

use crate::dates::parse_date;

#[derive(Debug, Parser)]
#[command(name = "h2c", version, about = "Copy Harvest time entries into Clockify")]
pub struct Cli {
    /// Only copy entries matching CATEGORY=VALUE (client, project or task).
    #[arg(long, num_args = 1.., value_name = "CATEGORY=VALUE")]
    pub filter: Vec<String>,

    /// Fetch and transform entries, print the payloads, submit nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the Harvest entries for each date and exit.
    #[arg(long, conflicts_with = "dry_run")]
    pub list: bool,

    /// Copy a single day (YYYY-MM-DD) instead of the current week.
    #[arg(long, value_parser = parse_date, conflicts_with_all = ["start", "end"])]
    pub date: Option<NaiveDate>,

    /// First day to copy (YYYY-MM-DD). Runs through today unless --end is given.
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last day to copy (YYYY-MM-DD). Requires --start.
    #[arg(long, value_parser = parse_date, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Extra dotenv file with H2C_* settings.
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn log_filter(&self) -> String {
        let level = match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            _ => "trace",
        };
        format!("h2c={level}")
    }
}
